//! Framemark composes a photo onto a decorated frame: an aspect-aware background, the photo
//! itself, an optional drop-shadow mask and a stack of text layers rendered by an external
//! renderer.
//!
//! The public API is job-oriented:
//!
//! - Build [`JobOptions`] (usually from an [`AppConfig`])
//! - Connect a renderer with [`renderer_channel`] (or use the built-in [`LocalRenderer`])
//! - Run a [`CompositionJob`] in export or preview mode
//!
//! [`crop_split`] is a standalone tool that crops a photo to a fixed ratio and slices it into
//! grid panels.
#![forbid(unsafe_code)]

pub mod assets;
pub mod crop;
pub mod foundation;
pub mod handshake;
pub mod job;
pub mod layout;
pub mod render;

pub use crate::foundation::config::{AppConfig, BgRate, LayoutOptions};
pub use crate::foundation::core::{Rect, Size};
pub use crate::foundation::error::{FramemarkError, FramemarkResult};

pub use crate::assets::metadata::{ExifMetadata, MetadataProvider, NoMetadata};
pub use crate::crop::{CropMode, CropModeDef, CropRectInput, CropSplitRequest, crop_split};
pub use crate::handshake::HandshakeConfig;
pub use crate::handshake::bus::{RendererBus, RendererEndpoint, Responder, renderer_channel};
pub use crate::handshake::local::LocalRenderer;
pub use crate::job::{CompositionJob, JobOptions, JobState, PreviewOptions, ProgressEvent, Stage};
