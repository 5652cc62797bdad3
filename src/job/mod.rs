pub mod options;
pub mod pipeline;
pub mod progress;
pub mod state;

pub use options::{JobOptions, PreviewOptions};
pub use pipeline::CompositionJob;
pub use progress::ProgressEvent;
pub use state::{JobState, Stage};
