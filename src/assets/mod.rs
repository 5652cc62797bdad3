pub mod cache;
pub mod color;
pub mod decode;
pub mod metadata;
