pub mod content;
pub mod size;
