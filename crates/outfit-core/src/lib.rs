#![forbid(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod makeup;
pub mod node;
pub mod options;
pub mod presets;
pub mod prompt;
pub mod seed;
pub mod selection;
pub mod types;
pub mod verify;
