//! Lifecycle settings and simulation manifest parsing

mod manifest;
mod settings;

pub use manifest::*;
pub use settings::*;
