//! Runtime components for lifecycle sequencing

pub mod component;
pub mod context;
mod driver;
pub mod error;
pub mod graph;
pub mod levels;
mod phase;
pub mod plan;
mod run;
pub mod simulated;

pub use component::*;
pub use context::*;
pub use error::*;
pub use graph::*;
pub use levels::{CycleError, Hop, Level};
pub use plan::*;
pub use simulated::*;
