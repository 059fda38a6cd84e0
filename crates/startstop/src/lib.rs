//! Startstop
//!
//! Dependency-ordered lifecycle management for an object graph built by a
//! dependency-injection container.
//!
//! # Overview
//!
//! The graph builder records which objects reference which others. Given
//! that graph, startstop:
//! - Opens and starts every object only after everything it depends on
//! - Stops and closes objects only after everything depending on them
//! - Rejects dependency cycles between lifecycle-managed objects
//! - Bounds each phase by a cancellation/deadline context
//! - Stops only what was successfully started
//!
//! # Example
//!
//! ```rust,ignore
//! use startstop::{component, Context, Graph, Opener, Closer};
//!
//! struct Database { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl Opener for Database { /* ... */ }
//! #[async_trait::async_trait]
//! impl Closer for Database { /* ... */ }
//!
//! component!(Database: Opener, Closer);
//!
//! let mut builder = Graph::builder();
//! let db = builder.add("database", Arc::new(Database::new()));
//! let api = builder.add("api", Arc::new(Api::new()));
//! builder.depend(api, "db", db)?;
//!
//! builder.build().run().await;
//! ```

pub mod cli;
pub mod config;
pub mod runtime;

pub use cli::StartStopArgs;
pub use config::{
    ConfigError, LevelExecution, LifecycleConfig, Manifest, ManifestError, StopPolicy,
    TimeoutPolicy,
};
pub use runtime::{
    BoxError, CallError, Closer, Component, Context, ContextError, CycleError,
    Dependence, Graph, GraphBuilder, GraphError, Hop, Level, LifecycleError, Node, NodeId,
    Opener, Plan, SimulatedComponent, Starter, Step, Stopper,
};
