//! Lifecycle capabilities a graph object may implement

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::Context;

/// Objects implementing `Opener` are opened by `Graph::start`.
#[async_trait]
pub trait Opener: Send + Sync {
    async fn open(&self, ctx: &Context) -> anyhow::Result<()>;
}

/// Objects implementing `Closer` are closed by `Graph::stop`.
#[async_trait]
pub trait Closer: Send + Sync {
    async fn close(&self, ctx: &Context) -> anyhow::Result<()>;
}

/// Objects implementing `Starter` are started by `Graph::start`.
#[async_trait]
pub trait Starter: Send + Sync {
    async fn start(&self, ctx: &Context) -> anyhow::Result<()>;
}

/// Objects implementing `Stopper` are stopped by `Graph::stop`.
#[async_trait]
pub trait Stopper: Send + Sync {
    async fn stop(&self, ctx: &Context) -> anyhow::Result<()>;
}

/// An object held by a graph node.
///
/// Each capability query returns `Some` when the object provides that
/// capability. The defaults provide none, so a plain value only needs an
/// empty impl (or `component!(MyType)`) to take part in a graph as a
/// pass-through dependency.
///
/// ```rust,ignore
/// struct Database { /* ... */ }
///
/// #[async_trait]
/// impl Opener for Database { /* ... */ }
/// #[async_trait]
/// impl Closer for Database { /* ... */ }
///
/// startstop::component!(Database: Opener, Closer);
/// ```
pub trait Component: Send + Sync + 'static {
    fn as_opener(&self) -> Option<&dyn Opener> {
        None
    }

    fn as_closer(&self) -> Option<&dyn Closer> {
        None
    }

    fn as_starter(&self) -> Option<&dyn Starter> {
        None
    }

    fn as_stopper(&self) -> Option<&dyn Stopper> {
        None
    }
}

/// Whether a component takes part in lifecycle sequencing at all.
pub fn is_eligible(component: &dyn Component) -> bool {
    component.as_starter().is_some()
        || component.as_stopper().is_some()
        || component.as_opener().is_some()
        || component.as_closer().is_some()
}

/// The capabilities a component provides, in invocation order.
pub fn steps(component: &dyn Component) -> Vec<Step> {
    let mut steps = Vec::new();
    if component.as_opener().is_some() {
        steps.push(Step::Open);
    }
    if component.as_starter().is_some() {
        steps.push(Step::Start);
    }
    if component.as_stopper().is_some() {
        steps.push(Step::Stop);
    }
    if component.as_closer().is_some() {
        steps.push(Step::Close);
    }
    steps
}

/// A single lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Open,
    Start,
    Stop,
    Close,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Open => "open",
            Step::Start => "start",
            Step::Stop => "stop",
            Step::Close => "close",
        }
    }

    /// Progressive form used in log records ("opening", "stopping", ...).
    pub fn progressive(&self) -> &'static str {
        match self {
            Step::Open => "opening",
            Step::Start => "starting",
            Step::Stop => "stopping",
            Step::Close => "closing",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implement [`Component`] for a type from the capabilities it provides.
///
/// ```rust,ignore
/// startstop::component!(Cache);                     // pass-through only
/// startstop::component!(Server: Starter, Stopper);
/// ```
#[macro_export]
macro_rules! component {
    (@capability Opener) => {
        fn as_opener(&self) -> Option<&dyn $crate::Opener> {
            Some(self)
        }
    };
    (@capability Closer) => {
        fn as_closer(&self) -> Option<&dyn $crate::Closer> {
            Some(self)
        }
    };
    (@capability Starter) => {
        fn as_starter(&self) -> Option<&dyn $crate::Starter> {
            Some(self)
        }
    };
    (@capability Stopper) => {
        fn as_stopper(&self) -> Option<&dyn $crate::Stopper> {
            Some(self)
        }
    };
    ($ty:ty) => {
        impl $crate::Component for $ty {}
    };
    ($ty:ty: $($capability:ident),+ $(,)?) => {
        impl $crate::Component for $ty {
            $( $crate::component!(@capability $capability); )+
        }
    };
}
