//! Error types for lifecycle phases

use super::component::Step;
use super::context::ContextError;
use super::graph::Node;
use super::levels::CycleError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failed Open/Start/Stop/Close call.
#[derive(Debug, thiserror::Error)]
#[error("failed to {step} {node}: {source}")]
pub struct CallError {
    /// Display name of the node whose call failed
    pub node: String,
    pub step: Step,
    #[source]
    pub source: BoxError,
}

impl CallError {
    pub(crate) fn new(node: &Node, step: Step, source: anyhow::Error) -> Self {
        Self {
            node: node.to_string(),
            step,
            source: source.into(),
        }
    }
}

/// Errors that end a start or stop phase
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("{} components failed to shut down: {}", .0.len(), join_failures(.0))]
    Teardown(Vec<CallError>),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Lifecycle phase task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl LifecycleError {
    /// The context error, if the phase ended on cancellation or deadline.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            LifecycleError::Context(err) => Some(*err),
            _ => None,
        }
    }
}

fn join_failures(failures: &[CallError]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
