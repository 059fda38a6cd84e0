//! Level-by-level invocation of lifecycle calls

use futures::future::join_all;

use super::component::Step;
use super::context::Context;
use super::error::{CallError, LifecycleError};
use super::graph::{GraphInner, Node, NodeId};
use super::levels::{self, Level};
use crate::config::{LevelExecution, StopPolicy};

/// Open then start one node.
async fn bring_up(node: &Node, ctx: &Context) -> Result<(), CallError> {
    let value = node.value();
    if let Some(opener) = value.as_opener() {
        log::debug!("opening {}", node);
        opener
            .open(ctx)
            .await
            .map_err(|e| CallError::new(node, Step::Open, e))?;
    }
    if let Some(starter) = value.as_starter() {
        log::debug!("starting {}", node);
        starter
            .start(ctx)
            .await
            .map_err(|e| CallError::new(node, Step::Start, e))?;
    }
    Ok(())
}

/// Stop then close one node. Fail-fast gives up after the first failing call.
async fn tear_down(node: &Node, ctx: &Context, policy: StopPolicy) -> Vec<CallError> {
    let value = node.value();
    let mut failures = Vec::new();

    if let Some(stopper) = value.as_stopper() {
        log::debug!("stopping {}", node);
        if let Err(e) = stopper.stop(ctx).await {
            log::error!("error stopping {}: {}", node, e);
            failures.push(CallError::new(node, Step::Stop, e));
            if policy == StopPolicy::FailFast {
                return failures;
            }
        }
    }
    if let Some(closer) = value.as_closer() {
        log::debug!("closing {}", node);
        if let Err(e) = closer.close(ctx).await {
            log::error!("error closing {}: {}", node, e);
            failures.push(CallError::new(node, Step::Close, e));
        }
    }
    failures
}

async fn record_started(inner: &GraphInner, id: NodeId) {
    inner.started.lock().await.push(id);
}

/// Bring one level up, recording every node whose calls completed.
async fn start_level(
    inner: &GraphInner,
    level: &Level,
    ctx: &Context,
) -> Result<(), LifecycleError> {
    match inner.config.level_execution {
        LevelExecution::Sequential => {
            for &id in level {
                bring_up(inner.node(id), ctx).await?;
                record_started(inner, id).await;
            }
            Ok(())
        }
        LevelExecution::Concurrent => {
            let results = join_all(
                level
                    .iter()
                    .map(|&id| async move { (id, bring_up(inner.node(id), ctx).await) }),
            )
            .await;

            let mut first = None;
            for (id, result) in results {
                match result {
                    Ok(()) => record_started(inner, id).await,
                    Err(e) if first.is_none() => first = Some(e),
                    Err(e) => log::error!("{}", e),
                }
            }
            match first {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
    }
}

/// Run the start phase over every node of the graph.
///
/// Levels are walked from the last (no eligible dependencies) to the first,
/// so dependencies are fully up before their dependents. The first failure
/// ends the phase; the failing node is not recorded as started.
pub(crate) async fn start(inner: &GraphInner, ctx: &Context) -> Result<(), LifecycleError> {
    let levels = levels::levels(&inner.nodes, &inner.ids())?;
    inner.started.lock().await.clear();

    for level in levels.iter().rev() {
        start_level(inner, level, ctx).await?;
    }
    Ok(())
}

/// Run the stop phase over the nodes recorded by the start phase.
///
/// Levels are recomputed over the started subset and walked first to last,
/// so dependents stop before what they depend on.
pub(crate) async fn stop(inner: &GraphInner, ctx: &Context) -> Result<(), LifecycleError> {
    let started = inner.started.lock().await.clone();
    let levels = levels::levels(&inner.nodes, &started)?;
    let policy = inner.config.stop_policy;
    let mut failures = Vec::new();

    for level in &levels {
        match inner.config.level_execution {
            LevelExecution::Sequential => {
                for &id in level {
                    let node_failures = tear_down(inner.node(id), ctx, policy).await;
                    if policy == StopPolicy::FailFast && !node_failures.is_empty() {
                        return Err(first_failure(node_failures));
                    }
                    failures.extend(node_failures);
                }
            }
            LevelExecution::Concurrent => {
                let results =
                    join_all(level.iter().map(|&id| tear_down(inner.node(id), ctx, policy)))
                        .await;
                let level_failures: Vec<CallError> = results.into_iter().flatten().collect();
                if policy == StopPolicy::FailFast && !level_failures.is_empty() {
                    return Err(first_failure(level_failures));
                }
                failures.extend(level_failures);
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(LifecycleError::Teardown(failures))
    }
}

fn first_failure(failures: Vec<CallError>) -> LifecycleError {
    match failures.into_iter().next() {
        Some(failure) => LifecycleError::Call(failure),
        None => LifecycleError::Teardown(Vec::new()),
    }
}
