//! Run Loop Tests
//!
//! Exercises start, wait-for-shutdown and stop as composed by
//! `Graph::run_with`, with shutdown driven by a cancellation token.

mod common;

use common::{entries, Journal, Recorder};
use async_trait::async_trait;
use startstop::{Context, ContextError, Graph, LifecycleConfig, Starter, Step};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn two_tier(journal: &Journal, config: LifecycleConfig, fail: Option<Step>) -> Graph {
    let mut builder = Graph::builder();
    let store = builder.add("store", Arc::new(Recorder::new("store", journal)));
    let mut service = Recorder::new("service", journal);
    if let Some(step) = fail {
        service = service.failing(step);
    }
    let service = builder.add("service", Arc::new(service));
    builder.depend(service, "store", store).unwrap();
    builder.config(config);
    builder.build()
}

async fn wait_until_started(graph: &Graph, count: usize) {
    for _ in 0..100 {
        if graph.started().await.len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("graph never reached {} started nodes", count);
}

#[tokio::test]
async fn test_shutdown_token_triggers_stop() {
    let journal = Journal::default();
    let graph = two_tier(&journal, LifecycleConfig::default(), None);
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn({
        let graph = graph.clone();
        let shutdown = shutdown.clone();
        async move { graph.run_with(shutdown).await }
    });

    wait_until_started(&graph, 2).await;
    assert_eq!(entries(&journal).len(), 4);
    assert!(!handle.is_finished());

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        entries(&journal),
        vec![
            "open store",
            "start store",
            "open service",
            "start service",
            "stop service",
            "close service",
            "stop store",
            "close store",
        ]
    );
}

#[tokio::test]
async fn test_start_failure_returns_without_waiting() {
    let journal = Journal::default();
    let graph = two_tier(&journal, LifecycleConfig::default(), Some(Step::Open));

    // never cancelled: run_with must give up on its own
    let shutdown = CancellationToken::new();
    tokio::time::timeout(Duration::from_secs(5), graph.run_with(shutdown))
        .await
        .unwrap();

    assert_eq!(
        entries(&journal),
        vec!["open store", "start store", "open service"]
    );
}

#[tokio::test]
async fn test_start_deadline_from_config() {
    let journal = Journal::default();
    let config = LifecycleConfig {
        start_timeout_ms: 30,
        ..Default::default()
    };
    let mut builder = Graph::builder();
    builder.add(
        "slow",
        Arc::new(Recorder::new("slow", &journal).slow(Duration::from_secs(2))),
    );
    builder.config(config);
    let graph = builder.build();

    let shutdown = CancellationToken::new();
    tokio::time::timeout(Duration::from_secs(1), graph.run_with(shutdown))
        .await
        .unwrap();
    assert!(entries(&journal).is_empty());
}

#[tokio::test]
async fn test_stop_failure_is_logged_not_raised() {
    let journal = Journal::default();
    let graph = two_tier(&journal, LifecycleConfig::default(), Some(Step::Stop));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    graph.run_with(shutdown).await;

    // fail-fast: the store is left running
    let log = entries(&journal);
    assert_eq!(log.last().map(String::as_str), Some("stop service"));
    assert!(!log.iter().any(|e| e == "stop store"));
}

/// Keeps the context its Start call was handed.
#[derive(Default)]
struct Background {
    ctx: Mutex<Option<Context>>,
}

#[async_trait]
impl Starter for Background {
    async fn start(&self, ctx: &Context) -> anyhow::Result<()> {
        *self.ctx.lock().unwrap() = Some(ctx.clone());
        Ok(())
    }
}

startstop::component!(Background: Starter);

#[tokio::test]
async fn test_start_context_outlives_start_phase() {
    let background = Arc::new(Background::default());
    let mut builder = Graph::builder();
    builder.add("worker", Arc::clone(&background));
    let graph = builder.build();
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn({
        let graph = graph.clone();
        let shutdown = shutdown.clone();
        async move { graph.run_with(shutdown).await }
    });

    wait_until_started(&graph, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let start_ctx = background.ctx.lock().unwrap().clone().unwrap();
    assert_eq!(start_ctx.err(), None);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(start_ctx.err(), Some(ContextError::Canceled));
}
