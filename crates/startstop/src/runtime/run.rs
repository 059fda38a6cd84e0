//! Process entry point: start, wait for a termination signal, stop

use tokio_util::sync::CancellationToken;

use super::context::Context;
use super::graph::Graph;

impl Graph {
    /// Start the graph, block until SIGINT or SIGTERM, then stop it.
    ///
    /// Start and stop each get their configured deadline (15 seconds by
    /// default). The start context stays live until the graph has stopped,
    /// so work tied to it ends at its deadline or on return, whichever comes
    /// first. Failures are logged, never returned.
    pub async fn run(&self) {
        let shutdown = CancellationToken::new();
        let listener = tokio::spawn(cancel_on_termination(shutdown.clone()));

        self.run_with(shutdown).await;

        listener.abort();
    }

    /// Like [`Graph::run`], with shutdown triggered by cancelling `shutdown`.
    pub async fn run_with(&self, shutdown: CancellationToken) {
        let config = self.config();

        let start_ctx = Context::background().with_timeout(config.start_timeout());
        if let Err(e) = self.start(&start_ctx).await {
            log::error!("Failed to start: {}", e);
            start_ctx.cancel();
            return;
        }
        log::info!("Graph started, waiting for shutdown signal");

        shutdown.cancelled().await;

        let stop_ctx = Context::background().with_timeout(config.stop_timeout());
        if let Err(e) = self.stop(&stop_ctx).await {
            log::error!("Failed to stop cleanly: {}", e);
        }
        stop_ctx.cancel();
        start_ctx.cancel();
    }
}

async fn cancel_on_termination(shutdown: CancellationToken) {
    match wait_for_termination().await {
        Ok(signal) => {
            log::info!("Received {}, initiating shutdown...", signal);
            shutdown.cancel();
        }
        Err(e) => log::error!("Failed to listen for termination signals: {}", e),
    }
}

#[cfg(unix)]
async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
