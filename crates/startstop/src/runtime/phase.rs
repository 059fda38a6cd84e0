//! Whole-phase timeout and cancellation

use std::future::Future;

use super::context::Context;
use super::error::LifecycleError;
use crate::config::TimeoutPolicy;

/// Run `phase` on its own task and race it against `ctx`.
///
/// If the context is done first its error is returned without waiting for
/// the phase. Under [`TimeoutPolicy::Abandon`] the phase keeps running in
/// the background and its result is discarded; under
/// [`TimeoutPolicy::Abort`] the task is aborted at its next suspension
/// point. In-flight lifecycle calls only learn about the deadline through
/// the context they were handed.
pub(crate) async fn with_timeout<F, Fut>(
    ctx: &Context,
    policy: TimeoutPolicy,
    name: &str,
    phase: F,
) -> Result<(), LifecycleError>
where
    F: FnOnce(Context) -> Fut,
    Fut: Future<Output = Result<(), LifecycleError>> + Send + 'static,
{
    let mut handle = tokio::spawn(phase(ctx.clone()));

    tokio::select! {
        joined = &mut handle => joined?,
        err = ctx.done() => {
            match policy {
                TimeoutPolicy::Abandon => {
                    log::warn!("{} phase abandoned ({}), it may still be running", name, err);
                }
                TimeoutPolicy::Abort => {
                    log::warn!("{} phase aborted ({})", name, err);
                    handle.abort();
                }
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ContextError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_phase_result_returned() {
        let ctx = Context::background();
        let result = with_timeout(&ctx, TimeoutPolicy::Abandon, "start", |_| async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_deadline_wins_over_slow_phase() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let result = with_timeout(&ctx, TimeoutPolicy::Abandon, "start", |_| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert_eq!(
            result.unwrap_err().context_error(),
            Some(ContextError::DeadlineExceeded)
        );
    }

    #[tokio::test]
    async fn test_abandoned_phase_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let ctx = Context::background();
        ctx.cancel();

        let result = with_timeout(&ctx, TimeoutPolicy::Abandon, "stop", move |_| async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert_eq!(
            result.unwrap_err().context_error(),
            Some(ContextError::Canceled)
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_aborted_phase_stops_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let ctx = Context::background();
        ctx.cancel();

        let result = with_timeout(&ctx, TimeoutPolicy::Abort, "stop", move |_| async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
