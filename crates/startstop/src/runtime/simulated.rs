//! Stand-in components for manifests and dry runs

use async_trait::async_trait;
use std::time::Duration;

use super::component::{Closer, Component, Opener, Starter, Step, Stopper};
use super::context::Context;

/// A component that takes `delay` per call and can be told to fail one step.
#[derive(Debug, Clone)]
pub struct SimulatedComponent {
    name: String,
    steps: Vec<Step>,
    delay: Duration,
    fail: Option<Step>,
}

impl SimulatedComponent {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            delay: Duration::ZERO,
            fail: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_failure(mut self, step: Option<Step>) -> Self {
        self.fail = step;
        self
    }

    fn provides(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }

    async fn call(&self, step: Step, ctx: &Context) -> anyhow::Result<()> {
        log::info!("[{}] {}", self.name, step.progressive());

        if !self.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                err = ctx.done() => {
                    return Err(anyhow::Error::new(err).context(format!("{} interrupted", step)));
                }
            }
        }

        if self.fail == Some(step) {
            anyhow::bail!("simulated {} failure", step);
        }
        Ok(())
    }
}

#[async_trait]
impl Opener for SimulatedComponent {
    async fn open(&self, ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Open, ctx).await
    }
}

#[async_trait]
impl Starter for SimulatedComponent {
    async fn start(&self, ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Start, ctx).await
    }
}

#[async_trait]
impl Stopper for SimulatedComponent {
    async fn stop(&self, ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Stop, ctx).await
    }
}

#[async_trait]
impl Closer for SimulatedComponent {
    async fn close(&self, ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Close, ctx).await
    }
}

impl Component for SimulatedComponent {
    fn as_opener(&self) -> Option<&dyn Opener> {
        self.provides(Step::Open).then_some(self as &dyn Opener)
    }

    fn as_closer(&self) -> Option<&dyn Closer> {
        self.provides(Step::Close).then_some(self as &dyn Closer)
    }

    fn as_starter(&self) -> Option<&dyn Starter> {
        self.provides(Step::Start).then_some(self as &dyn Starter)
    }

    fn as_stopper(&self) -> Option<&dyn Stopper> {
        self.provides(Step::Stop).then_some(self as &dyn Stopper)
    }
}
