//! Shared fixtures for lifecycle integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use startstop::{Closer, Component, Context, Opener, Starter, Step, Stopper};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered record of completed lifecycle calls ("start db", "close api", ...)
pub type Journal = Arc<Mutex<Vec<String>>>;

pub const ALL_STEPS: [Step; 4] = [Step::Open, Step::Start, Step::Stop, Step::Close];

/// Component that journals each call it completes.
///
/// A configured delay is slept without looking at the context, to model a
/// call that ignores cancellation. A traced recorder also journals
/// "begin start db" before the delay.
pub struct Recorder {
    name: String,
    journal: Journal,
    steps: Vec<Step>,
    fail: Option<Step>,
    delay: Duration,
    traced: bool,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
            steps: ALL_STEPS.to_vec(),
            fail: None,
            delay: Duration::ZERO,
            traced: false,
        }
    }

    pub fn steps(mut self, steps: &[Step]) -> Self {
        self.steps = steps.to_vec();
        self
    }

    pub fn failing(mut self, step: Step) -> Self {
        self.fail = Some(step);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn traced(mut self) -> Self {
        self.traced = true;
        self
    }

    fn record(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }

    async fn call(&self, step: Step) -> anyhow::Result<()> {
        if self.traced {
            self.record(format!("begin {} {}", step, self.name));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.record(format!("{} {}", step, self.name));
        if self.fail == Some(step) {
            anyhow::bail!("{} {} failed", self.name, step);
        }
        Ok(())
    }

    fn provides(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }
}

#[async_trait]
impl Opener for Recorder {
    async fn open(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Open).await
    }
}

#[async_trait]
impl Starter for Recorder {
    async fn start(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Start).await
    }
}

#[async_trait]
impl Stopper for Recorder {
    async fn stop(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Stop).await
    }
}

#[async_trait]
impl Closer for Recorder {
    async fn close(&self, _ctx: &Context) -> anyhow::Result<()> {
        self.call(Step::Close).await
    }
}

impl Component for Recorder {
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

/// Value object without lifecycle capabilities
pub struct Plain;

impl Component for Plain {}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn clear(journal: &Journal) {
    journal.lock().unwrap().clear();
}

/// Index of `entry` in the journal, panicking when absent
pub fn position(entries: &[String], entry: &str) -> usize {
    entries
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("'{}' missing from {:?}", entry, entries))
}

/// Deterministic pseudo-random numbers for generated graphs
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}
