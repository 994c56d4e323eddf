use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::driver::{BrowserDriver, ElementHandle};
use crate::error::{DriverError, Result};
use crate::outcome::{Outcome, Recorder, Status};
use crate::poll::{poll_until, PollOutcome};
use crate::selectors::{locate, Locator};

/// Timing knobs shared by every wait the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// Budget for each implicit wait inside a guarded action.
    pub default_timeout: Duration,
    /// Pause between two samples of a condition.
    pub poll_interval: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// One precondition in a guarded action's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Present,
    Displayed,
    Enabled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Displayed => "displayed",
            Self::Enabled => "enabled",
        })
    }
}

/// Click, submit, type and select.
pub const FULL_CHAIN: &[Stage] = &[Stage::Present, Stage::Displayed, Stage::Enabled];
/// Hover.
pub const VISIBLE_CHAIN: &[Stage] = &[Stage::Present, Stage::Displayed];
/// Move.
pub const PRESENT_CHAIN: &[Stage] = &[Stage::Present];

/// Where a precondition chain ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Every stage passed; the handle was resolved after the last wait.
    Ready(ElementHandle),
    /// This stage was still unmet when its wait ran out.
    Blocked(Stage),
}

/// A guarded-action engine bound to one browser session.
///
/// Each test execution owns its own engine. Cloning is cheap and shares the
/// driver, recorder and clock.
#[derive(Clone)]
pub struct Engine {
    driver: Arc<dyn BrowserDriver>,
    recorder: Arc<dyn Recorder>,
    clock: Arc<dyn Clock>,
    config: GuardConfig,
}

impl Engine {
    pub fn new(driver: Arc<dyn BrowserDriver>, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            driver,
            recorder,
            clock: Arc::new(SystemClock::new()),
            config: GuardConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    pub fn recorder(&self) -> &dyn Recorder {
        self.recorder.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub(crate) fn timeout(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.config.default_timeout)
    }

    pub(crate) async fn poll<F, Fut>(&self, timeout: Duration, predicate: F) -> Result<PollOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        poll_until(self.clock(), timeout, self.config.poll_interval, predicate).await
    }

    /// Poll `predicate` for up to `timeout`, then decide on one last sample
    /// if the poll ran out. A zero timeout is a single check.
    pub(crate) async fn wait_until<F, Fut>(&self, timeout: Duration, mut predicate: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        if self.poll(timeout, &mut predicate).await?.satisfied {
            return Ok(true);
        }
        match predicate().await {
            Err(err) if err.is_not_ready() => Ok(false),
            other => other,
        }
    }

    /// Poll `predicate` with the default budget unless it already holds.
    pub(crate) async fn settle<F, Fut>(&self, mut predicate: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        if predicate().await? {
            return Ok(true);
        }
        Ok(self
            .poll(self.config.default_timeout, predicate)
            .await?
            .satisfied)
    }

    async fn stage_holds(&self, locator: &Locator, stage: Stage) -> Result<bool> {
        match stage {
            Stage::Present => self.is_present(locator).await,
            Stage::Displayed => self.is_displayed(locator).await,
            Stage::Enabled => self.is_enabled(locator).await,
        }
    }

    /// Walk `chain` in order, waiting out each unmet stage with a fresh
    /// default budget, and resolve the element anew once all stages pass.
    pub async fn prepare(&self, locator: &Locator, chain: &[Stage]) -> Result<Readiness> {
        for &stage in chain {
            let held = self
                .settle(move || self.stage_holds(locator, stage))
                .await?;
            if !held {
                tracing::debug!("{} is still not {}", locator, stage);
                return Ok(Readiness::Blocked(stage));
            }
            tracing::debug!("{} is {}", locator, stage);
        }

        match locate(self.driver(), locator).await? {
            Some(element) => Ok(Readiness::Ready(element)),
            None => Err(DriverError::NoSuchElement(locator.to_string()).into()),
        }
    }

    /// Start timing an action that will produce one outcome.
    pub(crate) fn step(&self, action: impl Into<String>, expected: impl Into<String>) -> Step<'_> {
        Step {
            engine: self,
            action: action.into(),
            expected: expected.into(),
            started: self.clock.now(),
        }
    }
}

/// An action in flight. Consumed by [`Step::pass`] or [`Step::fail`], which
/// hand the finished outcome to the recorder.
pub(crate) struct Step<'e> {
    engine: &'e Engine,
    action: String,
    expected: String,
    started: Duration,
}

impl Step<'_> {
    pub(crate) fn elapsed(&self) -> Duration {
        self.engine.clock.now().saturating_sub(self.started)
    }

    pub(crate) async fn pass(self, actual: impl Into<String>) -> Outcome {
        self.finish(actual.into(), Status::Success).await
    }

    pub(crate) async fn fail(self, actual: impl Into<String>) -> Outcome {
        self.finish(actual.into(), Status::Failure).await
    }

    /// FAILURE for a DOM action whose precondition chain stopped at `stage`.
    pub(crate) async fn blocked(self, verb: &str, locator: &Locator, stage: Stage) -> Outcome {
        self.fail(format!(
            "Unable to {} {} as it is not {}",
            verb, locator, stage
        ))
        .await
    }

    pub(crate) async fn finish(self, actual: String, status: Status) -> Outcome {
        let elapsed = self.elapsed();
        let outcome = Outcome::new(self.action, self.expected, actual, status, elapsed);
        self.engine.recorder.record_action(&outcome).await;
        outcome
    }
}

/// Seconds with up to millisecond precision, e.g. `1.0`, `0.25`.
pub(crate) fn seconds(duration: Duration) -> String {
    let mut text = format!("{:.3}", duration.as_secs_f64());
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.push('0');
    }
    text
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
