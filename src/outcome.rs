use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Classification of a single outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Failure => f.write_str("FAILURE"),
        }
    }
}

/// The audit record produced by one guarded action or explicit wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    action: String,
    expected: String,
    actual: String,
    status: Status,
    elapsed_secs: f64,
}

impl Outcome {
    pub fn new(
        action: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        status: Status,
        elapsed: Duration,
    ) -> Self {
        Self {
            action: action.into(),
            expected: expected.into(),
            actual: actual.into(),
            status,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed_secs)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// 0 for SUCCESS, 1 for FAILURE, so steps can be summed into a test total.
    pub fn failures(&self) -> usize {
        match self.status {
            Status::Success => 0,
            Status::Failure => 1,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | expected: {} | actual: {}",
            self.status, self.action, self.expected, self.actual
        )
    }
}

/// Receives outcomes from the engine. Formatting, screenshots and report
/// files are the recorder's business.
#[async_trait]
pub trait Recorder: Send + Sync {
    async fn record_action(&self, outcome: &Outcome);

    /// Note an explicit state check made by the test.
    async fn record_expected(&self, expected: &str);
}

/// Shared in-memory outcome storage.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    pub entries: Arc<Mutex<Vec<Outcome>>>,
    pub expectations: Arc<Mutex<Vec<String>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outcomes(&self) -> Vec<Outcome> {
        self.entries.lock().await.clone()
    }

    pub async fn expectations(&self) -> Vec<String> {
        self.expectations.lock().await.clone()
    }

    /// Total failures recorded so far.
    pub async fn failures(&self) -> usize {
        self.entries.lock().await.iter().map(Outcome::failures).sum()
    }

    pub async fn read(&self, status: Option<Status>, clear: bool) -> Vec<Outcome> {
        let mut entries = self.entries.lock().await;
        let filtered: Vec<Outcome> = entries
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();

        if clear {
            entries.clear();
            self.expectations.lock().await.clear();
        }

        filtered
    }
}

#[async_trait]
impl Recorder for OutcomeLog {
    async fn record_action(&self, outcome: &Outcome) {
        match outcome.status {
            Status::Success => tracing::info!("{}", outcome),
            Status::Failure => tracing::warn!("{}", outcome),
        }
        self.entries.lock().await.push(outcome.clone());
    }

    async fn record_expected(&self, expected: &str) {
        tracing::info!("[CHECK] {}", expected);
        self.expectations.lock().await.push(expected.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: Status) -> Outcome {
        Outcome::new(
            "Clicking id go",
            "id go is present, displayed, and enabled to be clicked",
            "Clicked id go",
            status,
            Duration::from_millis(1500),
        )
    }

    #[test]
    fn test_failure_count() {
        assert_eq!(sample(Status::Success).failures(), 0);
        assert_eq!(sample(Status::Failure).failures(), 1);
        assert_eq!(sample(Status::Failure).elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_serializes_status_in_caps() {
        let json = serde_json::to_value(sample(Status::Failure)).unwrap();
        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["elapsed_secs"], 1.5);
    }

    #[tokio::test]
    async fn test_log_filters_and_clears() {
        let log = OutcomeLog::new();
        log.record_action(&sample(Status::Success)).await;
        log.record_action(&sample(Status::Failure)).await;
        log.record_expected("Checking for id go to be present").await;

        assert_eq!(log.failures().await, 1);
        assert_eq!(log.read(Some(Status::Failure), false).await.len(), 1);
        assert_eq!(log.expectations().await.len(), 1);

        let all = log.read(None, true).await;
        assert_eq!(all.len(), 2);
        assert!(log.outcomes().await.is_empty());
        assert!(log.expectations().await.is_empty());
    }
}
