use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeLog, Status};

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ReadOutcomesParams {
    #[schemars(description = "Only return outcomes with this status: SUCCESS or FAILURE")]
    pub status: Option<Status>,
    #[schemars(description = "Clear the log after reading (default: false)")]
    pub clear: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub failures: usize,
    pub outcomes: Vec<Outcome>,
    pub checks: Vec<String>,
}

pub async fn read_outcomes(log: &OutcomeLog, params: &ReadOutcomesParams) -> Result<OutcomeReport> {
    let checks = log.expectations().await;
    let failures = log.failures().await;
    let outcomes = log.read(params.status, params.clear.unwrap_or(false)).await;
    Ok(OutcomeReport {
        failures,
        outcomes,
        checks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Recorder;
    use std::time::Duration;

    #[tokio::test]
    async fn test_report_counts_before_clearing() {
        let log = OutcomeLog::new();
        log.record_action(&Outcome::new("a", "b", "c", Status::Failure, Duration::ZERO))
            .await;
        log.record_action(&Outcome::new("d", "e", "f", Status::Success, Duration::ZERO))
            .await;

        let params = ReadOutcomesParams {
            status: Some(Status::Success),
            clear: Some(true),
        };
        let report = read_outcomes(&log, &params).await.unwrap();
        assert_eq!(report.failures, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(log.failures().await, 0);
    }
}
