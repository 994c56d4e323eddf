use std::future::Future;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::Result;

/// Result of one bounded polling attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOutcome {
    pub satisfied: bool,
    /// Time spent polling, always within `[0, timeout]`.
    pub elapsed: Duration,
}

impl PollOutcome {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Evaluate `predicate` until it returns `true` or `timeout` runs out.
///
/// Errors the predicate marks as not-ready (element missing, stale handle,
/// no dialog yet) count as `false` and polling continues. Any other error
/// ends the poll and is returned to the caller.
///
/// Between samples the clock sleeps for `interval`, capped at the time left
/// before the deadline, so the total wait never exceeds `timeout`.
pub async fn poll_until<F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut predicate: F,
) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = clock.now() + timeout;
    let mut satisfied = false;

    while clock.now() < deadline {
        match predicate().await {
            Ok(true) => {
                satisfied = true;
                break;
            }
            Ok(false) => {}
            Err(err) if err.is_not_ready() => {
                tracing::trace!("Still waiting: {}", err);
            }
            Err(err) => return Err(err),
        }

        let remaining = deadline.saturating_sub(clock.now());
        if remaining.is_zero() {
            break;
        }
        clock.sleep(interval.min(remaining)).await;
    }

    let remaining = deadline.saturating_sub(clock.now());
    let elapsed = timeout.saturating_sub(remaining);
    tracing::debug!(
        "Poll finished: satisfied={} after {:.3}s",
        satisfied,
        elapsed.as_secs_f64()
    );
    Ok(PollOutcome { satisfied, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{DriverError, GuardError};
    use std::cell::Cell;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_returns_immediately_when_true() {
        let clock = ManualClock::new();
        let outcome = poll_until(&clock, Duration::from_secs(5), INTERVAL, || async {
            Ok::<bool, GuardError>(true)
        })
        .await
        .unwrap();
        assert!(outcome.satisfied);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_stops_at_first_true_sample() {
        let clock = ManualClock::new();
        let watch = clock.clone();
        let outcome = poll_until(&clock, Duration::from_secs(2), INTERVAL, || {
            let ready = watch.now() >= Duration::from_secs(1);
            async move { Ok::<bool, GuardError>(ready) }
        })
        .await
        .unwrap();
        assert!(outcome.satisfied);
        assert_eq!(outcome.elapsed, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_times_out_with_elapsed_clamped() {
        let clock = ManualClock::new();
        let interval = Duration::from_millis(300);
        let outcome = poll_until(&clock, Duration::from_secs(1), interval, || async {
            Ok::<bool, GuardError>(false)
        })
        .await
        .unwrap();
        assert!(!outcome.satisfied);
        assert_eq!(outcome.elapsed, Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_zero_timeout_never_samples() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let outcome = poll_until(&clock, Duration::ZERO, INTERVAL, || {
            calls.set(calls.get() + 1);
            async { Ok::<bool, GuardError>(true) }
        })
        .await
        .unwrap();
        assert!(!outcome.satisfied);
        assert_eq!(outcome.elapsed, Duration::ZERO);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_not_ready_errors_are_swallowed() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let outcome = poll_until(&clock, Duration::from_secs(1), INTERVAL, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(GuardError::from(DriverError::NoSuchElement("id late".into())))
                } else {
                    Ok(true)
                }
            }
        })
        .await
        .unwrap();
        assert!(outcome.satisfied);
        assert_eq!(calls.get(), 3);
        assert_eq!(outcome.elapsed, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let clock = ManualClock::new();
        let err = poll_until(&clock, Duration::from_secs(1), INTERVAL, || async {
            Err::<bool, GuardError>(DriverError::Session("browser crashed".into()).into())
        })
        .await
        .unwrap_err();
        assert_eq!(err, GuardError::Driver(DriverError::Session("browser crashed".into())));
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_interval_still_terminates() {
        let clock = ManualClock::new();
        let outcome = poll_until(&clock, Duration::from_millis(50), Duration::ZERO, || async {
            Ok::<bool, GuardError>(false)
        })
        .await
        .unwrap();
        assert!(!outcome.satisfied);
        assert_eq!(outcome.elapsed, Duration::from_millis(50));
    }
}
