use crate::engine::{Engine, Readiness, FULL_CHAIN};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::selectors::Locator;

impl Engine {
    /// Append `text` to the element's current value.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<Outcome> {
        let step = self.step(
            format!("Typing text '{}' in {}", text, locator),
            format!(
                "{} is present, displayed, and enabled to have text {} typed in",
                locator, text
            ),
        );
        let element = match self.prepare(locator, FULL_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("type in", locator, stage).await),
        };
        self.driver().send_keys(&element, text).await?;
        Ok(step
            .pass(format!("Typed text '{}' in {}", text, locator))
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::driver::memory::{MemoryDriver, MemoryElement};
    use crate::outcome::{OutcomeLog, Status};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_type_appends_to_value() {
        let clock = ManualClock::new();
        let driver = Arc::new(MemoryDriver::new(clock.clone()));
        let engine = Engine::new(driver.clone(), Arc::new(OutcomeLog::new()))
            .with_clock(Arc::new(clock));
        let field = driver.add(MemoryElement::new("input").with_id("q").with_value("rust "));

        let outcome = engine.type_text(&Locator::id("q"), "async").await.unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert_eq!(outcome.action(), "Typing text 'async' in id q");
        assert_eq!(driver.value(field), "rust async");
    }

    #[tokio::test]
    async fn test_type_into_disabled_field_fails() {
        let clock = ManualClock::new();
        let driver = Arc::new(MemoryDriver::new(clock.clone()));
        let engine = Engine::new(driver.clone(), Arc::new(OutcomeLog::new()))
            .with_clock(Arc::new(clock));
        let field = driver.add(MemoryElement::new("input").with_id("q").disabled());

        let outcome = engine.type_text(&Locator::id("q"), "x").await.unwrap();
        assert_eq!(outcome.actual(), "Unable to type in id q as it is not enabled");
        assert_eq!(driver.value(field), "");
    }
}
