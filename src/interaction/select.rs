use crate::engine::{Engine, Readiness, FULL_CHAIN};
use crate::error::{GuardError, Result};
use crate::outcome::Outcome;
use crate::selectors::{locate, Locator};

impl Engine {
    /// Click every option whose visible text equals `text` exactly.
    ///
    /// Several options with the same text are all clicked. When none match,
    /// nothing is clicked and the outcome is still SUCCESS.
    pub async fn select(&self, locator: &Locator, text: &str) -> Result<Outcome> {
        let step = self.step(
            format!("Selecting {} in {}", text, locator),
            format!(
                "{} is present, displayed, and enabled to have the value {} selected",
                locator, text
            ),
        );
        let element = match self.prepare(locator, FULL_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("select", locator, stage).await),
        };

        let mut matched = 0;
        for option in self.driver().find_children(&element, "option").await? {
            if self.driver().text(&option).await? == text {
                self.driver().click(&option).await?;
                matched += 1;
            }
        }
        if matched == 0 {
            tracing::warn!("No option of {} has the text '{}'", locator, text);
        }

        Ok(step
            .pass(format!("Selected {} in {}", text, locator))
            .await)
    }

    /// Select the option at `index` (0-based, document order).
    ///
    /// An index past the last option is a caller error and records nothing.
    pub async fn select_index(&self, locator: &Locator, index: usize) -> Result<Outcome> {
        let step = self.step(
            format!("Selecting option {} in {}", index, locator),
            format!(
                "{} is present, displayed, and enabled to have option {} selected",
                locator, index
            ),
        );
        let element = match self.prepare(locator, FULL_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("select", locator, stage).await),
        };

        let options = self.driver().find_children(&element, "option").await?;
        let option = options
            .get(index)
            .ok_or_else(|| GuardError::OptionIndexOutOfRange {
                locator: locator.to_string(),
                index,
                available: options.len(),
            })?;
        let label = self.driver().text(option).await?;
        self.driver().click(option).await?;

        Ok(step
            .pass(format!("Selected {} in {}", label, locator))
            .await)
    }

    /// The `value` attribute of every option, waiting quietly for the list to
    /// appear. Empty when it never does.
    pub async fn select_options(&self, locator: &Locator) -> Result<Vec<String>> {
        if !self.settle(move || self.is_present(locator)).await? {
            return Ok(Vec::new());
        }
        let Some(element) = locate(self.driver(), locator).await? else {
            return Ok(Vec::new());
        };

        let mut values = Vec::new();
        for option in self.driver().find_children(&element, "option").await? {
            values.push(
                self.driver()
                    .attribute(&option, "value")
                    .await?
                    .unwrap_or_default(),
            );
        }
        Ok(values)
    }

    pub async fn select_option_count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.select_options(locator).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::driver::memory::{MemoryDriver, MemoryElement};
    use crate::outcome::OutcomeLog;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (ManualClock, Arc<MemoryDriver>, OutcomeLog, Engine) {
        let clock = ManualClock::new();
        let driver = Arc::new(MemoryDriver::new(clock.clone()));
        let log = OutcomeLog::new();
        let engine = Engine::new(driver.clone(), Arc::new(log.clone()))
            .with_clock(Arc::new(clock.clone()));
        (clock, driver, log, engine)
    }

    fn colors() -> MemoryElement {
        MemoryElement::select("colorPicker")
            .with_option("Red", "r")
            .with_option("Green", "g")
    }

    #[tokio::test]
    async fn test_select_matches_visible_text_not_value() {
        let (_clock, driver, _log, engine) = setup();
        let picker = driver.add(colors());

        engine.select(&Locator::id("colorPicker"), "g").await.unwrap();
        assert_eq!(driver.option_clicks(picker), vec![0, 0]);

        engine.select(&Locator::id("colorPicker"), "Green").await.unwrap();
        assert_eq!(driver.option_clicks(picker), vec![0, 1]);
        assert_eq!(driver.selected_options(picker), vec!["Green".to_string()]);
    }

    #[tokio::test]
    async fn test_select_index_out_of_range_is_configuration_error() {
        let (_clock, driver, log, engine) = setup();
        driver.add(colors());

        let err = engine
            .select_index(&Locator::id("colorPicker"), 2)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err,
            GuardError::OptionIndexOutOfRange {
                locator: "id colorPicker".into(),
                index: 2,
                available: 2,
            }
        );
        assert!(log.outcomes().await.is_empty());
    }

    #[tokio::test]
    async fn test_select_index_clicks_that_option() {
        let (_clock, driver, _log, engine) = setup();
        let picker = driver.add(colors());

        let outcome = engine.select_index(&Locator::id("colorPicker"), 1).await.unwrap();
        assert_eq!(outcome.actual(), "Selected Green in id colorPicker");
        assert_eq!(driver.option_clicks(picker), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_select_options_waits_then_gives_up_quietly() {
        let (clock, driver, log, engine) = setup();
        driver.add(colors().appears_after(Duration::from_secs(1)));

        let values = engine.select_options(&Locator::id("colorPicker")).await.unwrap();
        assert_eq!(values, vec!["r".to_string(), "g".to_string()]);
        assert_eq!(clock.now(), Duration::from_secs(1));

        let count = engine.select_option_count(&Locator::id("absent")).await.unwrap();
        assert_eq!(count, 0);
        assert!(log.outcomes().await.is_empty());
    }
}
