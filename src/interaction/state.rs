use crate::engine::Engine;
use crate::error::Result;
use crate::selectors::{locate, Locator};

/// Treat "not yet there" as a plain `false`.
fn absent_is_false(result: Result<bool>) -> Result<bool> {
    match result {
        Err(err) if err.is_not_ready() => Ok(false),
        other => other,
    }
}

#[derive(Debug, Clone, Copy)]
enum ElementState {
    Displayed,
    InView,
    Enabled,
    Selected,
}

impl Engine {
    async fn element_state(&self, locator: &Locator, state: ElementState) -> Result<bool> {
        let element = match locate(self.driver(), locator).await {
            Ok(Some(element)) => element,
            Ok(None) => return Ok(false),
            Err(err) => return absent_is_false(Err(err)),
        };
        let driver = self.driver();
        let read = match state {
            ElementState::Displayed => driver.is_displayed(&element).await,
            ElementState::InView => driver.is_in_view(&element).await,
            ElementState::Enabled => driver.is_enabled(&element).await,
            ElementState::Selected => driver.is_selected(&element).await,
        };
        absent_is_false(read.map_err(Into::into))
    }

    pub async fn is_present(&self, locator: &Locator) -> Result<bool> {
        absent_is_false(
            locate(self.driver(), locator)
                .await
                .map(|found| found.is_some()),
        )
    }

    pub async fn is_displayed(&self, locator: &Locator) -> Result<bool> {
        self.element_state(locator, ElementState::Displayed).await
    }

    /// Displayed and within the visible part of the page.
    pub async fn is_on_screen(&self, locator: &Locator) -> Result<bool> {
        self.element_state(locator, ElementState::InView).await
    }

    pub async fn is_enabled(&self, locator: &Locator) -> Result<bool> {
        self.element_state(locator, ElementState::Enabled).await
    }

    pub async fn is_checked(&self, locator: &Locator) -> Result<bool> {
        self.element_state(locator, ElementState::Selected).await
    }

    /// Whether any native dialog is open. Focus is back on the document
    /// afterwards.
    pub async fn is_dialog_present(&self) -> Result<bool> {
        let found = self.driver().switch_to_dialog().await;
        self.driver().switch_to_default_content().await?;
        absent_is_false(found.map(|dialog| dialog.is_some()).map_err(Into::into))
    }

    pub async fn is_alert_present(&self) -> Result<bool> {
        self.is_dialog_present().await
    }

    pub async fn is_confirmation_present(&self) -> Result<bool> {
        self.is_dialog_present().await
    }

    pub async fn is_prompt_present(&self) -> Result<bool> {
        self.is_dialog_present().await
    }

    pub async fn check_present(&self, locator: &Locator) -> Result<bool> {
        self.note_check(format!("Checking for {} to be present", locator))
            .await;
        self.is_present(locator).await
    }

    pub async fn check_displayed(&self, locator: &Locator) -> Result<bool> {
        self.note_check(format!("Checking for {} to be displayed", locator))
            .await;
        self.is_displayed(locator).await
    }

    pub async fn check_enabled(&self, locator: &Locator) -> Result<bool> {
        self.note_check(format!("Checking for {} to be enabled", locator))
            .await;
        self.is_enabled(locator).await
    }

    pub async fn check_checked(&self, locator: &Locator) -> Result<bool> {
        self.note_check(format!("Checking for {} to be checked", locator))
            .await;
        self.is_checked(locator).await
    }

    pub async fn check_alert_present(&self) -> Result<bool> {
        self.note_check("Checking for alert to be present".to_string())
            .await;
        self.is_alert_present().await
    }

    pub async fn check_confirmation_present(&self) -> Result<bool> {
        self.note_check("Checking for confirmation to be present".to_string())
            .await;
        self.is_confirmation_present().await
    }

    pub async fn check_prompt_present(&self) -> Result<bool> {
        self.note_check("Checking for prompt to be present".to_string())
            .await;
        self.is_prompt_present().await
    }

    async fn note_check(&self, expected: String) {
        self.recorder().record_expected(&expected).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::driver::memory::{MemoryDriver, MemoryElement};
    use crate::driver::DialogKind;
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

    #[tokio::test]
    async fn test_absent_element_is_negative_everywhere() {
        let (_clock, _driver, _log, engine) = setup();
        let missing = Locator::id("missing");
        assert!(!engine.is_present(&missing).await.unwrap());
        assert!(!engine.is_displayed(&missing).await.unwrap());
        assert!(!engine.is_enabled(&missing).await.unwrap());
        assert!(!engine.is_checked(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_checks_are_idempotent() {
        let (_clock, driver, _log, engine) = setup();
        driver.add(MemoryElement::new("input").with_id("agree").checked().hidden());
        let agree = Locator::id("agree");
        for _ in 0..3 {
            assert!(engine.is_present(&agree).await.unwrap());
            assert!(!engine.is_displayed(&agree).await.unwrap());
            assert!(engine.is_checked(&agree).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_displayed_ignores_scroll_position() {
        let (_clock, driver, _log, engine) = setup();
        driver.add(MemoryElement::new("button").with_id("far").below_fold(2000));
        let far = Locator::id("far");
        assert!(engine.is_displayed(&far).await.unwrap());
        assert!(!engine.is_on_screen(&far).await.unwrap());

        engine.scroll(1800).await.unwrap();
        assert!(engine.is_on_screen(&far).await.unwrap());
    }

    #[tokio::test]
    async fn test_state_follows_element_timeline() {
        let (clock, driver, _log, engine) = setup();
        driver.add(
            MemoryElement::new("div")
                .with_id("banner")
                .hidden_after(Duration::from_secs(1))
                .disabled_after(Duration::from_secs(2)),
        );
        let banner = Locator::id("banner");
        assert!(engine.is_displayed(&banner).await.unwrap());
        assert!(engine.is_enabled(&banner).await.unwrap());

        clock.advance(Duration::from_secs(1));
        assert!(!engine.is_displayed(&banner).await.unwrap());
        assert!(engine.is_enabled(&banner).await.unwrap());

        clock.advance(Duration::from_secs(1));
        assert!(!engine.is_enabled(&banner).await.unwrap());
        assert!(engine.is_present(&banner).await.unwrap());
    }

    #[tokio::test]
    async fn test_logging_forms_note_the_check() {
        let (_clock, driver, log, engine) = setup();
        driver.add(MemoryElement::new("button").with_id("go"));
        assert!(engine.check_present(&Locator::id("go")).await.unwrap());
        assert!(!engine.check_alert_present().await.unwrap());

        let expectations = log.expectations().await;
        assert_eq!(
            expectations,
            vec![
                "Checking for id go to be present".to_string(),
                "Checking for alert to be present".to_string(),
            ]
        );
        assert!(log.outcomes().await.is_empty());
    }

    #[tokio::test]
    async fn test_dialog_check_restores_focus() {
        let (clock, driver, _log, engine) = setup();
        driver.open_dialog_after(DialogKind::Confirmation, "Sure?", Duration::from_secs(1));
        assert!(!engine.is_confirmation_present().await.unwrap());

        clock.advance(Duration::from_secs(1));
        assert!(engine.is_prompt_present().await.unwrap());
        assert!(!driver.dialog_focused());
    }

    #[tokio::test]
    async fn test_session_errors_are_not_masked() {
        let (_clock, driver, _log, engine) = setup();
        driver.lose_session();
        assert!(engine.is_present(&Locator::id("go")).await.is_err());
    }
}
