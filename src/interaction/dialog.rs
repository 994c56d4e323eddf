use crate::driver::{Dialog, DialogKind};
use crate::engine::{capitalize, Engine};
use crate::error::{DriverError, DriverResult, Result};
use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy)]
enum Response<'a> {
    Accept,
    Dismiss,
    Type(&'a str),
}

impl Engine {
    /// Two-stage dialog action: wait for a dialog, then respond. Focus goes
    /// back to the document whether or not the response worked.
    async fn respond(&self, kind: DialogKind, response: Response<'_>) -> Result<Outcome> {
        let (action, expected, success) = match response {
            Response::Type(text) => (
                format!("Typing text '{}' into {}", text, kind),
                format!(
                    "{} is present and enabled to have text {} typed in",
                    capitalize(kind.noun()),
                    text
                ),
                format!("Typed text '{}' into {}", text, kind),
            ),
            Response::Accept | Response::Dismiss => {
                let button = if matches!(response, Response::Accept) {
                    "OK"
                } else {
                    "Cancel"
                };
                (
                    format!("Clicking '{}' on {} {}", button, kind.article(), kind),
                    format!("{} is present to be clicked", capitalize(kind.noun())),
                    format!("Clicked '{}' on the {}", button, kind),
                )
            }
        };
        let step = self.step(action, expected);

        if !self.settle(move || self.is_dialog_present()).await? {
            let verb = match response {
                Response::Type(_) => "type in",
                Response::Accept | Response::Dismiss => "click",
            };
            return Ok(step
                .fail(format!("Unable to {} {} as it is not present", verb, kind))
                .await);
        }

        let attempt = self.apply(response).await;
        let restored = self.driver().switch_to_default_content().await;
        attempt?;
        restored?;
        Ok(step.pass(success).await)
    }

    async fn apply(&self, response: Response<'_>) -> DriverResult<()> {
        let driver = self.driver();
        if driver.switch_to_dialog().await?.is_none() {
            return Err(DriverError::NoDialogOpen);
        }
        match response {
            Response::Accept => driver.accept_dialog().await,
            Response::Dismiss => driver.dismiss_dialog().await,
            Response::Type(text) => driver.send_keys_to_dialog(text).await,
        }
    }

    pub async fn accept_alert(&self) -> Result<Outcome> {
        self.respond(DialogKind::Alert, Response::Accept).await
    }

    pub async fn accept_confirmation(&self) -> Result<Outcome> {
        self.respond(DialogKind::Confirmation, Response::Accept).await
    }

    pub async fn dismiss_confirmation(&self) -> Result<Outcome> {
        self.respond(DialogKind::Confirmation, Response::Dismiss).await
    }

    pub async fn accept_prompt(&self) -> Result<Outcome> {
        self.respond(DialogKind::Prompt, Response::Accept).await
    }

    pub async fn dismiss_prompt(&self) -> Result<Outcome> {
        self.respond(DialogKind::Prompt, Response::Dismiss).await
    }

    /// Type into the open prompt. The text is submitted when the prompt is
    /// accepted.
    pub async fn type_into_prompt(&self, text: &str) -> Result<Outcome> {
        self.respond(DialogKind::Prompt, Response::Type(text)).await
    }

    /// The open dialog, after a quiet wait with the default budget.
    pub async fn current_dialog(&self) -> Result<Option<Dialog>> {
        if !self.settle(move || self.is_dialog_present()).await? {
            return Ok(None);
        }
        let found = self.driver().switch_to_dialog().await;
        self.driver().switch_to_default_content().await?;
        match found {
            Ok(dialog) => Ok(dialog),
            Err(err) if err.is_not_ready() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn alert_text(&self) -> Result<Option<String>> {
        Ok(self.current_dialog().await?.map(|d| d.message))
    }

    pub async fn confirmation_text(&self) -> Result<Option<String>> {
        Ok(self.current_dialog().await?.map(|d| d.message))
    }

    pub async fn prompt_text(&self) -> Result<Option<String>> {
        Ok(self.current_dialog().await?.map(|d| d.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::driver::memory::MemoryDriver;
    use crate::outcome::{OutcomeLog, Status};
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (ManualClock, Arc<MemoryDriver>, Engine) {
        let clock = ManualClock::new();
        let driver = Arc::new(MemoryDriver::new(clock.clone()));
        let engine = Engine::new(driver.clone(), Arc::new(OutcomeLog::new()))
            .with_clock(Arc::new(clock.clone()));
        (clock, driver, engine)
    }

    #[tokio::test]
    async fn test_accept_alert_wording() {
        let (_clock, driver, engine) = setup();
        driver.open_dialog(DialogKind::Alert, "Saved");

        let outcome = engine.accept_alert().await.unwrap();
        assert_eq!(outcome.action(), "Clicking 'OK' on an alert");
        assert_eq!(outcome.expected(), "Alert is present to be clicked");
        assert_eq!(outcome.actual(), "Clicked 'OK' on the alert");
        assert!(!driver.dialog_focused());
    }

    #[tokio::test]
    async fn test_dismiss_confirmation_waits_for_it() {
        let (clock, driver, engine) = setup();
        driver.open_dialog_after(DialogKind::Confirmation, "Delete?", Duration::from_secs(2));

        let outcome = engine.dismiss_confirmation().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(clock.now(), Duration::from_secs(2));
        assert!(!driver.handled_dialogs()[0].accepted);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_a_failure() {
        let (_clock, driver, engine) = setup();

        let outcome = engine.type_into_prompt("Ada").await.unwrap();
        assert_eq!(outcome.status(), Status::Failure);
        assert_eq!(outcome.actual(), "Unable to type in prompt as it is not present");
        assert!(!driver.dialog_focused());
        assert_eq!(engine.prompt_text().await.unwrap(), None);
    }
}
