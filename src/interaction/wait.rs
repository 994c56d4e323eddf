use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::driver::DialogKind;
use crate::engine::{capitalize, seconds, Engine};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::selectors::Locator;

/// A state an explicit wait can hold out for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Present,
    NotPresent,
    Displayed,
    NotDisplayed,
    Enabled,
    NotEnabled,
}

impl Condition {
    fn adjective(self) -> &'static str {
        match self {
            Self::Present | Self::NotPresent => "present",
            Self::Displayed | Self::NotDisplayed => "displayed",
            Self::Enabled | Self::NotEnabled => "enabled",
        }
    }

    fn negated(self) -> bool {
        matches!(self, Self::NotPresent | Self::NotDisplayed | Self::NotEnabled)
    }

    /// "to be present", "to not be enabled", ...
    fn goal(self) -> String {
        if self.negated() {
            format!("to not be {}", self.adjective())
        } else {
            format!("to be {}", self.adjective())
        }
    }

    fn state(self) -> String {
        if self.negated() {
            format!("is not {}", self.adjective())
        } else {
            format!("is {}", self.adjective())
        }
    }

    /// What the element still looks like when the wait gives up.
    fn stuck(self) -> String {
        if self.negated() {
            format!("is still {}", self.adjective())
        } else {
            format!("is not {}", self.adjective())
        }
    }
}

impl Engine {
    async fn condition_holds(&self, locator: &Locator, condition: Condition) -> Result<bool> {
        let positive = match condition {
            Condition::Present | Condition::NotPresent => self.is_present(locator).await?,
            Condition::Displayed | Condition::NotDisplayed => self.is_displayed(locator).await?,
            Condition::Enabled | Condition::NotEnabled => self.is_enabled(locator).await?,
        };
        Ok(positive != condition.negated())
    }

    /// Wait up to `timeout` (default budget when `None`) for `condition`,
    /// recording one outcome.
    ///
    /// Waits for display or enablement first wait, on their own budget, for
    /// the element to exist at all.
    pub async fn wait_for(
        &self,
        locator: &Locator,
        condition: Condition,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        let timeout = self.timeout(timeout);
        let step = self.step(
            format!(
                "Wait up to {} seconds for {} {}",
                seconds(timeout),
                locator,
                condition.goal()
            ),
            format!("{} {}", locator, condition.state()),
        );

        if matches!(condition, Condition::Displayed | Condition::Enabled)
            && !self.is_present(locator).await?
        {
            let present = self.wait_until(timeout, move || self.is_present(locator)).await?;
            if !present {
                let waited = seconds(step.elapsed());
                return Ok(step
                    .fail(format!(
                        "After waiting {} seconds for {} is not present",
                        waited, locator
                    ))
                    .await);
            }
        }

        let holds = self
            .wait_until(timeout, move || self.condition_holds(locator, condition))
            .await?;
        let waited = seconds(step.elapsed());
        if holds {
            Ok(step
                .pass(format!(
                    "Waited {} seconds for {} {}",
                    waited,
                    locator,
                    condition.goal()
                ))
                .await)
        } else {
            Ok(step
                .fail(format!(
                    "After waiting {} seconds for {} {}",
                    waited,
                    locator,
                    condition.stuck()
                ))
                .await)
        }
    }

    pub async fn wait_for_element_present(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::Present, timeout).await
    }

    pub async fn wait_for_element_not_present(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::NotPresent, timeout).await
    }

    pub async fn wait_for_element_displayed(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::Displayed, timeout).await
    }

    pub async fn wait_for_element_not_displayed(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::NotDisplayed, timeout).await
    }

    pub async fn wait_for_element_enabled(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::Enabled, timeout).await
    }

    pub async fn wait_for_element_not_enabled(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for(locator, Condition::NotEnabled, timeout).await
    }

    /// Wait for a native dialog. Any open dialog satisfies the wait; `kind`
    /// only shapes the wording.
    pub async fn wait_for_dialog(
        &self,
        kind: DialogKind,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        let timeout = self.timeout(timeout);
        let subject = format!("{} {}", kind.article(), kind);
        let step = self.step(
            format!(
                "Wait up to {} seconds for {} to be present",
                seconds(timeout),
                subject
            ),
            format!("{} is present", capitalize(&subject)),
        );

        let present = self
            .wait_until(timeout, move || self.is_dialog_present())
            .await?;
        let waited = seconds(step.elapsed());
        if present {
            Ok(step
                .pass(format!("Waited {} seconds for {} to be present", waited, subject))
                .await)
        } else {
            Ok(step
                .fail(format!(
                    "After waiting {} seconds, {} is not present",
                    waited, subject
                ))
                .await)
        }
    }

    pub async fn wait_for_alert_present(&self, timeout: Option<Duration>) -> Result<Outcome> {
        self.wait_for_dialog(DialogKind::Alert, timeout).await
    }

    pub async fn wait_for_confirmation_present(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Outcome> {
        self.wait_for_dialog(DialogKind::Confirmation, timeout).await
    }

    pub async fn wait_for_prompt_present(&self, timeout: Option<Duration>) -> Result<Outcome> {
        self.wait_for_dialog(DialogKind::Prompt, timeout).await
    }

    /// Sleep on the engine clock and record it.
    pub async fn pause(&self, duration: Duration) -> Result<Outcome> {
        let secs = seconds(duration);
        let step = self.step(
            format!("Wait {} seconds", secs),
            format!("Waited {} seconds", secs),
        );
        self.clock().sleep(duration).await;
        Ok(step.pass(format!("Waited {} seconds", secs)).await)
    }
}
