use crate::engine::{Engine, Readiness, FULL_CHAIN, VISIBLE_CHAIN};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::selectors::Locator;

impl Engine {
    pub async fn click(&self, locator: &Locator) -> Result<Outcome> {
        let step = self.step(
            format!("Clicking {}", locator),
            format!("{} is present, displayed, and enabled to be clicked", locator),
        );
        let element = match self.prepare(locator, FULL_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("click", locator, stage).await),
        };
        self.driver().click(&element).await?;
        Ok(step.pass(format!("Clicked {}", locator)).await)
    }

    pub async fn submit(&self, locator: &Locator) -> Result<Outcome> {
        let step = self.step(
            format!("Submitting {}", locator),
            format!("{} is present, displayed, and enabled to be submitted", locator),
        );
        let element = match self.prepare(locator, FULL_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("submit", locator, stage).await),
        };
        self.driver().submit(&element).await?;
        Ok(step.pass(format!("Submitted {}", locator)).await)
    }

    /// Move the pointer over the element. Disabled elements can be hovered.
    pub async fn hover(&self, locator: &Locator) -> Result<Outcome> {
        let step = self.step(
            format!("Hovering over {}", locator),
            format!("{} is present, and displayed to be hovered over", locator),
        );
        let element = match self.prepare(locator, VISIBLE_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => {
                return Ok(step.blocked("hover over", locator, stage).await)
            }
        };
        self.driver().hover(&element).await?;
        Ok(step.pass(format!("Hovered over {}", locator)).await)
    }
}
