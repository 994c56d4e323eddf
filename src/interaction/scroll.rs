use serde_json::Value;

use crate::driver::scripts;
use crate::engine::{Engine, Readiness, Step, PRESENT_CHAIN};
use crate::error::{DriverError, Result};
use crate::outcome::{Outcome, Status};
use crate::selectors::Locator;

impl Engine {
    /// Scroll the element into view. Succeeds only if it is inside the
    /// viewport afterwards.
    pub async fn move_to(&self, locator: &Locator) -> Result<Outcome> {
        let step = self.step(
            format!("Moving screen to {}", locator),
            format!("{} is now present on the visible page", locator),
        );
        let element = match self.prepare(locator, PRESENT_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("move to", locator, stage).await),
        };
        self.driver().scroll_into_view(&element).await?;
        self.settle_on_screen(step, locator).await
    }

    /// Scroll so the element sits `offset` pixels below the top of the
    /// viewport.
    ///
    /// Both `offset` and the driver's `top_offset` are measured from the top
    /// of the viewport, not the document, so the page scrolls by their
    /// difference.
    pub async fn move_with_offset(&self, locator: &Locator, offset: i64) -> Result<Outcome> {
        let step = self.step(
            format!("Moving screen to {} pixels above {}", offset, locator),
            format!("{} is now present on the visible page", locator),
        );
        let element = match self.prepare(locator, PRESENT_CHAIN).await? {
            Readiness::Ready(element) => element,
            Readiness::Blocked(stage) => return Ok(step.blocked("move to", locator, stage).await),
        };
        let top = self.driver().top_offset(&element).await?;
        self.driver()
            .execute_script(&scripts::scroll_by(top - offset))
            .await?;
        self.settle_on_screen(step, locator).await
    }

    async fn settle_on_screen(
        &self,
        step: Step<'_>,
        locator: &Locator,
    ) -> Result<Outcome> {
        if self.is_on_screen(locator).await? {
            Ok(step
                .pass(format!("{} is present on visible page", locator))
                .await)
        } else {
            Ok(step
                .fail(format!("{} is not present on visible page", locator))
                .await)
        }
    }

    /// Scroll the page to the absolute vertical `position`.
    pub async fn scroll(&self, position: i64) -> Result<Outcome> {
        let initial = self.scroll_position().await?;
        let step = self.step(
            format!("Scrolling page from {} to {}", initial, position),
            format!("Page is now set at position {}", position),
        );
        self.driver()
            .execute_script(&scripts::scroll_to(position))
            .await?;
        let reached = self.scroll_position().await?;

        let status = if reached == position {
            Status::Success
        } else {
            Status::Failure
        };
        Ok(step
            .finish(format!("Page is now set at position {}", reached), status)
            .await)
    }

    pub async fn scroll_position(&self) -> Result<i64> {
        let value = self.driver().execute_script(scripts::SCROLL_POSITION).await?;
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .ok_or_else(|| DriverError::Script(format!("bad scroll position {}", n)).into()),
            other => Err(DriverError::Script(format!("bad scroll position {}", other)).into()),
        }
    }
}
