use crate::engine::{seconds, Engine};
use crate::error::{DriverError, Result};
use crate::outcome::Outcome;
use crate::selectors::{locate, Locator};

impl Engine {
    /// Load `url`. A page that fails to load is a FAILURE outcome; a broken
    /// session is an error.
    pub async fn go_to_url(&self, url: &str) -> Result<Outcome> {
        let step = self.step(format!("Loading {}", url), format!("Loaded {}", url));
        match self.driver().navigate(url).await {
            Ok(()) => {
                let took = seconds(step.elapsed());
                Ok(step
                    .pass(format!("Loaded {} in {} seconds", url, took))
                    .await)
            }
            Err(DriverError::Navigation(reason)) => {
                tracing::debug!("Navigation to {} failed: {}", url, reason);
                Ok(step.fail(format!("Fail to Load {}", url)).await)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.driver().title().await?)
    }

    pub async fn location(&self) -> Result<String> {
        Ok(self.driver().current_url().await?)
    }

    pub async fn page_source(&self) -> Result<String> {
        Ok(self.driver().page_source().await?)
    }

    /// Whether the rendered text of `<body>` contains `text`.
    pub async fn is_text_present(&self, text: &str) -> Result<bool> {
        match self.text(&Locator::tag_name("body")).await? {
            Some(body) => Ok(body.contains(text)),
            None => Ok(false),
        }
    }

    pub async fn is_text_present_in_source(&self, text: &str) -> Result<bool> {
        Ok(self.page_source().await?.contains(text))
    }

    /// Visible text of the element, `None` when it is not on the page.
    pub async fn text(&self, locator: &Locator) -> Result<Option<String>> {
        match locate(self.driver(), locator).await? {
            Some(element) => Ok(Some(self.driver().text(&element).await?)),
            None => Ok(None),
        }
    }

    /// The element's `value` property, `None` when it is not on the page.
    pub async fn value(&self, locator: &Locator) -> Result<Option<String>> {
        match locate(self.driver(), locator).await? {
            Some(element) => Ok(self.driver().attribute(&element, "value").await?),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::driver::memory::{MemoryDriver, MemoryElement};
    use crate::outcome::{OutcomeLog, Status};
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryDriver>, Engine) {
        let clock = ManualClock::new();
        let driver = Arc::new(MemoryDriver::new(clock.clone()));
        let engine = Engine::new(driver.clone(), Arc::new(OutcomeLog::new()))
            .with_clock(Arc::new(clock));
        (driver, engine)
    }

    #[tokio::test]
    async fn test_go_to_url_records_load() {
        let (driver, engine) = setup();
        let outcome = engine.go_to_url("https://example.test/").await.unwrap();
        assert_eq!(outcome.status(), Status::Success);
        assert_eq!(outcome.actual(), "Loaded https://example.test/ in 0.0 seconds");
        assert_eq!(engine.location().await.unwrap(), "https://example.test/");
        assert_eq!(driver.history().len(), 1);
    }

    #[tokio::test]
    async fn test_title_reads_current_page() {
        let (driver, engine) = setup();
        driver.set_title("Checkout");
        engine.go_to_url("https://example.test/cart").await.unwrap();
        assert_eq!(engine.title().await.unwrap(), "Checkout");
    }

    #[tokio::test]
    async fn test_unreachable_page_is_a_failure_outcome() {
        let (driver, engine) = setup();
        driver.make_unreachable("https://down.test/");
        let outcome = engine.go_to_url("https://down.test/").await.unwrap();
        assert_eq!(outcome.status(), Status::Failure);
        assert_eq!(outcome.actual(), "Fail to Load https://down.test/");
    }

    #[tokio::test]
    async fn test_text_queries() {
        let (driver, engine) = setup();
        driver.add(MemoryElement::new("body").with_text("Welcome back, Ada"));
        driver.add(MemoryElement::new("input").with_id("email").with_value("ada@example.test"));
        driver.set_page_source("<html><body><!-- build 42 --></body></html>");

        assert!(engine.is_text_present("Welcome back").await.unwrap());
        assert!(!engine.is_text_present("build 42").await.unwrap());
        assert!(engine.is_text_present_in_source("build 42").await.unwrap());
        assert_eq!(
            engine.value(&Locator::id("email")).await.unwrap().as_deref(),
            Some("ada@example.test")
        );
        assert_eq!(engine.text(&Locator::id("nope")).await.unwrap(), None);
    }
}
