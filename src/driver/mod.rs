//! The narrow browser capability the engine is written against.

pub mod cdp;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DriverResult;
use crate::selectors::Query;

/// Opaque, short-lived reference to an element issued by a driver.
///
/// Only meaningful to the driver that produced it, and only until the
/// document changes. The engine re-resolves instead of holding on to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native dialog flavours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirmation,
    Prompt,
}

impl DialogKind {
    pub fn noun(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confirmation => "confirmation",
            Self::Prompt => "prompt",
        }
    }

    pub fn article(self) -> &'static str {
        match self {
            Self::Alert => "an",
            Self::Confirmation | Self::Prompt => "a",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// A native dialog currently shown by the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// `None` when the driver cannot tell which kind of dialog it is.
    pub kind: Option<DialogKind>,
    pub message: String,
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> DriverResult<()>;
    async fn current_url(&self) -> DriverResult<String>;
    async fn title(&self) -> DriverResult<String>;
    async fn page_source(&self) -> DriverResult<String>;

    /// First match in document order, `None` if nothing matches.
    async fn find_element(&self, query: &Query) -> DriverResult<Option<ElementHandle>>;
    async fn find_elements(&self, query: &Query) -> DriverResult<Vec<ElementHandle>>;
    /// Descendants of `parent` with the given tag name.
    async fn find_children(
        &self,
        parent: &ElementHandle,
        tag: &str,
    ) -> DriverResult<Vec<ElementHandle>>;

    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;
    async fn submit(&self, element: &ElementHandle) -> DriverResult<()>;
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;
    async fn hover(&self, element: &ElementHandle) -> DriverResult<()>;
    async fn scroll_into_view(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Rendered with a size and not hidden by CSS. Scroll position does
    /// not matter.
    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool>;
    /// Displayed and inside the current viewport.
    async fn is_in_view(&self, element: &ElementHandle) -> DriverResult<bool>;
    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool>;
    async fn is_selected(&self, element: &ElementHandle) -> DriverResult<bool>;
    async fn text(&self, element: &ElementHandle) -> DriverResult<String>;
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> DriverResult<Option<String>>;
    /// Distance in pixels from the top of the viewport to the element.
    async fn top_offset(&self, element: &ElementHandle) -> DriverResult<i64>;

    async fn execute_script(&self, script: &str) -> DriverResult<serde_json::Value>;

    /// Move focus to the open dialog, if any.
    async fn switch_to_dialog(&self) -> DriverResult<Option<Dialog>>;
    async fn accept_dialog(&self) -> DriverResult<()>;
    async fn dismiss_dialog(&self) -> DriverResult<()>;
    async fn send_keys_to_dialog(&self, text: &str) -> DriverResult<()>;
    /// Return focus to the main document.
    async fn switch_to_default_content(&self) -> DriverResult<()>;
}

/// Page scripts the engine issues for scrolling. Scripts are function
/// bodies, as with WebDriver's execute-script.
pub mod scripts {
    pub const SCROLL_POSITION: &str = "return window.scrollY;";

    pub fn scroll_by(dy: i64) -> String {
        format!("window.scrollBy(0, {});", dy)
    }

    pub fn scroll_to(y: i64) -> String {
        format!("window.scrollTo(0, {});", y)
    }
}
