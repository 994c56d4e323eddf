pub mod css;
pub mod text;
pub mod xpath;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::driver::{BrowserDriver, ElementHandle};
use crate::error::{GuardError, Result};

/// How a [`Locator`] string should be interpreted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorKind {
    Xpath,
    Id,
    Name,
    #[serde(alias = "classname", alias = "class_name")]
    ClassName,
    #[serde(alias = "partiallinktext", alias = "partial_link_text")]
    PartialLinkText,
    #[serde(alias = "linktext", alias = "link_text")]
    LinkText,
    #[serde(alias = "tagname", alias = "tag_name")]
    TagName,
}

impl LocatorKind {
    pub const ALL: [LocatorKind; 7] = [
        LocatorKind::Xpath,
        LocatorKind::Id,
        LocatorKind::Name,
        LocatorKind::ClassName,
        LocatorKind::PartialLinkText,
        LocatorKind::LinkText,
        LocatorKind::TagName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xpath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class-name",
            Self::PartialLinkText => "partial-link-text",
            Self::LinkText => "link-text",
            Self::TagName => "tag-name",
        }
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocatorKind {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "xpath" => Ok(Self::Xpath),
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "classname" => Ok(Self::ClassName),
            "partiallinktext" => Ok(Self::PartialLinkText),
            "linktext" => Ok(Self::LinkText),
            "tagname" => Ok(Self::TagName),
            _ => Err(GuardError::InvalidLocatorKind(s.to_string())),
        }
    }
}

/// An abstract element address: a kind plus the string it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    kind: LocatorKind,
    value: String,
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Build a locator from a textual kind such as `"id"` or `"xpath"`.
    pub fn parse(kind: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self::new(kind.parse()?, value))
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Xpath, value)
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::Name, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::ClassName, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::LinkText, value)
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::PartialLinkText, value)
    }

    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::new(LocatorKind::TagName, value)
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// Lookup strategy understood by the browser driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Css,
    Xpath,
    TagName,
    LinkText,
    PartialLinkText,
}

/// A resolved locator, ready to be run against the live document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub strategy: Strategy,
    pub value: String,
}

impl Query {
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// JS expression evaluating to an `Array` of the matching elements.
    pub fn to_js(&self) -> Result<String> {
        match self.strategy {
            Strategy::Css => css::query_all_js(&self.value),
            Strategy::TagName => css::tag_name_js(&self.value),
            Strategy::Xpath => xpath::query_all_js(&self.value),
            Strategy::LinkText => text::link_text_js(&self.value, false),
            Strategy::PartialLinkText => text::link_text_js(&self.value, true),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}={}", self.strategy, self.value)
    }
}

/// Translate a locator into a driver query. Pure; touches no browser state.
pub fn resolve(locator: &Locator) -> Query {
    let value = locator.value();
    match locator.kind() {
        LocatorKind::Xpath => Query::new(Strategy::Xpath, value),
        LocatorKind::Id => Query::new(Strategy::Css, css::attribute_selector("id", "=", value)),
        LocatorKind::Name => {
            Query::new(Strategy::Css, css::attribute_selector("name", "=", value))
        }
        LocatorKind::ClassName => {
            Query::new(Strategy::Css, css::attribute_selector("class", "~=", value))
        }
        LocatorKind::TagName => Query::new(Strategy::TagName, value),
        LocatorKind::LinkText => Query::new(Strategy::LinkText, value),
        LocatorKind::PartialLinkText => Query::new(Strategy::PartialLinkText, value),
    }
}

/// First element matching the locator, or `None` when nothing matches.
pub async fn locate(
    driver: &dyn BrowserDriver,
    locator: &Locator,
) -> Result<Option<ElementHandle>> {
    Ok(driver.find_element(&resolve(locator)).await?)
}

/// Every element matching the locator, in document order.
pub async fn locate_all(
    driver: &dyn BrowserDriver,
    locator: &Locator,
) -> Result<Vec<ElementHandle>> {
    Ok(driver.find_elements(&resolve(locator)).await?)
}
