//! Parameter types and adapters behind each MCP tool.

pub mod dialog;
pub mod interaction;
pub mod navigation;
pub mod report;
pub mod state;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GuardError;
use crate::selectors::{Locator, LocatorKind};

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ElementParams {
    #[schemars(
        description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name"
    )]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator string, e.g. login or //input[@id='login']")]
    pub locator: String,
}

impl ElementParams {
    pub fn locator(&self) -> Locator {
        Locator::new(self.locator_type, self.locator.clone())
    }
}

/// Seconds from a tool argument, rejecting negative or non-finite values.
pub fn duration_from_secs(secs: f64) -> Result<Duration, GuardError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| GuardError::InvalidAction(format!("{} is not a valid number of seconds", secs)))
}
