use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::duration_from_secs;
use crate::engine::Engine;
use crate::interaction::Condition;
use crate::outcome::Outcome;
use crate::selectors::{Locator, LocatorKind};

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WaitForParams {
    #[schemars(description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name")]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator of the element to wait on")]
    pub locator: String,
    #[schemars(
        description = "present, not-present, displayed, not-displayed, enabled, or not-enabled"
    )]
    pub condition: Condition,
    #[schemars(description = "Seconds to wait (default: the server's configured timeout)")]
    pub timeout_secs: Option<f64>,
}

pub async fn wait_for(engine: &Engine, params: &WaitForParams) -> Result<Outcome> {
    let locator = Locator::new(params.locator_type, params.locator.clone());
    let timeout = params.timeout_secs.map(duration_from_secs).transpose()?;
    Ok(engine.wait_for(&locator, params.condition, timeout).await?)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ElementCheck {
    Present,
    Displayed,
    Enabled,
    Checked,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CheckElementParams {
    #[schemars(description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name")]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator of the element to check")]
    pub locator: String,
    #[schemars(description = "present, displayed, enabled, or checked")]
    pub check: ElementCheck,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub locator: String,
    pub check: ElementCheck,
    pub result: bool,
}

/// Answer right away without waiting; the check is noted in the log.
pub async fn check_element(engine: &Engine, params: &CheckElementParams) -> Result<CheckResult> {
    let locator = Locator::new(params.locator_type, params.locator.clone());
    let result = match params.check {
        ElementCheck::Present => engine.check_present(&locator).await?,
        ElementCheck::Displayed => engine.check_displayed(&locator).await?,
        ElementCheck::Enabled => engine.check_enabled(&locator).await?,
        ElementCheck::Checked => engine.check_checked(&locator).await?,
    };
    Ok(CheckResult {
        locator: locator.to_string(),
        check: params.check,
        result,
    })
}
