use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{duration_from_secs, ElementParams};
use crate::engine::Engine;
use crate::outcome::Outcome;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NavigateParams {
    #[schemars(description = "URL to navigate to")]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct NavigateResult {
    pub outcome: Outcome,
    pub url: String,
    pub title: String,
}

pub async fn navigate(engine: &Engine, params: &NavigateParams) -> Result<NavigateResult> {
    let outcome = engine.go_to_url(&params.url).await?;
    let url = engine.location().await?;
    let title = engine.title().await?;
    Ok(NavigateResult { outcome, url, title })
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PauseParams {
    #[schemars(description = "Seconds to wait")]
    pub seconds: f64,
}

pub async fn pause(engine: &Engine, params: &PauseParams) -> Result<Outcome> {
    let duration = duration_from_secs(params.seconds)?;
    Ok(engine.pause(duration).await?)
}

#[derive(Debug, Serialize)]
pub struct ElementText {
    pub locator: String,
    pub present: bool,
    pub text: Option<String>,
    pub value: Option<String>,
}

pub async fn get_text(engine: &Engine, params: &ElementParams) -> Result<ElementText> {
    let locator = params.locator();
    let text = engine.text(&locator).await?;
    let value = engine.value(&locator).await?;
    Ok(ElementText {
        locator: locator.to_string(),
        present: text.is_some(),
        text,
        value,
    })
}
