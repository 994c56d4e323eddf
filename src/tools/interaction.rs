use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ElementParams;
use crate::engine::Engine;
use crate::error::GuardError;
use crate::outcome::Outcome;
use crate::selectors::{Locator, LocatorKind};

pub async fn click(engine: &Engine, params: &ElementParams) -> Result<Outcome> {
    Ok(engine.click(&params.locator()).await?)
}

pub async fn submit(engine: &Engine, params: &ElementParams) -> Result<Outcome> {
    Ok(engine.submit(&params.locator()).await?)
}

pub async fn hover(engine: &Engine, params: &ElementParams) -> Result<Outcome> {
    Ok(engine.hover(&params.locator()).await?)
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TypeTextParams {
    #[schemars(description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name")]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator of the field to type into")]
    pub locator: String,
    #[schemars(description = "Text to append to the field")]
    pub text: String,
}

pub async fn type_text(engine: &Engine, params: &TypeTextParams) -> Result<Outcome> {
    let locator = Locator::new(params.locator_type, params.locator.clone());
    Ok(engine.type_text(&locator, &params.text).await?)
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SelectOptionParams {
    #[schemars(description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name")]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator of the <select> element")]
    pub locator: String,
    #[schemars(description = "Visible text of the option(s) to select")]
    pub text: Option<String>,
    #[schemars(description = "0-based index of the option to select")]
    pub index: Option<usize>,
}

pub async fn select_option(engine: &Engine, params: &SelectOptionParams) -> Result<Outcome> {
    let locator = Locator::new(params.locator_type, params.locator.clone());
    let outcome = match (&params.text, params.index) {
        (Some(text), None) => engine.select(&locator, text).await?,
        (None, Some(index)) => engine.select_index(&locator, index).await?,
        _ => {
            return Err(GuardError::InvalidAction(
                "give exactly one of `text` or `index`".into(),
            )
            .into())
        }
    };
    Ok(outcome)
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MoveToParams {
    #[schemars(description = "How to read `locator`: xpath, id, name, class-name, link-text, partial-link-text, or tag-name")]
    pub locator_type: LocatorKind,
    #[schemars(description = "Locator of the element to bring on screen")]
    pub locator: String,
    #[schemars(description = "Leave this many pixels between the top of the viewport and the element")]
    pub offset: Option<i64>,
}

pub async fn move_to(engine: &Engine, params: &MoveToParams) -> Result<Outcome> {
    let locator = Locator::new(params.locator_type, params.locator.clone());
    let outcome = match params.offset {
        Some(offset) => engine.move_with_offset(&locator, offset).await?,
        None => engine.move_to(&locator).await?,
    };
    Ok(outcome)
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScrollPageParams {
    #[schemars(description = "Absolute vertical scroll position in pixels")]
    pub position: i64,
}

pub async fn scroll_page(engine: &Engine, params: &ScrollPageParams) -> Result<Outcome> {
    Ok(engine.scroll(params.position).await?)
}
