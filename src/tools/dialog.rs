use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::duration_from_secs;
use crate::driver::{Dialog, DialogKind};
use crate::engine::Engine;
use crate::error::GuardError;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DialogAction {
    Accept,
    Dismiss,
    /// Only wait for the dialog to open.
    Wait,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HandleDialogParams {
    #[schemars(description = "alert, confirmation, or prompt")]
    pub kind: DialogKind,
    #[schemars(description = "accept (OK), dismiss (Cancel), or wait")]
    pub action: DialogAction,
    #[schemars(description = "Text to type into a prompt before accepting it")]
    pub text: Option<String>,
    #[schemars(description = "Seconds to wait when action is `wait` (default: the configured timeout)")]
    pub timeout_secs: Option<f64>,
}

/// Returns one outcome per step taken (typing into a prompt is its own step).
pub async fn handle_dialog(engine: &Engine, params: &HandleDialogParams) -> Result<Vec<Outcome>> {
    if params.text.is_some() && params.kind != DialogKind::Prompt {
        return Err(GuardError::InvalidAction(format!(
            "only a prompt accepts text, not {} {}",
            params.kind.article(),
            params.kind
        ))
        .into());
    }

    let mut outcomes = Vec::new();
    if let Some(text) = &params.text {
        let typed = engine.type_into_prompt(text).await?;
        let stop = !typed.is_success();
        outcomes.push(typed);
        if stop {
            return Ok(outcomes);
        }
    }

    let outcome = match (params.kind, params.action) {
        (kind, DialogAction::Wait) => {
            let timeout = params.timeout_secs.map(duration_from_secs).transpose()?;
            engine.wait_for_dialog(kind, timeout).await?
        }
        (DialogKind::Alert, DialogAction::Accept) => engine.accept_alert().await?,
        (DialogKind::Alert, DialogAction::Dismiss) => {
            return Err(GuardError::InvalidAction("an alert can only be accepted".into()).into())
        }
        (DialogKind::Confirmation, DialogAction::Accept) => engine.accept_confirmation().await?,
        (DialogKind::Confirmation, DialogAction::Dismiss) => {
            engine.dismiss_confirmation().await?
        }
        (DialogKind::Prompt, DialogAction::Accept) => engine.accept_prompt().await?,
        (DialogKind::Prompt, DialogAction::Dismiss) => engine.dismiss_prompt().await?,
    };
    outcomes.push(outcome);
    Ok(outcomes)
}

#[derive(Debug, Serialize)]
pub struct DialogText {
    pub open: bool,
    pub kind: Option<DialogKind>,
    pub message: Option<String>,
}

pub async fn dialog_text(engine: &Engine) -> Result<DialogText> {
    Ok(match engine.current_dialog().await? {
        Some(Dialog { kind, message }) => DialogText {
            open: true,
            kind,
            message: Some(message),
        },
        None => DialogText {
            open: false,
            kind: None,
            message: None,
        },
    })
}
