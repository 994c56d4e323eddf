use rmcp::model::*;
use rmcp::tool;
use rmcp::{Error as McpError, ServerHandler};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::browser::BrowserSession;
use crate::engine::{Engine, GuardConfig};
use crate::outcome::OutcomeLog;
use crate::tools::{dialog, interaction, navigation, report, state, ElementParams};

/// The MCP server that routes tool calls to guarded browser actions.
#[derive(Clone)]
pub struct RemixGuardServer {
    session: Arc<Mutex<Option<BrowserSession>>>,
    outcomes: OutcomeLog,
    config: GuardConfig,
    headless: bool,
}

impl RemixGuardServer {
    pub fn new(headless: bool, config: GuardConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            outcomes: OutcomeLog::new(),
            config,
            headless,
        }
    }

    pub fn outcomes(&self) -> &OutcomeLog {
        &self.outcomes
    }

    /// Launch the browser on first use and build an engine over its page.
    async fn engine(&self) -> Result<Engine, McpError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            tracing::info!("Launching browser (headless: {})", self.headless);
            let s = BrowserSession::launch(self.headless).await.map_err(|e| {
                McpError::internal_error(format!("Failed to launch browser: {}", e), None)
            })?;
            *session = Some(s);
        }
        let driver = session
            .as_ref()
            .map(BrowserSession::driver)
            .ok_or_else(|| McpError::internal_error("Browser session is not running", None))?;
        // Lock drops here; the engine only holds the driver
        Ok(Engine::new(driver, Arc::new(self.outcomes.clone())).with_config(self.config))
    }

    async fn with_engine<F, Fut, T>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(Engine) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        let engine = self.engine().await?;
        f(engine)
            .await
            .map_err(|e| McpError::internal_error(format!("{}", e), None))
    }

    fn json_result(value: impl serde::Serialize) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| McpError::internal_error(format!("JSON error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Close the browser, if one was launched.
    pub async fn shutdown(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
        }
    }
}

#[tool(tool_box)]
impl ServerHandler for RemixGuardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "remix-guard: guarded browser test actions. Every action waits for its element \
                 to be present, displayed and enabled, then returns one SUCCESS/FAILURE outcome. \
                 Start with `navigate`; use `read_outcomes` for the running audit trail."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tool(tool_box)]
impl RemixGuardServer {
    // ── Navigation ──────────────────────────────────────────────────────

    #[tool(description = "Load a URL. Returns the outcome plus the resulting URL and title.")]
    async fn navigate(
        &self,
        #[tool(aggr)] params: navigation::NavigateParams,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .with_engine(|engine| async move { navigation::navigate(&engine, &params).await })
            .await?;
        Self::json_result(result)
    }

    #[tool(description = "Pause for a number of seconds and record it.")]
    async fn pause(
        &self,
        #[tool(aggr)] params: navigation::PauseParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { navigation::pause(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Read an element's visible text and value without waiting.")]
    async fn get_text(
        &self,
        #[tool(aggr)] params: ElementParams,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .with_engine(|engine| async move { navigation::get_text(&engine, &params).await })
            .await?;
        Self::json_result(result)
    }

    // ── Guarded actions ─────────────────────────────────────────────────

    #[tool(description = "Click an element once it is present, displayed and enabled.")]
    async fn click(
        &self,
        #[tool(aggr)] params: ElementParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::click(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Submit the form an element belongs to, once it is present, displayed and enabled.")]
    async fn submit(
        &self,
        #[tool(aggr)] params: ElementParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::submit(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Hover over an element once it is present and displayed.")]
    async fn hover(
        &self,
        #[tool(aggr)] params: ElementParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::hover(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Type text into a field once it is present, displayed and enabled.")]
    async fn type_text(
        &self,
        #[tool(aggr)] params: interaction::TypeTextParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::type_text(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Select options of a <select> by exact visible text (every match is clicked) or by 0-based index.")]
    async fn select_option(
        &self,
        #[tool(aggr)] params: interaction::SelectOptionParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::select_option(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Bring an element on screen, optionally a number of pixels below the top of the viewport.")]
    async fn move_to(
        &self,
        #[tool(aggr)] params: interaction::MoveToParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::move_to(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Scroll the page to an absolute vertical position.")]
    async fn scroll_page(
        &self,
        #[tool(aggr)] params: interaction::ScrollPageParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { interaction::scroll_page(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    // ── Waits and checks ────────────────────────────────────────────────

    #[tool(description = "Wait for an element to be (or stop being) present, displayed or enabled.")]
    async fn wait_for(
        &self,
        #[tool(aggr)] params: state::WaitForParams,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .with_engine(|engine| async move { state::wait_for(&engine, &params).await })
            .await?;
        Self::json_result(outcome)
    }

    #[tool(description = "Check an element's state right now, without waiting.")]
    async fn check_element(
        &self,
        #[tool(aggr)] params: state::CheckElementParams,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .with_engine(|engine| async move { state::check_element(&engine, &params).await })
            .await?;
        Self::json_result(result)
    }

    // ── Dialogs ─────────────────────────────────────────────────────────

    #[tool(description = "Accept, dismiss or wait for a native alert, confirmation or prompt. Text is typed into a prompt first.")]
    async fn handle_dialog(
        &self,
        #[tool(aggr)] params: dialog::HandleDialogParams,
    ) -> Result<CallToolResult, McpError> {
        let outcomes = self
            .with_engine(|engine| async move { dialog::handle_dialog(&engine, &params).await })
            .await?;
        Self::json_result(outcomes)
    }

    #[tool(description = "Read the message of the open native dialog, waiting briefly for one.")]
    async fn dialog_text(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .with_engine(|engine| async move { dialog::dialog_text(&engine).await })
            .await?;
        Self::json_result(result)
    }

    // ── Audit trail ─────────────────────────────────────────────────────

    #[tool(description = "Read recorded outcomes and checks. Can filter by status and clear the log.")]
    async fn read_outcomes(
        &self,
        #[tool(aggr)] params: report::ReadOutcomesParams,
    ) -> Result<CallToolResult, McpError> {
        let result = report::read_outcomes(&self.outcomes, &params)
            .await
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;
        Self::json_result(result)
    }
}
