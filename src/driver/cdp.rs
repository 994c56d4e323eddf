use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    DialogType, EventJavascriptDialogClosed, EventJavascriptDialogOpening,
    HandleJavaScriptDialogParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use super::{BrowserDriver, Dialog, DialogKind, ElementHandle};
use crate::error::{DriverError, DriverResult};
use crate::selectors::{css, Query};

/// Elements found through this driver are parked here as `WeakRef`s so later
/// calls can reach the same node without keeping detached nodes alive. A
/// navigation wipes the array, which is how stale references are detected.
const REFS: &str = "window.__remixGuardRefs";
/// Element to slot in [`REFS`], so polling the same node reuses its slot.
const SLOTS: &str = "window.__remixGuardSlots";

/// JS expression for the element behind `handle`, `undefined` once collected
/// or after a navigation.
fn deref_js(handle: &ElementHandle) -> DriverResult<String> {
    let slot: u64 = handle
        .token()
        .strip_prefix("ref-")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| DriverError::StaleElement(handle.to_string()))?;
    Ok(format!("(({} || [])[{}]?.deref())", REFS, slot))
}

#[derive(Debug, Default)]
struct DialogState {
    open: Option<Dialog>,
    prompt_text: Option<String>,
}

/// [`BrowserDriver`] over a chromiumoxide [`Page`].
pub struct CdpDriver {
    page: Page,
    dialog: Arc<Mutex<DialogState>>,
    listeners: Vec<JoinHandle<()>>,
}

impl CdpDriver {
    /// Wrap `page` and start tracking the native dialogs it opens.
    pub async fn attach(page: Page) -> Result<Self> {
        let dialog = Arc::new(Mutex::new(DialogState::default()));

        let mut opening = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .context("Failed to subscribe to dialog events")?;
        let mut closed = page
            .event_listener::<EventJavascriptDialogClosed>()
            .await
            .context("Failed to subscribe to dialog events")?;

        let state = dialog.clone();
        let on_open = tokio::spawn(async move {
            while let Some(event) = opening.next().await {
                let kind = match event.r#type {
                    DialogType::Alert => Some(DialogKind::Alert),
                    DialogType::Confirm => Some(DialogKind::Confirmation),
                    DialogType::Prompt => Some(DialogKind::Prompt),
                    _ => None,
                };
                tracing::debug!("Dialog opened: {:?} {}", kind, event.message);
                let mut state = lock(&state);
                state.open = Some(Dialog {
                    kind,
                    message: event.message.clone(),
                });
                state.prompt_text = None;
            }
        });

        let state = dialog.clone();
        let on_close = tokio::spawn(async move {
            while let Some(_event) = closed.next().await {
                tracing::debug!("Dialog closed");
                let mut state = lock(&state);
                state.open = None;
                state.prompt_text = None;
            }
        });

        Ok(Self {
            page,
            dialog,
            listeners: vec![on_open, on_close],
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Evaluate an expression that resolves to `{ value }` or `{ stale: true }`.
    async fn eval(&self, js: &str) -> DriverResult<Value> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?
            .into_value::<Value>()
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn eval_value(&self, js: &str) -> DriverResult<Value> {
        let result = self.eval(js).await?;
        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    /// Run `body` with `el` bound to the referenced element.
    async fn on_element(&self, element: &ElementHandle, body: &str) -> DriverResult<Value> {
        let js = format!(
            r#"(() => {{
                const el = {el};
                if (!el || !el.isConnected) return {{ stale: true }};
                {body}
            }})()"#,
            el = deref_js(element)?,
            body = body
        );
        let result = self.eval(&js).await?;
        if result.get("stale").and_then(Value::as_bool) == Some(true) {
            return Err(DriverError::StaleElement(element.to_string()));
        }
        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn on_element_bool(&self, element: &ElementHandle, body: &str) -> DriverResult<bool> {
        Ok(self.on_element(element, body).await?.as_bool().unwrap_or(false))
    }

    /// Park every element `found_js` evaluates to and hand back handles.
    async fn register(&self, found_js: &str) -> DriverResult<Vec<ElementHandle>> {
        let js = format!(
            r#"(() => {{
                const found = {found};
                const refs = ({refs} = {refs} || []);
                const slots = ({slots} = {slots} || new WeakMap());
                return {{ value: found.map(el => {{
                    let slot = slots.get(el);
                    if (slot === undefined) {{
                        slot = refs.push(new WeakRef(el)) - 1;
                        slots.set(el, slot);
                    }}
                    return slot;
                }}) }};
            }})()"#,
            found = found_js,
            refs = REFS,
            slots = SLOTS
        );
        let indices = self.eval_value(&js).await?;
        Ok(indices
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_u64)
                    .map(|i| ElementHandle::new(format!("ref-{}", i)))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn dialog_state(&self) -> MutexGuard<'_, DialogState> {
        lock(&self.dialog)
    }

    async fn close_dialog(&self, accept: bool) -> DriverResult<()> {
        let prompt_text = {
            let mut state = self.dialog_state();
            if state.open.is_none() {
                return Err(DriverError::NoDialogOpen);
            }
            if accept {
                state.prompt_text.take()
            } else {
                None
            }
        };

        self.page
            .execute(HandleJavaScriptDialogParams {
                accept,
                prompt_text,
            })
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;

        self.dialog_state().open = None;
        Ok(())
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

fn lock(state: &Mutex<DialogState>) -> MutexGuard<'_, DialogState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn query_js(query: &Query) -> DriverResult<String> {
    query.to_js().map_err(|e| DriverError::Script(e.to_string()))
}

fn js_string(value: &str) -> DriverResult<String> {
    css::js_string(value).map_err(|e| DriverError::Script(e.to_string()))
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        // goto() waits for the load event
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.page
            .url()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Session(e.to_string()))
    }

    async fn title(&self) -> DriverResult<String> {
        self.page
            .get_title()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Session(e.to_string()))
    }

    async fn page_source(&self) -> DriverResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))
    }

    async fn find_element(&self, query: &Query) -> DriverResult<Option<ElementHandle>> {
        let first = format!("({}).slice(0, 1)", query_js(query)?);
        Ok(self.register(&first).await?.into_iter().next())
    }

    async fn find_elements(&self, query: &Query) -> DriverResult<Vec<ElementHandle>> {
        self.register(&query_js(query)?).await
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        tag: &str,
    ) -> DriverResult<Vec<ElementHandle>> {
        let found = format!(
            "(() => {{ const el = {el}; if (!el || !el.isConnected) throw new Error('stale'); \
             return Array.from(el.getElementsByTagName({tag})); }})()",
            el = deref_js(parent)?,
            tag = js_string(tag)?
        );
        self.register(&found)
            .await
            .map_err(|e| match e {
                DriverError::Script(msg) if msg.contains("stale") => {
                    DriverError::StaleElement(parent.to_string())
                }
                other => other,
            })
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.on_element(
            element,
            "el.scrollIntoView({ block: 'center', behavior: 'instant' }); el.click(); return { value: true };",
        )
        .await?;
        Ok(())
    }

    async fn submit(&self, element: &ElementHandle) -> DriverResult<()> {
        self.on_element(
            element,
            r#"const form = el.tagName === 'FORM' ? el : (el.form || el.closest('form'));
               if (!form) throw new Error('Element is not inside a form');
               if (form.requestSubmit) form.requestSubmit(); else form.submit();
               return { value: true };"#,
        )
        .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let body = format!(
            r#"const text = {text};
               el.focus();
               if (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA') {{
                   const proto = el.tagName === 'INPUT'
                       ? window.HTMLInputElement.prototype
                       : window.HTMLTextAreaElement.prototype;
                   const setter = Object.getOwnPropertyDescriptor(proto, 'value')?.set;
                   if (setter) {{
                       setter.call(el, el.value + text);
                   }} else {{
                       el.value += text;
                   }}
                   el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                   el.dispatchEvent(new Event('change', {{ bubbles: true }}));
               }} else {{
                   document.execCommand('insertText', false, text);
               }}
               return {{ value: true }};"#,
            text = js_string(text)?
        );
        self.on_element(element, &body).await?;
        Ok(())
    }

    async fn hover(&self, element: &ElementHandle) -> DriverResult<()> {
        self.on_element(
            element,
            r#"el.scrollIntoView({ block: 'center', behavior: 'instant' });
               const rect = el.getBoundingClientRect();
               const opts = { bubbles: true, clientX: rect.left + rect.width / 2, clientY: rect.top + rect.height / 2 };
               el.dispatchEvent(new MouseEvent('mouseenter', opts));
               el.dispatchEvent(new MouseEvent('mouseover', opts));
               el.dispatchEvent(new MouseEvent('mousemove', opts));
               return { value: true };"#,
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> DriverResult<()> {
        self.on_element(
            element,
            "el.scrollIntoView({ block: 'center', behavior: 'instant' }); return { value: true };",
        )
        .await?;
        Ok(())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.on_element_bool(
            element,
            r#"const style = getComputedStyle(el);
               if (style.display === 'none' || style.visibility === 'hidden' || parseFloat(style.opacity) === 0) {
                   return { value: false };
               }
               const rect = el.getBoundingClientRect();
               return { value: rect.width > 0 || rect.height > 0 };"#,
        )
        .await
    }

    async fn is_in_view(&self, element: &ElementHandle) -> DriverResult<bool> {
        if !self.is_displayed(element).await? {
            return Ok(false);
        }
        self.on_element_bool(
            element,
            r#"const rect = el.getBoundingClientRect();
               return { value: rect.bottom > 0 && rect.top < window.innerHeight
                   && rect.right > 0 && rect.left < window.innerWidth };"#,
        )
        .await
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.on_element_bool(element, "return { value: !el.disabled };")
            .await
    }

    async fn is_selected(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.on_element_bool(element, "return { value: !!(el.checked || el.selected) };")
            .await
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        let value = self
            .on_element(element, "return { value: el.innerText || '' };")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let body = format!(
            r#"const name = {name};
               const v = name === 'value' ? el.value : el.getAttribute(name);
               return {{ value: v === undefined ? null : v }};"#,
            name = js_string(name)?
        );
        let value = self.on_element(element, &body).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn top_offset(&self, element: &ElementHandle) -> DriverResult<i64> {
        let value = self
            .on_element(
                element,
                "return { value: Math.round(el.getBoundingClientRect().top) };",
            )
            .await?;
        Ok(value.as_i64().unwrap_or_default())
    }

    async fn execute_script(&self, script: &str) -> DriverResult<Value> {
        let js = format!(
            r#"(() => {{
                const result = (function() {{ {script} }})();
                return {{ value: result === undefined ? null : result }};
            }})()"#,
            script = script
        );
        self.eval_value(&js).await
    }

    async fn switch_to_dialog(&self) -> DriverResult<Option<Dialog>> {
        Ok(self.dialog_state().open.clone())
    }

    async fn accept_dialog(&self) -> DriverResult<()> {
        self.close_dialog(true).await
    }

    async fn dismiss_dialog(&self) -> DriverResult<()> {
        self.close_dialog(false).await
    }

    async fn send_keys_to_dialog(&self, text: &str) -> DriverResult<()> {
        let mut state = self.dialog_state();
        if state.open.is_none() {
            return Err(DriverError::NoDialogOpen);
        }
        state
            .prompt_text
            .get_or_insert_with(String::new)
            .push_str(text);
        Ok(())
    }

    async fn switch_to_default_content(&self) -> DriverResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_deref_weak_slots() {
        let js = deref_js(&ElementHandle::new("ref-7")).unwrap();
        assert_eq!(js, "((window.__remixGuardRefs || [])[7]?.deref())");
    }

    #[test]
    fn test_foreign_handle_is_stale() {
        let err = deref_js(&ElementHandle::new("node-1")).unwrap_err();
        assert!(err.is_not_ready());
        assert!(deref_js(&ElementHandle::new("ref-1; alert(1)")).is_err());
    }
}
