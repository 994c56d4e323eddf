//! A scripted, in-memory document for exercising the engine without a browser.
//!
//! Elements carry timelines (when they appear, become visible, become
//! enabled, disappear) evaluated against a shared [`ManualClock`], so a test
//! can describe a slow page declaratively and let the poller walk through it.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{scripts, BrowserDriver, Dialog, DialogKind, ElementHandle};
use crate::clock::{Clock, ManualClock};
use crate::error::{DriverError, DriverResult};
use crate::selectors::{css, text, Query, Strategy};

pub const VIEWPORT_HEIGHT: i64 = 720;

/// When a piece of element state holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Always,
    Never,
    After(Duration),
    Until(Duration),
}

impl Availability {
    pub fn at(self, now: Duration) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::After(t) => now >= t,
            Self::Until(t) => now < t,
        }
    }
}

/// Declarative description of one element.
#[derive(Debug, Clone)]
pub struct MemoryElement {
    tag: String,
    id: Option<String>,
    name: Option<String>,
    classes: Vec<String>,
    text: String,
    value: String,
    xpaths: Vec<String>,
    attributes: HashMap<String, String>,
    present: Availability,
    displayed: Availability,
    enabled: Availability,
    selected: bool,
    top: i64,
    needs_scroll: bool,
    children: Vec<MemoryElement>,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            name: None,
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            xpaths: Vec::new(),
            attributes: HashMap::new(),
            present: Availability::Always,
            displayed: Availability::Always,
            enabled: Availability::Always,
            selected: false,
            top: 0,
            needs_scroll: false,
            children: Vec::new(),
        }
    }

    /// `<select id=..>`; add entries with [`MemoryElement::with_option`].
    pub fn select(id: impl Into<String>) -> Self {
        Self::new("select").with_id(id)
    }

    pub fn link(text: impl Into<String>) -> Self {
        Self::new("a").with_text(text)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// XPath expression this element answers to (matched verbatim).
    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpaths.push(xpath.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_option(mut self, text: impl Into<String>, value: impl Into<String>) -> Self {
        self.children
            .push(MemoryElement::new("option").with_text(text).with_value(value));
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.present = Availability::After(delay);
        self
    }

    pub fn removed_after(mut self, delay: Duration) -> Self {
        self.present = Availability::Until(delay);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = Availability::Never;
        self
    }

    pub fn displayed_after(mut self, delay: Duration) -> Self {
        self.displayed = Availability::After(delay);
        self
    }

    pub fn hidden_after(mut self, delay: Duration) -> Self {
        self.displayed = Availability::Until(delay);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = Availability::Never;
        self
    }

    pub fn enabled_after(mut self, delay: Duration) -> Self {
        self.enabled = Availability::After(delay);
        self
    }

    pub fn disabled_after(mut self, delay: Duration) -> Self {
        self.enabled = Availability::Until(delay);
        self
    }

    pub fn checked(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Place the element `top` pixels down the page. It is only in view
    /// while the viewport covers that position.
    pub fn below_fold(mut self, top: i64) -> Self {
        self.top = top;
        self.needs_scroll = true;
        self
    }

    fn matches(&self, query: &Query) -> DriverResult<bool> {
        Ok(match query.strategy {
            Strategy::Xpath => self.xpaths.iter().any(|x| x == &query.value),
            Strategy::TagName => self.tag.eq_ignore_ascii_case(&query.value),
            Strategy::LinkText => {
                self.tag == "a" && text::link_matches(&self.text, &query.value, false)
            }
            Strategy::PartialLinkText => {
                self.tag == "a" && text::link_matches(&self.text, &query.value, true)
            }
            Strategy::Css => {
                let (attribute, op, value) = css::parse_attribute_selector(&query.value)
                    .ok_or_else(|| {
                        DriverError::Script(format!("unsupported selector: {}", query.value))
                    })?;
                match (attribute, op) {
                    ("id", "=") => self.id.as_deref() == Some(value.as_str()),
                    ("name", "=") => self.name.as_deref() == Some(value.as_str()),
                    ("class", "~=") => self.classes.iter().any(|c| c == &value),
                    (other, "=") => self.attributes.get(other) == Some(&value),
                    _ => false,
                }
            }
        })
    }
}

/// A handled (accepted or dismissed) dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRecord {
    pub kind: DialogKind,
    pub message: String,
    pub accepted: bool,
    pub typed: Option<String>,
}

#[derive(Debug)]
struct Node {
    element: MemoryElement,
    parent: Option<usize>,
    clicks: usize,
    submits: usize,
    hovers: usize,
}

#[derive(Debug)]
struct PendingDialog {
    kind: DialogKind,
    message: String,
    opens_at: Duration,
    typed: Option<String>,
}

#[derive(Debug, Default)]
struct Document {
    nodes: Vec<Node>,
    dialogs: Vec<PendingDialog>,
    handled: Vec<DialogRecord>,
    dialog_focus: bool,
    scroll_y: i64,
    max_scroll: Option<i64>,
    history: Vec<String>,
    unreachable: HashSet<String>,
    title: String,
    source: String,
    scripts: Vec<String>,
    session_lost: bool,
    element_calls: usize,
}

/// In-memory [`BrowserDriver`].
#[derive(Debug)]
pub struct MemoryDriver {
    clock: ManualClock,
    doc: Mutex<Document>,
}

impl MemoryDriver {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            doc: Mutex::new(Document::default()),
        }
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an element (and its options) to the page. Returns its node id.
    pub fn add(&self, mut element: MemoryElement) -> usize {
        let children = std::mem::take(&mut element.children);
        let mut doc = self.doc();
        let id = doc.nodes.len();
        doc.nodes.push(Node {
            element,
            parent: None,
            clicks: 0,
            submits: 0,
            hovers: 0,
        });
        for child in children {
            doc.nodes.push(Node {
                element: child,
                parent: Some(id),
                clicks: 0,
                submits: 0,
                hovers: 0,
            });
        }
        id
    }

    pub fn open_dialog(&self, kind: DialogKind, message: impl Into<String>) {
        self.open_dialog_after(kind, message, Duration::ZERO);
    }

    pub fn open_dialog_after(&self, kind: DialogKind, message: impl Into<String>, at: Duration) {
        self.doc().dialogs.push(PendingDialog {
            kind,
            message: message.into(),
            opens_at: at,
            typed: None,
        });
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.doc().title = title.into();
    }

    pub fn set_page_source(&self, source: impl Into<String>) {
        self.doc().source = source.into();
    }

    /// Cap how far the page can scroll.
    pub fn set_max_scroll(&self, max: i64) {
        self.doc().max_scroll = Some(max);
    }

    /// Make navigation to `url` fail.
    pub fn make_unreachable(&self, url: impl Into<String>) {
        self.doc().unreachable.insert(url.into());
    }

    /// Every later call fails as if the browser went away.
    pub fn lose_session(&self) {
        self.doc().session_lost = true;
    }

    pub fn clicks(&self, node: usize) -> usize {
        self.doc().nodes.get(node).map_or(0, |n| n.clicks)
    }

    pub fn submits(&self, node: usize) -> usize {
        self.doc().nodes.get(node).map_or(0, |n| n.submits)
    }

    pub fn hovers(&self, node: usize) -> usize {
        self.doc().nodes.get(node).map_or(0, |n| n.hovers)
    }

    pub fn value(&self, node: usize) -> String {
        self.doc()
            .nodes
            .get(node)
            .map(|n| n.element.value.clone())
            .unwrap_or_default()
    }

    /// Click counts of the options under `select`, in document order.
    pub fn option_clicks(&self, select: usize) -> Vec<usize> {
        self.doc()
            .nodes
            .iter()
            .filter(|n| n.parent == Some(select))
            .map(|n| n.clicks)
            .collect()
    }

    /// Text of the options currently selected under `select`.
    pub fn selected_options(&self, select: usize) -> Vec<String> {
        self.doc()
            .nodes
            .iter()
            .filter(|n| n.parent == Some(select) && n.element.selected)
            .map(|n| n.element.text.clone())
            .collect()
    }

    pub fn handled_dialogs(&self) -> Vec<DialogRecord> {
        self.doc().handled.clone()
    }

    /// Whether focus is currently on a dialog rather than the document.
    pub fn dialog_focused(&self) -> bool {
        self.doc().dialog_focus
    }

    pub fn scroll_y(&self) -> i64 {
        self.doc().scroll_y
    }

    pub fn history(&self) -> Vec<String> {
        self.doc().history.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.doc().scripts.clone()
    }

    /// Number of element-level calls (click, text, is_displayed, ...).
    pub fn element_calls(&self) -> usize {
        self.doc().element_calls
    }

    fn live(&self) -> DriverResult<(MutexGuard<'_, Document>, Duration)> {
        let doc = self.doc();
        if doc.session_lost {
            return Err(DriverError::Session("session lost".into()));
        }
        Ok((doc, self.clock.now()))
    }

    fn node_index(handle: &ElementHandle) -> DriverResult<usize> {
        handle
            .token()
            .strip_prefix("node-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| DriverError::StaleElement(handle.to_string()))
    }

    fn handle(index: usize) -> ElementHandle {
        ElementHandle::new(format!("node-{}", index))
    }

    /// Run `f` on a live node, failing with a stale reference if it is gone.
    fn with_node<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut Document, usize, Duration) -> DriverResult<T>,
    ) -> DriverResult<T> {
        let index = Self::node_index(handle)?;
        let (mut doc, now) = self.live()?;
        doc.element_calls += 1;
        if index >= doc.nodes.len() || !doc.is_present(index, now) {
            return Err(DriverError::StaleElement(handle.to_string()));
        }
        f(&mut *doc, index, now)
    }

    fn current_dialog(doc: &Document, now: Duration) -> Option<usize> {
        doc.dialogs.iter().position(|d| d.opens_at <= now)
    }

    fn close_dialog(&self, accepted: bool) -> DriverResult<()> {
        let (mut doc, now) = self.live()?;
        let index = Self::current_dialog(&doc, now).ok_or(DriverError::NoDialogOpen)?;
        let dialog = doc.dialogs.remove(index);
        doc.handled.push(DialogRecord {
            kind: dialog.kind,
            message: dialog.message,
            accepted,
            typed: dialog.typed,
        });
        Ok(())
    }
}

impl Document {
    fn is_present(&self, index: usize, now: Duration) -> bool {
        let node = &self.nodes[index];
        node.element.present.at(now) && node.parent.map_or(true, |p| self.is_present(p, now))
    }

    fn is_displayed(&self, index: usize, now: Duration) -> bool {
        let node = &self.nodes[index];
        if let Some(parent) = node.parent {
            return self.is_displayed(parent, now);
        }
        node.element.displayed.at(now)
    }

    fn is_in_view(&self, index: usize, now: Duration) -> bool {
        let root = match self.nodes[index].parent {
            Some(parent) => parent,
            None => index,
        };
        let element = &self.nodes[root].element;
        self.is_displayed(index, now)
            && (!element.needs_scroll
                || (element.top >= self.scroll_y
                    && element.top < self.scroll_y + VIEWPORT_HEIGHT))
    }

    /// Center the element the way a native click or hover brings it into view.
    fn reveal(&mut self, index: usize, now: Duration) {
        if !self.is_in_view(index, now) {
            let root = self.nodes[index].parent.unwrap_or(index);
            let top = self.nodes[root].element.top;
            self.scroll_to(top - VIEWPORT_HEIGHT / 2);
        }
    }

    fn matching(&self, query: &Query, now: Duration) -> DriverResult<Vec<usize>> {
        let mut found = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if self.is_present(index, now) && node.element.matches(query)? {
                found.push(index);
            }
        }
        Ok(found)
    }

    fn scroll_to(&mut self, y: i64) {
        let max = self.max_scroll.unwrap_or(i64::MAX);
        self.scroll_y = y.clamp(0, max.max(0));
    }
}

#[async_trait]
impl BrowserDriver for MemoryDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let (mut doc, _) = self.live()?;
        if doc.unreachable.contains(url) {
            return Err(DriverError::Navigation(format!("{} is unreachable", url)));
        }
        doc.history.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let (doc, _) = self.live()?;
        Ok(doc.history.last().cloned().unwrap_or_else(|| "about:blank".into()))
    }

    async fn title(&self) -> DriverResult<String> {
        let (doc, _) = self.live()?;
        Ok(doc.title.clone())
    }

    async fn page_source(&self) -> DriverResult<String> {
        let (doc, _) = self.live()?;
        Ok(doc.source.clone())
    }

    async fn find_element(&self, query: &Query) -> DriverResult<Option<ElementHandle>> {
        let (doc, now) = self.live()?;
        Ok(doc.matching(query, now)?.first().map(|&i| Self::handle(i)))
    }

    async fn find_elements(&self, query: &Query) -> DriverResult<Vec<ElementHandle>> {
        let (doc, now) = self.live()?;
        Ok(doc
            .matching(query, now)?
            .into_iter()
            .map(Self::handle)
            .collect())
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        tag: &str,
    ) -> DriverResult<Vec<ElementHandle>> {
        self.with_node(parent, |doc, index, now| {
            Ok(doc
                .nodes
                .iter()
                .enumerate()
                .filter(|(i, n)| {
                    n.parent == Some(index)
                        && n.element.tag.eq_ignore_ascii_case(tag)
                        && doc.is_present(*i, now)
                })
                .map(|(i, _)| Self::handle(i))
                .collect())
        })
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.with_node(element, |doc, index, now| {
            doc.reveal(index, now);
            doc.nodes[index].clicks += 1;
            if doc.nodes[index].element.tag == "option" {
                let parent = doc.nodes[index].parent;
                let multiple = parent
                    .map(|p| doc.nodes[p].element.attributes.contains_key("multiple"))
                    .unwrap_or(false);
                if !multiple {
                    for node in doc.nodes.iter_mut().filter(|n| n.parent == parent) {
                        node.element.selected = false;
                    }
                }
                doc.nodes[index].element.selected = true;
            } else if doc.nodes[index].element.attributes.get("type").map(String::as_str)
                == Some("checkbox")
            {
                let selected = &mut doc.nodes[index].element.selected;
                *selected = !*selected;
            }
            Ok(())
        })
    }

    async fn submit(&self, element: &ElementHandle) -> DriverResult<()> {
        self.with_node(element, |doc, index, _| {
            doc.nodes[index].submits += 1;
            Ok(())
        })
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.with_node(element, |doc, index, _| {
            doc.nodes[index].element.value.push_str(text);
            Ok(())
        })
    }

    async fn hover(&self, element: &ElementHandle) -> DriverResult<()> {
        self.with_node(element, |doc, index, now| {
            doc.reveal(index, now);
            doc.nodes[index].hovers += 1;
            Ok(())
        })
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> DriverResult<()> {
        self.with_node(element, |doc, index, _| {
            let top = doc.nodes[index].element.top;
            doc.scroll_to(top - VIEWPORT_HEIGHT / 2);
            Ok(())
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_node(element, |doc, index, now| Ok(doc.is_displayed(index, now)))
    }

    async fn is_in_view(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_node(element, |doc, index, now| Ok(doc.is_in_view(index, now)))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_node(element, |doc, index, now| {
            Ok(doc.nodes[index].element.enabled.at(now))
        })
    }

    async fn is_selected(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_node(element, |doc, index, _| Ok(doc.nodes[index].element.selected))
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        self.with_node(element, |doc, index, _| Ok(doc.nodes[index].element.text.clone()))
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.with_node(element, |doc, index, _| {
            let element = &doc.nodes[index].element;
            Ok(match name {
                "value" => Some(element.value.clone()),
                "id" => element.id.clone(),
                "name" => element.name.clone(),
                "class" if !element.classes.is_empty() => Some(element.classes.join(" ")),
                other => element.attributes.get(other).cloned(),
            })
        })
    }

    async fn top_offset(&self, element: &ElementHandle) -> DriverResult<i64> {
        self.with_node(element, |doc, index, _| {
            Ok(doc.nodes[index].element.top - doc.scroll_y)
        })
    }

    async fn execute_script(&self, script: &str) -> DriverResult<serde_json::Value> {
        let (mut doc, _) = self.live()?;
        let script = script.trim();
        doc.scripts.push(script.to_string());

        if script == scripts::SCROLL_POSITION {
            return Ok(serde_json::json!(doc.scroll_y));
        }
        let parse = |prefix: &str| {
            script
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(");"))
                .and_then(|n| n.trim().parse::<i64>().ok())
        };
        if let Some(dy) = parse("window.scrollBy(0, ") {
            let target = doc.scroll_y.saturating_add(dy);
            doc.scroll_to(target);
            return Ok(serde_json::Value::Null);
        }
        if let Some(y) = parse("window.scrollTo(0, ") {
            doc.scroll_to(y);
            return Ok(serde_json::Value::Null);
        }
        Err(DriverError::Script(format!("unsupported script: {}", script)))
    }

    async fn switch_to_dialog(&self) -> DriverResult<Option<Dialog>> {
        let (mut doc, now) = self.live()?;
        let dialog = Self::current_dialog(&doc, now).map(|i| Dialog {
            kind: Some(doc.dialogs[i].kind),
            message: doc.dialogs[i].message.clone(),
        });
        if dialog.is_some() {
            doc.dialog_focus = true;
        }
        Ok(dialog)
    }

    async fn accept_dialog(&self) -> DriverResult<()> {
        self.close_dialog(true)
    }

    async fn dismiss_dialog(&self) -> DriverResult<()> {
        self.close_dialog(false)
    }

    async fn send_keys_to_dialog(&self, text: &str) -> DriverResult<()> {
        let (mut doc, now) = self.live()?;
        let index = Self::current_dialog(&doc, now).ok_or(DriverError::NoDialogOpen)?;
        doc.dialogs[index]
            .typed
            .get_or_insert_with(String::new)
            .push_str(text);
        Ok(())
    }

    async fn switch_to_default_content(&self) -> DriverResult<()> {
        let (mut doc, _) = self.live()?;
        doc.dialog_focus = false;
        Ok(())
    }
}
