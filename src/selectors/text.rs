use super::css::js_string;
use crate::error::Result;

/// JS expression returning anchors whose trimmed visible text equals
/// `text`, or contains it when `partial` is set. Matching is case sensitive.
pub fn link_text_js(text: &str, partial: bool) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            const target = {text};
            return Array.from(document.querySelectorAll('a')).filter(a => {{
                const label = (a.innerText || a.textContent || '').trim();
                return {partial} ? label.includes(target) : label === target;
            }});
        }})()"#,
        text = js_string(text)?,
        partial = partial
    ))
}

/// Whether a link label satisfies a link-text query.
pub fn link_matches(label: &str, target: &str, partial: bool) -> bool {
    let label = label.trim();
    if partial {
        label.contains(target)
    } else {
        label == target
    }
}
