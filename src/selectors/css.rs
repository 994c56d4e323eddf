use crate::error::{GuardError, Result};

/// Build `*[attr<op>"value"]` with the value escaped for a CSS quoted string.
pub fn attribute_selector(attribute: &str, op: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!(r#"*[{attribute}{op}"{escaped}"]"#)
}

/// Split a selector produced by [`attribute_selector`] back into
/// `(attribute, op, value)`. Other CSS is not understood.
pub fn parse_attribute_selector(selector: &str) -> Option<(&str, &str, String)> {
    let inner = selector.strip_prefix("*[")?.strip_suffix("\"]")?;
    let quote = inner.find('"')?;
    let (head, quoted) = inner.split_at(quote);
    let (attribute, op) = if let Some(attribute) = head.strip_suffix("~=") {
        (attribute, "~=")
    } else {
        (head.strip_suffix('=')?, "=")
    };

    let mut value = String::new();
    let mut chars = quoted[1..].chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            value.push(chars.next()?);
        } else {
            value.push(c);
        }
    }
    Some((attribute, op, value))
}

/// Encode a string as a JS literal.
pub(crate) fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| GuardError::InvalidAction(e.to_string()))
}

/// JS expression returning all elements matching a CSS selector.
pub fn query_all_js(selector: &str) -> Result<String> {
    Ok(format!(
        "Array.from(document.querySelectorAll({}))",
        js_string(selector)?
    ))
}

/// JS expression returning all elements with the given tag name.
pub fn tag_name_js(tag: &str) -> Result<String> {
    Ok(format!(
        "Array.from(document.getElementsByTagName({}))",
        js_string(tag)?
    ))
}
