use super::css::js_string;
use crate::error::Result;

/// JS expression returning all element nodes matched by an XPath expression.
pub fn query_all_js(xpath: &str) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            const xpathResult = document.evaluate(
                {xpath},
                document,
                null,
                XPathResult.ORDERED_NODE_SNAPSHOT_TYPE,
                null
            );
            const results = [];
            for (let i = 0; i < xpathResult.snapshotLength; i++) {{
                const el = xpathResult.snapshotItem(i);
                if (el.nodeType === Node.ELEMENT_NODE) {{
                    results.push(el);
                }}
            }}
            return results;
        }})()"#,
        xpath = js_string(xpath)?
    ))
}
