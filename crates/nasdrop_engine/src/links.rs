use std::sync::LazyLock;

use regex::Regex;

// Literal href values of anchor tags, double- or single-quoted.
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("anchor pattern is valid")
});

/// Every anchor target in `html`, in document order, exactly as written in the markup.
///
/// Nothing is resolved or filtered beyond dropping empty targets.
pub fn extract_links(html: &str) -> Vec<String> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|href| !href.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
