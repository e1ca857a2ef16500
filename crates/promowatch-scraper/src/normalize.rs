//! Text and URL normalization for extracted candidates.

use reqwest::Url;

/// Collapses every run of whitespace (including non-breaking spaces) into a
/// single space and trims both ends. Zero-width characters that pages use
/// for layout are dropped. CJK text passes through untouched.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.replace(['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'], ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of characters (not bytes) in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Resolves `href` against `page_url`.
///
/// Returns `None` for empty hrefs, in-page anchors, `javascript:` and
/// `mailto:` links, and anything that does not resolve to an http(s) URL.
#[must_use]
pub fn resolve_link(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("mailto:") {
        return None;
    }

    let resolved = match Url::parse(page_url) {
        Ok(base) => base.join(href).ok()?,
        Err(_) => Url::parse(href).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
