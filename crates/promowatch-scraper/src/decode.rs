//! Response body decoding.
//!
//! The charset comes from the `Content-Type` header when it names one,
//! otherwise from a `<meta>` declaration near the top of the markup. A byte
//! order mark overrides both. Anything unrecognised decodes as UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

/// Bytes of markup searched for a `<meta>` charset declaration.
const SNIFF_LIMIT: usize = 1024;

/// Matches both `<meta charset="gbk">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=gb2312">`.
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#)
        .expect("valid meta charset regex")
});

/// Decodes `body` to a string using the charset declared by
/// `content_type` or, failing that, by the markup itself.
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(header_charset)
        .or_else(|| meta_charset(body))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "body contained malformed sequences");
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(SNIFF_LIMIT)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // "春季美食节" in GBK.
    const GBK_TEXT: &[u8] = b"\xb4\xba\xbc\xbe\xc3\xc0\xca\xb3\xbd\xda";

    fn page(head: &str) -> Vec<u8> {
        let mut body = format!("<html><head>{head}</head><body><h3>").into_bytes();
        body.extend_from_slice(GBK_TEXT);
        body.extend_from_slice(b"</h3></body></html>");
        body
    }

    #[test]
    fn header_charset_wins() {
        let body = page("");
        let text = decode_body(&body, Some("text/html; charset=GBK"));
        assert!(text.contains("春季美食节"), "got: {text}");
    }

    #[test]
    fn meta_charset_used_when_header_has_none() {
        let body = page(r#"<meta charset="gbk">"#);
        let text = decode_body(&body, Some("text/html"));
        assert!(text.contains("春季美食节"), "got: {text}");
    }

    #[test]
    fn http_equiv_content_type_is_recognised() {
        let body = page(r#"<meta http-equiv="Content-Type" content="text/html; charset=gb2312">"#);
        let text = decode_body(&body, None);
        assert!(text.contains("春季美食节"), "got: {text}");
    }

    #[test]
    fn defaults_to_utf8() {
        let text = decode_body("万豪旅享家".as_bytes(), Some("text/html"));
        assert_eq!(text, "万豪旅享家");
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let text = decode_body("万豪".as_bytes(), Some("text/html; charset=x-made-up"));
        assert_eq!(text, "万豪");
    }

    #[test]
    fn meta_declaration_past_sniff_window_is_ignored() {
        let mut body = vec![b' '; SNIFF_LIMIT];
        body.extend_from_slice("<meta charset=\"gbk\"><p>万豪</p>".as_bytes());
        let text = decode_body(&body, None);
        assert!(text.contains("万豪"));
    }
}
