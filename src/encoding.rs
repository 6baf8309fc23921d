//! Character encoding detection for fetched page bodies.
//!
//! Older institutional sites still serve ISO-8859-1 pages, and relays pass the
//! bytes through untouched. Bodies are decoded to UTF-8 before any extraction
//! so that names like "Física" survive.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match `charset=...` inside a `Content-Type` header value
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Pick the encoding of a response body.
///
/// Order of precedence:
/// 1. A byte-order mark
/// 2. The `charset` parameter of the `Content-Type` header
/// 3. A `<meta charset>` or `http-equiv` declaration in the first 1024 bytes
/// 4. UTF-8
#[must_use]
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    let from_header = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()));
    if let Some(encoding) = from_header {
        return encoding;
    }

    let head = String::from_utf8_lossy(&body[..body.len().min(1024)]);
    meta_charset(&head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn header_charset(content_type: &str) -> Option<String> {
    HEADER_CHARSET_RE
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Covers both `<meta charset=...>` and the `http-equiv` form, whose
/// `content` attribute carries `charset=` as well.
fn meta_charset(html: &str) -> Option<String> {
    CHARSET_META_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a response body to a UTF-8 string.
///
/// Invalid sequences become U+FFFD rather than errors; a relay returning
/// mojibake still gets a chance at extraction.
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(body, content_type);
    let (decoded, _encoding_used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
