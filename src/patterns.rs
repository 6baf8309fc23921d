//! Compiled regex patterns for extraction.
//!
//! Fixed patterns are compiled once using `LazyLock`. The token pattern depends
//! on the configured attribute name and is built per extractor.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Matches a complete tag-like sequence (`<td class="x">`, `</tr>`, `<!-- -->`).
pub static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^<>]*>").expect("MARKUP_TAG regex")
});

/// Matches block-level tags, which separate cells and rows in flattened text.
///
/// Accepts the JSON-escaped `<\/td>` form.
pub static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\\?/?(?:td|th|tr|li|p|div|br|table|tbody|thead|ul|ol|dd|dt|h[1-6])\b[^<>]*>")
        .expect("BLOCK_TAG regex")
});

/// Matches the last tag opened but not closed before the end of the text.
///
/// Earlier stray `<` characters (`nota < 5`) are left alone.
pub static UNTERMINATED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^<>]*$").expect("UNTERMINATED_TAG regex")
});

/// Matches the tail of a tag cut off at the start of the text (`ss="row">`).
pub static TRUNCATED_TAG_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^<]*>").expect("TRUNCATED_TAG_TAIL regex")
});

/// Delimiters that separate a label or a previous column from a name.
///
/// Colon, pipe, bullets, en/em dashes, and an ASCII hyphen only when spaced
/// (so "Ana-Maria" survives).
pub static NAME_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[:|•·–—]|\s-\s").expect("NAME_DELIMITER regex")
});

// =============================================================================
// Content Shape Patterns
// =============================================================================

/// Matches anything that looks like an HTML tag, used to decide whether
/// content is still markup.
pub static LOOKS_LIKE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[A-Za-z!/][^<>]*>").expect("LOOKS_LIKE_TAG regex")
});

// =============================================================================
// Token Pattern
// =============================================================================

/// Build the pattern that finds an encoded token in raw text.
///
/// Matches `attr="TOKEN"`, `attr='TOKEN'`, `attr=TOKEN` and the JSON-escaped
/// `attr=\"TOKEN\"`. Capture group 1 is the token.
///
/// # Errors
///
/// Returns the regex error if the resulting pattern is too large; the
/// attribute name itself is escaped.
pub fn token_pattern(attribute: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?i){}\s*=\s*\\?["']?([A-Za-z0-9+/]+={{0,2}})"#,
        regex::escape(attribute)
    ))
}

/// Collapse whitespace runs into a single space and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text, " ").trim().to_string()
}
