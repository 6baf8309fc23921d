//! Textual extraction.
//!
//! Last-resort strategy for content the tree pass could not use: relays that
//! JSON-escape the page, truncate it mid-tag, or otherwise mangle markup
//! enough that no element carries the token attribute. Tokens are found by
//! pattern, and names are recovered from the text just before each match.

use regex::Regex;
use tracing::debug;

use crate::codec;
use crate::error::{Error, Result};
use crate::options::TextualFallback;
use crate::patterns::{
    self, BLOCK_TAG, LOOKS_LIKE_TAG, MARKUP_TAG, NAME_DELIMITER, TRUNCATED_TAG_TAIL, UNTERMINATED_TAG,
};
use crate::result::{ContactRecord, RawContent};
use crate::url_utils;
use crate::Options;

/// Whether raw text still looks like markup worth scanning.
///
/// A relay that echoes the requested URL, or returns a bare identifier,
/// produces content with no tags; scanning it can only produce noise.
#[must_use]
pub fn looks_like_markup(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() || url_utils::is_absolute_url(trimmed).0 {
        return false;
    }
    LOOKS_LIKE_TAG.is_match(trimmed)
}

/// Decide whether the textual pass may run on this content.
#[must_use]
pub fn permits_textual_pass(policy: TextualFallback, content: &RawContent) -> bool {
    match policy {
        TextualFallback::Never => false,
        TextualFallback::Always => true,
        TextualFallback::MarkupOnly => looks_like_markup(&content.body),
    }
}

/// Pattern-based record extractor.
#[derive(Debug, Clone)]
pub struct TextualExtractor {
    token: Regex,
    window: usize,
    name_sentinel: String,
}

impl TextualExtractor {
    /// Build an extractor from the harvest options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the token pattern cannot be compiled.
    pub fn new(options: &Options) -> Result<Self> {
        let token = patterns::token_pattern(&options.token_attribute)
            .map_err(|e| Error::InvalidConfig(format!("token pattern: {e}")))?;
        Ok(Self {
            token,
            window: options.text_window,
            name_sentinel: options.name_sentinel.clone(),
        })
    }

    /// Recover records in match order. Never fails; no match is empty.
    #[must_use]
    pub fn extract(&self, content: &RawContent) -> Vec<ContactRecord> {
        self.extract_str(&content.body)
    }

    /// Same as [`extract`](Self::extract) over a bare string.
    #[must_use]
    pub fn extract_str(&self, text: &str) -> Vec<ContactRecord> {
        let records: Vec<_> = self
            .token
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let email = codec::decode_email(caps.get(1)?.as_str())?;
                let name = self
                    .name_before(text, whole.start())
                    .unwrap_or_else(|| self.name_sentinel.clone());
                Some(ContactRecord { name, email })
            })
            .collect();

        debug!(records = records.len(), "textual scan finished");
        records
    }

    /// Candidate name from the window preceding byte offset `end`.
    fn name_before(&self, text: &str, end: usize) -> Option<String> {
        let start = window_start(text, end, self.window);
        let window = &text[start..end];

        let mut cleaned = UNTERMINATED_TAG.replace(window, "").into_owned();
        if start > 0 {
            cleaned = TRUNCATED_TAG_TAIL.replace(&cleaned, "").into_owned();
        }
        // cell and row boundaries act as delimiters so earlier rows never bleed in
        let cleaned = BLOCK_TAG.replace_all(&cleaned, " | ");
        let cleaned = MARKUP_TAG.replace_all(&cleaned, " ");
        let cleaned = patterns::normalize_whitespace(&decode_entities(&cleaned));

        NAME_DELIMITER
            .split(&cleaned)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string)
    }
}

/// Byte offset `window` characters before `end`, clamped to 0.
fn window_start(text: &str, end: usize, window: usize) -> usize {
    text[..end]
        .char_indices()
        .rev()
        .nth(window.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}

/// Decode the handful of entities and JSON escapes that show up around names.
fn decode_entities(text: &str) -> String {
    text.replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\r", " ")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    // "ana@ufjf.br", "bruno@ufjf.br"
    const ANA: &str = "YW5hQHVmamYuYnI=";
    const BRUNO: &str = "YnJ1bm9AdWZqZi5icg==";

    fn extractor() -> TextualExtractor {
        TextualExtractor::new(&Options::default()).expect("default options")
    }

    #[test]
    fn names_come_from_preceding_cell() {
        let text = format!(
            r#"<tr class=\"docentes\"><td>Ana Souza</td><td><button data-email=\"{ANA}\">x</button></td></tr>
               <tr class=\"docentes\"><td>Bruno Lima</td><td><button data-email=\"{BRUNO}\">x</button></td></tr>"#
        );

        assert_eq!(
            extractor().extract_str(&text),
            vec![
                ContactRecord::new("Ana Souza", "ana@ufjf.br"),
                ContactRecord::new("Bruno Lima", "bruno@ufjf.br"),
            ]
        );
    }

    #[test]
    fn json_escaped_markup() {
        let text = format!(
            r#"{{"contents":"<tr>\n<td>Ana Souza<\/td>\n<td><button data-email=\"{ANA}\">x<\/button><\/td><\/tr>"}}"#
        );
        assert_eq!(extractor().extract_str(&text), vec![ContactRecord::new("Ana Souza", "ana@ufjf.br")]);
    }

    #[test]
    fn last_delimited_segment_wins() {
        let text = format!(r#"Docente: Ana Souza <span data-email="{ANA}">"#);
        assert_eq!(extractor().extract_str(&text)[0].name, "Ana Souza");

        let text = format!(r#"Física | Prof. Ana-Maria <span data-email="{ANA}">"#);
        assert_eq!(extractor().extract_str(&text)[0].name, "Prof. Ana-Maria");
    }

    #[test]
    fn sentinel_when_window_is_empty() {
        let text = format!(r#"<b data-email="{ANA}">"#);
        assert_eq!(extractor().extract_str(&text)[0].name, "name not found");

        let text = format!(r#"<td>:</td><b data-email="{ANA}">"#);
        assert_eq!(extractor().extract_str(&text)[0].name, "name not found");
    }

    #[test]
    fn invalid_tokens_are_skipped() {
        let text = format!(r#"<b data-email="@@@"></b> Ana <b data-email="{ANA}">"#);
        let records = extractor().extract_str(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "ana@ufjf.br");
    }

    #[test]
    fn window_truncation_drops_partial_tag() {
        let options = Options {
            text_window: 20,
            ..Options::default()
        };
        let ex = TextualExtractor::new(&options).expect("options");
        // window starts inside the class attribute
        let text = format!(r#"<td class="nome-docente">Ana</td><b data-email="{ANA}">"#);
        assert_eq!(ex.extract_str(&text)[0].name, "Ana");
    }

    #[test]
    fn window_respects_utf8_boundaries() {
        let options = Options {
            text_window: 9,
            ..Options::default()
        };
        let ex = TextualExtractor::new(&options).expect("options");
        let text = format!("ééé João <b data-email=\"{ANA}\">");
        // nine chars before the match: " João <b "
        assert_eq!(ex.extract_str(&text)[0].name, "João");
    }

    #[test]
    fn stray_less_than_keeps_rest_of_window() {
        let text = format!(
            r#"<p>Notas 3 < 5</p><p>Ana Souza <b data-email="{ANA}"></b></p>"#
        );
        assert_eq!(
            extractor().extract_str(&text),
            vec![ContactRecord::new("Ana Souza", "ana@ufjf.br")]
        );
    }

    #[test]
    fn entities_are_decoded() {
        let text = format!(r#"<td>Ana&nbsp;D&#39;Ávila</td><b data-email="{ANA}">"#);
        assert_eq!(extractor().extract_str(&text)[0].name, "Ana D'Ávila");
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = format!(r#"Ana <b data-email="{ANA}"> Bruno <b data-email="{BRUNO}">"#);
        let ex = extractor();
        assert_eq!(ex.extract_str(&text), ex.extract_str(&text));
        assert_eq!(ex.extract_str(&text).len(), 2);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(extractor().extract_str("<p>nothing here</p>").is_empty());
    }

    #[test]
    fn window_start_clamps() {
        assert_eq!(window_start("abc", 3, 10), 0);
        assert_eq!(window_start("abcdef", 6, 2), 4);
        assert_eq!(window_start("", 0, 5), 0);
    }

    #[test]
    fn markup_shape_predicate() {
        assert!(looks_like_markup("<table><tr><td>x</td></tr></table>"));
        assert!(looks_like_markup(r#"{"contents":"<tr class=\"docentes\">"}"#));
        assert!(!looks_like_markup("https://www2.ufjf.br/fisica/institucional/docentes/"));
        assert!(!looks_like_markup("   "));
        assert!(!looks_like_markup("Title: Docentes\n\nAna Souza\nBruno Lima"));
    }

    #[test]
    fn policy_controls_permission() {
        let url_echo = RawContent::raw("https://www2.ufjf.br/fisica/", "relay");
        let markup = RawContent::raw("<p>x</p>", "relay");

        assert!(!permits_textual_pass(TextualFallback::MarkupOnly, &url_echo));
        assert!(permits_textual_pass(TextualFallback::MarkupOnly, &markup));
        assert!(permits_textual_pass(TextualFallback::Always, &url_echo));
        assert!(!permits_textual_pass(TextualFallback::Never, &markup));
    }
}
