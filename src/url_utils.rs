//! URL Utility Functions
//!
//! Absolute-URL detection (used by the content-shape predicate) and expansion
//! of relay endpoint templates.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters left as-is in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Placeholder replaced by the percent-encoded target URL.
pub const ENCODED_PLACEHOLDER: &str = "{url}";

/// Placeholder replaced by the target URL verbatim (path-style relays).
pub const RAW_PLACEHOLDER: &str = "{raw_url}";

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() || s.contains(char::is_whitespace) {
        return (false, None);
    }

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Whether a template carries one of the recognised placeholders.
#[must_use]
pub fn has_placeholder(template: &str) -> bool {
    template.contains(ENCODED_PLACEHOLDER) || template.contains(RAW_PLACEHOLDER)
}

/// Percent-encode a target URL for use as a query component.
///
/// Spaces become `%20`, never `+`.
#[must_use]
pub fn encode_component(target: &str) -> String {
    utf8_percent_encode(target, COMPONENT).to_string()
}

/// Expand a relay template for one target page.
///
/// ```rust
/// use staff_harvest::url_utils::expand_template;
///
/// assert_eq!(
///     expand_template("https://relay.example/get?url={url}", "https://a.b/c?d=1"),
///     "https://relay.example/get?url=https%3A%2F%2Fa.b%2Fc%3Fd%3D1"
/// );
/// assert_eq!(
///     expand_template("https://reader.example/{raw_url}", "https://a.b/c"),
///     "https://reader.example/https://a.b/c"
/// );
/// ```
#[must_use]
pub fn expand_template(template: &str, target: &str) -> String {
    let target = target.trim();
    template
        .replace(ENCODED_PLACEHOLDER, &encode_component(target))
        .replace(RAW_PLACEHOLDER, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute_url_valid() {
        let (is_abs, url) = is_absolute_url("https://www2.ufjf.br/fisica/institucional/docentes/");
        assert!(is_abs);
        assert_eq!(url.and_then(|u| u.host_str().map(String::from)), Some("www2.ufjf.br".to_string()));
    }

    #[test]
    fn test_is_absolute_url_trims() {
        assert!(is_absolute_url("  https://example.com/x \n").0);
    }

    #[test]
    fn test_is_absolute_url_rejects() {
        assert!(!is_absolute_url("").0);
        assert!(!is_absolute_url("/relative/path").0);
        assert!(!is_absolute_url("ftp://example.com").0);
        assert!(!is_absolute_url("https://").0);
        assert!(!is_absolute_url("https://example.com see <b>more</b>").0);
    }

    #[test]
    fn test_has_placeholder() {
        assert!(has_placeholder("https://r/?url={url}"));
        assert!(has_placeholder("https://r/{raw_url}"));
        assert!(!has_placeholder("https://r/fixed"));
    }

    #[test]
    fn test_expand_template_encodes_query() {
        let expanded = expand_template(
            "https://api.allorigins.win/get?url={url}",
            "https://www2.ufjf.br/mat/institucional/corpo-docente/docentes/",
        );
        assert_eq!(
            expanded,
            "https://api.allorigins.win/get?url=https%3A%2F%2Fwww2.ufjf.br%2Fmat%2Finstitucional%2Fcorpo-docente%2Fdocentes%2F"
        );
    }

    #[test]
    fn test_encode_component_matches_uri_component_rules() {
        assert_eq!(encode_component("a b+c"), "a%20b%2Bc");
        assert_eq!(encode_component("f(x)!~*'-_."), "f(x)!~*'-_.");
        assert_eq!(encode_component("física"), "f%C3%ADsica");
        assert_eq!(
            encode_component("https://www2.ufjf.br/fisica/?q=a&b=c"),
            "https%3A%2F%2Fwww2.ufjf.br%2Ffisica%2F%3Fq%3Da%26b%3Dc"
        );
    }

    #[test]
    fn test_expand_template_raw() {
        let expanded = expand_template("https://r.jina.ai/{raw_url}", " https://a.b/c ");
        assert_eq!(expanded, "https://r.jina.ai/https://a.b/c");
    }
}
