//! DOM Operations Adapter
//!
//! The capability the extractors need from an HTML parser: parse text into a
//! navigable tree, select by attribute presence, walk ancestors, and read
//! whitespace-normalized text. Backed by the `dom_query` crate.

// Re-export core types for external use
pub use dom_query::{Document, Selection};

use dom_query::Matcher;

// Re-export StrTendril for external use
pub use tendril::StrTendril;

use crate::patterns;

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Selector matching every element that carries `name`.
#[must_use]
pub fn attribute_selector(name: &str) -> String {
    format!("[{name}]")
}

// === Tag/Node Information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Text content with whitespace runs collapsed and ends trimmed.
///
/// Returns `None` when nothing readable is left.
#[must_use]
pub fn normalized_text(sel: &Selection) -> Option<String> {
    let text = patterns::normalize_whitespace(&text_content(sel));
    (!text.is_empty()).then_some(text)
}

// === Tree Navigation ===

/// Get parent element
#[inline]
#[must_use]
pub fn parent<'a>(sel: &Selection<'a>) -> Selection<'a> {
    sel.parent()
}

/// Nearest ancestor (excluding `sel` itself) with the given tag name.
#[must_use]
pub fn closest_ancestor<'a>(sel: &Selection<'a>, tag: &str) -> Option<Selection<'a>> {
    let mut current = parent(sel);
    while current.exists() {
        if tag_name(&current).is_some_and(|t| t == tag) {
            return Some(current);
        }
        current = parent(&current);
    }
    None
}

// === Querying ===

/// Whether `selector` parses as CSS.
#[must_use]
pub fn is_valid_selector(selector: &str) -> bool {
    Matcher::new(selector).is_ok()
}

/// Query all elements in the document by CSS selector
///
/// An unparsable selector matches nothing.
#[inline]
#[must_use]
pub fn select_all<'a>(doc: &'a Document, selector: &str) -> Selection<'a> {
    doc.try_select(selector).unwrap_or_default()
}

/// Query all elements by CSS selector
///
/// An unparsable selector matches nothing.
#[inline]
#[must_use]
pub fn query_selector_all<'a>(sel: &Selection<'a>, selector: &str) -> Selection<'a> {
    sel.try_select(selector).unwrap_or_default()
}

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}
