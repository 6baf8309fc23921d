//! Structural extraction.
//!
//! Parses the content as HTML and recovers records from elements carrying the
//! encoded-email attribute, naming each one from its surrounding table row.
//! When nothing carries the attribute, a compatibility pass retries against
//! the marker-class rows of older page layouts.
//!
//! Documents are parsed and dropped inside [`StructuredExtractor::extract`],
//! so the extractor holds no tree across calls and stays `Send + Sync`.

use dom_query::{Document, Selection};
use tracing::debug;

use crate::codec;
use crate::dom;
use crate::result::{ContactRecord, RawContent};
use crate::Options;

const ROW_TAG: &str = "tr";
const CELL_SELECTOR: &str = "td, th";

/// Tree-based record extractor.
#[derive(Debug, Clone)]
pub struct StructuredExtractor {
    token_selector: String,
    token_attribute: String,
    legacy_row_selector: String,
    legacy_token_attributes: Vec<String>,
    name_sentinel: String,
}

impl StructuredExtractor {
    /// Build an extractor from the harvest options.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            token_selector: dom::attribute_selector(&options.token_attribute),
            token_attribute: options.token_attribute.clone(),
            legacy_row_selector: options.legacy_row_selector.clone(),
            legacy_token_attributes: options.legacy_token_attributes.clone(),
            name_sentinel: options.name_sentinel.clone(),
        }
    }

    /// Recover records in document order. Never fails; no match is empty.
    #[must_use]
    pub fn extract(&self, content: &RawContent) -> Vec<ContactRecord> {
        self.extract_str(&content.body)
    }

    /// Same as [`extract`](Self::extract) over a bare string.
    #[must_use]
    pub fn extract_str(&self, html: &str) -> Vec<ContactRecord> {
        // html5ever accepts anything; text without a single `<` is not a tree
        if !html.contains('<') {
            return Vec::new();
        }

        let doc = dom::parse(html);

        let records = self.primary_pass(&doc);
        if !records.is_empty() {
            debug!(records = records.len(), "structural primary pass matched");
            return records;
        }

        let records = self.legacy_pass(&doc);
        debug!(records = records.len(), "structural compatibility pass finished");
        records
    }

    fn primary_pass(&self, doc: &Document) -> Vec<ContactRecord> {
        dom::select_all(doc, &self.token_selector)
            .iter()
            .filter_map(|element| {
                let email = dom::get_attribute(&element, &self.token_attribute)
                    .and_then(|token| codec::decode_email(&token))?;
                let name = self.resolve_name(&element);
                Some(ContactRecord { name, email })
            })
            .collect()
    }

    fn legacy_pass(&self, doc: &Document) -> Vec<ContactRecord> {
        dom::select_all(doc, &self.legacy_row_selector)
            .iter()
            .filter_map(|row| {
                let email = self.legacy_token(&row)?;
                let name = first_cell_text(&row).unwrap_or_else(|| self.name_sentinel.clone());
                Some(ContactRecord { name, email })
            })
            .collect()
    }

    /// First decodable token in a legacy row, trying attributes in order.
    fn legacy_token(&self, row: &Selection) -> Option<String> {
        self.legacy_token_attributes.iter().find_map(|attr| {
            dom::query_selector_all(row, &dom::attribute_selector(attr))
                .iter()
                .find_map(|element| {
                    dom::get_attribute(&element, attr).and_then(|token| codec::decode_email(&token))
                })
        })
    }

    /// Name for a token element: first cell of its row, else its parent's text.
    fn resolve_name(&self, element: &Selection) -> String {
        let name = match dom::closest_ancestor(element, ROW_TAG) {
            Some(row) => first_cell_text(&row),
            None => dom::normalized_text(&dom::parent(element)),
        };
        name.unwrap_or_else(|| self.name_sentinel.clone())
    }
}

fn first_cell_text(row: &Selection) -> Option<String> {
    let cell = dom::query_selector_all(row, CELL_SELECTOR).first();
    if cell.exists() {
        dom::normalized_text(&cell)
    } else {
        None
    }
}
