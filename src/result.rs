//! Data model for harvest input and output.
//!
//! Everything here is transient: built and dropped within a single run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proxy::EndpointKind;

/// Default name used when no containing text can be recovered.
pub const NAME_NOT_FOUND: &str = "name not found";

/// A staff-listing page to harvest.
///
/// `url` is the canonical page address, never a relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Department {
    /// Display name, e.g. "Física".
    pub name: String,

    /// Canonical page URL.
    pub url: String,
}

impl Department {
    /// Build a department from anything string-like.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A recovered `{name, email}` pair.
///
/// `email` is never empty. `name` is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Person's name, or the configured sentinel.
    pub name: String,

    /// Decoded address.
    pub email: String,
}

impl ContactRecord {
    /// Build a record from anything string-like.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Body text from a successful fetch, tagged with the endpoint that served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// Page text, already decoded to UTF-8 and unwrapped from any envelope.
    pub body: String,

    /// Name of the endpoint that produced it.
    pub endpoint: String,

    /// How that endpoint shapes its responses.
    pub kind: EndpointKind,
}

impl RawContent {
    /// Content as served by a plain relay.
    pub fn raw(body: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            endpoint: endpoint.into(),
            kind: EndpointKind::Raw,
        }
    }
}

/// Which extraction strategy produced the final records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Parsed tree, attribute-bearing elements.
    Structural,
    /// Pattern matching over raw text.
    Textual,
}

/// Outcome of a successful run, shaped for the history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    /// The department that was harvested.
    pub department: Department,

    /// Endpoint that served the content.
    pub endpoint: String,

    /// Strategy whose records were kept.
    pub strategy: Strategy,

    /// Records in document order.
    pub records: Vec<ContactRecord>,

    /// When the content was retrieved.
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_snake_case_strategy() {
        let report = HarvestReport {
            department: Department::new("Física", "https://www2.ufjf.br/fisica/"),
            endpoint: "allorigins-raw".into(),
            strategy: Strategy::Textual,
            records: vec![ContactRecord::new("Ana", "ana@ufjf.br")],
            fetched_at: DateTime::<Utc>::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["strategy"], "textual");
        assert_eq!(json["records"][0]["email"], "ana@ufjf.br");
        assert_eq!(json["department"]["name"], "Física");
        assert_eq!(json["fetched_at"], "1970-01-01T00:00:00Z");
    }
}
