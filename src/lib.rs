//! # staff-harvest
//!
//! Harvests `{name, email}` contact records from institutional staff-listing
//! pages that hide addresses behind base64 attributes and block direct
//! cross-origin retrieval.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use staff_harvest::{catalog, ExtractionOrchestrator, Options};
//!
//! # async fn demo() -> staff_harvest::Result<()> {
//! let harvester = ExtractionOrchestrator::new(Options::default())?;
//! let department = catalog::find("Física").expect("known department");
//!
//! for record in harvester.run(&department).await? {
//!     println!("{}\t{}", record.name, record.email);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **Fetch**: the page is requested through an ordered chain of relays,
//!   one attempt each, first usable body wins
//! - **Structural pass**: the body is parsed as HTML and every element
//!   carrying the token attribute becomes a record named after its table row
//! - **Textual pass**: only when the structural pass found nothing and the
//!   body still looks like markup, tokens are found by pattern instead
//!
//! Extraction alone is available without any networking:
//!
//! ```rust
//! use staff_harvest::{extract_records, Options, RawContent};
//!
//! let html = r#"<table><tr><td>Ana Souza</td>
//!     <td><button data-email="YW5hQHVmamYuYnI=">copy</button></td></tr></table>"#;
//! let records = extract_records(&RawContent::raw(html, "inline"), &Options::default())?;
//! assert_eq!(records[0].name, "Ana Souza");
//! assert_eq!(records[0].email, "ana@ufjf.br");
//! # Ok::<(), staff_harvest::Error>(())
//! ```

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Email token codec (standard base64).
pub mod codec;

/// Character encoding detection for fetched bodies.
pub mod encoding;

/// URL utilities for endpoint templates and shape checks.
pub mod url_utils;

/// Relay endpoints and the ordered proxy chain.
pub mod proxy;

/// Sequential proxy-chain fetching.
pub mod fetch;

/// Tree-based record extraction.
pub mod structured;

/// Pattern-based fallback extraction.
pub mod textual;

/// Fetch → extract orchestration.
pub mod orchestrator;

/// Built-in department catalog.
pub mod catalog;

// Public API - re-exports
pub use codec::DecodeError;
pub use error::{AttemptFailure, Error, Result};
pub use fetch::{PageFetcher, ProxyChainFetcher};
pub use options::{Options, TextualFallback};
pub use orchestrator::{ExtractionOrchestrator, Stage};
pub use proxy::{EndpointKind, ProxyChain, ProxyEndpoint};
pub use result::{ContactRecord, Department, HarvestReport, RawContent, Strategy, NAME_NOT_FOUND};
pub use structured::StructuredExtractor;
pub use textual::TextualExtractor;

/// Runs both extraction strategies over already-fetched content.
///
/// Applies the same decision policy as a full run: structural records win
/// when there are any, otherwise the textual pass runs if the options permit.
/// Returns an empty vector rather than [`Error::NoRecordsFound`].
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if the options are unusable.
pub fn extract_records(content: &RawContent, options: &Options) -> Result<Vec<ContactRecord>> {
    options.validate()?;
    let records = StructuredExtractor::new(options).extract(content);
    if !records.is_empty() || !textual::permits_textual_pass(options.textual_fallback, content) {
        return Ok(records);
    }
    Ok(TextualExtractor::new(options)?.extract(content))
}
