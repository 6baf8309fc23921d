//! Configuration options for harvesting.
//!
//! The `Options` struct controls which relays are tried, how long each may
//! take, and how the extractors recognise tokens and names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dom;
use crate::error::{Error, Result};
use crate::proxy::ProxyChain;
use crate::result::NAME_NOT_FOUND;

/// When the textual fallback may run after an empty structural pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextualFallback {
    /// Never scan raw text.
    Never,

    /// Scan only when the content still looks like markup.
    #[default]
    MarkupOnly,

    /// Scan whenever the structural pass finds nothing.
    Always,
}

/// Configuration options for a harvest run.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use staff_harvest::{Options, ProxyChain};
///
/// let options = Options {
///     attempt_timeout: Duration::from_secs(5),
///     proxy_chain: ProxyChain::from_templates(["https://relay.example/?url={url}"])?,
///     ..Options::default()
/// };
/// assert!(options.validate().is_ok());
/// # Ok::<(), staff_harvest::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Relays tried in order until one returns a usable body.
    ///
    /// Default: allorigins raw, corsproxy, allorigins JSON, jina reader
    pub proxy_chain: ProxyChain,

    /// Deadline for a single relay attempt.
    ///
    /// Default: 20 seconds
    pub attempt_timeout: Duration,

    /// `User-Agent` sent to relays.
    ///
    /// Default: `staff-harvest/<version>`
    pub user_agent: String,

    /// Attribute carrying the encoded email token.
    ///
    /// Default: `data-email`
    pub token_attribute: String,

    /// Row selector for the compatibility pass over older layouts.
    ///
    /// Default: `tr.docentes`
    pub legacy_row_selector: String,

    /// Token attributes recognised inside legacy rows, in preference order.
    ///
    /// Default: `data-email`, `data-mail`, `data-encoded-email`
    pub legacy_token_attributes: Vec<String>,

    /// Characters preceding a textual match used as naming context.
    ///
    /// Default: `300`
    pub text_window: usize,

    /// When the textual fallback may run.
    ///
    /// Default: [`TextualFallback::MarkupOnly`]
    pub textual_fallback: TextualFallback,

    /// Name used when no text can be recovered for a record.
    ///
    /// Default: `"name not found"`
    pub name_sentinel: String,
}

impl Options {
    /// Check that the options can drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an unusable chain, a zero timeout,
    /// an empty token attribute, an attribute or row selector that does not
    /// parse as CSS, or a zero text window.
    pub fn validate(&self) -> Result<()> {
        self.proxy_chain.validate()?;
        if self.attempt_timeout.is_zero() {
            return Err(Error::InvalidConfig("attempt timeout must be positive".into()));
        }
        if self.token_attribute.trim().is_empty() {
            return Err(Error::InvalidConfig("token attribute is empty".into()));
        }
        let attribute_selectors = std::iter::once(&self.token_attribute)
            .chain(&self.legacy_token_attributes)
            .map(|attr| dom::attribute_selector(attr));
        for selector in attribute_selectors.chain(std::iter::once(self.legacy_row_selector.clone())) {
            if !dom::is_valid_selector(&selector) {
                return Err(Error::InvalidConfig(format!(
                    "`{selector}` is not a valid CSS selector"
                )));
            }
        }
        if self.text_window == 0 {
            return Err(Error::InvalidConfig("text window must be positive".into()));
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            proxy_chain: ProxyChain::default(),
            attempt_timeout: Duration::from_secs(20),
            user_agent: concat!("staff-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            token_attribute: "data-email".to_string(),
            legacy_row_selector: "tr.docentes".to_string(),
            legacy_token_attributes: vec![
                "data-email".to_string(),
                "data-mail".to_string(),
                "data-encoded-email".to_string(),
            ],
            text_window: 300,
            textual_fallback: TextualFallback::MarkupOnly,
            name_sentinel: NAME_NOT_FOUND.to_string(),
        }
    }
}
