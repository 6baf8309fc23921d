//! Relay endpoints and the ordered chain they form.
//!
//! An endpoint is a template that turns the canonical page URL into a fetch
//! URL on one alternate network path. Order in the chain is precedence.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::url_utils;

/// How an endpoint shapes its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointKind {
    /// The body is the page.
    Raw,

    /// The body is a JSON object holding the page at `field`.
    JsonEnvelope {
        /// Key of the string member carrying the page.
        field: String,
    },

    /// The relay renders the page as text; markup may be gone.
    TextRendering,
}

/// One alternate retrieval path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    /// Short label used in logs and in [`RawContent`](crate::RawContent).
    pub name: String,

    /// URL template with a `{url}` or `{raw_url}` placeholder.
    pub template: String,

    /// Response shape.
    pub kind: EndpointKind,
}

impl ProxyEndpoint {
    /// Endpoint whose body is the page itself.
    pub fn raw(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            kind: EndpointKind::Raw,
        }
    }

    /// Endpoint that wraps the page in a JSON object.
    pub fn json_envelope(
        name: impl Into<String>,
        template: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            kind: EndpointKind::JsonEnvelope {
                field: field.into(),
            },
        }
    }

    /// Endpoint that renders the page as text.
    pub fn text_rendering(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            kind: EndpointKind::TextRendering,
        }
    }

    /// Concrete fetch URL for `target`.
    #[must_use]
    pub fn fetch_url(&self, target: &str) -> String {
        url_utils::expand_template(&self.template, target)
    }
}

/// Ordered, non-empty list of endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyChain {
    endpoints: Vec<ProxyEndpoint>,
}

impl ProxyChain {
    /// Build a chain, rejecting an empty list or a template with no placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the chain cannot be used.
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Result<Self> {
        let chain = Self { endpoints };
        chain.validate()?;
        Ok(chain)
    }

    /// Chain of raw relays built from bare templates, in the given order.
    ///
    /// # Errors
    ///
    /// Same as [`ProxyChain::new`].
    pub fn from_templates<I, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints = templates
            .into_iter()
            .enumerate()
            .map(|(i, template)| ProxyEndpoint::raw(format!("relay-{}", i + 1), template))
            .collect();
        Self::new(endpoints)
    }

    /// Check the chain can drive a fetch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty chain or a template
    /// without a placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::InvalidConfig("proxy chain has no endpoints".into()));
        }
        if let Some(bad) = self
            .endpoints
            .iter()
            .find(|e| !url_utils::has_placeholder(&e.template))
        {
            return Err(Error::InvalidConfig(format!(
                "endpoint `{}` template has no {{url}} or {{raw_url}} placeholder",
                bad.name
            )));
        }
        Ok(())
    }

    /// Endpoints in precedence order.
    #[must_use]
    pub fn endpoints(&self) -> &[ProxyEndpoint] {
        &self.endpoints
    }

    /// Number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false for a validated chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl Default for ProxyChain {
    fn default() -> Self {
        Self {
            endpoints: vec![
                ProxyEndpoint::raw("allorigins-raw", "https://api.allorigins.win/raw?url={url}"),
                ProxyEndpoint::raw("corsproxy", "https://corsproxy.io/?url={url}"),
                ProxyEndpoint::json_envelope(
                    "allorigins-get",
                    "https://api.allorigins.win/get?url={url}",
                    "contents",
                ),
                ProxyEndpoint::text_rendering("jina-reader", "https://r.jina.ai/{raw_url}"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        let chain = ProxyChain::default();
        let names: Vec<_> = chain.endpoints().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["allorigins-raw", "corsproxy", "allorigins-get", "jina-reader"]);
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn empty_chain_rejected() {
        assert!(matches!(ProxyChain::new(vec![]), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn template_without_placeholder_rejected() {
        let err = ProxyChain::new(vec![ProxyEndpoint::raw("fixed", "https://relay.example/page")])
            .expect_err("no placeholder");
        assert!(err.to_string().contains("fixed"));
    }

    #[test]
    fn from_templates_names_in_order() {
        let chain = ProxyChain::from_templates(["https://a/?u={url}", "https://b/{raw_url}"])
            .expect("valid");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.endpoints()[0].name, "relay-1");
        assert_eq!(chain.endpoints()[1].name, "relay-2");
        assert_eq!(chain.endpoints()[1].kind, EndpointKind::Raw);
    }

    #[test]
    fn fetch_url_expands_template() {
        let endpoint = ProxyEndpoint::json_envelope("get", "https://r/get?url={url}", "contents");
        assert_eq!(endpoint.fetch_url("https://x.y/"), "https://r/get?url=https%3A%2F%2Fx.y%2F");
    }
}
