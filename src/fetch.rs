//! Sequential proxy-chain fetching.
//!
//! The origin blocks direct retrieval, so pages are requested through an
//! ordered list of relays. Each relay gets exactly one attempt; the first
//! 2xx response with a non-empty body wins. Attempts never overlap.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::encoding;
use crate::error::{AttemptFailure, Error, Result};
use crate::proxy::{EndpointKind, ProxyChain, ProxyEndpoint};
use crate::result::RawContent;
use crate::Options;

/// Anything that can turn a canonical page URL into page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `target_url`, giving up early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// [`Error::FetchExhausted`] when no source produced content,
    /// [`Error::Cancelled`] when the token fired first.
    async fn fetch(&self, target_url: &str, cancel: &CancellationToken) -> Result<RawContent>;
}

/// Fetcher that walks a [`ProxyChain`] in order.
#[derive(Debug, Clone)]
pub struct ProxyChainFetcher {
    client: reqwest::Client,
    chain: ProxyChain,
}

impl ProxyChainFetcher {
    /// Build a fetcher with the chain, deadline and user agent from `options`.
    ///
    /// The client keeps no cookies, sends no `Referer`, and asks every relay
    /// for a fresh copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the options are invalid or the HTTP
    /// client cannot be built.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .timeout(options.attempt_timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .referer(false)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            chain: options.proxy_chain.clone(),
        })
    }

    /// The chain this fetcher walks.
    #[must_use]
    pub fn chain(&self) -> &ProxyChain {
        &self.chain
    }

    /// Fetch without an external cancellation signal.
    ///
    /// # Errors
    ///
    /// [`Error::FetchExhausted`] when every endpoint failed.
    pub async fn fetch_url(&self, target_url: &str) -> Result<RawContent> {
        self.fetch(target_url, &CancellationToken::new()).await
    }

    /// One attempt against one endpoint.
    async fn attempt(
        &self,
        endpoint: &ProxyEndpoint,
        target_url: &str,
    ) -> std::result::Result<String, AttemptFailure> {
        let fetch_url = endpoint.fetch_url(target_url);
        debug!(endpoint = %endpoint.name, url = %fetch_url, "requesting");

        let response = self
            .client
            .get(&fetch_url)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport_failure)?;

        let body = match &endpoint.kind {
            EndpointKind::Raw | EndpointKind::TextRendering => {
                encoding::decode_body(&bytes, content_type.as_deref())
            }
            EndpointKind::JsonEnvelope { field } => unwrap_envelope(&bytes, field)?,
        };

        if body.trim().is_empty() {
            return Err(AttemptFailure::EmptyBody);
        }
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for ProxyChainFetcher {
    async fn fetch(&self, target_url: &str, cancel: &CancellationToken) -> Result<RawContent> {
        let mut last = AttemptFailure::EmptyBody;
        let mut attempts = 0;

        for endpoint in self.chain.endpoints() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            attempts += 1;

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                outcome = self.attempt(endpoint, target_url) => outcome,
            };

            match outcome {
                Ok(body) => {
                    info!(endpoint = %endpoint.name, bytes = body.len(), "relay served content");
                    return Ok(RawContent {
                        body,
                        endpoint: endpoint.name.clone(),
                        kind: endpoint.kind.clone(),
                    });
                }
                Err(failure) => {
                    warn!(endpoint = %endpoint.name, error = %failure, "relay attempt failed");
                    last = failure;
                }
            }
        }

        Err(Error::FetchExhausted { attempts, last })
    }
}

fn transport_failure(err: reqwest::Error) -> AttemptFailure {
    if err.is_timeout() {
        AttemptFailure::TimedOut
    } else {
        AttemptFailure::Transport(err.to_string())
    }
}

/// Pull the page string out of a JSON envelope.
fn unwrap_envelope(bytes: &[u8], field: &str) -> std::result::Result<String, AttemptFailure> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AttemptFailure::Envelope(e.to_string()))?;
    match value.get(field) {
        Some(Value::String(contents)) => Ok(contents.clone()),
        Some(Value::Null) | None => Err(AttemptFailure::EmptyBody),
        Some(other) => Err(AttemptFailure::Envelope(format!(
            "field `{field}` is {}, expected a string",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_contents_extracted() {
        let body = br#"{"contents":"<p>x</p>","status":{"http_code":200}}"#;
        assert_eq!(unwrap_envelope(body, "contents").as_deref(), Ok("<p>x</p>"));
    }

    #[test]
    fn envelope_missing_or_null_is_empty() {
        assert_eq!(unwrap_envelope(br#"{"status":{}}"#, "contents"), Err(AttemptFailure::EmptyBody));
        assert_eq!(unwrap_envelope(br#"{"contents":null}"#, "contents"), Err(AttemptFailure::EmptyBody));
    }

    #[test]
    fn envelope_wrong_type_or_bad_json() {
        assert!(matches!(
            unwrap_envelope(br#"{"contents":42}"#, "contents"),
            Err(AttemptFailure::Envelope(msg)) if msg.contains("a number")
        ));
        assert!(matches!(
            unwrap_envelope(b"<html>not json</html>", "contents"),
            Err(AttemptFailure::Envelope(_))
        ));
    }

    #[test]
    fn new_rejects_invalid_options() {
        let options = Options {
            attempt_timeout: std::time::Duration::ZERO,
            ..Options::default()
        };
        assert!(matches!(ProxyChainFetcher::new(&options), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn new_keeps_chain() {
        let fetcher = ProxyChainFetcher::new(&Options::default()).expect("client");
        assert_eq!(fetcher.chain().len(), 4);
    }
}
