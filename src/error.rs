//! Error types for staff-harvest.
//!
//! Only run-level failures live here. Per-record problems (an undecodable
//! token, a row with no readable name) are absorbed by the extractors and
//! never reach the caller.

/// Why a single endpoint attempt did not produce usable content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    /// The relay answered with a non-2xx status.
    #[error("relay returned HTTP {0}")]
    Status(u16),

    /// The relay answered 2xx but the body (or envelope field) was empty.
    #[error("relay returned an empty body")]
    EmptyBody,

    /// The relay's JSON envelope could not be read.
    #[error("relay envelope unreadable: {0}")]
    Envelope(String),

    /// Connection, TLS or body-read failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The per-attempt deadline elapsed.
    #[error("attempt timed out")]
    TimedOut,
}

/// Error type for harvesting operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every endpoint in the proxy chain failed.
    #[error("all {attempts} relay endpoints failed; last: {last}")]
    FetchExhausted {
        /// Number of endpoints tried.
        attempts: usize,
        /// The most recent underlying failure.
        #[source]
        last: AttemptFailure,
    },

    /// Content was retrieved but no extraction strategy produced a record.
    #[error("no contact records found; check the URL or the page structure")]
    NoRecordsFound,

    /// The run was abandoned through its cancellation token.
    #[error("harvest cancelled")]
    Cancelled,

    /// The supplied options cannot drive a run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for harvesting operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_last_cause() {
        let err = Error::FetchExhausted {
            attempts: 3,
            last: AttemptFailure::Status(503),
        };
        assert_eq!(
            err.to_string(),
            "all 3 relay endpoints failed; last: relay returned HTTP 503"
        );
    }

    #[test]
    fn exhausted_exposes_last_cause_as_source() {
        let err = Error::FetchExhausted {
            attempts: 4,
            last: AttemptFailure::TimedOut,
        };
        let source = std::error::Error::source(&err).expect("last attempt is the source");
        assert_eq!(source.to_string(), "attempt timed out");
        assert!(std::error::Error::source(&Error::NoRecordsFound).is_none());
    }

    #[test]
    fn attempt_failure_messages() {
        assert_eq!(AttemptFailure::EmptyBody.to_string(), "relay returned an empty body");
        assert_eq!(AttemptFailure::TimedOut.to_string(), "attempt timed out");
        assert!(AttemptFailure::Transport("refused".into())
            .to_string()
            .contains("refused"));
    }
}
