//! Email token codec.
//!
//! Staff pages hide addresses in a base64 attribute so that naive crawlers
//! only see noise. Decoding uses the standard RFC 4648 alphabet with padding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A token could not be turned back into text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Bad alphabet, bad length or bad padding.
    #[error("invalid base64 token: {0}")]
    Base64(String),

    /// The decoded bytes are not UTF-8.
    #[error("decoded token is not valid UTF-8")]
    Utf8,
}

/// Decode an encoded email token into plain text.
///
/// Surrounding ASCII whitespace is ignored and the decoded text is trimmed.
///
/// # Errors
///
/// Returns [`DecodeError`] when the token is not standard padded base64 or
/// does not decode to UTF-8.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD
        .decode(token.trim_ascii())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;
    Ok(text.trim().to_string())
}

/// Decode a token into an email, treating failure and emptiness alike.
///
/// This is the form both extractors consume: a `None` means "drop the record
/// and keep going".
#[must_use]
pub fn decode_email(token: &str) -> Option<String> {
    match decode(token) {
        Ok(email) if !email.is_empty() => Some(email),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(token, error = %err, "skipping undecodable token");
            None
        }
    }
}
