use thiserror::Error;

/// Error type for bearer token operations.
///
/// Decoding failures are kept distinct so callers can decide how much to
/// reveal; the HTTP boundary collapses all of them to 401.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    BadSignature,
}
