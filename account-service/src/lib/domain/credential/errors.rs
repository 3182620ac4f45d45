use auth::PasswordError;
use auth::ResetTokenError;
use auth::TokenError;
use thiserror::Error;

/// Error for CredentialId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Error for notification delivery
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Failed to send notification: {0}")]
    SendFailed(String),
}

/// Top-level error for all credential and authentication operations.
///
/// Every failure is raised where it is detected and propagated unmodified to
/// the HTTP boundary, which maps each kind to a status. Token failures
/// (malformed, expired, bad signature, stale) all collapse to 401 there.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid credential ID: {0}")]
    InvalidCredentialId(#[from] CredentialIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password too short: minimum {min} characters")]
    PasswordTooShort { min: usize },

    /// Covers "no such token" and "expired token" alike; callers must not be
    /// able to tell which occurred.
    #[error("Invalid or expired reset token")]
    ResetTokenInvalid,

    /// Structurally valid, unexpired token whose subject changed its password
    /// after issuance.
    #[error("Password was changed after this token was issued")]
    StaleToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    // Infrastructure errors
    #[error("Stored credential is corrupt: {0}")]
    CorruptCredential(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            // A digest we cannot parse means the stored record is damaged
            PasswordError::CorruptDigest(e) => AuthError::CorruptCredential(e),
            other => AuthError::Unknown(other.to_string()),
        }
    }
}

impl From<ResetTokenError> for AuthError {
    fn from(err: ResetTokenError) -> Self {
        AuthError::Unknown(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
