use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::credential::errors::CredentialIdError;
use crate::credential::errors::EmailError;
use crate::credential::errors::RoleError;

/// Credential aggregate entity.
///
/// Persisted identity with hashed password, role, and reset state. The
/// plaintext password never appears here; `password_hash` is the only form
/// that leaves the hasher.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CredentialId,
    pub email: EmailAddress,
    pub role: Role,
    pub password_hash: String,
    pub password_changed_at: DateTime<Utc>,
    /// Outstanding password-reset request, if any. Digest and expiry are one
    /// value so they can only be set and cleared together.
    pub reset_request: Option<ResetRequest>,
    /// Blocked credentials are excluded from every lookup the auth path uses.
    pub blocked: bool,
}

impl Credential {
    /// Whether the password changed after a token issued at `iat_seconds`
    /// (Unix timestamp). Such a token is stale and must be rejected.
    pub fn changed_password_after(&self, iat_seconds: i64) -> bool {
        self.password_changed_at.timestamp() > iat_seconds
    }
}

/// An outstanding password-reset request: the SHA-256 digest of the token
/// plaintext plus its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Credential unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId(pub Uuid);

impl CredentialId {
    /// Generate a new random credential ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a credential ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, CredentialIdError> {
        Uuid::parse_str(s)
            .map(CredentialId)
            .map_err(|e| CredentialIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role of a credential within the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser and normalizes to
/// lowercase, since the address is the login key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, case-normalized email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Claims carried by an access token.
///
/// `iat`/`exp` are Unix timestamps in seconds. The lifetime is policy set at
/// issuance; verification additionally re-checks the subject's
/// `password_changed_at` against `iat`, which is why token verification is
/// a service operation and not a pure function of the token bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Verified identity attached to a request after the guard allows it.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    pub id: CredentialId,
    pub email: String,
    pub role: Role,
    pub issued_at: i64,
}

/// Command to create a new credential with domain types
#[derive(Debug)]
pub struct SignupCommand {
    pub email: EmailAddress,
    pub password: String,
    pub password_confirm: String,
}

impl SignupCommand {
    pub fn new(email: EmailAddress, password: String, password_confirm: String) -> Self {
        Self {
            email,
            password,
            password_confirm,
        }
    }
}

/// Command to redeem a reset token and set a new password.
#[derive(Debug)]
pub struct ResetPasswordCommand {
    pub password: String,
    pub password_confirm: String,
}

/// Command to change a password while authenticated.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub password: String,
    pub password_confirm: String,
}
