use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::AuthError;
use crate::credential::errors::NotifierError;
use crate::credential::models::AuthenticatedCaller;
use crate::credential::models::ChangePasswordCommand;
use crate::credential::models::Credential;
use crate::credential::models::CredentialId;
use crate::credential::models::EmailAddress;
use crate::credential::models::ResetPasswordCommand;
use crate::credential::models::SignupCommand;

/// Port for the credential lifecycle service.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create a new credential from validated input.
    ///
    /// # Errors
    /// * `PasswordTooShort` - Password shorter than the minimum length
    /// * `PasswordMismatch` - Password and confirmation differ
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn signup(&self, command: SignupCommand) -> Result<Credential, AuthError>;

    /// Verify credentials and issue an access token.
    ///
    /// # Errors
    /// * `NotFound` - No credential with this email (blocked ones included)
    /// * `InvalidCredentials` - Password does not match
    /// * `DatabaseError` - Store operation failed
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<String, AuthError>;

    /// Mint a reset token for the credential behind `email` and hand its
    /// plaintext to the notifier.
    ///
    /// Returns `Ok(())` whether or not the email exists, so callers cannot
    /// enumerate accounts. Notifier failures are logged and swallowed.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AuthError>;

    /// Redeem a reset token and set a new password.
    ///
    /// Redemption and the password update are one conditional store write,
    /// so a token redeems at most once even under concurrent attempts.
    ///
    /// # Errors
    /// * `PasswordMismatch` / `PasswordTooShort` - New password invalid
    /// * `ResetTokenInvalid` - Unknown, expired, or already-redeemed token
    /// * `DatabaseError` - Store operation failed
    async fn reset_password(
        &self,
        token_plaintext: &str,
        command: ResetPasswordCommand,
    ) -> Result<(), AuthError>;

    /// Change the password of an authenticated credential.
    ///
    /// # Errors
    /// * `NotFound` - Credential does not exist
    /// * `InvalidCredentials` - Current password is wrong
    /// * `PasswordMismatch` / `PasswordTooShort` - New password invalid
    /// * `DatabaseError` - Store operation failed
    async fn change_password(
        &self,
        id: &CredentialId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError>;

    /// Verify a bearer token and return the caller it identifies.
    ///
    /// Beyond signature and expiry this re-checks the subject's current
    /// `password_changed_at` against the token's issue time, so it consults
    /// the store.
    ///
    /// # Errors
    /// * `Token` - Malformed, expired, or wrongly signed token
    /// * `NotFound` - Subject no longer exists (or is blocked)
    /// * `StaleToken` - Password changed after the token was issued
    /// * `DatabaseError` - Store operation failed
    async fn verify_bearer(&self, token: &str) -> Result<AuthenticatedCaller, AuthError>;

    /// Retrieve a credential by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Credential does not exist (or is blocked)
    /// * `DatabaseError` - Store operation failed
    async fn get_credential(&self, id: &CredentialId) -> Result<Credential, AuthError>;

    /// Retrieve all credentials.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn list_credentials(&self) -> Result<Vec<Credential>, AuthError>;
}

/// Persistence operations for the credential aggregate.
///
/// The store is deliberately dumb: no hashing, no timestamps of its own, no
/// hidden filters beyond the documented blocked/expiry exclusions on the
/// lookups the auth path uses.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new credential.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, credential: Credential) -> Result<Credential, AuthError>;

    /// Retrieve a credential by email. Blocked credentials are not returned.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Credential>, AuthError>;

    /// Retrieve a credential by identifier. Blocked credentials are not
    /// returned.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_id(&self, id: &CredentialId) -> Result<Option<Credential>, AuthError>;

    /// Retrieve the credential holding `digest` as its outstanding reset
    /// token hash. Expired requests and blocked credentials are not returned.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<Credential>, AuthError>;

    /// Record an outstanding reset request (digest + expiry, set together).
    ///
    /// # Errors
    /// * `NotFound` - Credential does not exist
    /// * `DatabaseError` - Store operation failed
    async fn set_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Replace the password hash and its change timestamp in one write.
    ///
    /// # Errors
    /// * `NotFound` - Credential does not exist
    /// * `DatabaseError` - Store operation failed
    async fn update_password(
        &self,
        id: &CredentialId,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Conditionally redeem a reset token: in a single atomic write, set the
    /// new password hash and change timestamp and clear both reset fields,
    /// but only if `digest` still matches the stored hash and has not
    /// expired as of `changed_at`.
    ///
    /// Returns `false` when the precondition no longer holds (token already
    /// redeemed or expired in the meantime).
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn consume_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    /// Retrieve all credentials, blocked ones included. Not an auth-path
    /// lookup; used by the admin listing only.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn list_all(&self) -> Result<Vec<Credential>, AuthError>;
}

/// Outbound notification delivery (reset-token messages).
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Send a plain-text message to `recipient`.
    ///
    /// # Errors
    /// * `InvalidRecipient` - Address could not be used by the transport
    /// * `SendFailed` - Transport-level delivery failure
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifierError>;
}
