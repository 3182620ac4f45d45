use std::sync::Arc;

use async_trait::async_trait;
use auth::reset;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::ResetToken;
use chrono::Duration;
use chrono::Utc;

use crate::credential::errors::AuthError;
use crate::credential::models::AccessClaims;
use crate::credential::models::AuthenticatedCaller;
use crate::credential::models::ChangePasswordCommand;
use crate::credential::models::Credential;
use crate::credential::models::CredentialId;
use crate::credential::models::EmailAddress;
use crate::credential::models::ResetPasswordCommand;
use crate::credential::models::Role;
use crate::credential::models::SignupCommand;
use crate::credential::ports::AuthServicePort;
use crate::credential::ports::CredentialStore;
use crate::credential::ports::Notifier;

/// Minimum plaintext password length, enforced here rather than in the hasher.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Credential lifecycle service.
///
/// Composes the password hasher, token codec, and reset-token primitives
/// into the five user-facing operations plus bearer verification, reading
/// and writing through the credential store port. Hashing and
/// change-timestamping happen here explicitly; the store has no embedded
/// rules.
pub struct AuthService<CS, N>
where
    CS: CredentialStore,
    N: Notifier,
{
    store: Arc<CS>,
    notifier: Arc<N>,
    password_hasher: PasswordHasher,
    token_codec: JwtHandler,
    access_ttl: Duration,
    reset_window: Duration,
}

impl<CS, N> AuthService<CS, N>
where
    CS: CredentialStore,
    N: Notifier,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `notifier` - Outbound notification implementation
    /// * `jwt_secret` - Shared secret for token signing
    /// * `access_ttl` - Access-token lifetime (the original used 90 seconds)
    /// * `reset_window` - Validity window for reset tokens
    pub fn new(
        store: Arc<CS>,
        notifier: Arc<N>,
        jwt_secret: &[u8],
        access_ttl: Duration,
        reset_window: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            password_hasher: PasswordHasher::new(),
            token_codec: JwtHandler::new(jwt_secret),
            access_ttl,
            reset_window,
        }
    }

    fn validate_new_password(password: &str, password_confirm: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }

    fn issue_token(&self, credential: &Credential) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: credential.id.0,
            email: credential.email.as_str().to_string(),
            role: credential.role,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        Ok(self.token_codec.encode(&claims)?)
    }
}

#[async_trait]
impl<CS, N> AuthServicePort for AuthService<CS, N>
where
    CS: CredentialStore,
    N: Notifier,
{
    async fn signup(&self, command: SignupCommand) -> Result<Credential, AuthError> {
        Self::validate_new_password(&command.password, &command.password_confirm)?;

        let password_hash = self.password_hasher.hash(&command.password)?;

        let credential = Credential {
            id: CredentialId::new(),
            email: command.email,
            role: Role::default(),
            password_hash,
            password_changed_at: Utc::now(),
            reset_request: None,
            blocked: false,
        };

        let created = self.store.create(credential).await?;

        tracing::info!(credential_id = %created.id, email = %created.email, "credential created");

        Ok(created)
    }

    async fn login(&self, email: &EmailAddress, password: &str) -> Result<String, AuthError> {
        let credential = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NotFound(email.to_string()))?;

        if !self
            .password_hasher
            .verify(password, &credential.password_hash)?
        {
            tracing::warn!(email = %email, "login with invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_token(&credential)
    }

    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AuthError> {
        let Some(credential) = self.store.find_by_email(email).await? else {
            // Same outcome as success so the response cannot be used to
            // enumerate accounts.
            tracing::debug!(email = %email, "reset requested for unknown email");
            return Ok(());
        };

        let token = ResetToken::generate()?;
        let expires_at = Utc::now() + self.reset_window;

        // Persist the digest before handing out the plaintext, so every
        // delivered token is redeemable.
        self.store
            .set_reset_token(&credential.id, token.digest(), expires_at)
            .await?;

        let body = format!(
            "Hello, here is your password reset token: {}",
            token.plaintext()
        );
        if let Err(e) = self
            .notifier
            .send(&credential.email, "Reset Password", &body)
            .await
        {
            // Fire and forget: delivery problems do not fail the request
            tracing::warn!(credential_id = %credential.id, error = %e, "reset notification failed");
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        token_plaintext: &str,
        command: ResetPasswordCommand,
    ) -> Result<(), AuthError> {
        Self::validate_new_password(&command.password, &command.password_confirm)?;

        let digest = reset::digest_hex(token_plaintext);

        let credential = self
            .store
            .find_by_reset_digest(&digest)
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        let new_hash = self.password_hasher.hash(&command.password)?;

        // Single conditional write keyed on the still-matching digest; a
        // concurrent redemption of the same token makes this return false.
        let consumed = self
            .store
            .consume_reset_token(&credential.id, &digest, &new_hash, Utc::now())
            .await?;

        if !consumed {
            return Err(AuthError::ResetTokenInvalid);
        }

        tracing::info!(credential_id = %credential.id, "password reset");

        Ok(())
    }

    async fn change_password(
        &self,
        id: &CredentialId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError> {
        let credential = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;

        if !self
            .password_hasher
            .verify(&command.current_password, &credential.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Self::validate_new_password(&command.password, &command.password_confirm)?;

        let new_hash = self.password_hasher.hash(&command.password)?;

        self.store
            .update_password(id, &new_hash, Utc::now())
            .await?;

        tracing::info!(credential_id = %id, "password changed");

        Ok(())
    }

    async fn verify_bearer(&self, token: &str) -> Result<AuthenticatedCaller, AuthError> {
        let claims: AccessClaims = self.token_codec.decode(token)?;

        let id = CredentialId(claims.sub);
        let credential = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;

        if credential.changed_password_after(claims.iat) {
            tracing::warn!(credential_id = %id, "token predates password change");
            return Err(AuthError::StaleToken);
        }

        Ok(AuthenticatedCaller {
            id,
            email: claims.email,
            role: claims.role,
            issued_at: claims.iat,
        })
    }

    async fn get_credential(&self, id: &CredentialId) -> Result<Credential, AuthError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))
    }

    async fn list_credentials(&self) -> Result<Vec<Credential>, AuthError> {
        self.store.list_all().await
    }
}
