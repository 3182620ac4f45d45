use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::credential::errors::AuthError;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::CredentialId;
use crate::domain::credential::models::EmailAddress;
use crate::domain::credential::models::ResetRequest;
use crate::domain::credential::models::Role;
use crate::domain::credential::ports::CredentialStore;

const COLUMNS: &str = "id, email, role, password_hash, password_changed_at, \
                       password_reset_token_hash, password_reset_expires_at, blocked";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; converted into the domain entity via `TryFrom` so a damaged
/// row surfaces as `CorruptCredential` instead of panicking.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    role: String,
    password_hash: String,
    password_changed_at: DateTime<Utc>,
    password_reset_token_hash: Option<String>,
    password_reset_expires_at: Option<DateTime<Utc>>,
    blocked: bool,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = AuthError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|e| AuthError::CorruptCredential(e.to_string()))?;
        let role =
            Role::from_str(&row.role).map_err(|e| AuthError::CorruptCredential(e.to_string()))?;

        // The schema CHECK keeps these two columns in lockstep; a one-sided
        // pair can only mean a damaged row
        let reset_request = match (row.password_reset_token_hash, row.password_reset_expires_at) {
            (Some(token_hash), Some(expires_at)) => Some(ResetRequest {
                token_hash,
                expires_at,
            }),
            (None, None) => None,
            _ => {
                return Err(AuthError::CorruptCredential(format!(
                    "credential {} has a one-sided reset pair",
                    row.id
                )))
            }
        };

        Ok(Credential {
            id: CredentialId(row.id),
            email,
            role,
            password_hash: row.password_hash,
            password_changed_at: row.password_changed_at,
            reset_request,
            blocked: row.blocked,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, credential: Credential) -> Result<Credential, AuthError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (id, email, role, password_hash, password_changed_at, blocked)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(credential.id.0)
        .bind(credential.email.as_str())
        .bind(credential.role.as_str())
        .bind(&credential.password_hash)
        .bind(credential.password_changed_at)
        .bind(credential.blocked)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("credentials_email_key")
                {
                    return AuthError::DuplicateEmail(credential.email.as_str().to_string());
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(credential)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Credential>, AuthError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS}
            FROM credentials
            WHERE email = $1 AND NOT blocked
            "#
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(Credential::try_from).transpose()
    }

    async fn find_by_id(&self, id: &CredentialId) -> Result<Option<Credential>, AuthError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS}
            FROM credentials
            WHERE id = $1 AND NOT blocked
            "#
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(Credential::try_from).transpose()
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<Credential>, AuthError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS}
            FROM credentials
            WHERE password_reset_token_hash = $1
              AND password_reset_expires_at > NOW()
              AND NOT blocked
            "#
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(Credential::try_from).transpose()
    }

    async fn set_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET password_reset_token_hash = $2, password_reset_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_password(
        &self,
        id: &CredentialId,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET password_hash = $2, password_changed_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(new_hash)
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn consume_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // The WHERE clause re-checks the digest and expiry inside the write,
        // so only one of two racing redemptions can see rows_affected == 1
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET password_hash = $3,
                password_changed_at = $4,
                password_reset_token_hash = NULL,
                password_reset_expires_at = NULL
            WHERE id = $1
              AND password_reset_token_hash = $2
              AND password_reset_expires_at > $4
            "#,
        )
        .bind(id.0)
        .bind(digest)
        .bind(new_hash)
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AuthError> {
        let rows: Vec<CredentialRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS}
            FROM credentials
            ORDER BY email
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Credential::try_from).collect()
    }
}
