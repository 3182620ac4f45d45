use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::credential::errors::AuthError;
use account_service::domain::credential::errors::NotifierError;
use account_service::domain::credential::models::Credential;
use account_service::domain::credential::models::CredentialId;
use account_service::domain::credential::models::EmailAddress;
use account_service::domain::credential::models::ResetRequest;
use account_service::domain::credential::models::Role;
use account_service::domain::credential::ports::CredentialStore;
use account_service::domain::credential::ports::Notifier;
use account_service::domain::credential::service::AuthService;
use account_service::inbound::http::router::create_router;
use async_trait::async_trait;
use auth::JwtHandler;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// In-memory credential store with the same visible behavior as the Postgres
/// adapter (blocked filtering, expiry filtering, conditional redemption).
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<Uuid, Credential>>,
}

impl InMemoryCredentialStore {
    /// Insert a credential directly, bypassing signup. Lets tests seed admin
    /// or blocked accounts.
    pub fn insert(&self, credential: Credential) {
        self.records
            .lock()
            .unwrap()
            .insert(credential.id.0, credential);
    }

    pub fn get(&self, id: &CredentialId) -> Option<Credential> {
        self.records.lock().unwrap().get(&id.0).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, credential: Credential) -> Result<Credential, AuthError> {
        let mut records = self.records.lock().unwrap();
        if records.values().any(|c| c.email == credential.email) {
            return Err(AuthError::DuplicateEmail(
                credential.email.as_str().to_string(),
            ));
        }
        records.insert(credential.id.0, credential.clone());
        Ok(credential)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Credential>, AuthError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .find(|c| &c.email == email && !c.blocked)
            .cloned())
    }

    async fn find_by_id(&self, id: &CredentialId) -> Result<Option<Credential>, AuthError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&id.0).filter(|c| !c.blocked).cloned())
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<Credential>, AuthError> {
        let now = Utc::now();
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .find(|c| {
                !c.blocked
                    && c.reset_request
                        .as_ref()
                        .is_some_and(|r| r.token_hash == digest && r.expires_at > now)
            })
            .cloned())
    }

    async fn set_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut records = self.records.lock().unwrap();
        let credential = records
            .get_mut(&id.0)
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;
        credential.reset_request = Some(ResetRequest {
            token_hash: digest.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn update_password(
        &self,
        id: &CredentialId,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut records = self.records.lock().unwrap();
        let credential = records
            .get_mut(&id.0)
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?;
        credential.password_hash = new_hash.to_string();
        credential.password_changed_at = changed_at;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        id: &CredentialId,
        digest: &str,
        new_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let mut records = self.records.lock().unwrap();
        let Some(credential) = records.get_mut(&id.0) else {
            return Ok(false);
        };
        let redeemable = credential
            .reset_request
            .as_ref()
            .is_some_and(|r| r.token_hash == digest && r.expires_at > changed_at);
        if !redeemable {
            return Ok(false);
        }
        credential.password_hash = new_hash.to_string();
        credential.password_changed_at = changed_at;
        credential.reset_request = None;
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AuthError> {
        let records = self.records.lock().unwrap();
        Ok(records.values().cloned().collect())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records every message instead of delivering it, so tests can
/// read the reset-token plaintext out of the body.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<RecordedMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<RecordedMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifierError> {
        self.messages.lock().unwrap().push(RecordedMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub store: Arc<InMemoryCredentialStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryCredentialStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            TEST_SECRET,
            Duration::seconds(90),
            Duration::minutes(10),
        ));

        let router = create_router(auth_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(TEST_SECRET),
            store,
            notifier,
        }
    }

    /// Seed a credential with the given role and password, bypassing signup.
    pub fn seed_credential(&self, email: &str, password: &str, role: Role) -> Credential {
        let credential = Credential {
            id: CredentialId::new(),
            email: EmailAddress::new(email.to_string()).expect("invalid test email"),
            role,
            password_hash: PasswordHasher::new()
                .hash(password)
                .expect("failed to hash test password"),
            password_changed_at: Utc::now() - Duration::hours(1),
            reset_request: None,
            blocked: false,
        };
        self.store.insert(credential.clone());
        credential
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PATCH request
    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.patch(path).bearer_auth(token)
    }

    /// Log in through the API and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/v1/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute login request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("missing access_token")
            .to_string()
    }

    /// Pull the reset-token plaintext out of the most recent recorded
    /// notification.
    pub fn last_reset_token(&self) -> String {
        let messages = self.notifier.sent();
        let message = messages.last().expect("no notification recorded");
        message
            .body
            .split_whitespace()
            .last()
            .expect("empty notification body")
            .to_string()
    }
}
