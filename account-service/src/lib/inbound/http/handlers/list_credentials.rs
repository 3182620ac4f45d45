use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::credential::models::Credential;
use crate::inbound::http::router::AppState;

/// List every credential, blocked ones included. Admin only.
pub async fn list_credentials(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<CredentialListItem>>, ApiError> {
    state
        .auth_service
        .list_credentials()
        .await
        .map_err(ApiError::from)
        .map(|credentials| {
            let items = credentials.iter().map(CredentialListItem::from).collect();
            ApiSuccess::new(StatusCode::OK, items)
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialListItem {
    pub id: String,
    pub email: String,
    pub role: String,
    pub blocked: bool,
}

impl From<&Credential> for CredentialListItem {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.to_string(),
            email: credential.email.as_str().to_string(),
            role: credential.role.to_string(),
            blocked: credential.blocked,
        }
    }
}
