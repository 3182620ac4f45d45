use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::credential::models::AuthenticatedCaller;
use crate::domain::credential::models::ChangePasswordCommand;
use crate::domain::credential::models::CredentialId;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    Path(id): Path<String>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let id = CredentialId::from_string(&id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    // The path names the target; only its owner may change it
    if caller.id != id {
        return Err(ApiError::Forbidden(
            "Cannot change another account's password".to_string(),
        ));
    }

    let command = ChangePasswordCommand {
        current_password: body.current_password,
        password: body.password,
        password_confirm: body.password_confirm,
    };

    state
        .auth_service
        .change_password(&id, command)
        .await
        .map_err(ApiError::from)
        .map(|()| StatusCode::NO_CONTENT)
}

/// HTTP request body for changing a password (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    password: String,
    password_confirm: String,
}
