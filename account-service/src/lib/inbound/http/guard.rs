use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::credential::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Access policy attached to a route group.
///
/// Every route carries an explicit policy; there is no ambient default that
/// protects unannotated routes.
#[derive(Debug, Clone, Copy)]
pub enum RoutePolicy {
    /// No bearer token required; the request passes through untouched.
    Public,
    /// A verified bearer token whose role is one of the listed roles.
    RequireRole(&'static [Role]),
}

/// Middleware that enforces a route's [`RoutePolicy`].
///
/// On success the verified caller is inserted into the request extensions so
/// handlers can read the identity without re-verifying the token.
pub async fn authorize(
    State((state, policy)): State<(AppState, RoutePolicy)>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let RoutePolicy::RequireRole(allowed) = policy else {
        return Ok(next.run(req).await);
    };

    let token = extract_bearer_token(&req)?;

    let caller = state.auth_service.verify_bearer(token).await.map_err(|e| {
        tracing::warn!(error = %e, "bearer verification failed");
        ApiError::Unauthorized(e.to_string()).into_response()
    })?;

    if !allowed.contains(&caller.role) {
        tracing::warn!(credential_id = %caller.id, role = %caller.role, "role not permitted for route");
        return Err(
            ApiError::Forbidden("Insufficient role for this resource".to_string())
                .into_response(),
        );
    }

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, Response> {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing Authorization header".to_string()).into_response()
        })?;

    let value = header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
        .into_response()
    })
}
