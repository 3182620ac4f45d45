use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::guard::authorize;
use super::guard::RoutePolicy;
use super::handlers::change_password::change_password;
use super::handlers::forgot_password::forgot_password;
use super::handlers::list_credentials::list_credentials;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::reset_password::reset_password;
use super::handlers::signup::signup;
use crate::domain::credential::models::Role;
use crate::domain::credential::ports::AuthServicePort;

/// Roles accepted on routes that need authentication but no particular role.
const ANY_ROLE: &[Role] = &[Role::User, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/forgot-password", post(forgot_password))
        .route("/api/v1/auth/reset-password/:token", patch(reset_password));

    let authenticated_routes = Router::new()
        .route("/api/v1/auth/change-password/:id", patch(change_password))
        .route("/api/v1/users/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), RoutePolicy::RequireRole(ANY_ROLE)),
            authorize,
        ));

    let admin_routes = Router::new()
        .route("/api/v1/users", get(list_credentials))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), RoutePolicy::RequireRole(ADMIN_ONLY)),
            authorize,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
