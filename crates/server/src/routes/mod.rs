pub mod auth;
pub mod chat;
pub mod health;
pub mod images;
pub mod mcp;
pub mod responses;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::state::AppState;

/// Routes requiring an authenticated (or dev-mode anonymous) principal.
pub fn protected(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/chat/completions", post(chat::create))
        .route("/v1/images/generations", post(images::generations))
        .route("/v1/images/edits", post(images::edits))
        .route(&state.mcp_config.path.clone(), post(mcp::handle))
        .route("/v1/responses", post(responses::create))
        .route("/v1/responses/{id}", get(responses::get))
        .route("/v1/responses/{id}/cancel", post(responses::cancel))
        .route("/v1/responses/{id}/input_items", get(responses::input_items))
        .route("/v1/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state, crate::auth_middleware::authenticate))
}

/// Routes that must stay reachable without a bearer token: the OAuth
/// handshake itself, token refresh/logout (which validate their own
/// refresh token against Keycloak), and health.
pub fn public() -> Router<AppState> {
    Router::new()
        .route("/auth/keycloak/login", get(auth::login))
        .route("/auth/keycloak/callback", get(auth::callback))
        .route("/v1/auth/refresh-token", post(auth::refresh_token))
        .route("/v1/auth/logout", get(auth::logout).post(auth::logout))
}
