//! `POST /v1/images/generations`, `POST /v1/images/edits`.
//!
//! SPEC_FULL treats image generation as proxied to an external LLM-API;
//! no chat-pipeline logic for it exists in this workspace, so these
//! handlers forward the raw body to the first active `Category::Image`
//! provider and relay its response unchanged.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use providers::{Category, Filter, Pagination};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;

pub async fn generations(state: State<AppState>, body: Json<Value>) -> Response {
    proxy(state, body, "images/generations").await
}

pub async fn edits(state: State<AppState>, body: Json<Value>) -> Response {
    proxy(state, body, "images/edits").await
}

async fn proxy(State(state): State<AppState>, Json(body): Json<Value>, path_suffix: &str) -> Response {
    let providers = match state.providers.find(&Filter { active_only: true, ..Default::default() }, Pagination::default()).await {
        Ok(providers) => providers,
        Err(err) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    let Some(provider) = providers.into_iter().find(|provider| provider.category == Category::Image) else {
        return error_response(StatusCode::NOT_FOUND, "no active image provider is configured".to_string());
    };

    let Some(base_url) = provider.legacy_base_url() else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "image provider has no configured endpoint".to_string());
    };

    let credential = match &provider.encrypted_credential {
        Some(encrypted) => {
            let secret = state.credential_secret.as_deref().unwrap_or_default();
            match providers::decrypt_credential(encrypted, secret) {
                Ok(credential) => credential,
                Err(err) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            }
        }
        None => SecretString::from(String::new()),
    };

    let url = format!("{}/{path_suffix}", base_url.trim_end_matches('/'));
    let mut request = state.http_client.post(&url).json(&body);

    let token = credential.expose_secret();
    if !token.is_empty() {
        request = request.bearer_auth(token);
    }

    match request.send().await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            match upstream.bytes().await {
                Ok(body) => (status, body).into_response(),
                Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
            }
        }
        Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    (status, Json(ErrorBody { error: message })).into_response()
}
