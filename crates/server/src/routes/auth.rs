//! Keycloak OAuth flow: `GET /auth/keycloak/login`, `GET
//! /auth/keycloak/callback`, `POST /v1/auth/refresh-token`, `GET|POST
//! /v1/auth/logout`, `GET /v1/auth/me`.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use context::Authentication;
use http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect_uri: url::Url,
}

pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Response {
    let Some(oauth) = &state.oauth else {
        return unavailable();
    };

    let authorize_url = oauth.authorize_url(&state.pkce, query.redirect_uri);
    Redirect::to(authorize_url.as_str()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Response {
    let Some(oauth) = &state.oauth else {
        return unavailable();
    };

    match oauth.exchange_code(&state.pkce, &query.state, &query.code).await {
        Ok((token, caller_redirect)) => {
            let mut redirect = caller_redirect;
            let fragment = format!(
                "access_token={}&refresh_token={}&expires_in={}&token_type={}",
                token.access_token.expose_secret(),
                token.refresh_token.as_ref().map(|t| t.expose_secret().to_string()).unwrap_or_default(),
                token.expires_in,
                token.token_type,
            );
            redirect.set_fragment(Some(&fragment));
            Redirect::to(redirect.as_str()).into_response()
        }
        Err(err) => unauthorized(err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
struct TokenBody {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
    token_type: String,
}

pub async fn refresh_token(State(state): State<AppState>, Json(body): Json<RefreshBody>) -> Response {
    let Some(oauth) = &state.oauth else {
        return unavailable();
    };

    match oauth.refresh(&SecretString::from(body.refresh_token)).await {
        Ok(token) => Json(TokenBody {
            access_token: token.access_token.expose_secret().to_string(),
            refresh_token: token.refresh_token.as_ref().map(|t| t.expose_secret().to_string()),
            expires_in: token.expires_in,
            token_type: token.token_type,
        })
        .into_response(),
        Err(err) => unauthorized(err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutQuery {
    pub refresh_token: String,
}

/// Accepts the refresh token as a query parameter rather than a JSON body
/// so the same handler works for both the `GET` and `POST` methods §6
/// requires for this route.
pub async fn logout(State(state): State<AppState>, Query(query): Query<LogoutQuery>) -> Response {
    let Some(oauth) = &state.oauth else {
        return unavailable();
    };

    match oauth.logout(&SecretString::from(query.refresh_token)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => unauthorized(err.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct MeBody {
    user_id: Option<String>,
    email: Option<String>,
}

pub async fn me(Extension(authentication): Extension<Authentication>) -> Response {
    let Some(bearer) = &authentication.bearer else {
        return unauthorized("no authenticated session".to_string());
    };

    let claims = &bearer.token.claims().custom;
    Json(MeBody { user_id: claims.subject.clone(), email: claims.email.clone() }).into_response()
}

fn unavailable() -> Response {
    (StatusCode::NOT_FOUND, "keycloak authentication is not configured").into_response()
}

fn unauthorized(message: String) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    (StatusCode::UNAUTHORIZED, Json(ErrorBody { error: message })).into_response()
}
