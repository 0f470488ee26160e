//! Authentication middleware: validates the inbound `Authorization` header
//! through `auth::Authenticator` and threads the outcome into request
//! extensions as `context::{Authentication, RequestContext}`, the way the
//! teacher's `AuthLayer` injected `Authentication` before request handling.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use context::{Principal, RequestContext};
use fastrace::collector::SpanContext;
use http::StatusCode;
use serde::Serialize;

use auth::AuthError;

use crate::state::AppState;

pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match state.authenticator.authenticate(request.headers()).await {
        Ok(authentication) => {
            let principal = authentication
                .bearer
                .as_ref()
                .and_then(|bearer| bearer.token.claims().custom.subject.clone())
                .map(|user_id| Principal { user_id, email: authentication.bearer.as_ref().and_then(|bearer| bearer.token.claims().custom.email.clone()) });
            let span_context = SpanContext::current_local_parent();
            let context = RequestContext::from_headers(request.headers(), principal, span_context);

            request.extensions_mut().insert(authentication);
            request.extensions_mut().insert(context);

            next.run(request).await
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: AuthError) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    let status = match err {
        AuthError::Unauthorized | AuthError::InvalidToken(_) | AuthError::UnknownState | AuthError::TokenExchangeFailed(_) => StatusCode::UNAUTHORIZED,
        AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, axum::Json(ErrorBody { error: err.to_string() })).into_response()
}
