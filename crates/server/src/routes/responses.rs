//! `POST /v1/responses`, `GET /v1/responses/{id}`,
//! `POST /v1/responses/{id}/cancel`, `GET /v1/responses/{id}/input_items`:
//! the background-mode lifecycle on top of `queue::BackgroundOrchestrator`.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use context::RequestContext;
use conversation::Pagination;
use http::StatusCode;
use jiff::Timestamp;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chat::ChatCompletionRequest;
use queue::{ResponseRecord, ResponseStatus};

use crate::routes::chat::ChatCompletionBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateResponseBody {
    #[serde(flatten)]
    pub request: ChatCompletionBody,
    #[serde(default)]
    pub background: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Serialize)]
struct ResponseBody {
    id: String,
    status: &'static str,
    model: String,
    output_text: Option<String>,
    error: Option<String>,
}

pub async fn create(State(state): State<AppState>, Extension(context): Extension<RequestContext>, Json(body): Json<CreateResponseBody>) -> Response {
    let user_id = context.user_id().unwrap_or("anonymous").to_string();
    let model = body.request.model.clone();
    let request: ChatCompletionRequest = body.request.into();

    let public_id = uuid::Uuid::new_v4().to_string();
    let api_key = context.api_key_override.clone().unwrap_or_else(|| SecretString::from(String::new()));
    let record = ResponseRecord::new(public_id, user_id, api_key, request, body.metadata, body.webhook_url, Timestamp::now());

    match state.orchestrator.create(record, body.background).await {
        Ok(record) => Json(to_body(record, &model)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.responses.find_by_public_id(&id).await {
        Ok(Some(record)) => {
            let model = record.input.model.clone();
            Json(to_body(record, &model)).into_response()
        }
        Ok(None) => not_found(&id),
        Err(err) => error_response(err),
    }
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.orchestrator.cancel(&id).await {
        Ok(record) => {
            let model = record.input.model.clone();
            Json(to_body(record, &model)).into_response()
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Serialize)]
struct InputItemsBody {
    data: Vec<conversation::Item>,
}

pub async fn input_items(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(Some(record)) = state.responses.find_by_public_id(&id).await else {
        return not_found(&id);
    };

    let Some(conversation_id) = &record.conversation_id else {
        return Json(InputItemsBody { data: Vec::new() }).into_response();
    };

    match state.conversations.get_items(conversation_id, conversation::DEFAULT_BRANCH, Pagination::default()).await {
        Ok(items) => Json(InputItemsBody { data: items }).into_response(),
        Err(err) => error_response(queue::Error::Chat(chat::Error::Conversation(err))),
    }
}

fn to_body(record: ResponseRecord, model: &str) -> ResponseBody {
    ResponseBody {
        id: record.public_id,
        status: status_label(record.status),
        model: model.to_string(),
        output_text: record.output_text,
        error: record.error,
    }
}

fn status_label(status: ResponseStatus) -> &'static str {
    match status {
        ResponseStatus::Queued => "queued",
        ResponseStatus::InProgress => "in_progress",
        ResponseStatus::Completed => "completed",
        ResponseStatus::Failed => "failed",
        ResponseStatus::Cancelled => "cancelled",
    }
}

fn not_found(id: &str) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    (StatusCode::NOT_FOUND, Json(ErrorBody { error: format!("response {id} not found") })).into_response()
}

fn error_response(err: queue::Error) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    let status = match &err {
        queue::Error::NotFound(_) => StatusCode::NOT_FOUND,
        queue::Error::NotQueued(_) => StatusCode::CONFLICT,
        queue::Error::BackgroundRequiresStore => StatusCode::BAD_REQUEST,
        queue::Error::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}
