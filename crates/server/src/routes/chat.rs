//! `POST /v1/chat/completions`.

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use context::RequestContext;
use http::StatusCode;
use messages::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chat::{ChatCompletionRequest, ChatCompletionResponse};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub conversation: Option<ConversationRef>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub store: bool,
    #[serde(default)]
    pub store_reasoning: bool,
    #[serde(default)]
    pub enable_thinking: bool,
    #[serde(default)]
    pub deep_research: bool,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub tool_choice: Option<Value>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRef {
    pub id: Option<String>,
}

impl From<ChatCompletionBody> for ChatCompletionRequest {
    fn from(body: ChatCompletionBody) -> Self {
        Self {
            model: body.model,
            messages: body.messages,
            conversation_id: body.conversation.and_then(|c| c.id),
            stream: body.stream,
            store: body.store,
            store_reasoning: body.store_reasoning,
            tools: body.tools,
            tool_choice: body.tool_choice,
            enable_thinking: body.enable_thinking,
            deep_research: body.deep_research,
            temperature: body.temperature,
            top_p: body.top_p,
            max_tokens: body.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBodyResponse {
    id: String,
    object: &'static str,
    model: String,
    choices: Vec<Choice>,
    usage: Option<UsageBody>,
}

#[derive(Debug, Serialize)]
struct Choice {
    index: u32,
    message: Message,
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct UsageBody {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

pub async fn create(State(state): State<AppState>, Extension(context): Extension<RequestContext>, Json(body): Json<ChatCompletionBody>) -> Response {
    let stream = body.stream;
    let user_id = context.user_id().unwrap_or("anonymous").to_string();
    let request: ChatCompletionRequest = body.into();

    match state.chat.create_completion(&user_id, request).await {
        Ok(response) if stream => synthesize_stream(response).into_response(),
        Ok(response) => Json(to_body(response)).into_response(),
        Err(err) => error_response(err),
    }
}

fn to_body(response: ChatCompletionResponse) -> ChatCompletionBodyResponse {
    ChatCompletionBodyResponse {
        id: response.id,
        object: "chat.completion",
        model: response.model,
        choices: vec![Choice { index: 0, message: response.message, finish_reason: response.finish_reason }],
        usage: response.usage.map(|usage| UsageBody {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    }
}

/// `ChatService::create_completion` has no native streaming entry point,
/// so a `stream:true` request is run synchronously and its single result
/// replayed as one SSE delta, followed by the extra `conversation` chunk
/// the stable surface requires immediately before `[DONE]`.
fn synthesize_stream(response: ChatCompletionResponse) -> impl IntoResponse {
    let created = jiff::Timestamp::now().as_second();

    let delta_chunk = serde_json::json!({
        "id": response.id,
        "object": "chat.completion.chunk",
        "created": created,
        "model": response.model,
        "choices": [{
            "index": 0,
            "delta": { "role": "assistant", "content": response.message.text() },
            "finish_reason": response.finish_reason,
        }],
    });

    let conversation_chunk = serde_json::json!({
        "object": "chat.completion.chunk",
        "conversation": { "id": response.id },
        "created": created,
        "model": response.model,
    });

    let body = format!("data: {delta_chunk}\n\ndata: {conversation_chunk}\n\ndata: [DONE]\n\n");

    Response::builder().status(StatusCode::OK).header(http::header::CONTENT_TYPE, "text/event-stream").body(Body::from(body)).expect("static response shape is always valid")
}

fn error_response(err: chat::Error) -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    let status = match &err {
        chat::Error::ModelNotFound(_) => StatusCode::NOT_FOUND,
        chat::Error::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
        chat::Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        chat::Error::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        chat::Error::Budget(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}
