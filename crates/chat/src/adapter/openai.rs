use messages::{ContentContainer, Message, Role};
use serde_json::{Value, json};

use crate::adapter::ChatProvider;
use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk, Usage};

/// `/chat/completions`-shaped wire format shared by OpenAI, Azure OpenAI,
/// Mistral, Groq, OpenRouter, Ollama, and most other aggregators.
pub struct OpenAiCompatibleAdapter;

impl ChatProvider for OpenAiCompatibleAdapter {
    fn endpoint_path(&self, _model: &str) -> String {
        "/chat/completions".to_string()
    }

    fn auth_header_name(&self) -> &'static str {
        "Authorization"
    }

    fn auth_header_value(&self, credential: &str) -> String {
        format!("Bearer {credential}")
    }

    fn build_body(&self, request: &ChatCompletionRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(message_to_json).collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "stream": request.stream,
        });

        let object = body.as_object_mut().expect("object literal");

        if !request.tools.is_empty() {
            object.insert(
                "tools".to_string(),
                json!(
                    request
                        .tools
                        .iter()
                        .map(|tool| json!({"type": "function", "function": {"name": tool.name, "description": tool.description, "parameters": tool.parameters}}))
                        .collect::<Vec<_>>()
                ),
            );
        }

        if let Some(tool_choice) = &request.tool_choice {
            object.insert("tool_choice".to_string(), tool_choice.clone());
        }
        if let Some(temperature) = request.temperature {
            object.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(top_p) = request.top_p {
            object.insert("top_p".to_string(), json!(top_p));
        }
        if let Some(max_tokens) = request.max_tokens {
            object.insert("max_tokens".to_string(), json!(max_tokens));
        }

        body
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatCompletionResponse, Error> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::MalformedResponse)?;

        let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let model = value.get("model").and_then(Value::as_str).unwrap_or_default().to_string();

        let choice = value.get("choices").and_then(|c| c.get(0)).ok_or(Error::MalformedResponse)?;
        let message_value = choice.get("message").ok_or(Error::MalformedResponse)?;
        let text = message_value.get("content").and_then(Value::as_str).unwrap_or_default();
        let finish_reason = choice.get("finish_reason").and_then(Value::as_str).map(str::to_string);

        let usage = value.get("usage").map(|u| Usage {
            prompt_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            completion_tokens: u.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
        });

        Ok(ChatCompletionResponse {
            id,
            model,
            message: Message::assistant(text),
            usage,
            finish_reason,
            upstream_error: None,
        })
    }

    fn parse_stream_event(&self, data: &str) -> Option<Result<StreamChunk, Error>> {
        if data == "[DONE]" {
            return Some(Ok(StreamChunk { finished: true, ..Default::default() }));
        }

        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(_) => return Some(Err(Error::MalformedResponse)),
        };

        let choice = value.get("choices").and_then(|c| c.get(0));
        let delta_text = choice.and_then(|c| c.get("delta")).and_then(|d| d.get("content")).and_then(Value::as_str).map(str::to_string);
        let finish_reason = choice.and_then(|c| c.get("finish_reason")).and_then(Value::as_str).map(str::to_string);

        Some(Ok(StreamChunk { delta_text, finish_reason, finished: false }))
    }
}

fn message_to_json(message: &Message) -> Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let content = match &message.content {
        ContentContainer::Text(text) => json!(text),
        ContentContainer::Blocks(_) => json!(message.text()),
    };

    let mut object = json!({"role": role, "content": content});

    if let Some(tool_call_id) = &message.tool_call_id {
        object["tool_call_id"] = json!(tool_call_id);
    }

    if let Some(tool_calls) = &message.tool_calls {
        object["tool_calls"] = json!(
            tool_calls
                .iter()
                .map(|call| json!({"id": call.id, "type": "function", "function": {"name": call.name, "arguments": call.arguments.to_string()}}))
                .collect::<Vec<_>>()
        );
    }

    object
}

#[cfg(test)]
mod tests {
    use messages::Role;

    use super::*;

    #[test]
    fn build_body_includes_messages_and_model() {
        let request = ChatCompletionRequest::new("gpt-4o", vec![Message::user("hi")]);
        let body = OpenAiCompatibleAdapter.build_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn parse_response_extracts_the_assistant_message() {
        let body = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": "hello there"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12},
        })
        .to_string();

        let response = OpenAiCompatibleAdapter.parse_response(body.as_bytes()).unwrap();
        assert_eq!(response.message.text(), "hello there");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.unwrap().total_tokens, 12);
        assert_eq!(response.message.role, Role::Assistant);
    }

    #[test]
    fn done_sentinel_is_a_finished_chunk() {
        let chunk = OpenAiCompatibleAdapter.parse_stream_event("[DONE]").unwrap().unwrap();
        assert!(chunk.finished);
    }

    #[test]
    fn stream_event_extracts_delta_text() {
        let data = json!({"choices": [{"delta": {"content": "par"}}]}).to_string();
        let chunk = OpenAiCompatibleAdapter.parse_stream_event(&data).unwrap().unwrap();
        assert_eq!(chunk.delta_text.as_deref(), Some("par"));
    }
}
