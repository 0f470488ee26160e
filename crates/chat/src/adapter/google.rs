use messages::{Message, Role};
use serde_json::{Value, json};

use crate::adapter::ChatProvider;
use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk, Usage};

/// Gemini's `generateContent`/`streamGenerateContent` shape: `contents`
/// instead of `messages`, roles are `user`/`model`, system goes in a
/// dedicated `systemInstruction` field, and the API key travels as a
/// query parameter rather than a header (handled by `dispatch`, which
/// still calls `auth_header_value` to build it as `key=<credential>`).
pub struct GoogleAdapter;

impl ChatProvider for GoogleAdapter {
    fn endpoint_path(&self, model: &str) -> String {
        format!("/models/{model}:generateContent")
    }

    fn auth_header_name(&self) -> &'static str {
        "x-goog-api-key"
    }

    fn auth_header_value(&self, credential: &str) -> String {
        credential.to_string()
    }

    fn build_body(&self, request: &ChatCompletionRequest) -> Value {
        let system_text = request.messages.iter().filter(|m| m.role == Role::System).map(Message::text).collect::<Vec<_>>().join("\n\n");

        let contents: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|message| {
                let role = if message.role == Role::Assistant { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": message.text()}]})
            })
            .collect();

        let mut body = json!({ "contents": contents });
        let object = body.as_object_mut().expect("object literal");

        if !system_text.is_empty() {
            object.insert("systemInstruction".to_string(), json!({"parts": [{"text": system_text}]}));
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(top_p) = request.top_p {
            generation_config.insert("topP".to_string(), json!(top_p));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            object.insert("generationConfig".to_string(), Value::Object(generation_config));
        }

        body
    }

    fn parse_response(&self, body: &[u8]) -> Result<ChatCompletionResponse, Error> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::MalformedResponse)?;

        let candidate = value.get("candidates").and_then(|c| c.get(0)).ok_or(Error::MalformedResponse)?;

        let text = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| parts.iter().filter_map(|p| p.get("text").and_then(Value::as_str)).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let finish_reason = candidate.get("finishReason").and_then(Value::as_str).map(str::to_string);

        let usage = value.get("usageMetadata").map(|u| Usage {
            prompt_tokens: u.get("promptTokenCount").and_then(Value::as_u64).unwrap_or(0) as u32,
            completion_tokens: u.get("candidatesTokenCount").and_then(Value::as_u64).unwrap_or(0) as u32,
            total_tokens: u.get("totalTokenCount").and_then(Value::as_u64).unwrap_or(0) as u32,
        });

        Ok(ChatCompletionResponse {
            id: String::new(),
            model: String::new(),
            message: Message::assistant(text),
            usage,
            finish_reason,
            upstream_error: None,
        })
    }

    fn parse_stream_event(&self, data: &str) -> Option<Result<StreamChunk, Error>> {
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(_) => return Some(Err(Error::MalformedResponse)),
        };

        let candidate = value.get("candidates")?.get(0)?;
        let delta_text = candidate.get("content")?.get("parts")?.get(0)?.get("text").and_then(Value::as_str).map(str::to_string);
        let finish_reason = candidate.get("finishReason").and_then(Value::as_str).map(str::to_string);
        let finished = finish_reason.is_some();

        Some(Ok(StreamChunk { delta_text, finish_reason, finished }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_messages_become_system_instruction() {
        let request = ChatCompletionRequest::new("gemini-1.5-pro", vec![Message::system("Be terse."), Message::user("hi")]);
        let body = GoogleAdapter.build_body(&request);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be terse.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn parse_response_joins_candidate_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4},
        })
        .to_string();

        let response = GoogleAdapter.parse_response(body.as_bytes()).unwrap();
        assert_eq!(response.message.text(), "hello");
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }
}
