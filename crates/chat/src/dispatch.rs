use std::sync::OnceLock;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use secrecy::ExposeSecret;

use crate::adapter::ChatProvider;
use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::{ChatCompletionResponse, StreamChunk};

/// Shared across every dispatch call, just like the teacher's `llm` crate
/// keeps one pooled client rather than building one per request.
fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            Client::builder()
                .timeout(Duration::from_secs(120))
                .tcp_nodelay(true)
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .pool_idle_timeout(Some(Duration::from_secs(5)))
                .build()
                .expect("failed to build the chat dispatch HTTP client")
        })
        .clone()
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

async fn map_error_response(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
    Error::from_status(status, body)
}

/// Sends one non-streaming completion request through `adapter` to
/// `base_url`, returning the parsed response.
pub async fn dispatch(adapter: &dyn ChatProvider, base_url: &str, credential: &secrecy::SecretString, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, Error> {
    let url = endpoint_url(base_url, &adapter.endpoint_path(&request.model));
    let body = adapter.build_body(request);

    let response = http_client()
        .post(url)
        .header(adapter.auth_header_name(), adapter.auth_header_value(credential.expose_secret()))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|err| Error::Connection(err.to_string()))?;

    if !response.status().is_success() {
        return Err(map_error_response(response).await);
    }

    let bytes = response.bytes().await.map_err(|err| Error::Connection(err.to_string()))?;
    adapter.parse_response(&bytes)
}

/// Sends a streaming completion request, returning a stream of
/// [`StreamChunk`]s translated by the adapter from the upstream's SSE
/// frames. Parse failures on individual frames are surfaced as `Err` items
/// rather than silently dropped, so a caller forwarding the stream to its
/// own client can decide whether to abort or keep going.
pub async fn dispatch_stream<'a>(
    adapter: &'a dyn ChatProvider,
    base_url: &str,
    credential: &secrecy::SecretString,
    request: &ChatCompletionRequest,
) -> Result<impl Stream<Item = Result<StreamChunk, Error>> + 'a, Error> {
    let url = endpoint_url(base_url, &adapter.endpoint_path(&request.model));
    let body = adapter.build_body(request);

    let response = http_client()
        .post(url)
        .header(adapter.auth_header_name(), adapter.auth_header_value(credential.expose_secret()))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|err| Error::Connection(err.to_string()))?;

    if !response.status().is_success() {
        return Err(map_error_response(response).await);
    }

    let event_stream = response.bytes_stream().eventsource();

    let chunk_stream = event_stream.filter_map(move |event| async move {
        let event = match event {
            Ok(event) => event,
            Err(err) => return Some(Err(Error::Connection(err.to_string()))),
        };

        adapter.parse_stream_event(&event.data)
    });

    Ok(chunk_stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_without_doubling_the_slash() {
        assert_eq!(endpoint_url("https://api.example.com/v1/", "/chat/completions"), "https://api.example.com/v1/chat/completions");
        assert_eq!(endpoint_url("https://api.example.com/v1", "/chat/completions"), "https://api.example.com/v1/chat/completions");
    }
}
