use std::sync::Arc;

use conversation::{ConversationRepository, ItemStatus};
use http::HeaderMap;
use messages::ContentContainer;

const CONVERSATION_ID_HEADER: &str = "X-Conversation-ID";
const TOOL_CALL_ID_HEADER: &str = "X-Tool-Call-ID";

/// The three headers a tool-calling client sends alongside a `tools/call`
/// request so this gateway can report the outcome back onto the
/// conversation item that's waiting on it. `conversation_id`/`tool_call_id`
/// double as the item's own `public_id` lookup key; `authorization` is
/// carried through but not re-validated here (that already happened at
/// the edge).
#[derive(Debug, Clone)]
pub struct ToolCallHeaders {
    pub conversation_id: String,
    pub tool_call_id: String,
    pub authorization: Option<String>,
}

impl ToolCallHeaders {
    /// Returns `None` if either required header is missing — tracking is
    /// best-effort, not a hard requirement for the tool call to proceed.
    pub fn extract(headers: &HeaderMap) -> Option<Self> {
        let conversation_id = header_str(headers, CONVERSATION_ID_HEADER)?.to_string();
        let tool_call_id = header_str(headers, TOOL_CALL_ID_HEADER)?.to_string();
        let authorization = header_str(headers, http::header::AUTHORIZATION.as_str()).map(str::to_string);

        Some(Self { conversation_id, tool_call_id, authorization })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Flips the `mcp_call` item identified by `headers.tool_call_id` to a
/// terminal status once the tool call resolves. Logged, not propagated:
/// a tracking failure must never fail the tool call itself.
pub async fn track_completion(conversations: &Arc<dyn ConversationRepository>, headers: &ToolCallHeaders, succeeded: bool, output_text: String) {
    let status = if succeeded { ItemStatus::Completed } else { ItemStatus::Failed };

    if let Err(err) = conversations.patch_item_status(&headers.tool_call_id, status, ContentContainer::Text(output_text)).await {
        log::warn!(err:?, conversation_id = headers.conversation_id, tool_call_id = headers.tool_call_id; "failed to patch mcp_call item status");
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn extracts_both_required_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONVERSATION_ID_HEADER, HeaderValue::from_static("conv-1"));
        headers.insert(TOOL_CALL_ID_HEADER, HeaderValue::from_static("call-1"));

        let extracted = ToolCallHeaders::extract(&headers).unwrap();
        assert_eq!(extracted.conversation_id, "conv-1");
        assert_eq!(extracted.tool_call_id, "call-1");
        assert!(extracted.authorization.is_none());
    }

    #[test]
    fn missing_tool_call_id_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(CONVERSATION_ID_HEADER, HeaderValue::from_static("conv-1"));

        assert!(ToolCallHeaders::extract(&headers).is_none());
    }

    #[tokio::test]
    async fn track_completion_patches_the_item() {
        let repo: Arc<dyn ConversationRepository> = Arc::new(conversation::InMemoryConversationRepository::new());
        let appended = repo
            .add_items(
                "conv-1",
                "main",
                vec![conversation::NewItem {
                    role: messages::Role::Assistant,
                    item_type: conversation::ItemType::McpCall,
                    status: ItemStatus::InProgress,
                    content: ContentContainer::Text(String::new()),
                    call_id: Some("call-1".to_string()),
                    name: Some("web_search".to_string()),
                    arguments: None,
                    server_label: Some("Jan MCP Server".to_string()),
                }],
                jiff::Timestamp::UNIX_EPOCH,
            )
            .await
            .unwrap();

        let headers = ToolCallHeaders { conversation_id: "conv-1".to_string(), tool_call_id: appended[0].public_id.clone(), authorization: None };

        track_completion(&repo, &headers, true, "result text".to_string()).await;

        let items = repo.get_items("conv-1", "main", conversation::Pagination::default()).await.unwrap();
        assert_eq!(items[0].status, ItemStatus::Completed);
        assert_eq!(items[0].text(), "result text");
    }
}
