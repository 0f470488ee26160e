use jiff::Timestamp;
use messages::{ContentContainer, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Message,
    ToolCall,
    McpCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Completed,
    Failed,
}

/// One entry in a conversation branch's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub public_id: String,
    pub sequence: u64,
    pub role: Role,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub content: ContentContainer,
    pub call_id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<Value>,
    pub server_label: Option<String>,
    pub created_at: Timestamp,
}

impl Item {
    /// Concatenated text of the item's content, used for de-duplication and
    /// title synthesis.
    pub fn text(&self) -> String {
        match &self.content {
            ContentContainer::Text(text) => text.clone(),
            ContentContainer::Blocks(blocks) => blocks.iter().filter_map(|c| c.as_text()).collect::<Vec<_>>().join(""),
        }
    }
}

/// What a caller supplies to append one item; the store fills in
/// `public_id`, `sequence` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub role: Role,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub content: ContentContainer,
    pub call_id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<Value>,
    pub server_label: Option<String>,
}

impl NewItem {
    pub fn message(role: Role, content: ContentContainer) -> Self {
        Self {
            role,
            item_type: ItemType::Message,
            status: ItemStatus::Completed,
            content,
            call_id: None,
            name: None,
            arguments: None,
            server_label: None,
        }
    }

    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::message(role, ContentContainer::Text(text.into()))
    }
}
