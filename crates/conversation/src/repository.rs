use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use messages::ContentContainer;

use crate::conversation::Conversation;
use crate::error::Error;
use crate::item::{Item, ItemStatus, ItemType, NewItem};

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { offset: 0, limit: 100 }
    }
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn insert(&self, conversation: Conversation) -> Result<Conversation, Error>;
    async fn update(&self, conversation: Conversation) -> Result<Conversation, Error>;
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Conversation>, Error>;

    /// Appends `items` to `branch`, assigning sequence numbers and
    /// timestamps. Skips a trailing duplicate: if the branch's most recent
    /// item is a user message with identical trimmed text to a leading
    /// user item in `items`, that item is dropped before the rest append.
    async fn add_items(&self, conversation_id: &str, branch: &str, items: Vec<NewItem>, now: Timestamp) -> Result<Vec<Item>, Error>;
    async fn get_items(&self, conversation_id: &str, branch: &str, pagination: Pagination) -> Result<Vec<Item>, Error>;
    async fn user_message_count(&self, conversation_id: &str, branch: &str) -> Result<u64, Error>;

    /// Flips one `mcp_call` item from `in_progress` to a terminal status,
    /// keyed by its own `public_id` rather than `(conversation_id, branch)` —
    /// the caller (a tool gateway) only ever has the item id on hand.
    async fn patch_item_status(&self, item_public_id: &str, status: ItemStatus, content: ContentContainer) -> Result<Item, Error>;
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: DashMap<String, Conversation>,
    items: DashMap<(String, String), Vec<Item>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn insert(&self, conversation: Conversation) -> Result<Conversation, Error> {
        self.conversations.insert(conversation.public_id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn update(&self, conversation: Conversation) -> Result<Conversation, Error> {
        let mut entry = self.conversations.get_mut(&conversation.public_id).ok_or_else(|| Error::NotFound(conversation.public_id.clone()))?;

        if entry.referrer.is_some() && entry.referrer != conversation.referrer {
            return Err(Error::ReferrerIsImmutable(conversation.public_id.clone()));
        }

        *entry = conversation.clone();
        Ok(conversation)
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Conversation>, Error> {
        Ok(self.conversations.get(public_id).map(|entry| entry.clone()))
    }

    async fn add_items(&self, conversation_id: &str, branch: &str, mut items: Vec<NewItem>, now: Timestamp) -> Result<Vec<Item>, Error> {
        let key = (conversation_id.to_string(), branch.to_string());
        let mut branch_items = self.items.entry(key).or_default();

        if let (Some(last), Some(first_new)) = (branch_items.last(), items.first())
            && is_duplicate_user_turn(last, first_new)
        {
            items.remove(0);
        }

        let mut next_sequence = branch_items.last().map(|item| item.sequence + 1).unwrap_or(0);
        let mut appended = Vec::with_capacity(items.len());

        for new_item in items {
            let item = Item {
                public_id: uuid::Uuid::new_v4().to_string(),
                sequence: next_sequence,
                role: new_item.role,
                item_type: new_item.item_type,
                status: new_item.status,
                content: new_item.content,
                call_id: new_item.call_id,
                name: new_item.name,
                arguments: new_item.arguments,
                server_label: new_item.server_label,
                created_at: now,
            };

            next_sequence += 1;
            branch_items.push(item.clone());
            appended.push(item);
        }

        Ok(appended)
    }

    async fn get_items(&self, conversation_id: &str, branch: &str, pagination: Pagination) -> Result<Vec<Item>, Error> {
        let key = (conversation_id.to_string(), branch.to_string());
        let Some(branch_items) = self.items.get(&key) else {
            return Ok(Vec::new());
        };

        Ok(branch_items.iter().skip(pagination.offset).take(pagination.limit).cloned().collect())
    }

    async fn user_message_count(&self, conversation_id: &str, branch: &str) -> Result<u64, Error> {
        let key = (conversation_id.to_string(), branch.to_string());
        let Some(branch_items) = self.items.get(&key) else {
            return Ok(0);
        };

        Ok(branch_items.iter().filter(|item| item.item_type == ItemType::Message && item.role == messages::Role::User).count() as u64)
    }

    async fn patch_item_status(&self, item_public_id: &str, status: ItemStatus, content: ContentContainer) -> Result<Item, Error> {
        for mut branch_items in self.items.iter_mut() {
            if let Some(item) = branch_items.iter_mut().find(|item| item.public_id == item_public_id) {
                item.status = status;
                item.content = content;
                return Ok(item.clone());
            }
        }

        Err(Error::ItemNotFound(item_public_id.to_string()))
    }
}

fn is_duplicate_user_turn(last: &Item, candidate: &NewItem) -> bool {
    last.item_type == ItemType::Message
        && last.role == messages::Role::User
        && candidate.item_type == ItemType::Message
        && candidate.role == messages::Role::User
        && last.text().trim() == text_of(candidate).trim()
}

fn text_of(new_item: &NewItem) -> String {
    use messages::ContentContainer;

    match &new_item.content {
        ContentContainer::Text(text) => text.clone(),
        ContentContainer::Blocks(blocks) => blocks.iter().filter_map(|c| c.as_text()).collect::<Vec<_>>().join(""),
    }
}

#[cfg(test)]
mod tests {
    use messages::{ContentContainer, Role};

    use super::*;

    fn repo() -> InMemoryConversationRepository {
        InMemoryConversationRepository::new()
    }

    #[tokio::test]
    async fn items_get_monotonic_sequence_numbers() {
        let repo = repo();
        let items = vec![NewItem::text(Role::User, "hi"), NewItem::text(Role::Assistant, "hello")];
        let appended = repo.add_items("conv-1", "main", items, Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(appended[0].sequence, 0);
        assert_eq!(appended[1].sequence, 1);
    }

    #[tokio::test]
    async fn sequence_continues_across_calls() {
        let repo = repo();
        repo.add_items("conv-1", "main", vec![NewItem::text(Role::User, "hi")], Timestamp::UNIX_EPOCH).await.unwrap();
        let second = repo.add_items("conv-1", "main", vec![NewItem::text(Role::Assistant, "hello")], Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(second[0].sequence, 1);
    }

    #[tokio::test]
    async fn duplicate_trailing_user_turn_is_skipped() {
        let repo = repo();
        repo.add_items("conv-1", "main", vec![NewItem::text(Role::User, "  same text  ")], Timestamp::UNIX_EPOCH).await.unwrap();
        let second = repo.add_items("conv-1", "main", vec![NewItem::text(Role::User, "same text"), NewItem::text(Role::Assistant, "reply")], Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn get_items_paginates_in_sequence_order() {
        let repo = repo();
        let items = (0..5).map(|i| NewItem::text(Role::User, format!("turn {i}"))).collect();
        repo.add_items("conv-1", "main", items, Timestamp::UNIX_EPOCH).await.unwrap();

        let page = repo.get_items("conv-1", "main", Pagination { offset: 2, limit: 2 }).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].sequence, 2);
    }

    #[tokio::test]
    async fn updating_with_a_different_referrer_is_rejected() {
        let repo = repo();
        let mut conversation = Conversation::new("user-1".to_string(), None, Some("web".to_string()), Timestamp::UNIX_EPOCH);
        repo.insert(conversation.clone()).await.unwrap();

        conversation.referrer = Some("mobile".to_string());
        let err = repo.update(conversation).await.unwrap_err();
        assert!(matches!(err, Error::ReferrerIsImmutable(_)));
    }

    #[tokio::test]
    async fn patch_item_status_updates_by_public_id_across_branches() {
        let repo = repo();
        let appended = repo
            .add_items(
                "conv-1",
                "main",
                vec![NewItem {
                    role: Role::Assistant,
                    item_type: ItemType::McpCall,
                    status: ItemStatus::InProgress,
                    content: ContentContainer::Text(String::new()),
                    call_id: Some("call-1".to_string()),
                    name: Some("web_search".to_string()),
                    arguments: None,
                    server_label: Some("Jan MCP Server".to_string()),
                }],
                Timestamp::UNIX_EPOCH,
            )
            .await
            .unwrap();

        let patched = repo.patch_item_status(&appended[0].public_id, ItemStatus::Completed, ContentContainer::Text("done".to_string())).await.unwrap();

        assert_eq!(patched.status, ItemStatus::Completed);
        assert_eq!(patched.text(), "done");
    }

    #[tokio::test]
    async fn patch_item_status_rejects_unknown_id() {
        let repo = repo();
        let err = repo.patch_item_status("missing", ItemStatus::Completed, ContentContainer::Text(String::new())).await.unwrap_err();
        assert!(matches!(err, Error::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn user_message_count_only_counts_user_messages() {
        let repo = repo();
        repo.add_items(
            "conv-1",
            "main",
            vec![NewItem::text(Role::System, "sys"), NewItem::text(Role::User, "hi"), NewItem::text(Role::Assistant, "hello")],
            Timestamp::UNIX_EPOCH,
        )
        .await
        .unwrap();

        assert_eq!(repo.user_message_count("conv-1", "main").await.unwrap(), 1);
    }
}
