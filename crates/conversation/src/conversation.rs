use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BRANCH: &str = "main";

/// A durable chat session: its items live separately, keyed by branch, in
/// the repository that owns this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub public_id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    /// Set once at creation (e.g. the client application that opened this
    /// conversation) and never changed afterward.
    pub referrer: Option<String>,
    pub effective_instruction_snapshot: Option<String>,
    pub active_branch: String,
    pub metadata: BTreeMap<String, Value>,
    pub title: Option<String>,
    /// Whether `title` was synthesized rather than set by the caller — an
    /// auto-title may be silently replaced by a better one; a caller-set
    /// title may not.
    pub title_auto: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Conversation {
    pub fn new(user_id: String, project_id: Option<String>, referrer: Option<String>, now: Timestamp) -> Self {
        Self {
            public_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            project_id,
            referrer,
            effective_instruction_snapshot: None,
            active_branch: DEFAULT_BRANCH.to_string(),
            metadata: BTreeMap::new(),
            title: None,
            title_auto: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn title_locked(&self) -> bool {
        self.metadata.get("title_locked").and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_defaults_to_the_main_branch_and_no_title() {
        let conversation = Conversation::new("user-1".to_string(), None, Some("web".to_string()), Timestamp::UNIX_EPOCH);
        assert_eq!(conversation.active_branch, DEFAULT_BRANCH);
        assert!(conversation.title.is_none());
        assert!(!conversation.title_locked());
    }
}
