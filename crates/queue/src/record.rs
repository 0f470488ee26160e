use jiff::Timestamp;
use secrecy::SecretString;
use serde_json::Value;

use chat::{ChatCompletionRequest, Usage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl ResponseStatus {
    /// `cancel` is a no-op once a record reaches one of these.
    pub fn is_terminal(self) -> bool {
        matches!(self, ResponseStatus::Completed | ResponseStatus::Failed | ResponseStatus::Cancelled)
    }
}

/// A queued or completed background chat completion. `api_key` is carried
/// so the worker can rehydrate the caller's outbound credential context
/// when it eventually runs.
#[derive(Clone)]
pub struct ResponseRecord {
    pub public_id: String,
    pub user_id: String,
    pub api_key: SecretString,
    pub conversation_id: Option<String>,
    pub status: ResponseStatus,
    pub input: ChatCompletionRequest,
    pub metadata: Value,
    pub webhook_url: Option<String>,
    pub output_text: Option<String>,
    pub usage: Option<Usage>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ResponseRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        public_id: String,
        user_id: String,
        api_key: SecretString,
        input: ChatCompletionRequest,
        metadata: Value,
        webhook_url: Option<String>,
        now: Timestamp,
    ) -> Self {
        let conversation_id = input.conversation_id.clone();

        Self {
            public_id,
            user_id,
            api_key,
            conversation_id,
            status: ResponseStatus::Queued,
            input,
            metadata,
            webhook_url,
            output_text: None,
            usage: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
