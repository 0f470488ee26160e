use std::collections::BTreeMap;

use messages::ToolDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySource {
    User,
    Project,
    Episodic,
}

#[derive(Debug, Clone)]
pub struct MemoryFragment {
    pub source: MemorySource,
    pub text: String,
}

/// Everything the orchestrator may draw on to augment a message list.
/// Assembled by the `chat` crate from the conversation, the caller's
/// profile header, and whatever memory/project-instruction lookups it did
/// upstream — this crate itself performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub user_id: String,
    pub conversation_id: Option<String>,
    pub language: Option<String>,
    pub preferences: BTreeMap<String, String>,
    pub memory: Vec<MemoryFragment>,
    pub project_instruction: Option<String>,
    pub persona: Option<String>,
    pub model_catalog_id: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub deep_research: bool,
}
