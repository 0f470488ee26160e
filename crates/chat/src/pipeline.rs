use std::sync::Arc;

use jiff::Timestamp;
use messages::{ContentContainer, Message, Role};
use providers::Registry as ProviderRegistry;
use router::EndpointRouter;

use conversation::{Conversation, ConversationRepository, DEFAULT_BRANCH, Item, ItemStatus, ItemType, NewItem};
use prompt::Context as PromptContext;

use crate::error::Error;
use crate::request::ChatCompletionRequest;
use crate::response::ChatCompletionResponse;
use crate::{adapter, dispatch};

const FALLBACK_REPLY: &str = "I'm having trouble reaching the model right now. Please try again in a moment.";

/// Fuses the provider registry, catalog, budget, conversation and prompt
/// crates into the single `create_completion` operation. Holds only
/// shared, cheaply-cloned handles — no per-request state.
pub struct ChatService {
    providers: Arc<ProviderRegistry>,
    provider_models: Arc<dyn catalog::ProviderModelRepository>,
    model_catalog: Arc<dyn catalog::ModelCatalogRepository>,
    conversations: Arc<dyn ConversationRepository>,
    endpoint_router: Arc<EndpointRouter>,
    credential_secret: Option<String>,
}

impl ChatService {
    pub fn new(
        providers: Arc<ProviderRegistry>,
        provider_models: Arc<dyn catalog::ProviderModelRepository>,
        model_catalog: Arc<dyn catalog::ModelCatalogRepository>,
        conversations: Arc<dyn ConversationRepository>,
        endpoint_router: Arc<EndpointRouter>,
        credential_secret: Option<String>,
    ) -> Self {
        Self { providers, provider_models, model_catalog, conversations, endpoint_router, credential_secret }
    }

    pub async fn create_completion(&self, user_id: &str, request: ChatCompletionRequest) -> Result<ChatCompletionResponse, Error> {
        let now = Timestamp::now();

        let mut conversation = self.resolve_conversation(user_id, &request, now).await?;
        let history = self.load_history(&conversation).await?;

        let mut messages = history;
        messages.extend(request.messages.clone());

        let binding = self.select_model(&request.model).await?;
        let provider = self
            .providers
            .find_by_public_id(&binding.provider_id)
            .await?
            .ok_or_else(|| Error::ModelNotFound(request.model.clone()))?;

        let catalog_entry = self.model_catalog.find_by_public_id(&request.model).await.ok().flatten();

        let mut provider_request = request.clone();
        provider_request.model = binding.provider_original_model_id.clone();

        if let Some(instruction) = &conversation.effective_instruction_snapshot {
            messages = prepend_project_instruction(messages, instruction);
        }

        let prompt_context = PromptContext {
            user_id: user_id.to_string(),
            conversation_id: Some(conversation.public_id.clone()),
            project_instruction: conversation.effective_instruction_snapshot.clone(),
            tools: request.tools.clone(),
            deep_research: request.deep_research,
            ..PromptContext::default()
        };

        let (messages, _applied) = prompt::orchestrate(&prompt_context, messages);
        provider_request.messages = messages;

        let context_length = catalog_entry.as_ref().and_then(|c| c.context_length).unwrap_or(128_000);
        let tools_tokens: u32 = request.tools.iter().map(|tool| budget::estimate_text_tokens(&tool.parameters.to_string()) + budget::estimate_text_tokens(&tool.description)).sum();

        let (_token_budget, budgeted_messages) = budget::enforce(provider_request.messages, context_length, tools_tokens, request.max_tokens, 0, None)?;
        provider_request.messages = budgeted_messages;

        let result = self.dispatch_to_provider(&provider, &provider_request).await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                log::warn!(err:?; "upstream chat completion call failed, degrading to the fallback reply");
                ChatCompletionResponse {
                    id: String::new(),
                    model: request.model.clone(),
                    message: Message::assistant(FALLBACK_REPLY),
                    usage: None,
                    finish_reason: Some("error".to_string()),
                    upstream_error: Some(err.to_string()),
                }
            }
        };

        if request.store {
            self.persist_turn(&mut conversation, &request, &response, now).await;
        }

        Ok(response)
    }

    async fn resolve_conversation(&self, user_id: &str, request: &ChatCompletionRequest, now: Timestamp) -> Result<Conversation, Error> {
        if let Some(conversation_id) = &request.conversation_id
            && let Some(conversation) = self.conversations.find_by_public_id(conversation_id).await?
        {
            return Ok(conversation);
        }

        if !request.store {
            return Ok(Conversation::new(user_id.to_string(), None, None, now));
        }

        let conversation = Conversation::new(user_id.to_string(), None, None, now);
        self.conversations.insert(conversation).await.map_err(Error::from)
    }

    async fn load_history(&self, conversation: &Conversation) -> Result<Vec<Message>, Error> {
        let branch = if conversation.active_branch.is_empty() { DEFAULT_BRANCH } else { &conversation.active_branch };

        let items = self.conversations.get_items(&conversation.public_id, branch, conversation::Pagination::default()).await?;
        Ok(items.iter().map(item_to_message).collect())
    }

    async fn select_model(&self, model_public_id: &str) -> Result<catalog::ProviderModel, Error> {
        let providers = self.providers.find(&providers::Filter { active_only: true, ..Default::default() }, providers::Pagination::default()).await?;

        let mut candidates = Vec::new();
        for provider in &providers {
            let bindings = self.provider_models.list_for_provider(&provider.public_id).await?;
            candidates.extend(bindings.into_iter().filter(|binding| binding.model_public_id == model_public_id && binding.active));
        }

        candidates.sort_by_key(|binding| binding.display_order);
        candidates.into_iter().next().ok_or_else(|| Error::ModelNotFound(model_public_id.to_string()))
    }

    async fn dispatch_to_provider(&self, provider: &providers::Provider, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse, Error> {
        let base_url = self
            .endpoint_router
            .next(&provider.public_id, &provider.endpoints)
            .map_err(|err| Error::Connection(err.to_string()))?
            .to_string();

        let credential = match &provider.encrypted_credential {
            Some(encrypted) => {
                let secret = self.credential_secret.as_deref().unwrap_or_default();
                providers::decrypt_credential(encrypted, secret).map_err(|err| Error::AuthenticationFailed(err.to_string()))?
            }
            None => secrecy::SecretString::from(String::new()),
        };

        let chat_adapter = adapter::adapter_for(provider.kind);
        dispatch::dispatch(chat_adapter.as_ref(), &base_url, &credential, request).await
    }

    async fn persist_turn(&self, conversation: &mut Conversation, request: &ChatCompletionRequest, response: &ChatCompletionResponse, now: Timestamp) {
        let branch = if conversation.active_branch.is_empty() { DEFAULT_BRANCH.to_string() } else { conversation.active_branch.clone() };

        let mut new_items = Vec::new();

        if let Some(last) = request.messages.last()
            && last.role == Role::User
        {
            new_items.push(NewItem::text(Role::User, last.text()));
        }

        new_items.push(NewItem::text(Role::Assistant, response.message.text()));

        if let Some(tool_calls) = &response.message.tool_calls {
            for call in tool_calls {
                new_items.push(NewItem {
                    role: Role::Assistant,
                    item_type: ItemType::McpCall,
                    status: ItemStatus::InProgress,
                    content: ContentContainer::Text(String::new()),
                    call_id: Some(call.id.clone()),
                    name: Some(call.name.clone()),
                    arguments: Some(call.arguments.clone()),
                    server_label: Some("Jan MCP Server".to_string()),
                });
            }
        }

        match self.conversations.add_items(&conversation.public_id, &branch, new_items, now).await {
            Ok(_) => {}
            Err(err) => {
                log::warn!(err:?; "failed to persist conversation turn, the model reply is still returned to the caller");
                return;
            }
        }

        self.reevaluate_title(conversation, request).await;
    }

    async fn reevaluate_title(&self, conversation: &mut Conversation, request: &ChatCompletionRequest) {
        let branch = if conversation.active_branch.is_empty() { DEFAULT_BRANCH.to_string() } else { conversation.active_branch.clone() };

        let count = match self.conversations.user_message_count(&conversation.public_id, &branch).await {
            Ok(count) => count,
            Err(_) => return,
        };

        if !conversation::should_reevaluate_title(count) {
            return;
        }

        let Some(first_user_text) = request.messages.iter().find(|m| m.role == Role::User).map(Message::text) else {
            return;
        };

        let candidate = conversation::fallback_title(&first_user_text);
        if conversation::apply_title(conversation, candidate) {
            let _ = self.conversations.update(conversation.clone()).await;
        }
    }
}

fn item_to_message(item: &Item) -> Message {
    Message { role: item.role, content: item.content.clone(), tool_calls: None, tool_call_id: item.call_id.clone() }
}

fn prepend_project_instruction(mut messages: Vec<Message>, instruction: &str) -> Vec<Message> {
    let already_present = messages.first().is_some_and(|first| first.role == Role::System && first.text() == instruction);

    if !already_present {
        messages.insert(0, Message::system(instruction.to_string()));
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_instruction_is_not_duplicated() {
        let messages = vec![Message::system("Be terse."), Message::user("hi")];
        let result = prepend_project_instruction(messages, "Be terse.");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn project_instruction_is_prepended_when_missing() {
        let messages = vec![Message::user("hi")];
        let result = prepend_project_instruction(messages, "Be terse.");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].role, Role::System);
    }
}
