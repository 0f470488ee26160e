//! Shared application state handed to every route handler.

use std::sync::Arc;

use auth::{Authenticator, KeycloakOAuthClient, PkceStore};
use chat::ChatService;
use conversation::ConversationRepository;
use mcp::McpGateway;
use providers::Registry as ProviderRegistry;
use queue::{BackgroundOrchestrator, ResponseRepository};

use config::McpConfig;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub mcp: Arc<McpGateway>,
    pub orchestrator: Arc<BackgroundOrchestrator>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub responses: Arc<dyn ResponseRepository>,
    pub providers: Arc<ProviderRegistry>,
    pub authenticator: Arc<Authenticator>,
    pub oauth: Option<Arc<KeycloakOAuthClient>>,
    pub pkce: Arc<PkceStore>,
    pub http_client: reqwest::Client,
    pub mcp_config: McpConfig,
    /// `MODEL_PROVIDER_SECRET`, read once at startup; `None` leaves
    /// credentialed providers unusable (`providers::Registry::register`
    /// then fails with `Error::MissingSecret`).
    pub credential_secret: Option<String>,
}
