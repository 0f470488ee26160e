//! Gateway server library.
//!
//! Provides a reusable server function to serve the gateway either for the
//! binary, or for integration tests.

mod auth_middleware;
mod bootstrap;
mod error;
mod logger;
mod routes;
mod state;
mod tracing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::Router;
use axum::routing::get;
use catalog::{InMemoryModelCatalogRepository, InMemoryProviderModelRepository};
use config::Config;
use conversation::InMemoryConversationRepository;
use mcp::InMemoryToolRegistry;
use providers::{InMemoryProviderRepository, Registry as ProviderRegistry};
use queue::{BackgroundOrchestrator, InMemoryResponseRepository};
use router::EndpointRouter;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use auth::{Authenticator, KeycloakOAuthClient, PkceStore};
use chat::ChatService;

use crate::state::AppState;

pub use crate::error::Error as ServerError;

/// Configuration for serving the gateway.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to.
    pub listen_address: SocketAddr,
    /// The deserialized gateway TOML configuration.
    pub config: Config,
    /// Cancellation token for graceful shutdown.
    pub shutdown_signal: CancellationToken,
    /// Log filter string (e.g. "info" or "server=debug,chat=debug").
    pub log_filter: String,
    /// The version string to log on startup.
    pub version: String,
    /// Optional oneshot sender to send back the bound address (useful if
    /// port 0 was specified).
    pub bound_addr_sender: Option<tokio::sync::oneshot::Sender<SocketAddr>>,
}

/// Starts and runs the gateway server with the provided configuration.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter: _,
        version,
        bound_addr_sender,
    }: ServeConfig,
) -> anyhow::Result<()> {
    log::info!("gateway {version}");

    let credential_secret = std::env::var("MODEL_PROVIDER_SECRET").ok();
    if credential_secret.is_none() {
        log::warn!("MODEL_PROVIDER_SECRET is not set; credentialed providers cannot be registered");
    }

    let provider_registry = Arc::new(ProviderRegistry::new(Arc::new(InMemoryProviderRepository::new()), credential_secret.clone()));
    bootstrap::seed_providers(&provider_registry, &config.providers).await;

    let provider_models = Arc::new(InMemoryProviderModelRepository::new());
    let model_catalog = Arc::new(InMemoryModelCatalogRepository::new());
    let conversations: Arc<dyn conversation::ConversationRepository> = Arc::new(InMemoryConversationRepository::new());
    let responses: Arc<dyn queue::ResponseRepository> = Arc::new(InMemoryResponseRepository::new());
    let endpoint_router = Arc::new(EndpointRouter::new());

    let chat = Arc::new(ChatService::new(
        provider_registry.clone(),
        provider_models,
        model_catalog,
        conversations.clone(),
        endpoint_router,
        credential_secret.clone(),
    ));

    let tool_registry = Arc::new(InMemoryToolRegistry::new());
    let mcp_gateway = Arc::new(mcp::McpGateway::new(tool_registry, conversations.clone()));

    for (label, server) in &config.mcp.servers {
        match server {
            config::McpServerConfig::Http { uri } => match mcp::DownstreamClient::connect(uri.as_str(), None).await {
                Ok(client) => match mcp_gateway.register_downstream(label, client).await {
                    Ok(count) => log::info!(server = label.as_str(), tools = count; "registered downstream MCP server"),
                    Err(err) => log::warn!(err:?, server = label.as_str(); "failed to register downstream MCP server's tools"),
                },
                Err(err) => log::warn!(err:?, server = label.as_str(); "failed to connect to downstream MCP server"),
            },
            config::McpServerConfig::Stdio { .. } => {
                log::warn!(server = label.as_str(); "stdio downstream MCP servers are not supported by this gateway's transport");
            }
        }
    }

    let orchestrator = Arc::new(BackgroundOrchestrator::new(chat.clone(), responses.clone(), config.queue.webhook_timeout, config.queue.max_webhook_attempts));
    queue::spawn_workers(orchestrator.clone(), responses.clone(), config.queue.worker_count, config.queue.poll_interval);

    let authenticator = Arc::new(Authenticator::new(config.auth.clone()));
    let oauth = config.auth.keycloak.clone().map(|keycloak| Arc::new(KeycloakOAuthClient::new(keycloak)));

    let state = AppState {
        chat,
        mcp: mcp_gateway,
        orchestrator,
        conversations,
        responses,
        providers: provider_registry,
        authenticator,
        oauth,
        pkce: Arc::new(PkceStore::new()),
        http_client: reqwest::Client::new(),
        mcp_config: config.mcp.clone(),
        credential_secret,
    };

    let cors = if config.server.cors_allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<http::HeaderValue> = config.server.cors_allowed_origins.iter().filter_map(|origin| origin.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    };

    let mut app = Router::new().merge(routes::protected(state.clone())).merge(routes::public()).with_state(state);

    if config.server.health.enabled {
        app = app.route(&config.server.health.path, get(routes::health::health));
    }

    let app = app.layer(cors).layer(axum::middleware::from_fn(tracing::trace_requests));

    let listener = TcpListener::bind(listen_address).await.map_err(|err| anyhow!("failed to bind to {listen_address}: {err}"))?;

    if let Some(sender) = bound_addr_sender {
        sender.send(listener.local_addr()?).expect("failed to send back bound address");
    }

    log::info!("listening on http://{listen_address}");
    if config.mcp.enabled {
        log::info!("MCP endpoint: http://{listen_address}{}", config.mcp.path);
    }

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result.map_err(|err| anyhow!("server error: {err}"))?;
        }
        _ = shutdown_signal.cancelled() => {
            log::info!("received shutdown signal, shutting down gracefully...");
        }
    }

    Ok(())
}

/// Initializes the process-wide logger. Idempotent; safe to call once
/// from the binary before [`serve`].
pub fn init_logger(log_filter: &str) {
    logger::init(log_filter);
}
