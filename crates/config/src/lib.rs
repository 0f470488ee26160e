//! TOML configuration structures for the gateway binary.

mod auth;
mod budget;
mod error;
mod loader;
mod mcp;
mod providers;
mod queue;
mod server;
mod telemetry;

use std::path::Path;

pub use auth::{AuthConfig, KeycloakConfig};
pub use budget::BudgetConfig;
pub use error::Error;
pub use mcp::{McpConfig, McpServerConfig};
pub use providers::{BootstrapEndpointConfig, BootstrapProviderConfig, ProvidersConfig};
pub use queue::QueueConfig;
use serde::Deserialize;
pub use server::{HealthConfig, ServerConfig};
pub use telemetry::{LogFormat, TelemetryConfig};

/// Root configuration for the gateway, loaded from a single TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub mcp: McpConfig,
    pub queue: QueueConfig,
    pub auth: AuthConfig,
    pub telemetry: TelemetryConfig,
    pub budget: BudgetConfig,
}

impl Config {
    /// Load configuration from a file path, expanding `{{ env.VAR }}`
    /// placeholders and validating that at least one downstream is usable.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use crate::Config;

    #[test]
    fn defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_debug_snapshot!(&config, @r#"
        Config {
            server: ServerConfig {
                listen_address: None,
                health: HealthConfig {
                    enabled: true,
                    path: "/health",
                },
                cors_allowed_origins: [],
            },
            providers: ProvidersConfig {
                bootstrap: {},
            },
            mcp: McpConfig {
                enabled: true,
                path: "/mcp",
                servers: {},
                allowed_methods: [
                    "initialize",
                    "tools/list",
                    "tools/call",
                    "ping",
                ],
            },
            queue: QueueConfig {
                worker_count: 4,
                poll_interval: 500ms,
                webhook_timeout: 10s,
                max_webhook_attempts: 5,
            },
            auth: AuthConfig {
                keycloak: None,
            },
            telemetry: TelemetryConfig {
                service_name: "gateway",
                log_level: "info",
                log_format: Text,
            },
            budget: BudgetConfig {
                default_context_window: 128000,
                default_max_output_tokens: 4096,
                image_token_cost: 765,
                reply_reservation_ratio: 0.25,
            },
        }
        "#);
    }
}
