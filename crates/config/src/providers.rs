use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Providers configured at startup. The registry (component B) seeds its
/// store from this map on boot; everything after that is managed through
/// the admin API and persisted, so this is a bootstrap, not a source of
/// truth for a running gateway.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    pub bootstrap: BTreeMap<String, BootstrapProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapProviderConfig {
    /// One of the known vendor kinds, e.g. `"openai"`, `"aws-bedrock"`, `"ollama"`.
    pub kind: String,
    pub endpoints: Vec<BootstrapEndpointConfig>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapEndpointConfig {
    pub base_url: Url,
    pub api_key: Option<SecretString>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}
