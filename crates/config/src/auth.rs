use serde::Deserialize;
use url::Url;

/// Bearer token validation settings (component K). With `keycloak` unset the
/// gateway runs in dev mode and treats every request as anonymous.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub keycloak: Option<KeycloakConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeycloakConfig {
    /// Realm issuer URL, also used to discover the JWKS endpoint.
    pub issuer: Url,
    pub client_id: String,
    pub client_secret: Option<secrecy::SecretString>,
    pub audience: Option<String>,
    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,
    /// Callback URL registered with the Keycloak client, where
    /// `/auth/keycloak/callback` is served.
    pub redirect_uri: Url,
}

fn default_jwks_cache_ttl_secs() -> u64 {
    3600
}
