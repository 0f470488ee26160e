use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use config::KeycloakConfig;

use crate::endpoint::realm_relative;
use crate::error::AuthError;
use crate::pkce::PkceStore;

const TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// A successful token exchange or refresh.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Drives the authorization-code + PKCE flow and the subsequent
/// refresh/logout calls against a Keycloak realm.
pub struct KeycloakOAuthClient {
    config: KeycloakConfig,
    http: reqwest::Client,
}

impl KeycloakOAuthClient {
    pub fn new(config: KeycloakConfig) -> Self {
        Self { config, http: reqwest::Client::new() }
    }

    /// Builds the URL to redirect the browser to, after registering the
    /// PKCE challenge under a fresh `state` in `pkce_store`.
    pub fn authorize_url(&self, pkce_store: &PkceStore, caller_redirect: Url) -> Url {
        let (state, challenge) = pkce_store.begin(caller_redirect);

        let mut url = self.endpoint("protocol/openid-connect/auth");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", "openid profile email")
            .append_pair("state", &state)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256");

        url
    }

    /// Completes the flow: looks up the PKCE verifier for `state` (failing
    /// if it's missing or already expired) and exchanges `code` for
    /// tokens. Returns the caller's own redirect target alongside the
    /// tokens so the HTTP layer can forward them in the 302's fragment.
    pub async fn exchange_code(&self, pkce_store: &PkceStore, state: &str, code: &str) -> Result<(TokenResponse, Url), AuthError> {
        let pending = pkce_store.take(state).ok_or(AuthError::UnknownState)?;

        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.to_string()),
            ("code", code.to_string()),
            ("code_verifier", pending.verifier.expose_secret().to_string()),
        ];

        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.expose_secret().to_string()));
        }

        let token = self.post_token_endpoint(&form).await?;
        Ok((token, pending.caller_redirect))
    }

    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, AuthError> {
        let mut form = vec![("grant_type", "refresh_token".to_string()), ("client_id", self.config.client_id.clone()), ("refresh_token", refresh_token.expose_secret().to_string())];

        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.expose_secret().to_string()));
        }

        self.post_token_endpoint(&form).await
    }

    pub async fn logout(&self, refresh_token: &SecretString) -> Result<(), AuthError> {
        let url = self.endpoint("protocol/openid-connect/logout");

        let mut form = vec![("client_id", self.config.client_id.clone()), ("refresh_token", refresh_token.expose_secret().to_string())];

        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.expose_secret().to_string()));
        }

        let response = self.http.post(url).timeout(TOKEN_EXCHANGE_TIMEOUT).form(&form).send().await.map_err(|err| {
            log::warn!(err:?; "keycloak logout request failed");
            AuthError::Internal
        })?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchangeFailed(body));
        }

        Ok(())
    }

    async fn post_token_endpoint(&self, form: &[(&str, String)]) -> Result<TokenResponse, AuthError> {
        let url = self.endpoint("protocol/openid-connect/token");

        let response = self.http.post(url).timeout(TOKEN_EXCHANGE_TIMEOUT).form(form).send().await.map_err(|err| {
            log::warn!(err:?; "keycloak token endpoint request failed");
            AuthError::Internal
        })?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchangeFailed(body));
        }

        response.json().await.map_err(|_| AuthError::TokenExchangeFailed("malformed token response".to_string()))
    }

    fn endpoint(&self, relative: &str) -> Url {
        realm_relative(&self.config.issuer, relative)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(issuer: &str) -> KeycloakConfig {
        KeycloakConfig {
            issuer: Url::parse(issuer).unwrap(),
            client_id: "nexus".to_string(),
            client_secret: None,
            audience: None,
            jwks_cache_ttl_secs: 3600,
            redirect_uri: Url::parse("https://gateway.example/auth/keycloak/callback").unwrap(),
        }
    }

    #[tokio::test]
    async fn exchange_code_rejects_an_unknown_state() {
        let server = MockServer::start().await;
        let client = KeycloakOAuthClient::new(config(&server.uri()));
        let pkce_store = PkceStore::new();

        let result = client.exchange_code(&pkce_store, "never-issued", "some-code").await;
        assert!(matches!(result, Err(AuthError::UnknownState)));
    }

    #[tokio::test]
    async fn exchange_code_returns_tokens_and_the_caller_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 300,
                "token_type": "Bearer",
            })))
            .mount(&server)
            .await;

        let client = KeycloakOAuthClient::new(config(&server.uri()));
        let pkce_store = PkceStore::new();
        let caller_redirect = Url::parse("https://client.example/done").unwrap();

        let authorize_url = client.authorize_url(&pkce_store, caller_redirect.clone());
        let state = authorize_url.query_pairs().find(|(key, _)| key == "state").unwrap().1.into_owned();

        let (token, redirect) = client.exchange_code(&pkce_store, &state, "some-code").await.unwrap();

        assert_eq!(token.access_token.expose_secret(), "access-1");
        assert_eq!(redirect, caller_redirect);
    }

    #[tokio::test]
    async fn token_endpoint_error_surfaces_as_exchange_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let client = KeycloakOAuthClient::new(config(&server.uri()));
        let refresh_token = SecretString::from("stale-refresh".to_string());

        let result = client.refresh(&refresh_token).await;
        assert!(matches!(result, Err(AuthError::TokenExchangeFailed(_))));
    }
}
