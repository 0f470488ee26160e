use std::sync::Arc;
use std::time::{Duration, Instant};

use jwt_compact::jwk::JsonWebKey;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::endpoint::realm_relative;
use crate::error::AuthError;

/// A parsed JWKS document. Keys are kept as raw [`Value`]s rather than
/// pre-built [`JsonWebKey`]s so a key this build doesn't recognize (an
/// unsupported `kty`/`crv`) doesn't fail the whole fetch, only that one
/// key's later decode attempt.
pub struct Jwks {
    keys: Vec<RawKey>,
}

struct RawKey {
    key_id: Option<String>,
    value: Value,
}

#[derive(Deserialize)]
struct Document {
    keys: Vec<Value>,
}

impl Jwks {
    fn parse(body: &str) -> Self {
        let document: Document = match serde_json::from_str(body) {
            Ok(document) => document,
            Err(err) => {
                log::warn!(err:?; "failed to parse JWKS document");
                Document { keys: Vec::new() }
            }
        };

        let keys = document
            .keys
            .into_iter()
            .map(|value| RawKey { key_id: value.get("kid").and_then(Value::as_str).map(str::to_owned), value })
            .collect();

        Self { keys }
    }

    pub fn keys(&self) -> impl Iterator<Item = Jwk<'_>> {
        self.keys.iter().map(|raw| Jwk { key_id: raw.key_id.as_deref(), value: &raw.value })
    }
}

pub struct Jwk<'a> {
    pub key_id: Option<&'a str>,
    value: &'a Value,
}

impl Jwk<'_> {
    /// `JsonWebKey`'s `Cow` fields never actually borrow from a
    /// [`serde_json::Value`] source (it only ever hands out owned
    /// strings), so this compiles for any lifetime regardless of how long
    /// `self` is held.
    pub fn as_json_web_key(&self) -> Option<JsonWebKey<'static>> {
        serde_json::from_value(self.value.clone()).ok()
    }
}

/// Fetches and caches the realm's JWKS document. Refreshed lazily on
/// expiry rather than via a background poll loop — this crate owns no
/// runtime to register one against, and the cost of an extra fetch on the
/// rare cache-miss request is negligible next to the upstream LLM call
/// that follows it.
pub struct JwksCache {
    url: Url,
    ttl: Duration,
    client: reqwest::Client,
    cached: RwLock<Option<(Arc<Jwks>, Instant)>>,
}

impl JwksCache {
    pub fn new(issuer: &Url, ttl: Duration) -> Self {
        let url = realm_relative(issuer, "protocol/openid-connect/certs");
        Self { url, ttl, client: reqwest::Client::new(), cached: RwLock::new(None) }
    }

    pub async fn get(&self) -> Result<Arc<Jwks>, AuthError> {
        if let Some((jwks, fetched_at)) = self.cached.read().await.as_ref()
            && fetched_at.elapsed() < self.ttl
        {
            return Ok(jwks.clone());
        }

        let response = self.client.get(self.url.clone()).send().await.map_err(|err| {
            log::warn!(err:?; "failed to fetch JWKS document");
            AuthError::Internal
        })?;

        let body = response.text().await.map_err(|_| AuthError::Internal)?;
        let jwks = Arc::new(Jwks::parse(&body));

        *self.cached.write().await = Some((jwks.clone(), Instant::now()));

        Ok(jwks)
    }
}
