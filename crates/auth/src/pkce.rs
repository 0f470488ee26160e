use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mini_moka::sync::Cache;
use rand::Rng;
use secrecy::SecretString;
use sha2::{Digest, Sha256};
use url::Url;

/// A pending authorization-code request: the PKCE verifier needed at the
/// callback, and the caller's own redirect target to forward the tokens to
/// once the exchange with Keycloak completes.
#[derive(Clone)]
pub struct PendingAuthorization {
    pub verifier: SecretString,
    pub caller_redirect: Url,
}

/// In-memory `state`-keyed PKCE store. Entries expire after 10 minutes and
/// are also removed on first use, so a `state` can't be replayed against
/// the callback.
pub struct PkceStore {
    cache: Cache<String, PendingAuthorization>,
}

impl PkceStore {
    pub fn new() -> Self {
        Self { cache: Cache::builder().time_to_live(Duration::from_secs(10 * 60)).build() }
    }

    /// Starts a new authorization request, returning `(state, code_challenge)`
    /// for the caller to embed in the redirect to Keycloak.
    pub fn begin(&self, caller_redirect: Url) -> (String, String) {
        let state = random_url_safe_token(32);
        let verifier = random_url_safe_token(64);
        let challenge = code_challenge(&verifier);

        self.cache.insert(state.clone(), PendingAuthorization { verifier: SecretString::from(verifier), caller_redirect });

        (state, challenge)
    }

    pub fn take(&self, state: &str) -> Option<PendingAuthorization> {
        let pending = self.cache.get(state)?;
        self.cache.invalidate(state);
        Some(pending)
    }
}

impl Default for PkceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn random_url_safe_token(byte_len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..byte_len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_take_round_trips_the_verifier() {
        let store = PkceStore::new();
        let (state, _challenge) = store.begin(Url::parse("https://client.example/callback").unwrap());

        let pending = store.take(&state).expect("pending authorization");
        assert_eq!(pending.caller_redirect.as_str(), "https://client.example/callback");
    }

    #[test]
    fn take_is_single_use() {
        let store = PkceStore::new();
        let (state, _challenge) = store.begin(Url::parse("https://client.example/callback").unwrap());

        assert!(store.take(&state).is_some());
        assert!(store.take(&state).is_none());
    }

    #[test]
    fn unknown_state_yields_none() {
        let store = PkceStore::new();
        assert!(store.take("never-issued").is_none());
    }
}
