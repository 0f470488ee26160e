use std::str::FromStr;
use std::time::Duration;

use context::{Authentication, BearerToken, Claims};
use http::HeaderMap;
use jwt_compact::alg::{Ed25519, Es256, Rsa};
use jwt_compact::jwk::JsonWebKey;
use jwt_compact::{Algorithm, AlgorithmExt, TimeOptions, Token, UntrustedToken};
use secrecy::SecretString;

use config::KeycloakConfig;

use crate::error::AuthError;
use crate::jwks::{Jwk, Jwks, JwksCache};

const BEARER_PREFIX_LEN: usize = 6;

/// Validates bearer tokens against a Keycloak realm's JWKS. With no
/// `Authorization` header, `authenticate` fails closed — callers that want
/// to allow anonymous access check for a missing header before calling in,
/// the way `RequestContext::from_headers` treats `principal: None`.
pub struct JwtValidator {
    config: KeycloakConfig,
    jwks: JwksCache,
}

impl JwtValidator {
    pub fn new(config: KeycloakConfig) -> Self {
        let jwks = JwksCache::new(&config.issuer, Duration::from_secs(config.jwks_cache_ttl_secs));
        Self { config, jwks }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Authentication, AuthError> {
        let header_value = headers.get(http::header::AUTHORIZATION).ok_or(AuthError::Unauthorized)?;
        let header_str = header_value.to_str().map_err(|_| AuthError::Unauthorized)?;

        if header_str.len() <= BEARER_PREFIX_LEN || !header_str[..BEARER_PREFIX_LEN].eq_ignore_ascii_case("bearer") {
            return Err(AuthError::InvalidToken("must be prefixed with Bearer".to_string()));
        }

        let raw_token = header_str[BEARER_PREFIX_LEN..].trim_start();
        if raw_token.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let untrusted = UntrustedToken::new(raw_token).map_err(|_| AuthError::InvalidToken("malformed token".to_string()))?;
        let jwks = self.jwks.get().await?;
        let token = self.validate_against_jwks(&jwks, &untrusted).ok_or(AuthError::Unauthorized)?;

        Ok(Authentication { bearer: Some(BearerToken { raw: SecretString::from(raw_token.to_string()), token }) })
    }

    fn validate_against_jwks(&self, jwks: &Jwks, untrusted: &UntrustedToken<'_>) -> Option<Token<Claims>> {
        let time_options = TimeOptions::default();

        jwks.keys().into_iter().filter_map(|jwk| self.try_decode(&jwk, untrusted)).find(|token| {
            let claims = token.claims();

            claims.validate_expiration(&time_options).is_ok()
                && (claims.not_before.is_none() || claims.validate_maturity(&time_options).is_ok())
                && self.issuer_matches(&claims.custom)
                && self.audience_matches(&claims.custom)
        })
    }

    fn try_decode(&self, jwk: &Jwk<'_>, untrusted: &UntrustedToken<'_>) -> Option<Token<Claims>> {
        if let (Some(expected), Some(kid)) = (&untrusted.header().key_id, &jwk.key_id)
            && expected != kid
        {
            return None;
        }

        let key = jwk.as_json_web_key()?;

        match Alg::from_str(untrusted.algorithm()).ok()? {
            Alg::Rs256 => decode(Rsa::rs256(), &key, untrusted),
            Alg::Rs384 => decode(Rsa::rs384(), &key, untrusted),
            Alg::Rs512 => decode(Rsa::rs512(), &key, untrusted),
            Alg::Ps256 => decode(Rsa::ps256(), &key, untrusted),
            Alg::Ps384 => decode(Rsa::ps384(), &key, untrusted),
            Alg::Ps512 => decode(Rsa::ps512(), &key, untrusted),
            Alg::Es256 => decode(Es256, &key, untrusted),
            Alg::EdDsa => decode(Ed25519, &key, untrusted),
        }
    }

    fn issuer_matches(&self, claims: &Claims) -> bool {
        let expected = self.config.issuer.as_str().trim_end_matches('/');

        match &claims.issuer {
            Some(issuer) => issuer.trim_end_matches('/') == expected,
            None => false,
        }
    }

    fn audience_matches(&self, claims: &Claims) -> bool {
        let Some(expected_audience) = &self.config.audience else {
            return true;
        };

        claims.audience.as_ref().is_some_and(|audiences| audiences.iter().any(|aud| aud == expected_audience))
    }
}

fn decode<A: Algorithm>(alg: A, jwk: &JsonWebKey<'_>, untrusted: &UntrustedToken<'_>) -> Option<Token<Claims>>
where
    A::VerifyingKey: for<'a> TryFrom<&'a JsonWebKey<'a>>,
{
    let key = A::VerifyingKey::try_from(jwk).ok()?;
    alg.validator(&key).validate(untrusted).ok()
}

/// Signing algorithms this validator knows how to verify, gated by the
/// `rsa`/`ed25519-compact`/`p256` `jwt-compact` features this crate
/// enables. Keycloak's default realm keys are RS256.
enum Alg {
    Rs256,
    Rs384,
    Rs512,
    Ps256,
    Ps384,
    Ps512,
    Es256,
    EdDsa,
}

impl FromStr for Alg {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "RS256" => Ok(Alg::Rs256),
            "RS384" => Ok(Alg::Rs384),
            "RS512" => Ok(Alg::Rs512),
            "PS256" => Ok(Alg::Ps256),
            "PS384" => Ok(Alg::Ps384),
            "PS512" => Ok(Alg::Ps512),
            "ES256" => Ok(Alg::Es256),
            "EdDSA" => Ok(Alg::EdDsa),
            _ => Err(()),
        }
    }
}
