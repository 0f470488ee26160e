use context::Authentication;
use http::HeaderMap;

use config::AuthConfig;

use crate::error::AuthError;
use crate::validator::JwtValidator;

/// The request-scoped entry point used by `crates/server`'s middleware.
/// With no `keycloak` block configured, every request authenticates as
/// anonymous — `config::AuthConfig`'s documented dev mode.
pub struct Authenticator {
    validator: Option<JwtValidator>,
}

impl Authenticator {
    pub fn new(config: AuthConfig) -> Self {
        Self { validator: config.keycloak.map(JwtValidator::new) }
    }

    /// `Ok(Authentication::default())` (anonymous) when dev mode is active
    /// or the request carries no `Authorization` header; an error only
    /// when a header was present and failed validation.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Authentication, AuthError> {
        let Some(validator) = &self.validator else {
            return Ok(Authentication::default());
        };

        if !headers.contains_key(http::header::AUTHORIZATION) {
            return Ok(Authentication::default());
        }

        validator.authenticate(headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dev_mode_yields_anonymous_authentication() {
        let authenticator = Authenticator::new(AuthConfig::default());
        let authentication = authenticator.authenticate(&HeaderMap::new()).await.unwrap();
        assert!(authentication.bearer.is_none());
    }
}
