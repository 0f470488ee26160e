//! Bearer token validation and Keycloak OAuth (component K): validates
//! `Authorization` headers against a realm's JWKS, and drives the
//! authorization-code + PKCE login flow `crates/server` exposes over HTTP.

mod authenticator;
mod endpoint;
mod error;
mod jwks;
mod oauth;
mod pkce;
mod validator;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use oauth::{KeycloakOAuthClient, TokenResponse};
pub use pkce::{PendingAuthorization, PkceStore};
pub use validator::JwtValidator;
