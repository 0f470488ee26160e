//! Request-scoped identity types shared across the gateway: the validated
//! bearer token and its claims, the resolved principal, and the ambient
//! [`RequestContext`] threaded through the chat pipeline and MCP gateway.

mod authentication;
mod principal;
mod request;

pub use authentication::{Authentication, BearerToken, Claims};
pub use principal::Principal;
pub use request::RequestContext;
