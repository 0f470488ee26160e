use fastrace::{Span, collector::SpanContext};
use http::HeaderMap;
use secrecy::SecretString;

use crate::Principal;

/// Header name for user-provided API keys (BYOK - Bring Your Own Key).
const PROVIDER_API_KEY_HEADER: &str = "X-Provider-API-Key";

/// Per-request ambient data threaded through the chat pipeline, MCP gateway
/// and background orchestrator: the resolved principal, any BYOK override,
/// the inbound headers, and the span to attach child spans to.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// User-provided API key that overrides the configured provider key.
    pub api_key_override: Option<SecretString>,

    /// The authenticated principal, `None` for anonymous/dev-mode requests.
    pub principal: Option<Principal>,

    pub headers: HeaderMap,

    pub span_context: Option<SpanContext>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, principal: Option<Principal>, span_context: Option<SpanContext>) -> Self {
        let api_key_override = headers
            .get(PROVIDER_API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|key| SecretString::from(key.to_string()));

        Self { api_key_override, principal, headers: headers.clone(), span_context }
    }

    /// Opens a child span under this request's trace if one was propagated,
    /// otherwise starts a fresh root.
    pub fn new_span(&self, name: &'static str) -> Span {
        match self.span_context {
            Some(parent) => Span::root(name, parent),
            None => Span::root(name, SpanContext::random()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.user_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byok_header_is_extracted_as_override() {
        let mut headers = HeaderMap::new();
        headers.insert(PROVIDER_API_KEY_HEADER, "sk-user-provided".parse().unwrap());

        let ctx = RequestContext::from_headers(&headers, None, None);
        assert!(ctx.api_key_override.is_some());
    }

    #[test]
    fn missing_principal_yields_no_user_id() {
        let ctx = RequestContext::from_headers(&HeaderMap::new(), None, None);
        assert_eq!(ctx.user_id(), None);
    }
}
