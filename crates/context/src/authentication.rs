use std::collections::HashMap;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of validating the `Authorization` header on an inbound request.
#[derive(Default, Clone, Debug)]
pub struct Authentication {
    pub bearer: Option<BearerToken>,
}

impl Authentication {
    /// The subject claim of the validated token, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.bearer.as_ref().and_then(|b| b.token.claims().custom.subject.as_deref())
    }
}

/// A bearer token that has already passed signature and expiry verification.
#[derive(Clone, Debug)]
pub struct BearerToken {
    pub raw: SecretString,
    pub token: jwt_compact::Token<Claims>,
}

impl std::ops::Deref for BearerToken {
    type Target = jwt_compact::Token<Claims>;
    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

/// Claims carried by tokens issued by the platform's identity provider
/// (Keycloak realm tokens, in the default deployment).
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, rename = "iss")]
    pub issuer: Option<String>,

    #[serde_as(deserialize_as = "Option<serde_with::OneOrMany<_>>")]
    #[serde(default, rename = "aud")]
    pub audience: Option<Vec<String>>,

    #[serde(default, rename = "sub")]
    pub subject: Option<String>,

    #[serde(default, rename = "email")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Claims {
    /// Extract a claim value by path, supporting nested lookups into
    /// `additional` (e.g. `"realm_access.roles"` picks the first entry).
    pub fn get_claim(&self, path: &str) -> Option<String> {
        match path {
            "iss" => return self.issuer.clone(),
            "sub" => return self.subject.clone(),
            "email" => return self.email.clone(),
            "aud" => return self.audience.as_ref().and_then(|audiences| audiences.first().cloned()),
            _ => {}
        }

        let mut parts = path.split('.');
        let first = parts.next()?;
        let current = parts.fold(self.additional.get(first).unwrap_or(&Value::Null), |current, part| {
            current.get(part).unwrap_or(&Value::Null)
        });

        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(items) => items.first().and_then(|v| v.as_str()).map(str::to_owned),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_claim_prefers_standard_fields() {
        let claims = Claims {
            issuer: Some("https://issuer.example".into()),
            audience: None,
            subject: Some("user-1".into()),
            email: Some("user@example.com".into()),
            additional: HashMap::new(),
        };

        assert_eq!(claims.get_claim("sub").as_deref(), Some("user-1"));
        assert_eq!(claims.get_claim("email").as_deref(), Some("user@example.com"));
    }

    #[test]
    fn get_claim_walks_nested_additional_paths() {
        let mut additional = HashMap::new();
        additional.insert("realm_access".to_string(), serde_json::json!({ "roles": ["admin", "user"] }));

        let claims = Claims { issuer: None, audience: None, subject: None, email: None, additional };

        assert_eq!(claims.get_claim("realm_access.roles").as_deref(), Some("admin"));
        assert_eq!(claims.get_claim("missing.path"), None);
    }
}
