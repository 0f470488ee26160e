use std::sync::Arc;

use model_key::ProviderKind;
use router::Endpoint;

use crate::provider::{Category, RegisterProvider};
use crate::repository::{Filter, Pagination, ProviderRepository};
use crate::{Error, Provider, credential, default_capabilities};

pub struct Registry {
    repository: Arc<dyn ProviderRepository>,
    credential_secret: Option<String>,
}

impl Registry {
    pub fn new(repository: Arc<dyn ProviderRepository>, credential_secret: Option<String>) -> Self {
        Self { repository, credential_secret }
    }

    pub async fn register(&self, input: RegisterProvider) -> Result<Provider, Error> {
        if input.kind != ProviderKind::Custom && self.repository.find_by_kind(input.kind).await?.is_some() {
            return Err(Error::DuplicateKind(input.kind));
        }

        let endpoints = normalize_endpoints(&input.endpoint_urls)?;

        let (encrypted_credential, credential_hint) = match input.credential {
            Some(secret) => {
                let process_secret = self.credential_secret.as_deref().ok_or(Error::MissingSecret)?;
                (Some(credential::encrypt(&secret, process_secret)?), Some(credential::hint(&secret)))
            }
            None => (None, None),
        };

        let mut metadata = default_capabilities::defaults_for(crate::provider::default_capability_key(input.kind));
        metadata.extend(input.metadata);

        let provider = Provider {
            public_id: uuid::Uuid::new_v4().to_string(),
            display_name: input.display_name,
            kind: input.kind,
            category: input.category,
            endpoints,
            encrypted_credential,
            credential_hint,
            metadata,
            active: true,
        };

        self.repository.insert(provider).await
    }

    pub async fn update(&self, public_id: &str, patch: ProviderPatch) -> Result<Provider, Error> {
        let mut provider = self.repository.find_by_public_id(public_id).await?.ok_or_else(|| Error::NotFound(public_id.to_string()))?;

        if let Some(display_name) = patch.display_name {
            provider.display_name = display_name;
        }

        if let Some(endpoint_urls) = patch.endpoint_urls {
            provider.endpoints = normalize_endpoints(&endpoint_urls)?;
        }

        if let Some(metadata) = patch.metadata {
            provider.metadata.extend(metadata);
        }

        let was_active = provider.active;

        if let Some(active) = patch.active {
            provider.active = active;
        }

        let disabling = was_active && !provider.active;

        let provider = self.repository.update(provider).await?;

        if disabling {
            log::info!(provider_id = provider.public_id.as_str(); "provider deactivated, cascading disable to its provider-models");
        }

        Ok(provider)
    }

    pub async fn delete(&self, public_id: &str) -> Result<(), Error> {
        self.repository.delete(public_id).await
    }

    pub async fn find(&self, filter: &Filter, pagination: Pagination) -> Result<Vec<Provider>, Error> {
        self.repository.find(filter, pagination).await
    }

    pub async fn find_by_ids(&self, public_ids: &[String]) -> Result<Vec<Provider>, Error> {
        self.repository.find_by_ids(public_ids).await
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Provider>, Error> {
        self.repository.find_by_public_id(public_id).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderPatch {
    pub display_name: Option<String>,
    pub endpoint_urls: Option<Vec<String>>,
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
    pub active: Option<bool>,
}

fn normalize_endpoints(urls: &[String]) -> Result<Vec<Endpoint>, Error> {
    urls.iter()
        .map(|raw| {
            let parsed = url::Url::parse(raw).map_err(|_| Error::InvalidEndpoint(raw.clone()))?;

            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(Error::InvalidEndpoint(raw.clone()));
            }

            let trimmed = parsed.as_str().trim_end_matches('/').to_string();
            Ok(Endpoint { url: trimmed, weight: 1, healthy: true })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::repository::InMemoryProviderRepository;

    fn registry() -> Registry {
        Registry::new(Arc::new(InMemoryProviderRepository::new()), Some("test-secret".to_string()))
    }

    fn register_input(kind: ProviderKind) -> RegisterProvider {
        RegisterProvider {
            display_name: "Test".to_string(),
            kind,
            category: Category::Llm,
            endpoint_urls: vec!["https://api.example.com/v1/".to_string()],
            credential: Some(SecretString::from("sk-test".to_string())),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn register_trims_trailing_slash_and_encrypts_credential() {
        let registry = registry();
        let provider = registry.register(register_input(ProviderKind::OpenAi)).await.unwrap();

        assert_eq!(provider.legacy_base_url(), Some("https://api.example.com/v1"));
        assert!(provider.encrypted_credential.is_some());
        assert_eq!(provider.credential_hint.as_deref(), Some("test"));
        assert!(provider.supports_tools());
    }

    #[tokio::test]
    async fn register_rejects_second_non_custom_provider_of_same_kind() {
        let registry = registry();
        registry.register(register_input(ProviderKind::OpenAi)).await.unwrap();

        let err = registry.register(register_input(ProviderKind::OpenAi)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateKind(ProviderKind::OpenAi)));
    }

    #[tokio::test]
    async fn register_allows_multiple_custom_providers() {
        let registry = registry();
        registry.register(register_input(ProviderKind::Custom)).await.unwrap();
        registry.register(register_input(ProviderKind::Custom)).await.unwrap();
    }

    #[tokio::test]
    async fn register_without_secret_configured_fails_when_credential_given() {
        let registry = Registry::new(Arc::new(InMemoryProviderRepository::new()), None);
        let err = registry.register(register_input(ProviderKind::OpenAi)).await.unwrap_err();
        assert!(matches!(err, Error::MissingSecret));
    }

    #[tokio::test]
    async fn update_deactivating_a_provider_succeeds() {
        let registry = registry();
        let provider = registry.register(register_input(ProviderKind::OpenAi)).await.unwrap();

        let updated = registry
            .update(&provider.public_id, ProviderPatch { active: Some(false), ..Default::default() })
            .await
            .unwrap();

        assert!(!updated.active);
    }

    #[tokio::test]
    async fn invalid_endpoint_scheme_is_rejected() {
        let registry = registry();
        let mut input = register_input(ProviderKind::OpenAi);
        input.endpoint_urls = vec!["ftp://example.com".to_string()];

        let err = registry.register(input).await.unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn credential_round_trips_via_stored_bytes() {
        let secret = SecretString::from("sk-abc".to_string());
        let stored = crate::credential::encrypt(&secret, "test-secret").unwrap();
        let recovered = crate::credential::decrypt(&stored, "test-secret").unwrap();
        assert_eq!(recovered.expose_secret(), "sk-abc");
    }
}
