use async_trait::async_trait;
use dashmap::DashMap;
use model_key::ProviderKind;

use crate::{Error, Provider};

/// Pagination cursor: offset/limit, the simplest form that works for both
/// the in-memory fake and a Postgres `OFFSET`/`LIMIT` query.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { offset: 0, limit: 100 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub kind: Option<ProviderKind>,
    pub active_only: bool,
}

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn insert(&self, provider: Provider) -> Result<Provider, Error>;
    async fn update(&self, provider: Provider) -> Result<Provider, Error>;
    async fn delete(&self, public_id: &str) -> Result<(), Error>;
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Provider>, Error>;
    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Option<Provider>, Error>;
    async fn find(&self, filter: &Filter, pagination: Pagination) -> Result<Vec<Provider>, Error>;
    async fn find_by_ids(&self, public_ids: &[String]) -> Result<Vec<Provider>, Error>;
}

/// `dashmap`-backed fake used by unit tests and by the in-memory worker
/// fallback when no Postgres pool is configured.
#[derive(Debug, Default)]
pub struct InMemoryProviderRepository {
    providers: DashMap<String, Provider>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn insert(&self, provider: Provider) -> Result<Provider, Error> {
        self.providers.insert(provider.public_id.clone(), provider.clone());
        Ok(provider)
    }

    async fn update(&self, provider: Provider) -> Result<Provider, Error> {
        if !self.providers.contains_key(&provider.public_id) {
            return Err(Error::NotFound(provider.public_id));
        }
        self.providers.insert(provider.public_id.clone(), provider.clone());
        Ok(provider)
    }

    async fn delete(&self, public_id: &str) -> Result<(), Error> {
        self.providers.remove(public_id).ok_or_else(|| Error::NotFound(public_id.to_string()))?;
        Ok(())
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Provider>, Error> {
        Ok(self.providers.get(public_id).map(|e| e.value().clone()))
    }

    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Option<Provider>, Error> {
        Ok(self.providers.iter().find(|e| e.value().kind == kind).map(|e| e.value().clone()))
    }

    async fn find(&self, filter: &Filter, pagination: Pagination) -> Result<Vec<Provider>, Error> {
        let mut matches: Vec<Provider> = self
            .providers
            .iter()
            .map(|e| e.value().clone())
            .filter(|p| filter.kind.is_none_or(|k| k == p.kind))
            .filter(|p| !filter.active_only || p.active)
            .collect();

        matches.sort_by(|a, b| a.public_id.cmp(&b.public_id));

        let start = pagination.offset.max(0) as usize;
        let end = start.saturating_add(pagination.limit.max(0) as usize);

        Ok(matches.into_iter().skip(start).take(end.saturating_sub(start)).collect())
    }

    async fn find_by_ids(&self, public_ids: &[String]) -> Result<Vec<Provider>, Error> {
        Ok(public_ids.iter().filter_map(|id| self.providers.get(id).map(|e| e.value().clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::provider::Category;

    fn provider(id: &str, kind: ProviderKind) -> Provider {
        Provider {
            public_id: id.to_string(),
            display_name: id.to_string(),
            kind,
            category: Category::Llm,
            endpoints: Vec::new(),
            encrypted_credential: None,
            credential_hint: None,
            metadata: BTreeMap::new(),
            active: true,
        }
    }

    #[tokio::test]
    async fn find_by_kind_returns_the_matching_provider() {
        let repo = InMemoryProviderRepository::new();
        repo.insert(provider("openai-1", ProviderKind::OpenAi)).await.unwrap();
        repo.insert(provider("anthropic-1", ProviderKind::Anthropic)).await.unwrap();

        let found = repo.find_by_kind(ProviderKind::Anthropic).await.unwrap().unwrap();
        assert_eq!(found.public_id, "anthropic-1");
    }

    #[tokio::test]
    async fn delete_removes_the_provider() {
        let repo = InMemoryProviderRepository::new();
        repo.insert(provider("openai-1", ProviderKind::OpenAi)).await.unwrap();
        repo.delete("openai-1").await.unwrap();
        assert!(repo.find_by_public_id("openai-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_on_missing_provider_fails() {
        let repo = InMemoryProviderRepository::new();
        let err = repo.update(provider("missing", ProviderKind::OpenAi)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
