use async_trait::async_trait;
use dashmap::DashMap;

use crate::model::ModelCatalog;
use crate::provider_model::ProviderModel;

#[async_trait]
pub trait ModelCatalogRepository: Send + Sync {
    async fn upsert(&self, catalog: ModelCatalog) -> Result<ModelCatalog, sqlx::Error>;
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<ModelCatalog>, sqlx::Error>;
    async fn find_by_public_ids(&self, public_ids: &[String]) -> Result<Vec<ModelCatalog>, sqlx::Error>;
    async fn list(&self) -> Result<Vec<ModelCatalog>, sqlx::Error>;
}

#[async_trait]
pub trait ProviderModelRepository: Send + Sync {
    async fn upsert(&self, binding: ProviderModel) -> Result<ProviderModel, sqlx::Error>;
    async fn find(&self, provider_id: &str, provider_original_model_id: &str) -> Result<Option<ProviderModel>, sqlx::Error>;
    async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<ProviderModel>, sqlx::Error>;
}

#[derive(Default)]
pub struct InMemoryModelCatalogRepository {
    records: DashMap<String, ModelCatalog>,
}

impl InMemoryModelCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelCatalogRepository for InMemoryModelCatalogRepository {
    async fn upsert(&self, catalog: ModelCatalog) -> Result<ModelCatalog, sqlx::Error> {
        self.records.insert(catalog.public_id.clone(), catalog.clone());
        Ok(catalog)
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<ModelCatalog>, sqlx::Error> {
        Ok(self.records.get(public_id).map(|entry| entry.clone()))
    }

    async fn find_by_public_ids(&self, public_ids: &[String]) -> Result<Vec<ModelCatalog>, sqlx::Error> {
        Ok(public_ids.iter().filter_map(|id| self.records.get(id).map(|entry| entry.clone())).collect())
    }

    async fn list(&self) -> Result<Vec<ModelCatalog>, sqlx::Error> {
        Ok(self.records.iter().map(|entry| entry.value().clone()).collect())
    }
}

#[derive(Default)]
pub struct InMemoryProviderModelRepository {
    bindings: DashMap<(String, String), ProviderModel>,
}

impl InMemoryProviderModelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderModelRepository for InMemoryProviderModelRepository {
    async fn upsert(&self, binding: ProviderModel) -> Result<ProviderModel, sqlx::Error> {
        let key = (binding.provider_id.clone(), binding.provider_original_model_id.clone());
        self.bindings.insert(key, binding.clone());
        Ok(binding)
    }

    async fn find(&self, provider_id: &str, provider_original_model_id: &str) -> Result<Option<ProviderModel>, sqlx::Error> {
        Ok(self.bindings.get(&(provider_id.to_string(), provider_original_model_id.to_string())).map(|entry| entry.clone()))
    }

    async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<ProviderModel>, sqlx::Error> {
        Ok(self.bindings.iter().filter(|entry| entry.key().0 == provider_id).map(|entry| entry.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Architecture, Status};
    use crate::provider_model::ProviderModel;

    fn catalog(public_id: &str) -> ModelCatalog {
        ModelCatalog {
            public_id: public_id.to_string(),
            supported_parameters: Default::default(),
            architecture: Architecture::default(),
            supports_images: false,
            supports_audio: false,
            supports_video: false,
            supports_reasoning: false,
            supports_embeddings: false,
            context_length: None,
            family: None,
            extras: serde_json::Value::Null,
            status: Status::Init,
            created_at: jiff::Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn upsert_then_find_by_public_id_round_trips() {
        let repo = InMemoryModelCatalogRepository::new();
        repo.upsert(catalog("openai/gpt-4o")).await.unwrap();

        let found = repo.find_by_public_id("openai/gpt-4o").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn find_by_public_ids_skips_unknown_ids() {
        let repo = InMemoryModelCatalogRepository::new();
        repo.upsert(catalog("openai/gpt-4o")).await.unwrap();

        let found = repo.find_by_public_ids(&["openai/gpt-4o".to_string(), "openai/missing".to_string()]).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn provider_model_bindings_are_keyed_by_provider_and_original_id() {
        let repo = InMemoryProviderModelRepository::new();
        let binding = ProviderModel::new(
            "provider-a".to_string(),
            "openai/gpt-4o".to_string(),
            "gpt-4o".to_string(),
            providers::Category::Llm,
            true,
        );
        repo.upsert(binding).await.unwrap();

        let found = repo.find("provider-a", "gpt-4o").await.unwrap();
        assert!(found.is_some());

        let listed = repo.list_for_provider("provider-a").await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
