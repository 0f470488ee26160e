use std::sync::Arc;

use providers::{Category, Provider};

use crate::model::Status;
use crate::raw::RawModel;
use crate::repository::{ModelCatalogRepository, ProviderModelRepository};
use crate::{provider_model::ProviderModel, upsert};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Upsert(#[from] upsert::Error),
    #[error(transparent)]
    Repository(#[from] sqlx::Error),
}

/// Report returned to callers (typically a scheduled sync job) summarizing
/// what changed. Models whose raw id fails canonicalization are dropped and
/// counted in `skipped`, never surfaced as a hard failure — a provider's
/// listing endpoint returning one malformed entry shouldn't fail the sync.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub catalogs_upserted: usize,
    pub bindings_created: usize,
    pub bindings_existing: usize,
    pub skipped: usize,
}

/// Syncs one provider's raw model listing into the shared catalog and that
/// provider's own bindings. Catalog records already `Status::Updated` by an
/// operator are left untouched; provider-model bindings are only created
/// once and never overwritten on resync, preserving operator edits to
/// pricing, ordering, and capability overrides.
pub async fn sync_models(
    provider: &Provider,
    raw_models: &[RawModel],
    catalogs: &Arc<dyn ModelCatalogRepository>,
    bindings: &Arc<dyn ProviderModelRepository>,
    now: jiff::Timestamp,
) -> Result<SyncReport, Error> {
    let mut report = SyncReport::default();

    for raw in raw_models {
        let public_id = model_key::normalize(provider.kind, &raw.raw_id);
        if public_id.is_empty() {
            report.skipped += 1;
            continue;
        }

        let existing = catalogs.find_by_public_id(&public_id).await?;
        let catalog = match upsert::upsert(provider.kind, raw, existing, now) {
            Ok(catalog) => catalog,
            Err(_) => {
                report.skipped += 1;
                continue;
            }
        };

        let status_before = catalog.status;
        let catalog = catalogs.upsert(catalog).await?;
        if status_before != Status::Updated {
            report.catalogs_upserted += 1;
        }

        if bindings.find(&provider.public_id, &raw.raw_id).await?.is_some() {
            report.bindings_existing += 1;
            continue;
        }

        let category = if raw.supports_embeddings() { Category::Llm } else { provider.category };
        let binding = ProviderModel::new(provider.public_id.clone(), catalog.public_id.clone(), raw.raw_id.clone(), category, provider.auto_enable_new_models());

        bindings.upsert(binding).await?;
        report.bindings_created += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use model_key::ProviderKind;

    use super::*;
    use crate::repository::{InMemoryModelCatalogRepository, InMemoryProviderModelRepository};

    fn provider() -> Provider {
        Provider {
            public_id: "provider-a".to_string(),
            display_name: "Test".to_string(),
            kind: ProviderKind::OpenAi,
            category: Category::Llm,
            endpoints: Vec::new(),
            encrypted_credential: None,
            credential_hint: None,
            metadata: BTreeMap::new(),
            active: true,
        }
    }

    #[tokio::test]
    async fn first_sync_creates_catalogs_and_bindings() {
        let catalogs: Arc<dyn ModelCatalogRepository> = Arc::new(InMemoryModelCatalogRepository::new());
        let bindings: Arc<dyn ProviderModelRepository> = Arc::new(InMemoryProviderModelRepository::new());

        let raw = vec![RawModel { raw_id: "gpt-4o".to_string(), ..Default::default() }];
        let report = sync_models(&provider(), &raw, &catalogs, &bindings, jiff::Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(report.catalogs_upserted, 1);
        assert_eq!(report.bindings_created, 1);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn resync_does_not_recreate_existing_bindings() {
        let catalogs: Arc<dyn ModelCatalogRepository> = Arc::new(InMemoryModelCatalogRepository::new());
        let bindings: Arc<dyn ProviderModelRepository> = Arc::new(InMemoryProviderModelRepository::new());

        let raw = vec![RawModel { raw_id: "gpt-4o".to_string(), ..Default::default() }];
        sync_models(&provider(), &raw, &catalogs, &bindings, jiff::Timestamp::UNIX_EPOCH).await.unwrap();
        let report = sync_models(&provider(), &raw, &catalogs, &bindings, jiff::Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(report.bindings_created, 0);
        assert_eq!(report.bindings_existing, 1);
    }

    #[tokio::test]
    async fn empty_raw_id_is_skipped_not_fatal() {
        let catalogs: Arc<dyn ModelCatalogRepository> = Arc::new(InMemoryModelCatalogRepository::new());
        let bindings: Arc<dyn ProviderModelRepository> = Arc::new(InMemoryProviderModelRepository::new());

        let raw = vec![RawModel { raw_id: String::new(), ..Default::default() }];
        let report = sync_models(&provider(), &raw, &catalogs, &bindings, jiff::Timestamp::UNIX_EPOCH).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.catalogs_upserted, 0);
    }
}
