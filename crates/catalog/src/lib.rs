//! Model catalog service (component C): vendor-level capability sheets for
//! canonical model ids, each provider's binding to one, and the sync that
//! keeps both up to date from a provider's model-list endpoint.

mod model;
mod provider_model;
mod raw;
mod repository;
mod sync;
mod upsert;

pub use model::{Architecture, DEFAULT_SUPPORTED_PARAMETERS, ModelCatalog, Status};
pub use provider_model::{CapabilityOverrides, PriceComponent, ProviderModel};
pub use raw::RawModel;
pub use repository::{InMemoryModelCatalogRepository, InMemoryProviderModelRepository, ModelCatalogRepository, ProviderModelRepository};
pub use sync::{SyncReport, sync_models};
pub use upsert::{Error as UpsertError, upsert};
