//! Provider registry (component B): providers, their endpoints, encrypted
//! credentials, and capability metadata.

mod capability;
mod credential;
mod default_capabilities;
mod error;
mod postgres;
mod provider;
mod registry;
mod repository;

pub use capability::{auto_enable_new_models, supports_file_attachment, supports_image_input, supports_tools};
pub use credential::{decrypt as decrypt_credential, encrypt as encrypt_credential, hint as credential_hint};
pub use error::Error;
pub use postgres::PostgresProviderRepository;
pub use provider::{Category, Provider, RegisterProvider, default_capability_key};
pub use registry::{ProviderPatch, Registry};
pub use repository::{Filter, InMemoryProviderRepository, Pagination, ProviderRepository};
