#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a provider of kind {0:?} is already registered")]
    DuplicateKind(model_key::ProviderKind),
    #[error("provider {0} not found")]
    NotFound(String),
    #[error("the process-wide credential secret is not configured")]
    MissingSecret,
    #[error("credential could not be decrypted: {0}")]
    CredentialDecryption(String),
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Repository(#[from] sqlx::Error),
}
