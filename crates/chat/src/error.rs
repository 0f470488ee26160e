#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model '{0}' could not be resolved to a configured provider")]
    ModelNotFound(String),

    #[error("upstream authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("upstream rejected the request: {0}")]
    InvalidRequest(String),

    #[error("upstream rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("upstream returned status {status}: {message}")]
    ProviderApiError { status: u16, message: String },

    #[error("failed to reach upstream: {0}")]
    Connection(String),

    #[error("failed to parse upstream response")]
    MalformedResponse,

    #[error(transparent)]
    Budget(#[from] budget::Error),

    #[error(transparent)]
    Conversation(#[from] conversation::Error),

    #[error(transparent)]
    Provider(#[from] providers::Error),

    #[error(transparent)]
    Catalog(#[from] sqlx::Error),
}

impl Error {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Error::AuthenticationFailed(body),
            404 => Error::ModelNotFound(body),
            429 => Error::RateLimitExceeded(body),
            400 => Error::InvalidRequest(body),
            _ => Error::ProviderApiError { status, message: body },
        }
    }
}
