#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("response {0} not found")]
    NotFound(String),

    #[error("background=true requires store=true")]
    BackgroundRequiresStore,

    #[error("response {0} is not queued, a worker already claimed it or it finished")]
    NotQueued(String),

    #[error(transparent)]
    Chat(#[from] chat::Error),
}
