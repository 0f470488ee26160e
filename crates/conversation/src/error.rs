#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("conversation {0} not found")]
    NotFound(String),

    #[error("conversation {0}'s referrer is immutable once set")]
    ReferrerIsImmutable(String),

    #[error("item {0} not found")]
    ItemNotFound(String),
}
