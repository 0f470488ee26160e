#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("internal auth error")]
    Internal,

    #[error("unknown or expired authorization request")]
    UnknownState,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),
}
