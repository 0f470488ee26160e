/// The authenticated principal a request is running as, resolved once from
/// the bearer token and threaded through conversation ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable subject identifier, used as the owner column on conversations.
    pub user_id: String,
    pub email: Option<String>,
}
