#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("method {0} is not permitted")]
    MethodNotAllowed(String),

    #[error("tool {0} not found")]
    ToolNotFound(String),

    #[error("tool {0} requires approved=true")]
    ApprovalRequired(String),

    #[error("downstream MCP server call failed: {0}")]
    Downstream(String),

    #[error(transparent)]
    Conversation(#[from] conversation::Error),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl Error {
    /// JSON-RPC error code, following the reserved ranges the protocol
    /// defines (`-32601` method not found, `-32602` invalid params).
    pub fn rpc_code(&self) -> i64 {
        match self {
            Error::MethodNotAllowed(_) => -32601,
            Error::ToolNotFound(_) => -32602,
            Error::InvalidArguments(_) => -32602,
            Error::ApprovalRequired(_) => -32000,
            Error::Downstream(_) => -32001,
            Error::Conversation(_) => -32002,
        }
    }
}
