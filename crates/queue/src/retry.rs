/// Known phrasings providers use to reject a request that declares tools
/// when the selected model doesn't support tool calling. Matched
/// case-insensitively against the upstream error text carried on a
/// [`chat::ChatCompletionResponse::upstream_error`].
const TOOLS_UNSUPPORTED_SIGNATURES: &[&str] = &[
    "tools is not supported",
    "tool use is not supported",
    "does not support tools",
    "does not support function calling",
    "invalid parameter: 'tools'",
];

pub fn is_tools_unsupported(message: &str) -> bool {
    let lower = message.to_lowercase();
    TOOLS_UNSUPPORTED_SIGNATURES.iter().any(|signature| lower.contains(signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_signatures() {
        assert!(is_tools_unsupported("Invalid parameter: 'tools' is not supported with this model"));
        assert!(is_tools_unsupported("This model does not support function calling"));
    }

    #[test]
    fn ignores_unrelated_errors() {
        assert!(!is_tools_unsupported("rate limit exceeded"));
    }
}
