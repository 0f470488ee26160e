use std::collections::BTreeMap;

/// Reads a boolean-shaped capability out of a provider's metadata map.
/// Structured capabilities are stored as JSON (`"true"`, `"false"`), but
/// legacy records may carry plain `"1"`/`"0"` strings — both must parse.
pub fn truthy(metadata: &BTreeMap<String, String>, key: &str) -> bool {
    match metadata.get(key).map(String::as_str) {
        Some("true") | Some("1") => true,
        Some(raw) => serde_json::from_str::<bool>(raw).unwrap_or(false),
        None => false,
    }
}

pub fn supports_image_input(metadata: &BTreeMap<String, String>) -> bool {
    truthy(metadata, "image_input")
}

pub fn supports_file_attachment(metadata: &BTreeMap<String, String>) -> bool {
    truthy(metadata, "file_attachment")
}

pub fn supports_tools(metadata: &BTreeMap<String, String>) -> bool {
    truthy(metadata, "tool_support")
}

pub fn auto_enable_new_models(metadata: &BTreeMap<String, String>) -> bool {
    truthy(metadata, "auto_enable_new_models")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn legacy_boolean_strings_parse() {
        assert!(truthy(&map(&[("image_input", "1")]), "image_input"));
        assert!(!truthy(&map(&[("image_input", "0")]), "image_input"));
    }

    #[test]
    fn json_boolean_strings_parse() {
        assert!(truthy(&map(&[("tool_support", "true")]), "tool_support"));
        assert!(!truthy(&map(&[("tool_support", "false")]), "tool_support"));
    }

    #[test]
    fn missing_key_is_false() {
        assert!(!truthy(&map(&[]), "image_input"));
    }
}
