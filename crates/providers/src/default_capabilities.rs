//! Per-kind default capability metadata, loaded once from an embedded YAML
//! table. A `OnceLock` gives every reader a shared, already-parsed table
//! without a lock on the hot path; if the embedded YAML somehow fails to
//! parse, hard-coded fallbacks are installed instead of panicking.

use std::collections::BTreeMap;
use std::sync::OnceLock;

const DEFAULTS_YAML: &str = include_str!("default_capabilities.yaml");

type Table = BTreeMap<String, BTreeMap<String, String>>;

static TABLE: OnceLock<Table> = OnceLock::new();

fn fallback_table() -> Table {
    let mut table = Table::new();
    table.insert("openai".to_string(), BTreeMap::from([("tool_support".to_string(), "true".to_string())]));
    table.insert("anthropic".to_string(), BTreeMap::from([("tool_support".to_string(), "true".to_string())]));
    table
}

fn load() -> Table {
    match serde_yaml::from_str::<Table>(DEFAULTS_YAML) {
        Ok(table) => table,
        Err(err) => {
            log::warn!(err:?; "failed to parse embedded default-capabilities table, using fallback");
            fallback_table()
        }
    }
}

/// Default metadata entries for a provider kind, e.g. `"openai"` or
/// `"aws-bedrock"`. Returns an empty map for unknown kinds.
pub fn defaults_for(kind: &str) -> BTreeMap<String, String> {
    TABLE.get_or_init(load).get(kind).cloned().unwrap_or_default()
}
