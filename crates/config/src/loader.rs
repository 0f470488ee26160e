use std::path::Path;

use anyhow::bail;
use indoc::indoc;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use toml::Value;

use crate::Config;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let mut raw: Value = toml::from_str(&content)?;

    expand_env_placeholders(&mut Vec::new(), &mut raw)?;

    let config = Config::deserialize(raw)?;
    validate_has_downstreams(&config)?;

    Ok(config)
}

/// Walks the parsed TOML tree substituting `{{ env.VAR }}` placeholders with
/// the corresponding environment variable, failing loudly rather than
/// leaving a literal placeholder in a secret field.
fn expand_env_placeholders(path: &mut Vec<String>, value: &mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => {
            if let Some(captures) = ENV_PLACEHOLDER.captures(s) {
                let var = &captures[1];
                let resolved = std::env::var(var)
                    .map_err(|err| crate::Error::EnvVarSubstitution { path: path.join("."), reason: err.to_string() })?;
                *s = ENV_PLACEHOLDER.replace(s, resolved.as_str()).into_owned();
            }
        }
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(i.to_string());
                expand_env_placeholders(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map.iter_mut() {
                path.push(key.clone());
                expand_env_placeholders(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

fn validate_has_downstreams(config: &Config) -> anyhow::Result<()> {
    if config.providers.bootstrap.is_empty() && config.mcp.servers.is_empty() {
        bail!(indoc! {r#"
            No providers or MCP servers configured. The gateway requires at least one
            bootstrap provider or one MCP server to function.

            Example:

              [providers.bootstrap.openai]
              kind = "openai"

              [[providers.bootstrap.openai.endpoints]]
              base_url = "https://api.openai.com/v1"
              api_key = "{{ env.OPENAI_API_KEY }}"
        "#});
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn env_placeholder_is_substituted() {
        temp_env::with_var("GATEWAY_TEST_KEY", Some("sk-secret"), || {
            let mut value: Value = toml::from_str(r#"api_key = "{{ env.GATEWAY_TEST_KEY }}""#).unwrap();
            expand_env_placeholders(&mut Vec::new(), &mut value).unwrap();

            assert_eq!(value.get("api_key").unwrap().as_str(), Some("sk-secret"));
        });
    }

    #[test]
    fn missing_env_var_fails_loudly() {
        let mut value: Value = toml::from_str(r#"api_key = "{{ env.GATEWAY_DOES_NOT_EXIST }}""#).unwrap();
        assert!(expand_env_placeholders(&mut Vec::new(), &mut value).is_err());
    }

    #[test]
    fn load_rejects_empty_configuration() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(err.to_string().contains("No providers or MCP servers configured"));
    }
}
