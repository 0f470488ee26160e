use std::collections::BTreeMap;

use model_key::ProviderKind;
use serde_json::Value;

use crate::model::{Architecture, DEFAULT_SUPPORTED_PARAMETERS, ModelCatalog, Status};
use crate::raw::RawModel;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model-key canonicalization of {0:?} produced an empty public id")]
    EmptyPublicId(String),
}

/// Builds (or refreshes) a [`ModelCatalog`] record from a provider's raw
/// model listing. `existing` is the previously-stored record for this
/// public id, if any — syncs must leave `Status::Updated` records alone.
pub fn upsert(kind: ProviderKind, raw: &RawModel, existing: Option<ModelCatalog>, now: jiff::Timestamp) -> Result<ModelCatalog, Error> {
    let public_id = model_key::normalize(kind, &raw.raw_id);

    if public_id.is_empty() {
        return Err(Error::EmptyPublicId(raw.raw_id.clone()));
    }

    if let Some(existing) = &existing
        && existing.status == Status::Updated
    {
        return Ok(existing.clone());
    }

    let mut supported_parameters: BTreeMap<String, Value> = DEFAULT_SUPPORTED_PARAMETERS
        .iter()
        .map(|name| ((*name).to_string(), default_value_for(name)))
        .collect();

    for name in &raw.supported_parameters {
        supported_parameters.entry(name.clone()).or_insert_with(|| default_value_for(name));
    }

    if !raw.supports_tools {
        supported_parameters.remove("tools");
        supported_parameters.remove("tool_choice");
    }

    if !supported_parameters.contains_key("top_p") {
        supported_parameters.insert("top_p".to_string(), Value::from(1.0));
    }

    if !supported_parameters.contains_key("temperature") {
        supported_parameters.insert("temperature".to_string(), Value::from(0.7));
    }

    let supports_reasoning = supported_parameters.contains_key("include_reasoning");
    let supports_embeddings = raw.supports_embeddings();

    let architecture = Architecture {
        modality: None,
        input_modalities: raw.input_modalities.clone(),
        output_modalities: raw.output_modalities.clone(),
        tokenizer: None,
        instruct_type: None,
    };

    let supports_images = raw.input_modalities.iter().any(|m| m.eq_ignore_ascii_case("image"));
    let supports_audio = raw.input_modalities.iter().any(|m| m.eq_ignore_ascii_case("audio"))
        || raw.output_modalities.iter().any(|m| m.eq_ignore_ascii_case("audio"));
    let supports_video = raw.input_modalities.iter().any(|m| m.eq_ignore_ascii_case("video"))
        || raw.output_modalities.iter().any(|m| m.eq_ignore_ascii_case("video"));

    let status = if kind == ProviderKind::OpenRouter { Status::Filled } else { Status::Init };

    Ok(ModelCatalog {
        public_id,
        supported_parameters,
        architecture,
        supports_images,
        supports_audio,
        supports_video,
        supports_reasoning,
        supports_embeddings,
        context_length: raw.context_length,
        family: raw.family.clone(),
        extras: raw.extras.clone(),
        status,
        created_at: existing.map(|e| e.created_at).unwrap_or(now),
    })
}

fn default_value_for(name: &str) -> Value {
    match name {
        "top_p" => Value::from(1.0),
        "temperature" => Value::from(0.7),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawModel {
        RawModel { raw_id: id.to_string(), ..Default::default() }
    }

    #[test]
    fn empty_raw_id_fails() {
        let err = upsert(ProviderKind::OpenAi, &raw(""), None, jiff::Timestamp::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, Error::EmptyPublicId(_)));
    }

    #[test]
    fn fills_in_default_top_p_and_temperature() {
        let catalog = upsert(ProviderKind::OpenAi, &raw("gpt-4o"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        assert_eq!(catalog.supported_parameters.get("top_p"), Some(&Value::from(1.0)));
        assert_eq!(catalog.supported_parameters.get("temperature"), Some(&Value::from(0.7)));
    }

    #[test]
    fn openrouter_models_start_filled_others_start_init() {
        let openrouter = upsert(ProviderKind::OpenRouter, &raw("anthropic/claude-3-opus"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        let openai = upsert(ProviderKind::OpenAi, &raw("gpt-4o"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();

        assert_eq!(openrouter.status, Status::Filled);
        assert_eq!(openai.status, Status::Init);
    }

    #[test]
    fn updated_status_is_left_untouched_by_a_sync() {
        let original = upsert(ProviderKind::OpenAi, &raw("gpt-4o"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        let mut manually_edited = original.clone();
        manually_edited.status = Status::Updated;
        manually_edited.family = Some("operator-set-family".to_string());

        let resynced = upsert(ProviderKind::OpenAi, &raw("gpt-4o"), Some(manually_edited.clone()), jiff::Timestamp::UNIX_EPOCH).unwrap();

        assert_eq!(resynced.family.as_deref(), Some("operator-set-family"));
    }

    #[test]
    fn embedding_models_are_flagged_via_id_hint() {
        let catalog = upsert(ProviderKind::OpenAi, &raw("text-embedding-3-large"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        assert!(catalog.supports_embeddings);
    }

    #[test]
    fn image_input_modality_flags_supports_images() {
        let mut input = raw("gpt-4o");
        input.input_modalities = vec!["text".to_string(), "image".to_string()];

        let catalog = upsert(ProviderKind::OpenAi, &input, None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        assert!(catalog.supports_images);
    }

    #[test]
    fn tools_unsupported_strips_tool_parameters() {
        let catalog = upsert(ProviderKind::Ollama, &raw("llama3"), None, jiff::Timestamp::UNIX_EPOCH).unwrap();
        assert!(!catalog.supported_parameters.contains_key("tools"));
        assert!(!catalog.supported_parameters.contains_key("tool_choice"));
    }
}
