use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default supported-parameter list assumed for any model unless the
/// provider's sync payload narrows or extends it.
pub const DEFAULT_SUPPORTED_PARAMETERS: &[&str] = &[
    "temperature",
    "max_tokens",
    "top_p",
    "top_k",
    "frequency_penalty",
    "presence_penalty",
    "repetition_penalty",
    "stop",
    "stream",
    "n",
    "response_format",
];

/// Whether a catalog record has been touched by an operator since it was
/// last synced from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Freshly created by a sync, not yet enriched.
    Init,
    /// The sync populated rich metadata (e.g. from OpenRouter).
    Filled,
    /// An operator manually edited the record; future syncs must not touch it.
    Updated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Architecture {
    pub modality: Option<String>,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub tokenizer: Option<String>,
    pub instruct_type: Option<String>,
}

impl Default for Architecture {
    fn default() -> Self {
        Self { modality: None, input_modalities: Vec::new(), output_modalities: Vec::new(), tokenizer: None, instruct_type: None }
    }
}

/// A vendor-level capability sheet for one canonical model id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Canonical `<vendor>/<slug>` key, as produced by `model_key::normalize`.
    pub public_id: String,
    pub supported_parameters: BTreeMap<String, Value>,
    pub architecture: Architecture,
    pub supports_images: bool,
    pub supports_audio: bool,
    pub supports_video: bool,
    pub supports_reasoning: bool,
    pub supports_embeddings: bool,
    pub context_length: Option<u32>,
    pub family: Option<String>,
    pub extras: Value,
    pub status: Status,
    pub created_at: Timestamp,
}
