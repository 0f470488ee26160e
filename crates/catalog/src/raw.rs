use serde_json::Value;

/// What a provider's model-list endpoint reports for one model, already
/// parsed out of whatever wire shape that provider uses.
#[derive(Debug, Clone, Default)]
pub struct RawModel {
    pub raw_id: String,
    pub supported_parameters: Vec<String>,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub context_length: Option<u32>,
    pub family: Option<String>,
    /// Provider-specific fields that don't map onto a known catalog field,
    /// preserved verbatim in `ModelCatalog::extras`.
    pub extras: Value,
    /// A `type`/`category` hint some providers attach to embedding models.
    pub category_hint: Option<String>,
    pub supports_tools: bool,
}

impl RawModel {
    fn id_or_extras_suggest_embedding(&self) -> bool {
        let id_suggests = self.raw_id.to_ascii_lowercase().contains("embed");
        let output_suggests = self.output_modalities.iter().any(|m| m.eq_ignore_ascii_case("embedding"));
        let category_suggests = self.category_hint.as_deref().is_some_and(|c| c.to_ascii_lowercase().contains("embed"));

        id_suggests || output_suggests || category_suggests
    }

    pub(crate) fn supports_embeddings(&self) -> bool {
        self.id_or_extras_suggest_embedding()
    }
}
