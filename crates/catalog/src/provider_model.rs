use providers::Category;
use serde::{Deserialize, Serialize};

/// A single pricing line item, e.g. `{ "kind": "input_token", "price_per_million": 3.0 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceComponent {
    pub kind: String,
    pub price_per_million: f64,
}

/// Per-field overrides a provider-model binding may apply on top of its
/// catalog record's capability flags. `None` defers to the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityOverrides {
    pub supports_tools: Option<bool>,
    pub supports_images: Option<bool>,
    pub supports_reasoning: Option<bool>,
}

/// One provider's binding to a canonical model: the provider's own id for
/// it, display ordering, pricing, and any capability overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderModel {
    pub provider_id: String,
    /// `None` until the catalog sync has matched this to a `ModelCatalog`
    /// record — raw ids that fail canonicalization stay unmatched.
    pub model_catalog_id: Option<String>,
    pub model_public_id: String,
    pub provider_original_model_id: String,
    pub display_name: String,
    pub category: Category,
    pub display_order: i32,
    pub pricing: Vec<PriceComponent>,
    pub context_length_override: Option<u32>,
    pub max_output_tokens_override: Option<u32>,
    pub capability_overrides: CapabilityOverrides,
    pub active: bool,
}

impl ProviderModel {
    pub fn new(provider_id: String, model_public_id: String, provider_original_model_id: String, category: Category, auto_enable: bool) -> Self {
        let display_name = provider_original_model_id.clone();

        Self {
            provider_id,
            model_catalog_id: None,
            model_public_id,
            provider_original_model_id,
            display_name,
            category,
            display_order: 0,
            pricing: Vec::new(),
            context_length_override: None,
            max_output_tokens_override: None,
            capability_overrides: CapabilityOverrides::default(),
            active: auto_enable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_binding_defaults_inactive_unless_auto_enabled() {
        let manual = ProviderModel::new("provider-a".to_string(), "openai/gpt-4o".to_string(), "gpt-4o".to_string(), Category::Llm, false);
        let auto = ProviderModel::new("provider-a".to_string(), "openai/gpt-4o".to_string(), "gpt-4o".to_string(), Category::Llm, true);

        assert!(!manual.active);
        assert!(auto.active);
    }
}
