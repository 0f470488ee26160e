use serde::Deserialize;

/// Defaults for the token budget engine (component E), used when a model's
/// catalog entry doesn't specify its own context window or output cap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    pub default_context_window: u32,
    pub default_max_output_tokens: u32,
    /// Flat token cost charged per image content part during estimation.
    pub image_token_cost: u32,
    /// Fraction of the context window reserved for the model's reply before
    /// history trimming kicks in.
    pub reply_reservation_ratio: f32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            default_context_window: 128_000,
            default_max_output_tokens: 4_096,
            image_token_cost: 765,
            reply_reservation_ratio: 0.25,
        }
    }
}
