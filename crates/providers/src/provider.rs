use std::collections::BTreeMap;

use model_key::ProviderKind;
use router::Endpoint;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Whether a provider serves chat/completion traffic or image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Llm,
    Image,
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub public_id: String,
    pub display_name: String,
    pub kind: ProviderKind,
    pub category: Category,
    pub endpoints: Vec<Endpoint>,
    /// AEAD-encrypted credential, `None` for providers that need none
    /// (local Ollama, etc.).
    pub encrypted_credential: Option<Vec<u8>>,
    pub credential_hint: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub active: bool,
}

impl Provider {
    /// The first endpoint, mirrored for callers that only know about a
    /// single `base_url` rather than the ordered endpoint list.
    pub fn legacy_base_url(&self) -> Option<&str> {
        self.endpoints.first().map(|e| e.url.as_str())
    }

    pub fn supports_image_input(&self) -> bool {
        crate::capability::supports_image_input(&self.metadata)
    }

    pub fn supports_file_attachment(&self) -> bool {
        crate::capability::supports_file_attachment(&self.metadata)
    }

    pub fn supports_tools(&self) -> bool {
        crate::capability::supports_tools(&self.metadata)
    }

    pub fn auto_enable_new_models(&self) -> bool {
        crate::capability::auto_enable_new_models(&self.metadata)
    }
}

/// Input to [`crate::Registry::register`]; credentials arrive as plaintext
/// and are encrypted before the [`Provider`] record is constructed.
#[derive(Debug, Clone)]
pub struct RegisterProvider {
    pub display_name: String,
    pub kind: ProviderKind,
    pub category: Category,
    pub endpoint_urls: Vec<String>,
    pub credential: Option<SecretString>,
    pub metadata: BTreeMap<String, String>,
}

/// The YAML default-capabilities table key for a kind. `Custom` has no
/// canonical lookup key of its own in [`ProviderKind`], so it's mapped here
/// rather than pushed into that crate, which shouldn't know about our
/// metadata-key conventions.
pub fn default_capability_key(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "openai",
        ProviderKind::AzureOpenAi => "azure-openai",
        ProviderKind::Anthropic => "anthropic",
        ProviderKind::Google => "google",
        ProviderKind::AwsBedrock => "aws-bedrock",
        ProviderKind::Mistral => "mistral",
        ProviderKind::Groq => "groq",
        ProviderKind::Cohere => "cohere",
        ProviderKind::Ollama => "ollama",
        ProviderKind::OpenRouter => "openrouter",
        _ => "custom",
    }
}
