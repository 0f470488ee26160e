//! Provider seeding. Only a provider's own record (endpoints, credential,
//! category, kind) is bootstrapped from config — its catalog bindings
//! (which canonical models it serves) are populated out-of-band, since
//! this gateway exposes no admin/registration HTTP surface to drive a
//! fetch-models sync. See DESIGN.md for that gap.

use config::ProvidersConfig;
use model_key::ProviderKind;
use providers::{Category, RegisterProvider, Registry};

pub async fn seed_providers(registry: &Registry, config: &ProvidersConfig) {
    for (name, bootstrap) in &config.bootstrap {
        if !bootstrap.enabled {
            continue;
        }

        let Some(kind) = parse_provider_kind(&bootstrap.kind) else {
            log::warn!(provider = name.as_str(), kind = bootstrap.kind.as_str(); "skipping bootstrap provider with an unrecognized kind");
            continue;
        };

        let endpoint_urls = bootstrap.endpoints.iter().filter(|endpoint| endpoint.enabled).map(|endpoint| endpoint.base_url.to_string()).collect();

        let credential = bootstrap.endpoints.iter().find_map(|endpoint| endpoint.api_key.clone());

        let input = RegisterProvider {
            display_name: name.clone(),
            kind,
            category: Category::Llm,
            endpoint_urls,
            credential,
            metadata: Default::default(),
        };

        match registry.register(input).await {
            Ok(provider) => log::info!(provider_id = provider.public_id.as_str(), name = name.as_str(); "registered bootstrap provider"),
            Err(err) => log::warn!(err:?, name = name.as_str(); "failed to register bootstrap provider"),
        }
    }
}

/// `config::BootstrapProviderConfig::kind` is a plain string rather than a
/// typed enum, so the mapping back to [`ProviderKind`] lives here instead
/// of in `model-key`, which has no notion of TOML bootstrap config.
fn parse_provider_kind(kind: &str) -> Option<ProviderKind> {
    let kind = match kind {
        "openai" => ProviderKind::OpenAi,
        "azure-openai" => ProviderKind::AzureOpenAi,
        "anthropic" => ProviderKind::Anthropic,
        "google" => ProviderKind::Google,
        "aws-bedrock" => ProviderKind::AwsBedrock,
        "mistral" => ProviderKind::Mistral,
        "groq" => ProviderKind::Groq,
        "cohere" => ProviderKind::Cohere,
        "perplexity" => ProviderKind::Perplexity,
        "fireworks" => ProviderKind::Fireworks,
        "cerebras" => ProviderKind::Cerebras,
        "xai" => ProviderKind::XAi,
        "deepseek" => ProviderKind::DeepSeek,
        "ollama" => ProviderKind::Ollama,
        "openrouter" => ProviderKind::OpenRouter,
        "together" => ProviderKind::Together,
        "deepinfra" => ProviderKind::DeepInfra,
        "replicate" => ProviderKind::Replicate,
        "huggingface" => ProviderKind::HuggingFace,
        "vercel-ai" => ProviderKind::VercelAi,
        "jan" => ProviderKind::Jan,
        "custom" => ProviderKind::Custom,
        _ => return None,
    };

    Some(kind)
}
