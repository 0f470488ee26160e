//! Canonical model-key resolution.
//!
//! Every provider speaks about models in its own dialect: Bedrock embeds a
//! version after a colon, Ollama separates family and tag with a colon,
//! aggregators prefix the model with an owner that may or may not be a real
//! vendor. [`normalize`] turns all of that into one stable `<vendor>/<slug>`
//! string used everywhere else in the gateway as the canonical model key.
//!
//! The function is pure: no I/O, no panics, deterministic for a given
//! `(kind, raw)` pair.

mod slug;
mod vendor;

pub use vendor::ProviderKind;

use slug::slugify;
use vendor::{aggregator_display_name, canonical_vendor, infer_family_vendor};

/// Normalizes a raw vendor/model string reported by a provider into the
/// canonical `<vendor>/<slug>` key.
///
/// Empty input produces an empty string; the function never panics.
pub fn normalize(kind: ProviderKind, raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return String::new();
    }

    enforce_single_slash(normalize_inner(kind, raw))
}

/// Guarantees the testable-property invariant that a non-empty canonical key
/// contains exactly one `/`, regardless of how much slash-bearing noise
/// survived slugification of the model half.
fn enforce_single_slash(key: String) -> String {
    let Some(idx) = key.find('/') else {
        return key;
    };

    let (vendor, rest) = key.split_at(idx);
    let rest = &rest[1..];

    format!("{vendor}/{}", rest.replace('/', "-"))
}

fn normalize_inner(kind: ProviderKind, raw: &str) -> String {
    if let Some(key) = already_canonical(raw) {
        return key;
    }

    if let Some(key) = explicit_vendor_prefix(raw) {
        return key;
    }

    if let Some(rest) = raw.strip_prefix("models/") {
        return format!("google/{}", slugify(rest));
    }

    if kind == ProviderKind::AwsBedrock
        && let Some(key) = bedrock_key(raw)
    {
        return key;
    }

    if kind.is_aggregator()
        && let Some(key) = aggregator_key(kind, raw)
    {
        return key;
    }

    if kind == ProviderKind::Ollama
        && let Some((family, tag)) = raw.split_once(':')
        && !family.is_empty()
        && !tag.is_empty()
    {
        let vendor = infer_family_vendor(family).unwrap_or("ollama");
        let slug = slugify(&format!("{family}-{tag}"));
        return format!("{vendor}/{slug}");
    }

    if let Some(vendor) = kind.default_vendor() {
        return format!("{vendor}/{}", slugify(raw));
    }

    let vendor = infer_family_vendor(raw).unwrap_or_else(|| aggregator_display_name(kind).unwrap_or("custom"));

    format!("{vendor}/{}", slugify(raw))
}

/// Rule 0: a string that is already a clean canonical key (owner segment is
/// exactly a known vendor's own canonical spelling, model segment has no
/// further `:`/`/` structure to interpret) is returned unchanged. Without
/// this, re-normalizing an already-canonical key under a kind whose other
/// rules don't recognize that shape (e.g. feeding a Bedrock-derived key back
/// through the Bedrock branch, which expects a `.` it no longer has) would
/// fall through to family inference and re-prefix the vendor, breaking
/// idempotency.
fn already_canonical(raw: &str) -> Option<String> {
    let (owner, rest) = raw.split_once('/')?;

    if rest.is_empty() || rest.contains('/') || rest.contains(':') {
        return None;
    }

    let vendor = canonical_vendor(owner).filter(|&v| v == owner)?;

    Some(format!("{vendor}/{}", slugify(rest)))
}

/// Rule 1: an explicit `"vendor:model"` string where `vendor` is a known
/// vendor word. This takes priority over every other rule, including
/// Ollama's `family:tag` shorthand, because a known vendor name is never a
/// plausible Ollama model family.
fn explicit_vendor_prefix(raw: &str) -> Option<String> {
    let (maybe_vendor, rest) = raw.split_once(':')?;

    if rest.is_empty() {
        return None;
    }

    let vendor = canonical_vendor(maybe_vendor)?;

    Some(format!("{vendor}/{}", slugify(rest)))
}

/// Rule 3: Bedrock's `<vendor>.<model>[:<version>]` convention. The version
/// suffix (after the last `:`) is dropped; everything before it is kept as
/// part of the model slug, which is how `...-v1:0` becomes `...-v1`.
fn bedrock_key(raw: &str) -> Option<String> {
    let (vendor_part, rest) = raw.split_once('.')?;

    if rest.is_empty() {
        return None;
    }

    let model_part = match rest.rsplit_once(':') {
        Some((model, _version)) => model,
        None => rest,
    };

    let vendor = canonical_vendor(vendor_part).unwrap_or(vendor_part);

    Some(format!("{vendor}/{}", slugify(model_part)))
}

/// Rule 4: aggregator `"owner/model[:version]"`. When `owner` is a known
/// vendor word we keep it as the vendor; otherwise we substitute the
/// aggregator's own display name. The version becomes a trailing
/// `-<version>` on the slug rather than staying a separate segment.
fn aggregator_key(kind: ProviderKind, raw: &str) -> Option<String> {
    let (owner, rest) = raw.split_once('/')?;

    if owner.is_empty() || rest.is_empty() {
        return None;
    }

    let (model_part, version) = match rest.rsplit_once(':') {
        Some((model, version)) => (model, Some(version)),
        None => (rest, None),
    };

    let slug = match version {
        Some(version) => slugify(&format!("{model_part}-{version}")),
        None => slugify(model_part),
    };

    let vendor = canonical_vendor(owner).unwrap_or_else(|| aggregator_display_name(kind).unwrap_or("custom"));

    Some(format!("{vendor}/{slug}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(normalize(ProviderKind::OpenAi, ""), "");
        assert_eq!(normalize(ProviderKind::OpenAi, "   "), "");
    }

    #[test]
    fn scenario_s1_bedrock_drops_version_suffix() {
        let key = normalize(ProviderKind::AwsBedrock, "anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(key, "anthropic/claude-3-5-sonnet-20240620-v1");
    }

    #[test]
    fn scenario_s2_ollama_family_tag() {
        assert_eq!(normalize(ProviderKind::Ollama, "qwen2:7b"), "qwen/qwen2-7b");
    }

    #[test]
    fn explicit_vendor_colon_model() {
        assert_eq!(normalize(ProviderKind::Custom, "openai:gpt-4o"), "openai/gpt-4o");
    }

    #[test]
    fn google_models_prefix() {
        assert_eq!(normalize(ProviderKind::Google, "models/gemini-1.5-pro"), "google/gemini-1.5-pro");
    }

    #[test]
    fn aggregator_with_known_owner_keeps_owner() {
        let key = normalize(ProviderKind::OpenRouter, "anthropic/claude-3-opus:beta");
        assert_eq!(key, "anthropic/claude-3-opus-beta");
    }

    #[test]
    fn aggregator_with_unknown_owner_substitutes_display_name() {
        let key = normalize(ProviderKind::OpenRouter, "teknium/openhermes-2.5-mistral-7b");
        assert_eq!(key, "openrouter/openhermes-2.5-mistral-7b");
    }

    #[test]
    fn huggingface_owner_remap() {
        let key = normalize(ProviderKind::HuggingFace, "meta-llama/Llama-3-8B-Instruct");
        assert_eq!(key, "meta/llama-3-8b-instruct");

        let key = normalize(ProviderKind::HuggingFace, "mistralai/Mixtral-8x7B-Instruct-v0.1");
        assert_eq!(key, "mistral/mixtral-8x7b-instruct-v0.1");
    }

    #[test]
    fn per_provider_default_vendor() {
        assert_eq!(normalize(ProviderKind::OpenAi, "gpt-4o-mini"), "openai/gpt-4o-mini");
        assert_eq!(normalize(ProviderKind::Anthropic, "claude-3-5-sonnet"), "anthropic/claude-3-5-sonnet");
    }

    #[test]
    fn family_inference_from_bare_name() {
        assert_eq!(normalize(ProviderKind::Custom, "Llama-3-70B"), "meta/llama-3-70b");
        assert_eq!(normalize(ProviderKind::Custom, "gemma-2-9b-it"), "google/gemma-2-9b-it");
        assert_eq!(normalize(ProviderKind::Custom, "Mixtral-8x22B"), "mistral/mixtral-8x22b");
        assert_eq!(normalize(ProviderKind::Custom, "my-custom-claude-clone"), "anthropic/my-custom-claude-clone");
    }

    #[test]
    fn slugify_strips_disallowed_characters_and_collapses_whitespace() {
        assert_eq!(normalize(ProviderKind::OpenAi, "  GPT 4O_Mini!! "), "openai/gpt-4o-mini");
    }

    #[test]
    fn idempotent_for_representative_inputs_per_kind() {
        // Each kind is only exercised with raw strings whose shape it would
        // realistically see in production, matching the property as stated:
        // `normalize(kind, normalize(kind, raw)) == normalize(kind, raw)`.
        let cases: &[(ProviderKind, &[&str])] = &[
            (ProviderKind::OpenAi, &["gpt-4o-mini", "o1-preview"]),
            (ProviderKind::Anthropic, &["claude-3-5-sonnet-20240620"]),
            (ProviderKind::Google, &["models/gemini-1.5-pro", "gemini-1.5-flash"]),
            (
                ProviderKind::AwsBedrock,
                &["anthropic.claude-3-5-sonnet-20240620-v1:0", "meta.llama3-70b-instruct-v1:0"],
            ),
            (ProviderKind::Ollama, &["qwen2:7b", "llama3:8b"]),
            (
                ProviderKind::OpenRouter,
                &["anthropic/claude-3-opus:beta", "teknium/openhermes-2.5-mistral-7b"],
            ),
            (ProviderKind::HuggingFace, &["meta-llama/Llama-3-8B-Instruct", "mistralai/Mixtral-8x7B-Instruct-v0.1"]),
            (ProviderKind::Custom, &["my-custom-claude-clone", "plain-model-name"]),
        ];

        for (kind, raws) in cases {
            for raw in *raws {
                let once = normalize(*kind, raw);
                assert!(!once.is_empty());
                assert_eq!(once.matches('/').count(), 1, "expected exactly one '/' in {once:?}");

                let twice = normalize(*kind, &once);
                assert_eq!(once, twice, "normalize not idempotent for kind={kind:?} raw={raw:?} once={once:?}");
            }
        }
    }
}
