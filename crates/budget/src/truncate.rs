use serde_json::Value;

use crate::estimate::estimate_text_tokens;
use crate::limits::IMAGE_TOKENS_HIGH_DETAIL;

const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Fields a JSON-aware truncation pass will shorten in place, trying each
/// in turn so truncating a tool result doesn't have to know its shape.
const TEXT_FIELD_NAMES: &[&str] = &["text", "content", "markdown", "raw_text", "body"];

/// Truncates plain text to roughly `max_tokens` (4 runes/token), appending
/// a trailing marker. A no-op if the text already fits.
pub fn truncate_text(text: &str, max_tokens: u32) -> String {
    if estimate_text_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let max_chars = (max_tokens as usize).saturating_mul(4);
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}{TRUNCATION_MARKER}")
}

/// Truncates `text` to fit `max_tokens`, preferring to parse it as JSON and
/// shorten known text-bearing fields in place so the surrounding structure
/// (keys, array shape) survives. Falls back to flat truncation for
/// non-JSON or JSON with no recognized text field.
pub fn truncate_json_aware(text: &str, max_tokens: u32) -> String {
    if estimate_text_tokens(text) <= max_tokens {
        return text.to_string();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(mut value) if value.is_object() || value.is_array() => {
            if shorten_text_fields(&mut value, max_tokens) {
                return serde_json::to_string(&value).unwrap_or_else(|_| truncate_text(text, max_tokens));
            }
            truncate_text(text, max_tokens)
        }
        _ => truncate_text(text, max_tokens),
    }
}

fn shorten_text_fields(value: &mut Value, max_tokens: u32) -> bool {
    let mut shortened_any = false;

    match value {
        Value::Object(map) => {
            for key in TEXT_FIELD_NAMES {
                if let Some(Value::String(text)) = map.get_mut(*key) {
                    let shortened = truncate_text(text, max_tokens);
                    if &shortened != text {
                        *text = shortened;
                        shortened_any = true;
                    }
                }
            }
            for nested in map.values_mut() {
                shortened_any |= shorten_text_fields(nested, max_tokens);
            }
        }
        Value::Array(items) => {
            for item in items {
                shortened_any |= shorten_text_fields(item, max_tokens);
            }
        }
        _ => {}
    }

    shortened_any
}

/// Token bonus for embedded images inside a tool result's text: 850 per
/// detected `data:image/*` URL or `{"type": "image", ...}` JSON blob. Tries
/// a JSON sniff first, then falls back to a byte-level substring scan for
/// tool results that embed a data URL in plain text rather than JSON.
pub fn embedded_image_token_bonus(text: &str) -> u32 {
    let json_hits = match serde_json::from_str::<Value>(text) {
        Ok(value) => count_image_blobs(&value),
        Err(_) => 0,
    };

    if json_hits > 0 {
        return json_hits * IMAGE_TOKENS_HIGH_DETAIL;
    }

    let byte_hits = text.matches("data:image/").count() as u32;
    byte_hits * IMAGE_TOKENS_HIGH_DETAIL
}

fn count_image_blobs(value: &Value) -> u32 {
    match value {
        Value::Object(map) => {
            let is_image_blob = matches!(map.get("type"), Some(Value::String(t)) if t == "image")
                || map.values().any(|v| matches!(v, Value::String(s) if s.starts_with("data:image/")));

            let own = if is_image_blob { 1 } else { 0 };
            own + map.values().map(count_image_blobs).sum::<u32>()
        }
        Value::Array(items) => items.iter().map(count_image_blobs).sum(),
        Value::String(s) if s.starts_with("data:image/") => 1,
        _ => 0,
    }
}
