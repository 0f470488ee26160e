use messages::{Content, ContentContainer, ImageDetail, Message, ToolCall};

use crate::limits::{IMAGE_TOKENS_HIGH_DETAIL, IMAGE_TOKENS_LOW_DETAIL, PER_MESSAGE_BASE_OVERHEAD, TOOL_CALL_BASE_OVERHEAD};

/// Rough token count for a piece of text. Plain runes are `ceil(len/4)`;
/// once more than 30% of the runes are CJK, CJK runes are counted at
/// `/1.5` and the remainder at `/4`, matching how those scripts actually
/// tokenize relative to Latin text.
pub fn estimate_text_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }

    let total_runes = text.chars().count();
    let cjk_runes = text.chars().filter(|c| is_cjk(*c)).count();

    let cjk_ratio = cjk_runes as f32 / total_runes as f32;

    if cjk_ratio > crate::limits::CJK_RATIO_THRESHOLD {
        let other_runes = total_runes - cjk_runes;
        let cjk_tokens = (cjk_runes as f32 / 1.5).ceil() as u32;
        let other_tokens = (other_runes as f32 / 4.0).ceil() as u32;
        cjk_tokens + other_tokens
    } else {
        (total_runes as f32 / 4.0).ceil() as u32
    }
}

fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF   // CJK unified ideographs
        | 0x3040..=0x30FF // hiragana + katakana
        | 0xAC00..=0xD7A3 // hangul syllables
        | 0x3400..=0x4DBF // CJK extension A
    )
}

pub fn estimate_image_tokens(detail: Option<ImageDetail>) -> u32 {
    match detail {
        Some(ImageDetail::Low) => IMAGE_TOKENS_LOW_DETAIL,
        Some(ImageDetail::High) | None => IMAGE_TOKENS_HIGH_DETAIL,
    }
}

pub fn estimate_tool_call_tokens(call: &ToolCall) -> u32 {
    TOOL_CALL_BASE_OVERHEAD + estimate_text_tokens(&call.name) + estimate_text_tokens(&call.arguments.to_string())
}

fn estimate_content_tokens(content: &Content) -> u32 {
    match content {
        Content::InputText { text } | Content::OutputText { text } | Content::ReasoningText { text } => estimate_text_tokens(text),
        Content::Image { detail, .. } => estimate_image_tokens(*detail),
        Content::FunctionCall { name, arguments, .. } => TOOL_CALL_BASE_OVERHEAD + estimate_text_tokens(name) + estimate_text_tokens(&arguments.to_string()),
        Content::ToolResult { content, .. } => estimate_text_tokens(&content.as_text()) + crate::truncate::embedded_image_token_bonus(&content.as_text()),
    }
}

/// Per-message base overhead plus its content and any sibling tool calls.
pub fn estimate_message_tokens(message: &Message) -> u32 {
    let mut total = PER_MESSAGE_BASE_OVERHEAD;

    total += match &message.content {
        ContentContainer::Text(text) => estimate_text_tokens(text),
        ContentContainer::Blocks(blocks) => blocks.iter().map(estimate_content_tokens).sum(),
    };

    if let Some(tool_calls) = &message.tool_calls {
        total += tool_calls.iter().map(estimate_tool_call_tokens).sum::<u32>();
    }

    total
}

pub fn estimate_messages_tokens(messages: &[Message]) -> u32 {
    messages.iter().map(estimate_message_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_is_divided_by_four() {
        assert_eq!(estimate_text_tokens("12345678"), 2);
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(estimate_text_tokens(""), 0);
    }

    #[test]
    fn heavy_cjk_text_uses_the_cjk_divisor() {
        let text = "日本語のテキストです";
        let tokens = estimate_text_tokens(text);
        let naive = (text.chars().count() as f32 / 4.0).ceil() as u32;
        assert!(tokens >= naive);
    }

    #[test]
    fn low_detail_image_costs_less_than_high() {
        assert!(estimate_image_tokens(Some(ImageDetail::Low)) < estimate_image_tokens(Some(ImageDetail::High)));
    }

    #[test]
    fn missing_detail_is_treated_as_high() {
        assert_eq!(estimate_image_tokens(None), estimate_image_tokens(Some(ImageDetail::High)));
    }

    #[test]
    fn message_estimate_includes_base_overhead() {
        let message = Message::user("hi");
        assert!(estimate_message_tokens(&message) > estimate_text_tokens("hi"));
    }
}
