use messages::{Content, ContentContainer, Message, Role};

use crate::budget::TokenBudget;
use crate::error::Error;
use crate::estimate::{estimate_messages_tokens, estimate_text_tokens};
use crate::limits::{
    MAX_MULTI_CONTENT_TEXT_TOKENS, MAX_TOOL_ARGUMENT_TOKENS, MAX_TOOL_RESULT_TOKENS, MAX_TOOL_IMAGES_PER_MESSAGE, MAX_USER_CONTENT_TOKENS, MAX_USER_IMAGES_PER_MESSAGE, MIN_MESSAGES_TO_KEEP,
};
use crate::truncate::{truncate_json_aware, truncate_text};

fn text_only_tokens(message: &Message) -> u32 {
    match &message.content {
        ContentContainer::Text(text) => estimate_text_tokens(text),
        ContentContainer::Blocks(blocks) => blocks
            .iter()
            .filter_map(|c| matches!(c, Content::InputText { .. } | Content::OutputText { .. } | Content::ReasoningText { .. }).then(|| estimate_text_tokens(c.as_text().unwrap_or_default())))
            .sum(),
    }
}

fn current_user_message(messages: &[Message]) -> Option<&Message> {
    messages.last().filter(|m| m.role == Role::User)
}

/// Phase 1: only the *current* user turn is checked. Multi-part inputs sum
/// only their text parts, so an attached image doesn't count against the
/// text budget here.
pub fn validate_current_user_input(messages: &[Message]) -> Result<(), Error> {
    let Some(current) = current_user_message(messages) else {
        return Ok(());
    };

    let tokens = text_only_tokens(current);
    if tokens > MAX_USER_CONTENT_TOKENS {
        return Err(Error::UserInputTooLarge { actual: tokens, limit: MAX_USER_CONTENT_TOKENS });
    }

    Ok(())
}

/// Phase 3: JSON-aware truncation of oversized historical content, plus
/// per-message image caps. The current (last) user message is left intact —
/// phase 1 already bounds it, and it must never be mutated away from what
/// the caller actually sent.
pub fn truncate_oversized_content(messages: &mut [Message]) {
    let last_index = messages.len().saturating_sub(1);

    for (index, message) in messages.iter_mut().enumerate() {
        let is_current_user_turn = index == last_index && message.role == Role::User;
        if is_current_user_turn {
            continue;
        }

        truncate_message_content(message, message.role == Role::User);
        cap_images(message);
    }
}

fn truncate_message_content(message: &mut Message, is_user: bool) {
    let limit = if is_user { MAX_USER_CONTENT_TOKENS } else { MAX_MULTI_CONTENT_TEXT_TOKENS };

    match &mut message.content {
        ContentContainer::Text(text) => {
            *text = truncate_json_aware(text, limit);
        }
        ContentContainer::Blocks(blocks) => {
            for block in blocks {
                truncate_content_block(block);
            }
        }
    }

    if let Some(tool_calls) = &mut message.tool_calls {
        for call in tool_calls {
            call.arguments = serde_json::Value::String(truncate_text(&call.arguments.to_string(), MAX_TOOL_ARGUMENT_TOKENS));
        }
    }
}

fn truncate_content_block(block: &mut Content) {
    match block {
        Content::InputText { text } => *text = truncate_json_aware(text, MAX_MULTI_CONTENT_TEXT_TOKENS),
        Content::OutputText { text } | Content::ReasoningText { text } => *text = truncate_json_aware(text, MAX_MULTI_CONTENT_TEXT_TOKENS),
        Content::FunctionCall { arguments, .. } => {
            *arguments = serde_json::Value::String(truncate_text(&arguments.to_string(), MAX_TOOL_ARGUMENT_TOKENS));
        }
        Content::ToolResult { content, .. } => {
            let text = content.as_text();
            let truncated = truncate_json_aware(&text, MAX_TOOL_RESULT_TOKENS);
            *content = messages::ToolResultContent::Text(truncated);
        }
        Content::Image { .. } => {}
    }
}

fn cap_images(message: &mut Message) {
    let cap = if message.role == Role::Tool { MAX_TOOL_IMAGES_PER_MESSAGE } else { MAX_USER_IMAGES_PER_MESSAGE };

    if let ContentContainer::Blocks(blocks) = &mut message.content {
        let mut seen = 0usize;
        blocks.retain(|block| {
            if matches!(block, Content::Image { .. }) {
                seen += 1;
                seen <= cap
            } else {
                true
            }
        });
    }
}

/// Phase 4: drop the oldest non-system message (index 1 onward — index 0
/// is the always-kept system prompt, and system messages anywhere are
/// immune) until the running estimate fits inside `budget`, or the list is
/// down to `MIN_MESSAGES_TO_KEEP`. The current user message is never
/// removed since it's always the last element and trimming only removes
/// from the front.
pub fn trim_history(messages: &mut Vec<Message>, budget: &TokenBudget) {
    while estimate_messages_tokens(messages) > budget.available_for_messages && messages.len() > MIN_MESSAGES_TO_KEEP {
        let drop_index = messages.iter().enumerate().skip(1).find(|(_, m)| m.role != Role::System).map(|(i, _)| i);

        match drop_index {
            Some(index) => {
                messages.remove(index);
            }
            None => break,
        }
    }
}

/// Runs all four phases and returns the budget used plus the (possibly
/// mutated) message list ready to send upstream.
pub fn enforce(mut messages: Vec<Message>, context_length: u32, tools_tokens: u32, max_completion_tokens: Option<u32>, fixed_overhead: u32, safety_margin: Option<f32>) -> Result<(TokenBudget, Vec<Message>), Error> {
    validate_current_user_input(&messages)?;

    let budget = TokenBudget::build(context_length, tools_tokens, max_completion_tokens, fixed_overhead, safety_margin)?;

    truncate_oversized_content(&mut messages);
    trim_history(&mut messages, &budget);

    Ok((budget, messages))
}

#[cfg(test)]
mod tests {
    use messages::Role;

    use super::*;

    fn message(role: Role, text: &str) -> Message {
        Message { role, content: ContentContainer::Text(text.to_string()), tool_calls: None, tool_call_id: None }
    }

    #[test]
    fn oversized_current_user_turn_is_rejected() {
        let messages = vec![message(Role::User, &"x".repeat(200_000))];
        let err = validate_current_user_input(&messages).unwrap_err();
        assert!(matches!(err, Error::UserInputTooLarge { .. }));
    }

    #[test]
    fn history_trims_oldest_first_keeping_system_and_current_user() {
        let mut messages = vec![message(Role::System, "system prompt")];
        for i in 0..50 {
            messages.push(message(Role::User, &format!("turn {i} {}", "filler ".repeat(200))));
            messages.push(message(Role::Assistant, &format!("reply {i} {}", "filler ".repeat(200))));
        }
        messages.push(message(Role::User, "final question"));

        let budget = TokenBudget::build(5_000, 0, Some(500), 0, None).unwrap();
        trim_history(&mut messages, &budget);

        assert_eq!(messages.first().unwrap().role, Role::System);
        assert_eq!(messages.last().unwrap().text(), "final question");
        assert!(messages.len() >= MIN_MESSAGES_TO_KEEP);
    }

    #[test]
    fn trimming_never_drops_below_min_messages_to_keep() {
        let mut messages = vec![message(Role::User, &"x".repeat(100_000)), message(Role::User, "final")];
        let budget = TokenBudget::build(2_000, 0, Some(100), 0, None).unwrap();
        trim_history(&mut messages, &budget);

        assert_eq!(messages.len(), MIN_MESSAGES_TO_KEEP);
    }

    #[test]
    fn current_user_message_is_not_truncated_by_phase_three() {
        let mut messages = vec![message(Role::User, &"y".repeat(200_000))];
        truncate_oversized_content(&mut messages);
        assert_eq!(messages[0].text().len(), 200_000);
    }

    #[test]
    fn historical_user_message_is_truncated_by_phase_three() {
        let mut messages = vec![message(Role::User, &"y".repeat(200_000)), message(Role::User, "current")];
        truncate_oversized_content(&mut messages);
        assert!(messages[0].text().len() < 200_000);
    }

    #[test]
    fn full_pipeline_rejects_an_oversized_current_turn() {
        let messages = vec![message(Role::User, &"x".repeat(200_000))];
        let err = enforce(messages, 128_000, 0, Some(4_096), 0, None).unwrap_err();
        assert!(matches!(err, Error::UserInputTooLarge { .. }));
    }
}
