use crate::conversation::Conversation;

const FALLBACK_TITLE_MAX_CHARS: usize = 60;

/// Titles are (re-)considered on the first user turn, then every fifth
/// turn after that.
pub fn should_reevaluate(user_message_count: u64) -> bool {
    user_message_count == 1 || (user_message_count != 0 && user_message_count % 5 == 0)
}

/// Truncates the first user message into a title when the title-generation
/// model call isn't available or hasn't produced anything yet.
pub fn fallback_title(first_user_text: &str) -> String {
    let trimmed = first_user_text.trim();
    let char_count = trimmed.chars().count();

    if char_count <= FALLBACK_TITLE_MAX_CHARS {
        trimmed.to_string()
    } else {
        let truncated: String = trimmed.chars().take(FALLBACK_TITLE_MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

/// Applies a candidate title, honoring `title_locked` and the
/// auto-title-only replacement rule. Returns whether the title changed.
pub fn apply(conversation: &mut Conversation, candidate: String) -> bool {
    if conversation.title_locked() {
        return false;
    }

    if conversation.title.is_some() && !conversation.title_auto {
        return false;
    }

    if conversation.title.as_deref() == Some(candidate.as_str()) {
        return false;
    }

    conversation.title = Some(candidate);
    conversation.title_auto = true;
    true
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    #[test]
    fn reevaluates_on_first_turn_and_every_fifth_after() {
        assert!(should_reevaluate(1));
        assert!(!should_reevaluate(2));
        assert!(should_reevaluate(5));
        assert!(should_reevaluate(10));
        assert!(!should_reevaluate(11));
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let title = fallback_title(&"word ".repeat(50));
        assert!(title.ends_with('…'));
        assert!(title.chars().count() <= FALLBACK_TITLE_MAX_CHARS + 1);
    }

    #[test]
    fn locked_title_is_never_replaced() {
        let mut conversation = Conversation::new("user".to_string(), None, None, Timestamp::UNIX_EPOCH);
        conversation.metadata.insert("title_locked".to_string(), serde_json::Value::Bool(true));
        conversation.title = Some("Operator set this".to_string());

        assert!(!apply(&mut conversation, "New candidate".to_string()));
        assert_eq!(conversation.title.as_deref(), Some("Operator set this"));
    }

    #[test]
    fn manually_set_title_is_not_replaced_by_auto_title() {
        let mut conversation = Conversation::new("user".to_string(), None, None, Timestamp::UNIX_EPOCH);
        conversation.title = Some("Manual title".to_string());
        conversation.title_auto = false;

        assert!(!apply(&mut conversation, "Auto candidate".to_string()));
    }

    #[test]
    fn auto_title_is_replaced_by_a_better_auto_title() {
        let mut conversation = Conversation::new("user".to_string(), None, None, Timestamp::UNIX_EPOCH);
        conversation.title = Some("First guess".to_string());
        conversation.title_auto = true;

        assert!(apply(&mut conversation, "Better guess".to_string()));
        assert_eq!(conversation.title.as_deref(), Some("Better guess"));
    }
}
