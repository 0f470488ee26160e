/// Above this, the current (last) user turn is rejected outright rather
/// than truncated — a request this oversized is almost always a mistake,
/// not something worth silently chopping.
pub const MAX_USER_CONTENT_TOKENS: u32 = 24_000;

/// Truncation threshold for a single non-current text content part.
pub const MAX_MULTI_CONTENT_TEXT_TOKENS: u32 = 6_000;

/// Truncation threshold for one tool result.
pub const MAX_TOOL_RESULT_TOKENS: u32 = 20_000;

/// Truncation threshold for one tool call's argument blob.
pub const MAX_TOOL_ARGUMENT_TOKENS: u32 = 2_000;

/// `available_for_messages` below this makes the budget invalid.
pub const MIN_FLOOR: u32 = 1_000;

/// History trimming never reduces the message list below this length.
pub const MIN_MESSAGES_TO_KEEP: usize = 2;

/// Fraction of context reserved for the reply when the caller didn't pass
/// an explicit `max_tokens`.
pub const DEFAULT_SAFETY_MARGIN: f32 = 0.75;

pub const MAX_USER_IMAGES_PER_MESSAGE: usize = 15;
pub const MAX_TOOL_IMAGES_PER_MESSAGE: usize = 10;

pub const IMAGE_TOKENS_LOW_DETAIL: u32 = 85;
pub const IMAGE_TOKENS_HIGH_DETAIL: u32 = 850;

pub const TOOL_CALL_BASE_OVERHEAD: u32 = 20;
pub const PER_MESSAGE_BASE_OVERHEAD: u32 = 10;

/// Fraction of a string's runes that must be CJK before the CJK-aware
/// divisor kicks in.
pub const CJK_RATIO_THRESHOLD: f32 = 0.3;
