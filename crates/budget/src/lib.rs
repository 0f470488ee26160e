//! Token-budget engine (component E): estimates, validates, and truncates
//! a pending message list so it fits the model's context window before a
//! request goes upstream.

mod budget;
mod engine;
mod error;
mod estimate;
pub mod limits;
mod truncate;

pub use budget::TokenBudget;
pub use engine::{enforce, trim_history, truncate_oversized_content, validate_current_user_input};
pub use error::Error;
pub use estimate::{estimate_image_tokens, estimate_message_tokens, estimate_messages_tokens, estimate_text_tokens, estimate_tool_call_tokens};
pub use truncate::{embedded_image_token_bonus, truncate_json_aware, truncate_text};
