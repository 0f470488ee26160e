//! Conversation store (component F): an append-only item log per branch,
//! with monotonic sequence numbers and title lifecycle management.

mod conversation;
mod error;
mod item;
mod repository;
mod title;

pub use conversation::{Conversation, DEFAULT_BRANCH};
pub use error::Error;
pub use item::{Item, ItemStatus, ItemType, NewItem};
pub use repository::{ConversationRepository, InMemoryConversationRepository, Pagination};
pub use title::{apply as apply_title, fallback_title, should_reevaluate as should_reevaluate_title};
