//! Prompt orchestrator (component G): augments a pending message list with
//! project instruction, persona, memory, and tool/deep-research hints.
//! Best-effort — any internal failure returns the original list unchanged.

mod context;
mod orchestrate;

pub use context::{Context, MemoryFragment, MemorySource};
pub use orchestrate::{AppliedModule, orchestrate};
