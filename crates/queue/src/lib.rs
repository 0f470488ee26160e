//! Background response orchestrator (component J): queued chat
//! completions run off a fixed worker pool, with an in-band "retry once
//! without tools" heuristic and best-effort webhook delivery on
//! completion.

mod error;
mod orchestrator;
mod record;
mod repository;
mod retry;
mod webhook;
mod worker;

pub use error::Error;
pub use orchestrator::BackgroundOrchestrator;
pub use record::{ResponseRecord, ResponseStatus};
pub use repository::{InMemoryResponseRepository, ResponseRepository};
pub use retry::is_tools_unsupported;
pub use worker::spawn_workers;
