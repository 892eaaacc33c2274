//! Scheduler engine for recurring backups.
//!
//! The scheduling loop watches stored profiles, announces due backups on
//! the event bus, and advances each profile's next occurrence.

mod engine;
mod handle;
mod types;

pub use engine::Scheduler;
pub use handle::SchedulerHandle;
pub use types::{SchedulerError, SchedulerState};
