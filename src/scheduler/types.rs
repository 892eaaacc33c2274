//! Scheduler type definitions.
//!
//! Error types, state enum, and the command protocol between the handle and
//! the scheduling loop.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::core::resolver::ResolveError;
use crate::core::types::ProfileId;
use crate::storage::StorageError;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Profile not found.
    #[error("profile not found: {0}")]
    ProfileNotFound(ProfileId),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Channel error.
    #[error("channel error: {0}")]
    ChannelError(String),

    /// The profile's schedule could not be advanced.
    #[error("reschedule failed: {0}")]
    Reschedule(#[from] ResolveError),
}

/// State of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Scheduler is stopped.
    Stopped,
    /// Scheduler is running.
    Running,
    /// Scheduler is paused.
    Paused,
}

/// Commands that can be sent to the scheduler.
pub(crate) enum SchedulerCommand {
    /// Announce a profile's backup now, regardless of its schedule, and
    /// advance its next occurrence.
    Trigger {
        profile_id: ProfileId,
        response: oneshot::Sender<Result<DateTime<Utc>, SchedulerError>>,
    },
    /// Remove a profile from storage and the schedule.
    Remove {
        profile_id: ProfileId,
        response: oneshot::Sender<Result<(), SchedulerError>>,
    },
    /// Pause the scheduler.
    Pause { response: oneshot::Sender<()> },
    /// Resume the scheduler.
    Resume { response: oneshot::Sender<()> },
    /// Shutdown the scheduler.
    Shutdown { response: oneshot::Sender<()> },
}
