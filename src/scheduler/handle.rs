//! Scheduler handle for external control.
//!
//! The handle talks to the scheduling loop over a command channel; each
//! method sends one command and waits for its oneshot reply.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};

use super::types::{SchedulerCommand, SchedulerError, SchedulerState};
use crate::core::types::ProfileId;

/// Buffer size for the command channel between SchedulerHandle and Scheduler.
pub(crate) const COMMAND_CHANNEL_BUFFER: usize = 32;

/// Handle for controlling a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    pub(crate) command_tx: mpsc::Sender<SchedulerCommand>,
    pub(crate) state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Announce a profile's backup immediately and advance its schedule.
    ///
    /// Returns the profile's new next occurrence.
    pub async fn trigger(&self, profile_id: ProfileId) -> Result<DateTime<Utc>, SchedulerError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::Trigger {
                profile_id,
                response: response_tx,
            })
            .await
            .map_err(|_| SchedulerError::ChannelError("failed to send trigger command".into()))?;
        response_rx
            .await
            .map_err(|_| SchedulerError::ChannelError("failed to receive trigger response".into()))?
    }

    /// Remove a profile from storage and the schedule.
    pub async fn remove(&self, profile_id: ProfileId) -> Result<(), SchedulerError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::Remove {
                profile_id,
                response: response_tx,
            })
            .await
            .map_err(|_| SchedulerError::ChannelError("failed to send remove command".into()))?;
        response_rx
            .await
            .map_err(|_| SchedulerError::ChannelError("failed to receive remove response".into()))?
    }

    /// Pause the scheduler.
    ///
    /// While paused, due profiles are not announced; manual triggers still
    /// work.
    pub async fn pause(&self) -> Result<(), SchedulerError> {
        self.send_signal(|response| SchedulerCommand::Pause { response }, "pause")
            .await
    }

    /// Resume the scheduler after being paused.
    pub async fn resume(&self) -> Result<(), SchedulerError> {
        self.send_signal(|response| SchedulerCommand::Resume { response }, "resume")
            .await
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.send_signal(|response| SchedulerCommand::Shutdown { response }, "shutdown")
            .await
    }

    async fn send_signal(
        &self,
        build: impl FnOnce(oneshot::Sender<()>) -> SchedulerCommand,
        operation: &str,
    ) -> Result<(), SchedulerError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx.send(build(response_tx)).await.map_err(|_| {
            SchedulerError::ChannelError(format!("failed to send {operation} command"))
        })?;
        response_rx.await.map_err(|_| {
            SchedulerError::ChannelError(format!("failed to receive {operation} response"))
        })
    }

    /// Get the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        *self.state.read().await == SchedulerState::Running
    }

    /// Check if the scheduler is paused.
    pub async fn is_paused(&self) -> bool {
        *self.state.read().await == SchedulerState::Paused
    }
}
