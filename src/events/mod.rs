//! Lifecycle events and event handling.
//!
//! The scheduler does not run backups itself; it announces them. Events on
//! the bus are how due backups, reschedules, and profile churn become
//! visible to whatever performs the work or watches it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::types::ProfileId;

/// Lifecycle events emitted by the scheduler.
///
/// Timestamps are wall-clock `DateTime<Utc>` because due times are calendar
/// facts, meant to be logged and compared against profile schedules.
#[derive(Debug, Clone)]
pub enum Event {
    /// A profile was registered with the scheduler.
    ProfileRegistered {
        profile_id: ProfileId,
        name: String,
        next_backup: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A profile's next backup time has been reached.
    BackupDue {
        profile_id: ProfileId,
        name: String,
        /// The occurrence that came due (not the tick that noticed it).
        due_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A profile's next occurrence was recomputed.
    ProfileRescheduled {
        profile_id: ProfileId,
        name: String,
        next_backup: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A profile was removed from the scheduler.
    ProfileRemoved {
        profile_id: ProfileId,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::ProfileRegistered { timestamp, .. } => *timestamp,
            Event::BackupDue { timestamp, .. } => *timestamp,
            Event::ProfileRescheduled { timestamp, .. } => *timestamp,
            Event::ProfileRemoved { timestamp, .. } => *timestamp,
        }
    }

    /// The profile the event concerns.
    pub fn profile_id(&self) -> ProfileId {
        match self {
            Event::ProfileRegistered { profile_id, .. } => *profile_id,
            Event::BackupDue { profile_id, .. } => *profile_id,
            Event::ProfileRescheduled { profile_id, .. } => *profile_id,
            Event::ProfileRemoved { profile_id, .. } => *profile_id,
        }
    }

    /// Create a ProfileRegistered event.
    pub fn profile_registered(
        profile_id: ProfileId,
        name: impl Into<String>,
        next_backup: DateTime<Utc>,
    ) -> Self {
        Event::ProfileRegistered {
            profile_id,
            name: name.into(),
            next_backup,
            timestamp: Utc::now(),
        }
    }

    /// Create a BackupDue event.
    pub fn backup_due(
        profile_id: ProfileId,
        name: impl Into<String>,
        due_at: DateTime<Utc>,
    ) -> Self {
        Event::BackupDue {
            profile_id,
            name: name.into(),
            due_at,
            timestamp: Utc::now(),
        }
    }

    /// Create a ProfileRescheduled event.
    pub fn profile_rescheduled(
        profile_id: ProfileId,
        name: impl Into<String>,
        next_backup: DateTime<Utc>,
    ) -> Self {
        Event::ProfileRescheduled {
            profile_id,
            name: name.into(),
            next_backup,
            timestamp: Utc::now(),
        }
    }

    /// Create a ProfileRemoved event.
    pub fn profile_removed(profile_id: ProfileId) -> Self {
        Event::ProfileRemoved {
            profile_id,
            timestamp: Utc::now(),
        }
    }
}

/// Handler for receiving lifecycle events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: &Event);
}

/// Event bus for distributing events to registered handlers.
pub struct EventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventBus {
    /// Create a new event bus with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register an event handler.
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }

    /// Emit an event to all registered handlers.
    pub async fn emit(&self, event: Event) {
        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Get the number of registered handlers.
    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
