//! Scheduler engine implementation.
//!
//! The engine owns a profile store, a calendar, and an event bus. Each tick
//! it asks the store for profiles whose `next_backup` has passed, announces
//! them as [`Event::BackupDue`], advances their schedules, and writes the
//! new occurrence back. Backups themselves are performed by whatever
//! listens on the bus; the engine only keeps time.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::handle::{SchedulerHandle, COMMAND_CHANNEL_BUFFER};
use super::types::{SchedulerCommand, SchedulerError, SchedulerState};
use crate::core::calendar::{Calendar, ZonedCalendar};
use crate::core::profile::ProfileConfig;
use crate::core::types::ProfileId;
use crate::events::{Event, EventBus};
use crate::storage::{ProfileStore, StorageError};

/// Scheduler for recurring backup profiles.
pub struct Scheduler<S: ProfileStore> {
    store: Arc<S>,
    event_bus: Arc<EventBus>,
    calendar: Arc<dyn Calendar>,
    tick_interval: Duration,
}

impl<S: ProfileStore + 'static> Scheduler<S> {
    /// Create a scheduler over the given store, with a UTC calendar and a
    /// one-second tick.
    pub fn new(store: S) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Create a scheduler over shared storage.
    pub fn with_store(store: Arc<S>) -> Self {
        Self {
            store,
            event_bus: Arc::new(EventBus::new()),
            calendar: Arc::new(ZonedCalendar::utc()),
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Set the event bus.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Arc::new(event_bus);
        self
    }

    /// Set the calendar schedules are evaluated in.
    pub fn with_calendar(mut self, calendar: impl Calendar + 'static) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Get the event bus.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Start the scheduler and return a handle for controlling it.
    pub async fn start(self) -> (SchedulerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_BUFFER);
        let state = Arc::new(RwLock::new(SchedulerState::Running));

        let handle = SchedulerHandle {
            command_tx,
            state: Arc::clone(&state),
        };

        let scheduler_task = tokio::spawn(async move {
            self.run(command_rx, state).await;
        });

        (handle, scheduler_task)
    }

    /// Main scheduler loop.
    async fn run(
        self,
        mut command_rx: mpsc::Receiver<SchedulerCommand>,
        state: Arc<RwLock<SchedulerState>>,
    ) {
        let mut interval = tokio::time::interval(self.tick_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let current_state = *state.read().await;
                    if current_state == SchedulerState::Running {
                        self.announce_due_profiles(Utc::now()).await;
                    }
                }

                Some(command) = command_rx.recv() => {
                    match command {
                        SchedulerCommand::Trigger { profile_id, response } => {
                            let result = self.trigger_profile(profile_id).await;
                            let _ = response.send(result);
                        }
                        SchedulerCommand::Remove { profile_id, response } => {
                            let result = self.remove_profile(profile_id).await;
                            let _ = response.send(result);
                        }
                        SchedulerCommand::Pause { response } => {
                            let mut s = state.write().await;
                            *s = SchedulerState::Paused;
                            info!("Scheduler paused");
                            let _ = response.send(());
                        }
                        SchedulerCommand::Resume { response } => {
                            let mut s = state.write().await;
                            *s = SchedulerState::Running;
                            info!("Scheduler resumed");
                            let _ = response.send(());
                        }
                        SchedulerCommand::Shutdown { response } => {
                            let mut s = state.write().await;
                            *s = SchedulerState::Stopped;
                            info!("Scheduler shut down");
                            let _ = response.send(());
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Announce every profile whose next occurrence has passed and advance
    /// its schedule.
    async fn announce_due_profiles(&self, now: DateTime<Utc>) {
        let profiles = match self.store.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "Failed to list profiles on tick");
                return;
            }
        };

        for profile in profiles {
            if !profile.is_due(now) {
                continue;
            }
            let due_at = profile.next_backup();
            debug!(profile_id = %profile.id(), name = profile.name(), due_at = %due_at, "Backup due");
            self.event_bus
                .emit(Event::backup_due(profile.id(), profile.name(), due_at))
                .await;
            self.advance_profile(profile, due_at, now).await;
        }
    }

    /// Advance a profile past a due occurrence and persist the result.
    ///
    /// The schedule is resolved from the due time, so no occurrence is
    /// skipped by a late tick; if the result is still in the past (many
    /// occurrences missed, e.g. after downtime), it is resolved again from
    /// `now` so the loop does not replay the whole backlog.
    async fn advance_profile(
        &self,
        mut profile: ProfileConfig,
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) {
        let next = match profile.reschedule(due_at, self.calendar.as_ref()) {
            Ok(next) if next > now => next,
            Ok(missed) => {
                warn!(
                    profile_id = %profile.id(),
                    name = profile.name(),
                    next_missed = %missed,
                    "Missed occurrences, rescheduling from now"
                );
                match profile.reschedule(now, self.calendar.as_ref()) {
                    Ok(next) => next,
                    Err(e) => {
                        error!(profile_id = %profile.id(), error = %e, "Reschedule failed, leaving profile unchanged");
                        return;
                    }
                }
            }
            Err(e) => {
                // An interval can become unsatisfiable after a direct store
                // edit; keep the profile so the operator can fix it.
                error!(profile_id = %profile.id(), error = %e, "Reschedule failed, leaving profile unchanged");
                return;
            }
        };

        if let Err(e) = self.store.update_profile(profile.clone()).await {
            warn!(profile_id = %profile.id(), error = %e, "Failed to persist reschedule");
            return;
        }
        self.event_bus
            .emit(Event::profile_rescheduled(
                profile.id(),
                profile.name(),
                next,
            ))
            .await;
    }

    /// Manually announce a profile and advance its schedule from now.
    async fn trigger_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<DateTime<Utc>, SchedulerError> {
        let mut profile = match self.store.get_profile(profile_id).await {
            Ok(profile) => profile,
            Err(StorageError::NotFound(id)) => return Err(SchedulerError::ProfileNotFound(id)),
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now();
        self.event_bus
            .emit(Event::backup_due(profile.id(), profile.name(), now))
            .await;

        let next = profile.reschedule(now, self.calendar.as_ref())?;
        self.store.update_profile(profile.clone()).await?;
        self.event_bus
            .emit(Event::profile_rescheduled(
                profile.id(),
                profile.name(),
                next,
            ))
            .await;
        Ok(next)
    }

    async fn remove_profile(&self, profile_id: ProfileId) -> Result<(), SchedulerError> {
        match self.store.delete_profile(profile_id).await {
            Ok(()) => {
                self.event_bus.emit(Event::profile_removed(profile_id)).await;
                Ok(())
            }
            Err(StorageError::NotFound(id)) => Err(SchedulerError::ProfileNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
