//! reprise - a recurring-backup scheduler.
//!
//! Backup profiles describe what to copy and on what recurrence; a
//! rule-based engine resolves each profile's next occurrence, and an async
//! scheduler announces due backups on an event bus.

pub mod core;
pub mod events;
pub mod scheduler;
pub mod storage;
pub mod testing;
pub mod wire;

pub use crate::core::calendar::{Calendar, CalendarError, Coordinates, ZonedCalendar};
pub use crate::core::interval::{Interval, IntervalBuilder};
pub use crate::core::profile::{ProfileBuilder, ProfileConfig, ProfileError};
pub use crate::core::resolver::{
    default_horizon, resolve_next, resolve_next_n, ResolveError, UnsatisfiableScheduleError,
    DEFAULT_HORIZON_DAYS,
};
pub use crate::core::specifier::{ConfigError, DomainError, Specifier, SpecifierKind};
pub use crate::core::types::ProfileId;
pub use crate::events::{Event, EventBus, EventHandler};
pub use crate::scheduler::{Scheduler, SchedulerError, SchedulerHandle, SchedulerState};
pub use crate::storage::{
    load_profiles_from_directory, InMemoryStore, JsonDirStore, ProfileStore, StorageError,
};
pub use crate::wire::{decode_profile, encode_profile, WireError};
