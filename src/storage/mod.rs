//! Profile persistence.
//!
//! The scheduler talks to storage only through the [`ProfileStore`] trait,
//! so backends are swappable. Two implementations ship: an in-memory map
//! for tests and embedding, and a JSON-file-per-profile directory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::calendar::Calendar;
use crate::core::profile::ProfileConfig;
use crate::core::resolver::ResolveError;
use crate::core::specifier::ConfigError;
use crate::core::types::ProfileId;

mod fs;
mod memory;

pub use fs::{load_profiles_from_directory, JsonDirStore};
pub use memory::InMemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Profile not found.
    #[error("profile not found: {0}")]
    NotFound(ProfileId),

    /// A profile with this id already exists.
    #[error("profile already exists: {0}")]
    DuplicateKey(ProfileId),

    /// A lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The profile's interval has no occurrence within the horizon.
    #[error("schedule rejected: {0}")]
    ScheduleRejected(#[from] ResolveError),

    /// The profile's interval fails validation.
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ConfigError),
}

/// Persistence operations for backup profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist a new profile. Fails with [`StorageError::DuplicateKey`] if
    /// the id is already present.
    async fn save_profile(&self, profile: ProfileConfig) -> Result<(), StorageError>;

    /// Fetch a profile by id.
    async fn get_profile(&self, id: ProfileId) -> Result<ProfileConfig, StorageError>;

    /// All stored profiles, in no particular order.
    async fn list_profiles(&self) -> Result<Vec<ProfileConfig>, StorageError>;

    /// Overwrite an existing profile. Fails with [`StorageError::NotFound`]
    /// if the id is absent.
    async fn update_profile(&self, profile: ProfileConfig) -> Result<(), StorageError>;

    /// Remove a profile by id.
    async fn delete_profile(&self, id: ProfileId) -> Result<(), StorageError>;

    /// Validate and re-resolve a profile's schedule, then persist it.
    ///
    /// This is the write path the rest of the system uses: a profile whose
    /// interval is invalid or has no occurrence after `reference` is
    /// rejected before it can reach disk. Returns the profile as saved,
    /// with its freshly resolved `next_backup`.
    async fn save_validated(
        &self,
        mut profile: ProfileConfig,
        reference: DateTime<Utc>,
        calendar: &dyn Calendar,
    ) -> Result<ProfileConfig, StorageError> {
        profile.validate()?;
        profile.reschedule(reference, calendar)?;
        self.save_profile(profile.clone()).await?;
        Ok(profile)
    }
}
