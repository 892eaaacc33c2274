//! Backup profiles.
//!
//! A [`ProfileConfig`] describes one recurring backup: what to copy, where
//! to put it, and on what recurrence [`Interval`]. Every profile carries an
//! always-valid `next_backup` instant; construction and interval edits
//! trial-resolve the schedule so an unsatisfiable interval can never be
//! committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::calendar::Calendar;
use super::interval::Interval;
use super::resolver::{default_horizon, resolve_next, ResolveError};
use super::specifier::ConfigError;
use super::types::ProfileId;

/// Errors from building or editing a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile has no name.
    #[error("profile name must not be empty")]
    MissingName,

    /// The profile has no backup target directory.
    #[error("profile requires a target directory")]
    MissingTarget,

    /// The interval could not be resolved to a next occurrence.
    #[error("schedule rejected: {0}")]
    Schedule(#[from] ResolveError),

    /// The interval's rules are invalid.
    #[error("invalid interval: {0}")]
    Config(#[from] ConfigError),
}

/// One recurring backup job: sources, destination, and recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    id: ProfileId,
    name: String,
    target_dir: PathBuf,
    files_to_include: Vec<PathBuf>,
    dirs_to_include: Vec<PathBuf>,
    files_to_exclude: Vec<PathBuf>,
    dirs_to_exclude: Vec<PathBuf>,
    interval: Interval,
    next_backup: DateTime<Utc>,
}

impl ProfileConfig {
    /// Start building a profile.
    pub fn builder(name: impl Into<String>) -> ProfileBuilder {
        ProfileBuilder::new(name)
    }

    pub fn id(&self) -> ProfileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn files_to_include(&self) -> &[PathBuf] {
        &self.files_to_include
    }

    pub fn dirs_to_include(&self) -> &[PathBuf] {
        &self.dirs_to_include
    }

    pub fn files_to_exclude(&self) -> &[PathBuf] {
        &self.files_to_exclude
    }

    pub fn dirs_to_exclude(&self) -> &[PathBuf] {
        &self.dirs_to_exclude
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// When the next backup is due.
    pub fn next_backup(&self) -> DateTime<Utc> {
        self.next_backup
    }

    /// Whether the next backup time has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_backup <= now
    }

    /// Recompute `next_backup` as the first occurrence after `from`.
    ///
    /// Called after a completed run, with the due time as `from`, so a slow
    /// backup does not skip occurrences that passed meanwhile.
    pub fn reschedule(
        &mut self,
        from: DateTime<Utc>,
        calendar: &dyn Calendar,
    ) -> Result<DateTime<Utc>, ResolveError> {
        self.next_backup = resolve_next(&self.interval, from, default_horizon(), calendar)?;
        Ok(self.next_backup)
    }

    /// Replace the interval, trial-resolving first.
    ///
    /// The edit is only committed if the new interval has an occurrence
    /// after `from`; on failure the profile is unchanged.
    pub fn set_interval(
        &mut self,
        interval: Interval,
        from: DateTime<Utc>,
        calendar: &dyn Calendar,
    ) -> Result<(), ResolveError> {
        let next = resolve_next(&interval, from, default_horizon(), calendar)?;
        self.interval = interval;
        self.next_backup = next;
        Ok(())
    }

    /// Whether `path` is excluded, either directly or by an excluded
    /// ancestor directory.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.files_to_exclude.iter().any(|f| f == path)
            || self.dirs_to_exclude.iter().any(|d| path.starts_with(d))
    }

    /// Whether `path` lives under one of the included directories.
    pub fn in_included_dirs(&self, path: &Path) -> bool {
        self.dirs_to_include.iter().any(|d| path.starts_with(d))
    }

    /// Re-check the interval's rules (serde bypasses construction checks).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interval.validate()
    }
}

/// Builder for [`ProfileConfig`].
///
/// `build` needs a reference instant and a calendar because it performs the
/// profile's first schedule resolution.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    id: ProfileId,
    name: String,
    target_dir: Option<PathBuf>,
    files_to_include: Vec<PathBuf>,
    dirs_to_include: Vec<PathBuf>,
    files_to_exclude: Vec<PathBuf>,
    dirs_to_exclude: Vec<PathBuf>,
    interval: Interval,
}

impl ProfileBuilder {
    /// Create a builder with a fresh id and an unconstrained interval.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProfileId::new(),
            name: name.into(),
            target_dir: None,
            files_to_include: Vec::new(),
            dirs_to_include: Vec::new(),
            files_to_exclude: Vec::new(),
            dirs_to_exclude: Vec::new(),
            interval: Interval::any(),
        }
    }

    /// Use an existing id instead of a generated one.
    pub fn id(mut self, id: ProfileId) -> Self {
        self.id = id;
        self
    }

    /// Set where backups are written.
    pub fn target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Add a single file to back up.
    pub fn include_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files_to_include.push(path.into());
        self
    }

    /// Add a directory tree to back up.
    pub fn include_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs_to_include.push(path.into());
        self
    }

    /// Exclude a single file.
    pub fn exclude_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files_to_exclude.push(path.into());
        self
    }

    /// Exclude a directory tree.
    pub fn exclude_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs_to_exclude.push(path.into());
        self
    }

    /// Set the recurrence interval.
    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Resolve the first occurrence after `reference` and build the profile.
    pub fn build(
        self,
        reference: DateTime<Utc>,
        calendar: &dyn Calendar,
    ) -> Result<ProfileConfig, ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingName);
        }
        let target_dir = self.target_dir.ok_or(ProfileError::MissingTarget)?;
        let next_backup = resolve_next(&self.interval, reference, default_horizon(), calendar)?;

        Ok(ProfileConfig {
            id: self.id,
            name: self.name,
            target_dir,
            files_to_include: self.files_to_include,
            dirs_to_include: self.dirs_to_include,
            files_to_exclude: self.files_to_exclude,
            dirs_to_exclude: self.dirs_to_exclude,
            interval: self.interval,
            next_backup,
        })
    }
}
