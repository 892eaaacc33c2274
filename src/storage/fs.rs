//! Directory-backed profile storage.
//!
//! Each profile is one pretty-printed JSON file named after its uuid, so a
//! profile directory can be inspected and edited by hand. Hand edits are
//! exactly why everything read back goes through `validate`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use super::{ProfileStore, StorageError};
use crate::core::profile::ProfileConfig;
use crate::core::types::ProfileId;

/// One JSON file per profile in a flat directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open a store over `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory profiles are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: ProfileId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write_profile(&self, profile: &ProfileConfig) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(self.path_for(profile.id()), json).await?;
        Ok(())
    }

    async fn read_profile(&self, path: &Path) -> Result<ProfileConfig, StorageError> {
        let json = fs::read_to_string(path).await?;
        let profile: ProfileConfig = serde_json::from_str(&json)?;
        profile.validate()?;
        Ok(profile)
    }
}

#[async_trait]
impl ProfileStore for JsonDirStore {
    async fn save_profile(&self, profile: ProfileConfig) -> Result<(), StorageError> {
        let path = self.path_for(profile.id());
        if fs::try_exists(&path).await? {
            return Err(StorageError::DuplicateKey(profile.id()));
        }
        self.write_profile(&profile).await
    }

    async fn get_profile(&self, id: ProfileId) -> Result<ProfileConfig, StorageError> {
        let path = self.path_for(id);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(id));
        }
        self.read_profile(&path).await
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileConfig>, StorageError> {
        let mut profiles = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension() != Some(std::ffi::OsStr::new("json")) {
                continue;
            }
            match self.read_profile(&path).await {
                Ok(profile) => profiles.push(profile),
                // A broken file should not take the whole directory down.
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable profile"),
            }
        }
        Ok(profiles)
    }

    async fn update_profile(&self, profile: ProfileConfig) -> Result<(), StorageError> {
        let path = self.path_for(profile.id());
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(profile.id()));
        }
        self.write_profile(&profile).await
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), StorageError> {
        let path = self.path_for(id);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(id));
        }
        fs::remove_file(path).await?;
        Ok(())
    }
}

/// Load and validate every profile file in `dir`.
///
/// Unlike [`JsonDirStore::list_profiles`], a single invalid file fails the
/// whole load; this is the strict path used at daemon startup so a typo in
/// one profile is noticed rather than silently dropped.
pub async fn load_profiles_from_directory(
    dir: impl AsRef<Path>,
) -> Result<Vec<ProfileConfig>, StorageError> {
    let mut profiles = Vec::new();
    let mut entries = fs::read_dir(dir.as_ref()).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension() != Some(std::ffi::OsStr::new("json")) {
            continue;
        }
        let json = fs::read_to_string(&path).await?;
        let profile: ProfileConfig = serde_json::from_str(&json)?;
        profile.validate()?;
        profiles.push(profile);
    }
    Ok(profiles)
}
