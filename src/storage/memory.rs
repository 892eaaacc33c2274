//! In-memory profile storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{ProfileStore, StorageError};
use crate::core::profile::ProfileConfig;
use crate::core::types::ProfileId;

/// Thread-safe in-memory store, for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<ProfileId, ProfileConfig>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn save_profile(&self, profile: ProfileConfig) -> Result<(), StorageError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if profiles.contains_key(&profile.id()) {
            return Err(StorageError::DuplicateKey(profile.id()));
        }
        profiles.insert(profile.id(), profile);
        Ok(())
    }

    async fn get_profile(&self, id: ProfileId) -> Result<ProfileConfig, StorageError> {
        self.profiles
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileConfig>, StorageError> {
        Ok(self
            .profiles
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .values()
            .cloned()
            .collect())
    }

    async fn update_profile(&self, profile: ProfileConfig) -> Result<(), StorageError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if !profiles.contains_key(&profile.id()) {
            return Err(StorageError::NotFound(profile.id()));
        }
        profiles.insert(profile.id(), profile);
        Ok(())
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), StorageError> {
        self.profiles
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}
