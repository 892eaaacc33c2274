//! Core identifier types and calendar constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a backup profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Generate a new random ProfileId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a ProfileId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weekday indices, Monday-start per ISO-8601.
pub const MONDAY: u32 = 0;
pub const TUESDAY: u32 = 1;
pub const WEDNESDAY: u32 = 2;
pub const THURSDAY: u32 = 3;
pub const FRIDAY: u32 = 4;
pub const SATURDAY: u32 = 5;
pub const SUNDAY: u32 = 6;

/// Zero-based month indices.
pub const JANUARY: u32 = 0;
pub const FEBRUARY: u32 = 1;
pub const MARCH: u32 = 2;
pub const APRIL: u32 = 3;
pub const MAY: u32 = 4;
pub const JUNE: u32 = 5;
pub const JULY: u32 = 6;
pub const AUGUST: u32 = 7;
pub const SEPTEMBER: u32 = 8;
pub const OCTOBER: u32 = 9;
pub const NOVEMBER: u32 = 10;
pub const DECEMBER: u32 = 11;
