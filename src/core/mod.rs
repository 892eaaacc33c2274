//! Core recurrence engine and profile model.

pub mod calendar;
pub mod interval;
pub mod profile;
pub mod resolver;
pub mod specifier;
pub mod types;
