//! Testing utilities for users of the reprise library.
//!
//! This module provides helpers for testing schedules and event consumers:
//!
//! - instant and interval fixtures for common recurrence shapes
//! - [`profile_fixture`]: a fully built profile with a fixed reference time
//! - [`RecordingHandler`]: an [`EventHandler`] that captures emitted events

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::core::calendar::ZonedCalendar;
use crate::core::interval::Interval;
use crate::core::profile::ProfileConfig;
use crate::core::specifier::SpecifierKind;
use crate::events::{Event, EventHandler};

/// Parse an RFC 3339 timestamp.
///
/// # Panics
///
/// Panics on malformed input; intended for test literals.
///
/// # Example
///
/// ```
/// use reprise::testing::instant;
///
/// let t = instant("2024-01-01T08:00:00Z");
/// ```
pub fn instant(s: &str) -> DateTime<Utc> {
    s.parse().expect("malformed test timestamp")
}

/// A fixed reference instant used by the fixtures: Monday 2024-01-01 08:00 UTC.
pub fn reference() -> DateTime<Utc> {
    instant("2024-01-01T08:00:00Z")
}

/// An interval firing every `n` minutes.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn every_n_minutes(n: u32) -> Interval {
    Interval::builder()
        .minutes(SpecifierKind::EveryNth { step: n, offset: 0 })
        .build()
        .expect("step is nonzero")
}

/// An interval firing on the listed weekdays at `hour:minute`.
pub fn weekly_interval(weekdays: Vec<u32>, hour: u32, minute: u32) -> Interval {
    Interval::builder()
        .weekdays(SpecifierKind::ExplicitList(weekdays))
        .hours(SpecifierKind::ExplicitList(vec![hour]))
        .minutes(SpecifierKind::ExplicitList(vec![minute]))
        .build()
        .expect("weekly fixture parameters in range")
}

/// An interval firing on the last day of every month at `hour:minute`.
pub fn month_end_interval(hour: u32, minute: u32) -> Interval {
    Interval::builder()
        .monthdays(SpecifierKind::Last)
        .hours(SpecifierKind::ExplicitList(vec![hour]))
        .minutes(SpecifierKind::ExplicitList(vec![minute]))
        .build()
        .expect("month-end fixture parameters in range")
}

/// A profile built at [`reference`] with a daily 02:00 interval and a few
/// include/exclude paths.
pub fn profile_fixture(name: &str) -> ProfileConfig {
    ProfileConfig::builder(name)
        .target_dir(format!("/backups/{name}"))
        .include_dir(format!("/home/user/{name}"))
        .exclude_dir(format!("/home/user/{name}/cache"))
        .interval(Interval::daily(2, 0).expect("daily 02:00 is valid"))
        .build(reference(), &ZonedCalendar::utc())
        .expect("fixture profile is satisfiable")
}

/// An event handler that records every event it receives.
///
/// Register it on an [`EventBus`](crate::events::EventBus), run the code
/// under test, then assert on [`events`](RecordingHandler::events).
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// A snapshot of the events received so far.
    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    /// How many events have been received.
    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &Event) {
        self.events.lock().await.push(event.clone());
    }
}
