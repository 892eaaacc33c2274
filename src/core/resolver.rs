//! Occurrence resolution.
//!
//! Given an interval and a reference instant, find the next minute-aligned
//! instant strictly after the reference that the interval matches. The
//! search walks days, skipping whole days whose date coordinates cannot
//! match, and within a matching day jumps straight to the next matching
//! hour and minute. It is bounded by a horizon; a schedule with no
//! occurrence inside the horizon is reported as unsatisfiable rather than
//! searched forever.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::calendar::Calendar;
use super::interval::Interval;
use super::specifier::DomainError;

/// Default search horizon in days, a little over five years.
///
/// Wide enough for the sparsest satisfiable schedule (a minute that exists
/// only on February 29) while keeping unsatisfiable detection cheap.
pub const DEFAULT_HORIZON_DAYS: i64 = 1830;

/// The default search horizon as a [`Duration`].
pub fn default_horizon() -> Duration {
    Duration::days(DEFAULT_HORIZON_DAYS)
}

/// No occurrence of a schedule exists within the search horizon.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no occurrence within {horizon_days} days after {reference}")]
pub struct UnsatisfiableScheduleError {
    /// The instant the search started from.
    pub reference: DateTime<Utc>,
    /// The horizon that was exhausted, in days.
    pub horizon_days: i64,
}

/// Errors from occurrence resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Unsatisfiable(#[from] UnsatisfiableScheduleError),

    /// A calendar produced coordinates outside a unit's domain.
    #[error("calendar coordinate out of domain: {0}")]
    Domain(#[from] DomainError),
}

/// The smallest minute-aligned instant strictly after `reference` that
/// `interval` matches, searching no further than `reference + horizon`.
pub fn resolve_next(
    interval: &Interval,
    reference: DateTime<Utc>,
    horizon: Duration,
    calendar: &dyn Calendar,
) -> Result<DateTime<Utc>, ResolveError> {
    let deadline = reference + horizon;
    let unsatisfiable = || UnsatisfiableScheduleError {
        reference,
        horizon_days: horizon.num_days(),
    };

    // Occurrences are minute-aligned, so the first candidate is the start of
    // the minute after the reference.
    let mut cursor = minute_floor(reference) + Duration::minutes(1);

    while cursor <= deadline {
        let coords = calendar.coordinates(cursor);

        if !interval.date_matches(&coords)? {
            cursor = calendar.next_day_start(cursor);
            continue;
        }

        if let Some(found) = next_in_day(interval, cursor, coords.hour, coords.minute, calendar)? {
            if found > deadline {
                return Err(unsatisfiable().into());
            }
            // DST transitions can make a rebuilt wall time land before the
            // cursor; such instants are not after the reference.
            if found >= cursor {
                return Ok(found);
            }
        }

        cursor = calendar.next_day_start(cursor);
    }

    Err(unsatisfiable().into())
}

/// The next `n` occurrences after `reference`, each resolved from the one
/// before it with the same horizon.
pub fn resolve_next_n(
    interval: &Interval,
    reference: DateTime<Utc>,
    n: usize,
    horizon: Duration,
    calendar: &dyn Calendar,
) -> Result<Vec<DateTime<Utc>>, ResolveError> {
    let mut occurrences = Vec::with_capacity(n);
    let mut from = reference;
    for _ in 0..n {
        let next = resolve_next(interval, from, horizon, calendar)?;
        occurrences.push(next);
        from = next;
    }
    Ok(occurrences)
}

/// First matching instant on the cursor's local day at or after
/// `cursor_hour:cursor_minute`. The date coordinates are already known to
/// match.
fn next_in_day(
    interval: &Interval,
    cursor: DateTime<Utc>,
    cursor_hour: u32,
    cursor_minute: u32,
    calendar: &dyn Calendar,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    // The cursor's own hour first: the cursor minute itself is a valid
    // candidate (the caller already stepped past the reference).
    if interval.hours().matches(cursor_hour)? {
        let minute = if interval.minutes().matches(cursor_minute)? {
            Some(cursor_minute)
        } else {
            interval.minutes().next_after(cursor_minute)
        };
        if let Some(m) = minute {
            if let Some(t) = calendar.with_time(cursor, cursor_hour, m) {
                return Ok(Some(t));
            }
        }
    }

    // Later hours start from the first matching minute.
    let mut hour = interval.hours().next_after(cursor_hour);
    while let Some(h) = hour {
        match interval.minutes().first_match() {
            // with_time is None inside a DST gap; try the next hour.
            Some(m) => {
                if let Some(t) = calendar.with_time(cursor, h, m) {
                    return Ok(Some(t));
                }
            }
            None => break,
        }
        hour = interval.hours().next_after(h);
    }

    Ok(None)
}

fn minute_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp().div_euclid(60) * 60;
    DateTime::from_timestamp(secs, 0).unwrap_or(t)
}
