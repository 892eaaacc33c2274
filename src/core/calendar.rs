//! Calendar decomposition of instants.
//!
//! The recurrence engine never does date arithmetic itself; it asks a
//! [`Calendar`] to break an instant into per-unit coordinates and to build
//! instants back from a date and a wall time. Swapping the calendar swaps the
//! timezone (and, in tests, lets coordinates be fabricated directly).

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors from calendar construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// The timezone name is not in the tz database.
    #[error("unknown timezone: {0}")]
    UnknownZone(String),
}

/// The six recurrence coordinates of an instant, plus the length of the
/// month it falls in.
///
/// All values are zero-based: `weekday` counts from Monday, `monthday` from
/// the first of the month, `week` is the ISO week minus one, `month` from
/// January.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub minute: u32,
    pub hour: u32,
    pub weekday: u32,
    pub monthday: u32,
    pub week: u32,
    pub month: u32,
    /// Days in the containing month (28 to 31). Lets `Last`-style monthday
    /// rules track the real month end.
    pub days_in_month: u32,
}

/// Decomposes instants into [`Coordinates`] and rebuilds instants from
/// date/time parts, all under one fixed timezone.
pub trait Calendar: Send + Sync {
    /// The coordinates of `instant` in this calendar's timezone.
    fn coordinates(&self, instant: DateTime<Utc>) -> Coordinates;

    /// The first valid instant of the local day after the one containing
    /// `instant`.
    fn next_day_start(&self, instant: DateTime<Utc>) -> DateTime<Utc>;

    /// The instant at `hour:minute` on the local day containing `instant`.
    ///
    /// Returns `None` when that wall time does not exist (DST spring-forward
    /// gap); an ambiguous wall time resolves to its earlier occurrence.
    fn with_time(&self, instant: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>>;
}

/// A [`Calendar`] over a tz-database timezone, ISO-8601 weeks, Monday-start.
#[derive(Debug, Clone, Copy)]
pub struct ZonedCalendar {
    tz: Tz,
}

impl ZonedCalendar {
    /// Create a calendar for the given timezone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Create a calendar from a tz-database name such as `Europe/Berlin`.
    pub fn from_name(name: &str) -> Result<Self, CalendarError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| CalendarError::UnknownZone(name.to_string()))
    }

    /// The default calendar: UTC.
    pub fn utc() -> Self {
        Self::new(chrono_tz::UTC)
    }

    /// The timezone this calendar evaluates in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    fn instant_at(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }
}

impl Default for ZonedCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar for ZonedCalendar {
    fn coordinates(&self, instant: DateTime<Utc>) -> Coordinates {
        let local = instant.with_timezone(&self.tz);
        Coordinates {
            minute: local.minute(),
            hour: local.hour(),
            weekday: local.weekday().num_days_from_monday(),
            monthday: local.day0(),
            week: local.iso_week().week0(),
            month: local.month0(),
            days_in_month: days_in_month(local.year(), local.month0()),
        }
    }

    fn next_day_start(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let next = self.local_date(instant) + Days::new(1);
        // Midnight can fall in a DST gap in a few zones; take the first hour
        // that exists.
        for hour in 0..24 {
            if let Some(dt) = self.instant_at(next, hour, 0) {
                return dt;
            }
        }
        instant + chrono::Duration::days(1)
    }

    fn with_time(&self, instant: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        self.instant_at(self.local_date(instant), hour, minute)
    }
}

/// Length of a zero-based month in the proleptic Gregorian calendar.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    match month0 {
        3 | 5 | 8 | 10 => 30,
        1 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}
