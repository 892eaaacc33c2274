//! Recurrence intervals.
//!
//! An [`Interval`] constrains when something may run by AND-ing six
//! per-unit [`Specifier`]s: minute, hour, weekday, monthday, ISO week, and
//! month. An instant matches when every unit matches its coordinate.

use serde::{Deserialize, Serialize};

use super::calendar::{Calendar, Coordinates};
use super::specifier::{ConfigError, DomainError, Specifier, SpecifierKind};

/// Canonical `(min, max)` ranges of the six units.
pub const MINUTE_RANGE: (u32, u32) = (0, 59);
pub const HOUR_RANGE: (u32, u32) = (0, 23);
pub const WEEKDAY_RANGE: (u32, u32) = (0, 6);
pub const MONTHDAY_RANGE: (u32, u32) = (0, 31);
pub const WEEK_RANGE: (u32, u32) = (0, 52);
pub const MONTH_RANGE: (u32, u32) = (0, 11);

/// A conjunction of six per-unit rules.
///
/// Monthday rules are calendar-clamped: `Last` and `BackNth` resolve against
/// the true length of the month an instant falls in, not the static range
/// end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    minutes: Specifier,
    hours: Specifier,
    weekdays: Specifier,
    monthdays: Specifier,
    weeks: Specifier,
    months: Specifier,
}

impl Interval {
    /// Start building an interval. Every unit defaults to `All`.
    pub fn builder() -> IntervalBuilder {
        IntervalBuilder::new()
    }

    /// An interval matching every minute of every day.
    pub fn any() -> Self {
        // All-kind specifiers over the canonical ranges cannot fail.
        IntervalBuilder::new()
            .build()
            .unwrap_or_else(|_| unreachable!("all-kind units are always valid"))
    }

    /// Every day at `hour:minute`.
    pub fn daily(hour: u32, minute: u32) -> Result<Self, ConfigError> {
        IntervalBuilder::new()
            .hours(SpecifierKind::ExplicitList(vec![hour]))
            .minutes(SpecifierKind::ExplicitList(vec![minute]))
            .build()
    }

    /// Every hour at the given minute.
    pub fn hourly(minute: u32) -> Result<Self, ConfigError> {
        IntervalBuilder::new()
            .minutes(SpecifierKind::ExplicitList(vec![minute]))
            .build()
    }

    pub fn minutes(&self) -> &Specifier {
        &self.minutes
    }

    pub fn hours(&self) -> &Specifier {
        &self.hours
    }

    pub fn weekdays(&self) -> &Specifier {
        &self.weekdays
    }

    pub fn monthdays(&self) -> &Specifier {
        &self.monthdays
    }

    pub fn weeks(&self) -> &Specifier {
        &self.weeks
    }

    pub fn months(&self) -> &Specifier {
        &self.months
    }

    /// Check whether `instant` satisfies all six units under `calendar`.
    pub fn matches(
        &self,
        instant: chrono::DateTime<chrono::Utc>,
        calendar: &dyn Calendar,
    ) -> Result<bool, DomainError> {
        let coords = calendar.coordinates(instant);
        Ok(self.date_matches(&coords)?
            && self.hours.matches(coords.hour)?
            && self.minutes.matches(coords.minute)?)
    }

    /// The date-level units only: weekday, monthday, week, and month.
    ///
    /// The resolver uses this to skip whole days before looking at times.
    pub fn date_matches(&self, coords: &Coordinates) -> Result<bool, DomainError> {
        let last_monthday = coords.days_in_month.saturating_sub(1);
        Ok(self.weekdays.matches(coords.weekday)?
            && self.monthdays.matches_within(coords.monthday, last_monthday)?
            && self.weeks.matches(coords.week)?
            && self.months.matches(coords.month)?)
    }

    /// Re-validate after deserialization.
    ///
    /// Serde bypasses [`Specifier::new`], so a hand-edited or corrupted file
    /// could smuggle in bad ranges or parameters. Rebuilding each unit runs
    /// the constructor checks again.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (unit, spec, range) in [
            ("minutes", &self.minutes, MINUTE_RANGE),
            ("hours", &self.hours, HOUR_RANGE),
            ("weekdays", &self.weekdays, WEEKDAY_RANGE),
            ("monthdays", &self.monthdays, MONTHDAY_RANGE),
            ("weeks", &self.weeks, WEEK_RANGE),
            ("months", &self.months, MONTH_RANGE),
        ] {
            if (spec.min(), spec.max()) != range {
                return Err(ConfigError::UnitRange {
                    unit,
                    min: spec.min(),
                    max: spec.max(),
                    expected_min: range.0,
                    expected_max: range.1,
                });
            }
            Specifier::new(spec.min(), spec.max(), spec.kind().clone())?;
        }
        Ok(())
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::any()
    }
}

/// Builder for [`Interval`] with per-unit setters.
///
/// Units left unset default to `All`. Validation happens in [`build`];
/// setters only record the requested kind.
///
/// [`build`]: IntervalBuilder::build
#[derive(Debug, Clone, Default)]
pub struct IntervalBuilder {
    minutes: Option<SpecifierKind>,
    hours: Option<SpecifierKind>,
    weekdays: Option<SpecifierKind>,
    monthdays: Option<SpecifierKind>,
    weeks: Option<SpecifierKind>,
    months: Option<SpecifierKind>,
}

impl IntervalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minute-of-hour rule.
    pub fn minutes(mut self, kind: SpecifierKind) -> Self {
        self.minutes = Some(kind);
        self
    }

    /// Set the hour-of-day rule.
    pub fn hours(mut self, kind: SpecifierKind) -> Self {
        self.hours = Some(kind);
        self
    }

    /// Set the weekday rule (0 = Monday).
    pub fn weekdays(mut self, kind: SpecifierKind) -> Self {
        self.weekdays = Some(kind);
        self
    }

    /// Set the day-of-month rule (zero-based).
    pub fn monthdays(mut self, kind: SpecifierKind) -> Self {
        self.monthdays = Some(kind);
        self
    }

    /// Set the ISO-week rule (zero-based).
    pub fn weeks(mut self, kind: SpecifierKind) -> Self {
        self.weeks = Some(kind);
        self
    }

    /// Set the month rule (0 = January).
    pub fn months(mut self, kind: SpecifierKind) -> Self {
        self.months = Some(kind);
        self
    }

    /// Validate every unit and build the interval.
    pub fn build(self) -> Result<Interval, ConfigError> {
        let unit = |kind: Option<SpecifierKind>, range: (u32, u32)| {
            Specifier::new(range.0, range.1, kind.unwrap_or(SpecifierKind::All))
        };
        Ok(Interval {
            minutes: unit(self.minutes, MINUTE_RANGE)?,
            hours: unit(self.hours, HOUR_RANGE)?,
            weekdays: unit(self.weekdays, WEEKDAY_RANGE)?,
            monthdays: unit(self.monthdays, MONTHDAY_RANGE)?,
            weeks: unit(self.weeks, WEEK_RANGE)?,
            months: unit(self.months, MONTH_RANGE)?,
        })
    }
}
