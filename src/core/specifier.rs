//! Per-unit recurrence rules.
//!
//! A [`Specifier`] selects which integer positions within a bounded calendar
//! unit (minute-of-hour, day-of-month, ...) are legal occurrence points. The
//! nine rule variants live in [`SpecifierKind`]; matching is a pure function
//! over a validated rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a specifier's parameters are internally inconsistent.
///
/// These are detected at construction time, before any search begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `EveryNth` was given a step of zero.
    #[error("every-nth step must be at least 1")]
    ZeroStep,

    /// An explicit list specifier has no usable values.
    #[error("explicit specifier requires at least one in-range value")]
    EmptyList,

    /// An `Nth`/`BackNth` position falls outside the unit's range.
    #[error("position {position} is outside the range {min}..={max}")]
    PositionOutOfRange { position: u32, min: u32, max: u32 },

    /// A deserialized specifier does not cover its unit's canonical range.
    #[error("{unit} specifier covers {min}..={max}, expected {expected_min}..={expected_max}")]
    UnitRange {
        unit: &'static str,
        min: u32,
        max: u32,
        expected_min: u32,
        expected_max: u32,
    },
}

/// A coordinate handed to a matcher lies outside the declared unit bounds.
///
/// This indicates a caller or data defect, not a scheduling impossibility.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("value {value} is outside the domain {min}..={max}")]
pub struct DomainError {
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

/// The rule variants a specifier can apply to its range.
///
/// Positions in `Nth`, `BackNth`, and `ExplicitNths` are relative to the
/// range start; `ExplicitList` holds absolute coordinate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecifierKind {
    /// Unconstrained; matches every value. Synonym of `All`, kept as a
    /// distinct variant because absent wire fields decode to it.
    None,
    /// Matches every value in the range.
    All,
    /// Only the first value of the range.
    First,
    /// Only the last value of the range. For monthdays this tracks the true
    /// length of the month under evaluation.
    Last,
    /// The value `n` positions after the range start.
    Nth(u32),
    /// The value `n` positions before the range end.
    BackNth(u32),
    /// Values at the listed positions after the range start.
    ExplicitNths(Vec<u32>),
    /// Every `step`-th value, starting `offset` positions after the start.
    EveryNth { step: u32, offset: u32 },
    /// Exactly the listed absolute values.
    ExplicitList(Vec<u32>),
}

/// A validated rule over an inclusive integer range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    min: u32,
    max: u32,
    kind: SpecifierKind,
}

impl Specifier {
    /// Create a specifier, validating the rule against the range.
    ///
    /// List variants are filtered to the range, sorted, and deduplicated; a
    /// list with nothing left afterwards is rejected rather than silently
    /// matching nothing.
    pub fn new(min: u32, max: u32, kind: SpecifierKind) -> Result<Self, ConfigError> {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };

        let kind = match kind {
            SpecifierKind::EveryNth { step, .. } if step == 0 => {
                return Err(ConfigError::ZeroStep);
            }
            SpecifierKind::Nth(n) => {
                if min + n > max {
                    return Err(ConfigError::PositionOutOfRange {
                        position: min + n,
                        min,
                        max,
                    });
                }
                SpecifierKind::Nth(n)
            }
            SpecifierKind::BackNth(n) => {
                if n > max - min {
                    return Err(ConfigError::PositionOutOfRange {
                        position: n,
                        min,
                        max,
                    });
                }
                SpecifierKind::BackNth(n)
            }
            SpecifierKind::ExplicitNths(positions) => {
                let mut positions: Vec<u32> = positions
                    .into_iter()
                    .filter(|p| *p <= max - min)
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                if positions.is_empty() {
                    return Err(ConfigError::EmptyList);
                }
                SpecifierKind::ExplicitNths(positions)
            }
            SpecifierKind::ExplicitList(values) => {
                let mut values: Vec<u32> = values
                    .into_iter()
                    .filter(|v| *v >= min && *v <= max)
                    .collect();
                values.sort_unstable();
                values.dedup();
                if values.is_empty() {
                    return Err(ConfigError::EmptyList);
                }
                SpecifierKind::ExplicitList(values)
            }
            other => other,
        };

        Ok(Self { min, max, kind })
    }

    /// Range start.
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Range end (inclusive).
    pub fn max(&self) -> u32 {
        self.max
    }

    /// The rule variant.
    pub fn kind(&self) -> &SpecifierKind {
        &self.kind
    }

    /// Check whether `value` is matched by the rule.
    ///
    /// A value outside the declared range is a caller defect and reported as
    /// a [`DomainError`].
    pub fn matches(&self, value: u32) -> Result<bool, DomainError> {
        self.matches_within(value, self.max)
    }

    /// Check `value` against the rule with a lowered effective upper bound.
    ///
    /// Used for calendar-clamped units: `Last` and `BackNth` on monthdays
    /// resolve against `effective_max` (the true last day of the month being
    /// evaluated) instead of the static range end.
    pub fn matches_within(&self, value: u32, effective_max: u32) -> Result<bool, DomainError> {
        if value < self.min || value > self.max {
            return Err(DomainError {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(self.match_at(value, effective_max))
    }

    /// The smallest matching value, if the rule matches anything at all.
    ///
    /// Only `EveryNth` with an offset beyond the range can be empty; every
    /// other validated rule matches at least one value.
    pub fn first_match(&self) -> Option<u32> {
        self.first_match_within(self.max)
    }

    /// The smallest matching value not exceeding `effective_max`.
    pub fn first_match_within(&self, effective_max: u32) -> Option<u32> {
        let upper = effective_max.min(self.max);
        (self.min..=upper).find(|v| self.match_at(*v, upper))
    }

    /// The smallest matching value strictly greater than `value`.
    pub fn next_after(&self, value: u32) -> Option<u32> {
        self.next_after_within(value, self.max)
    }

    /// The smallest matching value in `(value, effective_max]`.
    pub fn next_after_within(&self, value: u32, effective_max: u32) -> Option<u32> {
        let upper = effective_max.min(self.max);
        (value.saturating_add(1)..=upper).find(|v| self.match_at(*v, upper))
    }

    /// Rule evaluation for an in-range value. Ranges are at most 60 wide, so
    /// the search helpers above scan candidates directly.
    fn match_at(&self, value: u32, effective_max: u32) -> bool {
        match &self.kind {
            SpecifierKind::None | SpecifierKind::All => true,
            SpecifierKind::First => value == self.min,
            SpecifierKind::Last => value == effective_max,
            SpecifierKind::Nth(n) => value == self.min + n,
            SpecifierKind::BackNth(n) => effective_max
                .checked_sub(*n)
                .is_some_and(|p| p >= self.min && p == value),
            SpecifierKind::ExplicitNths(positions) => {
                positions.binary_search(&(value - self.min)).is_ok()
            }
            SpecifierKind::EveryNth { step, offset } => {
                let base = self.min + offset;
                value >= base && (value - base) % step == 0
            }
            SpecifierKind::ExplicitList(values) => values.binary_search(&value).is_ok(),
        }
    }
}
