//! Protobuf wire format for profiles.
//!
//! Messages are defined directly with prost derives; field numbers are part
//! of the compatibility contract and must never be renumbered. Scalar
//! profile fields sit in the 1..15 one-byte-tag range, path lists start at
//! 16, and the interval lives at 32, leaving room for either group to grow.
//!
//! `next_backup` is deliberately not on the wire: it is derived state, and
//! decoding re-resolves it so an imported profile re-enters the system with
//! the always-valid-schedule invariant intact.

use chrono::{DateTime, Utc};
use prost::Message;
use thiserror::Error;
use uuid::Uuid;

use crate::core::calendar::Calendar;
use crate::core::interval::Interval;
use crate::core::profile::{ProfileConfig, ProfileError};
use crate::core::resolver::ResolveError;
use crate::core::specifier::{ConfigError, Specifier, SpecifierKind};
use crate::core::types::ProfileId;

/// Errors from encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The kind discriminant is outside the known enum.
    #[error("unknown specifier kind {0}")]
    UnknownKind(i32),

    /// A kind's parameter values are missing or short.
    #[error("{kind} specifier requires {expected} value(s), got {got}")]
    ShortValues {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    /// A required field is absent.
    #[error("profile is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid profile uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Decoded specifier parameters fail construction checks.
    #[error("invalid specifier: {0}")]
    Config(#[from] ConfigError),

    /// The decoded profile's schedule has no next occurrence.
    #[error("schedule rejected: {0}")]
    Schedule(#[from] ResolveError),
}

/// Wire form of a [`SpecifierKind`] discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum SpecifierKindPb {
    None = 0,
    All = 1,
    First = 2,
    Last = 3,
    Nth = 4,
    BackNth = 5,
    ExplicitNths = 6,
    EveryNth = 7,
    ExplicitList = 8,
}

/// Wire form of a per-unit rule: a kind plus kind-dependent values.
///
/// `values` holds `[n]` for `Nth`/`BackNth`, `[step, offset]` for
/// `EveryNth`, the positions for `ExplicitNths`, the members for
/// `ExplicitList`, and is empty otherwise.
#[derive(Clone, PartialEq, Message)]
pub struct SpecifierPb {
    #[prost(enumeration = "SpecifierKindPb", tag = "1")]
    pub kind: i32,
    #[prost(uint32, repeated, tag = "2")]
    pub values: Vec<u32>,
}

/// Wire form of an [`Interval`]. An absent unit decodes as `None`, which
/// matches everything.
#[derive(Clone, PartialEq, Message)]
pub struct IntervalPb {
    #[prost(message, optional, tag = "1")]
    pub minutes: Option<SpecifierPb>,
    #[prost(message, optional, tag = "2")]
    pub hours: Option<SpecifierPb>,
    #[prost(message, optional, tag = "3")]
    pub weekdays: Option<SpecifierPb>,
    #[prost(message, optional, tag = "4")]
    pub monthdays: Option<SpecifierPb>,
    #[prost(message, optional, tag = "5")]
    pub weeks: Option<SpecifierPb>,
    #[prost(message, optional, tag = "6")]
    pub months: Option<SpecifierPb>,
}

/// Wire form of a [`ProfileConfig`].
#[derive(Clone, PartialEq, Message)]
pub struct ProfilePb {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub uuid: String,
    #[prost(string, tag = "3")]
    pub target_dir: String,
    #[prost(string, repeated, tag = "16")]
    pub files_to_include: Vec<String>,
    #[prost(string, repeated, tag = "17")]
    pub dirs_to_include: Vec<String>,
    #[prost(string, repeated, tag = "18")]
    pub files_to_exclude: Vec<String>,
    #[prost(string, repeated, tag = "19")]
    pub dirs_to_exclude: Vec<String>,
    #[prost(message, optional, tag = "32")]
    pub interval: Option<IntervalPb>,
}

/// Encode a profile to wire bytes.
pub fn encode_profile(profile: &ProfileConfig) -> Vec<u8> {
    profile_to_pb(profile).encode_to_vec()
}

/// Decode a profile from wire bytes.
///
/// The schedule is re-resolved from `reference` under `calendar`, so the
/// result carries a fresh, valid `next_backup` or the decode fails.
pub fn decode_profile(
    bytes: &[u8],
    reference: DateTime<Utc>,
    calendar: &dyn Calendar,
) -> Result<ProfileConfig, WireError> {
    let pb = ProfilePb::decode(bytes)?;
    pb_to_profile(pb, reference, calendar)
}

fn profile_to_pb(profile: &ProfileConfig) -> ProfilePb {
    let paths = |ps: &[std::path::PathBuf]| {
        ps.iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    };
    ProfilePb {
        name: profile.name().to_string(),
        uuid: profile.id().to_string(),
        target_dir: profile.target_dir().to_string_lossy().into_owned(),
        files_to_include: paths(profile.files_to_include()),
        dirs_to_include: paths(profile.dirs_to_include()),
        files_to_exclude: paths(profile.files_to_exclude()),
        dirs_to_exclude: paths(profile.dirs_to_exclude()),
        interval: Some(interval_to_pb(profile.interval())),
    }
}

fn pb_to_profile(
    pb: ProfilePb,
    reference: DateTime<Utc>,
    calendar: &dyn Calendar,
) -> Result<ProfileConfig, WireError> {
    if pb.name.is_empty() {
        return Err(WireError::MissingField("name"));
    }
    if pb.target_dir.is_empty() {
        return Err(WireError::MissingField("target_dir"));
    }
    let uuid: Uuid = pb.uuid.parse()?;
    let interval = match pb.interval {
        Some(interval) => pb_to_interval(interval)?,
        None => Interval::any(),
    };

    let mut builder = ProfileConfig::builder(pb.name)
        .id(ProfileId::from_uuid(uuid))
        .target_dir(pb.target_dir)
        .interval(interval);
    for p in pb.files_to_include {
        builder = builder.include_file(p);
    }
    for p in pb.dirs_to_include {
        builder = builder.include_dir(p);
    }
    for p in pb.files_to_exclude {
        builder = builder.exclude_file(p);
    }
    for p in pb.dirs_to_exclude {
        builder = builder.exclude_dir(p);
    }

    builder.build(reference, calendar).map_err(|e| match e {
        ProfileError::Schedule(e) => WireError::Schedule(e),
        ProfileError::Config(e) => WireError::Config(e),
        ProfileError::MissingName => WireError::MissingField("name"),
        ProfileError::MissingTarget => WireError::MissingField("target_dir"),
    })
}

/// Encode an interval with all six units present.
pub fn interval_to_pb(interval: &Interval) -> IntervalPb {
    IntervalPb {
        minutes: Some(specifier_to_pb(interval.minutes())),
        hours: Some(specifier_to_pb(interval.hours())),
        weekdays: Some(specifier_to_pb(interval.weekdays())),
        monthdays: Some(specifier_to_pb(interval.monthdays())),
        weeks: Some(specifier_to_pb(interval.weeks())),
        months: Some(specifier_to_pb(interval.months())),
    }
}

/// Rebuild an interval, running full construction validation per unit.
pub fn pb_to_interval(pb: IntervalPb) -> Result<Interval, WireError> {
    let kind = |field: Option<SpecifierPb>| -> Result<SpecifierKind, WireError> {
        match field {
            Some(pb) => pb_to_kind(pb),
            None => Ok(SpecifierKind::None),
        }
    };
    Ok(Interval::builder()
        .minutes(kind(pb.minutes)?)
        .hours(kind(pb.hours)?)
        .weekdays(kind(pb.weekdays)?)
        .monthdays(kind(pb.monthdays)?)
        .weeks(kind(pb.weeks)?)
        .months(kind(pb.months)?)
        .build()?)
}

fn specifier_to_pb(specifier: &Specifier) -> SpecifierPb {
    let (kind, values) = match specifier.kind() {
        SpecifierKind::None => (SpecifierKindPb::None, Vec::new()),
        SpecifierKind::All => (SpecifierKindPb::All, Vec::new()),
        SpecifierKind::First => (SpecifierKindPb::First, Vec::new()),
        SpecifierKind::Last => (SpecifierKindPb::Last, Vec::new()),
        SpecifierKind::Nth(n) => (SpecifierKindPb::Nth, vec![*n]),
        SpecifierKind::BackNth(n) => (SpecifierKindPb::BackNth, vec![*n]),
        SpecifierKind::ExplicitNths(ps) => (SpecifierKindPb::ExplicitNths, ps.clone()),
        SpecifierKind::EveryNth { step, offset } => {
            (SpecifierKindPb::EveryNth, vec![*step, *offset])
        }
        SpecifierKind::ExplicitList(vs) => (SpecifierKindPb::ExplicitList, vs.clone()),
    };
    SpecifierPb {
        kind: kind as i32,
        values,
    }
}

fn pb_to_kind(pb: SpecifierPb) -> Result<SpecifierKind, WireError> {
    let kind =
        SpecifierKindPb::try_from(pb.kind).map_err(|_| WireError::UnknownKind(pb.kind))?;
    let one = |kind: &'static str, values: &[u32]| {
        values.first().copied().ok_or(WireError::ShortValues {
            kind,
            expected: 1,
            got: 0,
        })
    };
    Ok(match kind {
        SpecifierKindPb::None => SpecifierKind::None,
        SpecifierKindPb::All => SpecifierKind::All,
        SpecifierKindPb::First => SpecifierKind::First,
        SpecifierKindPb::Last => SpecifierKind::Last,
        SpecifierKindPb::Nth => SpecifierKind::Nth(one("nth", &pb.values)?),
        SpecifierKindPb::BackNth => SpecifierKind::BackNth(one("back-nth", &pb.values)?),
        SpecifierKindPb::ExplicitNths => SpecifierKind::ExplicitNths(pb.values),
        SpecifierKindPb::EveryNth => {
            if pb.values.len() < 2 {
                return Err(WireError::ShortValues {
                    kind: "every-nth",
                    expected: 2,
                    got: pb.values.len(),
                });
            }
            SpecifierKind::EveryNth {
                step: pb.values[0],
                offset: pb.values[1],
            }
        }
        SpecifierKindPb::ExplicitList => SpecifierKind::ExplicitList(pb.values),
    })
}
