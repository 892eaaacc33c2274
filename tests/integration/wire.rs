//! Wire-format compatibility through the public encode/decode API.

use reprise::testing::instant;
use reprise::wire::{interval_to_pb, pb_to_interval, IntervalPb, SpecifierKindPb, SpecifierPb};
use reprise::{
    decode_profile, encode_profile, ConfigError, Interval, ProfileConfig, SpecifierKind,
    WireError, ZonedCalendar,
};

fn sample_profile() -> ProfileConfig {
    let interval = Interval::builder()
        .minutes(SpecifierKind::ExplicitList(vec![0, 15, 30, 45]))
        .hours(SpecifierKind::EveryNth { step: 6, offset: 1 })
        .monthdays(SpecifierKind::BackNth(1))
        .build()
        .unwrap();
    ProfileConfig::builder("media")
        .target_dir("/backups/media")
        .include_dir("/home/user/pictures")
        .include_file("/home/user/.config/media.toml")
        .exclude_dir("/home/user/pictures/thumbnails")
        .interval(interval)
        .build(instant("2024-01-01T00:00:00Z"), &ZonedCalendar::utc())
        .unwrap()
}

#[tokio::test]
async fn test_round_trip_with_same_reference_is_identity() {
    let cal = ZonedCalendar::utc();
    let profile = sample_profile();
    let bytes = encode_profile(&profile);
    let back = decode_profile(&bytes, instant("2024-01-01T00:00:00Z"), &cal).unwrap();
    assert_eq!(profile, back);
}

#[tokio::test]
async fn test_decode_resolves_schedule_from_given_reference() {
    let cal = ZonedCalendar::utc();
    let profile = sample_profile();
    let bytes = encode_profile(&profile);

    // next_backup is not on the wire; it is derived from the reference.
    let later = decode_profile(&bytes, instant("2024-06-01T00:00:00Z"), &cal).unwrap();
    assert_ne!(later.next_backup(), profile.next_backup());
    assert!(later.next_backup() > instant("2024-06-01T00:00:00Z"));
    assert_eq!(later.interval(), profile.interval());
    assert_eq!(later.id(), profile.id());
}

#[tokio::test]
async fn test_absent_units_match_everything() {
    let pb = IntervalPb {
        hours: Some(SpecifierPb {
            kind: SpecifierKindPb::ExplicitList as i32,
            values: vec![4],
        }),
        ..Default::default()
    };
    let interval = pb_to_interval(pb).unwrap();
    let cal = ZonedCalendar::utc();
    assert!(interval
        .matches(instant("2024-07-19T04:37:00Z"), &cal)
        .unwrap());
    assert!(!interval
        .matches(instant("2024-07-19T05:00:00Z"), &cal)
        .unwrap());
}

#[tokio::test]
async fn test_wire_specifiers_are_revalidated_on_decode() {
    // A corrupted message carrying an out-of-range hour must not decode.
    let mut pb = interval_to_pb(sample_profile().interval());
    pb.hours = Some(SpecifierPb {
        kind: SpecifierKindPb::ExplicitList as i32,
        values: vec![99],
    });
    let err = pb_to_interval(pb).unwrap_err();
    assert!(matches!(err, WireError::Config(ConfigError::EmptyList)));
}

#[tokio::test]
async fn test_decode_rejects_unsatisfiable_schedule() {
    let cal = ZonedCalendar::utc();
    let feb_30 = Interval::builder()
        .months(SpecifierKind::ExplicitList(vec![1]))
        .monthdays(SpecifierKind::ExplicitList(vec![29]))
        .build()
        .unwrap();
    let profile = ProfileConfig::builder("doomed")
        .target_dir("/backups/doomed")
        .build(instant("2024-01-01T00:00:00Z"), &cal)
        .unwrap();

    // Splice the impossible interval into the wire message by hand.
    let bytes = {
        use prost::Message;
        let decoded = reprise::wire::ProfilePb::decode(encode_profile(&profile).as_slice()).unwrap();
        reprise::wire::ProfilePb {
            interval: Some(interval_to_pb(&feb_30)),
            ..decoded
        }
        .encode_to_vec()
    };

    let err = decode_profile(&bytes, instant("2024-01-01T00:00:00Z"), &cal).unwrap_err();
    assert!(matches!(err, WireError::Schedule(_)));
}
