//! End-to-end occurrence resolution scenarios through the public API.

use chrono::{DateTime, Duration, Utc};
use reprise::testing::{every_n_minutes, instant, month_end_interval, weekly_interval};
use reprise::{
    default_horizon, resolve_next, resolve_next_n, ConfigError, Interval, ResolveError,
    SpecifierKind, ZonedCalendar,
};

fn next_utc(interval: &Interval, reference: DateTime<Utc>) -> DateTime<Utc> {
    resolve_next(interval, reference, default_horizon(), &ZonedCalendar::utc()).unwrap()
}

#[tokio::test]
async fn test_unconstrained_interval_fires_every_minute() {
    let interval = Interval::any();
    assert_eq!(
        next_utc(&interval, instant("2024-01-01T08:00:00Z")),
        instant("2024-01-01T08:01:00Z")
    );
}

#[tokio::test]
async fn test_first_minute_of_nine_oclock() {
    // Minute rule Nth(0), hour rule [9]: from 08:00 the next match is 09:00
    // the same day.
    let interval = Interval::builder()
        .minutes(SpecifierKind::Nth(0))
        .hours(SpecifierKind::ExplicitList(vec![9]))
        .build()
        .unwrap();
    assert_eq!(
        next_utc(&interval, instant("2024-01-01T08:00:00Z")),
        instant("2024-01-01T09:00:00Z")
    );
}

#[tokio::test]
async fn test_sixth_of_each_month() {
    // Monthday 5 is zero-based, so the sixth calendar day.
    let interval = Interval::builder()
        .monthdays(SpecifierKind::ExplicitList(vec![5]))
        .hours(SpecifierKind::ExplicitList(vec![1]))
        .minutes(SpecifierKind::ExplicitList(vec![0]))
        .build()
        .unwrap();
    let occurrences = resolve_next_n(
        &interval,
        instant("2024-01-01T00:00:00Z"),
        3,
        default_horizon(),
        &ZonedCalendar::utc(),
    )
    .unwrap();
    assert_eq!(
        occurrences,
        vec![
            instant("2024-01-06T01:00:00Z"),
            instant("2024-02-06T01:00:00Z"),
            instant("2024-03-06T01:00:00Z"),
        ]
    );
}

#[tokio::test]
async fn test_impossible_date_is_unsatisfiable() {
    // February 30th never exists.
    let interval = Interval::builder()
        .months(SpecifierKind::ExplicitList(vec![1]))
        .monthdays(SpecifierKind::ExplicitList(vec![29]))
        .build()
        .unwrap();
    let err = resolve_next(
        &interval,
        instant("2024-01-01T00:00:00Z"),
        default_horizon(),
        &ZonedCalendar::utc(),
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::Unsatisfiable(_)));
}

#[tokio::test]
async fn test_zero_step_rejected_before_any_search() {
    let result = Interval::builder()
        .minutes(SpecifierKind::EveryNth { step: 0, offset: 0 })
        .build();
    assert_eq!(result.unwrap_err(), ConfigError::ZeroStep);
}

#[tokio::test]
async fn test_step_one_equals_all() {
    let stepped = Interval::builder()
        .minutes(SpecifierKind::EveryNth { step: 1, offset: 0 })
        .build()
        .unwrap();
    let all = Interval::any();

    let cal = ZonedCalendar::utc();
    let reference = instant("2024-03-14T15:09:00Z");
    let a = resolve_next_n(&stepped, reference, 10, default_horizon(), &cal).unwrap();
    let b = resolve_next_n(&all, reference, 10, default_horizon(), &cal).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_occurrences_are_strictly_increasing_and_match() {
    let cal = ZonedCalendar::utc();
    let intervals = vec![
        every_n_minutes(7),
        weekly_interval(vec![1, 3], 6, 15),
        month_end_interval(23, 0),
        Interval::daily(0, 0).unwrap(),
    ];
    let reference = instant("2024-05-01T12:00:00Z");

    for interval in intervals {
        let occurrences =
            resolve_next_n(&interval, reference, 8, default_horizon(), &cal).unwrap();
        assert!(occurrences[0] > reference);
        for pair in occurrences.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for t in &occurrences {
            assert!(interval.matches(*t, &cal).unwrap());
        }
    }
}

#[tokio::test]
async fn test_month_end_tracks_calendar_length() {
    let occurrences = resolve_next_n(
        &month_end_interval(12, 0),
        instant("2024-01-01T00:00:00Z"),
        4,
        default_horizon(),
        &ZonedCalendar::utc(),
    )
    .unwrap();
    assert_eq!(
        occurrences,
        vec![
            instant("2024-01-31T12:00:00Z"),
            instant("2024-02-29T12:00:00Z"),
            instant("2024-03-31T12:00:00Z"),
            instant("2024-04-30T12:00:00Z"),
        ]
    );
}

#[tokio::test]
async fn test_first_iso_week_only() {
    let interval = Interval::builder()
        .weeks(SpecifierKind::ExplicitList(vec![0]))
        .hours(SpecifierKind::ExplicitList(vec![0]))
        .minutes(SpecifierKind::ExplicitList(vec![0]))
        .build()
        .unwrap();
    // ISO week 1 of 2025 starts Monday 2024-12-30.
    let found = next_utc(&interval, instant("2024-12-01T00:00:00Z"));
    assert_eq!(found, instant("2024-12-30T00:00:00Z"));
}

#[tokio::test]
async fn test_short_horizon_reports_unsatisfiable() {
    let interval = Interval::builder()
        .months(SpecifierKind::ExplicitList(vec![11]))
        .monthdays(SpecifierKind::ExplicitList(vec![24]))
        .build()
        .unwrap();
    // Searching only a week in June cannot reach December 25th.
    let err = resolve_next(
        &interval,
        instant("2024-06-01T00:00:00Z"),
        Duration::days(7),
        &ZonedCalendar::utc(),
    )
    .unwrap_err();
    match err {
        ResolveError::Unsatisfiable(e) => {
            assert_eq!(e.reference, instant("2024-06-01T00:00:00Z"));
            assert_eq!(e.horizon_days, 7);
        }
        other => panic!("expected unsatisfiable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zoned_resolution_differs_from_utc() {
    let utc = ZonedCalendar::utc();
    let tokyo = ZonedCalendar::from_name("Asia/Tokyo").unwrap();
    let interval = Interval::daily(9, 0).unwrap();
    // 2024-01-09 21:00 JST.
    let reference = instant("2024-01-09T12:00:00Z");

    let in_utc = resolve_next(&interval, reference, default_horizon(), &utc).unwrap();
    let in_tokyo = resolve_next(&interval, reference, default_horizon(), &tokyo).unwrap();
    assert_eq!(in_utc, instant("2024-01-10T09:00:00Z"));
    // 09:00 JST is midnight UTC.
    assert_eq!(in_tokyo, instant("2024-01-10T00:00:00Z"));
}
