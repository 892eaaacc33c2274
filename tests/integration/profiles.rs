//! Profile lifecycle against the directory store.

use reprise::testing::{instant, profile_fixture};
use reprise::{
    load_profiles_from_directory, Interval, JsonDirStore, ProfileConfig, ProfileStore,
    SpecifierKind, StorageError, ZonedCalendar,
};
use tempfile::tempdir;

#[tokio::test]
async fn test_profile_survives_disk_round_trip() {
    let dir = tempdir().unwrap();
    let store = JsonDirStore::new(dir.path()).unwrap();
    let profile = profile_fixture("documents");

    store.save_profile(profile.clone()).await.unwrap();

    let loaded = load_profiles_from_directory(dir.path()).await.unwrap();
    assert_eq!(loaded, vec![profile]);
}

#[tokio::test]
async fn test_reschedule_is_persisted() {
    let dir = tempdir().unwrap();
    let store = JsonDirStore::new(dir.path()).unwrap();
    let cal = ZonedCalendar::utc();
    let mut profile = profile_fixture("documents");
    store.save_profile(profile.clone()).await.unwrap();

    let due = profile.next_backup();
    let next = profile.reschedule(due, &cal).unwrap();
    store.update_profile(profile.clone()).await.unwrap();

    let reloaded = store.get_profile(profile.id()).await.unwrap();
    assert_eq!(reloaded.next_backup(), next);
    assert!(next > due);
}

#[tokio::test]
async fn test_save_validated_rejects_unsatisfiable_interval() {
    let dir = tempdir().unwrap();
    let store = JsonDirStore::new(dir.path()).unwrap();
    let cal = ZonedCalendar::utc();

    // Smuggle a February 30th interval past the builder via serde, the same
    // way a hand-edited profile file would.
    let feb_30 = Interval::builder()
        .months(SpecifierKind::ExplicitList(vec![1]))
        .monthdays(SpecifierKind::ExplicitList(vec![29]))
        .build()
        .unwrap();
    let mut json = serde_json::to_value(profile_fixture("doomed")).unwrap();
    json["interval"] = serde_json::to_value(&feb_30).unwrap();
    let profile: ProfileConfig = serde_json::from_value(json).unwrap();

    let err = store
        .save_validated(profile, instant("2024-01-01T00:00:00Z"), &cal)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ScheduleRejected(_)));
    assert!(load_profiles_from_directory(dir.path())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_corrupt_specifier_fails_strict_load() {
    let dir = tempdir().unwrap();
    let store = JsonDirStore::new(dir.path()).unwrap();
    let profile = profile_fixture("documents");
    store.save_profile(profile.clone()).await.unwrap();

    // Corrupt the stored minute rule into a zero step.
    let path = dir.path().join(format!("{}.json", profile.id()));
    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json["interval"]["minutes"]["kind"] = serde_json::json!({
        "EveryNth": { "step": 0, "offset": 0 }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let err = load_profiles_from_directory(dir.path()).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidProfile(_)));
}

#[tokio::test]
async fn test_interval_edit_round_trips() {
    let dir = tempdir().unwrap();
    let store = JsonDirStore::new(dir.path()).unwrap();
    let cal = ZonedCalendar::utc();
    let mut profile = profile_fixture("documents");
    store.save_profile(profile.clone()).await.unwrap();

    profile
        .set_interval(
            Interval::hourly(45).unwrap(),
            instant("2024-01-01T08:00:00Z"),
            &cal,
        )
        .unwrap();
    store.update_profile(profile.clone()).await.unwrap();

    let reloaded = store.get_profile(profile.id()).await.unwrap();
    assert_eq!(reloaded.next_backup(), instant("2024-01-01T08:45:00Z"));
    assert_eq!(reloaded.interval(), profile.interval());
}
