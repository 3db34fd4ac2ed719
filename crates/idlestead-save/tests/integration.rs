//! Integration tests for the save stores.
//!
//! File tests write into a fresh directory under the system temp dir and
//! remove it afterwards.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use idlestead_save::{FileSaveStore, MemorySaveStore, SaveError, SaveStore};
use idlestead_types::{
    AchievementState, DailyProgress, DailyState, GameSpeed, LoadoutState, MapProgress,
    PopulationState, PrestigeState, ResearchState, ResourceEntry, ResourceKey, Role,
    SAVE_VERSION, SaveMeta, SavePayload, WorldTreeState,
};
use rust_decimal_macros::dec;

fn payload() -> SavePayload {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let resources = ResourceKey::ALL
        .iter()
        .map(|&key| {
            (
                key,
                ResourceEntry {
                    amount: dec!(12.345678901234),
                    cap: dec!(100),
                    multiplier: dec!(1.2),
                },
            )
        })
        .collect();
    SavePayload {
        meta: SaveMeta {
            version: SAVE_VERSION.to_string(),
            saved_at: at,
            playtime_secs: 3600,
        },
        resources,
        population: PopulationState {
            total: 10,
            assignment: BTreeMap::from([(Role::Worker, 5), (Role::Scout, 1)]),
        },
        world_tree: WorldTreeState {
            unlocked: BTreeSet::from([String::from("root"), String::from("res1")]),
            purchased: BTreeSet::from([String::from("root")]),
            currencies: BTreeMap::new(),
        },
        map: MapProgress {
            current_map_id: String::from("tutorial"),
            cleared: BTreeSet::from([String::from("t1")]),
            reachable: BTreeSet::from([String::from("t2")]),
            total_cleared: 1,
        },
        prestige: PrestigeState::default(),
        buildings: BTreeMap::from([(String::from("warehouse"), 2)]),
        research: ResearchState::default(),
        loadout: LoadoutState::default(),
        automation_rules: vec![serde_json::json!({"name": "opaque"})],
        daily: DailyState {
            last_login: Some(at.date_naive()),
            login_streak: 3,
            today_tasks: vec![String::from("daily_clear3")],
            progress: BTreeMap::from([(
                String::from("daily_clear3"),
                DailyProgress {
                    current: 2,
                    completed: false,
                    claimed: false,
                },
            )]),
            streak_claimed: true,
        },
        achievements: AchievementState {
            unlocked: vec![String::from("first_node")],
            claimed: BTreeSet::from([String::from("first_node")]),
            total_points: dec!(10),
        },
        speed: GameSpeed::Fast,
        last_tick_at: at,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "idlestead-save-{name}-{}",
        uuid::Uuid::now_v7()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// =============================================================================
// Memory store
// =============================================================================

#[tokio::test]
async fn memory_store_starts_empty() {
    let store = MemorySaveStore::new();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store_round_trips_decimals_exactly() {
    let store = MemorySaveStore::new();
    let original = payload();
    store.save(&original).await.unwrap();

    let raw = store.raw().await.unwrap();
    assert!(raw.contains("\"12.345678901234\""));

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[tokio::test]
async fn memory_store_clear_forgets_payload() {
    let store = MemorySaveStore::new();
    store.save(&payload()).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn foreign_version_is_rejected() {
    let mut old = payload();
    old.meta.version = String::from("0");
    let store = MemorySaveStore::with_raw(serde_json::to_string(&old).unwrap());
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, SaveError::UnsupportedVersion { ref found, .. } if found == "0"));
}

#[tokio::test]
async fn save_without_daily_or_achievements_loads_defaults() {
    let mut value = serde_json::to_value(payload()).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("daily");
    object.remove("achievements");
    let store = MemorySaveStore::with_raw(value.to_string());
    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.daily, DailyState::default());
    assert_eq!(loaded.achievements, AchievementState::default());
    assert_eq!(loaded.map.total_cleared, 1);
}

#[tokio::test]
async fn malformed_json_is_a_serialization_error() {
    let store = MemorySaveStore::with_raw("{ not json");
    assert!(matches!(
        store.load().await,
        Err(SaveError::Serialization(_))
    ));
}

// =============================================================================
// File store
// =============================================================================

#[tokio::test]
async fn missing_file_loads_as_none() {
    let dir = scratch_dir("missing");
    let store = FileSaveStore::new(dir.join("save.json"));
    assert!(store.load().await.unwrap().is_none());
    store.clear().await.unwrap();
    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn file_store_round_trip_leaves_no_temp_file() {
    let dir = scratch_dir("round-trip");
    let path = dir.join("nested").join("save.json");
    let store = FileSaveStore::new(&path);

    let original = payload();
    store.save(&original).await.unwrap();
    assert!(path.exists());
    assert!(!dir.join("nested").join("save.json.tmp").exists());

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded, original);

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn failed_save_keeps_previous_file() {
    let dir = scratch_dir("failed");
    let path = dir.join("save.json");
    let store = FileSaveStore::new(&path);
    store.save(&payload()).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    // A directory squatting on the temp path makes the write fail.
    std::fs::create_dir_all(dir.join("save.json.tmp")).unwrap();
    let mut changed = payload();
    changed.meta.playtime_secs = 1;
    assert!(matches!(
        store.save(&changed).await,
        Err(SaveError::Io { .. })
    ));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    std::fs::remove_dir_all(dir).unwrap();
}
