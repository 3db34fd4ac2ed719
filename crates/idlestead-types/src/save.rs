//! The versioned save payload.
//!
//! Decimal fields serialize as strings through `rust_decimal`'s serde
//! support, so a round trip through JSON preserves every digit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{GameSpeed, ResourceKey};
use crate::state::{
    AchievementState, DailyState, LoadoutState, MapProgress, PopulationState, PrestigeState,
    ResearchState, ResourceEntry, WorldTreeState,
};

/// Current save format version.
pub const SAVE_VERSION: &str = "1";

/// Metadata header of a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaveMeta {
    /// Save format version.
    pub version: String,
    /// When the save was written.
    pub saved_at: DateTime<Utc>,
    /// Accumulated simulated seconds.
    pub playtime_secs: u64,
}

/// Everything needed to rebuild the game state.
///
/// The active battle and derived combat multipliers are deliberately absent;
/// they are rebuilt after restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SavePayload {
    /// Header.
    pub meta: SaveMeta,
    /// Resource ledger entries.
    pub resources: BTreeMap<ResourceKey, ResourceEntry>,
    /// Population ledger.
    pub population: PopulationState,
    /// World tree and currency wallet.
    pub world_tree: WorldTreeState,
    /// Current map traversal.
    pub map: MapProgress,
    /// Prestige and awakening counters.
    pub prestige: PrestigeState,
    /// Building levels by building id.
    pub buildings: BTreeMap<String, u32>,
    /// Research progress.
    pub research: ResearchState,
    /// Equipment and artifacts.
    pub loadout: LoadoutState,
    /// Automation rules as raw JSON, parsed one by one on restore.
    pub automation_rules: Vec<serde_json::Value>,
    /// Login streak and today's tasks. Absent in older saves.
    #[serde(default)]
    pub daily: DailyState,
    /// Achievement progress. Absent in older saves.
    #[serde(default)]
    pub achievements: AchievementState,
    /// Speed setting at save time.
    pub speed: GameSpeed,
    /// Timestamp of the last production tick, for offline progress.
    pub last_tick_at: DateTime<Utc>,
}
