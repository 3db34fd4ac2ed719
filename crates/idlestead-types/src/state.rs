//! Mutable simulation state records.
//!
//! These are the plain-data halves of the kernel's stores. Behaviour lives
//! in the ledger, world, and core crates; the records here are what gets
//! serialized into a save and handed to the presentation layer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::ArtifactPreset;
use crate::enums::{Currency, EquipmentSlot, Role};

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

/// Amount, cap, and production multiplier of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceEntry {
    /// Current stockpile. Always within `0..=cap`.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Storage cap.
    #[ts(as = "String")]
    pub cap: Decimal,
    /// Cached production multiplier pushed by the multiplier sync.
    #[ts(as = "String")]
    pub multiplier: Decimal,
}

/// Population headcount and role assignments.
///
/// The sum of assignments is not required to equal `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationState {
    /// Total headcount.
    pub total: u32,
    /// Headcount assigned to each role.
    pub assignment: BTreeMap<Role, u32>,
}

// ---------------------------------------------------------------------------
// World tree
// ---------------------------------------------------------------------------

/// Purchase state of the world tree plus the progression currency wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldTreeState {
    /// Nodes revealed to the player.
    pub unlocked: BTreeSet<String>,
    /// Nodes purchased. Monotonic outside a full reset.
    pub purchased: BTreeSet<String>,
    /// Progression currency balances.
    #[ts(as = "BTreeMap<Currency, String>")]
    pub currencies: BTreeMap<Currency, Decimal>,
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// Combat stats used for DPS and time-to-kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatProfile {
    /// Base attack before gear and multipliers.
    #[ts(as = "String")]
    pub base_attack: Decimal,
    /// Base health.
    #[ts(as = "String")]
    pub base_health: Decimal,
    /// Base defense.
    #[ts(as = "String")]
    pub base_defense: Decimal,
    /// Gear score; DPS scales with its square root.
    #[ts(as = "String")]
    pub gear_score: Decimal,
    /// Cached attack multiplier from the world tree, research, and prestige.
    #[ts(as = "String")]
    pub world_multiplier: Decimal,
    /// Cached attack multiplier from equipped artifacts.
    #[ts(as = "String")]
    pub artifact_multiplier: Decimal,
    /// Whether shield nodes take full damage.
    pub shield_breaker_unlocked: bool,
}

/// Traversal state of the current map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapProgress {
    /// The map being played.
    pub current_map_id: String,
    /// Cleared node ids on the current map.
    pub cleared: BTreeSet<String>,
    /// Node ids that can currently be attacked.
    pub reachable: BTreeSet<String>,
    /// Clears across all maps since the last run reset.
    pub total_cleared: u32,
}

/// The single in-flight battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveBattle {
    /// Target node.
    pub node_id: String,
    /// Target hit points.
    #[ts(as = "String")]
    pub node_hp: Decimal,
    /// When the battle began.
    pub started_at: DateTime<Utc>,
    /// Time-to-kill estimate at start, in seconds.
    pub ttk_estimate_secs: u64,
    /// Time limit in seconds, for timed nodes.
    pub time_limit_secs: Option<u64>,
    /// Damage dealt so far, for display.
    #[ts(as = "String")]
    pub current_damage: Decimal,
}

// ---------------------------------------------------------------------------
// Prestige
// ---------------------------------------------------------------------------

/// Prestige (layer 1) and awakening (layer 2) counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PrestigeState {
    /// Unspent legacy points.
    #[ts(as = "String")]
    pub legacy_points: Decimal,
    /// Number of prestiges since the last awakening.
    pub prestige_count: u32,
    /// Legacy points earned since the last awakening.
    #[ts(as = "String")]
    pub total_legacy_points: Decimal,
    /// Awakening crystals. Only a full reset lowers this.
    #[ts(as = "String")]
    pub awakening_crystals: Decimal,
    /// Number of awakenings performed.
    pub awakening_count: u32,
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// The research project currently underway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResearchProgress {
    /// Research id.
    pub research_id: String,
    /// When the project started.
    pub started_at: DateTime<Utc>,
    /// Duration in seconds.
    pub duration_secs: u64,
}

/// Completed research plus the in-progress project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResearchState {
    /// Completed research ids.
    pub completed: BTreeSet<String>,
    /// The project underway, if any.
    pub current: Option<ResearchProgress>,
}

// ---------------------------------------------------------------------------
// Loadout
// ---------------------------------------------------------------------------

/// Equipped items, artifact slots, and artifact presets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoadoutState {
    /// Equipment id per occupied slot.
    pub equipment: BTreeMap<EquipmentSlot, String>,
    /// Artifact ids the player owns.
    pub artifact_inventory: Vec<String>,
    /// Artifact id per artifact slot.
    pub artifact_slots: Vec<Option<String>>,
    /// Saved slot arrangements.
    pub presets: Vec<ArtifactPreset>,
    /// Index of the last preset switched to.
    pub active_preset: usize,
}

// ---------------------------------------------------------------------------
// Daily tasks and achievements
// ---------------------------------------------------------------------------

/// Progress on one of today's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyProgress {
    /// Count so far.
    pub current: u32,
    /// Whether the target has been reached.
    pub completed: bool,
    /// Whether the reward has been paid out.
    pub claimed: bool,
}

/// Login streak and today's task board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyState {
    /// UTC date of the last login, if any.
    pub last_login: Option<NaiveDate>,
    /// Day of the seven-day streak cycle, 0 before the first login.
    pub login_streak: u32,
    /// Task ids drawn for today.
    pub today_tasks: Vec<String>,
    /// Progress per task id drawn today.
    pub progress: BTreeMap<String, DailyProgress>,
    /// Whether today's streak reward has been paid out.
    pub streak_claimed: bool,
}

/// Unlocked and claimed achievements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementState {
    /// Unlocked ids, in unlock order.
    pub unlocked: Vec<String>,
    /// Ids whose points have been paid out.
    pub claimed: BTreeSet<String>,
    /// Achievement points earned.
    #[ts(as = "String")]
    pub total_points: Decimal,
}
