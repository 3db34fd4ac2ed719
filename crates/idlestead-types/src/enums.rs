//! Enumeration types for the Idlestead simulation kernel.
//!
//! Every enumerated set the kernel keys a map by lives here so that the
//! presentation layer receives the same closed vocabulary via `ts-rs`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources and labor
// ---------------------------------------------------------------------------

/// A stockpiled resource tracked by the resource ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKey {
    /// Lumber, produced by workers.
    Wood,
    /// Quarried stone, produced by builders.
    Stone,
    /// Iron ore, produced by soldiers.
    Iron,
    /// Food, produced by scouts.
    Food,
    /// Crystal. Not produced by labor; granted by content effects only.
    Crystal,
}

impl ResourceKey {
    /// Every resource key, in ledger order.
    pub const ALL: [Self; 5] = [Self::Wood, Self::Stone, Self::Iron, Self::Food, Self::Crystal];

    /// Lowercase name used in logs and authored content.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Iron => "iron",
            Self::Food => "food",
            Self::Crystal => "crystal",
        }
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named population role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Produces wood.
    Worker,
    /// Produces stone.
    Builder,
    /// Staffs research; produces no resource.
    Researcher,
    /// Produces iron.
    Soldier,
    /// Produces food.
    Scout,
}

impl Role {
    /// Every role, in assignment order.
    pub const ALL: [Self; 5] = [
        Self::Worker,
        Self::Builder,
        Self::Researcher,
        Self::Soldier,
        Self::Scout,
    ];

    /// Lowercase name used in logs and authored content.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Builder => "builder",
            Self::Researcher => "researcher",
            Self::Soldier => "soldier",
            Self::Scout => "scout",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run-independent currency spent on the world tree and research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Currency {
    /// Blueprints, dropped by most encounter nodes.
    Blueprint,
    /// Memories, dropped by harder encounter nodes.
    Memory,
}

impl Currency {
    /// Every currency.
    pub const ALL: [Self; 2] = [Self::Blueprint, Self::Memory];
}

// ---------------------------------------------------------------------------
// Bonuses
// ---------------------------------------------------------------------------

/// A named bonus channel that progression sources contribute to.
///
/// Every contribution is a multiplicative factor; an absent contribution
/// is the identity (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BonusKey {
    /// Resource production.
    Resource,
    /// Combat attack.
    Attack,
    /// Combat defense.
    Defense,
    /// Combat health.
    Health,
    /// Offline progress cap, in hours.
    OfflineCap,
    /// Presence marks shield-breaking as unlocked.
    ShieldBreak,
    /// Building upgrade cost factor.
    BuildingCost,
}

// ---------------------------------------------------------------------------
// Encounters
// ---------------------------------------------------------------------------

/// Behavioural type of an encounter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NodeKind {
    /// Plain node, always damageable.
    Normal,
    /// Takes half damage unless shield-breaking is unlocked.
    Shield,
    /// Must be defeated within its time limit.
    Timed,
    /// Damageable only once every neighbour is cleared.
    Protected,
    /// Environmental hazard node; fights like a normal node.
    Env,
}

// ---------------------------------------------------------------------------
// Loadout
// ---------------------------------------------------------------------------

/// An equipment slot on the combat profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EquipmentSlot {
    /// Main-hand weapon.
    Weapon,
    /// Body armor.
    Armor,
    /// Ring, charm, or amulet.
    Accessory,
}

/// Equipment rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Common.
    Common,
    /// Uncommon.
    Uncommon,
    /// Rare.
    Rare,
    /// Epic.
    Epic,
    /// Legendary.
    Legendary,
}

/// The stat an equipment effect adds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EquipmentStat {
    /// Flat base attack.
    Attack,
    /// Flat base defense.
    Defense,
    /// Flat base health.
    Health,
    /// Additive job efficiency for every producing role.
    Efficiency,
}

/// Play-style tag carried by an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ArtifactTag {
    /// Burst damage.
    Burst,
    /// Sustain.
    Sustain,
    /// Crowd control.
    Control,
    /// Economy.
    Economy,
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// A capability flag unlocked by completing research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResearchUnlock {
    /// Shield nodes take full damage.
    ShieldBreaker,
    /// Scout role unlocked.
    ScoutRole,
    /// Automatic population assignment unlocked.
    AutoAssign,
}

// ---------------------------------------------------------------------------
// Scheduling and automation
// ---------------------------------------------------------------------------

/// Discrete tick speed multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameSpeed {
    /// Real time.
    #[default]
    #[serde(rename = "1x")]
    Normal,
    /// Twice as many ticks per second.
    #[serde(rename = "2x")]
    Double,
    /// Five times as many ticks per second.
    #[serde(rename = "5x")]
    Fast,
    /// Ten times as many ticks per second.
    #[serde(rename = "10x")]
    Turbo,
}

impl GameSpeed {
    /// The integer multiplier applied to the tick rate.
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Fast => 5,
            Self::Turbo => 10,
        }
    }

    /// Map an integer multiplier back onto a supported speed.
    pub const fn from_multiplier(multiplier: u32) -> Option<Self> {
        match multiplier {
            1 => Some(Self::Normal),
            2 => Some(Self::Double),
            5 => Some(Self::Fast),
            10 => Some(Self::Turbo),
            _ => None,
        }
    }
}

/// Comparison operator used by automation conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Comparator {
    /// Observed value is greater than or equal to the threshold.
    #[serde(rename = ">=")]
    Gte,
    /// Observed value is less than or equal to the threshold.
    #[serde(rename = "<=")]
    Lte,
}

// ---------------------------------------------------------------------------
// Daily tasks and achievements
// ---------------------------------------------------------------------------

/// The player activity a daily task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DailyTaskKind {
    /// Encounter nodes cleared.
    ClearNodes,
    /// Building levels bought.
    UpgradeBuilding,
    /// Research projects completed.
    CompleteResearch,
    /// Artifacts placed in a slot.
    EquipArtifact,
}

/// The lifetime statistic an achievement watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementMetric {
    /// Clears across all maps since the last run reset.
    NodesCleared,
    /// Prestiges since the last awakening.
    TotalPrestige,
    /// Sum of building levels.
    BuildingLevels,
    /// Completed research projects.
    ResearchCount,
    /// Artifacts owned.
    ArtifactCount,
    /// World-tree nodes purchased.
    WorldNodes,
}

/// Where a daily or login reward is credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RewardKind {
    /// Blueprint currency.
    Blueprint,
    /// Memory currency.
    Memory,
    /// Unspent legacy points.
    LegacyPoints,
}
