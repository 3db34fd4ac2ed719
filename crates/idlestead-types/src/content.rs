//! Immutable content-table definitions.
//!
//! Content is authored data: world-tree nodes, maps and their encounter
//! nodes, buildings, research projects, equipment, and artifacts. The kernel
//! never mutates these records; it only looks them up by string id.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AchievementMetric, ArtifactTag, BonusKey, Currency, DailyTaskKind, EquipmentSlot,
    EquipmentStat, NodeKind, Rarity, ResearchUnlock, ResourceKey, RewardKind, Role,
};

// ---------------------------------------------------------------------------
// World tree
// ---------------------------------------------------------------------------

/// A purchasable node in the world tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldNodeDef {
    /// Unique node id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Currency cost of purchasing the node.
    #[serde(default)]
    #[ts(as = "BTreeMap<Currency, String>")]
    pub cost: BTreeMap<Currency, Decimal>,
    /// Node ids that must be purchased first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Node ids revealed once this node is purchased.
    #[serde(default)]
    pub unlocks: Vec<String>,
    /// Multiplicative bonus contributions.
    #[serde(default)]
    #[ts(as = "BTreeMap<BonusKey, String>")]
    pub bonuses: BTreeMap<BonusKey, Decimal>,
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// A currency drop granted when an encounter node is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DropEntry {
    /// The currency credited.
    pub currency: Currency,
    /// Units credited per clear.
    pub weight: u32,
}

/// A node in a map's encounter graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EncounterNodeDef {
    /// Node id, unique within its map.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Behavioural type.
    pub kind: NodeKind,
    /// Hit points.
    #[ts(as = "String")]
    pub hp: Decimal,
    /// Time limit in seconds, for timed nodes.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    /// Ids of nodes this node links to.
    #[serde(default)]
    pub adjacent: Vec<String>,
    /// Currencies granted on clear.
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

/// A map: an encounter graph plus unlock requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapDef {
    /// Unique map id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Aggregate clears required before the map can be entered.
    pub required_clears: u32,
    /// The node reachable on a fresh map.
    pub entry_node: String,
    /// Encounter nodes in authored order.
    pub nodes: Vec<EncounterNodeDef>,
}

impl MapDef {
    /// Look up an encounter node by id.
    pub fn node(&self, node_id: &str) -> Option<&EncounterNodeDef> {
        self.nodes.iter().find(|n| n.id == node_id)
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A per-level effect of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildingEffect {
    /// Raises a resource cap.
    ResourceCap {
        /// Affected resource.
        resource: ResourceKey,
        /// Cap increase per level.
        #[ts(as = "String")]
        per_level: Decimal,
    },
    /// Raises a role's building efficiency.
    Efficiency {
        /// Affected role.
        role: Role,
        /// Efficiency increase per level.
        #[ts(as = "String")]
        per_level: Decimal,
    },
    /// Raises total population.
    PopulationCap {
        /// Headcount increase per level.
        per_level: u32,
    },
    /// Raises a resource's production multiplier.
    ResourceMultiplier {
        /// Affected resource.
        resource: ResourceKey,
        /// Multiplier increase per level.
        #[ts(as = "String")]
        per_level: Decimal,
    },
}

/// An upgradable building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingDef {
    /// Unique building id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Level-0 upgrade cost.
    #[ts(as = "BTreeMap<ResourceKey, String>")]
    pub base_cost: BTreeMap<ResourceKey, Decimal>,
    /// Cost growth per level.
    #[ts(as = "String")]
    pub cost_multiplier: Decimal,
    /// Highest reachable level.
    pub max_level: u32,
    /// Per-level effects.
    pub effects: Vec<BuildingEffect>,
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// The effect of completing a research project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResearchEffect {
    /// Multiplies a bonus channel.
    Multiplier {
        /// Affected bonus channel.
        bonus: BonusKey,
        /// Multiplicative factor.
        #[ts(as = "String")]
        value: Decimal,
    },
    /// Sets a capability flag.
    Unlock {
        /// The capability unlocked.
        unlock: ResearchUnlock,
    },
}

/// A timed research project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResearchDef {
    /// Unique research id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Currency cost paid at start.
    #[serde(default)]
    #[ts(as = "BTreeMap<Currency, String>")]
    pub cost: BTreeMap<Currency, Decimal>,
    /// Duration in seconds.
    pub duration_secs: u64,
    /// Research ids that must be complete first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Effects granted on completion.
    pub effects: Vec<ResearchEffect>,
}

// ---------------------------------------------------------------------------
// Loadout
// ---------------------------------------------------------------------------

/// A flat stat bonus granted by equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipmentEffect {
    /// The stat increased.
    pub stat: EquipmentStat,
    /// Amount added.
    #[ts(as = "String")]
    pub value: Decimal,
}

/// An equippable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquipmentDef {
    /// Unique equipment id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slot the item occupies.
    pub slot: EquipmentSlot,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Added to gear score while equipped.
    #[ts(as = "String")]
    pub gear_score_bonus: Decimal,
    /// Flat stat effects.
    #[serde(default)]
    pub effects: Vec<EquipmentEffect>,
}

/// An artifact that can sit in one of the artifact slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ArtifactDef {
    /// Unique artifact id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Play-style tags.
    #[serde(default)]
    pub tags: Vec<ArtifactTag>,
    /// Multiplicative bonus contributions while equipped.
    #[ts(as = "BTreeMap<BonusKey, String>")]
    pub stats: BTreeMap<BonusKey, Decimal>,
    /// Artifact level.
    #[serde(default = "default_artifact_level")]
    pub level: u32,
}

const fn default_artifact_level() -> u32 {
    1
}

/// A named arrangement of artifact slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ArtifactPreset {
    /// Display name.
    pub name: String,
    /// Artifact id per slot, `None` for empty.
    pub slots: Vec<Option<String>>,
}

// ---------------------------------------------------------------------------
// Daily tasks and achievements
// ---------------------------------------------------------------------------

/// An amount credited to one reward channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reward {
    /// Where the amount goes.
    pub kind: RewardKind,
    /// Amount credited.
    #[ts(as = "String")]
    pub amount: Decimal,
}

/// A task from the daily pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyTaskDef {
    /// Unique task id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Activity counted.
    pub kind: DailyTaskKind,
    /// Count needed to complete the task.
    pub target: u32,
    /// Paid out on claim.
    pub reward: Reward,
}

/// Reward for a given day of the login streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoginRewardDef {
    /// Streak day, starting at 1.
    pub day: u32,
    /// Paid out on claim.
    pub reward: Reward,
}

/// A lifetime milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementDef {
    /// Unique achievement id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Statistic watched.
    pub metric: AchievementMetric,
    /// Value the statistic must reach.
    pub target: u32,
    /// Achievement points granted on claim. Zero for badge-only entries.
    #[serde(default)]
    #[ts(as = "String")]
    pub points: Decimal,
}
