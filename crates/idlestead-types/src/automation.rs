//! Player-authored automation rules.
//!
//! Conditions and actions are internally tagged sums. An entry the kernel
//! cannot read (an unrecognised tag, or a known tag with a bad payload)
//! deserializes into the `Unknown` variant carrying its raw JSON. The engine
//! logs and skips those entries, and they serialize back unchanged so a
//! rule authored by a newer client survives a load/save cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Comparator, ResourceKey, Role};
use crate::ids::RuleId;

/// A predicate over simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "source", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Condition {
    /// Compares a resource amount.
    Resource {
        /// Resource observed.
        resource: ResourceKey,
        /// Comparison operator.
        comparator: Comparator,
        /// Threshold.
        #[ts(as = "String")]
        threshold: Decimal,
    },
    /// Compares the number of cleared nodes on the current map.
    MapCleared {
        /// Comparison operator.
        comparator: Comparator,
        /// Threshold.
        #[ts(as = "String")]
        threshold: Decimal,
    },
    /// Compares the number of reachable nodes on the current map.
    MapReachable {
        /// Comparison operator.
        comparator: Comparator,
        /// Threshold.
        #[ts(as = "String")]
        threshold: Decimal,
    },
    /// Compares base attack.
    CombatAttack {
        /// Comparison operator.
        comparator: Comparator,
        /// Threshold.
        #[ts(as = "String")]
        threshold: Decimal,
    },
    /// Compares base health.
    CombatHealth {
        /// Comparison operator.
        comparator: Comparator,
        /// Threshold.
        #[ts(as = "String")]
        threshold: Decimal,
    },
    /// Any entry this build cannot read, kept verbatim. Never holds.
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// An effect applied when a rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Writes a role assignment. Negative values are rejected.
    SetPopulation {
        /// Role to assign.
        role: Role,
        /// Requested headcount.
        value: i64,
    },
    /// Replaces the artifact slots with a preset.
    SwitchPreset {
        /// Preset index.
        index: usize,
    },
    /// Starts a research project if allowed.
    StartResearch {
        /// Research id.
        research_id: String,
    },
    /// Any entry this build cannot read, kept verbatim. Skipped.
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// A stored automation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AutomationRule {
    /// Rule id.
    pub id: RuleId,
    /// Display name.
    pub name: String,
    /// Disabled rules are never evaluated.
    pub enabled: bool,
    /// All must hold for the rule to fire.
    pub conditions: Vec<Condition>,
    /// Applied in order when the rule fires.
    pub actions: Vec<Action>,
}

/// A rule as submitted for creation; the engine assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewRule {
    /// Display name.
    pub name: String,
    /// Whether the rule starts enabled.
    pub enabled: bool,
    /// Conditions.
    pub conditions: Vec<Condition>,
    /// Actions.
    pub actions: Vec<Action>,
}

/// A partial update to an existing rule. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RulePatch {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Replacement conditions.
    #[serde(default)]
    pub conditions: Option<Vec<Condition>>,
    /// Replacement actions.
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

impl AutomationRule {
    /// Build a stored rule from a creation request with a fresh id.
    pub fn from_new(rule: NewRule) -> Self {
        Self {
            id: RuleId::new(),
            name: rule.name,
            enabled: rule.enabled,
            conditions: rule.conditions,
            actions: rule.actions,
        }
    }

    /// Apply a partial update in place.
    pub fn apply_patch(&mut self, patch: RulePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(conditions) = patch.conditions {
            self.conditions = conditions;
        }
        if let Some(actions) = patch.actions {
            self.actions = actions;
        }
    }
}
