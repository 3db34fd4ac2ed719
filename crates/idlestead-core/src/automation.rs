//! Automation rule engine.
//!
//! Once per tick, every enabled rule is checked in insertion order. A rule
//! fires when all of its conditions hold; its actions then run in order
//! against the live state, so later rules see what earlier rules did.
//!
//! Conditions and actions reach the game only through [`RuleContext`],
//! which keeps this module free of any knowledge of how the state is laid
//! out.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use idlestead_types::{
    Action, AutomationRule, Comparator, Condition, NewRule, ResourceKey, Role, RuleId, RulePatch,
};

/// What rules can observe and do.
pub trait RuleContext {
    /// Amount of `resource` in the ledger.
    fn resource_amount(&self, resource: ResourceKey) -> Decimal;

    /// Cleared nodes on the current map.
    fn cleared_count(&self) -> usize;

    /// Reachable nodes on the current map.
    fn reachable_count(&self) -> usize;

    /// Base attack of the combat profile.
    fn combat_attack(&self) -> Decimal;

    /// Base health of the combat profile.
    fn combat_health(&self) -> Decimal;

    /// Write a role assignment. Returns whether it was accepted.
    fn set_population(&mut self, role: Role, value: i64) -> bool;

    /// Replace the artifact slots with preset `index`.
    fn switch_preset(&mut self, index: usize) -> bool;

    /// Start a research project if allowed.
    fn start_research(&mut self, research_id: &str) -> bool;
}

/// Counts from one pass of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutomationReport {
    /// Rules whose conditions all held.
    pub rules_fired: usize,
    /// Actions that took effect.
    pub actions_applied: usize,
    /// Actions that were rejected or not understood.
    pub actions_skipped: usize,
}

/// The player's rules, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEngine {
    rules: Vec<AutomationRule>,
}

impl RuleEngine {
    /// No rules.
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rebuild from saved JSON, one rule at a time.
    ///
    /// Conditions and actions that cannot be read load as `Unknown` and
    /// keep their raw JSON. Only a rule whose own fields are broken (no id,
    /// no name) is logged and dropped; the rest load.
    pub fn from_saved(saved: &[serde_json::Value]) -> Self {
        let rules = saved
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                serde_json::from_value::<AutomationRule>(value.clone())
                    .map_err(|err| warn!(index, error = %err, "dropping unparseable automation rule"))
                    .ok()
            })
            .collect();
        Self { rules }
    }

    /// Encode every rule as JSON for the save payload.
    pub fn to_saved(&self) -> Vec<serde_json::Value> {
        self.rules
            .iter()
            .filter_map(|rule| {
                serde_json::to_value(rule)
                    .map_err(|err| warn!(rule_id = %rule.id, error = %err, "failed to encode rule"))
                    .ok()
            })
            .collect()
    }

    /// All rules in evaluation order.
    pub fn rules(&self) -> &[AutomationRule] {
        &self.rules
    }

    /// Look up a rule.
    pub fn rule(&self, id: RuleId) -> Option<&AutomationRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Append a rule and return its new id.
    pub fn add_rule(&mut self, rule: NewRule) -> RuleId {
        let rule = AutomationRule::from_new(rule);
        let id = rule.id;
        info!(rule_id = %id, name = %rule.name, "automation rule added");
        self.rules.push(rule);
        id
    }

    /// Apply `patch` to rule `id`. Returns whether the rule exists.
    pub fn update_rule(&mut self, id: RuleId, patch: RulePatch) -> bool {
        let Some(rule) = self.rules.iter_mut().find(|rule| rule.id == id) else {
            return false;
        };
        rule.apply_patch(patch);
        debug!(rule_id = %id, "automation rule updated");
        true
    }

    /// Remove rule `id`. Returns whether it existed.
    pub fn delete_rule(&mut self, id: RuleId) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.id != id);
        self.rules.len() != before
    }

    /// Evaluate every enabled rule once against `ctx`.
    pub fn tick(&self, ctx: &mut dyn RuleContext) -> AutomationReport {
        let mut report = AutomationReport::default();
        for rule in self.rules.iter().filter(|rule| rule.enabled) {
            if !rule.conditions.iter().all(|c| condition_holds(c, &*ctx)) {
                continue;
            }
            report.rules_fired = report.rules_fired.saturating_add(1);
            debug!(rule_id = %rule.id, name = %rule.name, "automation rule fired");
            for action in &rule.actions {
                if apply_action(action, ctx) {
                    report.actions_applied = report.actions_applied.saturating_add(1);
                } else {
                    report.actions_skipped = report.actions_skipped.saturating_add(1);
                }
            }
        }
        report
    }
}

/// Whether `condition` holds in `ctx`. Unknown sources never hold.
pub fn condition_holds(condition: &Condition, ctx: &dyn RuleContext) -> bool {
    match *condition {
        Condition::Resource {
            resource,
            comparator,
            threshold,
        } => compare(ctx.resource_amount(resource), comparator, threshold),
        Condition::MapCleared {
            comparator,
            threshold,
        } => compare(Decimal::from(ctx.cleared_count()), comparator, threshold),
        Condition::MapReachable {
            comparator,
            threshold,
        } => compare(Decimal::from(ctx.reachable_count()), comparator, threshold),
        Condition::CombatAttack {
            comparator,
            threshold,
        } => compare(ctx.combat_attack(), comparator, threshold),
        Condition::CombatHealth {
            comparator,
            threshold,
        } => compare(ctx.combat_health(), comparator, threshold),
        Condition::Unknown(ref raw) => {
            warn!(condition = %raw, "unreadable condition, treating as false");
            false
        }
    }
}

fn compare(value: Decimal, comparator: Comparator, threshold: Decimal) -> bool {
    match comparator {
        Comparator::Gte => value >= threshold,
        Comparator::Lte => value <= threshold,
    }
}

fn apply_action(action: &Action, ctx: &mut dyn RuleContext) -> bool {
    match action {
        Action::SetPopulation { role, value } => ctx.set_population(*role, *value),
        Action::SwitchPreset { index } => ctx.switch_preset(*index),
        Action::StartResearch { research_id } => ctx.start_research(research_id),
        Action::Unknown(raw) => {
            warn!(action = %raw, "unreadable automation action, skipping");
            false
        }
    }
}
