//! Building levels, upgrade costs, and the effects buildings contribute.
//!
//! Upgrade cost at level `L` is `floor(base_cost * cost_multiplier^L *
//! building_cost_bonus)` per resource. Effects scale linearly with level.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, MathematicalOps};
use tracing::{info, warn};

use idlestead_ledger::ResourceLedger;
use idlestead_types::{BuildingEffect, ResourceKey, Role};
use idlestead_world::ContentTables;

/// Level per building id. Buildings never built are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buildings {
    levels: BTreeMap<String, u32>,
}

impl Buildings {
    /// No buildings built.
    pub const fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rebuild from saved levels, dropping unknown ids and clamping to
    /// each building's max level.
    pub fn from_levels(content: &ContentTables, levels: &BTreeMap<String, u32>) -> Self {
        let mut restored = Self::new();
        for (id, &level) in levels {
            let Some(def) = content.building(id) else {
                warn!(building_id = %id, "dropping unknown building from save");
                continue;
            };
            let level = level.min(def.max_level);
            if level > 0 {
                restored.levels.insert(id.clone(), level);
            }
        }
        restored
    }

    /// Levels by building id.
    pub const fn levels(&self) -> &BTreeMap<String, u32> {
        &self.levels
    }

    /// Current level of `building_id` (0 if never built).
    pub fn level(&self, building_id: &str) -> u32 {
        self.levels.get(building_id).copied().unwrap_or(0)
    }

    /// Sum of all building levels.
    pub fn total_levels(&self) -> u32 {
        self.levels
            .values()
            .fold(0_u32, |acc, &level| acc.saturating_add(level))
    }

    /// Resource cost of the next level, or `None` if the building is
    /// unknown, already at max level, or the cost overflows.
    pub fn upgrade_cost(
        &self,
        content: &ContentTables,
        building_id: &str,
        cost_bonus: Decimal,
    ) -> Option<BTreeMap<ResourceKey, Decimal>> {
        let def = content.building(building_id)?;
        let level = self.level(building_id);
        if level >= def.max_level {
            return None;
        }
        let scale = def
            .cost_multiplier
            .checked_powu(u64::from(level))?
            .checked_mul(cost_bonus)?;
        def.base_cost
            .iter()
            .map(|(&key, &base)| Some((key, base.checked_mul(scale)?.floor())))
            .collect()
    }

    /// Pay for and apply one level of `building_id`.
    ///
    /// Returns `false` without side effects if the building is unknown,
    /// maxed, or unaffordable.
    pub fn upgrade(
        &mut self,
        content: &ContentTables,
        building_id: &str,
        cost_bonus: Decimal,
        resources: &mut ResourceLedger,
    ) -> bool {
        let Some(cost) = self.upgrade_cost(content, building_id, cost_bonus) else {
            return false;
        };
        if !resources.spend(&cost) {
            return false;
        }
        let level = self.levels.entry(building_id.to_owned()).or_insert(0);
        *level = level.saturating_add(1);
        info!(building_id, level = *level, "building upgraded");
        true
    }

    /// Effects of every built building, paired with its level.
    fn effects<'a>(
        &'a self,
        content: &'a ContentTables,
    ) -> impl Iterator<Item = (&'a BuildingEffect, Decimal)> {
        self.levels.iter().flat_map(move |(id, &level)| {
            content
                .building(id)
                .into_iter()
                .flat_map(|def| def.effects.iter())
                .map(move |effect| (effect, Decimal::from(level)))
        })
    }

    /// Extra storage for `resource` on top of the default cap.
    pub fn cap_bonus(&self, content: &ContentTables, resource: ResourceKey) -> Decimal {
        self.effects(content)
            .filter_map(|(effect, level)| match *effect {
                BuildingEffect::ResourceCap {
                    resource: r,
                    per_level,
                } if r == resource => Some(per_level.saturating_mul(level)),
                _ => None,
            })
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Building efficiency factor for `role`: `1 + sum(per_level * level)`.
    pub fn efficiency(&self, content: &ContentTables, role: Role) -> Decimal {
        self.effects(content)
            .filter_map(|(effect, level)| match *effect {
                BuildingEffect::Efficiency { role: r, per_level } if r == role => {
                    Some(per_level.saturating_mul(level))
                }
                _ => None,
            })
            .fold(Decimal::ONE, Decimal::saturating_add)
    }

    /// Extra headcount on top of the default population.
    pub fn population_bonus(&self, content: &ContentTables) -> u32 {
        self.levels
            .iter()
            .filter_map(|(id, &level)| content.building(id).map(|def| (def, level)))
            .flat_map(|(def, level)| {
                def.effects.iter().filter_map(move |effect| match *effect {
                    BuildingEffect::PopulationCap { per_level } => {
                        Some(per_level.saturating_mul(level))
                    }
                    _ => None,
                })
            })
            .fold(0_u32, u32::saturating_add)
    }

    /// Production multiplier factor for `resource`: `1 + sum(per_level * level)`.
    pub fn resource_multiplier(&self, content: &ContentTables, resource: ResourceKey) -> Decimal {
        self.effects(content)
            .filter_map(|(effect, level)| match *effect {
                BuildingEffect::ResourceMultiplier {
                    resource: r,
                    per_level,
                } if r == resource => Some(per_level.saturating_mul(level)),
                _ => None,
            })
            .fold(Decimal::ONE, Decimal::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn rich_ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        for key in ResourceKey::ALL {
            ledger.set_cap(key, dec!(100000));
            ledger.add(key, dec!(100000));
        }
        ledger
    }

    #[test]
    fn cost_scales_geometrically_and_floors() {
        let content = ContentTables::builtin();
        let mut buildings = Buildings::new();
        let cost = buildings
            .upgrade_cost(&content, "warehouse", Decimal::ONE)
            .unwrap();
        assert_eq!(cost.get(&ResourceKey::Wood), Some(&dec!(50)));
        assert_eq!(cost.get(&ResourceKey::Stone), Some(&dec!(30)));

        let mut ledger = rich_ledger();
        assert!(buildings.upgrade(&content, "warehouse", Decimal::ONE, &mut ledger));
        assert!(buildings.upgrade(&content, "warehouse", Decimal::ONE, &mut ledger));
        let cost = buildings
            .upgrade_cost(&content, "warehouse", Decimal::ONE)
            .unwrap();
        // 50 * 1.5^2 = 112.5, 30 * 1.5^2 = 67.5
        assert_eq!(cost.get(&ResourceKey::Wood), Some(&dec!(112)));
        assert_eq!(cost.get(&ResourceKey::Stone), Some(&dec!(67)));
    }

    #[test]
    fn cost_bonus_discounts_upgrades() {
        let content = ContentTables::builtin();
        let cost = Buildings::new()
            .upgrade_cost(&content, "warehouse", dec!(0.9))
            .unwrap();
        assert_eq!(cost.get(&ResourceKey::Wood), Some(&dec!(45)));
        assert_eq!(cost.get(&ResourceKey::Stone), Some(&dec!(27)));
    }

    #[test]
    fn unaffordable_upgrade_changes_nothing() {
        let content = ContentTables::builtin();
        let mut buildings = Buildings::new();
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKey::Wood, dec!(49));
        ledger.add(ResourceKey::Stone, dec!(30));
        assert!(!buildings.upgrade(&content, "warehouse", Decimal::ONE, &mut ledger));
        assert_eq!(buildings.level("warehouse"), 0);
        assert_eq!(ledger.amount(ResourceKey::Wood), dec!(49));
    }

    #[test]
    fn max_level_blocks_further_upgrades() {
        let content = ContentTables::builtin();
        let max = content.building("forge").unwrap().max_level;
        let buildings =
            Buildings::from_levels(&content, &BTreeMap::from([(String::from("forge"), 999)]));
        assert_eq!(buildings.level("forge"), max);
        assert!(buildings.upgrade_cost(&content, "forge", Decimal::ONE).is_none());
    }

    #[test]
    fn unknown_buildings_are_dropped_on_restore() {
        let content = ContentTables::builtin();
        let buildings =
            Buildings::from_levels(&content, &BTreeMap::from([(String::from("castle"), 3)]));
        assert!(buildings.levels().is_empty());
        assert!(buildings.upgrade_cost(&content, "castle", Decimal::ONE).is_none());
    }

    #[test]
    fn effects_scale_with_level() {
        let content = ContentTables::builtin();
        let buildings = Buildings::from_levels(
            &content,
            &BTreeMap::from([
                (String::from("warehouse"), 2),
                (String::from("workshop"), 3),
                (String::from("barracks"), 1),
                (String::from("forge"), 2),
            ]),
        );
        assert_eq!(buildings.cap_bonus(&content, ResourceKey::Wood), dec!(200));
        assert_eq!(buildings.cap_bonus(&content, ResourceKey::Iron), dec!(100));
        assert_eq!(buildings.cap_bonus(&content, ResourceKey::Food), dec!(0));
        assert_eq!(buildings.efficiency(&content, Role::Worker), dec!(1.3));
        assert_eq!(buildings.efficiency(&content, Role::Soldier), dec!(1.1));
        assert_eq!(buildings.efficiency(&content, Role::Scout), dec!(1));
        assert_eq!(buildings.population_bonus(&content), 5);
        assert_eq!(
            buildings.resource_multiplier(&content, ResourceKey::Iron),
            dec!(1.2)
        );
        assert_eq!(buildings.total_levels(), 8);
    }
}
