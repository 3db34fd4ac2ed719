//! Equipment and artifacts.
//!
//! Equipment fills three slots and contributes gear score plus flat stats.
//! Artifacts fill five slots and contribute multiplicatively to bonus keys.
//! Presets are saved artifact-slot arrangements; switching to one replaces
//! every slot at once.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use idlestead_types::{ArtifactPreset, BonusKey, EquipmentSlot, EquipmentStat, LoadoutState};
use idlestead_world::{ARTIFACT_SLOTS, ContentTables};

/// Equipped items, owned artifacts, artifact slots, and presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    state: LoadoutState,
}

impl Loadout {
    /// Starting loadout: nothing equipped, every content artifact owned,
    /// starter presets available.
    pub fn new(content: &ContentTables) -> Self {
        Self {
            state: LoadoutState {
                equipment: BTreeMap::new(),
                artifact_inventory: content.artifacts.iter().map(|a| a.id.clone()).collect(),
                artifact_slots: vec![None; ARTIFACT_SLOTS],
                presets: content.starter_presets.clone(),
                active_preset: 0,
            },
        }
    }

    /// Rebuild from persisted state.
    ///
    /// Equipment ids the content no longer knows are dropped, and the slot
    /// vector is resized to the fixed slot count.
    pub fn from_state(content: &ContentTables, state: &LoadoutState) -> Self {
        let mut state = state.clone();
        state.equipment.retain(|slot, id| {
            let valid = content.equipment(id).is_some_and(|def| def.slot == *slot);
            if !valid {
                warn!(equipment_id = %id, ?slot, "dropping invalid equipment from save");
            }
            valid
        });
        state.artifact_slots.resize(ARTIFACT_SLOTS, None);
        for preset in &mut state.presets {
            preset.slots.resize(ARTIFACT_SLOTS, None);
        }
        Self { state }
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> LoadoutState {
        self.state.clone()
    }

    // -------------------------------------------------------------------
    // Equipment
    // -------------------------------------------------------------------

    /// Equipment id in `slot`.
    pub fn equipped(&self, slot: EquipmentSlot) -> Option<&str> {
        self.state.equipment.get(&slot).map(String::as_str)
    }

    /// Equip `equipment_id` into its slot, replacing what was there.
    pub fn equip_item(&mut self, content: &ContentTables, equipment_id: &str) -> bool {
        let Some(def) = content.equipment(equipment_id) else {
            debug!(equipment_id, "unknown equipment");
            return false;
        };
        self.state.equipment.insert(def.slot, def.id.clone());
        true
    }

    /// Empty `slot`. Returns whether anything was removed.
    pub fn unequip_slot(&mut self, slot: EquipmentSlot) -> bool {
        self.state.equipment.remove(&slot).is_some()
    }

    /// `1 + sum(gear_score_bonus)` over equipped items.
    pub fn gear_score(&self, content: &ContentTables) -> Decimal {
        self.state
            .equipment
            .values()
            .filter_map(|id| content.equipment(id))
            .fold(Decimal::ONE, |acc, def| {
                acc.saturating_add(def.gear_score_bonus)
            })
    }

    /// Sum of equipped items' flat bonuses to `stat`.
    pub fn flat_stat(&self, content: &ContentTables, stat: EquipmentStat) -> Decimal {
        self.state
            .equipment
            .values()
            .filter_map(|id| content.equipment(id))
            .flat_map(|def| def.effects.iter())
            .filter(|effect| effect.stat == stat)
            .fold(Decimal::ZERO, |acc, effect| acc.saturating_add(effect.value))
    }

    // -------------------------------------------------------------------
    // Artifacts
    // -------------------------------------------------------------------

    /// Number of artifacts owned.
    pub fn artifact_count(&self) -> usize {
        self.state.artifact_inventory.len()
    }

    /// Artifact slots in order.
    pub fn artifact_slots(&self) -> &[Option<String>] {
        &self.state.artifact_slots
    }

    /// Saved presets.
    pub fn presets(&self) -> &[ArtifactPreset] {
        &self.state.presets
    }

    /// Index of the preset last switched to.
    pub const fn active_preset(&self) -> usize {
        self.state.active_preset
    }

    /// Put an owned artifact into `slot`, moving it out of any other slot.
    pub fn equip_artifact(&mut self, artifact_id: &str, slot: usize) -> bool {
        if slot >= ARTIFACT_SLOTS
            || !self
                .state
                .artifact_inventory
                .iter()
                .any(|owned| owned == artifact_id)
        {
            return false;
        }
        for entry in &mut self.state.artifact_slots {
            if entry.as_deref() == Some(artifact_id) {
                *entry = None;
            }
        }
        match self.state.artifact_slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(artifact_id.to_owned());
                true
            }
            None => false,
        }
    }

    /// Empty artifact `slot`. Returns whether anything was removed.
    pub fn unequip_artifact(&mut self, slot: usize) -> bool {
        self.state
            .artifact_slots
            .get_mut(slot)
            .and_then(Option::take)
            .is_some()
    }

    /// Replace every artifact slot with preset `index`.
    pub fn switch_preset(&mut self, index: usize) -> bool {
        let Some(preset) = self.state.presets.get(index) else {
            return false;
        };
        let mut slots = preset.slots.clone();
        slots.resize(ARTIFACT_SLOTS, None);
        self.state.artifact_slots = slots;
        self.state.active_preset = index;
        true
    }

    /// Product of equipped artifacts' contributions to `key`.
    ///
    /// Slots holding an artifact the player does not own, or one missing
    /// from content, contribute nothing.
    pub fn artifact_multiplier(&self, content: &ContentTables, key: BonusKey) -> Decimal {
        self.state
            .artifact_slots
            .iter()
            .flatten()
            .filter(|id| self.state.artifact_inventory.contains(id))
            .filter_map(|id| content.artifact(id))
            .filter_map(|def| def.stats.get(&key))
            .fold(Decimal::ONE, |acc, &factor| acc.saturating_mul(factor))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn equipment_feeds_gear_score_and_flat_stats() {
        let content = ContentTables::builtin();
        let mut loadout = Loadout::new(&content);
        assert_eq!(loadout.gear_score(&content), dec!(1));

        assert!(loadout.equip_item(&content, "iron_sword"));
        assert!(loadout.equip_item(&content, "chainmail"));
        assert_eq!(loadout.gear_score(&content), dec!(7));
        assert_eq!(loadout.flat_stat(&content, EquipmentStat::Attack), dec!(5));
        assert_eq!(loadout.flat_stat(&content, EquipmentStat::Health), dec!(10));

        assert!(loadout.equip_item(&content, "flame_blade"));
        assert_eq!(loadout.equipped(EquipmentSlot::Weapon), Some("flame_blade"));
        assert_eq!(loadout.flat_stat(&content, EquipmentStat::Attack), dec!(12));

        assert!(loadout.unequip_slot(EquipmentSlot::Weapon));
        assert!(!loadout.unequip_slot(EquipmentSlot::Weapon));
        assert!(!loadout.equip_item(&content, "excalibur"));
    }

    #[test]
    fn artifact_moves_between_slots() {
        let content = ContentTables::builtin();
        let mut loadout = Loadout::new(&content);
        assert!(loadout.equip_artifact("a1", 0));
        assert!(loadout.equip_artifact("a1", 3));
        assert_eq!(loadout.artifact_slots().first().unwrap(), &None);
        assert_eq!(
            loadout.artifact_slots().get(3).unwrap().as_deref(),
            Some("a1")
        );
        assert!(!loadout.equip_artifact("a1", ARTIFACT_SLOTS));
        assert!(!loadout.equip_artifact("a9", 0));
        assert_eq!(
            loadout.artifact_multiplier(&content, BonusKey::Attack),
            dec!(1.3)
        );
        assert!(loadout.unequip_artifact(3));
        assert_eq!(
            loadout.artifact_multiplier(&content, BonusKey::Attack),
            dec!(1)
        );
    }

    #[test]
    fn switch_preset_replaces_all_slots() {
        let content = ContentTables::builtin();
        let mut loadout = Loadout::new(&content);
        assert!(loadout.switch_preset(0));
        assert_eq!(loadout.active_preset(), 0);
        assert_eq!(
            loadout.artifact_multiplier(&content, BonusKey::Defense),
            dec!(1.25)
        );

        assert!(loadout.switch_preset(1));
        assert!(loadout.artifact_slots().iter().all(Option::is_none));
        assert!(!loadout.switch_preset(7));
        assert_eq!(loadout.active_preset(), 1);
    }

    #[test]
    fn restore_drops_equipment_in_the_wrong_slot() {
        let content = ContentTables::builtin();
        let mut state = Loadout::new(&content).to_state();
        state
            .equipment
            .insert(EquipmentSlot::Armor, String::from("iron_sword"));
        state.artifact_slots.truncate(2);
        let loadout = Loadout::from_state(&content, &state);
        assert_eq!(loadout.equipped(EquipmentSlot::Armor), None);
        assert_eq!(loadout.artifact_slots().len(), ARTIFACT_SLOTS);
    }
}
