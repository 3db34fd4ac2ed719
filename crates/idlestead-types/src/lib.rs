//! Shared type definitions for the Idlestead simulation kernel.
//!
//! This crate is the single source of truth for all types used across the
//! Idlestead workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Closed vocabularies (resources, roles, bonuses, node kinds)
//! - [`content`] -- Immutable content-table records, daily tasks and
//!   achievements included
//! - [`state`] -- Mutable state records owned by the kernel's stores
//! - [`automation`] -- Automation rules, conditions, and actions
//! - [`save`] -- The versioned save payload

pub mod automation;
pub mod content;
pub mod enums;
pub mod ids;
pub mod save;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use automation::{Action, AutomationRule, Condition, NewRule, RulePatch};
pub use content::{
    AchievementDef, ArtifactDef, ArtifactPreset, BuildingDef, BuildingEffect, DailyTaskDef,
    DropEntry, EncounterNodeDef, EquipmentDef, EquipmentEffect, LoginRewardDef, MapDef,
    ResearchDef, ResearchEffect, Reward, WorldNodeDef,
};
pub use enums::{
    AchievementMetric, ArtifactTag, BonusKey, Comparator, Currency, DailyTaskKind, EquipmentSlot,
    EquipmentStat, GameSpeed, NodeKind, Rarity, ResearchUnlock, ResourceKey, RewardKind, Role,
};
pub use ids::RuleId;
pub use save::{SAVE_VERSION, SaveMeta, SavePayload};
pub use state::{
    AchievementState, ActiveBattle, CombatProfile, DailyProgress, DailyState, LoadoutState,
    MapProgress, PopulationState, PrestigeState, ResearchProgress, ResearchState, ResourceEntry,
    WorldTreeState,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::RuleId::export_all();

        // Enums
        let _ = crate::enums::ResourceKey::export_all();
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::Currency::export_all();
        let _ = crate::enums::BonusKey::export_all();
        let _ = crate::enums::NodeKind::export_all();
        let _ = crate::enums::EquipmentSlot::export_all();
        let _ = crate::enums::EquipmentStat::export_all();
        let _ = crate::enums::Rarity::export_all();
        let _ = crate::enums::ArtifactTag::export_all();
        let _ = crate::enums::ResearchUnlock::export_all();
        let _ = crate::enums::GameSpeed::export_all();
        let _ = crate::enums::Comparator::export_all();
        let _ = crate::enums::DailyTaskKind::export_all();
        let _ = crate::enums::AchievementMetric::export_all();
        let _ = crate::enums::RewardKind::export_all();

        // Content
        let _ = crate::content::WorldNodeDef::export_all();
        let _ = crate::content::DropEntry::export_all();
        let _ = crate::content::EncounterNodeDef::export_all();
        let _ = crate::content::MapDef::export_all();
        let _ = crate::content::BuildingEffect::export_all();
        let _ = crate::content::BuildingDef::export_all();
        let _ = crate::content::ResearchEffect::export_all();
        let _ = crate::content::ResearchDef::export_all();
        let _ = crate::content::EquipmentEffect::export_all();
        let _ = crate::content::EquipmentDef::export_all();
        let _ = crate::content::ArtifactDef::export_all();
        let _ = crate::content::ArtifactPreset::export_all();
        let _ = crate::content::Reward::export_all();
        let _ = crate::content::DailyTaskDef::export_all();
        let _ = crate::content::LoginRewardDef::export_all();
        let _ = crate::content::AchievementDef::export_all();

        // State
        let _ = crate::state::ResourceEntry::export_all();
        let _ = crate::state::PopulationState::export_all();
        let _ = crate::state::WorldTreeState::export_all();
        let _ = crate::state::CombatProfile::export_all();
        let _ = crate::state::MapProgress::export_all();
        let _ = crate::state::ActiveBattle::export_all();
        let _ = crate::state::PrestigeState::export_all();
        let _ = crate::state::ResearchProgress::export_all();
        let _ = crate::state::ResearchState::export_all();
        let _ = crate::state::LoadoutState::export_all();
        let _ = crate::state::DailyProgress::export_all();
        let _ = crate::state::DailyState::export_all();
        let _ = crate::state::AchievementState::export_all();

        // Automation
        let _ = crate::automation::Condition::export_all();
        let _ = crate::automation::Action::export_all();
        let _ = crate::automation::AutomationRule::export_all();
        let _ = crate::automation::NewRule::export_all();
        let _ = crate::automation::RulePatch::export_all();

        // Save
        let _ = crate::save::SaveMeta::export_all();
        let _ = crate::save::SavePayload::export_all();
    }
}
