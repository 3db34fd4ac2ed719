//! Content tables: the immutable catalogue of maps, world-tree nodes,
//! buildings, research, equipment, artifacts, daily tasks, and achievements.
//!
//! Tables are either the built-in set ([`ContentTables::builtin`]) or a
//! replacement loaded from YAML ([`ContentTables::from_file`]). Either way
//! they pass [`ContentTables::validate`] before the kernel uses them, so
//! later lookups can treat a missing id as a runtime request for something
//! that does not exist rather than as a broken table.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use idlestead_types::{
    AchievementDef, ArtifactDef, ArtifactPreset, BuildingDef, DailyTaskDef, EquipmentDef,
    LoginRewardDef, MapDef, NodeKind, ResearchDef, WorldNodeDef,
};

use crate::builtin::builtin_content;
use crate::error::WorldError;

/// Number of artifact slots in a loadout.
pub const ARTIFACT_SLOTS: usize = 5;

/// The full set of authored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTables {
    /// Map a fresh run starts on.
    pub starting_map: String,
    /// World-tree nodes.
    pub world_nodes: Vec<WorldNodeDef>,
    /// Maps in unlock order.
    pub maps: Vec<MapDef>,
    /// Buildings.
    pub buildings: Vec<BuildingDef>,
    /// Research projects.
    pub research: Vec<ResearchDef>,
    /// Equipment.
    pub equipment: Vec<EquipmentDef>,
    /// Artifacts granted to a new player.
    pub artifacts: Vec<ArtifactDef>,
    /// Artifact presets granted to a new player.
    pub starter_presets: Vec<ArtifactPreset>,
    /// Pool today's tasks are drawn from.
    #[serde(default)]
    pub daily_tasks: Vec<DailyTaskDef>,
    /// Reward per day of the login streak.
    #[serde(default)]
    pub login_rewards: Vec<LoginRewardDef>,
    /// Lifetime milestones.
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
}

impl ContentTables {
    /// The built-in content set.
    pub fn builtin() -> Self {
        builtin_content()
    }

    /// Load and validate content from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read,
    /// [`WorldError::Yaml`] if it does not parse, or a validation error.
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate content from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Yaml`] if the string does not parse, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, WorldError> {
        let tables: Self = serde_yml::from_str(yaml)?;
        tables.validate()?;
        Ok(tables)
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Look up a world-tree node.
    pub fn world_node(&self, id: &str) -> Option<&WorldNodeDef> {
        self.world_nodes.iter().find(|n| n.id == id)
    }

    /// Look up a map.
    pub fn map(&self, id: &str) -> Option<&MapDef> {
        self.maps.iter().find(|m| m.id == id)
    }

    /// Look up a building.
    pub fn building(&self, id: &str) -> Option<&BuildingDef> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Look up a research project.
    pub fn research(&self, id: &str) -> Option<&ResearchDef> {
        self.research.iter().find(|r| r.id == id)
    }

    /// Look up an equipment item.
    pub fn equipment(&self, id: &str) -> Option<&EquipmentDef> {
        self.equipment.iter().find(|e| e.id == id)
    }

    /// Look up an artifact.
    pub fn artifact(&self, id: &str) -> Option<&ArtifactDef> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Look up a daily task.
    pub fn daily_task(&self, id: &str) -> Option<&DailyTaskDef> {
        self.daily_tasks.iter().find(|t| t.id == id)
    }

    /// Reward for streak day `day`.
    pub fn login_reward(&self, day: u32) -> Option<&LoginRewardDef> {
        self.login_rewards.iter().find(|r| r.day == day)
    }

    /// Look up an achievement.
    pub fn achievement(&self, id: &str) -> Option<&AchievementDef> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// Maps whose clear requirement is met by `total_cleared`.
    pub fn available_maps(&self, total_cleared: u32) -> impl Iterator<Item = &MapDef> {
        self.maps
            .iter()
            .filter(move |m| m.required_clears <= total_cleared)
    }

    // -------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------

    /// Check ids are unique and every cross-reference resolves.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), WorldError> {
        unique("world_node", self.world_nodes.iter().map(|n| n.id.as_str()))?;
        unique("map", self.maps.iter().map(|m| m.id.as_str()))?;
        unique("building", self.buildings.iter().map(|b| b.id.as_str()))?;
        unique("research", self.research.iter().map(|r| r.id.as_str()))?;
        unique("equipment", self.equipment.iter().map(|e| e.id.as_str()))?;
        unique("artifact", self.artifacts.iter().map(|a| a.id.as_str()))?;
        unique("daily_task", self.daily_tasks.iter().map(|t| t.id.as_str()))?;
        unique("achievement", self.achievements.iter().map(|a| a.id.as_str()))?;

        for node in &self.world_nodes {
            for reference in node.prerequisites.iter().chain(&node.unlocks) {
                if self.world_node(reference).is_none() {
                    return Err(dangling("world_node", &node.id, reference));
                }
            }
        }

        if self.map(&self.starting_map).is_none() {
            return Err(WorldError::InvalidContent {
                reason: format!("starting map {} does not exist", self.starting_map),
            });
        }
        for map in &self.maps {
            validate_map(map)?;
        }

        for building in &self.buildings {
            if building.cost_multiplier <= rust_decimal::Decimal::ZERO {
                return Err(WorldError::InvalidContent {
                    reason: format!("building {} has non-positive cost multiplier", building.id),
                });
            }
        }

        for project in &self.research {
            for prerequisite in &project.prerequisites {
                if self.research(prerequisite).is_none() {
                    return Err(dangling("research", &project.id, prerequisite));
                }
            }
        }

        for preset in &self.starter_presets {
            if preset.slots.len() != ARTIFACT_SLOTS {
                return Err(WorldError::InvalidContent {
                    reason: format!(
                        "preset {} has {} slots, expected {ARTIFACT_SLOTS}",
                        preset.name,
                        preset.slots.len()
                    ),
                });
            }
            for artifact in preset.slots.iter().flatten() {
                if self.artifact(artifact).is_none() {
                    return Err(dangling("preset", &preset.name, artifact));
                }
            }
        }

        let mut days = BTreeSet::new();
        for reward in &self.login_rewards {
            if reward.day == 0 || !days.insert(reward.day) {
                return Err(WorldError::InvalidContent {
                    reason: format!("login reward day {} is zero or repeated", reward.day),
                });
            }
        }
        for task in &self.daily_tasks {
            if task.target == 0 {
                return Err(WorldError::InvalidContent {
                    reason: format!("daily task {} has a zero target", task.id),
                });
            }
        }

        Ok(())
    }
}

impl Default for ContentTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn unique<'a>(
    table: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), WorldError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(WorldError::DuplicateId {
                table,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn dangling(table: &'static str, owner: &str, missing: &str) -> WorldError {
    WorldError::DanglingReference {
        table,
        owner: owner.to_string(),
        missing: missing.to_string(),
    }
}

fn validate_map(map: &MapDef) -> Result<(), WorldError> {
    unique("encounter_node", map.nodes.iter().map(|n| n.id.as_str()))?;
    if map.node(&map.entry_node).is_none() {
        return Err(dangling("map", &map.id, &map.entry_node));
    }
    for node in &map.nodes {
        for target in &node.adjacent {
            if map.node(target).is_none() {
                return Err(dangling("encounter_node", &node.id, target));
            }
        }
        if node.hp <= rust_decimal::Decimal::ZERO {
            return Err(WorldError::InvalidContent {
                reason: format!("node {} on map {} has non-positive hp", node.id, map.id),
            });
        }
        if node.kind == NodeKind::Timed && node.time_limit_secs.is_none() {
            return Err(WorldError::InvalidContent {
                reason: format!("timed node {} on map {} has no time limit", node.id, map.id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_is_valid() {
        let tables = ContentTables::builtin();
        tables.validate().unwrap();
        assert_eq!(tables.maps.len(), 6);
        assert_eq!(tables.map("tutorial").unwrap().entry_node, "t1");
    }

    #[test]
    fn available_maps_follow_clear_requirement() {
        let tables = ContentTables::builtin();
        let ids: Vec<&str> = tables.available_maps(7).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tutorial", "forest", "desert"]);
    }

    #[test]
    fn yaml_round_trip_preserves_tables() {
        let tables = ContentTables::builtin();
        let yaml = serde_yml::to_string(&tables).unwrap();
        let parsed = ContentTables::parse(&yaml).unwrap();
        assert_eq!(parsed, tables);
    }

    #[test]
    fn dangling_adjacency_is_rejected() {
        let mut tables = ContentTables::builtin();
        if let Some(node) = tables.maps.first_mut().and_then(|m| m.nodes.first_mut()) {
            node.adjacent.push(String::from("nowhere"));
        }
        assert!(matches!(
            tables.validate(),
            Err(WorldError::DanglingReference { .. })
        ));
    }

    #[test]
    fn login_days_must_be_distinct() {
        let mut tables = ContentTables::builtin();
        let repeat = tables.login_rewards.first().copied().unwrap();
        tables.login_rewards.push(repeat);
        assert!(matches!(
            tables.validate(),
            Err(WorldError::InvalidContent { .. })
        ));
    }

    #[test]
    fn content_without_daily_tables_still_parses() {
        let mut value = serde_yml::to_value(ContentTables::builtin()).unwrap();
        let mapping = value.as_mapping_mut().unwrap();
        for key in ["daily_tasks", "login_rewards", "achievements"] {
            mapping.remove(key);
        }
        let yaml = serde_yml::to_string(&value).unwrap();
        let parsed = ContentTables::parse(&yaml).unwrap();
        assert!(parsed.daily_tasks.is_empty());
        assert!(parsed.achievement("first_node").is_none());
        assert!(ContentTables::builtin().login_reward(7).is_some());
    }

    #[test]
    fn duplicate_building_is_rejected() {
        let mut tables = ContentTables::builtin();
        let copy = tables.buildings.first().cloned().unwrap();
        tables.buildings.push(copy);
        assert!(matches!(
            tables.validate(),
            Err(WorldError::DuplicateId { table: "building", .. })
        ));
    }
}
