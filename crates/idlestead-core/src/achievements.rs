//! Lifetime achievements.
//!
//! Each achievement watches one statistic of the game and unlocks once the
//! statistic reaches its target. Unlocks are permanent until a full reset.
//! Claiming an unlocked achievement pays its points once.

use rust_decimal::Decimal;
use tracing::{info, warn};

use idlestead_types::{AchievementMetric, AchievementState};
use idlestead_world::ContentTables;

/// Statistics achievements are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementStats {
    /// Clears across all maps.
    pub nodes_cleared: u32,
    /// Prestiges since the last awakening.
    pub total_prestige: u32,
    /// Sum of building levels.
    pub building_levels: u32,
    /// Completed research projects.
    pub research_count: u32,
    /// Artifacts owned.
    pub artifact_count: u32,
    /// World-tree nodes purchased.
    pub world_nodes: u32,
}

impl AchievementStats {
    /// Current value of `metric`.
    pub const fn get(&self, metric: AchievementMetric) -> u32 {
        match metric {
            AchievementMetric::NodesCleared => self.nodes_cleared,
            AchievementMetric::TotalPrestige => self.total_prestige,
            AchievementMetric::BuildingLevels => self.building_levels,
            AchievementMetric::ResearchCount => self.research_count,
            AchievementMetric::ArtifactCount => self.artifact_count,
            AchievementMetric::WorldNodes => self.world_nodes,
        }
    }
}

/// Unlocked and claimed achievements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Achievements {
    state: AchievementState,
}

impl Achievements {
    /// Nothing unlocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state, dropping ids the content no longer has.
    pub fn from_state(content: &ContentTables, state: &AchievementState) -> Self {
        let mut state = state.clone();
        state.unlocked.retain(|id| {
            let known = content.achievement(id).is_some();
            if !known {
                warn!(achievement_id = %id, "dropping unknown achievement from save");
            }
            known
        });
        let unlocked = &state.unlocked;
        state.claimed.retain(|id| unlocked.contains(id));
        Self { state }
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> AchievementState {
        self.state.clone()
    }

    /// Whether `id` has been unlocked.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.state.unlocked.iter().any(|unlocked| unlocked == id)
    }

    /// Whether `id`'s points have been paid out.
    pub fn is_claimed(&self, id: &str) -> bool {
        self.state.claimed.contains(id)
    }

    /// Ids unlocked so far, in unlock order.
    pub fn unlocked(&self) -> &[String] {
        &self.state.unlocked
    }

    /// Points earned from claims.
    pub const fn total_points(&self) -> Decimal {
        self.state.total_points
    }

    /// `(current, target)` for `id`, with current capped at target.
    pub fn progress(
        &self,
        content: &ContentTables,
        id: &str,
        stats: &AchievementStats,
    ) -> Option<(u32, u32)> {
        let def = content.achievement(id)?;
        Some((stats.get(def.metric).min(def.target), def.target))
    }

    /// Unlock every achievement whose target `stats` now meets. Returns the
    /// newly unlocked ids.
    pub fn check(&mut self, content: &ContentTables, stats: &AchievementStats) -> Vec<String> {
        let fresh: Vec<String> = content
            .achievements
            .iter()
            .filter(|def| !self.is_unlocked(&def.id) && stats.get(def.metric) >= def.target)
            .map(|def| def.id.clone())
            .collect();
        for id in &fresh {
            info!(achievement_id = %id, "achievement unlocked");
        }
        self.state.unlocked.extend(fresh.iter().cloned());
        fresh
    }

    /// Pay out an unlocked achievement's points. Returns the points, or
    /// `None` if `id` is locked, unknown, or already claimed.
    pub fn claim(&mut self, content: &ContentTables, id: &str) -> Option<Decimal> {
        let def = content.achievement(id)?;
        if !self.is_unlocked(id) || self.is_claimed(id) {
            return None;
        }
        self.state.claimed.insert(def.id.clone());
        self.state.total_points = self.state.total_points.saturating_add(def.points);
        info!(
            achievement_id = %id,
            points = %def.points,
            total_points = %self.state.total_points,
            "achievement claimed"
        );
        Some(def.points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn check_unlocks_only_reached_targets() {
        let content = ContentTables::builtin();
        let mut achievements = Achievements::new();
        let stats = AchievementStats {
            nodes_cleared: 12,
            building_levels: 9,
            ..AchievementStats::default()
        };
        let fresh = achievements.check(&content, &stats);
        assert_eq!(fresh, vec![String::from("first_node"), String::from("explorer10")]);
        assert!(!achievements.is_unlocked("builder10"));

        // Already unlocked ids are not reported twice.
        assert!(achievements.check(&content, &stats).is_empty());

        let stats = AchievementStats {
            building_levels: 10,
            ..stats
        };
        assert_eq!(achievements.check(&content, &stats), vec![String::from("builder10")]);
    }

    #[test]
    fn progress_is_capped_at_target() {
        let content = ContentTables::builtin();
        let achievements = Achievements::new();
        let stats = AchievementStats {
            research_count: 4,
            ..AchievementStats::default()
        };
        assert_eq!(
            achievements.progress(&content, "researcher3", &stats),
            Some((3, 3))
        );
        assert_eq!(
            achievements.progress(&content, "research_master", &stats),
            Some((4, 6))
        );
        assert_eq!(achievements.progress(&content, "no_such", &stats), None);
    }

    #[test]
    fn claim_pays_points_once() {
        let content = ContentTables::builtin();
        let mut achievements = Achievements::new();
        assert_eq!(achievements.claim(&content, "first_node"), None);

        let stats = AchievementStats {
            nodes_cleared: 1,
            ..AchievementStats::default()
        };
        achievements.check(&content, &stats);
        assert_eq!(achievements.claim(&content, "first_node"), Some(dec!(10)));
        assert_eq!(achievements.claim(&content, "first_node"), None);
        assert_eq!(achievements.total_points(), dec!(10));
    }

    #[test]
    fn restore_drops_unknown_ids() {
        let content = ContentTables::builtin();
        let state = AchievementState {
            unlocked: vec![String::from("first_node"), String::from("retired")],
            claimed: [String::from("first_node"), String::from("retired")]
                .into_iter()
                .collect(),
            total_points: dec!(10),
        };
        let restored = Achievements::from_state(&content, &state);
        assert_eq!(restored.unlocked(), [String::from("first_node")]);
        assert!(restored.is_claimed("first_node"));
        assert!(!restored.is_claimed("retired"));
        assert_eq!(restored.total_points(), dec!(10));
    }
}
