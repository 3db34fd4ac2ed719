//! Combat and map traversal.
//!
//! A small state machine: idle, or fighting exactly one node.
//!
//! ```text
//!          start_battle (reachable + damageable)
//!   Idle ------------------------------------------> Fighting
//!    ^                                                  |
//!    +--- victory | timeout | cancel_battle | switch_map+
//! ```
//!
//! Battle progress is a pure function of `now - started_at` and the current
//! DPS, so ticking the same battle twice with the same `now` does nothing
//! new.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::{debug, info, warn};

use idlestead_types::{ActiveBattle, CombatProfile, DropEntry, MapDef, MapProgress, NodeKind};
use idlestead_world::{ContentTables, EncounterGraph, WorldError};

/// Shield nodes without shield breaker take this fraction of damage.
const SHIELD_PENALTY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// `base_attack * sqrt(gear_score) * world * artifact`, never negative.
pub fn dps(profile: &CombatProfile) -> Decimal {
    let gear = profile
        .gear_score
        .max(Decimal::ZERO)
        .sqrt()
        .unwrap_or(Decimal::ZERO);
    profile
        .base_attack
        .saturating_mul(gear)
        .saturating_mul(profile.world_multiplier)
        .saturating_mul(profile.artifact_multiplier)
        .max(Decimal::ZERO)
}

/// DPS against a node of `kind`: halved on shields unless shield breaker
/// is unlocked.
pub fn dps_against(profile: &CombatProfile, kind: NodeKind) -> Decimal {
    let base = dps(profile);
    if kind == NodeKind::Shield && !profile.shield_breaker_unlocked {
        base.saturating_mul(SHIELD_PENALTY)
    } else {
        base
    }
}

/// `ceil(hp / dps)` in whole seconds, or `None` when `dps` is zero.
pub fn time_to_kill(hp: Decimal, dps: Decimal) -> Option<u64> {
    if dps <= Decimal::ZERO {
        return None;
    }
    hp.checked_div(dps)?.ceil().to_u64()
}

/// A pure estimate for attacking a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattlePreview {
    /// Target node.
    pub node_id: String,
    /// Target hit points.
    pub node_hp: Decimal,
    /// Effective DPS against the target.
    pub dps: Decimal,
    /// Whole seconds to kill.
    pub ttk_secs: u64,
}

/// What one call to [`CombatState::tick_battle`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleOutcome {
    /// No battle in progress.
    Idle,
    /// Still fighting.
    InProgress {
        /// Target node.
        node_id: String,
        /// Damage dealt so far, capped at the node's hp.
        damage: Decimal,
        /// Target hit points.
        node_hp: Decimal,
    },
    /// The node fell. Drops have not been credited yet.
    Victory {
        /// Cleared node.
        node_id: String,
        /// Currency drops to credit.
        drops: Vec<DropEntry>,
    },
    /// The time limit ran out. Nothing cleared, nothing dropped.
    Timeout {
        /// Target node.
        node_id: String,
    },
}

/// Current map traversal, the active battle, and the cached combat profile.
#[derive(Debug, Clone)]
pub struct CombatState {
    graph: EncounterGraph,
    progress: MapProgress,
    battle: Option<ActiveBattle>,
    profile: CombatProfile,
}

impl CombatState {
    /// Fresh traversal of the starting map.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidContent`] if the starting map is missing.
    pub fn new(content: &ContentTables, profile: CombatProfile) -> Result<Self, WorldError> {
        let map = starting_map(content)?;
        Ok(Self::on_map(map, 0, profile))
    }

    /// Rebuild from saved progress.
    ///
    /// Reachability is recomputed from the cleared set. A map the content no
    /// longer has falls back to the starting map.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidContent`] if the starting map is missing.
    pub fn from_progress(
        content: &ContentTables,
        saved: &MapProgress,
        profile: CombatProfile,
    ) -> Result<Self, WorldError> {
        let Some(map) = content.map(&saved.current_map_id) else {
            warn!(
                map_id = %saved.current_map_id,
                "saved map no longer exists, starting over on the starting map"
            );
            let map = starting_map(content)?;
            return Ok(Self::on_map(map, saved.total_cleared, profile));
        };
        let graph = EncounterGraph::new(map);
        let cleared = saved
            .cleared
            .iter()
            .filter(|id| graph.node(id).is_some())
            .cloned()
            .collect();
        let reachable = graph.reachable(&cleared);
        Ok(Self {
            progress: MapProgress {
                current_map_id: map.id.clone(),
                cleared,
                reachable,
                total_cleared: saved.total_cleared,
            },
            graph,
            battle: None,
            profile,
        })
    }

    fn on_map(map: &MapDef, total_cleared: u32, profile: CombatProfile) -> Self {
        let graph = EncounterGraph::new(map);
        let reachable = graph.initial_reachable();
        Self {
            progress: MapProgress {
                current_map_id: map.id.clone(),
                cleared: BTreeSet::new(),
                reachable,
                total_cleared,
            },
            graph,
            battle: None,
            profile,
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Traversal state of the current map.
    pub const fn progress(&self) -> &MapProgress {
        &self.progress
    }

    /// The current map's graph.
    pub const fn graph(&self) -> &EncounterGraph {
        &self.graph
    }

    /// The active battle.
    pub const fn battle(&self) -> Option<&ActiveBattle> {
        self.battle.as_ref()
    }

    /// Whether a battle is in progress.
    pub const fn is_fighting(&self) -> bool {
        self.battle.is_some()
    }

    /// The cached combat profile.
    pub const fn profile(&self) -> &CombatProfile {
        &self.profile
    }

    /// Replace the cached profile. Called by multiplier resync.
    pub const fn set_profile(&mut self, profile: CombatProfile) {
        self.profile = profile;
    }

    /// Current undirected DPS.
    pub fn dps(&self) -> Decimal {
        dps(&self.profile)
    }

    /// Protected nodes on the current map that can never be damaged.
    pub fn stranded_protected_nodes(&self) -> Vec<String> {
        self.graph.stranded_protected_nodes()
    }

    // -------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------

    /// Preview attacking `node_id`.
    ///
    /// `None` if the node is unknown, unreachable, or DPS is zero.
    pub fn simulate(&self, node_id: &str) -> Option<BattlePreview> {
        let node = self.graph.node(node_id)?;
        if !self.progress.reachable.contains(node_id) {
            return None;
        }
        let dps = dps_against(&self.profile, node.kind);
        let ttk_secs = time_to_kill(node.hp, dps)?;
        Some(BattlePreview {
            node_id: node.id.clone(),
            node_hp: node.hp,
            dps,
            ttk_secs,
        })
    }

    /// Begin fighting `node_id` at `now`.
    ///
    /// Requires no battle in progress and a damageable target.
    pub fn start_battle(&mut self, node_id: &str, now: DateTime<Utc>) -> bool {
        if self.battle.is_some() {
            debug!(node_id, "battle already in progress");
            return false;
        }
        if !self
            .graph
            .can_damage(node_id, &self.progress.cleared, &self.progress.reachable)
        {
            debug!(node_id, "node cannot be damaged yet");
            return false;
        }
        let Some(node) = self.graph.node(node_id) else {
            return false;
        };
        let dps = dps_against(&self.profile, node.kind);
        let ttk_estimate_secs = time_to_kill(node.hp, dps).unwrap_or(u64::MAX);
        self.battle = Some(ActiveBattle {
            node_id: node.id.clone(),
            node_hp: node.hp,
            started_at: now,
            ttk_estimate_secs,
            time_limit_secs: node.time_limit_secs,
            current_damage: Decimal::ZERO,
        });
        info!(node_id, ttk_estimate_secs, "battle started");
        true
    }

    /// Advance the active battle to `now`.
    ///
    /// Timeout is checked before victory, so a battle that would win exactly
    /// at its limit times out. The same holds when ticks are sparse: if the
    /// first tick after the kill time is also past the limit, the battle
    /// times out.
    pub fn tick_battle(&mut self, now: DateTime<Utc>) -> BattleOutcome {
        let Some(battle) = self.battle.as_ref() else {
            return BattleOutcome::Idle;
        };
        let node_id = battle.node_id.clone();
        let node_hp = battle.node_hp;
        let elapsed_ms = now
            .signed_duration_since(battle.started_at)
            .num_milliseconds()
            .max(0);
        let elapsed = Decimal::new(elapsed_ms, 3);

        if let Some(limit) = battle
            .time_limit_secs
            .filter(|&limit| elapsed >= Decimal::from(limit))
        {
            self.battle = None;
            info!(node_id = %node_id, limit_secs = limit, "battle timed out");
            return BattleOutcome::Timeout { node_id };
        }

        let Some(kind) = self.graph.node(&node_id).map(|node| node.kind) else {
            warn!(node_id = %node_id, "battle target vanished from map, discarding");
            self.battle = None;
            return BattleOutcome::Idle;
        };
        let damage = dps_against(&self.profile, kind).saturating_mul(elapsed);

        if damage >= node_hp {
            return self.resolve_victory(node_id);
        }

        if let Some(active) = self.battle.as_mut() {
            active.current_damage = damage;
        }
        BattleOutcome::InProgress {
            node_id,
            damage,
            node_hp,
        }
    }

    fn resolve_victory(&mut self, node_id: String) -> BattleOutcome {
        self.battle = None;
        self.progress.cleared.insert(node_id.clone());
        self.progress.reachable = self.graph.reachable(&self.progress.cleared);
        self.progress.total_cleared = self.progress.total_cleared.saturating_add(1);
        let drops = self
            .graph
            .node(&node_id)
            .map(|node| node.drops.clone())
            .unwrap_or_default();
        info!(
            node_id = %node_id,
            total_cleared = self.progress.total_cleared,
            "node cleared"
        );
        BattleOutcome::Victory { node_id, drops }
    }

    /// Abandon the active battle. Returns whether there was one.
    pub fn cancel_battle(&mut self) -> bool {
        let cancelled = self.battle.take();
        if let Some(battle) = &cancelled {
            info!(node_id = %battle.node_id, "battle cancelled");
        }
        cancelled.is_some()
    }

    /// Move to `map_id` if the aggregate clear count allows it.
    ///
    /// Resets cleared and reachable to the new map's entry and discards any
    /// battle.
    pub fn switch_map(&mut self, content: &ContentTables, map_id: &str) -> bool {
        let Some(map) = content.map(map_id) else {
            debug!(map_id, "unknown map");
            return false;
        };
        if map.required_clears > self.progress.total_cleared {
            debug!(
                map_id,
                required = map.required_clears,
                total_cleared = self.progress.total_cleared,
                "map locked"
            );
            return false;
        }
        *self = Self::on_map(map, self.progress.total_cleared, self.profile);
        info!(map_id, "switched map");
        true
    }

    /// Maps unlocked by the aggregate clear count.
    pub fn available_maps<'a>(&self, content: &'a ContentTables) -> Vec<&'a MapDef> {
        content.available_maps(self.progress.total_cleared).collect()
    }

    /// Back to the starting map with the aggregate counter at zero.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidContent`] if the starting map is missing.
    pub fn reset_run(&mut self, content: &ContentTables) -> Result<(), WorldError> {
        let map = starting_map(content)?;
        *self = Self::on_map(map, 0, self.profile);
        Ok(())
    }
}

fn starting_map(content: &ContentTables) -> Result<&MapDef, WorldError> {
    content
        .map(&content.starting_map)
        .ok_or_else(|| WorldError::InvalidContent {
            reason: format!("starting map {} does not exist", content.starting_map),
        })
}
