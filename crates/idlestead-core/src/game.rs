//! The complete game state and every player-facing operation on it.
//!
//! [`Game`] owns one instance of each store. Operations that change a
//! multiplier source (world tree, loadout, prestige, research, buildings)
//! call [`Game::resync_multipliers`] before returning, so cached copies in
//! the resource ledger and combat profile are never stale when production
//! next runs.
//!
//! Player activity (clears, upgrades, research, artifact swaps) is also
//! counted toward the daily task board.
//!
//! Invalid requests return `false` or `None` and leave the state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use idlestead_ledger::{
    DEFAULT_CAP, DEFAULT_TOTAL, LedgerError, PopulationLedger, ResourceLedger,
};
use idlestead_types::{
    AutomationRule, BonusKey, CombatProfile, Currency, DailyTaskKind, EquipmentSlot,
    EquipmentStat, GameSpeed, NewRule, ResearchUnlock, ResourceKey, Reward, RewardKind, Role,
    RuleId, RulePatch, SAVE_VERSION, SaveMeta, SavePayload,
};
use idlestead_world::{ContentTables, WorldError, WorldTree};

use crate::achievements::{AchievementStats, Achievements};
use crate::automation::{AutomationReport, RuleContext, RuleEngine};
use crate::buildings::Buildings;
use crate::clock::{ClockError, GameClock};
use crate::combat::{BattleOutcome, BattlePreview, CombatState};
use crate::config::{CombatConfig, KernelConfig};
use crate::daily::{DailyTasks, LoginCheck};
use crate::loadout::Loadout;
use crate::multiplier::MultiplierAggregator;
use crate::offline;
use crate::prestige::{self, Prestige};
use crate::production::{self, ProductionModifiers};
use crate::research::ResearchBook;

/// Errors building or restoring a [`Game`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The content tables cannot support a game (e.g. no starting map).
    #[error("content error: {0}")]
    Content(#[from] WorldError),

    /// A saved ledger value is invalid.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Production credited for time spent offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineReport {
    /// Seconds credited after capping.
    pub seconds: i64,
    /// Applied deltas per resource.
    pub produced: BTreeMap<ResourceKey, Decimal>,
}

/// Every store of one player's game.
#[derive(Debug, Clone)]
pub struct Game {
    content: Arc<ContentTables>,
    config: KernelConfig,
    clock: GameClock,
    resources: ResourceLedger,
    population: PopulationLedger,
    world_tree: WorldTree,
    combat: CombatState,
    prestige: Prestige,
    buildings: Buildings,
    research: ResearchBook,
    loadout: Loadout,
    automation: RuleEngine,
    daily: DailyTasks,
    achievements: Achievements,
}

fn base_profile(combat: &CombatConfig) -> CombatProfile {
    CombatProfile {
        base_attack: combat.base_attack,
        base_health: combat.base_health,
        base_defense: combat.base_defense,
        gear_score: Decimal::ONE,
        world_multiplier: Decimal::ONE,
        artifact_multiplier: Decimal::ONE,
        shield_breaker_unlocked: false,
    }
}

impl Game {
    /// A brand-new game whose last tick is `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Content`] if the content has no starting map.
    pub fn new(
        content: Arc<ContentTables>,
        config: &KernelConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, StateError> {
        let combat = CombatState::new(&content, base_profile(&config.combat))?;
        let world_tree = WorldTree::new(&content);
        let loadout = Loadout::new(&content);
        let mut game = Self {
            content,
            config: config.clone(),
            clock: GameClock::new(now),
            resources: ResourceLedger::new(),
            population: PopulationLedger::new(),
            world_tree,
            combat,
            prestige: Prestige::new(),
            buildings: Buildings::new(),
            research: ResearchBook::new(),
            loadout,
            automation: RuleEngine::new(),
            daily: DailyTasks::new(),
            achievements: Achievements::new(),
        };
        game.resync_multipliers();
        Ok(game)
    }

    /// Build a complete game from a save.
    ///
    /// Unknown content ids are dropped with a warning, reachability is
    /// recomputed from the cleared set, and multipliers are resynced. The
    /// active battle is not saved, so the restored game is idle.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the save holds an invalid ledger value or
    /// the content has no starting map.
    pub fn restore(
        content: Arc<ContentTables>,
        config: &KernelConfig,
        payload: &SavePayload,
    ) -> Result<Self, StateError> {
        let combat =
            CombatState::from_progress(&content, &payload.map, base_profile(&config.combat))?;
        let mut game = Self {
            config: config.clone(),
            clock: GameClock::from_parts(0, payload.last_tick_at, payload.meta.playtime_secs),
            resources: ResourceLedger::from_entries(&payload.resources)?,
            population: PopulationLedger::from_state(&payload.population),
            world_tree: WorldTree::from_state(&payload.world_tree)?,
            combat,
            prestige: Prestige::from_state(payload.prestige),
            buildings: Buildings::from_levels(&content, &payload.buildings),
            research: ResearchBook::from_state(&content, &payload.research),
            loadout: Loadout::from_state(&content, &payload.loadout),
            automation: RuleEngine::from_saved(&payload.automation_rules),
            daily: DailyTasks::from_state(&content, &payload.daily),
            achievements: Achievements::from_state(&content, &payload.achievements),
            content,
        };
        game.resync_multipliers();
        info!(
            map_id = %game.combat.progress().current_map_id,
            total_cleared = game.combat.progress().total_cleared,
            rules = game.automation.rules().len(),
            "game restored"
        );
        Ok(game)
    }

    /// Everything needed to rebuild this game.
    pub fn snapshot(&self, now: DateTime<Utc>, speed: GameSpeed) -> SavePayload {
        SavePayload {
            meta: SaveMeta {
                version: SAVE_VERSION.to_owned(),
                saved_at: now,
                playtime_secs: self.clock.playtime_secs(),
            },
            resources: self.resources.entries().clone(),
            population: self.population.to_state(),
            world_tree: self.world_tree.to_state(),
            map: self.combat.progress().clone(),
            prestige: self.prestige.state(),
            buildings: self.buildings.levels().clone(),
            research: self.research.to_state(),
            loadout: self.loadout.to_state(),
            automation_rules: self.automation.to_saved(),
            daily: self.daily.to_state(),
            achievements: self.achievements.to_state(),
            speed,
            last_tick_at: self.clock.last_tick_at(),
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Content tables.
    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    /// The clock.
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Resource ledger.
    pub const fn resources(&self) -> &ResourceLedger {
        &self.resources
    }

    /// Population ledger.
    pub const fn population(&self) -> &PopulationLedger {
        &self.population
    }

    /// World tree and wallet.
    pub const fn world_tree(&self) -> &WorldTree {
        &self.world_tree
    }

    /// Combat and map traversal.
    pub const fn combat(&self) -> &CombatState {
        &self.combat
    }

    /// Prestige counters.
    pub const fn prestige(&self) -> &Prestige {
        &self.prestige
    }

    /// Building levels.
    pub const fn buildings(&self) -> &Buildings {
        &self.buildings
    }

    /// Research progress.
    pub const fn research(&self) -> &ResearchBook {
        &self.research
    }

    /// Equipment and artifacts.
    pub const fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Automation rules.
    pub const fn automation(&self) -> &RuleEngine {
        &self.automation
    }

    /// Login streak and daily tasks.
    pub const fn daily(&self) -> &DailyTasks {
        &self.daily
    }

    /// Unlocked and claimed achievements.
    pub const fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    /// A live view over every multiplier source.
    pub fn multipliers(&self) -> MultiplierAggregator<'_> {
        MultiplierAggregator::new(
            &self.content,
            &self.world_tree,
            &self.loadout,
            &self.prestige,
        )
    }

    // -------------------------------------------------------------------
    // Multiplier sync
    // -------------------------------------------------------------------

    /// Push fresh copies of every cached multiplier.
    ///
    /// Order matters: world tree, research, and prestige combine into the
    /// per-resource multiplier, buildings then set caps and population, and
    /// finally the combat profile is rebuilt from the loadout.
    pub fn resync_multipliers(&mut self) {
        let content = &*self.content;
        let agg = MultiplierAggregator::new(
            content,
            &self.world_tree,
            &self.loadout,
            &self.prestige,
        );
        let prestige = agg.prestige_multiplier();
        let resource = agg
            .world(BonusKey::Resource)
            .saturating_mul(self.research.multiplier(content, BonusKey::Resource))
            .saturating_mul(prestige);
        let attack = agg
            .world(BonusKey::Attack)
            .saturating_mul(self.research.multiplier(content, BonusKey::Attack))
            .saturating_mul(prestige);
        let artifact_attack = agg.artifacts(BonusKey::Attack);

        for key in ResourceKey::ALL {
            let cap = DEFAULT_CAP.saturating_add(self.buildings.cap_bonus(content, key));
            self.resources.set_cap(key, cap);
            let multiplier =
                resource.saturating_mul(self.buildings.resource_multiplier(content, key));
            self.resources.set_multiplier(key, multiplier);
        }
        self.population
            .set_total(DEFAULT_TOTAL.saturating_add(self.buildings.population_bonus(content)));

        let base = &self.config.combat;
        self.combat.set_profile(CombatProfile {
            base_attack: base
                .base_attack
                .saturating_add(self.loadout.flat_stat(content, EquipmentStat::Attack)),
            base_health: base
                .base_health
                .saturating_add(self.loadout.flat_stat(content, EquipmentStat::Health)),
            base_defense: base
                .base_defense
                .saturating_add(self.loadout.flat_stat(content, EquipmentStat::Defense)),
            gear_score: self.loadout.gear_score(content),
            world_multiplier: attack,
            artifact_multiplier: artifact_attack,
            shield_breaker_unlocked: self.world_tree.grants(content, BonusKey::ShieldBreak)
                || self
                    .research
                    .has_unlock(content, ResearchUnlock::ShieldBreaker),
        });
    }

    /// Factors production reads live rather than from the ledger.
    pub fn production_modifiers(&self) -> ProductionModifiers {
        let content = &*self.content;
        let job = Decimal::ONE
            .saturating_add(self.loadout.flat_stat(content, EquipmentStat::Efficiency));
        ProductionModifiers {
            job_efficiency: Role::ALL.iter().map(|&role| (role, job)).collect(),
            building_efficiency: Role::ALL
                .iter()
                .map(|&role| (role, self.buildings.efficiency(content, role)))
                .collect(),
            artifact_multiplier: self
                .loadout
                .artifact_multiplier(content, BonusKey::Resource),
            state_modifier: Decimal::ONE,
        }
    }

    /// Building cost factor from the world tree, artifacts, and research.
    pub fn building_cost_bonus(&self) -> Decimal {
        self.multipliers()
            .get_multiplier(BonusKey::BuildingCost)
            .saturating_mul(
                self.research
                    .multiplier(&self.content, BonusKey::BuildingCost),
            )
    }

    // -------------------------------------------------------------------
    // Tick phases
    // -------------------------------------------------------------------

    /// Drop the wall-clock time since the last tick, as after a pause.
    pub const fn skip_paused_time(&mut self, now: DateTime<Utc>) {
        self.clock.touch(now);
    }

    /// Start a tick at `now`; returns the tick number and elapsed seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter is exhausted.
    pub fn advance_clock(&mut self, now: DateTime<Utc>) -> Result<(u64, i64), ClockError> {
        self.clock.advance(now)
    }

    /// Run production for `elapsed_seconds`. Returns the applied deltas.
    pub fn advance_production(&mut self, elapsed_seconds: i64) -> BTreeMap<ResourceKey, Decimal> {
        let modifiers = self.production_modifiers();
        production::advance(
            &mut self.resources,
            &self.population,
            &modifiers,
            elapsed_seconds,
        )
    }

    /// Complete the current research if due. Resyncs on completion.
    pub fn tick_research(&mut self, now: DateTime<Utc>) -> Option<String> {
        let done = self.research.tick(now)?;
        self.resync_multipliers();
        self.daily
            .record(&self.content, DailyTaskKind::CompleteResearch, 1);
        Some(done)
    }

    /// Advance the active battle and credit drops on victory.
    pub fn tick_battle(&mut self, now: DateTime<Utc>) -> BattleOutcome {
        let outcome = self.combat.tick_battle(now);
        if let BattleOutcome::Victory { drops, .. } = &outcome {
            for drop in drops {
                self.world_tree
                    .add_currency(drop.currency, Decimal::from(drop.weight));
            }
            self.daily
                .record(&self.content, DailyTaskKind::ClearNodes, 1);
        }
        outcome
    }

    /// Evaluate automation rules once.
    pub fn run_automation(&mut self) -> AutomationReport {
        let engine = std::mem::take(&mut self.automation);
        let report = engine.tick(self);
        self.automation = engine;
        report
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Assign `value` heads to `role`. Negative values are rejected.
    pub fn set_population(&mut self, role: Role, value: i64) -> bool {
        self.population.assign(role, value)
    }

    // -------------------------------------------------------------------
    // World tree
    // -------------------------------------------------------------------

    /// Purchase a world-tree node.
    pub fn purchase_world_node(&mut self, node_id: &str) -> bool {
        if !self.world_tree.purchase(&self.content, node_id) {
            return false;
        }
        self.resync_multipliers();
        true
    }

    // -------------------------------------------------------------------
    // Combat
    // -------------------------------------------------------------------

    /// Preview attacking `node_id`.
    pub fn simulate(&self, node_id: &str) -> Option<BattlePreview> {
        self.combat.simulate(node_id)
    }

    /// Start a battle against `node_id`.
    pub fn start_battle(&mut self, node_id: &str, now: DateTime<Utc>) -> bool {
        self.combat.start_battle(node_id, now)
    }

    /// Abandon the active battle.
    pub fn cancel_battle(&mut self) -> bool {
        self.combat.cancel_battle()
    }

    /// Move to another map.
    pub fn switch_map(&mut self, map_id: &str) -> bool {
        self.combat.switch_map(&self.content, map_id)
    }

    /// Ids of maps unlocked by the aggregate clear count.
    pub fn available_maps(&self) -> Vec<String> {
        self.combat
            .available_maps(&self.content)
            .into_iter()
            .map(|map| map.id.clone())
            .collect()
    }

    // -------------------------------------------------------------------
    // Buildings and research
    // -------------------------------------------------------------------

    /// Pay for and apply one level of `building_id`.
    pub fn upgrade_building(&mut self, building_id: &str) -> bool {
        let bonus = self.building_cost_bonus();
        if !self
            .buildings
            .upgrade(&self.content, building_id, bonus, &mut self.resources)
        {
            return false;
        }
        self.resync_multipliers();
        self.daily
            .record(&self.content, DailyTaskKind::UpgradeBuilding, 1);
        true
    }

    /// Pay for and start `research_id`.
    pub fn start_research(&mut self, research_id: &str, now: DateTime<Utc>) -> bool {
        self.research
            .start(&self.content, research_id, now, &mut self.world_tree)
    }

    // -------------------------------------------------------------------
    // Loadout
    // -------------------------------------------------------------------

    /// Equip an item into its slot.
    pub fn equip_item(&mut self, equipment_id: &str) -> bool {
        let changed = self.loadout.equip_item(&self.content, equipment_id);
        self.resync_if(changed)
    }

    /// Empty an equipment slot.
    pub fn unequip_slot(&mut self, slot: EquipmentSlot) -> bool {
        let changed = self.loadout.unequip_slot(slot);
        self.resync_if(changed)
    }

    /// Put an owned artifact into an artifact slot.
    pub fn equip_artifact(&mut self, artifact_id: &str, slot: usize) -> bool {
        let changed = self.loadout.equip_artifact(artifact_id, slot);
        if changed {
            self.daily
                .record(&self.content, DailyTaskKind::EquipArtifact, 1);
        }
        self.resync_if(changed)
    }

    /// Empty an artifact slot.
    pub fn unequip_artifact(&mut self, slot: usize) -> bool {
        let changed = self.loadout.unequip_artifact(slot);
        self.resync_if(changed)
    }

    /// Replace every artifact slot with a preset.
    pub fn switch_preset(&mut self, index: usize) -> bool {
        let changed = self.loadout.switch_preset(index);
        self.resync_if(changed)
    }

    fn resync_if(&mut self, changed: bool) -> bool {
        if changed {
            self.resync_multipliers();
        }
        changed
    }

    // -------------------------------------------------------------------
    // Prestige and awakening
    // -------------------------------------------------------------------

    /// Whether the aggregate clear count allows a prestige.
    pub const fn can_prestige(&self) -> bool {
        Prestige::can_prestige(self.combat.progress().total_cleared)
    }

    /// Legacy points a prestige would grant now.
    pub fn prestige_gain(&self) -> Decimal {
        prestige::prestige_gain(
            self.combat.progress().total_cleared,
            self.buildings.total_levels(),
        )
    }

    /// Trade the current run for legacy points.
    ///
    /// World-tree purchases, currencies, research, and the loadout persist.
    /// Returns the points gained.
    pub fn do_prestige(&mut self) -> Option<Decimal> {
        if !self.can_prestige() {
            return None;
        }
        let gain = self.prestige_gain();
        self.prestige.credit_prestige(gain);
        self.reset_run();
        Some(gain)
    }

    /// Whether an awakening is allowed.
    pub fn can_awaken(&self) -> bool {
        self.prestige.can_awaken()
    }

    /// Crystals an awakening would grant now.
    pub fn awakening_gain(&self) -> Decimal {
        self.prestige.awakening_gain()
    }

    /// Trade layer-1 progress for crystals and reset the run.
    pub fn do_awaken(&mut self) -> Option<Decimal> {
        let gain = self.prestige.awaken()?;
        self.reset_run();
        Some(gain)
    }

    /// Everything back to a brand-new game, crystals and world tree
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Content`] if the content has no starting map.
    pub fn full_reset(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        let fresh = Self::new(Arc::clone(&self.content), &self.config, now)?;
        *self = fresh;
        warn!("full game reset");
        Ok(())
    }

    fn reset_run(&mut self) {
        self.resources = ResourceLedger::new();
        self.population = PopulationLedger::new();
        self.buildings = Buildings::new();
        if let Err(err) = self.combat.reset_run(&self.content) {
            warn!(error = %err, "run reset could not return to the starting map");
        }
        self.resync_multipliers();
    }

    // -------------------------------------------------------------------
    // Offline progress
    // -------------------------------------------------------------------

    /// Credit production for the time since the last tick, capped at the
    /// offline limit, and move the clock to `now`.
    pub fn apply_offline_progress(&mut self, now: DateTime<Utc>) -> OfflineReport {
        let cap = offline::cap_hours(
            self.config.offline.base_hours,
            self.world_tree
                .multiplier(&self.content, BonusKey::OfflineCap),
        );
        let seconds = offline::offline_seconds(self.clock.last_tick_at(), now, cap);
        let produced = if seconds > 0 {
            self.advance_production(seconds)
        } else {
            BTreeMap::new()
        };
        self.clock.catch_up(now, seconds);
        info!(seconds, cap_hours = %cap, "offline progress applied");
        OfflineReport { seconds, produced }
    }

    // -------------------------------------------------------------------
    // Daily tasks and achievements
    // -------------------------------------------------------------------

    /// Register a login on `today` (UTC). The first login of a day advances
    /// the streak and draws a new task board.
    pub fn check_login(&mut self, today: NaiveDate) -> LoginCheck {
        self.daily.check_login(&self.content, today)
    }

    /// Claim a completed daily task and credit its reward.
    pub fn claim_daily_task(&mut self, task_id: &str) -> Option<Reward> {
        let reward = self.daily.claim_task(&self.content, task_id)?;
        self.credit_reward(reward);
        Some(reward)
    }

    /// Claim today's login streak reward and credit it.
    pub fn claim_streak_reward(&mut self) -> Option<Reward> {
        let reward = self.daily.claim_streak(&self.content)?;
        self.credit_reward(reward);
        Some(reward)
    }

    fn credit_reward(&mut self, reward: Reward) {
        match reward.kind {
            RewardKind::Blueprint => self
                .world_tree
                .add_currency(Currency::Blueprint, reward.amount),
            RewardKind::Memory => self.world_tree.add_currency(Currency::Memory, reward.amount),
            RewardKind::LegacyPoints => {
                self.prestige.add_legacy_points(reward.amount);
                self.resync_multipliers();
            }
        }
    }

    /// Current values of every statistic achievements watch.
    pub fn achievement_stats(&self) -> AchievementStats {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        AchievementStats {
            nodes_cleared: self.combat.progress().total_cleared,
            total_prestige: self.prestige.state().prestige_count,
            building_levels: self.buildings.total_levels(),
            research_count: count(self.research.completed().len()),
            artifact_count: count(self.loadout.artifact_count()),
            world_nodes: count(self.world_tree.purchased().len()),
        }
    }

    /// Unlock every achievement the current statistics reach. Returns the
    /// newly unlocked ids.
    pub fn check_achievements(&mut self) -> Vec<String> {
        let stats = self.achievement_stats();
        self.achievements.check(&self.content, &stats)
    }

    /// `(current, target)` for an achievement.
    pub fn achievement_progress(&self, achievement_id: &str) -> Option<(u32, u32)> {
        self.achievements
            .progress(&self.content, achievement_id, &self.achievement_stats())
    }

    /// Claim an unlocked achievement's points.
    pub fn claim_achievement(&mut self, achievement_id: &str) -> Option<Decimal> {
        self.achievements.claim(&self.content, achievement_id)
    }

    // -------------------------------------------------------------------
    // Automation CRUD
    // -------------------------------------------------------------------

    /// Add an automation rule.
    pub fn add_rule(&mut self, rule: NewRule) -> RuleId {
        self.automation.add_rule(rule)
    }

    /// Patch an automation rule.
    pub fn update_rule(&mut self, id: RuleId, patch: RulePatch) -> bool {
        self.automation.update_rule(id, patch)
    }

    /// Delete an automation rule.
    pub fn delete_rule(&mut self, id: RuleId) -> bool {
        self.automation.delete_rule(id)
    }

    /// Automation rules in evaluation order.
    pub fn rules(&self) -> &[AutomationRule] {
        self.automation.rules()
    }
}

impl RuleContext for Game {
    fn resource_amount(&self, resource: ResourceKey) -> Decimal {
        self.resources.amount(resource)
    }

    fn cleared_count(&self) -> usize {
        self.combat.progress().cleared.len()
    }

    fn reachable_count(&self) -> usize {
        self.combat.progress().reachable.len()
    }

    fn combat_attack(&self) -> Decimal {
        self.combat.profile().base_attack
    }

    fn combat_health(&self) -> Decimal {
        self.combat.profile().base_health
    }

    fn set_population(&mut self, role: Role, value: i64) -> bool {
        Self::set_population(self, role, value)
    }

    fn switch_preset(&mut self, index: usize) -> bool {
        Self::switch_preset(self, index)
    }

    fn start_research(&mut self, research_id: &str) -> bool {
        let now = self.clock.last_tick_at();
        Self::start_research(self, research_id, now)
    }
}
