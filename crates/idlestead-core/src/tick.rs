//! Tick cycle: the six-phase loop that advances one game.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- increment the tick counter and measure whole seconds
//!    since the previous tick (at least one).
//! 2. **Production** -- apply per-role output for the elapsed seconds.
//! 3. **Research** -- complete the current project if its time is up.
//! 4. **Battle** -- advance the active battle, crediting drops on victory.
//! 5. **Automation** -- evaluate the player's rules against the new state.
//! 6. **Bookkeeping** -- register the day's login (UTC date of `now`) and
//!    unlock achievements the new state reaches.
//!
//! Battles are also advanced by a faster ticker between production ticks;
//! the battle phase here keeps a battle moving when that ticker is off.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use idlestead_types::ResourceKey;

use crate::automation::AutomationReport;
use crate::clock::ClockError;
use crate::combat::BattleOutcome;
use crate::game::Game;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Whole seconds credited to production.
    pub elapsed_secs: i64,
    /// Applied production deltas per resource.
    pub produced: BTreeMap<ResourceKey, Decimal>,
    /// Research project completed this tick, if any.
    pub research_completed: Option<String>,
    /// What the battle phase did.
    pub battle: BattleOutcome,
    /// What automation did.
    pub automation: AutomationReport,
    /// Whether this tick started a new daily cycle.
    pub new_day: bool,
    /// Achievements unlocked this tick.
    pub achievements_unlocked: Vec<String>,
}

/// Execute one complete tick at wall-clock time `now`.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter overflows. No phase
/// runs in that case.
pub fn run_tick(game: &mut Game, now: DateTime<Utc>) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let (tick, elapsed_secs) = game.advance_clock(now)?;

    // --- Phase 2: Production ---
    let produced = game.advance_production(elapsed_secs);

    // --- Phase 3: Research ---
    let research_completed = game.tick_research(now);

    // --- Phase 4: Battle ---
    let battle = game.tick_battle(now);

    // --- Phase 5: Automation ---
    let automation = game.run_automation();

    // --- Phase 6: Bookkeeping ---
    let new_day = game.check_login(now.date_naive()).new_day;
    let achievements_unlocked = game.check_achievements();

    debug!(
        tick,
        elapsed_secs,
        research = research_completed.as_deref().unwrap_or(""),
        rules_fired = automation.rules_fired,
        new_day,
        "tick complete"
    );

    Ok(TickSummary {
        tick,
        elapsed_secs,
        produced,
        research_completed,
        battle,
        automation,
        new_day,
        achievements_unlocked,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone};
    use idlestead_types::Currency;
    use idlestead_world::ContentTables;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::KernelConfig;

    fn game_at(now: DateTime<Utc>) -> Game {
        Game::new(
            Arc::new(ContentTables::builtin()),
            &KernelConfig::default(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn ticks_produce_for_elapsed_seconds() {
        let t0 = Utc::now();
        let mut game = game_at(t0);

        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(10)).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.elapsed_secs, 10);
        assert_eq!(summary.produced.get(&ResourceKey::Wood), Some(&dec!(50)));
        assert_eq!(summary.battle, BattleOutcome::Idle);

        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(10)).unwrap();
        assert_eq!(summary.tick, 2);
        assert_eq!(summary.elapsed_secs, 1);
    }

    #[test]
    fn battle_phase_credits_victory() {
        let t0 = Utc::now();
        let mut game = game_at(t0);
        assert!(game.start_battle("t1", t0));
        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(1)).unwrap();
        assert!(matches!(summary.battle, BattleOutcome::InProgress { .. }));

        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(10)).unwrap();
        assert!(matches!(summary.battle, BattleOutcome::Victory { .. }));
        assert_eq!(
            game.world_tree().wallet().balance(Currency::Blueprint),
            dec!(1)
        );
        assert_eq!(summary.achievements_unlocked, vec![String::from("first_node")]);
    }

    #[test]
    fn bookkeeping_starts_a_day_once() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut game = game_at(t0);
        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(1)).unwrap();
        assert!(summary.new_day);
        assert_eq!(game.daily().login_streak(), 1);
        assert!(!game.daily().today_tasks().is_empty());

        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(2)).unwrap();
        assert!(!summary.new_day);

        let summary = run_tick(&mut game, t0 + TimeDelta::days(1)).unwrap();
        assert!(summary.new_day);
        assert_eq!(game.daily().login_streak(), 2);
    }

    #[test]
    fn research_completes_on_the_tick_after_its_duration() {
        let t0 = Utc::now();
        let mut payload = game_at(t0).snapshot(t0, idlestead_types::GameSpeed::Normal);
        payload
            .world_tree
            .currencies
            .insert(Currency::Blueprint, dec!(5));
        let mut game = Game::restore(
            Arc::new(ContentTables::builtin()),
            &KernelConfig::default(),
            &payload,
        )
        .unwrap();

        assert!(game.start_research("efficient_gathering", t0));
        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(30)).unwrap();
        assert_eq!(summary.research_completed, None);
        let summary = run_tick(&mut game, t0 + TimeDelta::seconds(60)).unwrap();
        assert_eq!(
            summary.research_completed.as_deref(),
            Some("efficient_gathering")
        );
        assert!(game.research().is_complete("efficient_gathering"));
        assert_eq!(game.resources().multiplier(ResourceKey::Wood), dec!(1.1));
    }
}
