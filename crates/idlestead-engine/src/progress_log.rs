//! Tick callback that logs a progress line at a fixed tick cadence.

use idlestead_core::game::Game;
use idlestead_core::runner::TickCallback;
use idlestead_core::tick::TickSummary;
use idlestead_types::ResourceKey;
use tracing::{debug, info};

/// Logs stockpiles every `every` ticks and a debug line otherwise.
#[derive(Debug)]
pub struct ProgressLog {
    every: u64,
}

impl ProgressLog {
    /// Log a full progress line every `every` ticks (0 behaves like 1).
    pub const fn new(every: u64) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
        }
    }

    /// Whether tick number `tick` gets a full progress line.
    pub const fn is_report_tick(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.every), Some(0))
    }
}

impl TickCallback for ProgressLog {
    fn on_tick(&mut self, summary: &TickSummary, game: &Game) {
        if let Some(ref research_id) = summary.research_completed {
            info!(tick = summary.tick, research_id = %research_id, "research finished");
        }
        for achievement_id in &summary.achievements_unlocked {
            info!(tick = summary.tick, achievement_id = %achievement_id, "achievement unlocked");
        }
        if !self.is_report_tick(summary.tick) {
            debug!(tick = summary.tick, "tick");
            return;
        }
        let resources = game.resources();
        let progress = game.combat().progress();
        info!(
            tick = summary.tick,
            wood = %resources.amount(ResourceKey::Wood),
            stone = %resources.amount(ResourceKey::Stone),
            iron = %resources.amount(ResourceKey::Iron),
            food = %resources.amount(ResourceKey::Food),
            map_id = %progress.current_map_id,
            total_cleared = progress.total_cleared,
            "progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_cadence() {
        let log = ProgressLog::new(60);
        assert!(!log.is_report_tick(59));
        assert!(log.is_report_tick(60));
        assert!(log.is_report_tick(120));
        assert!(ProgressLog::new(0).is_report_tick(7));
    }
}
