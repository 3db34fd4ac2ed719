//! Daily tasks and the login streak.
//!
//! The first login of each UTC day advances a seven-day streak (or restarts
//! it at day 1 after a missed day) and draws a fresh task board. Tasks count
//! player activity reported by the game; a completed task, and each day's
//! streak reward, can be claimed once for a [`Reward`] the caller credits.
//!
//! The board is drawn by rotating through the pool from an offset derived
//! from the date, so every player sees the same tasks on the same day and
//! replaying a day is deterministic.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use idlestead_types::{DailyProgress, DailyState, DailyTaskKind, Reward};
use idlestead_world::ContentTables;

/// Tasks drawn per day.
pub const TASKS_PER_DAY: usize = 3;

/// Length of the login streak cycle in days.
pub const STREAK_CYCLE: u32 = 7;

/// Outcome of a login check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginCheck {
    /// Whether this is the first login of the day.
    pub new_day: bool,
    /// Whether the streak restarted at day 1.
    pub streak_reset: bool,
}

/// Login streak and today's task board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyTasks {
    state: DailyState,
}

impl DailyTasks {
    /// No logins yet and an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state, dropping tasks the content no longer has.
    pub fn from_state(content: &ContentTables, state: &DailyState) -> Self {
        let mut state = state.clone();
        state.today_tasks.retain(|id| {
            let known = content.daily_task(id).is_some();
            if !known {
                warn!(task_id = %id, "dropping unknown daily task from save");
            }
            known
        });
        let today = &state.today_tasks;
        state.progress.retain(|id, _| today.contains(id));
        Self { state }
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> DailyState {
        self.state.clone()
    }

    /// Current streak day, 0 before the first login.
    pub const fn login_streak(&self) -> u32 {
        self.state.login_streak
    }

    /// Task ids on today's board.
    pub fn today_tasks(&self) -> &[String] {
        &self.state.today_tasks
    }

    /// Progress on one of today's tasks.
    pub fn progress(&self, task_id: &str) -> Option<DailyProgress> {
        self.state.progress.get(task_id).copied()
    }

    /// Register a login on `today`.
    ///
    /// A repeat login on the same day, or a date earlier than the last login
    /// (a clock stepped backwards), changes nothing.
    pub fn check_login(&mut self, content: &ContentTables, today: NaiveDate) -> LoginCheck {
        if self.state.last_login.is_some_and(|last| last >= today) {
            return LoginCheck {
                new_day: false,
                streak_reset: false,
            };
        }
        let consecutive = self
            .state
            .last_login
            .and_then(|last| last.succ_opt())
            .is_some_and(|next| next == today);
        self.state.login_streak = if consecutive {
            self.state
                .login_streak
                .checked_rem(STREAK_CYCLE)
                .unwrap_or(0)
                .saturating_add(1)
        } else {
            1
        };
        self.state.last_login = Some(today);
        self.state.streak_claimed = false;
        self.refresh_tasks(content, today);
        info!(
            %today,
            streak = self.state.login_streak,
            tasks = ?self.state.today_tasks,
            "new day"
        );
        LoginCheck {
            new_day: true,
            streak_reset: !consecutive,
        }
    }

    /// Draw `today`'s board and clear all task progress.
    pub fn refresh_tasks(&mut self, content: &ContentTables, today: NaiveDate) {
        let tasks = draw_tasks(content, today);
        self.state.progress = tasks
            .iter()
            .map(|id| (id.clone(), DailyProgress::default()))
            .collect();
        self.state.today_tasks = tasks;
    }

    /// Count `amount` units of `kind` toward every open task of that kind.
    /// Returns the ids of tasks completed by this update.
    pub fn record(&mut self, content: &ContentTables, kind: DailyTaskKind, amount: u32) -> Vec<String> {
        let mut completed = Vec::new();
        for id in &self.state.today_tasks {
            let Some(task) = content.daily_task(id).filter(|task| task.kind == kind) else {
                continue;
            };
            let progress = self.state.progress.entry(id.clone()).or_default();
            if progress.completed {
                continue;
            }
            progress.current = progress.current.saturating_add(amount);
            if progress.current >= task.target {
                progress.completed = true;
                completed.push(id.clone());
            }
        }
        if !completed.is_empty() {
            debug!(?kind, tasks = ?completed, "daily tasks completed");
        }
        completed
    }

    /// Mark a completed task as claimed and return its reward.
    pub fn claim_task(&mut self, content: &ContentTables, task_id: &str) -> Option<Reward> {
        let task = content.daily_task(task_id)?;
        let progress = self.state.progress.get_mut(task_id)?;
        if !progress.completed || progress.claimed {
            return None;
        }
        progress.claimed = true;
        info!(task_id, "daily task claimed");
        Some(task.reward)
    }

    /// Mark today's streak reward as claimed and return it.
    pub fn claim_streak(&mut self, content: &ContentTables) -> Option<Reward> {
        if self.state.streak_claimed {
            return None;
        }
        let reward = content.login_reward(self.state.login_streak)?.reward;
        self.state.streak_claimed = true;
        info!(day = self.state.login_streak, "login streak reward claimed");
        Some(reward)
    }
}

/// Up to [`TASKS_PER_DAY`] distinct task ids, rotating through the pool
/// from an offset fixed by the date.
fn draw_tasks(content: &ContentTables, today: NaiveDate) -> Vec<String> {
    let pool = &content.daily_tasks;
    let offset = i32::try_from(pool.len())
        .ok()
        .and_then(|len| today.num_days_from_ce().checked_rem_euclid(len))
        .and_then(|offset| usize::try_from(offset).ok())
        .unwrap_or(0);
    pool.iter()
        .cycle()
        .skip(offset)
        .take(TASKS_PER_DAY.min(pool.len()))
        .map(|task| task.id.clone())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use idlestead_types::RewardKind;
    use rust_decimal_macros::dec;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn logged_in(content: &ContentTables, on: NaiveDate) -> DailyTasks {
        let mut daily = DailyTasks::new();
        assert!(daily.check_login(content, on).new_day);
        daily
    }

    #[test]
    fn first_login_starts_the_streak_and_draws_a_board() {
        let content = ContentTables::builtin();
        let mut daily = DailyTasks::new();
        let check = daily.check_login(&content, day(1));
        assert!(check.new_day);
        assert!(check.streak_reset);
        assert_eq!(daily.login_streak(), 1);
        assert_eq!(daily.today_tasks().len(), TASKS_PER_DAY);

        let again = daily.check_login(&content, day(1));
        assert!(!again.new_day);
        assert_eq!(daily.login_streak(), 1);
    }

    #[test]
    fn consecutive_days_advance_and_wrap_after_seven() {
        let content = ContentTables::builtin();
        let mut daily = logged_in(&content, day(1));
        for d in 2..=7 {
            let check = daily.check_login(&content, day(d));
            assert!(!check.streak_reset);
            assert_eq!(daily.login_streak(), d);
        }
        daily.check_login(&content, day(8));
        assert_eq!(daily.login_streak(), 1);
    }

    #[test]
    fn missed_day_resets_and_earlier_date_is_ignored() {
        let content = ContentTables::builtin();
        let mut daily = logged_in(&content, day(1));
        daily.check_login(&content, day(2));
        assert_eq!(daily.login_streak(), 2);

        let check = daily.check_login(&content, day(4));
        assert!(check.streak_reset);
        assert_eq!(daily.login_streak(), 1);

        assert!(!daily.check_login(&content, day(3)).new_day);
        assert_eq!(daily.login_streak(), 1);
    }

    #[test]
    fn board_is_deterministic_and_distinct() {
        let content = ContentTables::builtin();
        let first = draw_tasks(&content, day(10));
        assert_eq!(first, draw_tasks(&content, day(10)));
        assert_ne!(first, draw_tasks(&content, day(11)));
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), TASKS_PER_DAY);
    }

    #[test]
    fn tasks_complete_and_claim_once() {
        let content = ContentTables::builtin();
        let mut daily = logged_in(&content, day(1));
        daily.state.today_tasks = vec![String::from("daily_clear3"), String::from("daily_build1")];
        daily.state.progress = daily
            .state
            .today_tasks
            .iter()
            .map(|id| (id.clone(), DailyProgress::default()))
            .collect();

        assert!(daily.record(&content, DailyTaskKind::ClearNodes, 2).is_empty());
        assert_eq!(daily.claim_task(&content, "daily_clear3"), None);
        assert_eq!(
            daily.record(&content, DailyTaskKind::ClearNodes, 1),
            vec![String::from("daily_clear3")]
        );
        assert!(daily.record(&content, DailyTaskKind::ClearNodes, 1).is_empty());
        assert_eq!(daily.progress("daily_clear3").unwrap().current, 3);
        assert_eq!(daily.progress("daily_build1").unwrap().current, 0);

        let reward = daily.claim_task(&content, "daily_clear3").unwrap();
        assert_eq!(reward.kind, RewardKind::Blueprint);
        assert_eq!(reward.amount, dec!(10));
        assert_eq!(daily.claim_task(&content, "daily_clear3"), None);
        assert_eq!(daily.claim_task(&content, "daily_clear5"), None);
    }

    #[test]
    fn streak_reward_is_claimed_once_per_day() {
        let content = ContentTables::builtin();
        let mut daily = logged_in(&content, day(1));
        let reward = daily.claim_streak(&content).unwrap();
        assert_eq!(reward.amount, dec!(5));
        assert_eq!(daily.claim_streak(&content), None);

        daily.check_login(&content, day(2));
        assert_eq!(daily.claim_streak(&content).unwrap().kind, RewardKind::Memory);
    }

    #[test]
    fn restore_drops_unknown_tasks() {
        let content = ContentTables::builtin();
        let mut state = logged_in(&content, day(1)).to_state();
        state.today_tasks.push(String::from("daily_retired"));
        state
            .progress
            .insert(String::from("daily_retired"), DailyProgress::default());
        let restored = DailyTasks::from_state(&content, &state);
        assert_eq!(restored.today_tasks().len(), TASKS_PER_DAY);
        assert!(restored.progress("daily_retired").is_none());
    }
}
