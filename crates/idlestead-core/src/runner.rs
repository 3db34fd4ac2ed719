//! Scheduler: the production loop plus the battle and autosave timers.
//!
//! [`run_scheduler`] drives [`run_tick`](crate::tick::run_tick) at the
//! configured rate, with support for:
//!
//! - **Bounded runs**: stop after `max_ticks`
//! - **Pause/resume**: production halts, timers keep running
//! - **Variable speed**: interval recomputed from the current speed each tick
//! - **Clean shutdown**: a stop request interrupts the sleep
//!
//! Paused wall-clock time is never credited: the first tick after a pause
//! moves the clock marker to now before measuring elapsed time.
//!
//! Battle progress and autosave run on their own [`TimerHandle`]s, which
//! outlive a scheduler stop until cancelled. Every loop takes the game
//! lock only for the work itself, never across a sleep or a save.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use idlestead_save::{SaveError, SaveStore};

use crate::clock::{self, ClockError};
use crate::combat::BattleOutcome;
use crate::control::{SchedulerControl, SchedulerEndReason};
use crate::game::Game;
use crate::tick::{self, TickSummary};

/// The game shared between the scheduler, the timers, and the host.
pub type SharedGame = Arc<Mutex<Game>>;

/// Errors that can occur during the scheduler run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The tick interval could not be computed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Result of the scheduler run.
#[derive(Debug)]
pub struct SchedulerResult {
    /// The reason the scheduler ended.
    pub end_reason: SchedulerEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes, with the game still locked.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, game: &Game);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _game: &Game) {}
}

/// Run the production loop until stopped or the tick limit is reached.
///
/// Each iteration sleeps for the interval at the current speed, then ticks.
/// A failed tick is logged and the loop carries on.
///
/// # Errors
///
/// Returns [`RunnerError::Clock`] if the configured tick interval is zero.
pub async fn run_scheduler(
    game: &SharedGame,
    control: &Arc<SchedulerControl>,
    callback: &mut dyn TickCallback,
) -> Result<SchedulerResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut seen_pauses = control.pause_count();
    let mut waited = false;

    info!(
        max_ticks = control.max_ticks(),
        base_tick_ms = control.base_tick_ms(),
        speed = ?control.speed(),
        "Scheduler starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Scheduler paused, waiting for resume...");
            control.wait_if_paused().await;
            waited = true;
            info!("Scheduler resumed");
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            let reason = SchedulerEndReason::Stopped;
            control.set_end_reason(reason).await;
            return Ok(SchedulerResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Sleep for tick interval ---
        let interval = clock::tick_interval(control.base_tick_ms(), control.speed())?;
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = control.stopped() => continue,
        }
        if control.is_paused() {
            continue;
        }

        // --- Execute tick ---
        let pauses = control.pause_count();
        let resumed = std::mem::take(&mut waited) || pauses != seen_pauses;
        seen_pauses = pauses;
        let summary = {
            let mut guard = game.lock().await;
            let now = Utc::now();
            if resumed {
                guard.skip_paused_time(now);
                debug!("paused time discarded");
            }
            match tick::run_tick(&mut guard, now) {
                Ok(summary) => {
                    callback.on_tick(&summary, &guard);
                    summary
                }
                Err(err) => {
                    warn!(error = %err, "Tick failed, continuing");
                    continue;
                }
            }
        };
        total_ticks = total_ticks.saturating_add(1);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(total_ticks) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            let reason = SchedulerEndReason::MaxTicksReached;
            control.set_end_reason(reason).await;
            return Ok(SchedulerResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);
    }
}

/// Log the scheduler end sequence.
pub fn log_scheduler_end(result: &SchedulerResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Scheduler ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            elapsed_secs = summary.elapsed_secs,
            rules_fired = summary.automation.rules_fired,
            "Final tick summary"
        );
    } else {
        warn!("Scheduler ended with no ticks executed");
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// A repeating background job that can be cancelled.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer. The job never runs again, though a run already in
    /// progress finishes.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Cancel and wait for the task to exit.
    pub async fn join(self) {
        self.cancel();
        if let Err(err) = self.task.await {
            warn!(error = %err, "timer task did not exit cleanly");
        }
    }
}

/// Run `job` every `period` until cancelled.
///
/// The timer ignores the scheduler's stop request; only its own handle
/// ends it.
pub fn spawn_timer<F, Fut>(period: Duration, mut job: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let wake = Arc::new(Notify::new());
    let task = {
        let cancelled = Arc::clone(&cancelled);
        let wake = Arc::clone(&wake);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(period) => {}
                    () = wake.notified() => {}
                }
                if cancelled.load(Ordering::Acquire) {
                    break;
                }
                job().await;
            }
        })
    };
    TimerHandle {
        cancelled,
        wake,
        task,
    }
}

/// Advance the active battle every `period`, independently of production.
pub fn start_battle_ticker(game: SharedGame, period: Duration) -> TimerHandle {
    spawn_timer(period, move || {
        let game = Arc::clone(&game);
        async move {
            let mut guard = game.lock().await;
            if !guard.combat().is_fighting() {
                return;
            }
            match guard.tick_battle(Utc::now()) {
                BattleOutcome::Victory { node_id, drops } => {
                    info!(node_id = %node_id, drops = drops.len(), "battle won");
                }
                BattleOutcome::Timeout { node_id } => {
                    info!(node_id = %node_id, "battle timed out");
                }
                BattleOutcome::Idle | BattleOutcome::InProgress { .. } => {}
            }
        }
    })
}

/// Snapshot the game under the lock, then write it outside the lock.
///
/// # Errors
///
/// Returns the store's [`SaveError`].
pub async fn save_now<S: SaveStore>(
    game: &SharedGame,
    control: &SchedulerControl,
    store: &S,
) -> Result<(), SaveError> {
    let payload = {
        let guard = game.lock().await;
        guard.snapshot(Utc::now(), control.speed())
    };
    store.save(&payload).await
}

/// Save the game every `period`. Failures are logged and retried on the
/// next period.
pub fn start_autosave<S>(
    game: SharedGame,
    control: Arc<SchedulerControl>,
    store: Arc<S>,
    period: Duration,
) -> TimerHandle
where
    S: SaveStore + 'static,
{
    spawn_timer(period, move || {
        let game = Arc::clone(&game);
        let control = Arc::clone(&control);
        let store = Arc::clone(&store);
        async move {
            match save_now(&game, &control, store.as_ref()).await {
                Ok(()) => debug!("autosave complete"),
                Err(err) => warn!(error = %err, "autosave failed"),
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use idlestead_save::MemorySaveStore;
    use idlestead_world::ContentTables;

    use super::*;
    use crate::config::{KernelConfig, TimingConfig};

    fn shared_game() -> SharedGame {
        let game = Game::new(
            Arc::new(ContentTables::builtin()),
            &KernelConfig::default(),
            Utc::now(),
        )
        .unwrap();
        Arc::new(Mutex::new(game))
    }

    fn control(max_ticks: u64, tick_ms: u64) -> Arc<SchedulerControl> {
        Arc::new(SchedulerControl::new(&TimingConfig {
            tick_ms,
            max_ticks,
            ..TimingConfig::default()
        }))
    }

    async fn pause() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let game = shared_game();
        let control = control(5, 1);
        let mut cb = NoOpCallback;

        let result = run_scheduler(&game, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SchedulerEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(game.lock().await.clock().tick(), 5);
        assert_eq!(
            control.end_reason().await,
            Some(SchedulerEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn stop_before_start_runs_no_ticks() {
        let game = shared_game();
        let control = control(0, 1);
        control.request_stop();
        let mut cb = NoOpCallback;

        let result = run_scheduler(&game, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SchedulerEndReason::Stopped);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn stop_interrupts_a_long_sleep() {
        let game = shared_game();
        let control = control(0, 60_000);
        let stopper = {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                control.request_stop();
            })
        };
        let mut cb = NoOpCallback;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            run_scheduler(&game, &control, &mut cb),
        )
        .await
        .unwrap()
        .unwrap();
        stopper.await.unwrap();

        assert_eq!(result.end_reason, SchedulerEndReason::Stopped);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn paused_time_is_not_credited() {
        let game = shared_game();
        let control = control(1, 1);
        control.pause();

        let runner = {
            let game = Arc::clone(&game);
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                let mut cb = NoOpCallback;
                run_scheduler(&game, &control, &mut cb).await
            })
        };
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(game.lock().await.clock().tick(), 0);
        control.resume();

        let result = tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let summary = result.final_summary.unwrap();
        assert_eq!(result.total_ticks, 1);
        assert_eq!(summary.elapsed_secs, 1);
        assert_eq!(game.lock().await.clock().playtime_secs(), 1);
    }

    #[tokio::test]
    async fn pause_inside_one_sleep_is_still_discarded() {
        let game = shared_game();
        let control = control(1, 2_000);

        let runner = {
            let game = Arc::clone(&game);
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                let mut cb = NoOpCallback;
                run_scheduler(&game, &control, &mut cb).await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        control.pause();
        control.resume();
        assert_eq!(control.pause_count(), 1);

        let result = tokio::time::timeout(Duration::from_secs(5), runner)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(result.final_summary.unwrap().elapsed_secs, 1);
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _game: &Game) {
                self.count = self.count.saturating_add(1);
            }
        }

        let game = shared_game();
        let control = control(3, 1);
        let mut cb = CountCallback { count: 0 };

        let _ = run_scheduler(&game, &control, &mut cb).await.unwrap();

        assert_eq!(cb.count, 3);
    }

    #[tokio::test]
    async fn battle_ticker_finishes_a_battle() {
        let game = shared_game();
        {
            let mut guard = game.lock().await;
            assert!(guard.start_battle("t1", Utc::now() - TimeDelta::seconds(30)));
        }

        let ticker = start_battle_ticker(Arc::clone(&game), Duration::from_millis(1));
        let mut cleared = false;
        for _ in 0..400 {
            cleared = game.lock().await.combat().progress().cleared.contains("t1");
            if cleared {
                break;
            }
            pause().await;
        }
        ticker.join().await;

        assert!(cleared);
        assert!(!game.lock().await.combat().is_fighting());
    }

    #[tokio::test]
    async fn autosave_writes_until_cancelled() {
        let game = shared_game();
        let control = control(0, 1000);
        let store = Arc::new(MemorySaveStore::new());

        let timer = start_autosave(
            Arc::clone(&game),
            Arc::clone(&control),
            Arc::clone(&store),
            Duration::from_millis(1),
        );
        let mut saved = false;
        for _ in 0..400 {
            saved = store.raw().await.is_some();
            if saved {
                break;
            }
            pause().await;
        }
        timer.cancel();
        assert!(timer.is_cancelled());
        timer.join().await;

        assert!(saved);
        let payload = store.load().await.unwrap().unwrap();
        assert_eq!(payload.map.current_map_id, "tutorial");
    }

    #[tokio::test]
    async fn scheduler_stop_leaves_timers_running() {
        let game = shared_game();
        let control = control(0, 1);
        let store = Arc::new(MemorySaveStore::new());
        control.request_stop();
        let mut cb = NoOpCallback;
        let result = run_scheduler(&game, &control, &mut cb).await.unwrap();
        assert_eq!(result.end_reason, SchedulerEndReason::Stopped);

        let timer = start_autosave(
            Arc::clone(&game),
            Arc::clone(&control),
            Arc::clone(&store),
            Duration::from_millis(1),
        );
        let mut saved = false;
        for _ in 0..400 {
            saved = store.raw().await.is_some();
            if saved {
                break;
            }
            pause().await;
        }
        assert!(!timer.is_cancelled());
        let joined = tokio::time::timeout(Duration::from_secs(1), timer.join()).await;

        assert!(saved);
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn cancelling_one_timer_leaves_the_other() {
        let game = shared_game();
        let control = control(0, 1000);
        let store = Arc::new(MemorySaveStore::new());
        let ticker = start_battle_ticker(Arc::clone(&game), Duration::from_secs(3600));
        let autosave = start_autosave(
            Arc::clone(&game),
            Arc::clone(&control),
            Arc::clone(&store),
            Duration::from_millis(1),
        );
        ticker.join().await;

        store.clear().await.unwrap();
        let mut saved = false;
        for _ in 0..400 {
            saved = store.raw().await.is_some();
            if saved {
                break;
            }
            pause().await;
        }
        autosave.join().await;
        assert!(saved);
    }
}
