//! Shared control state for the running scheduler.
//!
//! The production loop and the host share an
//! [`Arc<SchedulerControl>`](std::sync::Arc). The host pauses, resumes,
//! changes speed, or stops through it without touching the game lock.
//! Timers are not bound to it; each has its own cancel handle.
//!
//! # Architecture
//!
//! Control flags are atomics so the loop reads them without locking. Two
//! [`Notify`] handles wake a sleeping loop: one on resume, one on stop.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use idlestead_types::GameSpeed;

use crate::config::TimingConfig;

/// Reason why the scheduler ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// The host requested a stop.
    Stopped,
}

/// Shared scheduler control state.
#[derive(Debug)]
pub struct SchedulerControl {
    /// Whether production ticks are paused.
    paused: AtomicBool,

    /// Wakes the loop when resumed.
    resume_notify: Notify,

    /// Number of times production has been paused.
    pauses: AtomicU64,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes every waiter when a stop is requested.
    stop_notify: Notify,

    /// Current speed multiplier (runtime-adjustable).
    speed: AtomicU32,

    /// Real-time milliseconds per tick at 1x.
    base_tick_ms: u64,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Wall-clock time the scheduler was created.
    started_at: DateTime<Utc>,

    /// Reason the scheduler ended, if it has.
    end_reason: Mutex<Option<SchedulerEndReason>>,
}

impl SchedulerControl {
    /// Create control state from timing configuration.
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            pauses: AtomicU64::new(0),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            speed: AtomicU32::new(timing.speed.multiplier()),
            base_tick_ms: timing.tick_ms,
            max_ticks: timing.max_ticks,
            started_at: Utc::now(),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether production ticks are paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause production ticks. Battles and autosave keep running.
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::AcqRel) {
            self.pauses.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// How many times production has been paused. The loop compares this
    /// across ticks to notice a pause that began and ended while it slept.
    pub fn pause_count(&self) -> u64 {
        self.pauses.load(Ordering::Acquire)
    }

    /// Resume production ticks and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until not paused, or until a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            tokio::select! {
                () = self.resume_notify.notified() => {}
                () = self.stopped() => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop of the production loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn stopped(&self) {
        loop {
            let notified = self.stop_notify.notified();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Record the reason the scheduler ended.
    pub async fn set_end_reason(&self, reason: SchedulerEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the scheduler ended, if it has.
    pub async fn end_reason(&self) -> Option<SchedulerEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Current speed.
    pub fn speed(&self) -> GameSpeed {
        GameSpeed::from_multiplier(self.speed.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Change the speed. Returns the previous speed. Takes effect from the
    /// next tick.
    pub fn set_speed(&self, speed: GameSpeed) -> GameSpeed {
        let prev = self.speed.swap(speed.multiplier(), Ordering::AcqRel);
        GameSpeed::from_multiplier(prev).unwrap_or_default()
    }

    /// Real-time milliseconds per tick at 1x.
    pub const fn base_tick_ms(&self) -> u64 {
        self.base_tick_ms
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Returns `true` if `max_ticks > 0` and `ticks_run >= max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since the scheduler was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Point-in-time status for the host.
    pub async fn status(&self, tick: u64) -> SchedulerStatus {
        SchedulerStatus {
            tick,
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            speed: self.speed(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON-serializable status of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether production ticks are paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current speed.
    pub speed: GameSpeed,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// The reason the scheduler ended, if applicable.
    pub end_reason: Option<SchedulerEndReason>,
    /// ISO 8601 timestamp of when the scheduler started.
    pub started_at: String,
}
