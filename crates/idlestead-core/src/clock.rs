//! Game clock: tick counter, last-tick timestamp, and accumulated playtime.
//!
//! The clock is the only place that turns wall-clock time into simulated
//! seconds. Elapsed time is floored to whole seconds with a minimum of one,
//! so a tick that fires early, or a clock that steps backwards, still
//! advances the simulation by exactly one second.

use std::time::Duration;

use chrono::{DateTime, Utc};

use idlestead_types::GameSpeed;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid timing configuration (e.g. a zero-length tick).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter and timing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    /// Ticks executed since the state was created or restored.
    tick: u64,

    /// Wall-clock time of the last production tick.
    last_tick_at: DateTime<Utc>,

    /// Simulated seconds accumulated across all ticks and offline catch-up.
    playtime_secs: u64,
}

impl GameClock {
    /// A clock at tick 0 whose last tick is `now`.
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            tick: 0,
            last_tick_at: now,
            playtime_secs: 0,
        }
    }

    /// Rebuild a clock from persisted parts.
    pub const fn from_parts(tick: u64, last_tick_at: DateTime<Utc>, playtime_secs: u64) -> Self {
        Self {
            tick,
            last_tick_at,
            playtime_secs,
        }
    }

    /// Whole seconds since the last tick, never less than one.
    pub fn elapsed_since_last(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.last_tick_at)
            .num_seconds()
            .max(1)
    }

    /// Start a tick at `now`. Returns the new tick number and the elapsed
    /// simulated seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`. The clock is left unchanged in that case.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(u64, i64), ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed = self.elapsed_since_last(now);
        self.tick = tick;
        self.last_tick_at = now;
        self.add_playtime(elapsed);
        Ok((tick, elapsed))
    }

    /// Move the last-tick marker to `now` and credit `seconds` of playtime
    /// without counting a tick. Used after offline catch-up.
    pub fn catch_up(&mut self, now: DateTime<Utc>, seconds: i64) {
        self.last_tick_at = now;
        self.add_playtime(seconds);
    }

    /// Move the last-tick marker to `now` without crediting any time.
    /// Used when production resumes after a pause.
    pub const fn touch(&mut self, now: DateTime<Utc>) {
        self.last_tick_at = now;
    }

    fn add_playtime(&mut self, seconds: i64) {
        let seconds = u64::try_from(seconds.max(0)).unwrap_or(0);
        self.playtime_secs = self.playtime_secs.saturating_add(seconds);
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the timestamp of the last tick.
    pub const fn last_tick_at(&self) -> DateTime<Utc> {
        self.last_tick_at
    }

    /// Return accumulated simulated seconds.
    pub const fn playtime_secs(&self) -> u64 {
        self.playtime_secs
    }
}

/// Real-time interval between production ticks at `speed`.
///
/// # Errors
///
/// Returns [`ClockError::InvalidConfig`] if `base_tick_ms` is zero.
pub fn tick_interval(base_tick_ms: u64, speed: GameSpeed) -> Result<Duration, ClockError> {
    if base_tick_ms == 0 {
        return Err(ClockError::InvalidConfig {
            reason: "tick length must be at least 1ms".to_owned(),
        });
    }
    let ms = base_tick_ms
        .checked_div(u64::from(speed.multiplier()))
        .unwrap_or(base_tick_ms)
        .max(1);
    Ok(Duration::from_millis(ms))
}
