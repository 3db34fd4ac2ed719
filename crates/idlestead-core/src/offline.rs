//! Offline progress: production credited for time the game was closed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// Offline cap in hours: the larger of the configured base and the
/// world-tree offline-cap bonus.
pub fn cap_hours(base_hours: u64, bonus_hours: Decimal) -> Decimal {
    Decimal::from(base_hours).max(bonus_hours)
}

/// Whole seconds between `last_tick_at` and `now`, clamped to
/// `[0, cap_hours * 3600]`.
pub fn offline_seconds(last_tick_at: DateTime<Utc>, now: DateTime<Utc>, cap_hours: Decimal) -> i64 {
    let elapsed = now.signed_duration_since(last_tick_at).num_seconds().max(0);
    let cap = cap_hours
        .max(Decimal::ZERO)
        .saturating_mul(SECONDS_PER_HOUR)
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX);
    elapsed.min(cap)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn base_cap_applies_without_bonus() {
        assert_eq!(cap_hours(8, Decimal::ONE), dec!(8));
        assert_eq!(cap_hours(8, dec!(12)), dec!(12));
    }

    #[test]
    fn elapsed_is_clamped_to_cap() {
        let now = Utc::now();
        assert_eq!(
            offline_seconds(now - TimeDelta::hours(2), now, dec!(8)),
            7200
        );
        assert_eq!(
            offline_seconds(now - TimeDelta::hours(30), now, dec!(8)),
            8 * 3600
        );
    }

    #[test]
    fn clock_skew_gives_nothing() {
        let now = Utc::now();
        assert_eq!(offline_seconds(now + TimeDelta::minutes(5), now, dec!(8)), 0);
    }
}
