//! Prestige (layer 1) and awakening (layer 2).
//!
//! Prestige trades the current run for legacy points. Awakening trades
//! accumulated legacy points for crystals. Each layer contributes a
//! multiplier, and the two multiply together.

use rust_decimal::{Decimal, MathematicalOps};
use tracing::info;

use idlestead_types::PrestigeState;

/// Aggregate clears needed before a prestige is allowed.
pub const MIN_CLEARS_FOR_PRESTIGE: u32 = 3;

/// Prestiges needed (since the last awakening) before awakening.
pub const MIN_PRESTIGES_FOR_AWAKENING: u32 = 5;

/// Legacy-point bonus per building level at prestige time.
const BUILDING_LEVEL_BONUS: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Multiplier gained per `log2` of legacy points.
const LEGACY_SCALE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Multiplier gained per awakening crystal.
const CRYSTAL_SCALE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Legacy points for a run with `total_cleared` clears and
/// `building_levels` levels built: `floor(cleared * (1 + levels * 0.1))`.
pub fn prestige_gain(total_cleared: u32, building_levels: u32) -> Decimal {
    let bonus = Decimal::from(building_levels)
        .saturating_mul(BUILDING_LEVEL_BONUS)
        .saturating_add(Decimal::ONE);
    Decimal::from(total_cleared).saturating_mul(bonus).floor()
}

/// `1 + log2(1 + legacy_points) * 0.1`.
pub fn legacy_multiplier(legacy_points: Decimal) -> Decimal {
    let log2 = legacy_points
        .max(Decimal::ZERO)
        .saturating_add(Decimal::ONE)
        .checked_ln()
        .and_then(|ln| ln.checked_div(Decimal::TWO.ln()))
        .unwrap_or(Decimal::ZERO);
    Decimal::ONE.saturating_add(log2.saturating_mul(LEGACY_SCALE))
}

/// Crystals for `total_legacy_points`: `floor(sqrt(total))`.
pub fn awakening_gain(total_legacy_points: Decimal) -> Decimal {
    total_legacy_points
        .max(Decimal::ZERO)
        .sqrt()
        .map_or(Decimal::ZERO, |root| root.floor())
}

/// `1 + crystals * 0.05`.
pub fn awakening_multiplier(crystals: Decimal) -> Decimal {
    Decimal::ONE.saturating_add(crystals.saturating_mul(CRYSTAL_SCALE))
}

/// Both layers' counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prestige {
    state: PrestigeState,
}

impl Prestige {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted counters.
    pub const fn from_state(state: PrestigeState) -> Self {
        Self { state }
    }

    /// Current counters.
    pub const fn state(&self) -> PrestigeState {
        self.state
    }

    /// `legacy * awakening`, the factor applied to production and attack.
    pub fn multiplier(&self) -> Decimal {
        legacy_multiplier(self.state.legacy_points)
            .saturating_mul(awakening_multiplier(self.state.awakening_crystals))
    }

    /// Whether a prestige is allowed with `total_cleared` clears.
    pub const fn can_prestige(total_cleared: u32) -> bool {
        total_cleared >= MIN_CLEARS_FOR_PRESTIGE
    }

    /// Record a prestige worth `gain` legacy points.
    pub fn credit_prestige(&mut self, gain: Decimal) {
        let gain = gain.max(Decimal::ZERO);
        self.state.legacy_points = self.state.legacy_points.saturating_add(gain);
        self.state.total_legacy_points = self.state.total_legacy_points.saturating_add(gain);
        self.state.prestige_count = self.state.prestige_count.saturating_add(1);
        info!(
            gain = %gain,
            legacy_points = %self.state.legacy_points,
            prestige_count = self.state.prestige_count,
            "prestige"
        );
    }

    /// Add unspent legacy points from a reward. Lifetime totals, and so the
    /// next awakening, are unaffected.
    pub fn add_legacy_points(&mut self, amount: Decimal) {
        let amount = amount.max(Decimal::ZERO);
        self.state.legacy_points = self.state.legacy_points.saturating_add(amount);
    }

    /// Crystals an awakening would grant now.
    pub fn awakening_gain(&self) -> Decimal {
        awakening_gain(self.state.total_legacy_points)
    }

    /// Whether enough prestiges have happened and the gain is positive.
    pub fn can_awaken(&self) -> bool {
        self.state.prestige_count >= MIN_PRESTIGES_FOR_AWAKENING
            && self.awakening_gain() > Decimal::ZERO
    }

    /// Convert layer-1 progress into crystals. Returns the crystals gained,
    /// or `None` if awakening is not allowed.
    pub fn awaken(&mut self) -> Option<Decimal> {
        if !self.can_awaken() {
            return None;
        }
        let gain = self.awakening_gain();
        self.state.awakening_crystals = self.state.awakening_crystals.saturating_add(gain);
        self.state.awakening_count = self.state.awakening_count.saturating_add(1);
        self.state.legacy_points = Decimal::ZERO;
        self.state.total_legacy_points = Decimal::ZERO;
        self.state.prestige_count = 0;
        info!(
            gain = %gain,
            crystals = %self.state.awakening_crystals,
            awakening_count = self.state.awakening_count,
            "awakening"
        );
        Some(gain)
    }
}
