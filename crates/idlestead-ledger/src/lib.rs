//! Ledgers for the Idlestead simulation kernel.
//!
//! Three stores of countable state live here:
//!
//! - [`resources`] -- The [`ResourceLedger`]: amount, cap, and cached
//!   production multiplier per [`ResourceKey`].
//! - [`population`] -- The [`PopulationLedger`]: headcount and role
//!   assignments.
//! - [`wallet`] -- The [`CurrencyWallet`]: progression currencies spent on
//!   the world tree and research.
//!
//! # Clamping
//!
//! Every mutation of the resource ledger clamps the amount into `0..=cap`.
//! Nothing is rejected for overflowing a cap; the excess is simply lost.
//! Spending is the only operation that can fail, and it fails as a whole:
//! if any cost is unaffordable, no balance changes.
//!
//! Invalid requests at runtime return `bool`. [`LedgerError`] is reserved
//! for rebuilding a ledger from persisted state that violates an invariant
//! that clamping cannot repair.

pub mod population;
pub mod resources;
pub mod wallet;

// Re-export primary types at crate root.
pub use population::{DEFAULT_TOTAL, PopulationLedger};
pub use resources::{DEFAULT_CAP, ResourceLedger};
pub use wallet::CurrencyWallet;

use rust_decimal::Decimal;

use idlestead_types::{Currency, ResourceKey};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when restoring a ledger from persisted state.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A resource cap must not be negative.
    #[error("resource {resource} has negative cap {cap}")]
    NegativeCap {
        /// The offending resource.
        resource: ResourceKey,
        /// The invalid cap.
        cap: Decimal,
    },

    /// A production multiplier must not be negative.
    #[error("resource {resource} has negative multiplier {multiplier}")]
    NegativeMultiplier {
        /// The offending resource.
        resource: ResourceKey,
        /// The invalid multiplier.
        multiplier: Decimal,
    },

    /// A currency balance must not be negative.
    #[error("currency {currency:?} has negative balance {balance}")]
    NegativeBalance {
        /// The offending currency.
        currency: Currency,
        /// The invalid balance.
        balance: Decimal,
    },
}
