//! Progression currency wallet (blueprints and memories).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use idlestead_types::Currency;

use crate::LedgerError;

/// Balances of the progression currencies. Balances never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyWallet {
    balances: BTreeMap<Currency, Decimal>,
}

impl CurrencyWallet {
    /// Create an empty wallet.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    /// Rebuild from persisted balances.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeBalance`] for a negative balance.
    pub fn from_balances(balances: &BTreeMap<Currency, Decimal>) -> Result<Self, LedgerError> {
        if let Some((&currency, &balance)) = balances.iter().find(|(_, b)| **b < Decimal::ZERO) {
            return Err(LedgerError::NegativeBalance { currency, balance });
        }
        Ok(Self {
            balances: balances.clone(),
        })
    }

    /// Snapshot for persistence. Every currency is present.
    pub fn balances(&self) -> BTreeMap<Currency, Decimal> {
        Currency::ALL
            .iter()
            .map(|&c| (c, self.balance(c)))
            .collect()
    }

    /// Current balance of `currency`.
    pub fn balance(&self, currency: Currency) -> Decimal {
        self.balances.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Credit a non-negative amount. Negative amounts are ignored.
    pub fn credit(&mut self, currency: Currency, amount: Decimal) {
        if amount <= Decimal::ZERO {
            return;
        }
        let slot = self.balances.entry(currency).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(amount);
    }

    /// Whether every cost is covered.
    pub fn can_afford(&self, costs: &BTreeMap<Currency, Decimal>) -> bool {
        costs.iter().all(|(&c, &cost)| self.balance(c) >= cost)
    }

    /// Deduct every cost, or nothing if any is unaffordable.
    pub fn spend(&mut self, costs: &BTreeMap<Currency, Decimal>) -> bool {
        if !self.can_afford(costs) {
            debug!(?costs, "currency spend rejected: insufficient balance");
            return false;
        }
        for (&currency, &cost) in costs {
            let slot = self.balances.entry(currency).or_insert(Decimal::ZERO);
            *slot = slot.checked_sub(cost).unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
        }
        true
    }
}
