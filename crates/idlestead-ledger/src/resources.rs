//! The resource ledger.
//!
//! Holds one [`ResourceEntry`] per [`ResourceKey`]. Every key is always
//! present: construction fills missing keys with defaults.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use idlestead_types::{ResourceEntry, ResourceKey};

use crate::LedgerError;

/// Storage cap of every resource on a fresh run.
pub const DEFAULT_CAP: Decimal = Decimal::ONE_HUNDRED;

/// Amount, cap, and multiplier for every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLedger {
    entries: BTreeMap<ResourceKey, ResourceEntry>,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

const fn default_entry() -> ResourceEntry {
    ResourceEntry {
        amount: Decimal::ZERO,
        cap: DEFAULT_CAP,
        multiplier: Decimal::ONE,
    }
}

/// Clamp `amount` into `0..=cap`.
fn clamp(amount: Decimal, cap: Decimal) -> Decimal {
    amount.max(Decimal::ZERO).min(cap)
}

impl ResourceLedger {
    /// Create a ledger with every resource at amount 0, cap 100, multiplier 1.
    pub fn new() -> Self {
        let entries = ResourceKey::ALL
            .iter()
            .map(|&key| (key, default_entry()))
            .collect();
        Self { entries }
    }

    /// Rebuild a ledger from persisted entries.
    ///
    /// Missing keys get defaults. Amounts outside `0..=cap` are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if a cap or multiplier is negative.
    pub fn from_entries(
        entries: &BTreeMap<ResourceKey, ResourceEntry>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        for (&resource, entry) in entries {
            if entry.cap < Decimal::ZERO {
                return Err(LedgerError::NegativeCap {
                    resource,
                    cap: entry.cap,
                });
            }
            if entry.multiplier < Decimal::ZERO {
                return Err(LedgerError::NegativeMultiplier {
                    resource,
                    multiplier: entry.multiplier,
                });
            }
            ledger.entries.insert(
                resource,
                ResourceEntry {
                    amount: clamp(entry.amount, entry.cap),
                    cap: entry.cap,
                    multiplier: entry.multiplier,
                },
            );
        }
        Ok(ledger)
    }

    /// Snapshot every entry for persistence.
    pub fn entries(&self) -> &BTreeMap<ResourceKey, ResourceEntry> {
        &self.entries
    }

    fn entry(&self, key: ResourceKey) -> ResourceEntry {
        self.entries.get(&key).copied().unwrap_or_else(default_entry)
    }

    fn entry_mut(&mut self, key: ResourceKey) -> &mut ResourceEntry {
        self.entries.entry(key).or_insert_with(default_entry)
    }

    /// Current amount of `key`.
    pub fn amount(&self, key: ResourceKey) -> Decimal {
        self.entry(key).amount
    }

    /// Storage cap of `key`.
    pub fn cap(&self, key: ResourceKey) -> Decimal {
        self.entry(key).cap
    }

    /// Cached production multiplier of `key`.
    pub fn multiplier(&self, key: ResourceKey) -> Decimal {
        self.entry(key).multiplier
    }

    /// Add `delta` (which may be negative) and clamp into `0..=cap`.
    ///
    /// Returns the change actually applied.
    pub fn add(&mut self, key: ResourceKey, delta: Decimal) -> Decimal {
        let entry = self.entry_mut(key);
        let before = entry.amount;
        let target = before.checked_add(delta).unwrap_or(entry.cap);
        entry.amount = clamp(target, entry.cap);
        entry.amount.checked_sub(before).unwrap_or(Decimal::ZERO)
    }

    /// Set the storage cap. Negative caps become zero; the amount is
    /// clamped to the new cap.
    pub fn set_cap(&mut self, key: ResourceKey, cap: Decimal) {
        let entry = self.entry_mut(key);
        entry.cap = cap.max(Decimal::ZERO);
        entry.amount = clamp(entry.amount, entry.cap);
    }

    /// Set the cached production multiplier. Negative values become zero.
    pub fn set_multiplier(&mut self, key: ResourceKey, multiplier: Decimal) {
        self.entry_mut(key).multiplier = multiplier.max(Decimal::ZERO);
    }

    /// Whether every cost in `costs` is covered by the current amounts.
    pub fn can_afford(&self, costs: &BTreeMap<ResourceKey, Decimal>) -> bool {
        costs
            .iter()
            .all(|(&key, &cost)| self.amount(key) >= cost)
    }

    /// Deduct every cost in `costs`, or nothing if any is unaffordable.
    pub fn spend(&mut self, costs: &BTreeMap<ResourceKey, Decimal>) -> bool {
        if !self.can_afford(costs) {
            debug!(?costs, "resource spend rejected: insufficient stock");
            return false;
        }
        for (&key, &cost) in costs {
            let entry = self.entry_mut(key);
            let remaining = entry.amount.checked_sub(cost).unwrap_or(Decimal::ZERO);
            entry.amount = clamp(remaining, entry.cap);
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_ledger_has_defaults_for_every_key() {
        let ledger = ResourceLedger::new();
        for key in ResourceKey::ALL {
            assert_eq!(ledger.amount(key), Decimal::ZERO);
            assert_eq!(ledger.cap(key), dec!(100));
            assert_eq!(ledger.multiplier(key), Decimal::ONE);
        }
    }

    #[test]
    fn add_clamps_to_cap_and_floor() {
        let mut ledger = ResourceLedger::new();
        assert_eq!(ledger.add(ResourceKey::Wood, dec!(150)), dec!(100));
        assert_eq!(ledger.amount(ResourceKey::Wood), dec!(100));
        assert_eq!(ledger.add(ResourceKey::Wood, dec!(-250)), dec!(-100));
        assert_eq!(ledger.amount(ResourceKey::Wood), Decimal::ZERO);
    }

    #[test]
    fn lowering_cap_clamps_amount() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKey::Stone, dec!(80));
        ledger.set_cap(ResourceKey::Stone, dec!(50));
        assert_eq!(ledger.amount(ResourceKey::Stone), dec!(50));
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKey::Wood, dec!(60));
        ledger.add(ResourceKey::Stone, dec!(10));

        let costs = BTreeMap::from([
            (ResourceKey::Wood, dec!(50)),
            (ResourceKey::Stone, dec!(30)),
        ]);
        assert!(!ledger.spend(&costs));
        assert_eq!(ledger.amount(ResourceKey::Wood), dec!(60));

        ledger.add(ResourceKey::Stone, dec!(20));
        assert!(ledger.spend(&costs));
        assert_eq!(ledger.amount(ResourceKey::Wood), dec!(10));
        assert_eq!(ledger.amount(ResourceKey::Stone), Decimal::ZERO);
    }

    #[test]
    fn restore_clamps_amount_and_rejects_negative_cap() {
        let entries = BTreeMap::from([(
            ResourceKey::Iron,
            ResourceEntry {
                amount: dec!(500),
                cap: dec!(150),
                multiplier: dec!(1.2),
            },
        )]);
        let ledger = ResourceLedger::from_entries(&entries).unwrap();
        assert_eq!(ledger.amount(ResourceKey::Iron), dec!(150));
        assert_eq!(ledger.cap(ResourceKey::Wood), dec!(100));

        let bad = BTreeMap::from([(
            ResourceKey::Food,
            ResourceEntry {
                amount: Decimal::ZERO,
                cap: dec!(-1),
                multiplier: Decimal::ONE,
            },
        )]);
        assert!(matches!(
            ResourceLedger::from_entries(&bad),
            Err(LedgerError::NegativeCap { .. })
        ));
    }
}
