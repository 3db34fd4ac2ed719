//! The world tree: a prerequisite DAG of permanent upgrades, plus the
//! progression currency wallet that pays for them.
//!
//! Purchases are monotonic. Only a full-game reset clears them, and even
//! then the root node is purchased again immediately.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use idlestead_ledger::{CurrencyWallet, LedgerError};
use idlestead_types::{BonusKey, Currency, WorldTreeState};

use crate::builtin::ROOT_NODE;
use crate::content::ContentTables;

/// Purchase state and wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldTree {
    unlocked: BTreeSet<String>,
    purchased: BTreeSet<String>,
    wallet: CurrencyWallet,
}

impl WorldTree {
    /// A fresh tree with only the root purchased and an empty wallet.
    pub fn new(content: &ContentTables) -> Self {
        let mut tree = Self {
            unlocked: BTreeSet::new(),
            purchased: BTreeSet::new(),
            wallet: CurrencyWallet::new(),
        };
        if let Some(root) = content.world_node(ROOT_NODE) {
            tree.unlocked.insert(root.id.clone());
            tree.unlocked.extend(root.unlocks.iter().cloned());
            tree.purchased.insert(root.id.clone());
        }
        tree
    }

    /// Rebuild from persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if a currency balance is negative.
    pub fn from_state(state: &WorldTreeState) -> Result<Self, LedgerError> {
        Ok(Self {
            unlocked: state.unlocked.clone(),
            purchased: state.purchased.clone(),
            wallet: CurrencyWallet::from_balances(&state.currencies)?,
        })
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> WorldTreeState {
        WorldTreeState {
            unlocked: self.unlocked.clone(),
            purchased: self.purchased.clone(),
            currencies: self.wallet.balances(),
        }
    }

    /// Whether `node_id` has been purchased.
    pub fn is_purchased(&self, node_id: &str) -> bool {
        self.purchased.contains(node_id)
    }

    /// Purchased node ids.
    pub const fn purchased(&self) -> &BTreeSet<String> {
        &self.purchased
    }

    /// Revealed node ids.
    pub const fn unlocked(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    /// The currency wallet.
    pub const fn wallet(&self) -> &CurrencyWallet {
        &self.wallet
    }

    /// Credit currency from an encounter drop.
    pub fn add_currency(&mut self, currency: Currency, amount: Decimal) {
        self.wallet.credit(currency, amount);
    }

    /// Pay a currency cost, all or nothing.
    pub fn spend_currency(&mut self, costs: &BTreeMap<Currency, Decimal>) -> bool {
        self.wallet.spend(costs)
    }

    /// Whether `node_id` is unpurchased, has every prerequisite purchased,
    /// and is affordable.
    pub fn can_purchase(&self, content: &ContentTables, node_id: &str) -> bool {
        let Some(node) = content.world_node(node_id) else {
            return false;
        };
        !self.purchased.contains(node_id)
            && node.prerequisites.iter().all(|p| self.purchased.contains(p))
            && self.wallet.can_afford(&node.cost)
    }

    /// Purchase `node_id`, paying its cost and revealing what it unlocks.
    pub fn purchase(&mut self, content: &ContentTables, node_id: &str) -> bool {
        if !self.can_purchase(content, node_id) {
            debug!(node_id, "world node purchase rejected");
            return false;
        }
        let Some(node) = content.world_node(node_id) else {
            return false;
        };
        if !self.wallet.spend(&node.cost) {
            return false;
        }
        self.purchased.insert(node.id.clone());
        self.unlocked.extend(node.unlocks.iter().cloned());
        info!(node_id, "world node purchased");
        true
    }

    /// Product of every purchased node's contribution to `key`.
    ///
    /// Starts from 1; nodes that do not mention `key` contribute nothing.
    pub fn multiplier(&self, content: &ContentTables, key: BonusKey) -> Decimal {
        self.purchased
            .iter()
            .filter_map(|id| content.world_node(id))
            .filter_map(|node| node.bonuses.get(&key))
            .fold(Decimal::ONE, |acc, &factor| acc.saturating_mul(factor))
    }

    /// Whether any purchased node contributes to `key` at all.
    pub fn grants(&self, content: &ContentTables, key: BonusKey) -> bool {
        self.purchased
            .iter()
            .filter_map(|id| content.world_node(id))
            .any(|node| node.bonuses.contains_key(&key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn root_starts_purchased() {
        let content = ContentTables::builtin();
        let tree = WorldTree::new(&content);
        assert!(tree.is_purchased("root"));
        assert!(tree.unlocked().contains("res1"));
        assert_eq!(tree.multiplier(&content, BonusKey::Resource), Decimal::ONE);
    }

    #[test]
    fn purchase_requires_prerequisites_and_funds() {
        let content = ContentTables::builtin();
        let mut tree = WorldTree::new(&content);

        assert!(!tree.can_purchase(&content, "res1"));
        tree.add_currency(Currency::Blueprint, dec!(10));
        tree.add_currency(Currency::Memory, dec!(5));
        assert!(!tree.can_purchase(&content, "res2"));
        assert!(tree.purchase(&content, "res1"));
        assert!(!tree.purchase(&content, "res1"));

        assert_eq!(tree.wallet().balance(Currency::Blueprint), Decimal::ZERO);
        assert_eq!(tree.multiplier(&content, BonusKey::Resource), dec!(1.2));
        assert!(tree.unlocked().contains("res2"));
    }

    #[test]
    fn multiplier_folds_every_purchased_node() {
        let content = ContentTables::builtin();
        let mut tree = WorldTree::new(&content);
        tree.add_currency(Currency::Blueprint, dec!(100));
        tree.add_currency(Currency::Memory, dec!(100));
        assert!(tree.purchase(&content, "com1"));
        assert!(tree.purchase(&content, "com2"));
        assert_eq!(tree.multiplier(&content, BonusKey::Attack), dec!(1.15));
        assert!(tree.grants(&content, BonusKey::ShieldBreak));
        assert!(!tree.grants(&content, BonusKey::OfflineCap));
    }

    #[test]
    fn unknown_node_is_never_purchasable() {
        let content = ContentTables::builtin();
        let tree = WorldTree::new(&content);
        assert!(!tree.can_purchase(&content, "res99"));
    }

    #[test]
    fn state_round_trip_keeps_wallet() {
        let content = ContentTables::builtin();
        let mut tree = WorldTree::new(&content);
        tree.add_currency(Currency::Memory, dec!(7));
        let restored = WorldTree::from_state(&tree.to_state()).unwrap();
        assert_eq!(restored.to_state(), tree.to_state());
    }
}
