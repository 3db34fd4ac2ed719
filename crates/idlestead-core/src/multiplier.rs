//! Multiplier aggregation.
//!
//! [`MultiplierAggregator`] is a borrowed view over the stores that
//! contribute bonuses. Nothing is cached here: every call folds the current
//! purchases and equipped artifacts from scratch. Cached copies live in the
//! resource ledger and the combat profile and are refreshed by
//! [`Game::resync_multipliers`](crate::game::Game::resync_multipliers).

use rust_decimal::Decimal;

use idlestead_types::BonusKey;
use idlestead_world::{ContentTables, WorldTree};

use crate::loadout::Loadout;
use crate::prestige::Prestige;

/// Read-only view over every multiplier source.
#[derive(Debug, Clone, Copy)]
pub struct MultiplierAggregator<'a> {
    content: &'a ContentTables,
    world_tree: &'a WorldTree,
    loadout: &'a Loadout,
    prestige: &'a Prestige,
}

impl<'a> MultiplierAggregator<'a> {
    /// Borrow the contributing stores.
    pub const fn new(
        content: &'a ContentTables,
        world_tree: &'a WorldTree,
        loadout: &'a Loadout,
        prestige: &'a Prestige,
    ) -> Self {
        Self {
            content,
            world_tree,
            loadout,
            prestige,
        }
    }

    /// World-tree contribution to `key` alone.
    pub fn world(&self, key: BonusKey) -> Decimal {
        self.world_tree.multiplier(self.content, key)
    }

    /// Equipped-artifact contribution to `key` alone.
    pub fn artifacts(&self, key: BonusKey) -> Decimal {
        self.loadout.artifact_multiplier(self.content, key)
    }

    /// Fold from 1 over purchased world-tree nodes, then equipped artifacts.
    pub fn get_multiplier(&self, key: BonusKey) -> Decimal {
        self.world(key).saturating_mul(self.artifacts(key))
    }

    /// Legacy multiplier times awakening multiplier.
    pub fn prestige_multiplier(&self) -> Decimal {
        self.prestige.multiplier()
    }
}
