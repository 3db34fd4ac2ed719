//! Research: one timed project at a time, paid for in progression
//! currencies when it starts.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use idlestead_types::{BonusKey, ResearchEffect, ResearchProgress, ResearchState, ResearchUnlock};
use idlestead_world::{ContentTables, WorldTree};

/// Completed projects plus the one underway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchBook {
    completed: BTreeSet<String>,
    current: Option<ResearchProgress>,
}

impl ResearchBook {
    /// Nothing researched.
    pub const fn new() -> Self {
        Self {
            completed: BTreeSet::new(),
            current: None,
        }
    }

    /// Rebuild from persisted state, dropping ids the content does not know.
    pub fn from_state(content: &ContentTables, state: &ResearchState) -> Self {
        let completed = state
            .completed
            .iter()
            .filter(|id| {
                let known = content.research(id).is_some();
                if !known {
                    warn!(research_id = %id, "dropping unknown completed research from save");
                }
                known
            })
            .cloned()
            .collect();
        let current = state
            .current
            .clone()
            .filter(|progress| content.research(&progress.research_id).is_some());
        Self { completed, current }
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> ResearchState {
        ResearchState {
            completed: self.completed.clone(),
            current: self.current.clone(),
        }
    }

    /// Whether `research_id` has completed.
    pub fn is_complete(&self, research_id: &str) -> bool {
        self.completed.contains(research_id)
    }

    /// Completed research ids.
    pub const fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// The project underway.
    pub const fn current(&self) -> Option<&ResearchProgress> {
        self.current.as_ref()
    }

    /// Whether `research_id` can start now: it exists, is not complete,
    /// nothing else is underway, its prerequisites are complete, and the
    /// wallet covers the cost.
    pub fn can_start(&self, content: &ContentTables, research_id: &str, tree: &WorldTree) -> bool {
        let Some(def) = content.research(research_id) else {
            return false;
        };
        self.current.is_none()
            && !self.completed.contains(research_id)
            && def.prerequisites.iter().all(|p| self.completed.contains(p))
            && tree.wallet().can_afford(&def.cost)
    }

    /// Pay for and start `research_id` at `now`.
    pub fn start(
        &mut self,
        content: &ContentTables,
        research_id: &str,
        now: DateTime<Utc>,
        tree: &mut WorldTree,
    ) -> bool {
        if !self.can_start(content, research_id, tree) {
            debug!(research_id, "research start rejected");
            return false;
        }
        let Some(def) = content.research(research_id) else {
            return false;
        };
        if !tree.spend_currency(&def.cost) {
            return false;
        }
        self.current = Some(ResearchProgress {
            research_id: def.id.clone(),
            started_at: now,
            duration_secs: def.duration_secs,
        });
        info!(research_id, duration_secs = def.duration_secs, "research started");
        true
    }

    /// Complete the current project if its duration has elapsed by `now`.
    /// Returns the completed id.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<String> {
        let progress = self.current.as_ref()?;
        if elapsed_secs(progress, now) < progress.duration_secs {
            return None;
        }
        let done = self.current.take()?;
        info!(research_id = %done.research_id, "research completed");
        self.completed.insert(done.research_id.clone());
        Some(done.research_id)
    }

    /// Fraction of the current project done at `now`, in `[0, 1]`.
    pub fn progress(&self, now: DateTime<Utc>) -> Option<Decimal> {
        let progress = self.current.as_ref()?;
        if progress.duration_secs == 0 {
            return Some(Decimal::ONE);
        }
        let fraction = Decimal::from(elapsed_secs(progress, now))
            .checked_div(Decimal::from(progress.duration_secs))?;
        Some(fraction.min(Decimal::ONE))
    }

    /// Product of completed projects' multipliers for `key`.
    pub fn multiplier(&self, content: &ContentTables, key: BonusKey) -> Decimal {
        self.completed_effects(content)
            .filter_map(|effect| match *effect {
                ResearchEffect::Multiplier { bonus, value } if bonus == key => Some(value),
                _ => None,
            })
            .fold(Decimal::ONE, Decimal::saturating_mul)
    }

    /// Whether a completed project grants `unlock`.
    pub fn has_unlock(&self, content: &ContentTables, unlock: ResearchUnlock) -> bool {
        self.completed_effects(content)
            .any(|effect| *effect == ResearchEffect::Unlock { unlock })
    }

    fn completed_effects<'a>(
        &'a self,
        content: &'a ContentTables,
    ) -> impl Iterator<Item = &'a ResearchEffect> {
        self.completed
            .iter()
            .filter_map(|id| content.research(id))
            .flat_map(|def| def.effects.iter())
    }
}

fn elapsed_secs(progress: &ResearchProgress, now: DateTime<Utc>) -> u64 {
    let secs = now.signed_duration_since(progress.started_at).num_seconds();
    u64::try_from(secs.max(0)).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use idlestead_types::Currency;
    use rust_decimal_macros::dec;

    use super::*;

    fn funded_tree(content: &ContentTables) -> WorldTree {
        let mut tree = WorldTree::new(content);
        tree.add_currency(Currency::Blueprint, dec!(100));
        tree.add_currency(Currency::Memory, dec!(100));
        tree
    }

    #[test]
    fn start_pays_and_completes_after_duration() {
        let content = ContentTables::builtin();
        let mut tree = funded_tree(&content);
        let mut book = ResearchBook::new();
        let now = Utc::now();

        assert!(book.start(&content, "efficient_gathering", now, &mut tree));
        assert_eq!(tree.wallet().balance(Currency::Blueprint), dec!(95));

        assert_eq!(book.tick(now + TimeDelta::seconds(59)), None);
        assert_eq!(
            book.progress(now + TimeDelta::seconds(30)),
            Some(dec!(0.5))
        );
        assert_eq!(
            book.tick(now + TimeDelta::seconds(60)).as_deref(),
            Some("efficient_gathering")
        );
        assert!(book.current().is_none());
        assert_eq!(
            book.multiplier(&content, BonusKey::Resource),
            dec!(1.1)
        );
    }

    #[test]
    fn only_one_project_at_a_time() {
        let content = ContentTables::builtin();
        let mut tree = funded_tree(&content);
        let mut book = ResearchBook::new();
        let now = Utc::now();
        assert!(book.start(&content, "combat_training", now, &mut tree));
        assert!(!book.start(&content, "efficient_gathering", now, &mut tree));
        assert_eq!(tree.wallet().balance(Currency::Blueprint), dec!(92));
    }

    #[test]
    fn prerequisites_and_funds_are_required() {
        let content = ContentTables::builtin();
        let mut book = ResearchBook::new();
        let mut tree = funded_tree(&content);
        assert!(!book.start(&content, "shield_breaker", Utc::now(), &mut tree));

        let mut poor = WorldTree::new(&content);
        assert!(!book.start(&content, "efficient_gathering", Utc::now(), &mut poor));
        assert!(!book.start(&content, "no_such_project", Utc::now(), &mut tree));
    }

    #[test]
    fn completed_projects_cannot_restart() {
        let content = ContentTables::builtin();
        let mut tree = funded_tree(&content);
        let mut book = ResearchBook::new();
        let now = Utc::now();
        assert!(book.start(&content, "combat_training", now, &mut tree));
        book.tick(now + TimeDelta::seconds(90));
        assert!(!book.can_start(&content, "combat_training", &tree));
        assert!(book.start(&content, "shield_breaker", now, &mut tree));
        book.tick(now + TimeDelta::seconds(500));
        assert!(book.has_unlock(&content, ResearchUnlock::ShieldBreaker));
        assert!(!book.has_unlock(&content, ResearchUnlock::AutoAssign));
        assert_eq!(book.multiplier(&content, BonusKey::Attack), dec!(1.2));
    }

    #[test]
    fn restore_drops_unknown_ids() {
        let content = ContentTables::builtin();
        let state = ResearchState {
            completed: BTreeSet::from([String::from("scouting"), String::from("alchemy")]),
            current: None,
        };
        let book = ResearchBook::from_state(&content, &state);
        assert!(book.is_complete("scouting"));
        assert!(!book.is_complete("alchemy"));
    }
}
