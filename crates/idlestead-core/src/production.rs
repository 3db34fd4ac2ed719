//! Production pipeline: labour times multipliers becomes resource deltas.
//!
//! ```text
//! per_second = assigned * job_efficiency * building_efficiency
//!            * world_multiplier * artifact_multiplier * state_modifier
//! delta      = per_second * elapsed * ratio
//! ```
//!
//! `world_multiplier` is the ledger's cached per-resource multiplier. Every
//! delta is computed from the pre-tick ledger before any is applied.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use idlestead_ledger::{PopulationLedger, ResourceLedger};
use idlestead_types::{ResourceKey, Role};

/// One producing role and what it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    /// Role whose headcount produces.
    pub role: Role,
    /// Resource produced.
    pub resource: ResourceKey,
    /// Yield per assigned head per second before multipliers.
    pub ratio: Decimal,
}

/// The producing roles. Researchers produce nothing directly.
pub const JOBS: [Job; 4] = [
    Job {
        role: Role::Worker,
        resource: ResourceKey::Wood,
        ratio: Decimal::ONE,
    },
    Job {
        role: Role::Builder,
        resource: ResourceKey::Stone,
        ratio: Decimal::from_parts(6, 0, 0, false, 1),
    },
    Job {
        role: Role::Soldier,
        resource: ResourceKey::Iron,
        ratio: Decimal::from_parts(3, 0, 0, false, 1),
    },
    Job {
        role: Role::Scout,
        resource: ResourceKey::Food,
        ratio: Decimal::from_parts(8, 0, 0, false, 1),
    },
];

/// Factors that are not cached in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionModifiers {
    /// Per-role job efficiency (missing roles count as 1).
    pub job_efficiency: BTreeMap<Role, Decimal>,
    /// Per-role building efficiency (missing roles count as 1).
    pub building_efficiency: BTreeMap<Role, Decimal>,
    /// Equipped artifacts' resource multiplier.
    pub artifact_multiplier: Decimal,
    /// Global modifier for temporary states.
    pub state_modifier: Decimal,
}

impl Default for ProductionModifiers {
    fn default() -> Self {
        Self {
            job_efficiency: BTreeMap::new(),
            building_efficiency: BTreeMap::new(),
            artifact_multiplier: Decimal::ONE,
            state_modifier: Decimal::ONE,
        }
    }
}

impl ProductionModifiers {
    fn job(&self, role: Role) -> Decimal {
        self.job_efficiency.get(&role).copied().unwrap_or(Decimal::ONE)
    }

    fn building(&self, role: Role) -> Decimal {
        self.building_efficiency
            .get(&role)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

/// Per-second output of `job` with the current ledger multiplier.
pub fn per_second(
    job: &Job,
    resources: &ResourceLedger,
    population: &PopulationLedger,
    modifiers: &ProductionModifiers,
) -> Decimal {
    Decimal::from(population.assigned(job.role))
        .saturating_mul(modifiers.job(job.role))
        .saturating_mul(modifiers.building(job.role))
        .saturating_mul(resources.multiplier(job.resource))
        .saturating_mul(modifiers.artifact_multiplier)
        .saturating_mul(modifiers.state_modifier)
        .max(Decimal::ZERO)
}

/// Deltas `elapsed_seconds` of production would add, before cap clamping.
///
/// Negative elapsed time produces nothing.
pub fn compute_deltas(
    resources: &ResourceLedger,
    population: &PopulationLedger,
    modifiers: &ProductionModifiers,
    elapsed_seconds: i64,
) -> BTreeMap<ResourceKey, Decimal> {
    let elapsed = Decimal::from(elapsed_seconds.max(0));
    let mut deltas = BTreeMap::new();
    for job in &JOBS {
        let delta = per_second(job, resources, population, modifiers)
            .saturating_mul(elapsed)
            .saturating_mul(job.ratio);
        let entry = deltas.entry(job.resource).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(delta);
    }
    deltas
}

/// Run production for `elapsed_seconds` and return the deltas actually
/// applied after cap clamping.
pub fn advance(
    resources: &mut ResourceLedger,
    population: &PopulationLedger,
    modifiers: &ProductionModifiers,
    elapsed_seconds: i64,
) -> BTreeMap<ResourceKey, Decimal> {
    let deltas = compute_deltas(resources, population, modifiers, elapsed_seconds);
    deltas
        .into_iter()
        .map(|(key, delta)| (key, resources.add(key, delta)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn applied(deltas: &BTreeMap<ResourceKey, Decimal>, key: ResourceKey) -> Decimal {
        deltas.get(&key).copied().unwrap_or_default()
    }

    #[test]
    fn default_population_for_ten_seconds() {
        let mut resources = ResourceLedger::new();
        let population = PopulationLedger::new();
        let deltas = advance(
            &mut resources,
            &population,
            &ProductionModifiers::default(),
            10,
        );
        // 5 workers * 10s * 1.0, 2 builders * 10s * 0.6, 1 soldier * 10s * 0.3,
        // 1 scout * 10s * 0.8
        assert_eq!(applied(&deltas, ResourceKey::Wood), dec!(50));
        assert_eq!(applied(&deltas, ResourceKey::Stone), dec!(12));
        assert_eq!(applied(&deltas, ResourceKey::Iron), dec!(3));
        assert_eq!(applied(&deltas, ResourceKey::Food), dec!(8));
        assert_eq!(resources.amount(ResourceKey::Crystal), Decimal::ZERO);
    }

    #[test]
    fn production_is_associative_below_cap() {
        let population = PopulationLedger::new();
        let modifiers = ProductionModifiers {
            artifact_multiplier: dec!(1.3),
            ..ProductionModifiers::default()
        };

        let mut split = ResourceLedger::new();
        advance(&mut split, &population, &modifiers, 3);
        advance(&mut split, &population, &modifiers, 4);

        let mut whole = ResourceLedger::new();
        advance(&mut whole, &population, &modifiers, 7);

        for key in ResourceKey::ALL {
            assert_eq!(split.amount(key), whole.amount(key));
        }
    }

    #[test]
    fn amounts_clamp_at_cap() {
        let mut resources = ResourceLedger::new();
        let population = PopulationLedger::new();
        let deltas = advance(
            &mut resources,
            &population,
            &ProductionModifiers::default(),
            1_000,
        );
        assert_eq!(resources.amount(ResourceKey::Wood), dec!(100));
        assert_eq!(applied(&deltas, ResourceKey::Wood), dec!(100));
        for key in ResourceKey::ALL {
            assert!(resources.amount(key) <= resources.cap(key));
        }
    }

    #[test]
    fn negative_elapsed_produces_nothing() {
        let mut resources = ResourceLedger::new();
        let population = PopulationLedger::new();
        let deltas = advance(
            &mut resources,
            &population,
            &ProductionModifiers::default(),
            -5,
        );
        assert!(deltas.values().all(|d| d.is_zero()));
    }

    #[test]
    fn every_factor_multiplies() {
        let mut resources = ResourceLedger::new();
        resources.set_multiplier(ResourceKey::Wood, dec!(1.2));
        let population = PopulationLedger::new();
        let modifiers = ProductionModifiers {
            job_efficiency: BTreeMap::from([(Role::Worker, dec!(1.05))]),
            building_efficiency: BTreeMap::from([(Role::Worker, dec!(1.1))]),
            artifact_multiplier: dec!(2),
            state_modifier: dec!(0.5),
        };
        let rate = per_second(
            JOBS.first().unwrap(),
            &resources,
            &population,
            &modifiers,
        );
        // 5 * 1.05 * 1.1 * 1.2 * 2 * 0.5
        assert_eq!(rate, dec!(6.93));
    }
}
