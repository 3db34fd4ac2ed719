//! The population ledger: headcount and role assignments.

use std::collections::BTreeMap;

use tracing::debug;

use idlestead_types::{PopulationState, Role};

/// Headcount on a fresh run.
pub const DEFAULT_TOTAL: u32 = 10;

/// Starting assignment per role.
const DEFAULT_ASSIGNMENT: [(Role, u32); 5] = [
    (Role::Worker, 5),
    (Role::Builder, 2),
    (Role::Researcher, 1),
    (Role::Soldier, 1),
    (Role::Scout, 1),
];

/// Total headcount plus per-role assignments.
///
/// The sum of assignments may differ from the total; nothing rebalances
/// roles when one is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationLedger {
    total: u32,
    assignment: BTreeMap<Role, u32>,
}

impl Default for PopulationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulationLedger {
    /// Create a ledger with the starting headcount and assignments.
    pub fn new() -> Self {
        Self {
            total: DEFAULT_TOTAL,
            assignment: DEFAULT_ASSIGNMENT.into_iter().collect(),
        }
    }

    /// Rebuild from persisted state. Roles missing from the save read as 0.
    pub fn from_state(state: &PopulationState) -> Self {
        Self {
            total: state.total,
            assignment: state.assignment.clone(),
        }
    }

    /// Snapshot for persistence.
    pub fn to_state(&self) -> PopulationState {
        PopulationState {
            total: self.total,
            assignment: self.assignment.clone(),
        }
    }

    /// Total headcount.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Headcount assigned to `role`.
    pub fn assigned(&self, role: Role) -> u32 {
        self.assignment.get(&role).copied().unwrap_or(0)
    }

    /// Set the assignment for `role`.
    ///
    /// Negative or out-of-range requests are rejected and leave the ledger
    /// unchanged.
    pub fn assign(&mut self, role: Role, value: i64) -> bool {
        let Ok(count) = u32::try_from(value) else {
            debug!(%role, value, "population assignment rejected");
            return false;
        };
        self.assignment.insert(role, count);
        true
    }

    /// Set the total headcount.
    pub const fn set_total(&mut self, total: u32) {
        self.total = total;
    }
}
