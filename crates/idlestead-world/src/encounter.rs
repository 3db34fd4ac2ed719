//! Encounter graph: one map's nodes with an undirected neighbour index.
//!
//! Authored adjacency lists are one-directional ("t1 links to t2"). The
//! graph treats every link as a neighbour relation in both directions, so a
//! node is adjacent to everything in its own list and to every node whose
//! list names it.
//!
//! Reachability is a pure function of the cleared set:
//!
//! ```text
//! reachable(n) = (n == entry || any neighbour of n is cleared) && n not cleared
//! ```

use std::collections::{BTreeMap, BTreeSet};

use idlestead_types::{EncounterNodeDef, MapDef, NodeKind};

/// A map's encounter nodes plus a symmetric neighbour index.
#[derive(Debug, Clone)]
pub struct EncounterGraph {
    map: MapDef,
    neighbours: BTreeMap<String, BTreeSet<String>>,
}

impl EncounterGraph {
    /// Index `map`'s adjacency lists as an undirected graph.
    pub fn new(map: &MapDef) -> Self {
        let mut neighbours: BTreeMap<String, BTreeSet<String>> = map
            .nodes
            .iter()
            .map(|n| (n.id.clone(), BTreeSet::new()))
            .collect();
        for node in &map.nodes {
            for target in &node.adjacent {
                if target == &node.id || !neighbours.contains_key(target) {
                    continue;
                }
                if let Some(set) = neighbours.get_mut(&node.id) {
                    set.insert(target.clone());
                }
                if let Some(set) = neighbours.get_mut(target) {
                    set.insert(node.id.clone());
                }
            }
        }
        Self {
            map: map.clone(),
            neighbours,
        }
    }

    /// The underlying map definition.
    pub const fn map(&self) -> &MapDef {
        &self.map
    }

    /// Map id.
    pub fn map_id(&self) -> &str {
        &self.map.id
    }

    /// Entry node id.
    pub fn entry(&self) -> &str {
        &self.map.entry_node
    }

    /// Look up a node on this map.
    pub fn node(&self, node_id: &str) -> Option<&EncounterNodeDef> {
        self.map.node(node_id)
    }

    /// Neighbours of `node_id` in both directions.
    pub fn neighbours(&self, node_id: &str) -> impl Iterator<Item = &str> {
        self.neighbours
            .get(node_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Compute the reachable set for `cleared` from scratch.
    pub fn reachable(&self, cleared: &BTreeSet<String>) -> BTreeSet<String> {
        self.map
            .nodes
            .iter()
            .filter(|n| !cleared.contains(&n.id))
            .filter(|n| {
                n.id == self.map.entry_node
                    || self.neighbours(&n.id).any(|nb| cleared.contains(nb))
            })
            .map(|n| n.id.clone())
            .collect()
    }

    /// The starting reachable set of a fresh map: just the entry node.
    pub fn initial_reachable(&self) -> BTreeSet<String> {
        self.reachable(&BTreeSet::new())
    }

    /// Whether `node_id` can be attacked given the current traversal.
    ///
    /// The node must be reachable. A protected node additionally requires
    /// every neighbour to be cleared. All other kinds, `env` included, need
    /// nothing more.
    pub fn can_damage(
        &self,
        node_id: &str,
        cleared: &BTreeSet<String>,
        reachable: &BTreeSet<String>,
    ) -> bool {
        let Some(node) = self.node(node_id) else {
            return false;
        };
        if !reachable.contains(node_id) {
            return false;
        }
        match node.kind {
            NodeKind::Protected => self.neighbours(node_id).all(|nb| cleared.contains(nb)),
            NodeKind::Normal | NodeKind::Shield | NodeKind::Timed | NodeKind::Env => true,
        }
    }

    /// Protected nodes that can never become damageable.
    ///
    /// A protected node is stranded when clearing every other node that can
    /// ever be cleared still leaves one of its neighbours standing. That
    /// happens when a neighbour is only reachable through the protected
    /// node itself.
    pub fn stranded_protected_nodes(&self) -> Vec<String> {
        self.map
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Protected)
            .filter(|n| {
                let cleared = self.clear_everything_except(&n.id);
                !self.neighbours(&n.id).all(|nb| cleared.contains(nb))
            })
            .map(|n| n.id.clone())
            .collect()
    }

    /// Clear damageable nodes until a fixed point, never clearing `held`.
    fn clear_everything_except(&self, held: &str) -> BTreeSet<String> {
        let mut cleared = BTreeSet::new();
        loop {
            let reachable = self.reachable(&cleared);
            let next: Vec<String> = reachable
                .iter()
                .filter(|id| id.as_str() != held)
                .filter(|id| self.can_damage(id, &cleared, &reachable))
                .cloned()
                .collect();
            if next.is_empty() {
                return cleared;
            }
            cleared.extend(next);
        }
    }
}
