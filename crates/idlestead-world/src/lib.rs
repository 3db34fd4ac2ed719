//! Content, encounter graphs, and the world tree for the Idlestead kernel.
//!
//! This crate models what the player fights and what they buy with the
//! currencies those fights drop.
//!
//! # Modules
//!
//! - [`content`] -- [`ContentTables`]: immutable, validated catalogue of
//!   maps, world-tree nodes, buildings, research, equipment, and artifacts.
//! - [`builtin`] -- The built-in content set.
//! - [`encounter`] -- [`EncounterGraph`]: undirected neighbour index over a
//!   map, reachability, damageability, and the stranded-protected-node
//!   diagnostic.
//! - [`world_tree`] -- [`WorldTree`]: purchase DAG plus currency wallet.
//! - [`error`] -- Content loading errors.

pub mod builtin;
pub mod content;
pub mod encounter;
pub mod error;
pub mod world_tree;

// Re-export primary types at crate root.
pub use builtin::{ROOT_NODE, STARTING_MAP};
pub use content::{ARTIFACT_SLOTS, ContentTables};
pub use encounter::EncounterGraph;
pub use error::WorldError;
pub use world_tree::WorldTree;
