//! Game clock, tick cycle, and scheduling for the Idlestead kernel.
//!
//! This crate owns the six-phase tick cycle that drives a game:
//! Clock, Production, Research, Battle, Automation, and Bookkeeping.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter, elapsed-second measurement, and the tick
//!   interval at each speed.
//! - [`config`] -- Configuration loading from `idlestead-config.yaml` into
//!   strongly-typed structs.
//! - [`production`] -- Per-role production and the delta application step.
//! - [`offline`] -- Offline cap and elapsed-time clamping.
//! - [`buildings`] -- Building levels, upgrade costs, and building effects.
//! - [`research`] -- Research queue, completion, and research effects.
//! - [`loadout`] -- Equipment, artifacts, and artifact presets.
//! - [`prestige`] -- Prestige and awakening formulas and counters.
//! - [`multiplier`] -- [`MultiplierAggregator`]: live product of every
//!   multiplier source.
//! - [`daily`] -- Login streak, daily task board, and claims.
//! - [`achievements`] -- Lifetime milestones and achievement points.
//! - [`combat`] -- Map traversal, battle preview, and battle resolution.
//! - [`automation`] -- [`RuleEngine`] and the [`RuleContext`] seam.
//! - [`game`] -- [`Game`]: every store of one player, plus snapshot and
//!   restore.
//! - [`tick`] -- The six-phase tick cycle.
//! - [`control`] -- [`SchedulerControl`]: pause, speed, and stop.
//! - [`runner`] -- The production loop, battle ticker, and autosave.
//!
//! [`MultiplierAggregator`]: multiplier::MultiplierAggregator
//! [`RuleEngine`]: automation::RuleEngine
//! [`RuleContext`]: automation::RuleContext
//! [`Game`]: game::Game
//! [`SchedulerControl`]: control::SchedulerControl

pub mod achievements;
pub mod automation;
pub mod buildings;
pub mod clock;
pub mod combat;
pub mod config;
pub mod control;
pub mod daily;
pub mod game;
pub mod loadout;
pub mod multiplier;
pub mod offline;
pub mod prestige;
pub mod production;
pub mod research;
pub mod runner;
pub mod tick;
