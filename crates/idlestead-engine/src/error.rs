//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: idlestead_core::config::ConfigError,
    },

    /// Content tables failed to load or validate.
    #[error("content error: {source}")]
    Content {
        /// The underlying world error.
        #[from]
        source: idlestead_world::WorldError,
    },

    /// The game could not be built or restored.
    #[error("state error: {source}")]
    State {
        /// The underlying state error.
        #[from]
        source: idlestead_core::game::StateError,
    },

    /// Reading or writing the save failed.
    #[error("save error: {source}")]
    Save {
        /// The underlying save error.
        #[from]
        source: idlestead_save::SaveError,
    },

    /// The scheduler failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: idlestead_core::runner::RunnerError,
    },
}
