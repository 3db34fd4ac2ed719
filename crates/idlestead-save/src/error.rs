//! Error types for save persistence.
//!
//! Every failure leaves the in-memory game state untouched; callers log and
//! carry on.

/// Errors that can occur while saving or loading a payload.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Reading, writing, or renaming a save file failed.
    #[error("save file I/O failed for {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The payload could not be encoded or decoded.
    #[error("save serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The save was written by an incompatible format version.
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the save header.
        found: String,
        /// Version this build writes.
        expected: &'static str,
    },
}
