//! Error types for the `idlestead-world` crate.
//!
//! Runtime lookups of unknown ids return `Option`/`bool`; [`WorldError`] is
//! raised only while loading and validating content tables.

/// Errors that can occur while loading content tables.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The content file could not be read.
    #[error("failed to read content file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The content file is not valid YAML for [`ContentTables`].
    ///
    /// [`ContentTables`]: crate::ContentTables
    #[error("failed to parse content YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// Two entries in one table share an id.
    #[error("duplicate {table} id: {id}")]
    DuplicateId {
        /// Table name.
        table: &'static str,
        /// The repeated id.
        id: String,
    },

    /// An entry references an id that does not exist.
    #[error("{table} entry {owner} references unknown id {missing}")]
    DanglingReference {
        /// Table of the referencing entry.
        table: &'static str,
        /// Id of the referencing entry.
        owner: String,
        /// The id that could not be resolved.
        missing: String,
    },

    /// A value violates a content invariant.
    #[error("invalid content: {reason}")]
    InvalidContent {
        /// What went wrong.
        reason: String,
    },
}
