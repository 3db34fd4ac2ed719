//! Save persistence for the Idlestead kernel.
//!
//! A save is a single versioned [`SavePayload`](idlestead_types::SavePayload)
//! encoded as JSON. Decimal fields are strings, so nothing is lost to binary
//! floats on the way through.
//!
//! # Modules
//!
//! - [`store`] -- The [`SaveStore`] trait, JSON codec, and [`MemorySaveStore`]
//! - [`file`] -- [`FileSaveStore`]: temp-file-then-rename writes
//! - [`error`] -- [`SaveError`]

pub mod error;
pub mod file;
pub mod store;

pub use error::SaveError;
pub use file::FileSaveStore;
pub use store::{MemorySaveStore, SaveStore, decode, encode};
