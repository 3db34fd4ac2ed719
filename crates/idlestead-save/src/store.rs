//! The [`SaveStore`] seam and the in-memory implementation used by tests.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use idlestead_types::{SAVE_VERSION, SavePayload};

use crate::error::SaveError;

/// Somewhere a [`SavePayload`] can be written to and read back from.
///
/// A failed `save` must leave any previously stored payload readable.
pub trait SaveStore: Send + Sync {
    /// Persist `payload`, replacing whatever was stored before.
    fn save(&self, payload: &SavePayload) -> impl Future<Output = Result<(), SaveError>> + Send;

    /// Read the stored payload, or `None` if nothing has been saved yet.
    fn load(&self) -> impl Future<Output = Result<Option<SavePayload>, SaveError>> + Send;

    /// Delete the stored payload. Deleting nothing is not an error.
    fn clear(&self) -> impl Future<Output = Result<(), SaveError>> + Send;
}

/// Encode a payload as pretty JSON.
///
/// # Errors
///
/// Returns [`SaveError::Serialization`] if encoding fails.
pub fn encode(payload: &SavePayload) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Decode a payload and check its format version.
///
/// # Errors
///
/// Returns [`SaveError::Serialization`] for malformed JSON or
/// [`SaveError::UnsupportedVersion`] for a save from another format.
pub fn decode(text: &str) -> Result<SavePayload, SaveError> {
    let payload: SavePayload = serde_json::from_str(text)?;
    if payload.meta.version != SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: payload.meta.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(payload)
}

/// Keeps the encoded payload in memory.
///
/// Stores the JSON text rather than the struct so that a round trip goes
/// through the same encoding as the file store.
#[derive(Debug, Default)]
pub struct MemorySaveStore {
    slot: Mutex<Option<String>>,
}

impl MemorySaveStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with raw JSON text.
    pub fn with_raw(text: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(text.into())),
        }
    }

    /// The raw stored text, if any.
    pub async fn raw(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }
}

impl SaveStore for MemorySaveStore {
    async fn save(&self, payload: &SavePayload) -> Result<(), SaveError> {
        let text = encode(payload)?;
        *self.slot.lock().await = Some(text);
        debug!("payload saved to memory");
        Ok(())
    }

    async fn load(&self) -> Result<Option<SavePayload>, SaveError> {
        let guard = self.slot.lock().await;
        guard.as_deref().map(decode).transpose()
    }

    async fn clear(&self) -> Result<(), SaveError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}
