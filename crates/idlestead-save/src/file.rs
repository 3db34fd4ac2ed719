//! File-backed save store.
//!
//! Writes go to a sibling `*.tmp` file which is then renamed over the real
//! save, so a crash or a failed write leaves the previous save intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use idlestead_types::SavePayload;

use crate::error::SaveError;
use crate::store::{SaveStore, decode, encode};

/// Stores the payload as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    path: PathBuf,
}

impl FileSaveStore {
    /// A store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The save file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> SaveError {
        SaveError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl SaveStore for FileSaveStore {
    async fn save(&self, payload: &SavePayload) -> Result<(), SaveError> {
        let text = encode(payload)?;
        let temp = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Self::io_error(parent, source))?;
        }

        if let Err(source) = tokio::fs::write(&temp, text).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Self::io_error(&temp, source));
        }
        if let Err(source) = tokio::fs::rename(&temp, &self.path).await {
            warn!(path = %self.path.display(), error = %source, "save rename failed");
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Self::io_error(&self.path, source));
        }

        debug!(path = %self.path.display(), "payload saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<SavePayload>, SaveError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => decode(&text).map(Some),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Self::io_error(&self.path, source)),
        }
    }

    async fn clear(&self) -> Result<(), SaveError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Self::io_error(&self.path, source)),
        }
    }
}
