use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::features::session::models::Identity;
use crate::shared::constants::IDENTITY_KEY;

/// Persists the identity under a fixed key in a small JSON document
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted identity.
    ///
    /// A missing or unreadable document yields a blank identity; the user is
    /// simply asked for a name again.
    pub async fn load(&self) -> Identity {
        match self.read_document().await {
            Ok(Some(doc)) => doc
                .get(IDENTITY_KEY)
                .and_then(Value::as_str)
                .map(Identity::new)
                .unwrap_or_default(),
            Ok(None) => {
                debug!("No session file at {}", self.path.display());
                Identity::blank()
            }
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Identity::blank()
            }
        }
    }

    /// Write the identity, keeping any other keys already in the document
    pub async fn save(&self, identity: &Identity) -> Result<()> {
        let mut doc = self.read_document().await.ok().flatten().unwrap_or_default();
        doc.insert(
            IDENTITY_KEY.to_string(),
            Value::String(identity.raw().to_string()),
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(&Value::Object(doc))
            .map_err(|e| AppError::Internal(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await?;

        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    async fn read_document(&self) -> std::io::Result<Option<Map<String, Value>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "session file is not a JSON object",
            )),
        }
    }
}
