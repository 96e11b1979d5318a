use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::error::{AppError, Result};

/// Platform capability that stores a downloaded file under a given name
#[async_trait]
pub trait FileSaver: Send + Sync {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()>;
}

/// Saves downloads into a single directory
#[derive(Debug, Clone)]
pub struct DiskSaver {
    dir: PathBuf,
}

impl DiskSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where `filename` lands; only its final component is used
    pub fn target_path(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename.trim())
            .file_name()
            .ok_or_else(|| AppError::Validation(format!("Invalid file name: {:?}", filename)))?;

        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl FileSaver for DiskSaver {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        let path = self.target_path(filename)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;

        debug!("Wrote {} bytes", bytes.len());
        info!("Saved {}", path.display());

        Ok(())
    }
}
