use std::path::Path;

use crate::core::error::{AppError, Result};

/// A file picked for upload, held entirely in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read the whole file at `path`; the record keeps only its final name
    pub async fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!("Not a file path: {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;

        Ok(Self::new(filename, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
