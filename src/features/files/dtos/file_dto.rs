use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;

/// Action name the endpoint expects for a favorite toggle
pub const FAVORITE_ACTION: &str = "favorite";

/// Response of the feed and favorites listings
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// Single record including its base64 payload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayloadResponse {
    pub file_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// Upload envelope: the whole file travels as a base64 string
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub username: String,
    pub filename: String,
    pub file_data: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub action: String,
    pub file_id: i64,
    pub username: String,
}

impl ToggleFavoriteRequest {
    pub fn new(file_id: i64, username: impl Into<String>) -> Self {
        Self {
            action: FAVORITE_ACTION.to_string(),
            file_id,
            username: username.into(),
        }
    }
}

/// Generic `{ success }` answer to upload and delete
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of non-2xx answers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl MutationResponse {
    /// Turn `success: false` into an error instead of letting it pass as success
    pub fn into_result(self, operation: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(AppError::Rejected(rejection_reason(operation, self.error)))
        }
    }
}

impl ToggleFavoriteResponse {
    /// The endpoint's favorite state for the file
    pub fn into_favorited(self) -> Result<bool> {
        if !self.success {
            return Err(AppError::Rejected(rejection_reason(
                "favorite toggle",
                self.error,
            )));
        }

        self.is_favorited.ok_or_else(|| {
            AppError::InvalidResponse("favorite toggle response lacks isFavorited".to_string())
        })
    }
}

fn rejection_reason(operation: &str, error: Option<String>) -> String {
    match error {
        Some(e) if !e.is_empty() => format!("{}: {}", operation, e),
        _ => format!("{} reported success: false", operation),
    }
}
