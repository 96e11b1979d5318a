use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::core::config::EndpointConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    ErrorResponse, FileListResponse, FilePayloadResponse, MutationResponse,
    ToggleFavoriteRequest, ToggleFavoriteResponse, UploadFileRequest,
};
use crate::features::files::models::FileRecord;

/// Remote store of file records.
///
/// Responses are returned as sent; interpreting `success` is up to the caller.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    async fn list_favorites(&self, username: &str) -> Result<Vec<FileRecord>>;

    async fn fetch_payload(&self, file_id: i64) -> Result<FilePayloadResponse>;

    async fn upload(&self, request: &UploadFileRequest) -> Result<MutationResponse>;

    async fn toggle_favorite(
        &self,
        request: &ToggleFavoriteRequest,
    ) -> Result<ToggleFavoriteResponse>;

    async fn delete(&self, file_id: i64, username: &str) -> Result<MutationResponse>;
}

/// Client for the single-URL file endpoint
pub struct HttpFileStore {
    client: Client,
    base_url: String,
}

impl HttpFileStore {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    /// Endpoint URL with percent-encoded query parameters
    fn url_with(&self, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return self.base_url.clone();
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.base_url, query_string)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        tracing::debug!("GET {} ({})", url, what);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("{} request failed: {}", what, e))
        })?;

        read_json(response, what).await
    }
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let url = self.url_with(&[]);
        let body: FileListResponse = self.get_json(&url, "file list").await?;
        Ok(body.files)
    }

    async fn list_favorites(&self, username: &str) -> Result<Vec<FileRecord>> {
        let url = self.url_with(&[("action", "favorites"), ("username", username)]);
        let body: FileListResponse = self.get_json(&url, "favorites").await?;
        Ok(body.files)
    }

    async fn fetch_payload(&self, file_id: i64) -> Result<FilePayloadResponse> {
        let id = file_id.to_string();
        let url = self.url_with(&[("id", &id)]);
        self.get_json(&url, "file payload").await
    }

    async fn upload(&self, request: &UploadFileRequest) -> Result<MutationResponse> {
        tracing::debug!(
            "POST {} (upload {}, {} base64 chars)",
            self.base_url,
            request.filename,
            request.file_data.len()
        );

        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("upload request failed: {}", e)))?;

        read_json(response, "upload").await
    }

    async fn toggle_favorite(
        &self,
        request: &ToggleFavoriteRequest,
    ) -> Result<ToggleFavoriteResponse> {
        tracing::debug!("PUT {} (favorite {})", self.base_url, request.file_id);

        let response = self
            .client
            .put(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("favorite request failed: {}", e))
            })?;

        read_json(response, "favorite toggle").await
    }

    async fn delete(&self, file_id: i64, username: &str) -> Result<MutationResponse> {
        let id = file_id.to_string();
        let url = self.url_with(&[("id", &id), ("username", username)]);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("delete request failed: {}", e)))?;

        read_json(response, "delete").await
    }
}

/// Parse a successful body, or map the status and `{ error }` body to an AppError
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            AppError::InvalidResponse(format!("Failed to parse {} response: {}", what, e))
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    tracing::warn!("{} failed: HTTP {} - {}", what, status, message);

    Err(match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::BAD_REQUEST => AppError::Rejected(format!("{}: {}", what, message)),
        _ => AppError::ExternalServiceError(format!(
            "{} request failed: HTTP {} - {}",
            what, status, message
        )),
    })
}
