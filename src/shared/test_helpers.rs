//! Fakes shared by the unit tests
//!
//! - [`FakeEndpoint`]: an in-process axum server speaking the endpoint's wire format
//! - [`MemoryFileStore`]: a `FileStore` that records every call
//! - [`RecordingSaver`] / [`RecordingNotifier`]: capture downloads and notifications

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::error::{AppError, Result};
use crate::features::files::clients::FileStore;
use crate::features::files::dtos::{
    ErrorResponse, FilePayloadResponse, MutationResponse, ToggleFavoriteRequest,
    ToggleFavoriteResponse, UploadFileRequest, FAVORITE_ACTION,
};
use crate::features::files::models::FileRecord;
use crate::modules::storage::FileSaver;
use crate::shared::notifications::{Notification, Notifier};

pub fn record(id: i64, filename: &str, username: &str) -> FileRecord {
    FileRecord {
        id,
        filename: filename.to_string(),
        file_size: 0,
        description: Some(String::new()),
        uploaded_at: "2024-01-01T00:00:00Z".to_string(),
        username: username.to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// FAKE HTTP ENDPOINT
// =============================================================================

#[derive(Default)]
struct EndpointState {
    files: Vec<(FileRecord, Vec<u8>)>,
    favorites: Vec<(i64, String)>,
    next_id: i64,
}

type SharedState = Arc<Mutex<EndpointState>>;
type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub struct FakeEndpoint {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeEndpoint {
    pub async fn start() -> Self {
        let state = SharedState::default();
        let app = Router::new()
            .route(
                "/",
                get(get_files)
                    .post(post_file)
                    .put(put_favorite)
                    .delete(delete_file),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn insert(&self, mut record: FileRecord, bytes: Vec<u8>) {
        let mut state = lock(&self.state);
        record.file_size = bytes.len() as u64;
        state.next_id = state.next_id.max(record.id);
        state.files.push((record, bytes));
    }

    pub fn favorite(&self, file_id: i64, username: &str) {
        lock(&self.state)
            .favorites
            .push((file_id, username.to_string()));
    }

    pub fn payload(&self, file_id: i64) -> Option<Vec<u8>> {
        lock(&self.state)
            .files
            .iter()
            .find(|(r, _)| r.id == file_id)
            .map(|(_, bytes)| bytes.clone())
    }
}

impl Drop for FakeEndpoint {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn get_files(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> std::result::Result<Json<Value>, ApiError> {
    let state = lock(&state);

    if params.get("action").map(String::as_str) == Some("favorites") {
        if let Some(username) = params.get("username") {
            let files: Vec<&FileRecord> = state
                .favorites
                .iter()
                .rev()
                .filter(|(_, u)| u == username)
                .filter_map(|(id, _)| state.files.iter().find(|(r, _)| r.id == *id))
                .map(|(r, _)| r)
                .collect();
            return Ok(Json(json!({ "files": files })));
        }
    }

    if let Some(id) = params.get("id") {
        let id: i64 = id
            .parse()
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid id"))?;
        let (record, bytes) = state
            .files
            .iter()
            .find(|(r, _)| r.id == id)
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "File not found"))?;

        return Ok(Json(json!({
            "id": record.id,
            "filename": record.filename,
            "fileData": BASE64.encode(bytes),
            "fileSize": record.file_size,
            "description": record.description,
            "uploadedAt": record.uploaded_at,
            "username": record.username,
        })));
    }

    let files: Vec<&FileRecord> = state.files.iter().rev().take(50).map(|(r, _)| r).collect();
    Ok(Json(json!({ "files": files })))
}

async fn post_file(
    State(state): State<SharedState>,
    Json(request): Json<UploadFileRequest>,
) -> std::result::Result<Json<MutationResponse>, ApiError> {
    let bytes = BASE64
        .decode(&request.file_data)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid file data"))?;

    let mut state = lock(&state);
    state.next_id += 1;
    let id = state.next_id;

    let username = if request.username.is_empty() {
        "Anonymous".to_string()
    } else {
        request.username
    };

    let record = FileRecord {
        id,
        filename: request.filename,
        file_size: bytes.len() as u64,
        description: Some(request.description),
        uploaded_at: chrono::Utc::now().to_rfc3339(),
        username,
    };
    state.files.push((record, bytes));

    Ok(Json(MutationResponse {
        success: true,
        file_id: Some(id),
        error: None,
    }))
}

async fn put_favorite(
    State(state): State<SharedState>,
    Json(request): Json<ToggleFavoriteRequest>,
) -> std::result::Result<Json<ToggleFavoriteResponse>, ApiError> {
    if request.action != FAVORITE_ACTION {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid action"));
    }

    let mut state = lock(&state);
    let key = (request.file_id, request.username);
    let is_favorited = match state.favorites.iter().position(|f| *f == key) {
        Some(pos) => {
            state.favorites.remove(pos);
            false
        }
        None => {
            state.favorites.push(key);
            true
        }
    };

    Ok(Json(ToggleFavoriteResponse {
        success: true,
        is_favorited: Some(is_favorited),
        error: None,
    }))
}

async fn delete_file(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> std::result::Result<Json<MutationResponse>, ApiError> {
    let (Some(id), Some(username)) = (params.get("id"), params.get("username")) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing parameters"));
    };
    let id: i64 = id
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid id"))?;

    let mut state = lock(&state);
    let pos = state
        .files
        .iter()
        .position(|(r, _)| r.id == id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "File not found"))?;

    if &state.files[pos].0.username != username {
        return Err(api_error(StatusCode::FORBIDDEN, "Not authorized"));
    }

    state.files.remove(pos);
    state.favorites.retain(|(file_id, _)| *file_id != id);

    Ok(Json(MutationResponse {
        success: true,
        file_id: None,
        error: None,
    }))
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListFiles,
    ListFavorites(String),
    FetchPayload(i64),
    Upload(String),
    ToggleFavorite(i64),
    Delete(i64),
}

#[derive(Default)]
struct MemoryState {
    files: Vec<FileRecord>,
    payloads: HashMap<i64, String>,
    favorites: Vec<(i64, String)>,
    calls: Vec<StoreCall>,
    fail_reads: bool,
    reject_mutations: bool,
    reported_favorite: Option<bool>,
    list_delays: VecDeque<Duration>,
    favorites_delays: VecDeque<Duration>,
}

/// `FileStore` fake that records calls and can be told to misbehave
#[derive(Default)]
pub struct MemoryFileStore {
    state: Mutex<MemoryState>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(files: Vec<FileRecord>) -> Self {
        let store = Self::new();
        lock(&store.state).files = files;
        store
    }

    pub fn set_files(&self, files: Vec<FileRecord>) {
        lock(&self.state).files = files;
    }

    /// Raw `fileData` string served for `file_id`
    pub fn set_payload(&self, file_id: i64, file_data: &str) {
        lock(&self.state)
            .payloads
            .insert(file_id, file_data.to_string());
    }

    pub fn favorite(&self, file_id: i64, username: &str) {
        lock(&self.state)
            .favorites
            .push((file_id, username.to_string()));
    }

    pub fn fail_reads(&self, fail: bool) {
        lock(&self.state).fail_reads = fail;
    }

    pub fn reject_mutations(&self, reject: bool) {
        lock(&self.state).reject_mutations = reject;
    }

    /// Force the `isFavorited` value reported by the next toggles
    pub fn report_favorite(&self, value: Option<bool>) {
        lock(&self.state).reported_favorite = value;
    }

    /// Delay the next `list_files` answer by `delay`
    pub fn delay_next_list(&self, delay: Duration) {
        lock(&self.state).list_delays.push_back(delay);
    }

    /// Delay the next `list_favorites` answer by `delay`
    pub fn delay_next_favorites(&self, delay: Duration) {
        lock(&self.state).favorites_delays.push_back(delay);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.state).calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&StoreCall) -> bool) -> usize {
        lock(&self.state).calls.iter().filter(|c| matches(c)).count()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| *c == StoreCall::ListFiles)
    }

    pub fn favorites_calls(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::ListFavorites(_)))
    }

    fn record(&self, call: StoreCall) {
        lock(&self.state).calls.push(call);
    }

    fn unavailable() -> AppError {
        AppError::ExternalServiceError("store unavailable".to_string())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let (result, delay) = {
            let mut state = lock(&self.state);
            state.calls.push(StoreCall::ListFiles);
            let result = if state.fail_reads {
                Err(Self::unavailable())
            } else {
                Ok(state.files.clone())
            };
            (result, state.list_delays.pop_front())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn list_favorites(&self, username: &str) -> Result<Vec<FileRecord>> {
        let (result, delay) = {
            let mut state = lock(&self.state);
            state
                .calls
                .push(StoreCall::ListFavorites(username.to_string()));
            let result = if state.fail_reads {
                Err(Self::unavailable())
            } else {
                Ok(state
                    .favorites
                    .iter()
                    .filter(|(_, u)| u == username)
                    .filter_map(|(id, _)| state.files.iter().find(|f| f.id == *id).cloned())
                    .collect())
            };
            (result, state.favorites_delays.pop_front())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_payload(&self, file_id: i64) -> Result<FilePayloadResponse> {
        let mut state = lock(&self.state);
        state.calls.push(StoreCall::FetchPayload(file_id));
        if state.fail_reads {
            return Err(Self::unavailable());
        }

        let file_data = state
            .payloads
            .get(&file_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
        let filename = state
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.filename.clone());

        Ok(FilePayloadResponse {
            file_data,
            id: Some(file_id),
            filename,
            file_size: None,
        })
    }

    async fn upload(&self, request: &UploadFileRequest) -> Result<MutationResponse> {
        self.record(StoreCall::Upload(request.filename.clone()));
        let mut state = lock(&self.state);
        if state.reject_mutations {
            return Ok(MutationResponse::default());
        }

        let id = state.files.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let size = BASE64
            .decode(&request.file_data)
            .map(|b| b.len() as u64)
            .unwrap_or_default();
        state.files.push(FileRecord {
            id,
            filename: request.filename.clone(),
            file_size: size,
            description: Some(request.description.clone()),
            uploaded_at: "2024-01-01T00:00:00Z".to_string(),
            username: request.username.clone(),
        });
        state.payloads.insert(id, request.file_data.clone());

        Ok(MutationResponse {
            success: true,
            file_id: Some(id),
            error: None,
        })
    }

    async fn toggle_favorite(
        &self,
        request: &ToggleFavoriteRequest,
    ) -> Result<ToggleFavoriteResponse> {
        self.record(StoreCall::ToggleFavorite(request.file_id));
        let mut state = lock(&self.state);
        if state.reject_mutations {
            return Ok(ToggleFavoriteResponse::default());
        }

        let key = (request.file_id, request.username.clone());
        let toggled = match state.favorites.iter().position(|f| *f == key) {
            Some(pos) => {
                state.favorites.remove(pos);
                false
            }
            None => {
                state.favorites.push(key);
                true
            }
        };

        Ok(ToggleFavoriteResponse {
            success: true,
            is_favorited: Some(state.reported_favorite.unwrap_or(toggled)),
            error: None,
        })
    }

    async fn delete(&self, file_id: i64, username: &str) -> Result<MutationResponse> {
        self.record(StoreCall::Delete(file_id));
        let mut state = lock(&self.state);
        if state.reject_mutations {
            return Ok(MutationResponse {
                success: false,
                file_id: None,
                error: Some("storage is read-only".to_string()),
            });
        }

        let pos = state
            .files
            .iter()
            .position(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
        if state.files[pos].username != username {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        state.files.remove(pos);
        state.favorites.retain(|(id, _)| *id != file_id);

        Ok(MutationResponse {
            success: true,
            file_id: None,
            error: None,
        })
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

#[derive(Default)]
pub struct RecordingSaver {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSaver {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        lock(&self.saved).clone()
    }
}

#[async_trait]
impl FileSaver for RecordingSaver {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        lock(&self.saved).push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn last(&self) -> Option<Notification> {
        lock(&self.notifications).last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.notifications).push(notification);
    }
}
