use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::clients::FileStore;
use crate::features::files::dtos::{ToggleFavoriteRequest, UploadFileRequest};
use crate::features::files::models::{FileRecord, LocalFile};
use crate::features::files::services::transfer_codec::{decode_payload, encode_payload};
use crate::features::session::Identity;
use crate::modules::storage::FileSaver;
use crate::shared::constants::{PLACEHOLDER_CONTENT, PLACEHOLDER_FILENAME};
use crate::shared::notifications::{Notification, Notifier};

/// Owner of the feed snapshot, which is the same for everyone
const SHARED_OWNER: &str = "";

/// Files fetched for one owner
#[derive(Default)]
struct Snapshot {
    owner: String,
    files: Vec<FileRecord>,
}

/// One view-state collection, replaced wholesale by the latest fetch cycle
struct SyncSlot {
    snapshot: RwLock<Snapshot>,
    cycle: Mutex<CancellationToken>,
}

impl SyncSlot {
    fn new() -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::default()),
            cycle: Mutex::new(CancellationToken::new()),
        }
    }

    /// Start a fetch cycle, cancelling the one still in flight
    fn begin_cycle(&self, scope: Option<&CancellationToken>) -> CancellationToken {
        let token = match scope {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        let previous = {
            let mut current = self.cycle.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *current, token.clone())
        };
        previous.cancel();

        token
    }

    /// Drop files held for anyone but `owner`
    async fn claim(&self, owner: &str) {
        let mut current = self.snapshot.write().await;
        if current.owner != owner {
            current.owner = owner.to_string();
            current.files.clear();
        }
    }

    /// Store `files` for `owner` unless the cycle was superseded meanwhile
    async fn replace(
        &self,
        cycle: &CancellationToken,
        owner: &str,
        files: Vec<FileRecord>,
    ) -> bool {
        let mut current = self.snapshot.write().await;
        if cycle.is_cancelled() {
            return false;
        }
        current.owner = owner.to_string();
        current.files = files;
        true
    }

    /// Files held for `owner`; empty when they belong to someone else
    async fn snapshot(&self, owner: &str) -> Vec<FileRecord> {
        let current = self.snapshot.read().await;
        if current.owner == owner {
            current.files.clone()
        } else {
            Vec::new()
        }
    }
}

/// Mediates every read and write against the remote file store and keeps
/// the local feed and favorites snapshots in sync with it.
pub struct FileFeedClient {
    store: Arc<dyn FileStore>,
    saver: Arc<dyn FileSaver>,
    notifier: Arc<dyn Notifier>,
    feed: SyncSlot,
    favorites: SyncSlot,
}

impl FileFeedClient {
    pub fn new(
        store: Arc<dyn FileStore>,
        saver: Arc<dyn FileSaver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            saver,
            notifier,
            feed: SyncSlot::new(),
            favorites: SyncSlot::new(),
        }
    }

    /// Current feed snapshot, without fetching
    pub async fn feed(&self) -> Vec<FileRecord> {
        self.feed.snapshot(SHARED_OWNER).await
    }

    /// Current favorites snapshot of `identity`, without fetching
    pub async fn favorites(&self, identity: &Identity) -> Vec<FileRecord> {
        self.favorites.snapshot(identity.as_str()).await
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Fetch the full feed.
    ///
    /// Failures are logged and the previous snapshot is kept and returned.
    pub async fn list_files(&self) -> Vec<FileRecord> {
        self.refresh_feed(None).await
    }

    /// Fetch the favorites of `identity`; a blank identity issues no request.
    pub async fn list_favorites(&self, identity: &Identity) -> Vec<FileRecord> {
        self.refresh_favorites(identity, None).await
    }

    /// Feed fetch whose cycle also ends when `scope` is cancelled
    pub async fn refresh_feed(&self, scope: Option<&CancellationToken>) -> Vec<FileRecord> {
        let cycle = self.feed.begin_cycle(scope);
        if cycle.is_cancelled() {
            return self.feed.snapshot(SHARED_OWNER).await;
        }

        let result = tokio::select! {
            biased;
            _ = cycle.cancelled() => {
                debug!("Feed fetch superseded");
                return self.feed.snapshot(SHARED_OWNER).await;
            }
            result = self.store.list_files() => result,
        };

        match result {
            Ok(files) => {
                let count = files.len();
                if self.feed.replace(&cycle, SHARED_OWNER, files).await {
                    debug!("Feed refreshed: {} files", count);
                }
            }
            Err(e) => warn!("Failed to load file feed: {}", e),
        }

        self.feed.snapshot(SHARED_OWNER).await
    }

    pub async fn refresh_favorites(
        &self,
        identity: &Identity,
        scope: Option<&CancellationToken>,
    ) -> Vec<FileRecord> {
        if identity.is_blank() {
            return Vec::new();
        }

        let owner = identity.as_str();
        let cycle = self.favorites.begin_cycle(scope);
        self.favorites.claim(owner).await;
        if cycle.is_cancelled() {
            return self.favorites.snapshot(owner).await;
        }

        let result = tokio::select! {
            biased;
            _ = cycle.cancelled() => {
                debug!("Favorites fetch superseded");
                return self.favorites.snapshot(owner).await;
            }
            result = self.store.list_favorites(owner) => result,
        };

        match result {
            Ok(files) => {
                let count = files.len();
                if self.favorites.replace(&cycle, owner, files).await {
                    debug!("Favorites of {} refreshed: {} files", identity, count);
                }
            }
            Err(e) => warn!("Failed to load favorites of {}: {}", identity, e),
        }

        self.favorites.snapshot(owner).await
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Upload `file` under `identity`, then refresh the feed
    pub async fn upload_file(
        &self,
        identity: &Identity,
        file: &LocalFile,
        description: &str,
    ) -> Result<()> {
        let result = self.try_upload(identity, file, description).await;

        match &result {
            Ok(()) => self
                .notifier
                .notify(Notification::success("File uploaded", file.filename.as_str())),
            Err(e) => self
                .notifier
                .notify(Notification::error("Upload failed", e.user_message())),
        }

        result
    }

    /// Read the file at `path` and upload it; the name is checked first
    pub async fn upload_path(
        &self,
        identity: &Identity,
        path: &Path,
        description: &str,
    ) -> Result<()> {
        match read_upload(identity, path).await {
            Ok(file) => self.upload_file(identity, &file, description).await,
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Upload failed", e.user_message()));
                Err(e)
            }
        }
    }

    async fn try_upload(
        &self,
        identity: &Identity,
        file: &LocalFile,
        description: &str,
    ) -> Result<()> {
        require_identity(identity, "upload files")?;

        if file.filename.trim().is_empty() {
            return Err(AppError::Validation("Pick a file to upload".to_string()));
        }

        let request = UploadFileRequest {
            username: identity.as_str().to_string(),
            filename: file.filename.clone(),
            file_data: encode_payload(&file.bytes),
            description: description.trim().to_string(),
        };

        let response = self.store.upload(&request).await?.into_result("upload")?;

        info!(
            "Uploaded {} ({} bytes) as {}, file_id={:?}",
            file.filename,
            file.size(),
            identity,
            response.file_id
        );

        self.list_files().await;
        Ok(())
    }

    /// Toggle favorite membership; returns the state reported by the endpoint
    pub async fn toggle_favorite(&self, identity: &Identity, file_id: i64) -> Result<bool> {
        let result = self.try_toggle_favorite(identity, file_id).await;

        match &result {
            Ok(true) => self.notifier.notify(Notification::success(
                "Added to favorites",
                format!("File #{}", file_id),
            )),
            Ok(false) => self.notifier.notify(Notification::success(
                "Removed from favorites",
                format!("File #{}", file_id),
            )),
            Err(e) => self.notifier.notify(Notification::error(
                "Could not update favorites",
                e.user_message(),
            )),
        }

        result
    }

    async fn try_toggle_favorite(&self, identity: &Identity, file_id: i64) -> Result<bool> {
        require_identity(identity, "manage favorites")?;

        let request = ToggleFavoriteRequest::new(file_id, identity.as_str());
        let is_favorited = self
            .store
            .toggle_favorite(&request)
            .await?
            .into_favorited()?;

        info!(
            "File {} favorite state for {}: {}",
            file_id, identity, is_favorited
        );

        self.list_favorites(identity).await;
        Ok(is_favorited)
    }

    /// Delete a file, then refresh both the feed and the favorites
    pub async fn delete_file(&self, identity: &Identity, file_id: i64) -> Result<()> {
        let result = self.try_delete(identity, file_id).await;

        match &result {
            Ok(()) => self.notifier.notify(Notification::success(
                "File deleted",
                format!("File #{}", file_id),
            )),
            Err(e) => self
                .notifier
                .notify(Notification::error("Delete failed", e.user_message())),
        }

        result
    }

    async fn try_delete(&self, identity: &Identity, file_id: i64) -> Result<()> {
        require_identity(identity, "delete files")?;

        self.store
            .delete(file_id, identity.as_str())
            .await?
            .into_result("delete")?;

        info!("Deleted file {} as {}", file_id, identity);

        tokio::join!(self.list_files(), self.list_favorites(identity));
        Ok(())
    }

    // =========================================================================
    // DOWNLOADS
    // =========================================================================

    /// Fetch, decode and save one file under `filename`
    pub async fn download_file(&self, file_id: i64, filename: &str) -> Result<()> {
        let result = self.try_download(file_id, filename).await;

        match &result {
            Ok(saved_as) => self
                .notifier
                .notify(Notification::success("File downloaded", saved_as.as_str())),
            Err(e) => self
                .notifier
                .notify(Notification::error("Download failed", e.user_message())),
        }

        result.map(|_| ())
    }

    async fn try_download(&self, file_id: i64, filename: &str) -> Result<String> {
        let payload = self.store.fetch_payload(file_id).await?;
        let bytes = decode_payload(&payload.file_data)?;
        if let Some(expected) = payload.file_size.filter(|size| *size != bytes.len() as u64) {
            warn!(
                "File {} decoded to {} bytes, listed as {}",
                payload.id.unwrap_or(file_id),
                bytes.len(),
                expected
            );
        }

        let filename = match filename.trim() {
            "" => payload
                .filename
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("file-{}", file_id)),
            name => name.to_string(),
        };

        self.saver.save(&bytes, &filename).await?;
        info!("Downloaded file {} ({} bytes) as {}", file_id, bytes.len(), filename);

        Ok(filename)
    }

    /// Save the locally generated sample file; no request is made
    pub async fn download_placeholder(&self) -> Result<()> {
        let result = self
            .saver
            .save(PLACEHOLDER_CONTENT.as_bytes(), PLACEHOLDER_FILENAME)
            .await;

        match &result {
            Ok(()) => self
                .notifier
                .notify(Notification::success("File downloaded", PLACEHOLDER_FILENAME)),
            Err(e) => self
                .notifier
                .notify(Notification::error("Download failed", e.user_message())),
        }

        result
    }
}

async fn read_upload(identity: &Identity, path: &Path) -> Result<LocalFile> {
    require_identity(identity, "upload files")?;
    LocalFile::from_path(path).await
}

fn require_identity(identity: &Identity, action: &str) -> Result<()> {
    if identity.is_blank() {
        return Err(AppError::IdentityRequired(format!(
            "a name is required to {}",
            action
        )));
    }
    Ok(())
}
