use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::core::error::Result;
use crate::features::files::models::FileRecord;
use crate::features::files::services::FileFeedClient;
use crate::features::session::{Identity, Session};
use crate::shared::format::{format_file_size, format_uploaded_at};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedTab {
    #[default]
    All,
    Favorites,
}

/// One listed file, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub record: FileRecord,
    pub size: String,
    pub uploaded: String,
    pub can_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScreen {
    /// Favorites were requested but no name is set
    IdentityRequired,
    Empty { tab: FeedTab },
    Files { tab: FeedTab, entries: Vec<FeedEntry> },
}

/// Tabbed feed page: what is shown, and what gets fetched on each sync
pub struct FeedView {
    client: Arc<FileFeedClient>,
    session: RwLock<Session>,
    tab: RwLock<FeedTab>,
}

impl FeedView {
    pub fn new(client: Arc<FileFeedClient>, session: Session, tab: FeedTab) -> Self {
        Self {
            client,
            session: RwLock::new(session),
            tab: RwLock::new(tab),
        }
    }

    #[cfg(test)]
    pub fn client(&self) -> &Arc<FileFeedClient> {
        &self.client
    }

    pub async fn identity(&self) -> Identity {
        self.session.read().await.identity().clone()
    }

    pub async fn tab(&self) -> FeedTab {
        *self.tab.read().await
    }

    /// One sync cycle: the feed always, favorites only when they are shown
    pub async fn sync(&self) {
        self.sync_within(None).await;
    }

    pub async fn sync_within(&self, scope: Option<&CancellationToken>) {
        let identity = self.identity().await;

        if self.tab().await == FeedTab::Favorites && !identity.is_blank() {
            tokio::join!(
                self.client.refresh_feed(scope),
                self.client.refresh_favorites(&identity, scope)
            );
        } else {
            self.client.refresh_feed(scope).await;
        }
    }

    /// Switch tabs; entering Favorites fetches them again
    pub async fn select_tab(&self, tab: FeedTab) {
        *self.tab.write().await = tab;

        if tab == FeedTab::Favorites {
            let identity = self.identity().await;
            self.client.list_favorites(&identity).await;
        }
    }

    /// Change and persist the display name
    #[allow(dead_code)]
    pub async fn rename(&self, name: &str) -> Result<()> {
        let identity = {
            let mut session = self.session.write().await;
            session.rename(name).await?;
            session.identity().clone()
        };

        if self.tab().await == FeedTab::Favorites {
            self.client.list_favorites(&identity).await;
        }
        Ok(())
    }

    pub async fn screen(&self) -> FeedScreen {
        let identity = self.identity().await;
        let tab = self.tab().await;

        let files = match tab {
            FeedTab::Favorites if identity.is_blank() => return FeedScreen::IdentityRequired,
            FeedTab::Favorites => self.client.favorites(&identity).await,
            FeedTab::All => self.client.feed().await,
        };

        if files.is_empty() {
            return FeedScreen::Empty { tab };
        }

        let entries = files
            .into_iter()
            .map(|record| FeedEntry {
                size: format_file_size(record.file_size),
                uploaded: format_uploaded_at(&record.uploaded_at),
                can_delete: record.is_owned_by(&identity),
                record,
            })
            .collect();

        FeedScreen::Files { tab, entries }
    }
}

impl fmt::Display for FeedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedScreen::IdentityRequired => {
                writeln!(f, "Enter your name to see your favorite files.")?;
                write!(f, "Run `filedrop rename <name>` first.")
            }
            FeedScreen::Empty { tab: FeedTab::All } => write!(f, "No files uploaded yet."),
            FeedScreen::Empty {
                tab: FeedTab::Favorites,
            } => write!(f, "You have no favorite files yet."),
            FeedScreen::Files { entries, .. } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "#{:<6} {}  ({}, {}, by {})",
                        entry.record.id,
                        entry.record.filename,
                        entry.size,
                        entry.uploaded,
                        entry.record.username
                    )?;
                    if entry.can_delete {
                        write!(f, "  [yours]")?;
                    }
                    if !entry.record.description().is_empty() {
                        write!(f, "\n        {}", entry.record.description())?;
                    }
                }
                Ok(())
            }
        }
    }
}
