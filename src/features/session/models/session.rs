use tracing::info;

use crate::core::error::Result;
use crate::features::session::models::Identity;
use crate::features::session::services::SessionStore;

/// Explicit per-user context passed to everything that needs the identity
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Identity,
    store: Option<SessionStore>,
}

impl Session {
    /// Restore the session persisted in `store`
    pub async fn load(store: SessionStore) -> Self {
        let identity = store.load().await;
        Self {
            identity,
            store: Some(store),
        }
    }

    /// A session that is never written anywhere
    #[cfg(test)]
    pub fn ephemeral(identity: Identity) -> Self {
        Self {
            identity,
            store: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Change the display name and persist it right away
    pub async fn rename(&mut self, name: &str) -> Result<()> {
        let identity = Identity::new(name);
        if let Some(store) = &self.store {
            store.save(&identity).await?;
        }

        info!("Identity set to {:?}", identity.as_str());
        self.identity = identity;
        Ok(())
    }
}
