use std::sync::Arc;

use anyhow::Result;

use crate::storage::Storage;

const TOKEN_KEY: &str = "auth_token";

/// Bearer token persisted in local storage.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self { Self { storage } }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self.storage.get(TOKEN_KEY).await?.filter(|t| !t.is_empty()))
    }

    pub async fn store(&self, token: &str) -> Result<()> {
        self.storage.put(TOKEN_KEY, token).await
    }

    pub async fn clear(&self) -> Result<()> { self.storage.delete(TOKEN_KEY).await }

    pub async fn is_logged_in(&self) -> Result<bool> { Ok(self.token().await?.is_some()) }
}
