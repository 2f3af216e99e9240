pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod form;
pub mod list;
pub mod optimistic;
pub mod resource;
pub mod session;
pub mod storage;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::client::{ApiClient, ApiError};
    pub use crate::config::AdminConfig;
    pub use crate::entities::*;
    pub use crate::form::{FileUpload, FormDraft, FormError, Payload};
    pub use crate::list::{ListController, ListQuery, SortOrder, Toast, ToastLevel};
    pub use crate::resource::{Resource, ResourceApi, ResourceService};
    pub use crate::Admin;
}

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use tracing::info;
use url::Url;

use crate::client::ApiClient;
use crate::config::AdminConfig;
use crate::db::Database;
use crate::entities::BulkEmail;
use crate::form::Payload;
use crate::list::{ListController, ListQuery};
use crate::resource::{Resource, ResourceService};
use crate::session::Session;
use crate::storage::Storage;

/// Async library entry point. Owns the session store and the API client.
pub struct Admin {
    config: AdminConfig,
    client: ApiClient,
}

impl Admin {
    /// Open the local database (running migrations) and build the client.
    pub async fn connect(config: AdminConfig) -> Result<Self> {
        let db = Database::connect(config.database_url.as_deref()).await?;
        Self::with_storage(config, Arc::new(db))
    }

    /// Use any [`Storage`] for the session, e.g. [`storage::MemoryStorage`] in tests.
    pub fn with_storage(config: AdminConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let client = ApiClient::new(&config.api_base_url, Session::new(storage), config.timeout())
            .context("building API client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AdminConfig { &self.config }

    pub fn client(&self) -> &ApiClient { &self.client }

    pub fn service<T: Resource>(&self) -> ResourceService<T> {
        ResourceService::new(self.client.clone())
    }

    /// A fresh, empty list controller for `T`; call `refresh` to load it.
    pub fn controller<T: Resource>(&self) -> ListController<T, ResourceService<T>> {
        ListController::new(self.service())
    }

    /// First page with the configured page size.
    pub fn list_query(&self) -> ListQuery {
        ListQuery { page_size: self.config.page_size, ..ListQuery::default() }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        Ok(self.client.login(email, password).await?)
    }

    pub async fn logout(&self) -> Result<()> { Ok(self.client.logout().await?) }

    pub async fn is_logged_in(&self) -> Result<bool> { self.client.session().is_logged_in().await }

    pub async fn send_bulk_email(&self, mail: &BulkEmail) -> Result<()> {
        mail.validate().map_err(|e| anyhow!(e))?;
        let body = serde_json::to_value(mail)?;
        self.client.send(Method::POST, BulkEmail::PATH, Payload::Json(body)).await?;
        info!(recipients = mail.recipients.len(), "bulk email queued");
        Ok(())
    }

    pub fn image_url(&self, path: &str) -> Result<Url> { self.config.image_url(path) }
}
