use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::client::{decode, ApiClient, ApiError};
use crate::form::{FormDraft, FormSchema, Payload};

/// A content entity managed through one REST collection.
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Collection path under the API base, e.g. `"about"`.
    const PATH: &'static str;
    /// Human label for messages.
    const LABEL: &'static str;
    const SCHEMA: &'static FormSchema;

    fn id(&self) -> i64;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);

    fn domain_id(&self) -> i64 { 0 }
    fn course_id(&self) -> i64 { 0 }

    /// Fields searched by the list filter.
    fn search_text(&self) -> Vec<&str>;

    /// Edit-form pre-fill from the stored record. File fields start empty.
    fn to_draft(&self) -> FormDraft;

    /// Body for a status-only update: `isActive` plus every companion field,
    /// so the server does not clear what the form did not resend.
    fn status_payload(&self) -> Payload {
        let mut draft = self.to_draft();
        draft.retain(|f| f.name == "isActive" || f.companion);
        draft.encode()
    }
}

/// The four REST operations the list controller needs.
#[async_trait]
pub trait ResourceApi<T: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, ApiError>;
    /// `None` when the server acknowledges without echoing the record.
    async fn create(&self, payload: Payload) -> Result<Option<T>, ApiError>;
    async fn update(&self, id: i64, payload: Payload) -> Result<Option<T>, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// HTTP-backed [`ResourceApi`] for one entity type.
pub struct ResourceService<T> {
    client: ApiClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self { Self { client: self.client.clone(), _entity: PhantomData } }
}

impl<T: Resource> ResourceService<T> {
    pub fn new(client: ApiClient) -> Self { Self { client, _entity: PhantomData } }

    fn item_path(id: i64) -> String { format!("{}/{}", T::PATH, id) }

    fn echoed(body: &str) -> Option<T> { decode::<T>(body).ok() }
}

#[async_trait]
impl<T: Resource> ResourceApi<T> for ResourceService<T> {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.client.get_json(&format!("{}/all", T::PATH)).await
    }

    async fn create(&self, payload: Payload) -> Result<Option<T>, ApiError> {
        let body = self.client.send(Method::POST, T::PATH, payload).await?;
        Ok(Self::echoed(&body))
    }

    async fn update(&self, id: i64, payload: Payload) -> Result<Option<T>, ApiError> {
        let body = self.client.send(Method::PUT, &Self::item_path(id), payload).await?;
        Ok(Self::echoed(&body))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&Self::item_path(id)).await
    }
}
