//! Typed CRUD surface shared by every resource type.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::errors::Result;
use crate::models::{
    Asset, Cursor, GenericResource, ListOptions, LiveOutput, Page, StorageAccount, Transform,
};
use crate::paths::{self, ResourcePath};
use crate::url::EndpointTemplate;

/// Operations on one resource type, e.g. `Resource<Asset>`.
///
/// `ids` on item calls are the full positional id list of the item
/// (`["event", "output"]` for a live output); collection calls take the
/// parent ids only (`["event"]`, or `[]` for top-level resources). Slots the
/// path's [`Scope`](crate::paths::Scope) fills are never passed in `ids`.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    client: Client,
    path: ResourcePath,
    _model: PhantomData<fn() -> T>,
}

impl<T> Resource<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(client: Client, path: ResourcePath) -> Self {
        Self {
            client,
            path,
            _model: PhantomData,
        }
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Items of the first page.
    pub async fn list(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Vec<T>> {
        Ok(self.list_page(parent_ids, opts).await?.items)
    }

    /// Every item, following next-page links until exhausted.
    pub async fn list_all(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Vec<T>> {
        let first = self.list_page(parent_ids, opts).await?;
        self.client.collect_pages(first).await
    }

    pub async fn list_page(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Page<T>> {
        let url = self.url(&self.path.collection, parent_ids).await?;
        self.client.list_page_url(&url, opts).await
    }

    pub async fn next_page(&self, cursor: Cursor) -> Result<Page<T>> {
        self.client.next_page(cursor).await
    }

    pub async fn get(&self, ids: &[&str]) -> Result<T> {
        let url = self.url(&self.path.item, ids).await?;
        self.client.get_url(&url).await
    }

    /// `PUT` the resource; waits for the operation if the service answers 202.
    pub async fn create_or_update(&self, ids: &[&str], resource: &T) -> Result<T> {
        let url = self.url(&self.path.item, ids).await?;
        self.client.put_url(&url, resource).await
    }

    pub async fn delete(&self, ids: &[&str]) -> Result<()> {
        let url = self.url(&self.path.item, ids).await?;
        self.client.delete_url(&url).await
    }

    async fn url(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<String> {
        self.client.scoped_url(self.path.scope, template, ids).await
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamingLocatorList {
    #[serde(default)]
    streaming_locators: Vec<GenericResource>,
}

impl Resource<Asset> {
    /// Streaming locators published for `asset`.
    pub async fn streaming_locators(&self, asset: &str) -> Result<Vec<GenericResource>> {
        let list: StreamingLocatorList = self
            .client
            .invoke(&paths::ASSET_STREAMING_LOCATORS, &[asset])
            .await?;
        Ok(list.streaming_locators)
    }

    /// Tracks and directory listing of the asset's storage container.
    pub async fn storage(&self, asset: &str) -> Result<serde_json::Value> {
        self.client.get(&paths::ASSET_STORAGE, &[asset]).await
    }
}

impl Client {
    /// Typed operations for any resource path.
    pub fn resource<T>(&self, path: ResourcePath) -> Resource<T>
    where
        T: Serialize + DeserializeOwned,
    {
        Resource::new(self.clone(), path)
    }

    pub fn assets(&self) -> Resource<Asset> {
        self.resource(paths::ASSETS)
    }

    pub fn transforms(&self) -> Resource<Transform> {
        self.resource(paths::TRANSFORMS)
    }

    /// Jobs, keyed by `[transform, job]`.
    pub fn jobs(&self) -> Resource<GenericResource> {
        self.resource(paths::JOBS)
    }

    pub fn live_events(&self) -> Resource<GenericResource> {
        self.resource(paths::LIVE_EVENTS)
    }

    /// Live outputs, keyed by `[live_event, live_output]`.
    pub fn live_outputs(&self) -> Resource<LiveOutput> {
        self.resource(paths::LIVE_OUTPUTS)
    }

    pub fn streaming_locators(&self) -> Resource<GenericResource> {
        self.resource(paths::STREAMING_LOCATORS)
    }

    pub fn streaming_endpoints(&self) -> Resource<GenericResource> {
        self.resource(paths::STREAMING_ENDPOINTS)
    }

    pub fn content_key_policies(&self) -> Resource<GenericResource> {
        self.resource(paths::CONTENT_KEY_POLICIES)
    }

    /// Storage accounts of the subscription, keyed by storage account id.
    pub fn storage_accounts(&self) -> Resource<StorageAccount> {
        self.resource(paths::STORAGE_ACCOUNTS)
    }
}
