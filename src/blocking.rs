//! Synchronous wrappers over the async client.
//!
//! Every method here runs the corresponding async method to completion on a
//! runtime owned by the blocking [`Client`]. Calls made from a plain thread
//! are driven on the calling thread; calls made from inside another tokio
//! runtime are handed to a short-lived helper thread, since blocking a
//! runtime thread on a runtime panics.
//!
//! ```no_run
//! # fn example() -> mkio::Result<()> {
//! let client = mkio::blocking::Client::new("my-subscription", "my-token")?;
//! let asset = client.assets().get(&["my-asset"])?;
//! println!("{:?}", asset.properties.container);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

use crate::errors::{MkioError, Result};
use crate::models::{
    Asset, Cursor, GenericResource, ListOptions, LiveOutput, Page, StorageAccount, Subscription,
    SubscriptionInfo, Transform, UserProfile,
};
use crate::paths::{self, ResourcePath};
use crate::url::EndpointTemplate;
use crate::ClientBuilder;

/// Blocking counterpart of [`crate::Client`].
pub struct Client {
    inner: crate::Client,
    runtime: Option<Runtime>,
}

impl Client {
    /// Create a client for `subscription` with default settings.
    pub fn new(subscription: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::from_async(crate::Client::new(subscription, token)?)
    }

    pub fn from_builder(builder: ClientBuilder) -> Result<Self> {
        Self::from_async(builder.build()?)
    }

    /// Wrap an existing async client; the two share a connection pool.
    pub fn from_async(inner: crate::Client) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mkio-blocking")
            .enable_all()
            .build()
            .map_err(|e| MkioError::Runtime(format!("failed to start runtime: {e}")))?;

        Ok(Self {
            inner,
            runtime: Some(runtime),
        })
    }

    /// The async client behind this wrapper.
    pub fn as_async(&self) -> &crate::Client {
        &self.inner
    }

    /// Cancelling this token aborts calls in flight on any thread.
    pub fn cancellation_token(&self) -> &CancellationToken {
        self.inner.cancellation_token()
    }

    pub fn get<T>(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.get(template, ids))?
    }

    pub fn create_or_update<T, P>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        payload: &P,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send,
        P: Serialize + Sync + ?Sized,
    {
        self.block_on(self.inner.create_or_update(template, ids, payload))?
    }

    pub fn post<T, P>(&self, template: &EndpointTemplate, ids: &[&str], payload: &P) -> Result<T>
    where
        T: DeserializeOwned + Send,
        P: Serialize + Sync + ?Sized,
    {
        self.block_on(self.inner.post(template, ids, payload))?
    }

    pub fn invoke<T>(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.invoke(template, ids))?
    }

    pub fn delete(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<()> {
        self.block_on(self.inner.delete(template, ids))?
    }

    pub fn list<T>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.list(template, ids, opts))?
    }

    pub fn list_all<T>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.list_all(template, ids, opts))?
    }

    pub fn list_page<T>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.list_page(template, ids, opts))?
    }

    pub fn next_page<T>(&self, cursor: Cursor) -> Result<Page<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.block_on(self.inner.next_page(cursor))?
    }

    pub fn resource<T>(&self, path: ResourcePath) -> Resource<'_, T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        Resource {
            client: self,
            inner: self.inner.resource(path),
        }
    }

    pub fn assets(&self) -> Resource<'_, Asset> {
        self.resource(paths::ASSETS)
    }

    pub fn transforms(&self) -> Resource<'_, Transform> {
        self.resource(paths::TRANSFORMS)
    }

    pub fn jobs(&self) -> Resource<'_, GenericResource> {
        self.resource(paths::JOBS)
    }

    pub fn live_events(&self) -> Resource<'_, GenericResource> {
        self.resource(paths::LIVE_EVENTS)
    }

    pub fn live_outputs(&self) -> Resource<'_, LiveOutput> {
        self.resource(paths::LIVE_OUTPUTS)
    }

    pub fn streaming_locators(&self) -> Resource<'_, GenericResource> {
        self.resource(paths::STREAMING_LOCATORS)
    }

    pub fn streaming_endpoints(&self) -> Resource<'_, GenericResource> {
        self.resource(paths::STREAMING_ENDPOINTS)
    }

    pub fn content_key_policies(&self) -> Resource<'_, GenericResource> {
        self.resource(paths::CONTENT_KEY_POLICIES)
    }

    pub fn storage_accounts(&self) -> Resource<'_, StorageAccount> {
        self.resource(paths::STORAGE_ACCOUNTS)
    }

    pub fn user_profile(&self) -> Result<UserProfile> {
        self.block_on(self.inner.user_profile())?
    }

    pub fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.block_on(self.inner.subscriptions())?
    }

    pub fn subscription_info(&self) -> Result<SubscriptionInfo> {
        self.block_on(self.inner.subscription_info())?
    }

    pub fn account_url(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<String> {
        self.block_on(self.inner.account_url(template, ids))?
    }

    fn block_on<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future + Send,
        F::Output: Send,
    {
        let handle = self
            .runtime
            .as_ref()
            .ok_or_else(|| MkioError::Runtime("runtime already shut down".into()))?
            .handle();

        if tokio::runtime::Handle::try_current().is_err() {
            return Ok(handle.block_on(fut));
        }

        std::thread::scope(|scope| {
            match scope.spawn(|| handle.block_on(fut)).join() {
                Ok(output) => Ok(output),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Dropping a runtime from async context panics; shutting down in the
        // background is allowed everywhere.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Blocking counterpart of [`crate::Resource`].
pub struct Resource<'a, T> {
    client: &'a Client,
    inner: crate::Resource<T>,
}

impl<T> Resource<'_, T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn list(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Vec<T>> {
        self.client.block_on(self.inner.list(parent_ids, opts))?
    }

    pub fn list_all(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Vec<T>> {
        self.client.block_on(self.inner.list_all(parent_ids, opts))?
    }

    pub fn list_page(&self, parent_ids: &[&str], opts: &ListOptions) -> Result<Page<T>> {
        self.client.block_on(self.inner.list_page(parent_ids, opts))?
    }

    pub fn next_page(&self, cursor: Cursor) -> Result<Page<T>> {
        self.client.block_on(self.inner.next_page(cursor))?
    }

    pub fn get(&self, ids: &[&str]) -> Result<T> {
        self.client.block_on(self.inner.get(ids))?
    }

    pub fn create_or_update(&self, ids: &[&str], resource: &T) -> Result<T> {
        self.client.block_on(self.inner.create_or_update(ids, resource))?
    }

    pub fn delete(&self, ids: &[&str]) -> Result<()> {
        self.client.block_on(self.inner.delete(ids))?
    }
}

impl Resource<'_, Asset> {
    pub fn streaming_locators(&self, asset: &str) -> Result<Vec<GenericResource>> {
        self.client.block_on(self.inner.streaming_locators(asset))?
    }

    pub fn storage(&self, asset: &str) -> Result<serde_json::Value> {
        self.client.block_on(self.inner.storage(asset))?
    }
}
