use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::errors::{classify, Expect, MkioError, Result};
use crate::models::{
    Cursor, ListEnvelope, ListOptions, Page, Subscription, SubscriptionInfo, UserProfile,
};
use crate::operation::{MonitorBody, OperationHandle, OperationStatus, PollPolicy};
use crate::paths::{self, Scope};
use crate::url::{add_query_param, resolve_link, EndpointTemplate};

const DEFAULT_BASE_URL: &str = "https://api.io.mediakind.com/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Header carrying the caller's pre-issued API token.
pub const TOKEN_HEADER: &str = "x-mkio-token";

const TOKEN_ENV: &str = "MKIO_TOKEN";
const SUBSCRIPTION_ENV: &str = "MKIO_SUBSCRIPTION";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use mkio::{ClientBuilder, PollPolicy};
/// use std::time::Duration;
///
/// # fn example() -> mkio::Result<()> {
/// let client = ClientBuilder::new()
///     .subscription("my-subscription")
///     .token("my-token")
///     .timeout(Duration::from_secs(120))
///     .poll_policy(PollPolicy::unbounded().timeout(Duration::from_secs(600)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    token: Option<String>,
    subscription: Option<String>,
    base_url: String,
    timeout: Duration,
    poll_policy: PollPolicy,
    cancellation: Option<CancellationToken>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            token: None,
            subscription: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_policy: PollPolicy::default(),
            cancellation: None,
        }
    }

    /// Set the API token sent in the `x-mkio-token` header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the subscription (project) name substituted into every path.
    pub fn subscription(mut self, name: impl Into<String>) -> Self {
        self.subscription = Some(name.into());
        self
    }

    /// Override the base URL (defaults to `https://api.io.mediakind.com/`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request HTTP timeout (defaults to 60 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Bound long-running operation polling (unbounded by default).
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Abort in-flight requests and poll loops when `token` is cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the [`Client`].
    ///
    /// Falls back to the `MKIO_TOKEN` and `MKIO_SUBSCRIPTION` environment
    /// variables for values not set on the builder. Returns
    /// [`MkioError::Config`] if either is missing or the token is not a valid
    /// header value.
    pub fn build(self) -> Result<Client> {
        let token = self
            .token
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .ok_or_else(|| {
                MkioError::Config(format!(
                    "API token is required. Pass it to ClientBuilder::token() \
                     or set the {TOKEN_ENV} environment variable."
                ))
            })?;

        let subscription = self
            .subscription
            .or_else(|| std::env::var(SUBSCRIPTION_ENV).ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MkioError::Config(format!(
                    "subscription name is required. Pass it to ClientBuilder::subscription() \
                     or set the {SUBSCRIPTION_ENV} environment variable."
                ))
            })?;

        let mut token = HeaderValue::from_str(&token)
            .map_err(|_| MkioError::Config("API token contains invalid characters".into()))?;
        token.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(MkioError::Http)?;

        Ok(Client {
            config: Arc::new(Config {
                base_url: self.base_url,
                subscription,
                token,
                poll_policy: self.poll_policy,
                account: OnceCell::new(),
            }),
            http,
            cancel: self.cancellation.unwrap_or_else(CancellationToken::new),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Config {
    base_url: String,
    subscription: String,
    token: HeaderValue,
    poll_policy: PollPolicy,
    account: OnceCell<SubscriptionInfo>,
}

/// Status, headers and full body text of a response that passed classification.
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

/// The asynchronous MK.IO client.
///
/// Cheap to clone; clones share the connection pool and configuration. Use
/// [`ClientBuilder`] to construct one, or [`Client::new`] for the defaults.
///
/// # Example
///
/// ```no_run
/// use mkio::Client;
///
/// # async fn example() -> mkio::Result<()> {
/// let client = Client::new("my-subscription", "my-token")?;
///
/// let page = client.assets().list_page(&[], &Default::default()).await?;
/// for asset in &page.items {
///     println!("{:?}", asset.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    http: reqwest::Client,
    cancel: CancellationToken,
}

impl Client {
    /// Create a client for `subscription` with default settings.
    pub fn new(subscription: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new()
            .subscription(subscription)
            .token(token)
            .build()
    }

    /// The subscription substituted into slot `{0}` of every template.
    pub fn subscription(&self) -> &str {
        &self.config.subscription
    }

    /// The base URL every template and relative link is rendered against.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The token whose cancellation aborts this client's calls.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// A clone of this client whose calls are aborted when `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            config: Arc::clone(&self.config),
            http: self.http.clone(),
            cancel: token,
        }
    }

    /// Render `template` for this client's base URL and subscription.
    pub fn url(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<String> {
        template.render(&self.config.base_url, &self.config.subscription, ids)
    }

    /// Render an account-level `template`.
    ///
    /// `{0}` and `{1}` are filled with the customer and subscription ids from
    /// [`subscription_info`](Self::subscription_info); `ids` fill the rest.
    /// The slot count is checked before anything is fetched.
    pub async fn account_url(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<String> {
        let lead = Scope::Account.leading_slots();
        let slots = template.slots()?;
        if slots < lead || slots - lead != ids.len() {
            return Err(MkioError::ContractViolation(format!(
                "account template `{template}` takes {} id(s), got {}",
                slots.saturating_sub(lead),
                ids.len()
            )));
        }

        let info = self.subscription_info().await?;
        let mut values = Vec::with_capacity(slots);
        values.push(info.customer_id.as_str());
        values.push(info.subscription_id.as_str());
        values.extend_from_slice(ids);
        template.render_slots(&self.config.base_url, &values)
    }

    /// Render `template` for `scope`.
    pub async fn scoped_url(
        &self,
        scope: Scope,
        template: &EndpointTemplate,
        ids: &[&str],
    ) -> Result<String> {
        match scope {
            Scope::Subscription => self.url(template, ids),
            Scope::Account => self.account_url(template, ids).await,
        }
    }

    /// The user the API token was issued to.
    pub async fn user_profile(&self) -> Result<UserProfile> {
        let url = paths::USER_PROFILE.render_slots(&self.config.base_url, &[])?;
        self.get_url(&url).await
    }

    /// Every subscription of the token's customer.
    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        let profile = self.user_profile().await?;
        self.subscriptions_of(&profile.spec.customer_id).await
    }

    /// Customer and subscription ids of the configured subscription.
    ///
    /// Looked up once per client and shared by its clones. Returns
    /// [`MkioError::Config`] if the token cannot see the subscription.
    pub async fn subscription_info(&self) -> Result<SubscriptionInfo> {
        let info = self
            .config
            .account
            .get_or_try_init(|| self.fetch_subscription_info())
            .await?;
        Ok(info.clone())
    }

    /// Fetch a single resource.
    pub async fn get<T: DeserializeOwned>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
    ) -> Result<T> {
        let url = self.url(template, ids)?;
        self.get_url(&url).await
    }

    /// Create or replace a resource with `PUT`.
    ///
    /// If the service answers `202 Accepted` this waits for the operation to
    /// reach a terminal status before returning. The returned resource is the
    /// one carried by the original response.
    pub async fn create_or_update<T, P>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        payload: &P,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.url(template, ids)?;
        self.put_url(&url, payload).await
    }

    /// Submit `payload` with `POST`, waiting on `202 Accepted` like
    /// [`create_or_update`](Self::create_or_update).
    pub async fn post<T, P>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        payload: &P,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.url(template, ids)?;
        let body = serde_json::to_string(payload)?;
        self.write(Method::POST, &url, Some(body)).await
    }

    /// Invoke a body-less `POST` action such as `listStreamingLocators`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
    ) -> Result<T> {
        let url = self.url(template, ids)?;
        self.write(Method::POST, &url, None).await
    }

    /// Delete a resource. No response body is expected.
    pub async fn delete(&self, template: &EndpointTemplate, ids: &[&str]) -> Result<()> {
        let url = self.url(template, ids)?;
        self.delete_url(&url).await
    }

    /// Fetch the first page of a collection.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Page<T>> {
        let url = self.url(template, ids)?;
        self.list_page_url(&url, opts).await
    }

    /// Fetch the page `cursor` points to.
    pub async fn next_page<T: DeserializeOwned>(&self, cursor: Cursor) -> Result<Page<T>> {
        let url = resolve_link(&self.config.base_url, cursor.as_str());
        self.fetch_page(&url).await
    }

    /// Items of the first page of a collection.
    pub async fn list<T: DeserializeOwned>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Vec<T>> {
        Ok(self.list_page(template, ids, opts).await?.items)
    }

    /// Items of every page of a collection, in server order.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        template: &EndpointTemplate,
        ids: &[&str],
        opts: &ListOptions,
    ) -> Result<Vec<T>> {
        let first = self.list_page(template, ids, opts).await?;
        self.collect_pages(first).await
    }

    // -----------------------------------------------------------------------
    // Rendered-URL verbs, shared with `Resource`
    // -----------------------------------------------------------------------

    pub(crate) async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let raw = self.send(Method::GET, url, None, Expect::Payload).await?;
        Ok(serde_json::from_str(&raw.body)?)
    }

    pub(crate) async fn put_url<T, P>(&self, url: &str, payload: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_string(payload)?;
        self.write(Method::PUT, url, Some(body)).await
    }

    pub(crate) async fn delete_url(&self, url: &str) -> Result<()> {
        self.send(Method::DELETE, url, None, Expect::Nothing).await?;
        Ok(())
    }

    pub(crate) async fn list_page_url<T: DeserializeOwned>(
        &self,
        url: &str,
        opts: &ListOptions,
    ) -> Result<Page<T>> {
        let url = add_query_param(url, "$orderby", opts.order_by.as_deref());
        let top = opts.top.map(|n| n.to_string());
        let url = add_query_param(&url, "$top", top.as_deref());
        self.fetch_page(&url).await
    }

    /// Drain `first` and every page after it.
    pub(crate) async fn collect_pages<T: DeserializeOwned>(
        &self,
        mut page: Page<T>,
    ) -> Result<Vec<T>> {
        let mut items = std::mem::take(&mut page.items);
        while let Some(cursor) = page.next.take() {
            page = self.next_page(cursor).await?;
            items.append(&mut page.items);
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn fetch_subscription_info(&self) -> Result<SubscriptionInfo> {
        let profile = self.user_profile().await?;
        let customer_id = profile.spec.customer_id;
        let subscription = self
            .subscriptions_of(&customer_id)
            .await?
            .into_iter()
            .find(|s| s.spec.name == self.config.subscription)
            .ok_or_else(|| {
                MkioError::Config(format!(
                    "subscription `{}` is not visible to this token",
                    self.config.subscription
                ))
            })?;

        debug!(%customer_id, subscription_id = %subscription.metadata.id, "resolved subscription");
        Ok(SubscriptionInfo {
            customer_id,
            subscription_id: subscription.metadata.id,
        })
    }

    async fn subscriptions_of(&self, customer_id: &str) -> Result<Vec<Subscription>> {
        let url = paths::SUBSCRIPTIONS.render_slots(&self.config.base_url, &[customer_id])?;
        let first = self.list_page_url(&url, &ListOptions::default()).await?;
        self.collect_pages(first).await
    }

    async fn fetch_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>> {
        let raw = self.send(Method::GET, url, None, Expect::Payload).await?;
        let envelope: ListEnvelope<T> = serde_json::from_str(&raw.body)?;

        let next = envelope
            .next_link
            .filter(|link| !link.is_empty())
            .map(|link| match urlencoding::decode(&link) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => link,
            })
            .map(Cursor::new);

        debug!(items = envelope.value.len(), has_more = next.is_some(), "fetched page");
        Ok(Page {
            items: envelope.value,
            next,
        })
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<T> {
        let raw = self.send(method, url, body, Expect::Payload).await?;

        if raw.status == 202 {
            match OperationHandle::from_headers(&self.config.base_url, &raw.headers) {
                Some(handle) => {
                    let status = self.poll(handle).await?;
                    if status != OperationStatus::Succeeded {
                        warn!(url, ?status, "long-running operation did not succeed");
                    }
                }
                None => warn!(url, "202 response without a monitor URL, not waiting"),
            }
        }

        Ok(serde_json::from_str(&raw.body)?)
    }

    /// Poll the operation monitor until it reports a terminal status.
    #[instrument(skip(self, handle), fields(monitor = %handle.monitor_url))]
    async fn poll(&self, mut handle: OperationHandle) -> Result<OperationStatus> {
        let policy = self.config.poll_policy;
        let started = Instant::now();
        let mut attempts: u32 = 0;

        while !handle.status.is_terminal() {
            if policy.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(MkioError::PollTimeout(started.elapsed()));
            }
            if let Some(limit) = policy.timeout {
                if started.elapsed() >= limit {
                    return Err(MkioError::PollTimeout(limit));
                }
            }

            // Never sleep past the deadline, however large the server's hint.
            let interval = match policy.timeout {
                Some(limit) => handle.poll_interval.min(limit.saturating_sub(started.elapsed())),
                None => handle.poll_interval,
            };
            self.cancellable(async {
                tokio::time::sleep(interval).await;
                Ok::<(), MkioError>(())
            })
            .await?;

            let raw = self
                .send(Method::GET, &handle.monitor_url, None, Expect::Payload)
                .await?;
            let monitor: MonitorBody = serde_json::from_str(&raw.body)?;
            handle.status = monitor.status();
            attempts += 1;

            debug!(attempts, status = ?handle.status, "polled long-running operation");
        }

        Ok(handle.status)
    }

    /// Issue one request and classify the response.
    ///
    /// Transport failures are not retried.
    #[instrument(skip(self, body, expect), fields(status))]
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        expect: Expect,
    ) -> Result<RawResponse> {
        let mut req = self
            .http
            .request(method, url)
            .header(TOKEN_HEADER, self.config.token.clone())
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }

        let raw = self
            .cancellable(async {
                let response = req.send().await?;
                let status = response.status().as_u16();
                let headers = response.headers().clone();
                // Read the body even on failure; the classifier needs it.
                let body = response.text().await?;
                Ok::<_, MkioError>(RawResponse {
                    status,
                    headers,
                    body,
                })
            })
            .await?;

        tracing::Span::current().record("status", raw.status);
        debug!(status = raw.status, bytes = raw.body.len(), "received response");

        classify(raw.status, &raw.body, expect)?;
        Ok(raw)
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(MkioError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_token_and_subscription() {
        let err = ClientBuilder::new()
            .subscription("sub")
            .token("bad\ntoken")
            .build()
            .unwrap_err();
        assert!(matches!(err, MkioError::Config(_)));

        let err = ClientBuilder::new().token("t").subscription("").build().unwrap_err();
        assert!(matches!(err, MkioError::Config(_)));
    }

    #[test]
    fn url_uses_configured_base_and_subscription() {
        let client = ClientBuilder::new()
            .subscription("sub1")
            .token("t")
            .base_url("https://host/")
            .build()
            .unwrap();

        let url = client
            .url(&EndpointTemplate::new("api/res/{0}/items/{1}"), &["itemA"])
            .unwrap();
        assert_eq!(url, "https://host/api/res/sub1/items/itemA");
        assert_eq!(client.base_url(), "https://host/");
        assert_eq!(client.subscription(), "sub1");
    }

    #[test]
    fn default_base_url() {
        let client = Client::new("sub", "t").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn with_cancellation_swaps_only_the_token() {
        let client = Client::new("sub", "t").unwrap();
        let token = CancellationToken::new();
        let scoped = client.with_cancellation(token.clone());
        token.cancel();
        assert!(scoped.cancellation_token().is_cancelled());
        assert!(!client.cancellation_token().is_cancelled());
        assert_eq!(scoped.subscription(), "sub");
    }
}
