//! # MK.IO SDK for Rust
//!
//! Client for the [MK.IO](https://io.mediakind.com) media services REST API.
//! Manage assets, transforms, jobs, live events and outputs, streaming
//! locators and endpoints, content key policies, subscriptions and storage
//! accounts with idiomatic async Rust, or through the [`blocking`] wrappers.
//!
//! Every resource type goes through the same engine: an [`EndpointTemplate`]
//! is rendered with the subscription name (or, for account paths, the
//! customer and subscription ids) and object ids, the request is sent
//! with the `x-mkio-token` header, the response is classified into
//! [`MkioError`] variants, `202 Accepted` writes are polled to completion, and
//! list results expose a [`Cursor`] to the next page.
//!
//! ## Quick start
//!
//! ```no_run
//! use mkio::{Asset, Client, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> mkio::Result<()> {
//!     let client = Client::new("my-subscription", "my-token")?;
//!
//!     let asset = Asset::new("interview", "asset-interview", "mystorage");
//!     client.assets().create_or_update(&["interview"], &asset).await?;
//!
//!     let opts = ListOptions::default().order_by("name").top(50);
//!     for asset in client.assets().list_all(&[], &opts).await? {
//!         println!("{:?}", asset.name);
//!     }
//!
//!     // Nested resources take every id in slot order.
//!     client.live_outputs().delete(&["my-event", "my-output"]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use mkio::{ClientBuilder, PollPolicy};
//! use std::time::Duration;
//!
//! # fn example() -> mkio::Result<()> {
//! let client = ClientBuilder::new()
//!     .subscription("my-subscription")
//!     .token("my-token")
//!     .base_url("https://api.io.mediakind.com/")
//!     .timeout(Duration::from_secs(120))
//!     .poll_policy(PollPolicy::unbounded().max_attempts(600))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod client;
mod errors;
mod models;
mod operation;
pub mod paths;
mod resource;
mod url;

pub use client::{Client, ClientBuilder, TOKEN_HEADER};
pub use errors::{MkioError, Result, MAX_ERROR_BODY_CHARS};
pub use models::{
    encoder_presets, AccountMetadata, Asset, AssetProperties, AzureStorageConfiguration, Cursor,
    GenericResource, ListOptions, LiveOutput, LiveOutputProperties, Page, Preset, StorageAccount,
    StorageAccountSpec, Subscription, SubscriptionInfo, SubscriptionSpec, SystemData, Transform,
    TransformOutput, TransformProperties, UserProfile, UserProfileSpec,
};
pub use operation::{OperationHandle, OperationStatus, PollPolicy};
pub use paths::{ResourcePath, Scope};
pub use resource::Resource;
pub use url::{add_query_param, EndpointTemplate};

// Re-export for convenience.
pub use tokio_util::sync::CancellationToken;
