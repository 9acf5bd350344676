use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Opaque link to the next page of a list result.
///
/// Consumed by value by exactly one [`Client::next_page`](crate::Client::next_page)
/// call. Do not hold on to it across changes to the underlying collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub(crate) fn new(link: String) -> Self {
        Self(link)
    }

    /// The URL-decoded link, absolute or relative to the base URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a list result.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Pass to `next_page` for the following page. `None` means this was the last one.
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    /// `true` if `next` is `Some`.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Optional OData query options for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `$orderby`, e.g. `"properties/created desc"`.
    pub order_by: Option<String>,
    /// `$top`: upper bound on the number of items returned.
    pub top: Option<u32>,
}

impl ListOptions {
    pub fn order_by(mut self, key: impl Into<String>) -> Self {
        self.order_by = Some(key.into());
        self
    }

    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }
}

/// List response envelope: `{ "value": [...], "@odata.nextLink": ... }`.
///
/// Account endpoints name the array `items` instead.
#[derive(Deserialize)]
pub(crate) struct ListEnvelope<T> {
    #[serde(default = "Vec::new", alias = "items")]
    pub value: Vec<T>,
    #[serde(default, rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Server-maintained metadata present on most resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// A storage-backed media asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub properties: AssetProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProperties {
    /// Blob container holding the asset's files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Asset {
    /// Payload for creating an asset in `container` on `storage_account`.
    pub fn new(
        name: impl Into<String>,
        container: impl Into<String>,
        storage_account: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            properties: AssetProperties {
                container: Some(container.into()),
                storage_account_name: Some(storage_account.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// A recipe of encoding outputs applied by jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: TransformProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub outputs: Vec<TransformOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub preset: Preset,
    /// "StopProcessingJob" or "ContinueJob".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
    /// "Low", "Normal" or "High".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_priority: Option<String>,
}

/// Encoder preset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_name: Option<String>,
}

impl Preset {
    const BUILT_IN: &'static str = "#Microsoft.Media.BuiltInStandardEncoderPreset";

    /// One of the service's built-in encoder presets, see [`encoder_presets`].
    pub fn built_in(name: impl Into<String>) -> Self {
        Self {
            odata_type: Self::BUILT_IN.to_string(),
            preset_name: Some(name.into()),
        }
    }
}

/// Names of the built-in encoder presets.
pub mod encoder_presets {
    pub const H264_SINGLE_BITRATE_SD: &str = "H264SingleBitrateSD";
    pub const H264_SINGLE_BITRATE_720P: &str = "H264SingleBitrate720p";
    pub const H264_SINGLE_BITRATE_1080P: &str = "H264SingleBitrate1080p";
    pub const H264_MULTIPLE_BITRATE_SD: &str = "H264MultipleBitrateSD";
    pub const H264_MULTIPLE_BITRATE_720P: &str = "H264MultipleBitrate720p";
    pub const H264_MULTIPLE_BITRATE_1080P: &str = "H264MultipleBitrate1080p";
    pub const H265_SINGLE_BITRATE_1080P: &str = "H265SingleBitrate1080p";
    pub const H265_SINGLE_BITRATE_4K: &str = "H265SingleBitrate4K";
}

/// A live event's recording into an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: LiveOutputProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOutputProperties {
    pub asset_name: String,
    /// ISO 8601 duration, e.g. "PT30M".
    pub archive_window_length: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_state: Option<String>,
}

/// A generic resource for endpoints without a dedicated model.
///
/// Keeps every field of the response so nothing is lost on a read-modify-write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub properties: serde_json::Value,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Identity and timestamps of an account-level object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// The user the API token was issued to.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    pub spec: UserProfileSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileSpec {
    pub customer_id: String,
    #[serde(default)]
    pub active_subscription_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A media services subscription of a customer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Subscription {
    pub metadata: AccountMetadata,
    pub spec: SubscriptionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    /// The name used in media services paths.
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Ids that fill the leading slots of account paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub customer_id: String,
    pub subscription_id: String,
}

/// An Azure storage account attached to the subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccount {
    /// Assigned by the service; leave unset when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AccountMetadata>,
    pub spec: StorageAccountSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_storage_configuration: Option<AzureStorageConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureStorageConfiguration {
    pub url: String,
    /// Write-only; never returned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
}
