//! Endpoint templates for the MK.IO media services API.
//!
//! In media services paths `{0}` is the subscription name; in account paths
//! `{0}` is the customer id and `{1}` the subscription id. The remaining slots
//! are the ids named on each constant.

use crate::url::EndpointTemplate;

/// Which values fill the leading slots of a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// `{0}` is the configured subscription name.
    #[default]
    Subscription,
    /// `{0}` is the customer id and `{1}` the subscription id, both looked up
    /// from the service on first use.
    Account,
}

impl Scope {
    /// Slots filled by the client rather than the caller.
    pub fn leading_slots(self) -> usize {
        match self {
            Scope::Subscription => 1,
            Scope::Account => 2,
        }
    }
}

/// The collection and item templates of one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    pub collection: EndpointTemplate,
    pub item: EndpointTemplate,
    pub scope: Scope,
}

impl ResourcePath {
    pub const fn new(collection: &'static str, item: &'static str) -> Self {
        Self {
            collection: EndpointTemplate::new(collection),
            item: EndpointTemplate::new(item),
            scope: Scope::Subscription,
        }
    }

    /// A path under `api/accounts/{customer}/subscriptions/{subscription}`.
    pub const fn account(collection: &'static str, item: &'static str) -> Self {
        Self {
            collection: EndpointTemplate::new(collection),
            item: EndpointTemplate::new(item),
            scope: Scope::Account,
        }
    }
}

/// Profile of the token's user, including the customer id.
pub const USER_PROFILE: EndpointTemplate = EndpointTemplate::new("api/profile");

/// Subscriptions of a customer; `{0}` is the customer id.
pub const SUBSCRIPTIONS: EndpointTemplate = EndpointTemplate::new("api/accounts/{0}/subscriptions");

/// Storage accounts attached to the subscription; item id: storage account id.
pub const STORAGE_ACCOUNTS: ResourcePath = ResourcePath::account(
    "api/accounts/{0}/subscriptions/{1}/storage",
    "api/accounts/{0}/subscriptions/{1}/storage/{2}",
);

/// Assets; item id: asset name.
pub const ASSETS: ResourcePath = ResourcePath::new("api/ams/{0}/assets", "api/ams/{0}/assets/{1}");

/// `POST` action listing the streaming locators of an asset.
pub const ASSET_STREAMING_LOCATORS: EndpointTemplate =
    EndpointTemplate::new("api/ams/{0}/assets/{1}/listStreamingLocators");

/// Tracks and directory listing of an asset's storage container.
pub const ASSET_STORAGE: EndpointTemplate = EndpointTemplate::new("api/ams/{0}/assets/{1}/storage/");

/// Transforms; item id: transform name.
pub const TRANSFORMS: ResourcePath =
    ResourcePath::new("api/ams/{0}/transforms", "api/ams/{0}/transforms/{1}");

/// Jobs of a transform; ids: transform name, job name.
pub const JOBS: ResourcePath = ResourcePath::new(
    "api/ams/{0}/transforms/{1}/jobs",
    "api/ams/{0}/transforms/{1}/jobs/{2}",
);

/// Every job in the subscription, across transforms.
pub const ALL_JOBS: EndpointTemplate = EndpointTemplate::new("api/ams/{0}/jobs");

/// Live events; item id: live event name.
pub const LIVE_EVENTS: ResourcePath =
    ResourcePath::new("api/ams/{0}/liveEvents", "api/ams/{0}/liveEvents/{1}");

/// Live outputs of a live event; ids: live event name, live output name.
pub const LIVE_OUTPUTS: ResourcePath = ResourcePath::new(
    "api/ams/{0}/liveEvents/{1}/liveOutputs",
    "api/ams/{0}/liveEvents/{1}/liveOutputs/{2}",
);

/// Streaming locators; item id: locator name.
pub const STREAMING_LOCATORS: ResourcePath = ResourcePath::new(
    "api/ams/{0}/streamingLocators",
    "api/ams/{0}/streamingLocators/{1}",
);

/// Streaming endpoints; item id: endpoint name.
pub const STREAMING_ENDPOINTS: ResourcePath = ResourcePath::new(
    "api/ams/{0}/streamingEndpoints",
    "api/ams/{0}/streamingEndpoints/{1}",
);

/// Content key policies; item id: policy name.
pub const CONTENT_KEY_POLICIES: ResourcePath = ResourcePath::new(
    "api/ams/{0}/contentKeyPolicies",
    "api/ams/{0}/contentKeyPolicies/{1}",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_templates_take_one_more_id_than_collections() {
        let all = [
            ASSETS,
            TRANSFORMS,
            JOBS,
            LIVE_EVENTS,
            LIVE_OUTPUTS,
            STREAMING_LOCATORS,
            STREAMING_ENDPOINTS,
            CONTENT_KEY_POLICIES,
        ];
        for path in all {
            let collection = path.collection.id_slots().unwrap();
            let item = path.item.id_slots().unwrap();
            assert_eq!(item, collection + 1, "{}", path.item);
        }
        assert_eq!(ASSET_STREAMING_LOCATORS.id_slots().unwrap(), 1);
        assert_eq!(ASSET_STORAGE.id_slots().unwrap(), 1);
        assert_eq!(ALL_JOBS.id_slots().unwrap(), 0);
    }

    #[test]
    fn account_paths_reserve_two_leading_slots() {
        let path = STORAGE_ACCOUNTS;
        assert_eq!(path.scope, Scope::Account);
        let lead = path.scope.leading_slots();
        assert_eq!(path.collection.slots().unwrap(), lead);
        assert_eq!(path.item.slots().unwrap(), lead + 1);

        assert_eq!(USER_PROFILE.slots().unwrap(), 0);
        assert_eq!(SUBSCRIPTIONS.slots().unwrap(), 1);
        assert_eq!(ASSETS.scope, Scope::Subscription);
    }
}
