//! Blocking surface tests: plain threads and calls made from inside a runtime.

mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mkio::{ClientBuilder, EndpointTemplate, GenericResource, ListOptions, MkioError};

fn blocking_client(server: &MockServer) -> mkio::blocking::Client {
    mkio::blocking::Client::from_builder(
        ClientBuilder::new()
            .subscription(SUBSCRIPTION)
            .token(TOKEN)
            .base_url(base_url(server)),
    )
    .unwrap()
}

async fn mount_asset(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/ams/sub1/assets/a1"))
        .and(header("x-mkio-token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset_json("a1")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ams/sub1/assets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"detail": "gone"}})))
        .mount(server)
        .await;
}

#[test]
fn blocking_calls_from_a_plain_thread() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_asset(&server).await;
        server
    });

    let client = blocking_client(&server);
    let asset = client.assets().get(&["a1"]).unwrap();
    assert_eq!(asset.name.as_deref(), Some("a1"));

    let raw: GenericResource = client
        .get(&EndpointTemplate::new("api/ams/{0}/assets/{1}"), &["a1"])
        .unwrap();
    assert_eq!(raw.name.as_deref(), Some("a1"));
}

#[tokio::test]
async fn blocking_calls_from_inside_a_runtime() {
    let server = MockServer::start().await;
    mount_asset(&server).await;

    let client = blocking_client(&server);
    let asset = client.assets().get(&["a1"]).unwrap();
    assert_eq!(asset.properties.container.as_deref(), Some("asset-a1"));
    drop(client);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_errors_match_async_errors() {
    let server = MockServer::start().await;
    mount_asset(&server).await;

    let async_err = client_for(&server).assets().get(&["missing"]).await.unwrap_err();
    let blocking_err = blocking_client(&server).assets().get(&["missing"]).unwrap_err();

    assert!(matches!(blocking_err, MkioError::NotFound { .. }));
    assert_eq!(blocking_err.detail(), async_err.detail());
    assert_eq!(blocking_err.to_string(), async_err.to_string());
}

#[test]
fn blocking_contract_violation_is_local() {
    // No server: a slot mismatch must fail before any request is attempted.
    let client = mkio::blocking::Client::from_builder(
        ClientBuilder::new()
            .subscription(SUBSCRIPTION)
            .token(TOKEN)
            .base_url("http://127.0.0.1:9/"),
    )
    .unwrap();

    let err = client.jobs().get(&["transform-only"]).unwrap_err();
    assert!(matches!(err, MkioError::ContractViolation(_)));

    let err = client
        .list::<GenericResource>(&mkio::paths::JOBS.collection, &[], &ListOptions::default())
        .unwrap_err();
    assert!(matches!(err, MkioError::ContractViolation(_)));
}

#[test]
fn blocking_call_is_cancellable_from_another_thread() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ams/sub1/assets/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(asset_json("slow"))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;
        server
    });

    let client = blocking_client(&server);
    let token = client.cancellation_token().clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        token.cancel();
    });

    let err = client.assets().get(&["slow"]).unwrap_err();
    assert!(matches!(err, MkioError::Cancelled));
    canceller.join().unwrap();
}

#[test]
fn blocking_storage_accounts_resolve_account_ids() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"spec": {"customerId": "cust-1"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/accounts/cust-1/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"metadata": {"id": "sub-guid"}, "spec": {"name": SUBSCRIPTION}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/accounts/cust-1/subscriptions/sub-guid/storage/st-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        server
    });

    let client = blocking_client(&server);
    client.storage_accounts().delete(&["st-1"]).unwrap();
    assert_eq!(client.subscription_info().unwrap().subscription_id, "sub-guid");
}
