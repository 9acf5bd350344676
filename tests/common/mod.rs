//! Shared helpers for the wiremock-backed tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const SUBSCRIPTION: &str = "sub1";
pub const TOKEN: &str = "test-token";

pub fn base_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

pub fn client_for(server: &MockServer) -> mkio::Client {
    mkio::ClientBuilder::new()
        .subscription(SUBSCRIPTION)
        .token(TOKEN)
        .base_url(base_url(server))
        .build()
        .unwrap()
}

/// A client whose base URL carries `prefix`, e.g. `/prefix/`.
pub fn client_at(server: &MockServer, prefix: &str) -> mkio::Client {
    mkio::ClientBuilder::new()
        .subscription(SUBSCRIPTION)
        .token(TOKEN)
        .base_url(format!("{}{prefix}", server.uri()))
        .build()
        .unwrap()
}

pub fn asset_json(name: &str) -> Value {
    json!({
        "name": name,
        "properties": {
            "container": format!("asset-{name}"),
            "storageAccountName": "storage1"
        }
    })
}

/// Monitor body with the given `status`.
pub fn monitor_json(status: &str) -> Value {
    json!({ "name": "op", "status": status })
}

/// Replays `bodies` in order, repeating the last one once exhausted.
pub struct Sequence {
    bodies: Vec<Value>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    pub fn new(bodies: Vec<Value>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                bodies,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self
            .bodies
            .get(idx)
            .or_else(|| self.bodies.last())
            .cloned()
            .unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(body)
    }
}
