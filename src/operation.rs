//! Long-running operation tracking.
//!
//! A write answered with `202 Accepted` is still running on the service. The
//! response names a monitor URL (`Azure-AsyncOperation`) and a poll hint in
//! seconds (`Retry-After`); the client polls the monitor until its `status`
//! leaves `InProgress`.

use std::time::Duration;

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use serde::Deserialize;

use crate::url::resolve_link;

pub(crate) const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// State reported by an operation monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    /// Any other terminal value, kept verbatim.
    Unknown(String),
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        *self != OperationStatus::InProgress
    }
}

impl From<&str> for OperationStatus {
    fn from(s: &str) -> Self {
        match s {
            "InProgress" => OperationStatus::InProgress,
            "Succeeded" => OperationStatus::Succeeded,
            "Failed" => OperationStatus::Failed,
            other => OperationStatus::Unknown(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct MonitorBody {
    #[serde(default)]
    status: Option<String>,
}

impl MonitorBody {
    pub(crate) fn status(&self) -> OperationStatus {
        OperationStatus::from(self.status.as_deref().unwrap_or(""))
    }
}

/// An accepted write that is still running.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    pub monitor_url: String,
    pub poll_interval: Duration,
    pub status: OperationStatus,
}

impl OperationHandle {
    /// Build a handle from a 202 response's headers.
    ///
    /// Returns `None` when the response names no monitor URL.
    pub(crate) fn from_headers(base_url: &str, headers: &HeaderMap) -> Option<Self> {
        let monitor = headers
            .get(ASYNC_OPERATION_HEADER)
            .or_else(|| headers.get(LOCATION))
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())?;

        let poll_interval = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Some(Self {
            monitor_url: resolve_link(base_url, monitor),
            poll_interval,
            status: OperationStatus::InProgress,
        })
    }
}

/// Ceiling for long-running operation polling.
///
/// The default polls until the operation reaches a terminal status, however
/// long that takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollPolicy {
    /// Give up after this many monitor requests.
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since the write was accepted.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Poll until terminal, without limits.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn handle_reads_monitor_and_retry_hint() {
        let mut headers = HeaderMap::new();
        headers.insert(
            ASYNC_OPERATION_HEADER,
            HeaderValue::from_static("https://host/api/operations/1"),
        );
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));

        let handle = OperationHandle::from_headers("https://host/", &headers).unwrap();
        assert_eq!(handle.monitor_url, "https://host/api/operations/1");
        assert_eq!(handle.poll_interval, Duration::from_millis(3000));
        assert_eq!(handle.status, OperationStatus::InProgress);
    }

    #[test]
    fn relative_monitor_and_missing_hint() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/api/operations/2"));

        let handle = OperationHandle::from_headers("https://host/", &headers).unwrap();
        assert_eq!(handle.monitor_url, "https://host/api/operations/2");
        assert_eq!(handle.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn oversized_retry_hint_does_not_overflow() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/api/operations/3"));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709551615"));

        let handle = OperationHandle::from_headers("https://host/", &headers).unwrap();
        assert_eq!(handle.poll_interval, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn relative_monitor_keeps_base_path() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("api/operations/4"));

        let handle = OperationHandle::from_headers("https://host/prefix/", &headers).unwrap();
        assert_eq!(handle.monitor_url, "https://host/prefix/api/operations/4");
    }

    #[test]
    fn no_monitor_header_means_no_handle() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("1"));
        assert!(OperationHandle::from_headers("https://host/", &headers).is_none());
    }

    #[test]
    fn status_strings() {
        assert_eq!(OperationStatus::from("InProgress"), OperationStatus::InProgress);
        assert_eq!(OperationStatus::from("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::from("Failed"), OperationStatus::Failed);
        assert_eq!(
            OperationStatus::from("Canceled"),
            OperationStatus::Unknown("Canceled".into())
        );
        assert!(!OperationStatus::InProgress.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
    }
}
