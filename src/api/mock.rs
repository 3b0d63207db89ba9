//! Scripted transport for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{ApiClient, Transport};
use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub(crate) enum MockResponse {
    Json(Value),
    Status(u16),
    NetworkError,
    /// Never answers; only a timeout or cancellation ends the request.
    Hang,
    Delayed(Duration, Box<MockResponse>),
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, response: MockResponse) -> Self {
        self.routes.lock().insert(path.to_string(), response);
        self
    }

    pub fn with_json(self, path: &str, body: Value) -> Self {
        self.with(path, MockResponse::Json(body))
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.with(path, MockResponse::Status(status))
    }

    pub fn with_network_error(self, path: &str) -> Self {
        self.with(path, MockResponse::NetworkError)
    }

    pub fn with_hang(self, path: &str) -> Self {
        self.with(path, MockResponse::Hang)
    }

    pub fn with_delayed_json(self, path: &str, delay: Duration, body: Value) -> Self {
        self.with(
            path,
            MockResponse::Delayed(delay, Box::new(MockResponse::Json(body))),
        )
    }

    /// Paths requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Highest number of requests that were outstanding at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Requests that ran to completion (answered, not abandoned).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    async fn respond(response: MockResponse) -> Result<Value, ApiError> {
        let mut response = response;
        loop {
            match response {
                MockResponse::Json(body) => return Ok(body),
                MockResponse::Status(status) => {
                    return Err(ApiError::Status {
                        status,
                        message: format!("mock status {}", status),
                    })
                }
                MockResponse::NetworkError => {
                    return Err(ApiError::Network("connection refused".to_string()))
                }
                MockResponse::Hang => return std::future::pending().await,
                MockResponse::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
            }
        }
    }
}

/// Decrements the in-flight gauge even when the request future is dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.requests.lock().push(path.to_string());
        let response = self
            .routes
            .lock()
            .get(path)
            .cloned()
            .unwrap_or(MockResponse::Status(404));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(self.in_flight.clone());

        let result = Self::respond(response).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

pub(crate) fn client_with(mock: &MockTransport) -> ApiClient {
    ApiClient::new(Arc::new(mock.clone()), &ApiConfig::default())
}

pub(crate) fn client_with_timeout(mock: &MockTransport, timeout: Duration) -> ApiClient {
    let mut client = client_with(mock);
    client.timeout = timeout;
    client
}
