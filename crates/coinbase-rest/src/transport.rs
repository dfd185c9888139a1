//! HTTP transport abstraction
//!
//! The dispatcher hands fully authenticated requests to an [`HttpTransport`]
//! and gets back the status and the complete body. Swapping the transport
//! lets tests run the dispatcher without a network.

use async_trait::async_trait;
use coinbase_auth::PendingRequest;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Boxed underlying cause of a transport failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// The caller's cancellation token fired before the response arrived
    #[error("request cancelled")]
    Cancelled,

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    /// Could not connect to the server
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    /// Any other failure while sending the request
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl TransportError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Box::new(err))
        } else if err.is_connect() {
            Self::Connect(Box::new(err))
        } else {
            Self::Request(err)
        }
    }

    fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Box::new(err))
        } else {
            Self::Body(err)
        }
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// Complete response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Executes authenticated requests
///
/// Implementations must read the whole response body before returning so
/// the underlying connection can go back to its pool.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Send the request and read the full response
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::Request)?;

        Ok(Self { client })
    }

    /// Wrap an existing client, sharing its connection pool
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, TransportError> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status();

        // Always drain the body, even for error statuses
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_body)?;

        debug!(status = %status, len = body.len(), "Received response");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Mock transport for testing
///
/// Replays queued responses in order and records every request it receives.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<HttpResponse, TransportError>>>,
    requests: parking_lot::Mutex<Vec<PendingRequest>>,
    delay: Option<Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, body.into().into_bytes())));
    }

    /// Queue a 200 response
    pub fn push_ok(&self, body: impl Into<String>) {
        self.push_response(200, body);
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// All requests sent so far
    pub fn requests(&self) -> Vec<PendingRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<PendingRequest> {
        self.requests.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no mock response queued".into())))
    }
}
