//! Outbound request description shared by authenticators and transports

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

/// An HTTP request that has not yet been authenticated or sent
///
/// The body is an owned byte buffer, so signing can read it without
/// consuming it and the transport still sends the exact same bytes.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl PendingRequest {
    /// Create a request without a body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Attach a body to the request
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute URL, including the query string
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL path without host or query string
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Host of the URL, with the port appended when one is explicit
    pub fn host(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Raw body bytes, if any
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Headers set so far
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing any previous value
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Split the request into its parts for the transport
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Vec<u8>>) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_excludes_query() {
        let url = Url::parse("https://api.coinbase.com/api/v3/brokerage/accounts?limit=5").unwrap();
        let request = PendingRequest::new(Method::GET, url);
        assert_eq!(request.path(), "/api/v3/brokerage/accounts");
        assert_eq!(request.host(), "api.coinbase.com");
    }

    #[test]
    fn test_host_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8080/api/v3/brokerage/time").unwrap();
        let request = PendingRequest::new(Method::GET, url);
        assert_eq!(request.host(), "127.0.0.1:8080");
    }

    #[test]
    fn test_body_round_trip() {
        let url = Url::parse("https://api.coinbase.com/api/v3/brokerage/orders").unwrap();
        let request = PendingRequest::new(Method::POST, url).with_body(br#"{"a":1}"#.to_vec());
        assert_eq!(request.body(), Some(&br#"{"a":1}"#[..]));

        let (method, _, _, body) = request.into_parts();
        assert_eq!(method, Method::POST);
        assert_eq!(body.as_deref(), Some(&br#"{"a":1}"#[..]));
    }
}
