//! Request authenticators
//!
//! An [`Authenticator`] adds the headers a scheme requires to a
//! [`PendingRequest`] just before it is sent. The dispatcher only depends on
//! the trait, so callers can plug in their own scheme.

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::credentials::LegacyCredentials;
use crate::error::{AuthError, AuthResult};
use crate::request::PendingRequest;
use crate::token::CloudCredentials;

/// Header carrying the legacy API key
pub const ACCESS_KEY_HEADER: &str = "cb-access-key";
/// Header carrying the legacy request timestamp (unix seconds)
pub const ACCESS_TIMESTAMP_HEADER: &str = "cb-access-timestamp";
/// Header carrying the legacy HMAC signature
pub const ACCESS_SIGN_HEADER: &str = "cb-access-sign";

/// Adds authentication to an outbound request
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Authenticate `request` as of `now`
    ///
    /// On error the request must not be sent.
    fn authenticate(&self, request: &mut PendingRequest, now: SystemTime) -> AuthResult<()>;
}

/// Sends requests without credentials
///
/// Private endpoints will be rejected by the server with a 401.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unauthenticated;

impl Authenticator for Unauthenticated {
    fn authenticate(&self, _request: &mut PendingRequest, _now: SystemTime) -> AuthResult<()> {
        Ok(())
    }
}

/// Signs requests with a legacy API key and secret
#[derive(Debug, Clone)]
pub struct LegacyAuthenticator {
    credentials: LegacyCredentials,
}

impl LegacyAuthenticator {
    pub fn new(credentials: LegacyCredentials) -> Self {
        Self { credentials }
    }
}

impl Authenticator for LegacyAuthenticator {
    fn authenticate(&self, request: &mut PendingRequest, now: SystemTime) -> AuthResult<()> {
        let timestamp = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Signing("system clock is before the unix epoch".to_string()))?
            .as_secs();

        let signature = self.credentials.sign(
            request.method().as_str(),
            request.path(),
            request.body().unwrap_or_default(),
            timestamp,
        );

        trace!(timestamp, path = request.path(), "Signed legacy request");

        request.set_header(
            HeaderName::from_static(ACCESS_KEY_HEADER),
            header_value(self.credentials.api_key())?,
        );
        request.set_header(
            HeaderName::from_static(ACCESS_TIMESTAMP_HEADER),
            HeaderValue::from(timestamp),
        );
        request.set_header(
            HeaderName::from_static(ACCESS_SIGN_HEADER),
            header_value(&signature)?,
        );

        Ok(())
    }
}

/// Authorizes requests with a per-request signed bearer token
#[derive(Debug, Clone)]
pub struct CloudAuthenticator {
    credentials: CloudCredentials,
}

impl CloudAuthenticator {
    pub fn new(credentials: CloudCredentials) -> Self {
        Self { credentials }
    }
}

impl Authenticator for CloudAuthenticator {
    fn authenticate(&self, request: &mut PendingRequest, now: SystemTime) -> AuthResult<()> {
        let token = self.credentials.sign_token(
            request.method().as_str(),
            &request.host(),
            request.path(),
            now,
        )?;

        let mut value = header_value(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        request.set_header(AUTHORIZATION, value);

        Ok(())
    }
}

fn header_value(value: &str) -> AuthResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AuthError::Signing(format!("invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::compute_hmac_signature;
    use crate::token::{inspect_token, tests::TEST_SEC1_PEM};
    use reqwest::{Method, Url};
    use std::time::Duration;

    fn request(method: Method, url: &str) -> PendingRequest {
        PendingRequest::new(method, Url::parse(url).unwrap())
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_unauthenticated_is_noop() {
        let mut req = request(Method::GET, "https://api.coinbase.com/api/v3/brokerage/time");
        Unauthenticated.authenticate(&mut req, SystemTime::now()).unwrap();
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_legacy_headers() {
        let auth = LegacyAuthenticator::new(LegacyCredentials::new("K", "S").unwrap());
        let mut req = request(Method::GET, "https://api.example.com/accounts/123");

        auth.authenticate(&mut req, at(1_700_000_000)).unwrap();

        let headers = req.headers();
        assert_eq!(headers["CB-ACCESS-KEY"], "K");
        assert_eq!(headers["CB-ACCESS-TIMESTAMP"], "1700000000");
        assert_eq!(
            headers["CB-ACCESS-SIGN"],
            "8ded46e918e51ebe7955ffd637afd6f7540a76d62ea1427f42150bc282a64aa3"
        );
    }

    #[test]
    fn test_legacy_signs_path_without_query() {
        let auth = LegacyAuthenticator::new(LegacyCredentials::new("K", "S").unwrap());
        let mut req = request(
            Method::GET,
            "https://api.coinbase.com/api/v3/brokerage/accounts?limit=10&cursor=abc",
        );

        auth.authenticate(&mut req, at(1_700_000_000)).unwrap();

        let expected =
            compute_hmac_signature(b"S", "GET", "/api/v3/brokerage/accounts", b"", 1_700_000_000);
        assert_eq!(req.headers()["CB-ACCESS-SIGN"], expected.as_str());
    }

    #[test]
    fn test_legacy_leaves_body_intact() {
        let body = br#"{"client_order_id":"abc","product_id":"BTC-USD"}"#.to_vec();
        let auth = LegacyAuthenticator::new(LegacyCredentials::new("K", "S").unwrap());
        let mut req = request(Method::POST, "https://api.coinbase.com/api/v3/brokerage/orders")
            .with_body(body.clone());

        auth.authenticate(&mut req, at(1_700_000_000)).unwrap();

        assert_eq!(req.body(), Some(body.as_slice()));
        let expected = compute_hmac_signature(
            b"S",
            "POST",
            "/api/v3/brokerage/orders",
            &body,
            1_700_000_000,
        );
        assert_eq!(req.headers()["CB-ACCESS-SIGN"], expected.as_str());
    }

    #[test]
    fn test_legacy_timestamp_matches_signature() {
        let auth = LegacyAuthenticator::new(LegacyCredentials::new("K", "S").unwrap());
        let mut req = request(Method::DELETE, "https://api.coinbase.com/api/v3/brokerage/cfm/sweeps");

        auth.authenticate(&mut req, SystemTime::now()).unwrap();

        let timestamp: u64 = req.headers()["CB-ACCESS-TIMESTAMP"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        let expected =
            compute_hmac_signature(b"S", "DELETE", "/api/v3/brokerage/cfm/sweeps", b"", timestamp);
        assert_eq!(req.headers()["CB-ACCESS-SIGN"], expected.as_str());
    }

    #[test]
    fn test_cloud_sets_bearer_token() {
        let creds = CloudCredentials::new("organizations/o/apiKeys/k", TEST_SEC1_PEM).unwrap();
        let auth = CloudAuthenticator::new(creds);
        let mut req = request(
            Method::GET,
            "https://api.coinbase.com/api/v3/brokerage/orders/historical/batch?limit=5",
        );

        auth.authenticate(&mut req, SystemTime::now()).unwrap();

        let value = req.headers()[AUTHORIZATION].to_str().unwrap();
        let token = value.strip_prefix("Bearer ").unwrap();
        let (header, claims) = inspect_token(token).unwrap();
        assert_eq!(header.kid, "organizations/o/apiKeys/k");
        assert_eq!(
            claims.uri,
            "GET api.coinbase.com/api/v3/brokerage/orders/historical/batch"
        );
        assert!(req.headers().get(ACCESS_SIGN_HEADER).is_none());
    }

    #[test]
    fn test_custom_authenticator_as_trait_object() {
        #[derive(Debug)]
        struct StaticHeader;

        impl Authenticator for StaticHeader {
            fn authenticate(&self, request: &mut PendingRequest, _now: SystemTime) -> AuthResult<()> {
                request.set_header(
                    HeaderName::from_static("x-custom"),
                    HeaderValue::from_static("yes"),
                );
                Ok(())
            }
        }

        let auth: Box<dyn Authenticator> = Box::new(StaticHeader);
        let mut req = request(Method::GET, "https://api.coinbase.com/api/v3/brokerage/time");
        auth.authenticate(&mut req, SystemTime::now()).unwrap();
        assert_eq!(req.headers()["x-custom"], "yes");
    }
}
