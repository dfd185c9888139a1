//! Legacy API key credentials
//!
//! Implements the `CB-ACCESS-SIGN` HMAC-SHA256 scheme used by legacy
//! Coinbase API keys.
//!
//! # Security
//!
//! The API secret is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use hmac::{Hmac, Mac};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretBox};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the legacy API key
pub const API_KEY_ENV: &str = "COINBASE_API_KEY";
/// Environment variable holding the legacy API secret
pub const API_SECRET_ENV: &str = "COINBASE_API_SECRET";

/// Compute the `CB-ACCESS-SIGN` value for a request
///
/// The signed message is `timestamp + METHOD + path + body`, where `path`
/// excludes host and query string and `body` is empty when the request has
/// none. The result is the lowercase hex HMAC-SHA256 of that message keyed by
/// `secret`.
///
/// The `timestamp` must be the exact value sent in `CB-ACCESS-TIMESTAMP`.
pub fn compute_hmac_signature(
    secret: &[u8],
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: u64,
) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(method.to_ascii_uppercase().as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);

    hex::encode(mac.finalize().into_bytes())
}

/// Legacy API key and secret
///
/// The secret is zeroized when the credentials are dropped.
pub struct LegacyCredentials {
    /// API key (public)
    api_key: String,
    /// Shared secret used as the HMAC key
    api_secret: SecretBox<Vec<u8>>,
}

impl LegacyCredentials {
    /// Create new credentials from an API key and secret
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] if either value is empty or
    /// the key cannot be sent as a header value.
    pub fn new(api_key: impl Into<String>, api_secret: impl AsRef<str>) -> AuthResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.as_ref();

        if api_key.is_empty() {
            return Err(AuthError::InvalidCredentials("API key is empty".to_string()));
        }
        if api_secret.is_empty() {
            return Err(AuthError::InvalidCredentials("API secret is empty".to_string()));
        }
        HeaderValue::from_str(&api_key).map_err(|e| {
            AuthError::InvalidCredentials(format!("API key is not a valid header value: {}", e))
        })?;

        Ok(Self {
            api_key,
            api_secret: SecretBox::new(Box::new(api_secret.as_bytes().to_vec())),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `COINBASE_API_KEY` and `COINBASE_API_SECRET` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let api_secret = std::env::var(API_SECRET_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_SECRET_ENV.to_string()))?;

        Self::new(api_key, api_secret)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request at the given unix timestamp (seconds)
    pub fn sign(&self, method: &str, path: &str, body: &[u8], timestamp: u64) -> String {
        compute_hmac_signature(self.api_secret.expose_secret(), method, path, body, timestamp)
    }
}

impl Clone for LegacyCredentials {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            api_secret: SecretBox::new(Box::new(self.api_secret.expose_secret().clone())),
        }
    }
}

impl std::fmt::Debug for LegacyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyCredentials")
            .field(
                "api_key",
                &format!("{}...", &self.api_key[..8.min(self.api_key.len())]),
            )
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signature() {
        let signature = compute_hmac_signature(b"S", "GET", "/accounts/123", b"", 1_700_000_000);
        assert_eq!(
            signature,
            "8ded46e918e51ebe7955ffd637afd6f7540a76d62ea1427f42150bc282a64aa3"
        );
    }

    #[test]
    fn test_signature_includes_body() {
        let signature = compute_hmac_signature(
            b"secret",
            "post",
            "/api/v3/brokerage/orders",
            br#"{"product_id":"BTC-USD"}"#,
            1_700_000_000,
        );
        assert_eq!(
            signature,
            "85450fb57cff2b0b806fc794acde2a85b8c7de00b9fac8b2a5c8025fb3bcb7e0"
        );
    }

    #[test]
    fn test_signing_consistency() {
        let creds = LegacyCredentials::new("API_KEY", "API_SECRET").unwrap();
        let first = creds.sign("POST", "/api/v3/brokerage/orders", b"{}", 1_616_492_376);
        let second = creds.sign("POST", "/api/v3/brokerage/orders", b"{}", 1_616_492_376);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_any_secret_length_signs() {
        let short = compute_hmac_signature(b"", "GET", "/api/v3/brokerage/time", b"", 1_700_000_000);
        let long_secret = vec![0xaa_u8; 200];
        let long = compute_hmac_signature(
            &long_secret,
            "GET",
            "/api/v3/brokerage/time",
            b"",
            1_700_000_000,
        );

        for signature in [&short, &long] {
            assert_eq!(signature.len(), 64);
            assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert_ne!(short, long);
        assert_eq!(
            long,
            compute_hmac_signature(&long_secret, "GET", "/api/v3/brokerage/time", b"", 1_700_000_000)
        );
    }

    #[test]
    fn test_timestamp_changes_signature() {
        let creds = LegacyCredentials::new("API_KEY", "API_SECRET").unwrap();
        let first = creds.sign("GET", "/api/v3/brokerage/accounts", b"", 1_700_000_000);
        let second = creds.sign("GET", "/api/v3/brokerage/accounts", b"", 1_700_000_001);
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_values_rejected() {
        assert!(matches!(
            LegacyCredentials::new("", "secret"),
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            LegacyCredentials::new("key", ""),
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = LegacyCredentials::new("organizations/abc", "super_secret_value").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super_secret_value"));
        assert!(debug.contains("[REDACTED]"));
    }
}
