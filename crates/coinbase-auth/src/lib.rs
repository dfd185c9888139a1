//! Request signing and authentication for the Coinbase Advanced Trade API
//!
//! Two credential schemes are supported:
//!
//! - **Legacy keys**: every request carries `CB-ACCESS-KEY`,
//!   `CB-ACCESS-TIMESTAMP` and an HMAC-SHA256 `CB-ACCESS-SIGN` header.
//! - **Cloud keys**: every request carries a freshly signed ES256 bearer
//!   token bound to its method, host and path.
//!
//! # Example
//!
//! ```no_run
//! use coinbase_auth::{
//!     Authenticator, LegacyAuthenticator, LegacyCredentials, Method, PendingRequest, Url,
//! };
//! use std::time::SystemTime;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = LegacyCredentials::from_env()?;
//!     let auth = LegacyAuthenticator::new(creds);
//!
//!     let url = Url::parse("https://api.coinbase.com/api/v3/brokerage/accounts")?;
//!     let mut request = PendingRequest::new(Method::GET, url);
//!     auth.authenticate(&mut request, SystemTime::now())?;
//!
//!     Ok(())
//! }
//! ```

mod authenticator;
mod credentials;
mod error;
mod request;
mod token;

pub use authenticator::{
    Authenticator, CloudAuthenticator, LegacyAuthenticator, Unauthenticated, ACCESS_KEY_HEADER,
    ACCESS_SIGN_HEADER, ACCESS_TIMESTAMP_HEADER,
};
pub use credentials::{compute_hmac_signature, LegacyCredentials, API_KEY_ENV, API_SECRET_ENV};
pub use error::{AuthError, AuthResult};
pub use request::PendingRequest;
pub use token::{
    compute_signed_token, inspect_token, parse_signing_key, CloudCredentials, TokenClaims,
    TokenHeader, CLOUD_API_KEY_ENV, CLOUD_PRIVATE_KEY_ENV, NOT_BEFORE_BACKDATE, TOKEN_AUDIENCE,
    TOKEN_ISSUER, TOKEN_TTL,
};

/// Re-exported so callers can build requests without depending on reqwest directly
pub use reqwest::{Method, Url};
