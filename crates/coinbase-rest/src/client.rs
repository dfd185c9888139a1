//! Main REST client implementation

use coinbase_auth::{
    Authenticator, CloudAuthenticator, CloudCredentials, LegacyAuthenticator, LegacyCredentials,
    PendingRequest, Unauthenticated, API_KEY_ENV, API_SECRET_ENV, CLOUD_API_KEY_ENV,
    CLOUD_PRIVATE_KEY_ENV,
};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::endpoints::{
    AccountEndpoints, FeeEndpoints, FuturesEndpoints, OrderEndpoints, PaymentMethodEndpoints,
    PortfolioEndpoints, ProductEndpoints, PublicEndpoints,
};
use crate::error::{RestError, RestResult};
use crate::query::QueryParams;
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

/// Production API host
pub const PRODUCTION_URL: &str = "https://api.coinbase.com";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_USER_AGENT: &str = concat!("coinbase-rest/", env!("CARGO_PKG_VERSION"));

/// How the client authenticates its requests
pub enum Authentication {
    /// Send requests without credentials
    Unauthenticated,
    /// Legacy API key and HMAC secret
    Legacy {
        api_key: String,
        api_secret: SecretString,
    },
    /// Cloud API key name and PEM encoded EC private key
    Cloud {
        api_key: String,
        private_key_pem: SecretString,
    },
    /// Caller supplied scheme
    Custom(Arc<dyn Authenticator>),
}

impl Authentication {
    /// Legacy key and secret
    pub fn legacy(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::Legacy {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    /// Cloud key name and private key
    pub fn cloud(api_key: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self::Cloud {
            api_key: api_key.into(),
            private_key_pem: SecretString::from(private_key_pem.into()),
        }
    }

    /// Pick a scheme from the environment
    ///
    /// Cloud keys win over legacy keys. Without either, requests go out
    /// unauthenticated.
    pub fn from_env() -> Self {
        if let (Ok(key), Ok(pem)) = (
            std::env::var(CLOUD_API_KEY_ENV),
            std::env::var(CLOUD_PRIVATE_KEY_ENV),
        ) {
            return Self::cloud(key, pem);
        }
        if let (Ok(key), Ok(secret)) = (std::env::var(API_KEY_ENV), std::env::var(API_SECRET_ENV)) {
            return Self::legacy(key, secret);
        }
        Self::Unauthenticated
    }

    fn into_authenticator(self) -> RestResult<Arc<dyn Authenticator>> {
        let authenticator: Arc<dyn Authenticator> = match self {
            Self::Unauthenticated => Arc::new(Unauthenticated),
            Self::Legacy {
                api_key,
                api_secret,
            } => {
                let creds = LegacyCredentials::new(api_key, api_secret.expose_secret())
                    .map_err(RestError::configuration)?;
                Arc::new(LegacyAuthenticator::new(creds))
            }
            Self::Cloud {
                api_key,
                private_key_pem,
            } => {
                let creds = CloudCredentials::new(api_key, private_key_pem.expose_secret())
                    .map_err(RestError::configuration)?;
                Arc::new(CloudAuthenticator::new(creds))
            }
            Self::Custom(authenticator) => authenticator,
        };
        Ok(authenticator)
    }

    fn scheme(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "none",
            Self::Legacy { .. } => "legacy",
            Self::Cloud { .. } => "cloud",
            Self::Custom(_) => "custom",
        }
    }
}

impl Default for Authentication {
    fn default() -> Self {
        Self::Unauthenticated
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("Unauthenticated"),
            Self::Legacy { api_key, .. } => f
                .debug_struct("Legacy")
                .field("api_key", api_key)
                .field("api_secret", &"[REDACTED]")
                .finish(),
            Self::Cloud { api_key, .. } => f
                .debug_struct("Cloud")
                .field("api_key", api_key)
                .field("private_key_pem", &"[REDACTED]")
                .finish(),
            Self::Custom(authenticator) => f.debug_tuple("Custom").field(authenticator).finish(),
        }
    }
}

/// Client configuration
#[derive(Debug)]
pub struct ClientConfig {
    /// API host, without a trailing path
    pub base_url: String,
    /// Request timeout for the default transport
    pub timeout: Duration,
    /// Custom user agent for the default transport
    pub user_agent: Option<String>,
    /// Replaces the default transport
    pub transport: Option<Arc<dyn HttpTransport>>,
    /// Authentication scheme
    pub authentication: Authentication,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: PRODUCTION_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            transport: None,
            authentication: Authentication::Unauthenticated,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set authentication
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }
}

/// Shared, immutable request pipeline
struct Dispatcher {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    authenticator: Arc<dyn Authenticator>,
}

/// Coinbase Advanced Trade REST API client
///
/// Cloning is cheap; clones share one connection pool and authenticator.
///
/// # Example
///
/// ```no_run
/// use coinbase_rest::{ListAccountsOptions, RestClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = RestClient::new()?;
///     let time = client.public().get_server_time().await?;
///
///     // Signed with a legacy key
///     let auth_client = RestClient::with_legacy_key("key", "secret")?;
///     let accounts = auth_client.accounts().list(&ListAccountsOptions::default()).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<Dispatcher>,
    cancel: Option<CancellationToken>,
}

impl RestClient {
    /// Create a client without authentication
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client that signs with a legacy key and secret
    pub fn with_legacy_key(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> RestResult<Self> {
        Self::with_config(
            ClientConfig::new().with_authentication(Authentication::legacy(api_key, api_secret)),
        )
    }

    /// Create a client that signs with a cloud key
    ///
    /// Fails with [`RestError::Configuration`] when the key does not parse.
    pub fn with_cloud_key(
        api_key: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> RestResult<Self> {
        Self::with_config(
            ClientConfig::new().with_authentication(Authentication::cloud(api_key, private_key_pem)),
        )
    }

    /// Create a client with credentials from the environment
    pub fn from_env() -> RestResult<Self> {
        Self::with_config(ClientConfig::new().with_authentication(Authentication::from_env()))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RestError::Configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base()
            || base_url.query().is_some()
            || base_url.fragment().is_some()
        {
            return Err(RestError::Configuration(format!(
                "invalid base URL '{}'",
                config.base_url
            )));
        }

        let scheme = config.authentication.scheme();
        let authenticator = config.authentication.into_authenticator()?;

        let transport: Arc<dyn HttpTransport> = match config.transport {
            Some(transport) => transport,
            None => {
                let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
                let transport = ReqwestTransport::new(config.timeout, user_agent)
                    .map_err(|e| RestError::Configuration(e.to_string()))?;
                Arc::new(transport)
            }
        };

        info!(base_url = %base_url, auth = scheme, "Created Coinbase REST client");

        Ok(Self {
            inner: Arc::new(Dispatcher {
                base_url,
                transport,
                authenticator,
            }),
            cancel: None,
        })
    }

    /// A handle whose calls abort when `token` is cancelled
    ///
    /// The handle shares this client's transport and authenticator.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: Some(token),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ========================================================================
    // Endpoint groups
    // ========================================================================

    /// Account endpoints
    pub fn accounts(&self) -> AccountEndpoints<'_> {
        AccountEndpoints::new(self)
    }

    /// Order endpoints
    pub fn orders(&self) -> OrderEndpoints<'_> {
        OrderEndpoints::new(self)
    }

    /// Product and market data endpoints
    pub fn products(&self) -> ProductEndpoints<'_> {
        ProductEndpoints::new(self)
    }

    /// Public market data endpoints
    pub fn public(&self) -> PublicEndpoints<'_> {
        PublicEndpoints::new(self)
    }

    /// Fee endpoints
    pub fn fees(&self) -> FeeEndpoints<'_> {
        FeeEndpoints::new(self)
    }

    /// Futures (CFM) endpoints
    pub fn futures(&self) -> FuturesEndpoints<'_> {
        FuturesEndpoints::new(self)
    }

    /// Portfolio endpoints
    pub fn portfolios(&self) -> PortfolioEndpoints<'_> {
        PortfolioEndpoints::new(self)
    }

    /// Payment method endpoints
    pub fn payment_methods(&self) -> PaymentMethodEndpoints<'_> {
        PaymentMethodEndpoints::new(self)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Send a GET request with query parameters
    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> RestResult<T>
    where
        T: DeserializeOwned,
        Q: QueryParams + ?Sized,
    {
        let url = self.url(path, query.to_query_string().as_deref())?;
        self.execute(PendingRequest::new(Method::GET, url), StatusCode::OK)
            .await
    }

    /// Send a POST request with a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> RestResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    /// Send a PUT request with a JSON body
    pub async fn put<T, B>(&self, path: &str, body: &B) -> RestResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body).await
    }

    /// Send a DELETE request without a body
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> RestResult<T> {
        let url = self.url(path, None)?;
        self.execute(PendingRequest::new(Method::DELETE, url), StatusCode::OK)
            .await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> RestResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)
            .map_err(|e| RestError::InvalidParameter(format!("failed to encode body: {}", e)))?;
        let url = self.url(path, None)?;
        self.execute(PendingRequest::new(method, url).with_body(body), StatusCode::OK)
            .await
    }

    fn url(&self, path: &str, query: Option<&str>) -> RestResult<Url> {
        // Appended, not joined, so a base URL path such as a proxy prefix is kept
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))
            .map_err(|e| RestError::InvalidParameter(format!("invalid path '{}': {}", path, e)))?;
        url.set_query(query);
        Ok(url)
    }

    /// Authenticate, send and decode one request
    ///
    /// A status other than `expected` yields [`RestError::Api`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        mut request: PendingRequest,
        expected: StatusCode,
    ) -> RestResult<T> {
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(TransportError::Cancelled.into());
        }

        self.inner
            .authenticator
            .authenticate(&mut request, SystemTime::now())
            .map_err(RestError::Signing)?;
        request.set_header(ACCEPT, HeaderValue::from_static("application/json"));

        let method = request.method().clone();
        let path = request.path().to_string();
        debug!(%method, path = %path, "Dispatching request");

        let response = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(%method, path = %path, "Request cancelled");
                        return Err(TransportError::Cancelled.into());
                    }
                    result = self.inner.transport.send(request) => result?,
                }
            }
            None => self.inner.transport.send(request).await?,
        };

        if response.status != expected {
            let envelope = codec::decode_error(response.status, &response.body);
            warn!(
                %method,
                path = %path,
                status = %response.status,
                error = envelope.error_tag(),
                "Request rejected"
            );
            return Err(RestError::Api {
                status: response.status,
                envelope,
            });
        }

        debug!(%method, path = %path, status = %response.status, "Request succeeded");
        codec::decode_success(&response.body)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticator", &self.inner.authenticator)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
