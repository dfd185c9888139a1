//! REST API client for the Coinbase Advanced Trade API
//!
//! This crate provides typed access to the brokerage endpoints: accounts,
//! orders, products, portfolios, futures, fees and payment methods.
//!
//! # Features
//!
//! - **Market Data**: Products, order books, candles, market trades
//! - **Account**: Accounts, portfolios, payment methods, fee tiers
//! - **Trading**: Create, edit, preview and cancel orders; list fills
//! - **Futures**: Balances, positions and sweeps
//!
//! # Authentication
//!
//! Every request goes through one dispatcher that signs it with the
//! configured scheme: legacy HMAC-SHA256 headers or a per-request ES256
//! bearer token for cloud keys. See [`coinbase_auth`].
//!
//! # Example
//!
//! ```no_run
//! use coinbase_rest::{ListAccountsOptions, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads cloud or legacy credentials from the environment
//!     let client = RestClient::from_env()?;
//!
//!     let time = client.public().get_server_time().await?;
//!     println!("Server time: {:?}", time.iso);
//!
//!     let accounts = client.accounts().list(&ListAccountsOptions::default()).await?;
//!     for account in accounts.accounts {
//!         println!("{:?}: {:?}", account.currency, account.available_balance.amount());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! The client never retries. Failures come back as [`RestError`] with the
//! operation and identifiers attached; server rejections keep the decoded
//! [`ApiErrorEnvelope`].

pub mod client;
pub mod codec;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::{Authentication, ClientConfig, RestClient, PRODUCTION_URL};
pub use codec::{decode_error, decode_success};
pub use error::{
    ApiErrorEnvelope, ErrorDetail, RestError, RestResult, ResultExt, UNEXPECTED_API_RESPONSE,
};
pub use query::{QueryBuilder, QueryParams};
#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use types::{
    Candle, ContractExpiryType, ExpiringContractStatus, Funds, Granularity, MarketTrades,
    PriceBook, PriceLevel, Product, ProductType, RiskManagedBy, ServerTime, Side, Trade,
};

// Re-export endpoint-specific types
pub use endpoints::accounts::{Account, AccountType, ListAccountsOptions, ListAccountsResponse};
pub use endpoints::fees::{TransactionSummary, TransactionSummaryOptions};
pub use endpoints::futures::{
    BalanceSummary, FuturesPosition, FuturesSide, FuturesSweep, ScheduleSweepRequest, SweepStatus,
};
pub use endpoints::orders::{
    CancelledOrder, CreateOrderRequest, CreateOrderResponse, EditOrderRequest, EditOrderResponse,
    Fill, ListFillsOptions, ListFillsResponse, ListOrdersOptions, ListOrdersResponse, Order,
    OrderConfiguration, OrderStatus, OrderType, TimeInForce,
};
pub use endpoints::payment_methods::PaymentMethod;
pub use endpoints::portfolios::{
    AllocateRequest, EditPortfolioOptions, ListPortfoliosOptions, MoveFundsRequest,
    MoveFundsResponse, Portfolio, PortfolioBreakdown, PortfolioType,
};
pub use endpoints::products::{
    BestBidAsk, CandlesOptions, ListProductsOptions, MarketTradesOptions, ProductBookOptions,
};

// Re-export credentials so callers need only this crate
pub use coinbase_auth::{
    AuthError, Authenticator, CloudCredentials, LegacyCredentials, PendingRequest,
};
