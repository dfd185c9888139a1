//! Shared types for the REST API
//!
//! Monetary values are kept in their wire form (decimal strings) and exposed
//! as [`Decimal`] through accessors.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declare a string enum as sent on the wire
///
/// Values the client does not know about deserialize into `Other`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value not known to this client
            Other(String),
        }

        impl $name {
            /// Wire representation
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(value) => value.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $( $wire => Self::$variant, )+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                Ok(Self::from(value.as_str()))
            }
        }
    };
}

pub(crate) use wire_enum;

/// Parse a wire decimal, treating empty strings as absent
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value).ok()
}

pub(crate) fn parse_opt_decimal(value: &Option<String>) -> Option<Decimal> {
    value.as_deref().and_then(parse_decimal)
}

wire_enum! {
    /// Order side
    pub enum Side {
        Buy => "BUY",
        Sell => "SELL",
    }
}

wire_enum! {
    /// Product type
    pub enum ProductType {
        Spot => "SPOT",
        Future => "FUTURE",
    }
}

wire_enum! {
    /// Futures contract expiry type
    pub enum ContractExpiryType {
        Unknown => "UNKNOWN_CONTRACT_EXPIRY_TYPE",
        Expiring => "EXPIRING",
        Perpetual => "PERPETUAL",
    }
}

wire_enum! {
    /// Expiring contract status filter
    pub enum ExpiringContractStatus {
        Unknown => "UNKNOWN_EXPIRING_CONTRACT_STATUS",
        Unexpired => "STATUS_UNEXPIRED",
        Expired => "STATUS_EXPIRED",
        All => "STATUS_ALL",
    }
}

wire_enum! {
    /// Risk management venue for futures
    pub enum RiskManagedBy {
        Unknown => "UNKNOWN_RISK_MANAGEMENT_TYPE",
        Fcm => "MANAGED_BY_FCM",
        Venue => "MANAGED_BY_VENUE",
    }
}

wire_enum! {
    /// Candle width
    pub enum Granularity {
        Unknown => "UNKNOWN_GRANULARITY",
        OneMinute => "ONE_MINUTE",
        FiveMinutes => "FIVE_MINUTE",
        FifteenMinutes => "FIFTEEN_MINUTE",
        ThirtyMinutes => "THIRTY_MINUTE",
        OneHour => "ONE_HOUR",
        TwoHours => "TWO_HOUR",
        SixHours => "SIX_HOUR",
        OneDay => "ONE_DAY",
    }
}

/// A monetary amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funds {
    /// Non-localized amount in decimal notation, e.g. "1.234"
    #[serde(default)]
    pub value: String,
    /// Currency symbol (USD, BTC, ...)
    #[serde(default)]
    pub currency: String,
}

impl Funds {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            currency: currency.into(),
        }
    }

    /// Parsed amount
    pub fn amount(&self) -> Option<Decimal> {
        parse_decimal(&self.value)
    }
}

/// Server clock as reported by `/time`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerTime {
    /// ISO-8601 timestamp
    #[serde(default)]
    pub iso: Option<String>,
    /// Seconds since the unix epoch
    #[serde(default, rename = "epochSeconds")]
    pub epoch_seconds: Option<String>,
    /// Milliseconds since the unix epoch
    #[serde(default, rename = "epochMillis")]
    pub epoch_millis: Option<String>,
}

impl ServerTime {
    /// Server time from `epochMillis`
    ///
    /// Returns `None` when the field is missing or not an integer.
    pub fn unix_millis(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.epoch_millis.as_deref()?.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

/// Trading session details for FCM products
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FcmTradingSessionDetails {
    pub is_session_open: Option<bool>,
    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
}

/// Perpetual contract details
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerpetualDetails {
    pub open_interest: Option<String>,
    pub funding_rate: Option<String>,
    pub funding_time: Option<DateTime<Utc>>,
}

/// Futures product details
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FutureProductDetails {
    pub venue: Option<String>,
    pub contract_code: Option<String>,
    pub contract_expiry: Option<DateTime<Utc>>,
    pub contract_size: Option<String>,
    pub contract_root_unit: Option<String>,
    /// Descriptive name for the product series, e.g. "Nano Bitcoin Futures"
    pub group_description: Option<String>,
    pub contract_expiry_timezone: Option<String>,
    /// Short version of the group description, e.g. "Nano BTC"
    pub group_short_description: Option<String>,
    pub risk_managed_by: Option<RiskManagedBy>,
    pub contract_expiry_type: Option<ContractExpiryType>,
    pub perpetual_details: Option<PerpetualDetails>,
    pub contract_display_name: Option<String>,
}

/// A tradable product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Trading pair, e.g. "BTC-USD"
    pub product_id: String,
    /// Current price in quote currency
    pub price: String,
    pub price_percentage_change_24h: String,
    pub volume_24h: String,
    pub volume_percentage_change_24h: String,
    pub base_increment: String,
    pub quote_increment: String,
    pub quote_min_size: String,
    pub quote_max_size: String,
    pub base_min_size: String,
    pub base_max_size: String,
    pub base_name: String,
    pub quote_name: String,
    pub watched: bool,
    pub is_disabled: bool,
    pub new: bool,
    pub status: String,
    pub cancel_only: bool,
    pub limit_only: bool,
    pub post_only: bool,
    pub trading_disabled: bool,
    pub auction_mode: bool,
    pub product_type: Option<ProductType>,
    pub quote_currency_id: Option<String>,
    pub base_currency_id: Option<String>,
    pub fcm_trading_session_details: Option<FcmTradingSessionDetails>,
    pub mid_market_price: Option<String>,
    /// Product id of the corresponding unified book
    pub alias: Option<String>,
    /// Product ids this product is an alias for
    pub alias_to: Vec<String>,
    pub base_display_symbol: String,
    pub quote_display_symbol: String,
    pub view_only: Option<bool>,
    pub price_increment: Option<String>,
    pub future_product_details: Option<FutureProductDetails>,
}

impl Product {
    /// Current price
    pub fn price(&self) -> Option<Decimal> {
        parse_decimal(&self.price)
    }

    /// Minimum base size step
    pub fn base_increment(&self) -> Option<Decimal> {
        parse_decimal(&self.base_increment)
    }

    /// Minimum quote size step
    pub fn quote_increment(&self) -> Option<Decimal> {
        parse_decimal(&self.quote_increment)
    }

    /// Whether new orders can be placed
    pub fn is_tradable(&self) -> bool {
        !self.is_disabled && !self.trading_disabled && !self.cancel_only
    }
}

/// One price level of a book
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceLevel {
    pub price: Option<String>,
    pub size: Option<String>,
}

impl PriceLevel {
    pub fn price(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.price)
    }

    pub fn size(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.size)
    }
}

/// Bids and asks for one product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceBook {
    pub product_id: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub time: Option<DateTime<Utc>>,
}

impl PriceBook {
    /// Highest bid
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Lowest ask
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Difference between best ask and best bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price()? - self.best_bid()?.price()?)
    }
}

/// Aggregated trading activity over one time bucket
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Candle {
    /// Bucket start, unix seconds
    pub start: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
}

impl Candle {
    /// Bucket start time
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.start.as_deref()?.parse().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    pub fn close(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.close)
    }
}

/// A public trade
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Trade {
    pub trade_id: Option<String>,
    pub product_id: Option<String>,
    pub price: Option<String>,
    pub size: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub side: Option<Side>,
    pub bid: Option<String>,
    pub ask: Option<String>,
}

/// Recent trades and the top of book
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarketTrades {
    pub trades: Vec<Trade>,
    pub best_bid: Option<String>,
    pub best_ask: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wire_enum_round_trip() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), r#""BUY""#);
        let side: Side = serde_json::from_str(r#""SELL""#).unwrap();
        assert_eq!(side, Side::Sell);
        assert_eq!(Granularity::FiveMinutes.to_string(), "FIVE_MINUTE");
    }

    #[test]
    fn test_wire_enum_unknown_value() {
        let kind: ProductType = serde_json::from_str(r#""OPTION""#).unwrap();
        assert_eq!(kind, ProductType::Other("OPTION".into()));
        assert_eq!(kind.as_str(), "OPTION");
    }

    #[test]
    fn test_funds_amount() {
        let funds: Funds = serde_json::from_str(r#"{"value":"1.234","currency":"BTC"}"#).unwrap();
        assert_eq!(funds.amount(), Some(dec!(1.234)));
        assert_eq!(Funds::new(dec!(10.50), "USD").value, "10.50");
        assert_eq!(Funds::default().amount(), None);
    }

    #[test]
    fn test_server_time_millis() {
        let time: ServerTime = serde_json::from_str(
            r#"{"iso":"2023-11-14T22:13:20Z","epochSeconds":"1700000000","epochMillis":"1700000000123"}"#,
        )
        .unwrap();
        assert_eq!(time.unix_millis().unwrap().timestamp_millis(), 1_700_000_000_123);

        let missing = ServerTime::default();
        assert!(missing.unix_millis().is_none());
    }

    #[test]
    fn test_price_book_spread() {
        let book: PriceBook = serde_json::from_str(
            r#"{"product_id":"BTC-USD","bids":[{"price":"100.5","size":"1"}],"asks":[{"price":"101","size":"2"}],"time":"2023-11-14T22:13:20.123Z"}"#,
        )
        .unwrap();
        assert_eq!(book.spread(), Some(dec!(0.5)));
        assert!(book.time.is_some());
    }

    #[test]
    fn test_product_tolerates_missing_fields() {
        let product: Product =
            serde_json::from_str(r#"{"product_id":"BTC-USD","price":"37000.01","product_type":"SPOT"}"#)
                .unwrap();
        assert_eq!(product.price(), Some(dec!(37000.01)));
        assert_eq!(product.product_type, Some(ProductType::Spot));
        assert!(product.is_tradable());
    }

    #[test]
    fn test_candle_start_time() {
        let candle = Candle {
            start: Some("1700000000".into()),
            ..Default::default()
        };
        assert_eq!(candle.start_time().unwrap().timestamp(), 1_700_000_000);
    }
}
