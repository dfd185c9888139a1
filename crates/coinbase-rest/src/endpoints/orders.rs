//! Order endpoints
//!
//! Edits to one order must be sequenced by the caller: wait for an edit to
//! complete before sending the next edit for the same order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestError, RestResult, ResultExt};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::{parse_decimal, parse_opt_decimal, wire_enum, ContractExpiryType, ProductType, Side};

wire_enum! {
    /// Direction a stop price is crossed in
    pub enum StopDirection {
        Up => "STOP_DIRECTION_STOP_UP",
        Down => "STOP_DIRECTION_STOP_DOWN",
    }
}

wire_enum! {
    /// Margin type for leveraged orders
    pub enum MarginType {
        Isolated => "ISOLATED",
        Cross => "CROSS",
    }
}

wire_enum! {
    /// Why an order was not created
    pub enum OrderFailureReason {
        Unknown => "UNKNOWN_FAILURE_REASON",
        UnsupportedOrderConfiguration => "UNSUPPORTED_ORDER_CONFIGURATION",
        InvalidSide => "INVALID_SIDE",
        InvalidProductId => "INVALID_PRODUCT_ID",
        InvalidSizePrecision => "INVALID_SIZE_PRECISION",
        InvalidPricePrecision => "INVALID_PRICE_PRECISION",
        InsufficientFund => "INSUFFICIENT_FUND",
        InvalidLedgerBalance => "INVALID_LEDGER_BALANCE",
        OrderEntryDisabled => "ORDER_ENTRY_DISABLED",
        IneligiblePair => "INELIGIBLE_PAIR",
        InvalidLimitPricePostOnly => "INVALID_LIMIT_PRICE_POST_ONLY",
        InvalidLimitPrice => "INVALID_LIMIT_PRICE",
        InvalidNoLiquidity => "INVALID_NO_LIQUIDITY",
        InvalidRequest => "INVALID_REQUEST",
        CommanderRejectedNewOrder => "COMMANDER_REJECTED_NEW_ORDER",
        InsufficientFunds => "INSUFFICIENT_FUNDS",
    }
}

wire_enum! {
    /// Why an order preview failed
    pub enum PreviewFailureReason {
        Unknown => "UNKNOWN_PREVIEW_FAILURE_REASON",
        MissingCommissionRate => "PREVIEW_MISSING_COMMISSION_RATE",
        InvalidSide => "PREVIEW_INVALID_SIDE",
        InvalidOrderConfig => "PREVIEW_INVALID_ORDER_CONFIG",
        InvalidProductId => "PREVIEW_INVALID_PRODUCT_ID",
        InvalidSizePrecision => "PREVIEW_INVALID_SIZE_PRECISION",
        InvalidPricePrecision => "PREVIEW_INVALID_PRICE_PRECISION",
        MissingProductPriceBook => "PREVIEW_MISSING_PRODUCT_PRICE_BOOK",
        InvalidLedgerBalance => "PREVIEW_INVALID_LEDGER_BALANCE",
        InsufficientLedgerBalance => "PREVIEW_INSUFFICIENT_LEDGER_BALANCE",
        InvalidLimitPricePostOnly => "PREVIEW_INVALID_LIMIT_PRICE_POST_ONLY",
        InvalidLimitPrice => "PREVIEW_INVALID_LIMIT_PRICE",
        InvalidNoLiquidity => "PREVIEW_INVALID_NO_LIQUIDITY",
        InsufficientFund => "PREVIEW_INSUFFICIENT_FUND",
        InvalidCommissionConfiguration => "PREVIEW_INVALID_COMMISSION_CONFIGURATION",
        InvalidStopPrice => "PREVIEW_INVALID_STOP_PRICE",
        InvalidBaseSizeTooLarge => "PREVIEW_INVALID_BASE_SIZE_TOO_LARGE",
        InvalidBaseSizeTooSmall => "PREVIEW_INVALID_BASE_SIZE_TOO_SMALL",
        InvalidQuoteSizePrecision => "PREVIEW_INVALID_QUOTE_SIZE_PRECISION",
        InvalidQuoteSizeTooLarge => "PREVIEW_INVALID_QUOTE_SIZE_TOO_LARGE",
        InvalidPriceTooLarge => "PREVIEW_INVALID_PRICE_TOO_LARGE",
        InvalidQuoteSizeTooSmall => "PREVIEW_INVALID_QUOTE_SIZE_TOO_SMALL",
        InsufficientFundsForFutures => "PREVIEW_INSUFFICIENT_FUNDS_FOR_FUTURES",
        BreachedPriceLimit => "PREVIEW_BREACHED_PRICE_LIMIT",
        BreachedAccountPositionLimit => "PREVIEW_BREACHED_ACCOUNT_POSITION_LIMIT",
        BreachedCompanyPositionLimit => "PREVIEW_BREACHED_COMPANY_POSITION_LIMIT",
        InvalidMarginHealth => "PREVIEW_INVALID_MARGIN_HEALTH",
        RiskProxyFailure => "PREVIEW_RISK_PROXY_FAILURE",
        UntradableFcmAccountStatus => "PREVIEW_UNTRADABLE_FCM_ACCOUNT_STATUS",
    }
}

wire_enum! {
    /// Why an edit was rejected
    pub enum EditFailureReason {
        Unknown => "UNKNOWN_EDIT_ORDER_FAILURE_REASON",
        RejectedEditOrder => "COMMANDER_REJECTED_EDIT_ORDER",
        BelowFilledSize => "CANNOT_EDIT_TO_BELOW_FILLED_SIZE",
        NotFound => "ORDER_NOT_FOUND",
        CallerIdMismatch => "CALLER_ID_MISMATCH",
        OnlyLimitOrderEditsSupported => "ONLY_LIMIT_ORDER_EDITS_SUPPORTED",
        InvalidEditedSize => "INVALID_EDITED_SIZE",
        InvalidEditedPrice => "INVALID_EDITED_PRICE",
        InvalidOriginalSize => "INVALID_ORIGINAL_SIZE",
        InvalidOriginalPrice => "INVALID_ORIGINAL_PRICE",
        EditEqualToOriginal => "EDIT_REQUEST_EQUAL_TO_ORIGINAL_REQUEST",
        OnlyOpenOrdersCanBeEdited => "ONLY_OPEN_ORDERS_CAN_BE_EDITED",
    }
}

wire_enum! {
    /// Why a cancel was rejected
    pub enum CancelOrderFailureReason {
        Unknown => "UNKNOWN_CANCEL_FAILURE_REASON",
        InvalidRequest => "INVALID_CANCEL_REQUEST",
        UnknownOrder => "UNKNOWN_CANCEL_ORDER",
        RejectedOrder => "COMMANDER_REJECTED_CANCEL_ORDER",
        DuplicateRequest => "DUPLICATE_CANCEL_REQUEST",
    }
}

wire_enum! {
    /// Order status
    pub enum OrderStatus {
        Open => "OPEN",
        Filled => "FILLED",
        Cancelled => "CANCELLED",
        Expired => "EXPIRED",
        Unknown => "UNKNOWN_ORDER_STATUS",
    }
}

wire_enum! {
    /// Time in force
    pub enum TimeInForce {
        Unknown => "UNKNOWN_TIME_IN_FORCE",
        GoodUntilDate => "GOOD_UNTIL_DATE_TIME",
        GoodUntilCancelled => "GOOD_UNTIL_CANCELLED",
        ImmediateOrCancel => "IMMEDIATE_OR_CANCEL",
    }
}

wire_enum! {
    /// Stop trigger state
    pub enum TriggerStatus {
        Unknown => "UNKNOWN_TRIGGER_STATUS",
        InvalidOrderType => "INVALID_ORDER_TYPE",
        StopPending => "STOP_PENDING",
        StopTriggered => "STOP_TRIGGERED",
    }
}

wire_enum! {
    /// Order type
    pub enum OrderType {
        Unknown => "UNKNOWN_ORDER_TYPE",
        Market => "MARKET",
        Limit => "LIMIT",
        Stop => "STOP",
        StopLimit => "STOP_LIMIT",
    }
}

wire_enum! {
    /// Rejection reason
    pub enum RejectReason {
        Unspecified => "REJECT_REASON_UNSPECIFIED",
    }
}

wire_enum! {
    /// Where an order was placed from
    pub enum OrderPlacementSource {
        RetailSimple => "RETAIL_SIMPLE",
        RetailAdvanced => "RETAIL_ADVANCED",
    }
}

wire_enum! {
    /// Fill type
    pub enum TradeType {
        Fill => "FILL",
        Reversal => "REVERSAL",
        Correction => "CORRECTION",
        Synthetic => "SYNTHETIC",
    }
}

wire_enum! {
    /// Whether a fill added or removed liquidity
    pub enum LiquidityIndicator {
        Unknown => "UNKNOWN_LIQUIDITY_INDICATOR",
        Maker => "MAKER",
        Taker => "TAKER",
    }
}

// ============================================================================
// Order configuration
// ============================================================================

/// Market order, immediate or cancel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketIoc {
    /// Quote currency to spend; required for BUY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_size: Option<Decimal>,
    /// Base currency to sell; required for SELL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<Decimal>,
}

/// Limit order, good until cancelled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitGtc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    /// Reject the order if any part of it would take liquidity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_only: Option<bool>,
}

/// Limit order, good until a date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitGtd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_only: Option<bool>,
}

/// Stop limit order, good until cancelled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopLimitGtc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_direction: Option<StopDirection>,
}

/// Stop limit order, good until a date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopLimitGtd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_direction: Option<StopDirection>,
}

/// Order details; exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfiguration {
    #[serde(rename = "market_market_ioc", skip_serializing_if = "Option::is_none")]
    pub market_ioc: Option<MarketIoc>,
    #[serde(rename = "limit_limit_gtc", skip_serializing_if = "Option::is_none")]
    pub limit_gtc: Option<LimitGtc>,
    #[serde(rename = "limit_limit_gtd", skip_serializing_if = "Option::is_none")]
    pub limit_gtd: Option<LimitGtd>,
    #[serde(rename = "stop_limit_stop_limit_gtc", skip_serializing_if = "Option::is_none")]
    pub stop_limit_gtc: Option<StopLimitGtc>,
    #[serde(rename = "stop_limit_stop_limit_gtd", skip_serializing_if = "Option::is_none")]
    pub stop_limit_gtd: Option<StopLimitGtd>,
}

impl OrderConfiguration {
    /// Market buy spending `quote_size`
    pub fn market_buy(quote_size: Decimal) -> Self {
        Self {
            market_ioc: Some(MarketIoc {
                quote_size: Some(quote_size),
                base_size: None,
            }),
            ..Default::default()
        }
    }

    /// Market sell of `base_size`
    pub fn market_sell(base_size: Decimal) -> Self {
        Self {
            market_ioc: Some(MarketIoc {
                quote_size: None,
                base_size: Some(base_size),
            }),
            ..Default::default()
        }
    }

    /// Limit order resting until cancelled
    pub fn limit_gtc(base_size: Decimal, limit_price: Decimal, post_only: bool) -> Self {
        Self {
            limit_gtc: Some(LimitGtc {
                base_size: Some(base_size),
                limit_price: Some(limit_price),
                post_only: Some(post_only),
            }),
            ..Default::default()
        }
    }

    /// Limit order resting until `end_time`
    pub fn limit_gtd(
        base_size: Decimal,
        limit_price: Decimal,
        end_time: DateTime<Utc>,
        post_only: bool,
    ) -> Self {
        Self {
            limit_gtd: Some(LimitGtd {
                base_size: Some(base_size),
                limit_price: Some(limit_price),
                end_time: Some(end_time),
                post_only: Some(post_only),
            }),
            ..Default::default()
        }
    }

    /// Stop limit order resting until cancelled
    pub fn stop_limit_gtc(
        base_size: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
        stop_direction: StopDirection,
    ) -> Self {
        Self {
            stop_limit_gtc: Some(StopLimitGtc {
                base_size: Some(base_size),
                limit_price: Some(limit_price),
                stop_price: Some(stop_price),
                stop_direction: Some(stop_direction),
            }),
            ..Default::default()
        }
    }

    /// Stop limit order resting until `end_time`
    pub fn stop_limit_gtd(
        base_size: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
        end_time: DateTime<Utc>,
        stop_direction: StopDirection,
    ) -> Self {
        Self {
            stop_limit_gtd: Some(StopLimitGtd {
                base_size: Some(base_size),
                limit_price: Some(limit_price),
                stop_price: Some(stop_price),
                end_time: Some(end_time),
                stop_direction: Some(stop_direction),
            }),
            ..Default::default()
        }
    }

    fn is_set(&self) -> bool {
        self.market_ioc.is_some()
            || self.limit_gtc.is_some()
            || self.limit_gtd.is_some()
            || self.stop_limit_gtc.is_some()
            || self.stop_limit_gtd.is_some()
    }
}

// ============================================================================
// Requests and responses
// ============================================================================

/// New order
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Client-chosen unique id; a duplicate returns the existing order
    pub client_order_id: String,
    pub product_id: String,
    pub side: Side,
    pub order_configuration: OrderConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_trade_prevention_id: Option<String>,
    /// Leverage, "1.0" when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_type: Option<MarginType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_portfolio_id: Option<String>,
}

impl CreateOrderRequest {
    /// Create a request with a random client order id
    pub fn new(product_id: impl Into<String>, side: Side, configuration: OrderConfiguration) -> Self {
        Self {
            client_order_id: Uuid::new_v4().to_string(),
            product_id: product_id.into(),
            side,
            order_configuration: configuration,
            self_trade_prevention_id: None,
            leverage: None,
            margin_type: None,
            retail_portfolio_id: None,
        }
    }

    /// Set client order id
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = id.into();
        self
    }

    /// Set retail portfolio
    pub fn with_portfolio(mut self, portfolio_id: impl Into<String>) -> Self {
        self.retail_portfolio_id = Some(portfolio_id.into());
        self
    }

    /// Set leverage and margin type
    pub fn with_leverage(mut self, leverage: Decimal, margin_type: MarginType) -> Self {
        self.leverage = Some(leverage);
        self.margin_type = Some(margin_type);
        self
    }

    fn validate(&self) -> RestResult<()> {
        if self.product_id.is_empty() {
            return Err(RestError::InvalidParameter("product_id is empty".to_string()));
        }
        if self.client_order_id.is_empty() {
            return Err(RestError::InvalidParameter(
                "client_order_id is empty".to_string(),
            ));
        }
        if !self.order_configuration.is_set() {
            return Err(RestError::InvalidParameter(
                "order_configuration has no order type set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Details of a created order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderSuccess {
    pub order_id: String,
    pub product_id: Option<String>,
    pub side: Option<Side>,
    pub client_order_id: Option<String>,
}

/// Details of a rejected order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderFailure {
    pub error: Option<OrderFailureReason>,
    pub message: Option<String>,
    pub error_details: Option<String>,
    pub preview_failure_reason: Option<PreviewFailureReason>,
    pub new_order_failure_reason: Option<OrderFailureReason>,
}

/// Result of placing an order
///
/// A rejected order still arrives with a success status; check `success`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub failure_reason: Option<OrderFailureReason>,
    pub order_id: Option<String>,
    pub success_response: Option<CreateOrderSuccess>,
    pub error_response: Option<CreateOrderFailure>,
    pub order_configuration: Option<OrderConfiguration>,
}

/// New price and size for an open order
#[derive(Debug, Clone, Serialize)]
pub struct EditOrderRequest {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
}

/// One reason an edit was refused
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditOrderError {
    pub edit_failure_reason: Option<EditFailureReason>,
    pub preview_failure_reason: Option<PreviewFailureReason>,
}

/// Result of an edit or edit preview
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditOrderResponse {
    pub success: bool,
    pub errors: Vec<EditOrderError>,
}

/// One entry of an order's edit history
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderEdit {
    pub price: Option<String>,
    pub size: Option<String>,
    pub replace_accept_timestamp: Option<DateTime<Utc>>,
}

/// An order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_id: String,
    pub product_id: String,
    pub user_id: String,
    pub order_configuration: Option<OrderConfiguration>,
    pub side: Option<Side>,
    pub client_order_id: String,
    pub status: Option<OrderStatus>,
    pub time_in_force: Option<TimeInForce>,
    pub created_time: Option<DateTime<Utc>>,
    /// Percent of the order that has been filled
    pub completion_percentage: String,
    /// Filled portion, in base currency
    pub filled_size: Option<String>,
    pub average_filled_price: String,
    pub number_of_fills: String,
    /// Filled portion, in quote currency
    pub filled_value: Option<String>,
    pub pending_cancel: bool,
    pub size_in_quote: bool,
    pub total_fees: String,
    pub size_inclusive_of_fees: bool,
    pub total_value_after_fees: String,
    pub trigger_status: Option<TriggerStatus>,
    pub order_type: Option<OrderType>,
    pub reject_reason: Option<RejectReason>,
    pub settled: Option<bool>,
    pub product_type: Option<ProductType>,
    pub reject_message: Option<String>,
    pub cancel_message: Option<String>,
    pub order_placement_source: Option<OrderPlacementSource>,
    pub outstanding_hold_amount: Option<String>,
    pub is_liquidation: Option<bool>,
    pub last_fill_time: Option<DateTime<Utc>>,
    /// Latest edits, at most five
    pub edit_history: Vec<OrderEdit>,
}

impl Order {
    pub fn filled_size(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.filled_size)
    }

    pub fn average_filled_price(&self) -> Option<Decimal> {
        parse_decimal(&self.average_filled_price)
    }

    pub fn total_fees(&self) -> Option<Decimal> {
        parse_decimal(&self.total_fees)
    }

    pub fn is_open(&self) -> bool {
        self.status == Some(OrderStatus::Open)
    }
}

#[derive(Deserialize)]
struct GetOrderResponse {
    order: Order,
}

/// Outcome of cancelling one order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CancelledOrder {
    pub success: bool,
    pub failure_reason: Option<CancelOrderFailureReason>,
    pub order_id: String,
}

#[derive(Serialize)]
struct CancelOrdersRequest<'a> {
    order_ids: &'a [&'a str],
}

#[derive(Deserialize)]
struct CancelOrdersResponse {
    #[serde(default)]
    results: Vec<CancelledOrder>,
}

/// Options for listing historical orders
#[derive(Debug, Clone, Default)]
pub struct ListOrdersOptions {
    pub product_id: Option<String>,
    pub order_status: Vec<OrderStatus>,
    /// Page size, at most 1000
    pub limit: Option<i32>,
    /// Inclusive start of the creation window
    pub start_date: Option<DateTime<Utc>>,
    /// Exclusive end of the creation window
    pub end_date: Option<DateTime<Utc>>,
    pub order_type: Option<OrderType>,
    pub order_side: Option<Side>,
    pub cursor: Option<String>,
    pub product_type: Option<ProductType>,
    pub order_placement_source: Option<OrderPlacementSource>,
    /// Only applied when `product_type` is FUTURE
    pub contract_expiry_type: Option<ContractExpiryType>,
    /// Match orders whose base, quote or underlying asset is in this list
    pub asset_filters: Vec<String>,
    pub retail_portfolio_id: Option<String>,
}

impl QueryParams for ListOrdersOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("product_id", self.product_id.as_deref())
            .many("order_status", &self.order_status)
            .opt("limit", self.limit)
            .opt_rfc3339("start_date", self.start_date)
            .opt_rfc3339("end_date", self.end_date)
            .opt("order_type", self.order_type.as_ref())
            .opt("order_side", self.order_side.as_ref())
            .opt("cursor", self.cursor.as_deref())
            .opt("product_type", self.product_type.as_ref())
            .opt("order_placement_source", self.order_placement_source.as_ref())
            .opt("contract_expiry_type", self.contract_expiry_type.as_ref())
            .many("asset_filters", &self.asset_filters)
            .opt("retail_portfolio_id", self.retail_portfolio_id.as_deref())
            .build()
    }
}

/// One page of orders
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListOrdersResponse {
    pub orders: Vec<Order>,
    /// Database sequence the page was read at
    pub sequence: Option<String>,
    pub has_next: bool,
    pub cursor: Option<String>,
}

/// Options for listing fills
#[derive(Debug, Clone, Default)]
pub struct ListFillsOptions {
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    /// Only fills at or after this time
    pub start_sequence_timestamp: Option<DateTime<Utc>>,
    /// Only fills before this time
    pub end_sequence_timestamp: Option<DateTime<Utc>>,
    /// Page size, 100 when unset
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

impl QueryParams for ListFillsOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("order_id", self.order_id.as_deref())
            .opt("product_id", self.product_id.as_deref())
            .opt_rfc3339("start_sequence_timestamp", self.start_sequence_timestamp)
            .opt_rfc3339("end_sequence_timestamp", self.end_sequence_timestamp)
            .opt("limit", self.limit)
            .opt("cursor", self.cursor.as_deref())
            .build()
    }
}

/// A fill of an order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fill {
    pub entry_id: Option<String>,
    pub trade_id: Option<String>,
    pub order_id: Option<String>,
    pub trade_time: Option<DateTime<Utc>>,
    pub trade_type: Option<TradeType>,
    pub price: Option<String>,
    pub size: Option<String>,
    pub commission: Option<String>,
    pub product_id: Option<String>,
    pub sequence_timestamp: Option<DateTime<Utc>>,
    pub liquidity_indicator: Option<LiquidityIndicator>,
    pub size_in_quote: Option<bool>,
    pub user_id: Option<String>,
    pub side: Option<Side>,
}

impl Fill {
    pub fn price(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.price)
    }

    pub fn size(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.size)
    }

    pub fn commission(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.commission)
    }
}

/// One page of fills
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListFillsResponse {
    pub fills: Vec<Fill>,
    pub cursor: Option<String>,
}

// ============================================================================
// Endpoints
// ============================================================================

/// Order endpoints
pub struct OrderEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> OrderEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Place an order
    #[instrument(skip(self, order), fields(product_id = %order.product_id, side = %order.side))]
    pub async fn create(&self, order: &CreateOrderRequest) -> RestResult<CreateOrderResponse> {
        order.validate().context("failed to create order")?;

        let response: CreateOrderResponse = self
            .client
            .post(&brokerage_path("/orders"), order)
            .await
            .context("failed to create order")?;

        if response.success {
            debug!(order_id = ?response.order_id, "Order created");
        } else {
            warn!(reason = ?response.failure_reason, "Order rejected");
        }
        Ok(response)
    }

    /// Edit the price or size of an open order
    #[instrument(skip(self))]
    pub async fn edit(&self, request: &EditOrderRequest) -> RestResult<EditOrderResponse> {
        self.client
            .post(&brokerage_path("/orders/edit"), request)
            .await
            .with_context(|| format!("failed to edit order '{}'", request.order_id))
    }

    /// Simulate an edit without applying it
    #[instrument(skip(self))]
    pub async fn edit_preview(&self, request: &EditOrderRequest) -> RestResult<EditOrderResponse> {
        self.client
            .post(&brokerage_path("/orders/edit_preview"), request)
            .await
            .with_context(|| format!("failed to preview edit of order '{}'", request.order_id))
    }

    /// Get one historical order
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> RestResult<Order> {
        let context = || format!("failed to fetch order '{}'", id);
        let path = resource_path("/orders/historical", id).with_context(context)?;
        let response: GetOrderResponse =
            self.client.get(&path, &()).await.with_context(context)?;
        Ok(response.order)
    }

    /// Cancel a batch of orders
    ///
    /// Results are per order; a cancel rejected for one order does not fail
    /// the call.
    #[instrument(skip(self))]
    pub async fn cancel(&self, ids: &[&str]) -> RestResult<Vec<CancelledOrder>> {
        let context = || format!("failed to cancel orders {:?}", ids);
        if ids.is_empty() {
            return Err(RestError::InvalidParameter(
                "at least one order id is required".to_string(),
            ))
            .with_context(context);
        }

        let response: CancelOrdersResponse = self
            .client
            .post(
                &brokerage_path("/orders/batch_cancel"),
                &CancelOrdersRequest { order_ids: ids },
            )
            .await
            .with_context(context)?;
        Ok(response.results)
    }

    /// List historical orders
    #[instrument(skip(self))]
    pub async fn list(&self, options: &ListOrdersOptions) -> RestResult<ListOrdersResponse> {
        self.client
            .get(&brokerage_path("/orders/historical/batch"), options)
            .await
            .context("failed to list orders")
    }

    /// List fills
    #[instrument(skip(self))]
    pub async fn list_fills(&self, options: &ListFillsOptions) -> RestResult<ListFillsResponse> {
        self.client
            .get(&brokerage_path("/orders/historical/fills"), options)
            .await
            .context("failed to list historical fills")
    }
}
