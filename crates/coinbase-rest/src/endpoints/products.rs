//! Product and market data endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestError, RestResult, ResultExt};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::{
    Candle, ContractExpiryType, ExpiringContractStatus, Granularity, MarketTrades, PriceBook,
    Product, ProductType,
};

/// Options for listing products
#[derive(Debug, Clone, Default)]
pub struct ListProductsOptions {
    pub limit: Option<i32>,
    /// Number of products to skip
    pub offset: Option<i32>,
    pub product_type: Option<ProductType>,
    pub product_ids: Vec<String>,
    pub contract_expiry_type: Option<ContractExpiryType>,
    pub expiring_contract_status: Option<ExpiringContractStatus>,
}

impl QueryParams for ListProductsOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("limit", self.limit)
            .opt("offset", self.offset)
            .opt("product_type", self.product_type.as_ref())
            .many("product_ids", &self.product_ids)
            .opt("contract_expiry_type", self.contract_expiry_type.as_ref())
            .opt(
                "expiring_contract_status",
                self.expiring_contract_status.as_ref(),
            )
            .build()
    }
}

/// Options for a product book
#[derive(Debug, Clone, Default)]
pub struct ProductBookOptions {
    pub product_id: String,
    /// Number of levels per side
    pub limit: Option<u32>,
}

impl ProductBookOptions {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl QueryParams for ProductBookOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .push("product_id", &self.product_id)
            .opt("limit", self.limit)
            .build()
    }
}

/// Options for candles
///
/// The product id goes in the path; the time range is sent as unix seconds.
#[derive(Debug, Clone)]
pub struct CandlesOptions {
    pub product_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

impl QueryParams for CandlesOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .push("start", self.start.timestamp())
            .push("end", self.end.timestamp())
            .push("granularity", &self.granularity)
            .build()
    }
}

/// Options for recent trades
#[derive(Debug, Clone)]
pub struct MarketTradesOptions {
    pub product_id: String,
    /// Number of trades to return
    pub limit: u32,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl MarketTradesOptions {
    pub fn new(product_id: impl Into<String>, limit: u32) -> Self {
        Self {
            product_id: product_id.into(),
            limit,
            start: None,
            end: None,
        }
    }
}

impl QueryParams for MarketTradesOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .push("limit", self.limit)
            .opt_unix("start", self.start)
            .opt_unix("end", self.end)
            .build()
    }
}

#[derive(Deserialize)]
pub(crate) struct ListProductsResponse {
    #[serde(default)]
    pub(crate) products: Vec<Product>,
}

#[derive(Deserialize)]
pub(crate) struct ProductBookResponse {
    pub(crate) pricebook: PriceBook,
}

/// Best bid and ask per product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BestBidAsk {
    pub pricebooks: Vec<PriceBook>,
}

#[derive(Deserialize)]
pub(crate) struct CandlesResponse {
    #[serde(default)]
    pub(crate) candles: Vec<Candle>,
}

/// Product endpoints
pub struct ProductEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> ProductEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// List tradable products
    #[instrument(skip(self))]
    pub async fn list(&self, options: &ListProductsOptions) -> RestResult<Vec<Product>> {
        let response: ListProductsResponse = self
            .client
            .get(&brokerage_path("/products"), options)
            .await
            .context("failed to list products")?;
        Ok(response.products)
    }

    /// Get one product
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> RestResult<Product> {
        let context = || format!("failed to fetch product '{}'", id);
        let path = resource_path("/products", id).with_context(context)?;
        self.client.get(&path, &()).await.with_context(context)
    }

    /// Get the order book of one product
    #[instrument(skip(self))]
    pub async fn get_product_book(&self, id: &str, limit: Option<u32>) -> RestResult<PriceBook> {
        let context = || format!("failed to fetch product book for product '{}'", id);
        let options = ProductBookOptions {
            product_id: id.to_string(),
            limit,
        };
        let response: ProductBookResponse = self
            .client
            .get(&brokerage_path("/product_book"), &options)
            .await
            .with_context(context)?;
        Ok(response.pricebook)
    }

    /// Get the best bid and ask for the given products, or all when empty
    #[instrument(skip(self))]
    pub async fn get_best_bid_ask(&self, ids: &[&str]) -> RestResult<BestBidAsk> {
        let query = QueryBuilder::new().many("product_ids", ids).build();
        self.client
            .get(&brokerage_path("/best_bid_ask"), &StaticQuery(query))
            .await
            .with_context(|| format!("failed to fetch best bid/ask for products {:?}", ids))
    }

    /// Get candles for one product
    #[instrument(skip(self))]
    pub async fn get_candles(&self, options: &CandlesOptions) -> RestResult<Vec<Candle>> {
        let context = || {
            format!(
                "failed to fetch candles for product '{}'",
                options.product_id
            )
        };
        let path = candles_path("/products", options).with_context(context)?;
        let response: CandlesResponse =
            self.client.get(&path, options).await.with_context(context)?;
        Ok(response.candles)
    }

    /// Get recent trades for one product
    #[instrument(skip(self))]
    pub async fn get_market_trades(&self, options: &MarketTradesOptions) -> RestResult<MarketTrades> {
        let context = || {
            format!(
                "failed to fetch market trades for product '{}'",
                options.product_id
            )
        };
        let path = resource_path("/products", &options.product_id)
            .map(|p| format!("{}/ticker", p))
            .with_context(context)?;
        self.client.get(&path, options).await.with_context(context)
    }
}

/// Pre-built query pairs
pub(crate) struct StaticQuery(pub(crate) Vec<(&'static str, String)>);

impl QueryParams for StaticQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.0.clone()
    }
}

pub(crate) fn candles_path(segment: &str, options: &CandlesOptions) -> RestResult<String> {
    if options.start > options.end {
        return Err(RestError::InvalidParameter(format!(
            "candle range starts after it ends: {} > {}",
            options.start, options.end
        )));
    }
    resource_path(segment, &options.product_id).map(|p| format!("{}/candles", p))
}
