//! Public market data endpoints
//!
//! These mirror the product endpoints under `/market` and are served with
//! lower latency. The client still authenticates them when configured to.

use tracing::{debug, instrument};

use crate::client::RestClient;
use crate::endpoints::products::{
    candles_path, CandlesOptions, CandlesResponse, ListProductsOptions, ListProductsResponse,
    MarketTradesOptions, ProductBookOptions, ProductBookResponse,
};
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestError, RestResult, ResultExt};
use crate::types::{Candle, MarketTrades, PriceBook, Product, ServerTime};

/// Public endpoints
pub struct PublicEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> PublicEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Get the exchange's clock
    #[instrument(skip(self))]
    pub async fn get_server_time(&self) -> RestResult<ServerTime> {
        let time: ServerTime = self
            .client
            .get(&brokerage_path("/time"), &())
            .await
            .context("failed to get server time")?;

        debug!(epoch_millis = ?time.epoch_millis, "Fetched server time");
        Ok(time)
    }

    /// List products
    #[instrument(skip(self))]
    pub async fn list_products(&self, options: &ListProductsOptions) -> RestResult<Vec<Product>> {
        let response: ListProductsResponse = self
            .client
            .get(&brokerage_path("/market/products"), options)
            .await
            .context("failed to list public products")?;
        Ok(response.products)
    }

    /// Get one product
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> RestResult<Product> {
        let context = || format!("failed to fetch public product '{}'", id);
        let path = resource_path("/market/products", id).with_context(context)?;
        self.client.get(&path, &()).await.with_context(context)
    }

    /// Get the order book of one product
    #[instrument(skip(self))]
    pub async fn get_product_book(&self, options: &ProductBookOptions) -> RestResult<PriceBook> {
        let context = || {
            format!(
                "failed to fetch public product book for product '{}'",
                options.product_id
            )
        };
        if options.product_id.is_empty() {
            return Err(RestError::InvalidParameter("product_id is empty".to_string()))
                .with_context(context);
        }

        let response: ProductBookResponse = self
            .client
            .get(&brokerage_path("/market/product_book"), options)
            .await
            .with_context(context)?;
        Ok(response.pricebook)
    }

    /// Get candles for one product
    #[instrument(skip(self))]
    pub async fn get_candles(&self, options: &CandlesOptions) -> RestResult<Vec<Candle>> {
        let context = || {
            format!(
                "failed to fetch public candles for product '{}'",
                options.product_id
            )
        };
        let path = candles_path("/market/products", options).with_context(context)?;
        let response: CandlesResponse =
            self.client.get(&path, options).await.with_context(context)?;
        Ok(response.candles)
    }

    /// Get recent trades for one product
    #[instrument(skip(self))]
    pub async fn get_market_trades(&self, options: &MarketTradesOptions) -> RestResult<MarketTrades> {
        let context = || {
            format!(
                "failed to fetch public market trades for product '{}'",
                options.product_id
            )
        };
        let path = resource_path("/market/products", &options.product_id)
            .map(|p| format!("{}/ticker", p))
            .with_context(context)?;
        self.client.get(&path, options).await.with_context(context)
    }
}
