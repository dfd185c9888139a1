//! Portfolio endpoints

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestResult, ResultExt};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::{wire_enum, Funds};

wire_enum! {
    /// Kind of portfolio
    pub enum PortfolioType {
        Undefined => "UNDEFINED",
        Default => "DEFAULT",
        Consumer => "CONSUMER",
        Intx => "INTX",
    }
}

wire_enum! {
    /// Side of a perpetuals position
    pub enum FuturesPositionSide {
        Unspecified => "FUTURES_POSITION_SIDE_UNSPECIFIED",
        Long => "FUTURES_POSITION_SIDE_LONG",
        Short => "FUTURES_POSITION_SIDE_SHORT",
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub name: Option<String>,
    pub uuid: Option<Uuid>,
    #[serde(rename = "type")]
    pub portfolio_type: Option<PortfolioType>,
    pub deleted: Option<bool>,
}

/// Filters for listing portfolios
#[derive(Debug, Clone, Default)]
pub struct ListPortfoliosOptions {
    pub portfolio_type: Option<PortfolioType>,
}

impl QueryParams for ListPortfoliosOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("portfolio_type", self.portfolio_type.as_ref())
            .build()
    }
}

#[derive(Deserialize)]
struct ListPortfoliosResponse {
    #[serde(default)]
    portfolios: Vec<Portfolio>,
}

#[derive(Deserialize)]
struct PortfolioResponse {
    portfolio: Portfolio,
}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

/// Changes applied by [`PortfolioEndpoints::edit`]
#[derive(Debug, Clone, Serialize)]
pub struct EditPortfolioOptions {
    pub name: String,
}

/// Balance totals for one portfolio
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioBalances {
    pub total_balance: Funds,
    pub total_futures_balance: Funds,
    pub total_cash_equivalent_balance: Funds,
    pub total_crypto_balance: Funds,
    pub futures_unrealized_pnl: Funds,
    pub perp_unrealized_pnl: Funds,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpotPosition {
    pub asset: Option<String>,
    pub account_uuid: Option<Uuid>,
    pub total_balance_fiat: Option<f64>,
    pub total_balance_crypto: Option<f64>,
    pub available_to_trade_fiat: Option<f64>,
    /// Share of the portfolio, 0 to 1
    pub allocation: Option<f64>,
    pub one_day_change: Option<f64>,
    pub cost_basis: Funds,
    #[serde(rename = "asset_img_url")]
    pub asset_image_url: Option<String>,
    pub is_cash: Option<bool>,
}

/// An amount in the user's native currency and in the raw currency
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Currency {
    #[serde(rename = "userNativeCurrency")]
    pub user_native_currency: Funds,
    #[serde(rename = "rawCurrency")]
    pub raw_currency: Funds,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerpPosition {
    pub product_id: Option<String>,
    pub product_uuid: Option<Uuid>,
    pub symbol: Option<String>,
    #[serde(rename = "asset_img_url")]
    pub asset_image_url: Option<String>,
    pub vwap: Option<Currency>,
    pub position_side: Option<FuturesPositionSide>,
    pub net_size: Option<String>,
    pub buy_order_size: Option<String>,
    pub sell_order_size: Option<String>,
    pub im_contribution: Option<String>,
    pub unrealized_pnl: Option<Currency>,
    pub mark_price: Option<Currency>,
    pub liquidation_price: Option<Currency>,
    pub leverage: Option<String>,
    pub im_notional: Option<Currency>,
    pub mm_notional: Option<Currency>,
    pub position_notional: Option<Currency>,
}

/// Balances and positions of one portfolio
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioBreakdown {
    pub portfolio: Option<Portfolio>,
    #[serde(rename = "portfolio_balances")]
    pub balances: Option<PortfolioBalances>,
    pub spot_positions: Vec<SpotPosition>,
    pub perp_positions: Vec<PerpPosition>,
}

#[derive(Deserialize)]
struct BreakdownResponse {
    breakdown: PortfolioBreakdown,
}

/// Transfer between two portfolios
#[derive(Debug, Clone, Serialize)]
pub struct MoveFundsRequest {
    pub funds: Funds,
    pub source_portfolio_uuid: Uuid,
    pub target_portfolio_uuid: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoveFundsResponse {
    pub source_portfolio_uuid: Option<Uuid>,
    pub target_portfolio_uuid: Option<Uuid>,
}

/// Funds for an isolated perpetuals position
#[derive(Debug, Clone, Serialize)]
pub struct AllocateRequest {
    /// The perpetuals portfolio
    pub portfolio_uuid: Uuid,
    /// Product id of the position
    pub symbol: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Portfolio endpoints
pub struct PortfolioEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> PortfolioEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// List portfolios
    #[instrument(skip(self))]
    pub async fn list(&self, options: &ListPortfoliosOptions) -> RestResult<Vec<Portfolio>> {
        let response: ListPortfoliosResponse = self
            .client
            .get(&brokerage_path("/portfolios"), options)
            .await
            .context("failed to list portfolios")?;
        Ok(response.portfolios)
    }

    /// Create a portfolio
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> RestResult<Portfolio> {
        let response: PortfolioResponse = self
            .client
            .post(&brokerage_path("/portfolios"), &NameRequest { name })
            .await
            .with_context(|| format!("failed to create portfolio '{}'", name))?;

        info!(uuid = ?response.portfolio.uuid, "Created portfolio");
        Ok(response.portfolio)
    }

    /// Rename a portfolio
    #[instrument(skip(self))]
    pub async fn edit(&self, id: &Uuid, options: &EditPortfolioOptions) -> RestResult<Portfolio> {
        let context = || format!("failed to edit portfolio '{}'", id);
        let path = resource_path("/portfolios", &id.to_string()).with_context(context)?;
        self.client.put(&path, options).await.with_context(context)
    }

    /// Delete a portfolio
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &Uuid) -> RestResult<()> {
        let context = || format!("failed to delete portfolio '{}'", id);
        let path = resource_path("/portfolios", &id.to_string()).with_context(context)?;
        let _: IgnoredAny = self.client.delete(&path).await.with_context(context)?;

        info!(%id, "Deleted portfolio");
        Ok(())
    }

    /// Get balances and positions of a portfolio
    #[instrument(skip(self))]
    pub async fn get_breakdown(&self, id: &str) -> RestResult<PortfolioBreakdown> {
        let context = || format!("failed to get portfolio breakdown for '{}'", id);
        let path = resource_path("/portfolios", id).with_context(context)?;
        let response: BreakdownResponse =
            self.client.get(&path, &()).await.with_context(context)?;
        Ok(response.breakdown)
    }

    /// Move funds between portfolios
    #[instrument(skip(self))]
    pub async fn move_funds(&self, request: &MoveFundsRequest) -> RestResult<MoveFundsResponse> {
        self.client
            .post(&brokerage_path("/portfolios/move_funds"), request)
            .await
            .context("failed to move portfolio funds")
    }

    /// Allocate funds to an isolated perpetuals position
    #[instrument(skip(self))]
    pub async fn allocate(&self, request: &AllocateRequest) -> RestResult<()> {
        let _: IgnoredAny = self
            .client
            .post(&brokerage_path("/intx/allocate"), request)
            .await
            .context("failed to allocate portfolio")?;
        Ok(())
    }
}
