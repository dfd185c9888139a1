//! Fee endpoints

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::client::RestClient;
use crate::endpoints::brokerage_path;
use crate::error::{RestResult, ResultExt};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::{parse_opt_decimal, ContractExpiryType, ProductType};

/// Filters for the transaction summary
#[derive(Debug, Clone, Default)]
pub struct TransactionSummaryOptions {
    pub product_type: Option<ProductType>,
    pub contract_expiry_type: Option<ContractExpiryType>,
}

impl QueryParams for TransactionSummaryOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("product_type", self.product_type.as_ref())
            .opt("contract_expiry_type", self.contract_expiry_type.as_ref())
            .build()
    }
}

/// Pricing tier, determined by notional volume
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeeTier {
    pub pricing_tier: Option<String>,
    /// Inclusive lower bound, USD
    pub usd_from: Option<String>,
    /// Exclusive upper bound, USD
    pub usd_to: Option<String>,
    pub taker_fee_rate: Option<String>,
    pub maker_fee_rate: Option<String>,
    /// Inclusive lower bound of assets on platform, USD
    pub aop_from: Option<String>,
    /// Exclusive upper bound of assets on platform, USD
    pub aop_to: Option<String>,
}

impl FeeTier {
    pub fn taker_fee_rate(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.taker_fee_rate)
    }

    pub fn maker_fee_rate(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.maker_fee_rate)
    }
}

/// Goods and services tax applied to fees
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoodsAndServicesTax {
    pub rate: Option<String>,
    /// INCLUSIVE or EXCLUSIVE
    #[serde(rename = "type")]
    pub tax_type: Option<String>,
}

/// Volume and fee totals for the current user
///
/// Totals arrive as JSON numbers or strings and both decode to [`Decimal`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionSummary {
    /// Total volume across assets, USD
    pub total_volume: Decimal,
    /// Total fees across assets, USD
    pub total_fees: Decimal,
    pub fee_tier: FeeTier,
    pub goods_and_services_tax: Option<GoodsAndServicesTax>,
    pub advanced_trade_only_volume: Option<Decimal>,
    pub advanced_trade_only_fees: Option<Decimal>,
    pub coinbase_pro_volume: Option<Decimal>,
    pub coinbase_pro_fees: Option<Decimal>,
}

/// Fee endpoints
pub struct FeeEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> FeeEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Get the fee tier and trading totals
    #[instrument(skip(self))]
    pub async fn get_transaction_summary(
        &self,
        options: &TransactionSummaryOptions,
    ) -> RestResult<TransactionSummary> {
        self.client
            .get(&brokerage_path("/transaction_summary"), options)
            .await
            .context("failed to fetch transaction summary")
    }
}
