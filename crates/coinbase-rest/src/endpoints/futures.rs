//! Futures (CFM) endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestResult, ResultExt};
use crate::types::{parse_opt_decimal, wire_enum, Funds};

wire_enum! {
    /// Side of a futures position
    pub enum FuturesSide {
        Unknown => "UNKNOWN",
        Long => "LONG",
        Short => "SHORT",
    }
}

wire_enum! {
    /// Sweep state
    pub enum SweepStatus {
        Unknown => "UNKNOWN_FCM_SWEEP_STATUS",
        /// Not yet processing; can still be cancelled
        Pending => "PENDING",
        /// Being processed; cannot be cancelled
        Processing => "PROCESSING",
    }
}

/// Futures account balances
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BalanceSummary {
    /// Cash available to trade CFM futures
    pub futures_buying_power: Funds,
    /// USD across the futures account and the spot account
    #[serde(rename = "total_usd_balance")]
    pub total_balance: Funds,
    /// USD in the spot account
    #[serde(rename = "cbi_usd_balance")]
    pub cbi_balance: Funds,
    /// USD in the futures account
    #[serde(rename = "cfm_usd_balance")]
    pub cfm_balance: Funds,
    pub total_open_orders_hold_amount: Funds,
    pub unrealized_pnl: Funds,
    pub daily_realized_pnl: Funds,
    pub initial_margin: Funds,
    pub available_margin: Funds,
    /// Positions are liquidated when available margin drops to this level
    pub liquidation_threshold: Funds,
    pub liquidation_buffer_amount: Funds,
    pub liquidation_buffer_percentage: Funds,
}

#[derive(Deserialize)]
struct BalanceSummaryResponse {
    balance_summary: BalanceSummary,
}

/// An open futures position
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuturesPosition {
    pub product_id: Option<String>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub side: Option<FuturesSide>,
    /// Position size in contracts
    pub number_of_contracts: Option<String>,
    pub current_price: Option<String>,
    pub avg_entry_price: Option<String>,
    pub unrealized_pnl: Option<String>,
    /// Realized PnL for the current trade date
    pub daily_realized_pnl: Option<String>,
}

impl FuturesPosition {
    pub fn number_of_contracts(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.number_of_contracts)
    }

    pub fn unrealized_pnl(&self) -> Option<Decimal> {
        parse_opt_decimal(&self.unrealized_pnl)
    }
}

#[derive(Deserialize)]
struct ListPositionsResponse {
    #[serde(default)]
    positions: Vec<FuturesPosition>,
}

#[derive(Deserialize)]
struct GetPositionResponse {
    position: FuturesPosition,
}

/// A sweep from the futures account to the spot account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuturesSweep {
    pub id: Option<String>,
    pub requested_amount: Funds,
    /// Whether all available funds were requested
    pub should_sweep_all: Option<bool>,
    pub status: Option<SweepStatus>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ListSweepsResponse {
    #[serde(default)]
    sweeps: Vec<FuturesSweep>,
}

/// Sweep request
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleSweepRequest {
    /// USD to move to the spot account; unset sweeps all excess funds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_amount: Option<Decimal>,
}

#[derive(Deserialize)]
struct SuccessResponse {
    #[serde(default)]
    success: bool,
}

/// Futures endpoints
pub struct FuturesEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> FuturesEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Get futures balances and margin
    #[instrument(skip(self))]
    pub async fn get_balance_summary(&self) -> RestResult<BalanceSummary> {
        let response: BalanceSummaryResponse = self
            .client
            .get(&brokerage_path("/cfm/balance_summary"), &())
            .await
            .context("failed to get futures balance summary")?;
        Ok(response.balance_summary)
    }

    /// List open positions
    #[instrument(skip(self))]
    pub async fn list_positions(&self) -> RestResult<Vec<FuturesPosition>> {
        let response: ListPositionsResponse = self
            .client
            .get(&brokerage_path("/cfm/positions"), &())
            .await
            .context("failed to list futures positions")?;
        Ok(response.positions)
    }

    /// Get the position for one product
    #[instrument(skip(self))]
    pub async fn get_position(&self, product_id: &str) -> RestResult<FuturesPosition> {
        let context = || format!("failed to get futures position '{}'", product_id);
        let path = resource_path("/cfm/positions", product_id).with_context(context)?;
        let response: GetPositionResponse =
            self.client.get(&path, &()).await.with_context(context)?;
        Ok(response.position)
    }

    /// List pending and processing sweeps
    #[instrument(skip(self))]
    pub async fn list_sweeps(&self) -> RestResult<Vec<FuturesSweep>> {
        let response: ListSweepsResponse = self
            .client
            .get(&brokerage_path("/cfm/sweeps"), &())
            .await
            .context("failed to list futures sweeps")?;
        Ok(response.sweeps)
    }

    /// Schedule a sweep to the spot account
    ///
    /// Returns whether the sweep was accepted.
    #[instrument(skip(self))]
    pub async fn schedule_sweep(&self, request: &ScheduleSweepRequest) -> RestResult<bool> {
        let response: SuccessResponse = self
            .client
            .post(&brokerage_path("/cfm/sweeps/schedule"), request)
            .await
            .context("failed to schedule futures sweep")?;

        info!(success = response.success, "Scheduled futures sweep");
        Ok(response.success)
    }

    /// Cancel the pending sweep
    ///
    /// Returns whether a sweep was cancelled.
    #[instrument(skip(self))]
    pub async fn cancel_pending_sweep(&self) -> RestResult<bool> {
        let response: SuccessResponse = self
            .client
            .delete(&brokerage_path("/cfm/sweeps"))
            .await
            .context("failed to cancel pending futures sweep")?;
        Ok(response.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::mock_client;
    use coinbase_auth::Method;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_balance_summary() {
        let (client, transport) = mock_client();
        transport.push_ok(
            r#"{"balance_summary":{"futures_buying_power":{"value":"1000","currency":"USD"},"total_usd_balance":{"value":"2500.50","currency":"USD"},"liquidation_buffer_percentage":{"value":"85","currency":"USD"}}}"#,
        );

        let summary = client.futures().get_balance_summary().await.unwrap();
        assert_eq!(summary.total_balance.amount(), Some(dec!(2500.50)));
        assert_eq!(summary.futures_buying_power.currency, "USD");
        assert_eq!(
            transport.last_request().unwrap().path(),
            "/api/v3/brokerage/cfm/balance_summary"
        );
    }

    #[tokio::test]
    async fn test_positions() {
        let (client, transport) = mock_client();
        transport.push_ok(
            r#"{"positions":[{"product_id":"BIT-28JUL23-CDE","side":"LONG","number_of_contracts":"2","unrealized_pnl":"-12.5"}]}"#,
        );
        transport.push_ok(r#"{"position":{"product_id":"BIT-28JUL23-CDE","side":"SHORT"}}"#);

        let positions = client.futures().list_positions().await.unwrap();
        assert_eq!(positions[0].side, Some(FuturesSide::Long));
        assert_eq!(positions[0].unrealized_pnl(), Some(dec!(-12.5)));

        let position = client.futures().get_position("BIT-28JUL23-CDE").await.unwrap();
        assert_eq!(position.side, Some(FuturesSide::Short));
        assert_eq!(
            transport.last_request().unwrap().path(),
            "/api/v3/brokerage/cfm/positions/BIT-28JUL23-CDE"
        );
    }

    #[tokio::test]
    async fn test_sweeps() {
        let (client, transport) = mock_client();
        transport.push_ok(
            r#"{"sweeps":[{"id":"s1","requested_amount":{"value":"10","currency":"USD"},"should_sweep_all":false,"status":"PENDING","scheduled_time":"2023-11-14T22:13:20Z"}]}"#,
        );
        transport.push_ok(r#"{"success":true}"#);
        transport.push_ok(r#"{"success":true}"#);

        let sweeps = client.futures().list_sweeps().await.unwrap();
        assert_eq!(sweeps[0].status, Some(SweepStatus::Pending));

        let request = ScheduleSweepRequest {
            usd_amount: Some(dec!(10)),
        };
        assert!(client.futures().schedule_sweep(&request).await.unwrap());
        assert!(client.futures().cancel_pending_sweep().await.unwrap());

        let requests = transport.requests();
        assert_eq!(requests[1].path(), "/api/v3/brokerage/cfm/sweeps/schedule");
        assert_eq!(requests[1].body(), Some(&br#"{"usd_amount":"10"}"#[..]));
        assert_eq!(requests[2].method(), Method::DELETE);
        assert_eq!(requests[2].path(), "/api/v3/brokerage/cfm/sweeps");
        assert!(requests[2].body().is_none());
    }

    #[test]
    fn test_sweep_all_body() {
        let body = serde_json::to_string(&ScheduleSweepRequest::default()).unwrap();
        assert_eq!(body, "{}");
    }
}
