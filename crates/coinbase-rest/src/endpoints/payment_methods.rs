//! Payment method endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestResult, ResultExt};

/// A funding source attached to the account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub name: String,
    pub currency: String,
    pub verified: bool,
    pub allow_buy: bool,
    pub allow_sell: bool,
    pub allow_deposit: bool,
    pub allow_withdraw: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ListPaymentMethodsResponse {
    #[serde(default)]
    payment_methods: Vec<PaymentMethod>,
}

#[derive(Deserialize)]
struct GetPaymentMethodResponse {
    payment_method: PaymentMethod,
}

/// Payment method endpoints
pub struct PaymentMethodEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> PaymentMethodEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> RestResult<Vec<PaymentMethod>> {
        let response: ListPaymentMethodsResponse = self
            .client
            .get(&brokerage_path("/payment_methods"), &())
            .await
            .context("failed to list payment methods")?;
        Ok(response.payment_methods)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> RestResult<PaymentMethod> {
        let context = || format!("failed to get payment method '{}'", id);
        let path = resource_path("/payment_methods", id).with_context(context)?;
        let response: GetPaymentMethodResponse =
            self.client.get(&path, &()).await.with_context(context)?;
        Ok(response.payment_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::mock_client;

    const BANK: &str = r#"{"id":"pm-1","type":"ACH","name":"Checking","currency":"USD","verified":true,"allow_buy":true,"allow_sell":true,"allow_deposit":true,"allow_withdraw":false,"created_at":"2023-01-02T03:04:05Z","updated_at":"2023-06-02T03:04:05Z"}"#;

    #[tokio::test]
    async fn test_list() {
        let (client, transport) = mock_client();
        transport.push_ok(format!(r#"{{"payment_methods":[{}]}}"#, BANK));

        let methods = client.payment_methods().list().await.unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].method_type, "ACH");
        assert!(!methods[0].allow_withdraw);
        assert_eq!(
            transport.last_request().unwrap().path(),
            "/api/v3/brokerage/payment_methods"
        );
    }

    #[tokio::test]
    async fn test_get() {
        let (client, transport) = mock_client();
        transport.push_ok(format!(r#"{{"payment_method":{}}}"#, BANK));

        let method = client.payment_methods().get("pm-1").await.unwrap();
        assert_eq!(method.name, "Checking");
        assert_eq!(method.created_at.unwrap().timestamp(), 1_672_628_645);
        assert_eq!(
            transport.last_request().unwrap().path(),
            "/api/v3/brokerage/payment_methods/pm-1"
        );
    }

    #[tokio::test]
    async fn test_get_error_names_id() {
        let (client, transport) = mock_client();
        transport.push_response(404, r#"{"error":"NOT_FOUND","message":"no such method"}"#);

        let err = client.payment_methods().get("pm-9").await.unwrap_err();
        assert!(err.to_string().contains("pm-9"));
        assert_eq!(err.status_code(), Some(reqwest::StatusCode::NOT_FOUND));
    }
}
