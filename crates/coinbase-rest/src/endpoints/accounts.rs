//! Account endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::RestClient;
use crate::endpoints::{brokerage_path, resource_path};
use crate::error::{RestResult, ResultExt};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::{wire_enum, Funds};

wire_enum! {
    /// Account type
    pub enum AccountType {
        Unspecified => "UNSPECIFIED",
        Crypto => "ACCOUNT_TYPE_CRYPTO",
        Fiat => "ACCOUNT_TYPE_FIAT",
        Vault => "ACCOUNT_TYPE_VAULT",
    }
}

/// A wallet for one currency
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    pub uuid: Option<Uuid>,
    pub name: Option<String>,
    /// Currency symbol
    pub currency: Option<String>,
    pub available_balance: Funds,
    /// Whether this is the user's primary account
    pub default: Option<bool>,
    pub active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Whether the account is ready to trade
    pub ready: Option<bool>,
    pub hold: Funds,
}

/// Options for listing accounts
#[derive(Debug, Clone, Default)]
pub struct ListAccountsOptions {
    /// Page size
    pub limit: Option<i32>,
    /// Pagination cursor from a previous page
    pub cursor: Option<String>,
}

impl QueryParams for ListAccountsOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        QueryBuilder::new()
            .opt("limit", self.limit)
            .opt("cursor", self.cursor.as_deref())
            .build()
    }
}

/// One page of accounts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListAccountsResponse {
    pub accounts: Vec<Account>,
    pub has_next: bool,
    pub cursor: Option<String>,
    pub size: Option<i32>,
}

#[derive(Deserialize)]
struct GetAccountResponse {
    account: Account,
}

/// Account endpoints
pub struct AccountEndpoints<'a> {
    client: &'a RestClient,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// List the authenticated user's accounts
    #[instrument(skip(self))]
    pub async fn list(&self, options: &ListAccountsOptions) -> RestResult<ListAccountsResponse> {
        let response: ListAccountsResponse = self
            .client
            .get(&brokerage_path("/accounts"), options)
            .await
            .context("failed to list accounts for the current user")?;

        debug!(count = response.accounts.len(), has_next = response.has_next, "Listed accounts");
        Ok(response)
    }

    /// Get one account by id
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> RestResult<Account> {
        let context = || format!("failed to fetch account '{}'", id);
        let path = resource_path("/accounts", id).with_context(context)?;
        let response: GetAccountResponse =
            self.client.get(&path, &()).await.with_context(context)?;

        Ok(response.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::mock_client;
    use rust_decimal_macros::dec;

    const ACCOUNTS_PAGE: &str = r#"{
        "accounts": [{
            "uuid": "8bfc20d7-f7c6-4422-bf07-8243ca4169fe",
            "name": "BTC Wallet",
            "currency": "BTC",
            "available_balance": {"value": "1.23", "currency": "BTC"},
            "default": false,
            "active": true,
            "created_at": "2021-05-31T09:59:59Z",
            "type": "ACCOUNT_TYPE_CRYPTO",
            "ready": true,
            "hold": {"value": "0.10", "currency": "BTC"}
        }],
        "has_next": true,
        "cursor": "789100",
        "size": 1
    }"#;

    #[tokio::test]
    async fn test_list_accounts() {
        let (client, transport) = mock_client();
        transport.push_ok(ACCOUNTS_PAGE);

        let options = ListAccountsOptions {
            limit: Some(1),
            cursor: None,
        };
        let page = client.accounts().list(&options).await.unwrap();

        assert!(page.has_next);
        assert_eq!(page.cursor.as_deref(), Some("789100"));
        let account = &page.accounts[0];
        assert_eq!(account.account_type, Some(AccountType::Crypto));
        assert_eq!(account.available_balance.amount(), Some(dec!(1.23)));

        let request = transport.last_request().unwrap();
        assert_eq!(request.path(), "/api/v3/brokerage/accounts");
        assert_eq!(request.url().query(), Some("limit=1"));
    }

    #[tokio::test]
    async fn test_get_account() {
        let (client, transport) = mock_client();
        transport.push_ok(
            r#"{"account":{"uuid":"8bfc20d7-f7c6-4422-bf07-8243ca4169fe","currency":"USD"}}"#,
        );

        let account = client
            .accounts()
            .get("8bfc20d7-f7c6-4422-bf07-8243ca4169fe")
            .await
            .unwrap();
        assert_eq!(account.currency.as_deref(), Some("USD"));
        assert_eq!(
            transport.last_request().unwrap().path(),
            "/api/v3/brokerage/accounts/8bfc20d7-f7c6-4422-bf07-8243ca4169fe"
        );
    }

    #[tokio::test]
    async fn test_get_account_error_names_id() {
        let (client, transport) = mock_client();
        transport.push_response(
            404,
            r#"{"error":"NOT_FOUND","code":5,"message":"account not found"}"#,
        );

        let err = client.accounts().get("missing").await.unwrap_err();
        assert!(err.to_string().contains("'missing'"));
        assert_eq!(err.api_error().unwrap().message(), "account not found");
    }

    #[tokio::test]
    async fn test_get_account_empty_id() {
        let (client, transport) = mock_client();
        assert!(client.accounts().get("").await.is_err());
        assert!(transport.requests().is_empty());
    }
}
