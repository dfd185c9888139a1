//! Example: list accounts and the fee tier
//!
//! Reads credentials from the environment:
//! - `COINBASE_CLOUD_API_KEY` and `COINBASE_CLOUD_PRIVATE_KEY` for cloud keys
//! - `COINBASE_API_KEY` and `COINBASE_API_SECRET` for legacy keys
//!
//! Run with: RUST_LOG=coinbase_rest=debug cargo run --example list_accounts

use coinbase_rest::endpoints::fees::TransactionSummaryOptions;
use coinbase_rest::{ListAccountsOptions, RestClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Coinbase Accounts Example ===\n");

    let client = RestClient::from_env()?;

    let time = client.public().get_server_time().await?;
    println!("Server time: {}\n", time.iso.as_deref().unwrap_or("unknown"));

    // Walk every page
    let mut options = ListAccountsOptions {
        limit: Some(50),
        cursor: None,
    };
    loop {
        let page = client.accounts().list(&options).await?;
        for account in &page.accounts {
            println!(
                "{:<8} available {:>20} hold {:>20}",
                account.currency.as_deref().unwrap_or("?"),
                account.available_balance.value,
                account.hold.value
            );
        }

        if !page.has_next {
            break;
        }
        options.cursor = page.cursor;
    }

    match client
        .fees()
        .get_transaction_summary(&TransactionSummaryOptions::default())
        .await
    {
        Ok(summary) => println!(
            "\nFee tier: {} (maker {}, taker {})",
            summary.fee_tier.pricing_tier.as_deref().unwrap_or("?"),
            summary.fee_tier.maker_fee_rate.as_deref().unwrap_or("?"),
            summary.fee_tier.taker_fee_rate.as_deref().unwrap_or("?"),
        ),
        Err(e) if e.is_rate_limited() => eprintln!("Rate limited, try again later"),
        Err(e) => eprintln!("Failed to fetch fees: {}", e),
    }

    Ok(())
}
