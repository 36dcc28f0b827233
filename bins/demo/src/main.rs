//! Krona ledger walkthrough.
//!
//! Wires the in-memory store, rate table, and notification dispatcher
//! together and runs a scripted session against the ledger service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use krona_core::exchange::RateTable;
use krona_core::ledger::LedgerService;
use krona_core::notify::{DepositEvent, NotificationTransport, Notifier, TransportError};
use krona_shared::AppConfig;
use krona_shared::types::{Currency, PageRequest};
use krona_store::MemoryStore;

/// Stand-in for the HTTP notification client: logs each event instead of
/// posting it.
struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn send(&self, event: &DepositEvent) -> Result<(), TransportError> {
        let payload =
            serde_json::to_string(event).map_err(|err| TransportError::new(err.to_string()))?;
        info!(%payload, "deposit notification delivered");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "krona=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    let rates = Arc::new(RateTable::from_config(&config.exchange_rates)?);
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::spawn(LogTransport, config.notification.clone());
    let service = LedgerService::new(store, rates, notifier);

    let account = service.create_account().await?;
    let id = account.account_id;
    info!(%id, "account created");

    let after_deposit = service.deposit(id, dec!(100.00), Currency::Eur).await?;
    info!(balances = %serde_json::to_string(&after_deposit)?, "after deposit");

    let after_withdraw = service.withdraw(id, dec!(30.00), Currency::Eur).await?;
    info!(balances = %serde_json::to_string(&after_withdraw)?, "after withdrawal");

    let after_exchange = service
        .exchange(id, Currency::Eur, Currency::Usd, dec!(70.00))
        .await?;
    info!(balances = %serde_json::to_string(&after_exchange)?, "after exchange");

    let history = service.transactions(id, PageRequest::default()).await?;
    info!(total = history.meta.total, "transaction history, newest first");
    for record in &history.data {
        info!(record = %serde_json::to_string(record)?, "audit record");
    }

    // Let the background dispatcher flush the deposit event before exit.
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}
