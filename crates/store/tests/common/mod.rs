//! Shared fixtures for the integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use krona_core::exchange::RateTable;
use krona_core::ledger::LedgerService;
use krona_core::notify::{DepositEvent, NotificationTransport, Notifier, TransportError};
use krona_shared::config::NotificationConfig;
use krona_store::MemoryStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Transport that accepts everything. The flows under test only care that
/// notification dispatch never interferes with the ledger.
pub struct NullTransport;

#[async_trait]
impl NotificationTransport for NullTransport {
    async fn send(&self, _event: &DepositEvent) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Rate table used across the flow tests. RUB pairs are deliberately absent.
pub fn test_rates() -> RateTable {
    let raw: HashMap<String, Decimal> = [
        ("EUR_USD", dec!(1.08)),
        ("USD_EUR", dec!(0.93)),
        ("EUR_SEK", dec!(11.30)),
        ("SEK_EUR", dec!(0.088)),
    ]
    .into_iter()
    .map(|(key, rate)| (key.to_string(), rate))
    .collect();
    RateTable::from_config(&raw).unwrap()
}

/// A fully wired service over a fresh in-memory store.
pub fn test_service() -> Arc<LedgerService<MemoryStore>> {
    let store = Arc::new(MemoryStore::new());
    let rates = Arc::new(test_rates());
    let notifier = Notifier::spawn(NullTransport, NotificationConfig::default());
    Arc::new(LedgerService::new(store, rates, notifier))
}
