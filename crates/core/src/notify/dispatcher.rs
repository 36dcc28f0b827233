//! Bounded background dispatcher for deposit notifications.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use krona_shared::config::NotificationConfig;
use krona_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use super::breaker::CircuitBreaker;

/// Event type tag sent to the notification service for deposits.
const DEPOSIT_EVENT_TYPE: &str = "DEPOSIT";

/// A notification about a successful deposit commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// The credited account.
    pub account_id: AccountId,
    /// Decimal-formatted amount, e.g. "100.00".
    pub amount: String,
    /// ISO currency code of the deposit.
    pub currency: Currency,
    /// Event type tag, always "DEPOSIT" for now.
    pub event_type: String,
}

/// Failure reported by a notification transport.
#[derive(Debug, Clone, Error)]
#[error("notification transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Creates a transport error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The outbound side of the notification integration. The HTTP client lives
/// in the adapter layer; the core only needs this seam.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Delivers one event. Expected to fail often; the dispatcher retries.
    async fn send(&self, event: &DepositEvent) -> Result<(), TransportError>;
}

#[derive(Clone)]
struct DeliveryPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

/// Handle for enqueueing notifications. Cheap to clone.
///
/// Enqueueing never blocks: when the queue is full the event is dropped with
/// a warning. Delivery failures are absorbed here and never reach the ledger
/// caller.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<DepositEvent>,
}

impl Notifier {
    /// Spawns the dispatcher with the given transport and policy.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T>(transport: T, config: NotificationConfig) -> Self
    where
        T: NotificationTransport + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<DepositEvent>(config.queue_capacity.max(1));
        let transport = Arc::new(transport);
        let breaker = Arc::new(Mutex::new(CircuitBreaker::new(
            config.breaker_failure_threshold,
            Duration::from_secs(config.breaker_cooldown_secs),
        )));
        let in_flight = Arc::new(Semaphore::new(config.workers.max(1)));
        let policy = DeliveryPolicy {
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        };

        info!(
            queue_capacity = config.queue_capacity,
            workers = config.workers,
            "notification dispatcher started"
        );

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Ok(permit) = Arc::clone(&in_flight).acquire_owned().await else {
                    break;
                };
                let transport = Arc::clone(&transport);
                let breaker = Arc::clone(&breaker);
                let policy = policy.clone();
                tokio::spawn(async move {
                    deliver(&*transport, &breaker, &policy, &event).await;
                    drop(permit);
                });
            }
        });

        Self { tx }
    }

    /// Enqueues a deposit notification, best-effort.
    pub fn notify_deposit(&self, account_id: AccountId, amount: Decimal, currency: Currency) {
        let event = DepositEvent {
            account_id,
            amount: amount.to_string(),
            currency,
            event_type: DEPOSIT_EVENT_TYPE.to_string(),
        };
        if self.tx.try_send(event).is_err() {
            warn!(%account_id, "notification queue full, dropping deposit event");
        }
    }
}

async fn deliver(
    transport: &dyn NotificationTransport,
    breaker: &Mutex<CircuitBreaker>,
    policy: &DeliveryPolicy,
    event: &DepositEvent,
) {
    if !lock(breaker).allow(Instant::now()) {
        warn!(
            account_id = %event.account_id,
            "circuit breaker open, dropping deposit notification"
        );
        return;
    }

    let mut attempt: u32 = 0;
    loop {
        match tokio::time::timeout(policy.timeout, transport.send(event)).await {
            Ok(Ok(())) => {
                lock(breaker).record_success();
                debug!(account_id = %event.account_id, "deposit notification sent");
                return;
            }
            Ok(Err(err)) => {
                warn!(account_id = %event.account_id, attempt, %err, "notification send failed");
            }
            Err(_) => {
                warn!(account_id = %event.account_id, attempt, "notification send timed out");
            }
        }

        if attempt >= policy.max_retries {
            break;
        }
        tokio::time::sleep(policy.backoff.saturating_mul(1 << attempt.min(16))).await;
        attempt += 1;
    }

    lock(breaker).record_failure(Instant::now());
    warn!(
        account_id = %event.account_id,
        "giving up on deposit notification after {} attempts",
        attempt + 1
    );
}

fn lock(breaker: &Mutex<CircuitBreaker>) -> std::sync::MutexGuard<'_, CircuitBreaker> {
    breaker.lock().unwrap_or_else(PoisonError::into_inner)
}
