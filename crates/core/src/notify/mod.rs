//! Fire-and-forget notification dispatch.
//!
//! Deposits trigger a notification to an external service. The dispatch path
//! is fully decoupled from the ledger commit: a bounded queue absorbs bursts,
//! a semaphore bounds in-flight sends, and each delivery runs its own
//! timeout/retry/circuit-breaker policy. Nothing here can delay or roll back
//! a committed mutation.

pub mod breaker;
pub mod dispatcher;

pub use dispatcher::{DepositEvent, NotificationTransport, Notifier, TransportError};
