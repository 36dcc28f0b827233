//! Core ledger logic for Krona.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, invariant checks, and calculations live
//! here.
//!
//! # Modules
//!
//! - `ledger` - Account aggregate, balance invariants, transaction records,
//!   and the orchestrating service
//! - `exchange` - Exchange rate table and currency conversion
//! - `notify` - Fire-and-forget notification dispatch with bounded workers,
//!   retries, and a circuit breaker

pub mod exchange;
pub mod ledger;
pub mod notify;
