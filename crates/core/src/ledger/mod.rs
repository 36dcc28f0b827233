//! Account ledger: aggregate, invariants, records, and the service layer.

pub mod account;
pub mod balance;
pub mod error;
pub mod service;
pub mod store;
pub mod transaction;

pub use account::Account;
pub use balance::Balance;
pub use error::LedgerError;
pub use service::{AccountBalances, BalanceView, LedgerService};
pub use store::LedgerStore;
pub use transaction::{Transaction, TransactionKind};
