//! Ledger error taxonomy.
//!
//! All domain errors surface unchanged to the caller; there is no internal
//! suppression or automatic retry. The adapter mapping helpers
//! (`error_code`, `http_status_code`) exist so transport layers never need to
//! pattern-match the taxonomy themselves.

use krona_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No balance exists for the requested currency.
    #[error("No {currency} balance for account {account_id}")]
    BalanceNotFound {
        /// The account that was loaded.
        account_id: AccountId,
        /// The currency with no balance.
        currency: Currency,
    },

    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Source and target currencies of an exchange must differ.
    #[error("Source and target currencies must be different")]
    SameCurrencyExchange,

    /// The balance does not cover the requested amount.
    #[error(
        "Insufficient {currency} funds for account {account_id}: \
         requested {requested}, available {available}"
    )]
    InsufficientFunds {
        /// The account being debited.
        account_id: AccountId,
        /// The currency of the balance.
        currency: Currency,
        /// The amount that was requested.
        requested: Decimal,
        /// The amount actually available.
        available: Decimal,
    },

    /// No exchange rate is configured for the ordered currency pair.
    #[error("No exchange rate configured for {from} to {to}")]
    UnsupportedCurrencyPair {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    /// The account was modified between load and commit.
    #[error(
        "Account {account_id} was modified concurrently: \
         expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The contested account.
        account_id: AccountId,
        /// The version the unit of work was loaded at.
        expected: i64,
        /// The version found at commit time.
        actual: i64,
    },

    /// Persistence infrastructure error, propagated unmodified.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::BalanceNotFound { .. } => "BALANCE_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameCurrencyExchange => "SAME_CURRENCY_EXCHANGE",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::UnsupportedCurrencyPair { .. } => "UNSUPPORTED_CURRENCY_PAIR",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_)
            | Self::SameCurrencyExchange
            | Self::UnsupportedCurrencyPair { .. } => 400,
            Self::AccountNotFound(_) | Self::BalanceNotFound { .. } => 404,
            Self::ConcurrencyConflict { .. } => 409,
            Self::InsufficientFunds { .. } => 422,
            Self::Store(_) => 500,
        }
    }

    /// Returns true if the caller should reload and retry the operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}
