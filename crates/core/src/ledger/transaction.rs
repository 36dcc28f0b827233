//! Immutable transaction records for the audit trail.
//!
//! A record is constructed once per mutation (two per exchange), stamped at
//! creation, and never updated afterwards. Records only disappear through
//! cascading account deletion.

use chrono::{DateTime, Utc};
use krona_shared::types::{AccountId, Currency, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of balance mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Funds added to a balance.
    Deposit,
    /// Funds removed from a balance.
    Withdrawal,
    /// Source side of a currency exchange.
    ExchangeFrom,
    /// Target side of a currency exchange.
    ExchangeTo,
}

/// An append-only audit record of one balance mutation.
///
/// Holds a weak back-reference to its account: the account does not own the
/// record's lifecycle beyond creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    account_id: AccountId,
    kind: TransactionKind,
    currency: Currency,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

impl Transaction {
    fn new(
        account_id: AccountId,
        kind: TransactionKind,
        currency: Currency,
        amount: Decimal,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            kind,
            currency,
            amount,
            created_at: Utc::now(),
        }
    }

    /// Creates a deposit record.
    #[must_use]
    pub fn deposit(account_id: AccountId, currency: Currency, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Deposit, currency, amount)
    }

    /// Creates a withdrawal record.
    #[must_use]
    pub fn withdrawal(account_id: AccountId, currency: Currency, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Withdrawal, currency, amount)
    }

    /// Creates the source-side record of a currency exchange.
    #[must_use]
    pub fn exchange_from(account_id: AccountId, currency: Currency, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::ExchangeFrom, currency, amount)
    }

    /// Creates the target-side record of a currency exchange.
    #[must_use]
    pub fn exchange_to(account_id: AccountId, currency: Currency, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::ExchangeTo, currency, amount)
    }

    /// The record identity.
    #[must_use]
    pub const fn id(&self) -> TransactionId {
        self.id
    }

    /// The account this record belongs to.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// The mutation kind.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The currency of the mutation.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// The mutated amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Creation timestamp, assigned once and never altered.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
