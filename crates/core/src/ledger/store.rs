//! Persistence collaborator interface.
//!
//! The engine never talks to a storage technology directly; it loads an
//! aggregate, mutates it in memory, and hands everything back in one
//! version-checked commit. Implementations must make that commit atomic
//! across the account, all balances, and all transaction records.

use async_trait::async_trait;
use krona_shared::types::{AccountId, PageRequest, PageResponse};

use super::account::Account;
use super::error::LedgerError;
use super::transaction::Transaction;

/// Storage collaborator for the ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates and persists a new empty account.
    async fn create_account(&self) -> Result<Account, LedgerError>;

    /// Loads an account together with all of its balances.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if no such account exists.
    async fn load_account(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Atomically applies one unit of work: the mutated aggregate plus its
    /// transaction records.
    ///
    /// The write succeeds only if the stored version still equals
    /// `expected_version`; the account version is then incremented. On a
    /// version mismatch nothing is applied and
    /// [`LedgerError::ConcurrencyConflict`] is returned. Returns the
    /// refreshed aggregate.
    async fn commit(
        &self,
        account: Account,
        transactions: Vec<Transaction>,
        expected_version: i64,
    ) -> Result<Account, LedgerError>;

    /// Returns a page of the account's records, newest first.
    async fn list_transactions(
        &self,
        id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, LedgerError>;

    /// Removes an account with all balances and records (cascading).
    async fn delete_account(&self, id: AccountId) -> Result<(), LedgerError>;
}
