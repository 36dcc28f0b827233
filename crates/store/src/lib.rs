//! In-memory persistence adapter for the Krona ledger.
//!
//! Accounts, their balances, and their transaction history live together in
//! one record per account, sharded behind a concurrent map. Because a commit
//! mutates exactly one record under its shard lock, the version check and the
//! write are atomic with respect to other writers of the same account.

use async_trait::async_trait;
use dashmap::DashMap;
use krona_core::ledger::{Account, LedgerError, LedgerStore, Transaction};
use krona_shared::types::{AccountId, PageRequest, PageResponse};
use tracing::debug;

/// Everything persisted for one account: the aggregate (balances included)
/// plus its append-only transaction history.
#[derive(Debug)]
struct AccountRecord {
    account: Account,
    transactions: Vec<Transaction>,
}

/// Thread-safe in-memory [`LedgerStore`].
///
/// Suitable for tests and single-process deployments. Data does not survive
/// a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<AccountId, AccountRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts currently stored.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn create_account(&self) -> Result<Account, LedgerError> {
        let account = Account::new();
        debug!(account_id = %account.id(), "account created");
        self.accounts.insert(
            account.id(),
            AccountRecord {
                account: account.clone(),
                transactions: Vec::new(),
            },
        );
        Ok(account)
    }

    async fn load_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&account_id)
            .map(|record| record.account.clone())
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn commit(
        &self,
        mut account: Account,
        transactions: Vec<Transaction>,
        expected_version: i64,
    ) -> Result<Account, LedgerError> {
        let account_id = account.id();
        // get_mut holds the shard lock for this entry, making the version
        // check and the write atomic against concurrent committers.
        let mut record = self
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let actual = record.account.version();
        if actual != expected_version {
            debug!(
                %account_id,
                expected = expected_version,
                actual,
                "stale commit rejected"
            );
            return Err(LedgerError::ConcurrencyConflict {
                account_id,
                expected: expected_version,
                actual,
            });
        }

        account.increment_version();
        record.account = account.clone();
        record.transactions.extend(transactions);
        debug!(%account_id, version = account.version(), "commit applied");
        Ok(account)
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, LedgerError> {
        let record = self
            .accounts
            .get(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let mut transactions = record.transactions.clone();
        drop(record);

        // Newest first; ids are time-ordered so they break created_at ties
        // deterministically.
        transactions.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().into_inner().cmp(&a.id().into_inner()))
        });

        let total = transactions.len() as u64;
        let data: Vec<_> = transactions
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn delete_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        if self.accounts.remove(&account_id).is_none() {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        debug!(%account_id, "account deleted with balances and history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krona_shared::types::Currency;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_then_load() {
        let store = MemoryStore::new();
        let account = store.create_account().await.unwrap();

        let loaded = store.load_account(account.id()).await.unwrap();
        assert_eq!(loaded, account);
        assert_eq!(store.account_count(), 1);
    }

    #[tokio::test]
    async fn test_load_unknown_account() {
        let store = MemoryStore::new();
        let missing = AccountId::new();
        assert_eq!(
            store.load_account(missing).await.unwrap_err(),
            LedgerError::AccountNotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_commit_bumps_version_and_persists() {
        let store = MemoryStore::new();
        let mut account = store.create_account().await.unwrap();
        let account_id = account.id();

        account
            .get_or_create_balance(Currency::Eur)
            .credit(dec!(100.00))
            .unwrap();
        let record = Transaction::deposit(account_id, Currency::Eur, dec!(100.00));

        let committed = store.commit(account, vec![record], 0).await.unwrap();
        assert_eq!(committed.version(), 1);

        let loaded = store.load_account(account_id).await.unwrap();
        assert_eq!(loaded.version(), 1);
        assert_eq!(
            loaded.get_balance(Currency::Eur).map(|b| b.amount()),
            Some(dec!(100.00))
        );
    }

    #[tokio::test]
    async fn test_stale_commit_rejected_and_leaves_no_trace() {
        let store = MemoryStore::new();
        let account = store.create_account().await.unwrap();
        let account_id = account.id();

        // Two units of work loaded at version 0.
        let mut first = store.load_account(account_id).await.unwrap();
        let mut second = store.load_account(account_id).await.unwrap();

        first
            .get_or_create_balance(Currency::Eur)
            .credit(dec!(10))
            .unwrap();
        store
            .commit(
                first,
                vec![Transaction::deposit(account_id, Currency::Eur, dec!(10))],
                0,
            )
            .await
            .unwrap();

        second
            .get_or_create_balance(Currency::Usd)
            .credit(dec!(20))
            .unwrap();
        let err = store
            .commit(
                second,
                vec![Transaction::deposit(account_id, Currency::Usd, dec!(20))],
                0,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::ConcurrencyConflict {
                account_id,
                expected: 0,
                actual: 1,
            }
        );

        // The losing unit of work left no balance and no history.
        let loaded = store.load_account(account_id).await.unwrap();
        assert!(loaded.get_balance(Currency::Usd).is_none());
        let page = store
            .list_transactions(account_id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 1);
    }

    #[tokio::test]
    async fn test_commit_unknown_account() {
        let store = MemoryStore::new();
        let account = Account::new();
        let err = store.commit(account.clone(), vec![], 0).await.unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound(account.id()));
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first_paginated() {
        let store = MemoryStore::new();
        let account = store.create_account().await.unwrap();
        let account_id = account.id();

        for i in 0..5 {
            let current = store.load_account(account_id).await.unwrap();
            let version = current.version();
            let mut current = current;
            current
                .get_or_create_balance(Currency::Eur)
                .credit(dec!(1))
                .unwrap();
            let record =
                Transaction::deposit(account_id, Currency::Eur, dec!(1) + rust_decimal::Decimal::from(i));
            store.commit(current, vec![record], version).await.unwrap();
        }

        let page = store
            .list_transactions(account_id, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.data.len(), 2);
        // Newest first: the last-committed record leads.
        assert!(page.data[0].created_at() >= page.data[1].created_at());
        assert_eq!(page.data[0].amount(), dec!(5));

        let last = store
            .list_transactions(account_id, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.data[0].amount(), dec!(1));
    }

    #[tokio::test]
    async fn test_delete_account_cascades() {
        let store = MemoryStore::new();
        let account = store.create_account().await.unwrap();
        let account_id = account.id();

        store.delete_account(account_id).await.unwrap();
        assert_eq!(store.account_count(), 0);
        assert_eq!(
            store.load_account(account_id).await.unwrap_err(),
            LedgerError::AccountNotFound(account_id)
        );
        assert_eq!(
            store.delete_account(account_id).await.unwrap_err(),
            LedgerError::AccountNotFound(account_id)
        );
    }
}
