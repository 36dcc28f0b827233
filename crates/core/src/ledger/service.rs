//! Ledger orchestration: one atomic, version-checked unit of work per call.
//!
//! Each operation loads the aggregate, mutates it in memory through the
//! invariant-preserving balance operations, and commits balances and
//! transaction records as a single unit. Validation is fail-fast and happens
//! before any store interaction where possible; domain errors surface to the
//! caller unchanged.

use std::sync::Arc;

use krona_shared::types::{AccountId, Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exchange::conversion::calculate_exchange;
use crate::exchange::rates::RateTable;
use crate::notify::Notifier;

use super::account::Account;
use super::error::LedgerError;
use super::store::LedgerStore;
use super::transaction::Transaction;

/// One (currency, amount) pair of an account's balance map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    /// The balance currency.
    pub currency: Currency,
    /// The balance amount.
    pub amount: Decimal,
}

/// Result of every ledger operation: the account's refreshed balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    /// The account the balances belong to.
    pub account_id: AccountId,
    /// All balances, sorted by currency code.
    pub balances: Vec<BalanceView>,
}

impl AccountBalances {
    fn from_account(account: &Account) -> Self {
        let mut balances: Vec<_> = account
            .balances()
            .map(|balance| BalanceView {
                currency: balance.currency(),
                amount: balance.amount(),
            })
            .collect();
        balances.sort_by_key(|view| view.currency.code());
        Self {
            account_id: account.id(),
            balances,
        }
    }
}

/// The account/balance consistency engine.
///
/// Generic over the persistence collaborator; holds a read-only rate table
/// and a fire-and-forget notifier handle.
pub struct LedgerService<S> {
    store: Arc<S>,
    rates: Arc<RateTable>,
    notifier: Notifier,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Wires the service to its collaborators.
    pub fn new(store: Arc<S>, rates: Arc<RateTable>, notifier: Notifier) -> Self {
        Self {
            store,
            rates,
            notifier,
        }
    }

    /// Creates a new empty account.
    pub async fn create_account(&self) -> Result<AccountBalances, LedgerError> {
        debug!("creating a new account");
        let account = self.store.create_account().await?;
        Ok(AccountBalances::from_account(&account))
    }

    /// Returns the current balances of an account.
    pub async fn balances(&self, account_id: AccountId) -> Result<AccountBalances, LedgerError> {
        debug!(%account_id, "retrieving balances");
        let account = self.store.load_account(account_id).await?;
        Ok(AccountBalances::from_account(&account))
    }

    /// Credits `amount` of `currency`, creating the balance on first use.
    ///
    /// On commit success a deposit notification is dispatched best-effort;
    /// its outcome never affects the result of this call.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<AccountBalances, LedgerError> {
        debug!(%account_id, %amount, %currency, "processing deposit");
        require_positive(amount)?;

        let mut account = self.store.load_account(account_id).await?;
        let expected_version = account.version();

        account.get_or_create_balance(currency).credit(amount)?;
        let record = Transaction::deposit(account_id, currency, amount);

        let account = self
            .store
            .commit(account, vec![record], expected_version)
            .await?;

        self.notifier.notify_deposit(account_id, amount, currency);

        Ok(AccountBalances::from_account(&account))
    }

    /// Debits `amount` of `currency` from an existing balance.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<AccountBalances, LedgerError> {
        debug!(%account_id, %amount, %currency, "processing withdrawal");
        require_positive(amount)?;

        let mut account = self.store.load_account(account_id).await?;
        let expected_version = account.version();

        account
            .get_balance_mut(currency)
            .ok_or(LedgerError::BalanceNotFound {
                account_id,
                currency,
            })?
            .debit(amount)?;
        let record = Transaction::withdrawal(account_id, currency, amount);

        let account = self
            .store
            .commit(account, vec![record], expected_version)
            .await?;

        Ok(AccountBalances::from_account(&account))
    }

    /// Converts `amount` from one currency balance into another within the
    /// same account, recording both sides of the exchange.
    pub async fn exchange(
        &self,
        account_id: AccountId,
        from: Currency,
        to: Currency,
        amount: Decimal,
    ) -> Result<AccountBalances, LedgerError> {
        debug!(%account_id, %amount, %from, %to, "processing exchange");
        require_positive(amount)?;
        if from == to {
            return Err(LedgerError::SameCurrencyExchange);
        }

        let mut account = self.store.load_account(account_id).await?;
        let expected_version = account.version();

        let from_balance =
            account
                .get_balance_mut(from)
                .ok_or(LedgerError::BalanceNotFound {
                    account_id,
                    currency: from,
                })?;

        let exchanged = calculate_exchange(&self.rates, from, to, amount)?;
        debug!(%account_id, %amount, %from, %exchanged, %to, "exchange calculated");

        from_balance.debit(amount)?;
        account.get_or_create_balance(to).credit(exchanged)?;

        let records = vec![
            Transaction::exchange_from(account_id, from, amount),
            Transaction::exchange_to(account_id, to, exchanged),
        ];

        let account = self.store.commit(account, records, expected_version).await?;

        Ok(AccountBalances::from_account(&account))
    }

    /// Returns a page of the account's transaction history, newest first.
    pub async fn transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, LedgerError> {
        debug!(%account_id, page = page.page, per_page = page.per_page, "listing transactions");
        self.store.list_transactions(account_id, page).await
    }

    /// Deletes an account, cascading to its balances and records.
    pub async fn delete_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        debug!(%account_id, "deleting account");
        self.store.delete_account(account_id).await
    }
}

fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
