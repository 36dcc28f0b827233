//! Account aggregate owning the per-currency balance collection.

use std::collections::HashMap;

use krona_shared::types::{AccountId, Currency};
use serde::{Deserialize, Serialize};

use super::balance::Balance;

/// A bank account holding at most one [`Balance`] per currency.
///
/// The aggregate carries a monotonically increasing version counter; the
/// persistence store only applies a commit when the stored version still
/// equals the version the unit of work was loaded at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    version: i64,
    balances: HashMap<Currency, Balance>,
}

impl Account {
    /// Creates a new empty account with a fresh id and version 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: AccountId::new(),
            version: 0,
            balances: HashMap::new(),
        }
    }

    /// The account identity.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// The optimistic-concurrency version this aggregate was loaded at.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Bumps the version counter. Called by the store when a unit of work
    /// commits; never during in-memory mutation.
    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    /// Returns the balance for the given currency, if one exists.
    /// Never creates a balance.
    #[must_use]
    pub fn get_balance(&self, currency: Currency) -> Option<&Balance> {
        self.balances.get(&currency)
    }

    /// Mutable access to an existing balance. Never creates one.
    pub fn get_balance_mut(&mut self, currency: Currency) -> Option<&mut Balance> {
        self.balances.get_mut(&currency)
    }

    /// Returns the existing balance for the currency, or inserts a new
    /// zero-amount balance owned by this account. This is the only creation
    /// path for a balance.
    pub fn get_or_create_balance(&mut self, currency: Currency) -> &mut Balance {
        let id = self.id;
        self.balances
            .entry(currency)
            .or_insert_with(|| Balance::new(id, currency))
    }

    /// Iterates over all balances, in no particular order.
    pub fn balances(&self) -> impl Iterator<Item = &Balance> {
        self.balances.values()
    }

    /// Number of currencies with a balance.
    #[must_use]
    pub fn balance_count(&self) -> usize {
        self.balances.len()
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}
