//! Single-currency balance with invariant-preserving mutations.
//!
//! The only ways to change an amount are [`Balance::credit`] and
//! [`Balance::debit`], both of which reject non-positive amounts and keep the
//! balance non-negative. No I/O happens here; a mutated balance only becomes
//! durable when its aggregate is committed.

use krona_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// A stored quantity of money in one currency for one account.
///
/// Exclusively owned by its [`Account`](super::Account); exactly one exists
/// per (account, currency) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    account_id: AccountId,
    currency: Currency,
    amount: Decimal,
    version: i64,
}

impl Balance {
    /// Creates a zero balance owned by the given account.
    pub(crate) const fn new(account_id: AccountId, currency: Currency) -> Self {
        Self {
            account_id,
            currency,
            amount: Decimal::ZERO,
            version: 0,
        }
    }

    /// The owning account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// The currency of this balance.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// The current amount. Invariant: never negative.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Version counter, bumped on every successful mutation.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Adds the given amount to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount <= 0`.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.amount += amount;
        self.version += 1;
        Ok(())
    }

    /// Subtracts the given amount from the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount <= 0`, or
    /// [`LedgerError::InsufficientFunds`] if the balance does not cover it.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > self.amount {
            return Err(LedgerError::InsufficientFunds {
                account_id: self.account_id,
                currency: self.currency,
                requested: amount,
                available: self.amount,
            });
        }
        self.amount -= amount;
        self.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn eur_balance() -> Balance {
        Balance::new(AccountId::new(), Currency::Eur)
    }

    #[test]
    fn test_new_balance_is_zero() {
        let balance = eur_balance();
        assert_eq!(balance.amount(), Decimal::ZERO);
        assert_eq!(balance.version(), 0);
    }

    #[test]
    fn test_credit_adds_amount() {
        let mut balance = eur_balance();
        balance.credit(dec!(100.00)).unwrap();
        assert_eq!(balance.amount(), dec!(100.00));
        assert_eq!(balance.version(), 1);
    }

    #[test]
    fn test_credit_rejects_non_positive() {
        let mut balance = eur_balance();
        assert_eq!(
            balance.credit(dec!(0)),
            Err(LedgerError::InvalidAmount(dec!(0)))
        );
        assert_eq!(
            balance.credit(dec!(-5)),
            Err(LedgerError::InvalidAmount(dec!(-5)))
        );
        assert_eq!(balance.amount(), Decimal::ZERO);
        assert_eq!(balance.version(), 0);
    }

    #[test]
    fn test_debit_subtracts_amount() {
        let mut balance = eur_balance();
        balance.credit(dec!(100.00)).unwrap();
        balance.debit(dec!(30.00)).unwrap();
        assert_eq!(balance.amount(), dec!(70.00));
        assert_eq!(balance.version(), 2);
    }

    #[test]
    fn test_debit_rejects_non_positive() {
        let mut balance = eur_balance();
        balance.credit(dec!(10)).unwrap();
        assert_eq!(
            balance.debit(dec!(0)),
            Err(LedgerError::InvalidAmount(dec!(0)))
        );
        assert_eq!(balance.amount(), dec!(10));
    }

    #[test]
    fn test_debit_insufficient_funds_carries_context() {
        let mut balance = eur_balance();
        balance.credit(dec!(70.00)).unwrap();

        let err = balance.debit(dec!(1000.00)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account_id: balance.account_id(),
                currency: Currency::Eur,
                requested: dec!(1000.00),
                available: dec!(70.00),
            }
        );
        // The failed debit must leave the balance untouched.
        assert_eq!(balance.amount(), dec!(70.00));
        assert_eq!(balance.version(), 1);
    }

    #[test]
    fn test_debit_exact_balance_to_zero() {
        let mut balance = eur_balance();
        balance.credit(dec!(70.00)).unwrap();
        balance.debit(dec!(70.00)).unwrap();
        assert_eq!(balance.amount(), dec!(0.00));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 4))
    }

    proptest! {
        /// A balance never goes negative, whatever sequence of credits and
        /// debits is applied.
        #[test]
        fn prop_balance_never_negative(ops in prop::collection::vec(
            (any::<bool>(), amount_strategy()), 1..50,
        )) {
            let mut balance = eur_balance();
            for (is_credit, amount) in ops {
                if is_credit {
                    balance.credit(amount).unwrap();
                } else {
                    let _ = balance.debit(amount);
                }
                prop_assert!(balance.amount() >= Decimal::ZERO);
            }
        }

        /// A credit followed by an equal debit restores the starting amount.
        #[test]
        fn prop_credit_then_debit_roundtrips(amount in amount_strategy()) {
            let mut balance = eur_balance();
            balance.credit(amount).unwrap();
            balance.debit(amount).unwrap();
            prop_assert_eq!(balance.amount(), Decimal::ZERO);
        }

        /// The version counter increases by exactly one per successful
        /// mutation and not at all on a rejected one.
        #[test]
        fn prop_version_counts_successful_mutations(amounts in prop::collection::vec(
            amount_strategy(), 1..20,
        )) {
            let mut balance = eur_balance();
            for amount in &amounts {
                balance.credit(*amount).unwrap();
            }
            let before = balance.version();
            prop_assert_eq!(before, amounts.len() as i64);

            let _ = balance.debit(balance.amount() + Decimal::ONE);
            prop_assert_eq!(balance.version(), before);
        }
    }
}
