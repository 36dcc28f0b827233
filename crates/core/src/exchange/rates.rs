//! Read-only exchange rate table with atomic snapshot refresh.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use krona_shared::types::Currency;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while building or refreshing a rate table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateTableError {
    /// The configured rate table has no entries.
    #[error("exchange rate table must not be empty")]
    Empty,

    /// A configuration key does not look like "FROM_TO".
    #[error("invalid currency pair key: {0}")]
    BadPairKey(String),

    /// A configured rate is zero or negative.
    #[error("exchange rate for {0} must be positive")]
    NonPositiveRate(String),
}

/// Exchange rates keyed by ordered (from, to) currency pair.
///
/// Request processing only reads; refreshes swap in a complete snapshot so a
/// reader never observes a partially updated table.
#[derive(Debug)]
pub struct RateTable {
    rates: RwLock<Arc<HashMap<(Currency, Currency), Decimal>>>,
}

impl RateTable {
    /// Builds a table from an explicit pair map.
    ///
    /// # Errors
    ///
    /// Returns [`RateTableError::Empty`] for an empty map or
    /// [`RateTableError::NonPositiveRate`] for a rate `<= 0`.
    pub fn new(rates: HashMap<(Currency, Currency), Decimal>) -> Result<Self, RateTableError> {
        Self::validate(&rates)?;
        Ok(Self {
            rates: RwLock::new(Arc::new(rates)),
        })
    }

    /// Builds a table from configuration keys of the form `"EUR_USD"`.
    pub fn from_config(raw: &HashMap<String, Decimal>) -> Result<Self, RateTableError> {
        Self::new(Self::parse_pairs(raw)?)
    }

    /// Looks up the rate for the ordered pair. Absence is a normal outcome
    /// signaling an unsupported pair.
    #[must_use]
    pub fn lookup(&self, from: Currency, to: Currency) -> Option<Decimal> {
        let snapshot = match self.rates.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        };
        snapshot.get(&(from, to)).copied()
    }

    /// Replaces the whole table with a new snapshot (out-of-band refresh).
    pub fn replace(&self, rates: HashMap<(Currency, Currency), Decimal>) -> Result<(), RateTableError> {
        Self::validate(&rates)?;
        let snapshot = Arc::new(rates);
        match self.rates.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        Ok(())
    }

    /// Replaces the table from configuration keys.
    pub fn replace_from_config(&self, raw: &HashMap<String, Decimal>) -> Result<(), RateTableError> {
        self.replace(Self::parse_pairs(raw)?)
    }

    fn parse_pairs(
        raw: &HashMap<String, Decimal>,
    ) -> Result<HashMap<(Currency, Currency), Decimal>, RateTableError> {
        raw.iter()
            .map(|(key, rate)| {
                let (from, to) = key
                    .split_once('_')
                    .ok_or_else(|| RateTableError::BadPairKey(key.clone()))?;
                let from = Currency::from_str(from)
                    .map_err(|_| RateTableError::BadPairKey(key.clone()))?;
                let to =
                    Currency::from_str(to).map_err(|_| RateTableError::BadPairKey(key.clone()))?;
                Ok(((from, to), *rate))
            })
            .collect()
    }

    fn validate(rates: &HashMap<(Currency, Currency), Decimal>) -> Result<(), RateTableError> {
        if rates.is_empty() {
            return Err(RateTableError::Empty);
        }
        for ((from, to), rate) in rates {
            if *rate <= Decimal::ZERO {
                return Err(RateTableError::NonPositiveRate(format!("{from}_{to}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect()
    }

    #[test]
    fn test_from_config_and_lookup() {
        let table =
            RateTable::from_config(&raw(&[("EUR_USD", dec!(1.08)), ("USD_EUR", dec!(0.93))]))
                .unwrap();

        assert_eq!(table.lookup(Currency::Eur, Currency::Usd), Some(dec!(1.08)));
        assert_eq!(table.lookup(Currency::Usd, Currency::Eur), Some(dec!(0.93)));
        // Ordered pairs: the reverse of a configured pair is not implied.
        assert_eq!(table.lookup(Currency::Eur, Currency::Rub), None);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(
            RateTable::from_config(&HashMap::new()).unwrap_err(),
            RateTableError::Empty
        );
    }

    #[test]
    fn test_bad_pair_key_rejected() {
        assert_eq!(
            RateTable::from_config(&raw(&[("EURUSD", dec!(1.08))])).unwrap_err(),
            RateTableError::BadPairKey("EURUSD".to_string())
        );
        assert_eq!(
            RateTable::from_config(&raw(&[("EUR_XXX", dec!(1.08))])).unwrap_err(),
            RateTableError::BadPairKey("EUR_XXX".to_string())
        );
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        assert_eq!(
            RateTable::from_config(&raw(&[("EUR_USD", dec!(0))])).unwrap_err(),
            RateTableError::NonPositiveRate("EUR_USD".to_string())
        );
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let table = RateTable::from_config(&raw(&[("EUR_USD", dec!(1.08))])).unwrap();

        table
            .replace_from_config(&raw(&[("EUR_SEK", dec!(11.2))]))
            .unwrap();

        assert_eq!(table.lookup(Currency::Eur, Currency::Usd), None);
        assert_eq!(table.lookup(Currency::Eur, Currency::Sek), Some(dec!(11.2)));
    }

    #[test]
    fn test_replace_with_empty_keeps_old_snapshot() {
        let table = RateTable::from_config(&raw(&[("EUR_USD", dec!(1.08))])).unwrap();
        assert_eq!(table.replace(HashMap::new()), Err(RateTableError::Empty));
        assert_eq!(table.lookup(Currency::Eur, Currency::Usd), Some(dec!(1.08)));
    }
}
