//! Currency codes supported by the ledger.
//!
//! CRITICAL: Never use floating-point for money calculations. Amounts are
//! always `rust_decimal::Decimal`; this module only carries the currency code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency: {0}")]
pub struct ParseCurrencyError(String);

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro
    Eur,
    /// US Dollar
    Usd,
    /// Swedish Krona
    Sek,
    /// Russian Ruble
    Rub,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Sek => "SEK",
            Self::Rub => "RUB",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "SEK" => Ok(Self::Sek),
            "RUB" => Ok(Self::Rub),
            _ => Err(ParseCurrencyError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Sek.to_string(), "SEK");
        assert_eq!(Currency::Rub.to_string(), "RUB");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);
        assert_eq!(Currency::from_str("eur").unwrap(), Currency::Eur);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("SEK").unwrap(), Currency::Sek);
        assert_eq!(Currency::from_str("RUB").unwrap(), Currency::Rub);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_serde_uppercase() {
        let json = serde_json::to_string(&Currency::Sek).unwrap();
        assert_eq!(json, "\"SEK\"");
        let back: Currency = serde_json::from_str("\"RUB\"").unwrap();
        assert_eq!(back, Currency::Rub);
    }
}
