//! Currency conversion logic.
//!
//! CRITICAL: amounts are rounded half-up (away from zero at the midpoint) to
//! 4 fractional digits, matching the scale balances are stored at.

use krona_shared::types::Currency;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::exchange::rates::RateTable;
use crate::ledger::error::LedgerError;

/// Fractional digits of an exchanged amount.
pub const EXCHANGE_SCALE: u32 = 4;

/// Computes the target-currency amount for an exchange.
///
/// Identity conversions (`from == to`) return the amount unchanged without a
/// rate lookup. Deterministic; mutates nothing.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] if `amount <= 0`, or
/// [`LedgerError::UnsupportedCurrencyPair`] if no rate is configured for the
/// ordered pair.
pub fn calculate_exchange(
    rates: &RateTable,
    from: Currency,
    to: Currency,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    if from == to {
        return Ok(amount);
    }

    let rate = rates
        .lookup(from, to)
        .ok_or(LedgerError::UnsupportedCurrencyPair { from, to })?;

    Ok((amount * rate).round_dp_with_strategy(EXCHANGE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
