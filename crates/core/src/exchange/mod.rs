//! Exchange rate table and currency conversion.

pub mod conversion;
pub mod rates;

pub use conversion::{EXCHANGE_SCALE, calculate_exchange};
pub use rates::{RateTable, RateTableError};
