//! Currency helpers
//!
//! Amounts are carried as integer cents everywhere inside the engine and only
//! turned into dollar decimals when handed to a caller.

use super::SalesError;
use rust_decimal::Decimal;

/// Integer number of cents
pub type Cents = i64;

/// Convert cents to an exact two-place dollar amount
pub fn cents_to_dollars(cents: Cents) -> Decimal {
    Decimal::new(cents, 2)
}

/// Sum amounts, failing instead of wrapping when the total leaves `i64`
pub fn sum_cents<I>(amounts: I, operation: &'static str) -> Result<Cents, SalesError>
where
    I: IntoIterator<Item = Result<Cents, SalesError>>,
{
    amounts.into_iter().try_fold(0, |total: Cents, amount| {
        total
            .checked_add(amount?)
            .ok_or_else(|| SalesError::overflow(operation))
    })
}
