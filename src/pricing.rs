//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::items::LineItem;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Multiplying a unit price by its quantity overflowed.
    #[error("line total overflowed for a quantity of {0}")]
    Overflow(u32),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total selling price of a list of line items
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total could not be represented in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    items
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, item| {
            Ok(acc.add(extended(item.unit_price(), item.quantity())?)?)
        })
}

/// Calculates the total list price (MRP) of a list of line items
///
/// Lines without an MRP contribute their selling price.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total could not be represented in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_mrp<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    items
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, item| {
            Ok(acc.add(extended(item.mrp(), item.quantity())?)?)
        })
}

/// Total number of units across all lines.
pub fn item_count(items: &[LineItem<'_>]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity())).sum()
}

/// Unit price multiplied by quantity, with negative unit prices treated as zero.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product does not fit in minor units.
pub fn extended<'a>(
    unit: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let unit = non_negative(*unit);

    let minor = unit
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::Overflow(quantity))?;

    Ok(Money::from_minor(minor, unit.currency()))
}

/// Clamp a negative amount to zero in the same currency.
pub(crate) fn non_negative<'a>(amount: Money<'a, Currency>) -> Money<'a, Currency> {
    if amount.to_minor_units() < 0 {
        warn!(%amount, "negative amount clamped to zero");

        return Money::from_minor(0, amount.currency());
    }

    amount
}
