//! Discount utilities
//!
//! Percentage arithmetic shared by coupon discounts and tax.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Calculate a percentage of a minor unit amount, rounded to the nearest minor unit.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't actually expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate a percentage of an amount, rounded to the nearest whole currency unit.
///
/// `10%` of `₹3,097.00` is `₹310.00`, not `₹309.70`.
///
/// # Errors
///
/// Returns `DiscountError::PercentConversion` if the calculation overflows.
pub fn percent_of_whole_units<'a>(
    percent: &Percentage,
    amount: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = amount.currency();
    let unit = minor_units_per_unit(currency)?;

    let minor = Decimal::from_i64(amount.to_minor_units()).ok_or(DiscountError::PercentConversion)?;

    let whole_units = ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .and_then(|applied| applied.checked_div(unit))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let rounded = whole_units
        .checked_mul(unit)
        .and_then(|value| value.to_i64())
        .ok_or(DiscountError::PercentConversion)?;

    Ok(Money::from_minor(rounded, currency))
}

/// Returns true when the percentage lies within `0%..=100%`.
pub fn is_fractional(percent: &Percentage) -> bool {
    let value = (*percent) * Decimal::ONE;

    value >= Decimal::ZERO && value <= Decimal::ONE
}

fn minor_units_per_unit(currency: &Currency) -> Result<Decimal, DiscountError> {
    10_i64
        .checked_pow(currency.exponent)
        .and_then(Decimal::from_i64)
        .ok_or(DiscountError::PercentConversion)
}
