//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Selling price (e.g., "1299 INR")
    pub price: String,

    /// Maximum retail price (e.g., "1499 INR")
    #[serde(default)]
    pub mrp: Option<String>,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        let mrp = fixture
            .mrp
            .as_deref()
            .map(parse_price)
            .transpose()?
            .map(|(minor_units, mrp_currency)| {
                if mrp_currency == currency {
                    Ok(Money::from_minor(minor_units, mrp_currency))
                } else {
                    Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        mrp_currency.iso_alpha_code.to_string(),
                    ))
                }
            })
            .transpose()?;

        Ok(Product {
            name: fixture.name,
            price,
            mrp,
        })
    }
}

/// Parse price string (e.g., "1299.50 INR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(currency_code)?;
    let minor_units =
        to_minor(amount, currency).ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Look up a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Convert a plain amount in whole units (e.g. `299` or `12.5`) into money.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] if the amount is not finite or overflows.
pub fn parse_amount(value: f64, currency: &'static Currency) -> Result<Money<'static, Currency>, FixtureError> {
    Decimal::from_f64(value)
        .and_then(|amount| to_minor(amount, currency))
        .map(|minor| Money::from_minor(minor, currency))
        .ok_or_else(|| FixtureError::InvalidPrice(value.to_string()))
}

fn to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = Decimal::from_i64(10_i64.checked_pow(currency.exponent)?)?;

    amount.checked_mul(scale)?.round_dp(0).to_i64()
}

/// Parse percentage string (e.g., "18%" or "0.18") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "18%" for 18%
/// - Decimal format: "0.18" for 18%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or if the value is invalid.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(percent_str) => (percent_str.trim(), 100.0),
        None => (trimmed, 1.0),
    };

    let value = number
        .parse::<f64>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    fraction_to_percentage(value / scale)
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}

/// Convert a fraction (e.g. `0.18`) into a `Percentage`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] if the value is not finite or does not fit
/// in a decimal.
pub fn fraction_to_percentage(value: f64) -> Result<Percentage, FixtureError> {
    Decimal::from_f64(value)
        .map(Percentage::from)
        .ok_or_else(|| FixtureError::InvalidPercentage(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("1299INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_rupees_and_paise() -> Result<(), FixtureError> {
        let (whole, inr) = parse_price("1299 INR")?;
        let (fractional, _) = parse_price("899.50 INR")?;

        assert_eq!(whole, 129_900);
        assert_eq!(fractional, 89_950);
        assert_eq!(inr, INR);

        Ok(())
    }

    #[test]
    fn parse_amount_converts_whole_units() -> Result<(), FixtureError> {
        assert_eq!(parse_amount(299.0, INR)?, Money::from_minor(29_900, INR));
        assert_eq!(parse_amount(12.5, INR)?, Money::from_minor(1_250, INR));

        Ok(())
    }

    #[test]
    fn parse_amount_rejects_non_finite() {
        assert!(matches!(
            parse_amount(f64::NAN, INR),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn product_fixture_rejects_mrp_in_other_currency() {
        let fixture = ProductFixture {
            name: "Silk Scarf".to_string(),
            price: "499 INR".to_string(),
            mrp: Some("9 USD".to_string()),
        };

        assert!(matches!(
            Product::try_from(fixture),
            Err(FixtureError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn parse_percentage_accepts_percentage_format() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("18%")?, Percentage::from(0.18));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("0.18")?, Percentage::from(0.18));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("invalid");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn parse_percentage_rejects_non_finite_values() {
        for input in ["NaN%", "inf", "-inf%", "1e40"] {
            let result = parse_percentage(input);

            assert!(
                matches!(&result, Err(FixtureError::InvalidPercentage(value)) if value == input),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn fraction_to_percentage_matches_float_conversion() -> Result<(), FixtureError> {
        assert_eq!(fraction_to_percentage(0.1)?, Percentage::from(0.1));
        assert!(matches!(
            fraction_to_percentage(f64::INFINITY),
            Err(FixtureError::InvalidPercentage(_))
        ));

        Ok(())
    }

    #[test]
    fn parse_percentage_handles_whitespace() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("  18%  ")?, Percentage::from(0.18));

        Ok(())
    }
}
