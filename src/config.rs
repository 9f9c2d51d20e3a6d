//! Pricing configuration
//!
//! Values the storefront injects into every price computation so that each
//! checkout surface prices an order the same way.

use decimal_percentage::Percentage;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::discounts::is_fractional;

/// Default GST rate.
pub const DEFAULT_TAX_RATE: f64 = 0.18;

/// Default platform fee, in rupees.
pub const DEFAULT_PLATFORM_FEE: i64 = 20;

/// Default donation presets, in rupees.
pub const DEFAULT_DONATION_PRESETS: [i64; 4] = [10, 20, 50, 100];

/// Errors building or querying a pricing configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The tax rate is negative or above 100%.
    #[error("Tax rate must be between 0% and 100%")]
    TaxRateOutOfRange,

    /// A configured amount is in the wrong currency (field, found, expected).
    #[error("{0} is in {1}, but pricing currency is {2}")]
    CurrencyMismatch(&'static str, &'static str, &'static str),

    /// A configured amount is negative.
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),

    /// The donation amount is not one of the presets.
    #[error("Donation of {0} is not one of the offered amounts")]
    UnknownDonation(String),
}

/// Tax, fee and donation settings for a storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig<'a> {
    currency: &'static Currency,
    tax_rate: Percentage,
    platform_fee: Money<'a, Currency>,
    donation_presets: SmallVec<[Money<'a, Currency>; 4]>,
}

impl<'a> PricingConfig<'a> {
    /// Create a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the tax rate is outside `0%..=100%`, or if the fee or
    /// any preset is negative or in a different currency.
    pub fn new(
        currency: &'static Currency,
        tax_rate: Percentage,
        platform_fee: Money<'a, Currency>,
        donation_presets: impl IntoIterator<Item = Money<'a, Currency>>,
    ) -> Result<Self, ConfigError> {
        if !is_fractional(&tax_rate) {
            return Err(ConfigError::TaxRateOutOfRange);
        }

        check_amount("Platform fee", &platform_fee, currency)?;

        let donation_presets: SmallVec<[Money<'a, Currency>; 4]> =
            donation_presets.into_iter().collect();

        for preset in &donation_presets {
            check_amount("Donation preset", preset, currency)?;
        }

        Ok(Self {
            currency,
            tax_rate,
            platform_fee,
            donation_presets,
        })
    }

    /// Currency all amounts are priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Tax rate applied to the order subtotal.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Flat fee added to every order.
    pub fn platform_fee(&self) -> Money<'a, Currency> {
        self.platform_fee
    }

    /// Donation amounts offered at checkout.
    pub fn donation_presets(&self) -> &[Money<'a, Currency>] {
        &self.donation_presets
    }

    /// Zero in the configured currency.
    pub fn zero(&self) -> Money<'a, Currency> {
        Money::from_minor(0, self.currency)
    }

    /// Validate a donation chosen at checkout. Zero (no donation) is always allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDonation`] if the amount is neither zero nor a preset, or
    /// [`ConfigError::CurrencyMismatch`] if it is in another currency.
    pub fn donation(&self, amount: Money<'a, Currency>) -> Result<Money<'a, Currency>, ConfigError> {
        if amount.currency() != self.currency {
            return Err(ConfigError::CurrencyMismatch(
                "Donation",
                amount.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let minor = amount.to_minor_units();

        if minor == 0
            || self
                .donation_presets
                .iter()
                .any(|preset| preset.to_minor_units() == minor)
        {
            Ok(amount)
        } else {
            Err(ConfigError::UnknownDonation(amount.to_string()))
        }
    }
}

impl Default for PricingConfig<'_> {
    fn default() -> Self {
        Self {
            currency: iso::INR,
            tax_rate: Percentage::from(DEFAULT_TAX_RATE),
            platform_fee: Money::from_major(DEFAULT_PLATFORM_FEE, iso::INR),
            donation_presets: presets_in(iso::INR, &DEFAULT_DONATION_PRESETS),
        }
    }
}

fn check_amount(
    field: &'static str,
    amount: &Money<'_, Currency>,
    currency: &'static Currency,
) -> Result<(), ConfigError> {
    if amount.currency() != currency {
        return Err(ConfigError::CurrencyMismatch(
            field,
            amount.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if amount.to_minor_units() < 0 {
        return Err(ConfigError::NegativeAmount(field));
    }

    Ok(())
}

/// Donation presets in the given currency, from whole units.
pub fn presets_in<'a>(
    currency: &'a Currency,
    whole_units: &[i64],
) -> SmallVec<[Money<'a, Currency>; 4]> {
    whole_units
        .iter()
        .map(|units| Money::from_major(*units, currency))
        .collect()
}
