//! Pricing Configuration Fixtures

use serde::Deserialize;

use crate::{
    config::{DEFAULT_DONATION_PRESETS, DEFAULT_PLATFORM_FEE, PricingConfig},
    fixtures::{
        FixtureError,
        products::{parse_amount, parse_currency, parse_percentage},
    },
};

/// Pricing configuration in YAML
#[derive(Debug, Deserialize)]
pub struct ConfigFixture {
    /// ISO currency code (defaults to the product currency)
    #[serde(default)]
    pub currency: Option<String>,

    /// Tax rate (e.g., "18%")
    #[serde(default = "default_tax_rate")]
    pub tax_rate: String,

    /// Platform fee in whole units
    #[serde(default = "default_platform_fee")]
    pub platform_fee: f64,

    /// Donation presets in whole units
    #[serde(default = "default_donation_presets")]
    pub donation_presets: Vec<f64>,
}

impl ConfigFixture {
    /// Build a pricing configuration, using `fallback` when no currency is given.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the configuration is invalid.
    pub fn try_into_config(
        self,
        fallback: Option<&'static rusty_money::iso::Currency>,
    ) -> Result<PricingConfig<'static>, FixtureError> {
        let currency = match self.currency.as_deref() {
            Some(code) => parse_currency(code)?,
            None => fallback.ok_or(FixtureError::NoCurrency)?,
        };

        let tax_rate = parse_percentage(&self.tax_rate)?;
        let platform_fee = parse_amount(self.platform_fee, currency)?;

        let donation_presets = self
            .donation_presets
            .into_iter()
            .map(|preset| parse_amount(preset, currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PricingConfig::new(
            currency,
            tax_rate,
            platform_fee,
            donation_presets,
        )?)
    }
}

fn default_tax_rate() -> String {
    "18%".to_string()
}

#[expect(clippy::cast_precision_loss, reason = "small whole-unit constant")]
fn default_platform_fee() -> f64 {
    DEFAULT_PLATFORM_FEE as f64
}

#[expect(clippy::cast_precision_loss, reason = "small whole-unit constants")]
fn default_donation_presets() -> Vec<f64> {
    DEFAULT_DONATION_PRESETS
        .iter()
        .map(|preset| *preset as f64)
        .collect()
}
