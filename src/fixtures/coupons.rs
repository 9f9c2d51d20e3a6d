//! Coupon Fixtures
//!
//! Coupon records as the storefront's coupon collection stores them. Amounts are
//! plain numbers in whole units of the fixture currency.

use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponDiscount, CouponStatus},
    fixtures::{
        FixtureError,
        products::{fraction_to_percentage, parse_amount},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupon records, in display order
    pub coupons: Vec<CouponFixture>,
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon code
    pub code: String,

    /// `percentage` or `fixed`; anything else leaves the coupon without a discount
    #[serde(default)]
    pub discount_type: Option<String>,

    /// Percentage points, or an amount in whole units; a record without one has no discount
    #[serde(default)]
    pub discount: Option<f64>,

    /// Cap for percentage coupons
    #[serde(default)]
    pub max_discount: Option<f64>,

    /// Minimum cart subtotal
    #[serde(default)]
    pub min_purchase: Option<f64>,

    /// Minimum number of units
    #[serde(default)]
    pub min_items: Option<u32>,

    /// `Active` or anything else
    #[serde(default = "default_status")]
    pub status: String,

    /// Shown next to the code
    #[serde(default)]
    pub description: Option<String>,
}

impl CouponFixture {
    /// Convert the record into a coupon priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidPrice`] if an amount is not a finite number, or
    /// [`FixtureError::InvalidPercentage`] if a percentage is not.
    pub fn try_into_coupon(
        self,
        currency: &'static Currency,
    ) -> Result<Coupon<'static>, FixtureError> {
        let discount_type = self.discount_type.as_deref().map(str::to_lowercase);

        let discount = match (discount_type.as_deref(), self.discount) {
            (Some("percentage"), Some(points)) => Some(CouponDiscount::PercentageOff(
                fraction_to_percentage(points / 100.0)?,
            )),
            (Some("fixed"), Some(amount)) => {
                Some(CouponDiscount::AmountOff(parse_amount(amount, currency)?))
            }
            _ => None,
        };

        let status = if self.status == "Active" {
            CouponStatus::Active
        } else {
            CouponStatus::Inactive
        };

        let mut coupon = Coupon::new(self.code, discount).with_status(status);

        if let Some(max_discount) = self.max_discount {
            coupon = coupon.with_max_discount(parse_amount(max_discount, currency)?);
        }

        if let Some(min_purchase) = self.min_purchase {
            coupon = coupon.with_min_purchase(parse_amount(min_purchase, currency)?);
        }

        if let Some(min_items) = self.min_items {
            coupon = coupon.with_min_items(min_items);
        }

        if let Some(description) = self.description {
            coupon = coupon.with_description(description);
        }

        Ok(coupon)
    }
}

fn default_status() -> String {
    "Active".to_string()
}
