//! Coupons
//!
//! Coupon records and the eligibility rules that turn a coupon into a discount
//! against a cart subtotal.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    discounts::{is_fractional, percent_of_whole_units},
    pricing::non_negative,
};

pub mod book;

/// Whether a coupon can currently be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouponStatus {
    /// Redeemable.
    #[default]
    Active,

    /// Expired, paused, or otherwise switched off.
    Inactive,
}

/// The discount a coupon grants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CouponDiscount<'a> {
    /// Take a percentage off the cart subtotal (e.g. "10% off")
    PercentageOff(Percentage),

    /// Take a fixed amount off the cart subtotal (e.g. "₹150 off")
    AmountOff(Money<'a, Currency>),
}

/// Coupon
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    code: String,
    discount: Option<CouponDiscount<'a>>,
    max_discount: Option<Money<'a, Currency>>,
    min_purchase: Option<Money<'a, Currency>>,
    min_items: Option<u32>,
    status: CouponStatus,
    description: Option<String>,
}

impl<'a> Coupon<'a> {
    /// Create an active coupon with no eligibility limits.
    ///
    /// `discount` is `None` for records whose discount type is missing or unrecognised;
    /// such coupons are never applicable.
    pub fn new(code: impl Into<String>, discount: Option<CouponDiscount<'a>>) -> Self {
        Self {
            code: code.into(),
            discount,
            max_discount: None,
            min_purchase: None,
            min_items: None,
            status: CouponStatus::Active,
            description: None,
        }
    }

    /// Create a percentage-off coupon.
    pub fn percentage(code: impl Into<String>, percent: Percentage) -> Self {
        Self::new(code, Some(CouponDiscount::PercentageOff(percent)))
    }

    /// Create a fixed amount-off coupon.
    pub fn fixed(code: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self::new(code, Some(CouponDiscount::AmountOff(amount)))
    }

    /// Cap the discount of a percentage coupon.
    #[must_use]
    pub fn with_max_discount(mut self, max_discount: Money<'a, Currency>) -> Self {
        self.max_discount = Some(max_discount);
        self
    }

    /// Require a minimum cart subtotal.
    #[must_use]
    pub fn with_min_purchase(mut self, min_purchase: Money<'a, Currency>) -> Self {
        self.min_purchase = Some(min_purchase);
        self
    }

    /// Require a minimum number of units in the cart.
    #[must_use]
    pub fn with_min_items(mut self, min_items: u32) -> Self {
        self.min_items = Some(min_items);
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: CouponStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the description shown alongside the code.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Coupon code, as issued.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns true if `code` names this coupon, ignoring case and surrounding whitespace.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim().to_lowercase() == code.trim().to_lowercase()
    }

    /// The discount granted, if the record had a valid discount type.
    pub fn discount(&self) -> Option<&CouponDiscount<'a>> {
        self.discount.as_ref()
    }

    /// Cap on percentage discounts.
    pub fn max_discount(&self) -> Option<&Money<'a, Currency>> {
        self.max_discount.as_ref()
    }

    /// Minimum cart subtotal.
    pub fn min_purchase(&self) -> Option<&Money<'a, Currency>> {
        self.min_purchase.as_ref()
    }

    /// Minimum number of units.
    pub fn min_items(&self) -> Option<u32> {
        self.min_items
    }

    /// Status
    pub fn status(&self) -> CouponStatus {
        self.status
    }

    /// Description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Why a coupon could not be applied.
///
/// The display form is the message shown next to the coupon.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CouponRejection<'a> {
    /// The record has no usable discount type.
    #[error("Coupon has no discount")]
    MissingDiscount,

    /// The discount is negative, or a percentage above 100%.
    #[error("Coupon discount is invalid")]
    InvalidDiscount,

    /// An amount on the coupon is in a different currency from the cart.
    #[error("Coupon is in {coupon}, but cart is in {cart}")]
    CurrencyMismatch {
        /// Coupon currency code.
        coupon: &'static str,

        /// Cart currency code.
        cart: &'static str,
    },

    /// The coupon is not active.
    #[error("Coupon has expired or is inactive")]
    Inactive,

    /// The cart subtotal is below the coupon's minimum purchase.
    #[error("Min purchase {required}")]
    MinimumPurchaseNotMet {
        /// Minimum purchase amount.
        required: Money<'a, Currency>,
    },

    /// The cart holds fewer units than the coupon requires.
    #[error("Min {required} items, cart has {actual}")]
    MinimumItemsNotMet {
        /// Units required.
        required: u32,

        /// Units in the cart.
        actual: u64,
    },
}

/// Result of checking a coupon against a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponOutcome<'a> {
    discount: Money<'a, Currency>,
    rejection: Option<CouponRejection<'a>>,
}

impl<'a> CouponOutcome<'a> {
    fn applied(discount: Money<'a, Currency>) -> Self {
        Self {
            discount,
            rejection: None,
        }
    }

    fn rejected(rejection: CouponRejection<'a>, currency: &'a Currency) -> Self {
        Self {
            discount: Money::from_minor(0, currency),
            rejection: Some(rejection),
        }
    }

    /// Returns true if the coupon applies.
    pub fn is_applicable(&self) -> bool {
        self.rejection.is_none()
    }

    /// Discount granted. Zero when the coupon was rejected.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Why the coupon was rejected, if it was.
    pub fn reason(&self) -> Option<&CouponRejection<'a>> {
        self.rejection.as_ref()
    }
}

/// Check a coupon against a cart subtotal and unit count, and compute its discount.
///
/// Rules are checked in order: discount shape, status, minimum purchase, minimum items.
/// A malformed coupon reports its shape problem even when it is also inactive.
/// Percentage discounts are rounded to the nearest whole currency unit and then capped
/// by `max_discount`. Fixed discounts never exceed the subtotal.
///
/// Rejection is a normal outcome, never an error.
pub fn evaluate_coupon<'a>(
    coupon: &Coupon<'a>,
    cart_subtotal: &Money<'a, Currency>,
    item_count: u64,
) -> CouponOutcome<'a> {
    let subtotal = non_negative(*cart_subtotal);
    let currency = subtotal.currency();

    let outcome = match check_eligibility(coupon, &subtotal, item_count) {
        Err(rejection) => CouponOutcome::rejected(rejection, currency),
        Ok(discount) => match discount_amount(coupon, discount, &subtotal) {
            Some(amount) => CouponOutcome::applied(amount),
            None => CouponOutcome::rejected(CouponRejection::InvalidDiscount, currency),
        },
    };

    match outcome.reason() {
        Some(reason) => debug!(code = coupon.code(), %reason, "coupon rejected"),
        None => debug!(code = coupon.code(), discount = %outcome.discount(), "coupon applied"),
    }

    outcome
}

fn check_eligibility<'a, 'c>(
    coupon: &'c Coupon<'a>,
    subtotal: &Money<'a, Currency>,
    item_count: u64,
) -> Result<&'c CouponDiscount<'a>, CouponRejection<'a>> {
    let discount = coupon.discount().ok_or(CouponRejection::MissingDiscount)?;

    check_shape(coupon, discount, subtotal.currency())?;

    if coupon.status() != CouponStatus::Active {
        return Err(CouponRejection::Inactive);
    }

    if let Some(required) = coupon.min_purchase()
        && subtotal.to_minor_units() < required.to_minor_units()
    {
        return Err(CouponRejection::MinimumPurchaseNotMet {
            required: *required,
        });
    }

    if let Some(required) = coupon.min_items()
        && item_count < u64::from(required)
    {
        return Err(CouponRejection::MinimumItemsNotMet {
            required,
            actual: item_count,
        });
    }

    Ok(discount)
}

fn check_shape<'a>(
    coupon: &Coupon<'a>,
    discount: &CouponDiscount<'a>,
    currency: &Currency,
) -> Result<(), CouponRejection<'a>> {
    let amount = match discount {
        CouponDiscount::PercentageOff(percent) => {
            if !is_fractional(percent) {
                return Err(CouponRejection::InvalidDiscount);
            }

            None
        }
        CouponDiscount::AmountOff(amount) => Some(amount),
    };

    let amounts = [amount, coupon.max_discount(), coupon.min_purchase()];

    for money in amounts.into_iter().flatten() {
        if money.currency() != currency {
            return Err(CouponRejection::CurrencyMismatch {
                coupon: money.currency().iso_alpha_code,
                cart: currency.iso_alpha_code,
            });
        }
    }

    let negative_amount = amount.is_some_and(|money| money.to_minor_units() < 0);
    let negative_cap = coupon
        .max_discount()
        .is_some_and(|money| money.to_minor_units() < 0);

    if negative_amount || negative_cap {
        return Err(CouponRejection::InvalidDiscount);
    }

    Ok(())
}

fn discount_amount<'a>(
    coupon: &Coupon<'a>,
    discount: &CouponDiscount<'a>,
    subtotal: &Money<'a, Currency>,
) -> Option<Money<'a, Currency>> {
    match discount {
        CouponDiscount::PercentageOff(percent) => {
            let raw = percent_of_whole_units(percent, subtotal)
                .inspect_err(|err| warn!(code = coupon.code(), %err, "coupon discount overflowed"))
                .ok()?;

            Some(match coupon.max_discount() {
                Some(cap) if cap.to_minor_units() < raw.to_minor_units() => *cap,
                _ => raw,
            })
        }
        CouponDiscount::AmountOff(amount) => {
            if amount.to_minor_units() > subtotal.to_minor_units() {
                Some(*subtotal)
            } else {
                Some(*amount)
            }
        }
    }
}
