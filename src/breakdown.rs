//! Order pricing
//!
//! Turns a cart snapshot, an optional coupon and a donation into the itemized
//! totals shown at every checkout step.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    config::PricingConfig,
    coupons::{Coupon, CouponOutcome, evaluate_coupon},
    discounts::{DiscountError, percent_of_minor},
    pricing::{self, TotalPriceError, non_negative},
};

/// Errors that can occur while pricing an order.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The cart and the pricing configuration use different currencies.
    #[error("Cart is in {0}, but pricing is configured for {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Error summing the cart lines.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Error calculating tax.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Itemized totals for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown<'a> {
    /// Sum of list prices (MRP) across all units
    total_mrp: Money<'a, Currency>,

    /// Sum of selling prices across all units
    total_price: Money<'a, Currency>,

    /// Savings against MRP before any coupon
    total_discount: Money<'a, Currency>,

    /// Number of units in the cart
    item_count: u64,

    /// Result of checking the coupon, if one was given
    coupon: Option<CouponOutcome<'a>>,

    /// Flat platform fee
    platform_fee: Money<'a, Currency>,

    /// Donation added by the shopper
    donation: Money<'a, Currency>,

    /// Taxable amount: price after coupon, plus fee and donation
    subtotal: Money<'a, Currency>,

    /// Tax charged on the subtotal
    tax: Money<'a, Currency>,

    /// Amount payable
    final_total: Money<'a, Currency>,
}

impl<'a> PriceBreakdown<'a> {
    /// Sum of list prices (MRP) across all units.
    pub fn total_mrp(&self) -> Money<'a, Currency> {
        self.total_mrp
    }

    /// Sum of selling prices across all units.
    pub fn total_price(&self) -> Money<'a, Currency> {
        self.total_price
    }

    /// Savings against MRP before any coupon.
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Number of units in the cart.
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Outcome of the coupon check, if a coupon was given.
    pub fn coupon(&self) -> Option<&CouponOutcome<'a>> {
        self.coupon.as_ref()
    }

    /// Discount granted by the coupon. Zero without a coupon or when it was rejected.
    pub fn coupon_discount(&self) -> Money<'a, Currency> {
        self.coupon
            .as_ref()
            .map_or(Money::from_minor(0, self.total_price.currency()), CouponOutcome::discount)
    }

    /// Flat platform fee.
    pub fn platform_fee(&self) -> Money<'a, Currency> {
        self.platform_fee
    }

    /// Donation.
    pub fn donation(&self) -> Money<'a, Currency> {
        self.donation
    }

    /// Price after coupon, plus platform fee and donation. Tax is charged on this.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Tax charged on the subtotal.
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Amount payable.
    pub fn final_total(&self) -> Money<'a, Currency> {
        self.final_total
    }
}

/// Price an order.
///
/// The coupon is re-checked against the current cart on every call, so a coupon the
/// cart no longer qualifies for contributes nothing. Negative donations and fees are
/// treated as zero. An empty cart still pays the platform fee, the donation and tax
/// on both.
///
/// # Errors
///
/// Returns a [`PricingError`] if the cart, donation and configuration disagree on
/// currency, or if an amount overflows.
pub fn compute_order_totals<'a>(
    cart: &Cart<'a>,
    coupon: Option<&Coupon<'a>>,
    donation: Money<'a, Currency>,
    config: &PricingConfig<'a>,
) -> Result<PriceBreakdown<'a>, PricingError> {
    let currency = config.currency();

    if cart.currency() != currency {
        return Err(PricingError::CurrencyMismatch(
            cart.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    let total_mrp = pricing::total_mrp(cart.items(), currency)?;
    let total_price = pricing::total_price(cart.items(), currency)?;
    let total_discount = total_mrp.sub(total_price)?;
    let item_count = cart.item_count();

    let coupon = coupon.map(|coupon| evaluate_coupon(coupon, &total_price, item_count));
    let coupon_discount = coupon
        .as_ref()
        .map_or(Money::from_minor(0, currency), CouponOutcome::discount);

    let platform_fee = non_negative(config.platform_fee());
    let donation = non_negative(donation);

    let subtotal = total_price
        .sub(coupon_discount)?
        .add(platform_fee)?
        .add(donation)?;

    let tax = Money::from_minor(
        percent_of_minor(&config.tax_rate(), subtotal.to_minor_units())?,
        currency,
    );

    let final_total = subtotal.add(tax)?;

    Ok(PriceBreakdown {
        total_mrp,
        total_price,
        total_discount,
        item_count,
        coupon,
        platform_fee,
        donation,
        subtotal,
        tax,
        final_total,
    })
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{INR, USD};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{items::LineItem, products::ProductKey};

    use super::*;

    fn inr<'a>(minor: i64) -> Money<'a, Currency> {
        Money::from_minor(minor, INR)
    }

    fn test_cart<'a>() -> Result<Cart<'a>, crate::cart::CartError> {
        let mut keys: SlotMap<ProductKey, ()> = SlotMap::with_key();

        Cart::with_items(
            [
                LineItem::new(keys.insert(()), inr(129_900)),
                LineItem::new(keys.insert(()), inr(89_900)).with_quantity(2),
            ],
            INR,
        )
    }

    #[test]
    fn prices_cart_without_coupon() -> TestResult {
        let config = PricingConfig::default();
        let breakdown = compute_order_totals(&test_cart()?, None, config.zero(), &config)?;

        assert_eq!(breakdown.total_price(), inr(309_700));
        assert_eq!(breakdown.total_discount(), inr(0));
        assert_eq!(breakdown.coupon_discount(), inr(0));
        assert_eq!(breakdown.subtotal(), inr(311_700));
        assert_eq!(breakdown.tax(), inr(56_106));
        assert_eq!(breakdown.final_total(), inr(367_806));
        assert!(breakdown.coupon().is_none());

        Ok(())
    }

    #[test]
    fn total_discount_is_mrp_minus_price() -> TestResult {
        let mut keys: SlotMap<ProductKey, ()> = SlotMap::with_key();
        let cart = Cart::with_items(
            [LineItem::new(keys.insert(()), inr(129_900))
                .with_mrp(inr(199_900))
                .with_quantity(2)],
            INR,
        )?;

        let config = PricingConfig::default();
        let breakdown = compute_order_totals(&cart, None, config.zero(), &config)?;

        assert_eq!(breakdown.total_mrp(), inr(399_800));
        assert_eq!(breakdown.total_discount(), inr(140_000));

        Ok(())
    }

    #[test]
    fn capped_coupon_reduces_subtotal() -> TestResult {
        let config = PricingConfig::default();
        let coupon = Coupon::percentage("BLOOM10", Percentage::from(0.1))
            .with_max_discount(inr(20_000))
            .with_min_purchase(inr(29_900))
            .with_min_items(1);

        let breakdown =
            compute_order_totals(&test_cart()?, Some(&coupon), config.zero(), &config)?;

        assert_eq!(breakdown.coupon_discount(), inr(20_000));
        assert_eq!(breakdown.subtotal(), inr(291_700));
        assert_eq!(breakdown.tax(), inr(52_506));
        assert_eq!(breakdown.final_total(), inr(344_206));

        Ok(())
    }

    #[test]
    fn donation_is_added_and_taxed() -> TestResult {
        let config = PricingConfig::default();
        let breakdown = compute_order_totals(&test_cart()?, None, inr(5_000), &config)?;

        assert_eq!(breakdown.donation(), inr(5_000));
        assert_eq!(breakdown.subtotal(), inr(316_700));
        assert_eq!(breakdown.tax(), inr(57_006));

        Ok(())
    }

    #[test]
    fn empty_cart_still_pays_fee_donation_and_tax() -> TestResult {
        let config = PricingConfig::default();
        let breakdown = compute_order_totals(&Cart::new(INR), None, inr(1_000), &config)?;

        assert_eq!(breakdown.total_price(), inr(0));
        assert_eq!(breakdown.total_mrp(), inr(0));
        assert_eq!(breakdown.item_count(), 0);
        assert_eq!(breakdown.subtotal(), inr(3_000));
        assert_eq!(breakdown.tax(), inr(540));
        assert_eq!(breakdown.final_total(), inr(3_540));

        Ok(())
    }

    #[test]
    fn negative_donation_is_clamped() -> TestResult {
        let config = PricingConfig::default();
        let breakdown = compute_order_totals(&test_cart()?, None, inr(-5_000), &config)?;

        assert_eq!(breakdown.donation(), inr(0));
        assert_eq!(breakdown.subtotal(), inr(311_700));

        Ok(())
    }

    #[test]
    fn cart_currency_must_match_config() {
        let config = PricingConfig::default();

        assert_eq!(
            compute_order_totals(&Cart::new(USD), None, config.zero(), &config),
            Err(PricingError::CurrencyMismatch("USD", "INR"))
        );
    }

    #[test]
    fn donation_currency_must_match_config() {
        let config = PricingConfig::default();

        assert!(matches!(
            compute_order_totals(&Cart::new(INR), None, Money::from_minor(100, USD), &config),
            Err(PricingError::Money(MoneyError::CurrencyMismatch { .. }))
        ));
    }
}
