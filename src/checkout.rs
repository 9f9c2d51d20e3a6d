//! Checkout session
//!
//! One state container for everything the checkout pages read: the cart, the
//! applied coupon and the donation. Pages change it by dispatching actions and
//! read prices from [`CheckoutSession::breakdown`], so the cart page and the
//! address page always agree.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    breakdown::{PriceBreakdown, PricingError, compute_order_totals},
    cart::{Cart, CartError},
    config::{ConfigError, PricingConfig},
    coupons::Coupon,
    items::LineItem,
    products::ProductKey,
};

/// Errors applying a checkout action.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The cart rejected the edit.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The donation is not one of the offered amounts.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The cart is priced in a different currency from the configuration.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A change to the checkout state.
#[derive(Debug, Clone)]
pub enum CheckoutAction<'a> {
    /// Add a line, merging with an existing line for the same product.
    AddItem(LineItem<'a>),

    /// Change a product's quantity. Zero removes it.
    SetQuantity {
        /// Product to change.
        product: ProductKey,

        /// New quantity.
        quantity: u32,
    },

    /// Remove a product from the cart.
    RemoveItem(ProductKey),

    /// Apply a coupon, replacing any previous one.
    ///
    /// Eligibility is not checked here; it is checked every time the order is priced.
    ApplyCoupon(Coupon<'a>),

    /// Remove the applied coupon.
    RemoveCoupon,

    /// Choose a donation from the presets, or zero for none.
    SetDonation(Money<'a, Currency>),

    /// Empty the cart and reset coupon and donation, e.g. after an order is placed.
    Clear,
}

/// Checkout state for a single shopper.
#[derive(Debug, Clone)]
pub struct CheckoutSession<'a> {
    config: PricingConfig<'a>,
    cart: Cart<'a>,
    coupon: Option<Coupon<'a>>,
    donation: Money<'a, Currency>,
}

impl<'a> CheckoutSession<'a> {
    /// Start a session with an empty cart.
    pub fn new(config: PricingConfig<'a>) -> Self {
        let cart = Cart::new(config.currency());
        let donation = config.zero();

        Self {
            config,
            cart,
            coupon: None,
            donation,
        }
    }

    /// Start a session from an existing cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] if the cart currency differs from the configuration.
    pub fn with_cart(config: PricingConfig<'a>, cart: Cart<'a>) -> Result<Self, CheckoutError> {
        if cart.currency() != config.currency() {
            return Err(PricingError::CurrencyMismatch(
                cart.currency().iso_alpha_code,
                config.currency().iso_alpha_code,
            )
            .into());
        }

        let donation = config.zero();

        Ok(Self {
            config,
            cart,
            coupon: None,
            donation,
        })
    }

    /// Apply an action. On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the cart rejects the edit or the donation is not offered.
    pub fn dispatch(&mut self, action: CheckoutAction<'a>) -> Result<(), CheckoutError> {
        debug!(?action, "checkout action");

        match action {
            CheckoutAction::AddItem(item) => self.cart.add(item)?,
            CheckoutAction::SetQuantity { product, quantity } => {
                self.cart.set_quantity(product, quantity)?;
            }
            CheckoutAction::RemoveItem(product) => {
                self.cart.remove(product)?;
            }
            CheckoutAction::ApplyCoupon(coupon) => self.coupon = Some(coupon),
            CheckoutAction::RemoveCoupon => self.coupon = None,
            CheckoutAction::SetDonation(amount) => self.donation = self.config.donation(amount)?,
            CheckoutAction::Clear => {
                self.cart.clear();
                self.coupon = None;
                self.donation = self.config.zero();
            }
        }

        Ok(())
    }

    /// Price the current state.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an amount overflows.
    pub fn breakdown(&self) -> Result<PriceBreakdown<'a>, PricingError> {
        compute_order_totals(
            &self.cart,
            self.coupon.as_ref(),
            self.donation,
            &self.config,
        )
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The applied coupon, whether or not the cart currently qualifies for it.
    pub fn coupon(&self) -> Option<&Coupon<'a>> {
        self.coupon.as_ref()
    }

    /// The chosen donation.
    pub fn donation(&self) -> Money<'a, Currency> {
        self.donation
    }

    /// The pricing configuration.
    pub fn config(&self) -> &PricingConfig<'a> {
        &self.config
    }
}
