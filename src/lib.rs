//! Bloom Checkout
//!
//! Order pricing and coupon eligibility for the Bloom storefront. Every checkout surface
//! prices an order through [`breakdown::compute_order_totals`], so the cart, address and
//! payment pages always show the same numbers.

pub mod breakdown;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod pricing;
pub mod products;
pub mod receipt;
