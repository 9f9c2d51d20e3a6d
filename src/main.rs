//! Checkout
//!
//! Prices a fixture cart the way the storefront's checkout pages do and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to apply a coupon code
//! Use `-d` to add a donation (one of the configured presets, in whole units)
//! Use `--list-coupons` to show every coupon and whether the cart qualifies
//!
//! Set `RUST_LOG=bloom_checkout=debug` to trace coupon checks.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Result, anyhow};
use bloom_checkout::{
    checkout::{CheckoutAction, CheckoutSession},
    coupons::book::CouponBook,
    fixtures::Fixture,
    receipt::Receipt,
};
use clap::Parser;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Color, Style, object::Rows},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Arguments for the checkout binary
#[derive(Debug, Parser)]
#[command(name = "checkout", version, about)]
struct CheckoutArgs {
    /// Fixture set to use for the cart, coupons and pricing configuration
    #[clap(short, long, default_value = "bloom")]
    fixture: String,

    /// Coupon code to apply (case-insensitive)
    #[clap(short, long)]
    coupon: Option<String>,

    /// Donation in whole units
    #[clap(short, long, default_value_t = 0)]
    donation: i64,

    /// Directory holding the fixture sets
    #[clap(long, env = "BLOOM_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// List every coupon with its eligibility for the cart
    #[clap(long)]
    list_coupons: bool,
}

fn main() -> Result<()> {
    let args = CheckoutArgs::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init()
        .map_err(|err| anyhow!(err))?;

    let fixture = Fixture::from_set_in(&args.fixtures, &args.fixture)?;
    let coupons = fixture.coupons()?;

    info!(set = %args.fixture, coupons = coupons.len(), "fixture loaded");

    let mut session = CheckoutSession::with_cart(fixture.config(), fixture.cart()?)?;

    if let Some(code) = args.coupon.as_deref() {
        let coupon = coupons
            .find(code)
            .ok_or_else(|| anyhow!("Unknown coupon code: {code}"))?;

        session.dispatch(CheckoutAction::ApplyCoupon(coupon.clone()))?;
    }

    let currency = session.config().currency();

    session.dispatch(CheckoutAction::SetDonation(Money::from_major(
        args.donation,
        currency,
    )))?;

    let breakdown = session.breakdown()?;

    let mut receipt = Receipt::new(breakdown.clone());

    if let Some(coupon) = session.coupon() {
        receipt = receipt.with_coupon_code(coupon.code());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    receipt.write_to(
        &mut handle,
        session.cart(),
        fixture.product_meta_map(),
        session.config().tax_rate(),
    )?;

    if args.list_coupons {
        write_coupon_list(
            &mut handle,
            &coupons,
            breakdown.total_price(),
            breakdown.item_count(),
        )?;
    }

    Ok(())
}

fn write_coupon_list(
    out: &mut impl Write,
    coupons: &CouponBook<'_>,
    subtotal: Money<'_, Currency>,
    item_count: u64,
) -> Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Code", "Description", "Discount", "Eligibility"]);

    for (coupon, outcome) in coupons.evaluate_all(subtotal, item_count) {
        let eligibility = match outcome.reason() {
            Some(reason) => reason.to_string(),
            None => "Applicable".to_string(),
        };

        builder.push_record([
            coupon.code().to_string(),
            coupon.description().unwrap_or_default().to_string(),
            format!("{}", outcome.discount()),
            eligibility,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "{table}")?;

    if let Some((best, outcome)) = coupons.best_for(&subtotal, item_count) {
        writeln!(out, "\nBest coupon: {} ({})", best.code(), outcome.discount())?;
    }

    Ok(())
}
