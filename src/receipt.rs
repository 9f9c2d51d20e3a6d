//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::MoneyError;
use slotmap::SlotMap;
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    breakdown::PriceBreakdown,
    cart::Cart,
    pricing::{self, TotalPriceError},
    products::{Product, ProductKey},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Error finding a product in the product catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of a priced order.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Totals the receipt is rendered from
    breakdown: PriceBreakdown<'a>,

    /// Code of the coupon the shopper entered, if any
    coupon_code: Option<String>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for a price breakdown.
    #[must_use]
    pub fn new(breakdown: PriceBreakdown<'a>) -> Self {
        Self {
            breakdown,
            coupon_code: None,
        }
    }

    /// Label the coupon line with the code the shopper entered.
    #[must_use]
    pub fn with_coupon_code(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }

    /// The totals this receipt shows.
    #[must_use]
    pub fn breakdown(&self) -> &PriceBreakdown<'a> {
        &self.breakdown
    }

    /// The coupon code shown on the coupon line.
    #[must_use]
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Writes the item table and the price summary.
    ///
    /// `tax_rate` is only used for the tax label.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a cart line has no product metadata, a line total
    /// overflows, or the output cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        cart: &Cart<'_>,
        product_meta: &SlotMap<ProductKey, Product<'_>>,
        tax_rate: Percentage,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        push_receipt_header(&mut builder);

        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

        append_item_rows(cart, product_meta, &mut builder, &mut color_ops)?;

        write_receipt_table(&mut out, builder, color_ops)?;

        write_receipt_summary(&mut out, self, tax_rate)?;

        Ok(())
    }
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record(["", "Item", "Qty", "MRP", "Price", "Total"]);
}

fn append_item_rows(
    cart: &Cart<'_>,
    product_meta: &SlotMap<ProductKey, Product<'_>>,
    builder: &mut Builder,
    color_ops: &mut SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    for (idx, item) in cart.iter().enumerate() {
        let product = product_meta
            .get(item.product())
            .ok_or(ReceiptError::MissingProduct(item.product()))?;

        let line_total = pricing::extended(item.unit_price(), item.quantity())?;
        let discounted = item.mrp() != item.unit_price();

        let mrp = if discounted {
            format!("{}", item.mrp())
        } else {
            String::new()
        };

        builder.push_record([
            format!("#{:<3}", idx + 1),
            product.name.clone(),
            item.quantity().to_string(),
            mrp,
            format!("{}", item.unit_price()),
            format!("{line_total}"),
        ]);

        // Row 0 is the header.
        let row = idx + 1;

        color_ops.push((row, 0, color_dark_grey()));

        if discounted {
            color_ops.push((row, 3, color_dark_grey()));
            color_ops.push((row, 4, Color::FG_GREEN));
        }
    }

    Ok(())
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
    tax_rate: Percentage,
) -> Result<(), ReceiptError> {
    let breakdown = receipt.breakdown();
    let tax_points = percent_points_from_fractional_percentage(tax_rate);

    let coupon_label = match receipt.coupon_code() {
        Some(code) => format!(" Coupon ({code}):"),
        None => " Coupon:".to_string(),
    };

    let coupon_value = match breakdown.coupon() {
        Some(outcome) => match outcome.reason() {
            Some(reason) => format!("\x1b[90mNot applied: {reason}\x1b[0m  "),
            None => format!("-{}  ", outcome.discount()),
        },
        None => "\x1b[90mNone\x1b[0m  ".to_string(),
    };

    let lines: SmallVec<[(String, String); 8]> = smallvec![
        (" Total MRP:".to_string(), format!("{}  ", breakdown.total_mrp())),
        (
            " Discount on MRP:".to_string(),
            format!("-{}  ", breakdown.total_discount()),
        ),
        (coupon_label, coupon_value),
        (
            " Platform fee:".to_string(),
            format!("{}  ", breakdown.platform_fee()),
        ),
        (" Donation:".to_string(), format!("{}  ", breakdown.donation())),
        (" Subtotal:".to_string(), format!("{}  ", breakdown.subtotal())),
        (
            format!(" Tax ({tax_points}%):"),
            format!("{}  ", breakdown.tax()),
        ),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", breakdown.final_total()),
        ),
    ];

    let label_width = lines
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = lines
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &lines {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.18), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F. Consecutive
/// border characters share one escape sequence and cell content is left untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string, in characters.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a right-aligned value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
