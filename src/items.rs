//! Items

use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductKey};

/// A cart line: one product at a unit price, bought `quantity` times.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    unit_price: Money<'a, Currency>,
    mrp: Option<Money<'a, Currency>>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item with a quantity of one and no separate MRP.
    pub fn new(product: ProductKey, unit_price: Money<'a, Currency>) -> Self {
        Self {
            product,
            unit_price,
            mrp: None,
            quantity: 1,
        }
    }

    /// Creates a line item for a catalog product.
    pub fn for_product(product_key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        Self {
            product: product_key,
            unit_price: product.price,
            mrp: product.mrp,
            quantity,
        }
    }

    /// Sets the maximum retail price.
    #[must_use]
    pub fn with_mrp(mut self, mrp: Money<'a, Currency>) -> Self {
        self.mrp = Some(mrp);
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Returns the product of the line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the selling price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the list price of a single unit, falling back to the selling price.
    pub fn mrp(&self) -> &Money<'a, Currency> {
        self.mrp.as_ref().unwrap_or(&self.unit_price)
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}
