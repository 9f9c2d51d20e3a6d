//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Current selling price
    pub price: Money<'a, Currency>,

    /// Maximum retail price, when it differs from the selling price
    pub mrp: Option<Money<'a, Currency>>,
}

impl<'a> Product<'a> {
    /// Returns the list price, falling back to the selling price.
    pub fn list_price(&self) -> Money<'a, Currency> {
        self.mrp.unwrap_or(self.price)
    }
}
