//! Cart

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{self, TotalPriceError},
    products::ProductKey,
};

/// Errors related to cart construction or edits.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A product was not found in the cart.
    #[error("Product not found in cart")]
    ProductNotFound(ProductKey),
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: SmallVec<[LineItem<'a>; 8]>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: SmallVec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_items(
        items: impl IntoIterator<Item = LineItem<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items: SmallVec<[LineItem<'a>; 8]> = items.into_iter().collect();

        items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_currency(i, item, currency))?;

        Ok(Cart { items, currency })
    }

    /// Add a line to the cart.
    ///
    /// Adding a product that is already in the cart increases that line's quantity and
    /// takes the new line's unit price and MRP, so the cart follows the latest catalog price.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the line's currency differs from the cart's.
    pub fn add(&mut self, item: LineItem<'a>) -> Result<(), CartError> {
        check_currency(self.items.len(), &item, self.currency)?;

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.product() == item.product())
        {
            let quantity = existing.quantity().saturating_add(item.quantity());

            *existing = item.with_quantity(quantity);
        } else {
            self.items.push(item);
        }

        Ok(())
    }

    /// Change the quantity of a product's line. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ProductNotFound` if the product is not in the cart.
    pub fn set_quantity(&mut self, product: ProductKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product).map(|_removed| ());
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.product() == product)
            .ok_or(CartError::ProductNotFound(product))?;

        line.set_quantity(quantity);

        Ok(())
    }

    /// Remove a product's line from the cart, returning it.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ProductNotFound` if the product is not in the cart.
    pub fn remove(&mut self, product: ProductKey) -> Result<LineItem<'a>, CartError> {
        let idx = self
            .items
            .iter()
            .position(|line| line.product() == product)
            .ok_or(CartError::ProductNotFound(product))?;

        Ok(self.items.remove(idx))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Calculate the selling-price subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        pricing::total_price(&self.items, self.currency)
    }

    /// Get a product's line.
    pub fn get(&self, product: ProductKey) -> Option<&LineItem<'a>> {
        self.items.iter().find(|line| line.product() == product)
    }

    /// The lines in the cart.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Total number of units in the cart.
    pub fn item_count(&self) -> u64 {
        pricing::item_count(&self.items)
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn check_currency(
    idx: usize,
    item: &LineItem<'_>,
    currency: &'static Currency,
) -> Result<(), CartError> {
    [item.unit_price(), item.mrp()]
        .into_iter()
        .map(Money::currency)
        .find(|item_currency| *item_currency != currency)
        .map_or(Ok(()), |item_currency| {
            Err(CartError::CurrencyMismatch(
                idx,
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ))
        })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{INR, USD};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    fn keys(n: usize) -> Vec<ProductKey> {
        let mut map: SlotMap<ProductKey, ()> = SlotMap::with_key();

        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(INR);

        assert_eq!(cart.currency(), INR);
        assert!(cart.is_empty());
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let keys = keys(2);
        let items = keys.iter().zip([INR, USD]).map(|(key, currency)| {
            LineItem::new(*key, Money::from_minor(100, currency))
        });

        let result = Cart::with_items(items, INR);

        assert_eq!(
            result.map(|cart| cart.len()),
            Err(CartError::CurrencyMismatch(
                1,
                USD.iso_alpha_code,
                INR.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_items_rejects_mrp_in_other_currency() {
        let keys = keys(1);
        let items = keys.iter().map(|key| {
            LineItem::new(*key, Money::from_minor(100, INR)).with_mrp(Money::from_minor(200, USD))
        });

        assert!(matches!(
            Cart::with_items(items, INR),
            Err(CartError::CurrencyMismatch(0, "USD", "INR"))
        ));
    }

    #[test]
    fn add_merges_lines_for_same_product() -> TestResult {
        let keys = keys(2);
        let mut cart = Cart::new(INR);

        for key in &keys {
            cart.add(LineItem::new(*key, Money::from_minor(89_900, INR)))?;
        }

        if let Some(key) = keys.first() {
            cart.add(LineItem::new(*key, Money::from_minor(89_900, INR)).with_quantity(2))?;
        }

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 4);

        Ok(())
    }

    #[test]
    fn add_takes_latest_price_for_same_product() -> TestResult {
        let keys = keys(1);
        let [scarf] = keys.as_slice() else {
            return Err("expected one key".into());
        };

        let mut cart = Cart::new(INR);

        cart.add(
            LineItem::new(*scarf, Money::from_minor(59_900, INR))
                .with_mrp(Money::from_minor(79_900, INR)),
        )?;
        cart.add(LineItem::new(*scarf, Money::from_minor(49_900, INR)).with_quantity(2))?;

        let line = cart.get(*scarf).ok_or("scarf line missing")?;

        assert_eq!(line.quantity(), 3);
        assert_eq!(line.unit_price(), &Money::from_minor(49_900, INR));
        assert_eq!(line.mrp(), &Money::from_minor(49_900, INR));
        assert_eq!(cart.subtotal()?, Money::from_minor(149_700, INR));

        Ok(())
    }

    #[test]
    fn set_quantity_updates_and_zero_removes() -> TestResult {
        let keys = keys(2);
        let mut cart = Cart::with_items(
            keys.iter()
                .map(|key| LineItem::new(*key, Money::from_minor(100, INR))),
            INR,
        )?;

        let [first, second] = keys.as_slice() else {
            return Err("expected two keys".into());
        };

        cart.set_quantity(*first, 5)?;
        cart.set_quantity(*second, 0)?;

        assert_eq!(cart.get(*first).map(LineItem::quantity), Some(5));
        assert!(cart.get(*second).is_none());
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn remove_missing_product_errors() {
        let keys = keys(1);
        let mut cart = Cart::new(INR);

        for key in keys {
            assert_eq!(
                cart.remove(key).map(|line| line.quantity()),
                Err(CartError::ProductNotFound(key))
            );
        }
    }

    #[test]
    fn subtotal_with_items() -> TestResult {
        let keys = keys(2);
        let [shirt, tote] = keys.as_slice() else {
            return Err("expected two keys".into());
        };

        let cart = Cart::with_items(
            [
                LineItem::new(*shirt, Money::from_minor(129_900, INR)),
                LineItem::new(*tote, Money::from_minor(89_900, INR)).with_quantity(2),
            ],
            INR,
        )?;

        assert_eq!(cart.subtotal()?, Money::from_minor(309_700, INR));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_items() -> TestResult {
        let cart = Cart::new(INR);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let keys = keys(3);
        let mut cart = Cart::with_items(
            keys.iter()
                .map(|key| LineItem::new(*key, Money::from_minor(100, INR))),
            INR,
        )?;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);

        Ok(())
    }
}
