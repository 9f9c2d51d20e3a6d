//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    config::{ConfigError, PricingConfig},
    coupons::{
        Coupon,
        book::{CouponBook, CouponBookError},
    },
    fixtures::{
        carts::CartFixture, config::ConfigFixture, coupons::CouponsFixture,
        products::ProductsFixture,
    },
    items::LineItem,
    products::{Product, ProductKey},
};

pub mod carts;
pub mod config;
pub mod coupons;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),

    /// Invalid pricing configuration
    #[error("Invalid pricing configuration: {0}")]
    Config(#[from] ConfigError),

    /// Invalid coupon collection
    #[error("Invalid coupons: {0}")]
    Coupons(#[from] CouponBookError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// `SlotMap` to store the products with generated keys
    product_meta: SlotMap<ProductKey, Product<'a>>,

    /// String key -> `SlotMap` key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,

    /// Pre-built cart lines (reference products by `ProductKey`)
    items: Vec<LineItem<'a>>,

    /// Coupon records, in file order
    coupons: Vec<Coupon<'a>>,

    /// Pricing configuration, if one was loaded
    config: Option<PricingConfig<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static rusty_money::iso::Currency>,
}

impl Fixture<'static> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_meta: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            items: Vec::new(),
            coupons: Vec::new(),
            config: None,
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("products", name)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let product: Product<'static> = product_fixture.try_into()?;
            let currency = product.price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product_key = self.product_meta.insert(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("carts", name)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            let product_key = self.product_key(&line.product)?;

            let product = self
                .product_meta
                .get(product_key)
                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;

            self.items
                .push(LineItem::for_product(product_key, product, line.quantity()));
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// Amounts are read in the currency of the loaded products.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if no products are loaded.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let contents = self.read("coupons", name)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for coupon_fixture in fixture.coupons {
            self.coupons.push(coupon_fixture.try_into_coupon(currency)?);
        }

        Ok(self)
    }

    /// Load the pricing configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the configuration is invalid.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("config", name)?;
        let fixture: ConfigFixture = serde_norway::from_str(&contents)?;

        self.config = Some(fixture.try_into_config(self.currency)?);

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, coupons and, if present, config)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_coupons(name)?;

        if fixture.path("config", name).exists() {
            fixture.load_config(name)?;
        }

        Ok(fixture)
    }

    fn path(&self, category: &str, name: &str) -> PathBuf {
        self.base_path.join(category).join(format!("{name}.yml"))
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        Ok(fs::read_to_string(self.path(category, name))?)
    }
}

impl<'a> Fixture<'a> {
    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.product_meta
            .get(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get all cart lines
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency()?;

        Ok(Cart::with_items(self.items.iter().copied(), currency)?)
    }

    /// Create a coupon book from the loaded coupons
    ///
    /// # Errors
    ///
    /// Returns an error if two coupons share a code.
    pub fn coupons(&self) -> Result<CouponBook<'a>, FixtureError> {
        Ok(CouponBook::new(self.coupons.iter().cloned())?)
    }

    /// The loaded pricing configuration, or the storefront defaults.
    pub fn config(&self) -> PricingConfig<'a> {
        self.config.clone().unwrap_or_default()
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static rusty_money::iso::Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Get the product metadata `SlotMap`
    pub fn product_meta_map(&self) -> &SlotMap<ProductKey, Product<'a>> {
        &self.product_meta
    }
}

impl Default for Fixture<'static> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{
        Money,
        iso::{GBP, INR},
    };
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn small_set() -> TestResult<TempDir> {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "small",
            "products:\n  shirt:\n    name: Linen Shirt\n    price: 1299 INR\n    mrp: 1499 INR\n  tote:\n    name: Canvas Tote\n    price: 899 INR\n",
        )?;

        write_fixture(
            dir.path(),
            "carts",
            "small",
            "items:\n  - product: shirt\n  - product: tote\n    quantity: 2\n",
        )?;

        write_fixture(
            dir.path(),
            "coupons",
            "small",
            "coupons:\n  - code: BLOOM10\n    discount_type: percentage\n    discount: 10\n    max_discount: 200\n",
        )?;

        Ok(dir)
    }

    #[test]
    fn fixture_from_set_loads_all_fixtures() -> TestResult {
        let dir = small_set()?;
        let fixture = Fixture::from_set_in(dir.path(), "small")?;

        assert_eq!(fixture.product_keys.len(), 2);
        assert_eq!(fixture.items().len(), 2);
        assert_eq!(fixture.coupons()?.len(), 1);
        assert_eq!(fixture.currency()?, INR);

        let shirt = fixture.product("shirt")?;

        assert_eq!(shirt.name, "Linen Shirt");
        assert_eq!(shirt.mrp, Some(Money::from_minor(149_900, INR)));

        Ok(())
    }

    #[test]
    fn fixture_without_config_uses_defaults() -> TestResult {
        let dir = small_set()?;
        let fixture = Fixture::from_set_in(dir.path(), "small")?;

        assert_eq!(fixture.config(), PricingConfig::default());

        Ok(())
    }

    #[test]
    fn fixture_loads_config_when_present() -> TestResult {
        let dir = small_set()?;

        write_fixture(dir.path(), "config", "small", "platform_fee: 0\n")?;

        let fixture = Fixture::from_set_in(dir.path(), "small")?;

        assert_eq!(fixture.config().platform_fee(), Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn fixture_cart_builds_lines_with_quantities() -> TestResult {
        let dir = small_set()?;
        let fixture = Fixture::from_set_in(dir.path(), "small")?;
        let cart = fixture.cart()?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal()?, Money::from_minor(309_700, INR));

        Ok(())
    }

    #[test]
    fn fixture_cart_rejects_unknown_product() -> TestResult {
        let dir = small_set()?;

        write_fixture(dir.path(), "carts", "broken", "items:\n  - product: hat\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("small")?;

        let result = fixture.load_cart("broken");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(key)) if key == "hat"));

        Ok(())
    }

    #[test]
    fn fixture_coupons_require_products_first() {
        let mut fixture = Fixture::new();

        assert!(matches!(
            fixture.load_coupons("bloom"),
            Err(FixtureError::NoCurrency)
        ));
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
        assert!(matches!(fixture.cart(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_load_products_rejects_currency_mismatch() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "inr_set",
            "products:\n  kurta:\n    name: Kurta\n    price: 999 INR\n",
        )?;

        write_fixture(
            dir.path(),
            "products",
            "gbp_set",
            "products:\n  scarf:\n    name: Scarf\n    price: 12.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("inr_set")?;

        let result = fixture.load_products("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));
        assert_eq!(fixture.currency()?, INR);
        assert_ne!(fixture.currency()?, GBP);

        Ok(())
    }

    #[test]
    fn fixture_missing_file_is_io_error() {
        let mut fixture = Fixture::with_base_path("/nonexistent/fixtures");

        assert!(matches!(
            fixture.load_products("bloom"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.items.is_empty());
        assert!(fixture.coupons.is_empty());
    }
}
