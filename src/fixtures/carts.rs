//! Cart Fixtures

use serde::Deserialize;
use tracing::warn;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines
    pub items: Vec<CartLineFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key reference
    pub product: String,

    /// Number of units (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl CartLineFixture {
    /// Quantity as stored on a cart line. Negative quantities become zero.
    pub fn quantity(&self) -> u32 {
        if self.quantity < 0 {
            warn!(
                product = %self.product,
                quantity = self.quantity,
                "negative quantity clamped to zero"
            );
        }

        u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX)
    }
}

fn default_quantity() -> i64 {
    1
}
