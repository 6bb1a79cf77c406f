//! Cart Fixtures

use rust_decimal::Decimal;
use serde::Deserialize;

/// Wrapper for cart items in YAML.
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Item lines in document order.
    pub items: Vec<ItemFixture>,
}

/// Cart item from YAML.
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Product identifier.
    pub product: String,

    /// Number of units.
    pub quantity: u32,

    /// Unit price, e.g. "100.00 USD".
    pub unit_price: String,

    /// Unit weight in kilograms.
    pub unit_weight: Decimal,

    /// String keys of the zones this item may ship through.
    #[serde(default)]
    pub zones: Vec<String>,
}
