//! Cart Items

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::zones::ZoneKey;

/// One line in a shopping cart.
///
/// Immutable input owned by the caller. `eligible_zones` is the ordered set
/// of zones the product may ship through; an empty set means the item cannot
/// ship and resolution surfaces an explicit coverage failure.
#[derive(Clone, Debug, PartialEq)]
pub struct CartItem<'a> {
    product_id: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    unit_weight: Decimal,
    eligible_zones: SmallVec<[ZoneKey; 4]>,
}

impl<'a> CartItem<'a> {
    /// Create a new cart item with no eligible zones.
    pub fn new(
        product_id: impl Into<String>,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        unit_weight: Decimal,
    ) -> Self {
        Self::with_zones(product_id, quantity, unit_price, unit_weight, SmallVec::new())
    }

    /// Create a new cart item with the given eligible zones.
    pub fn with_zones(
        product_id: impl Into<String>,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        unit_weight: Decimal,
        eligible_zones: SmallVec<[ZoneKey; 4]>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
            unit_weight,
            eligible_zones,
        }
    }

    /// Return the product identifier.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Return the quantity of units.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the price of a single unit.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Return the weight of a single unit, in kilograms.
    #[must_use]
    pub fn unit_weight(&self) -> Decimal {
        self.unit_weight
    }

    /// Return the ordered set of zones this item may ship through.
    #[must_use]
    pub fn eligible_zones(&self) -> &[ZoneKey] {
        &self.eligible_zones
    }

    /// Whether the item lists the given zone as eligible.
    #[must_use]
    pub fn ships_through(&self, zone: ZoneKey) -> bool {
        self.eligible_zones.contains(&zone)
    }
}
