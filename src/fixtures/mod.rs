//! Fixtures
//!
//! YAML fixture sets under `fixtures/{zones,carts,addresses}/<set>.yml`
//! drive the integration tests and the demo. The loader doubles as the
//! stand-in zone repository: inactive zone records are parsed but never
//! enter the zone book.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    address::Address,
    cart::{Cart, CartError},
    fixtures::{
        addresses::AddressFixture,
        carts::CartFixture,
        zones::{ZonesFixture, parse_money},
    },
    items::CartItem,
    zones::{Zone, ZoneKey},
};

pub mod addresses;
pub mod carts;
pub mod zones;

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

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixture prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Zone not found
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Zone is inactive and not part of the zone book
    #[error("Zone is inactive: {0}")]
    InactiveZone(String),

    /// No address loaded
    #[error("No address loaded")]
    NoAddress,

    /// No items loaded
    #[error("No items loaded; cannot create a cart")]
    NoItems,

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// The zone book: active zones only, in document order
    zones: SlotMap<ZoneKey, Zone<'a>>,

    /// String key -> zone key mapping; `None` marks an inactive zone that
    /// was parsed but excluded from the book
    zone_keys: FxHashMap<String, Option<ZoneKey>>,

    /// Pre-built cart items (referencing zones by `ZoneKey`)
    items: Vec<CartItem<'a>>,

    /// Destination address
    address: Option<Address>,

    /// Currency shared by every price in the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with the default base path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            zones: SlotMap::with_key(),
            zone_keys: FxHashMap::default(),
            items: Vec::new(),
            address: None,
            currency: None,
        }
    }

    /// Load zones from a YAML fixture file.
    ///
    /// Inactive zones are parsed (their prices still participate in currency
    /// validation) but never enter the zone book.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is
    /// invalid, or currencies are inconsistent.
    pub fn load_zones(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("zones").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ZonesFixture = serde_norway::from_str(&contents)?;

        for zone_fixture in fixture.zones {
            let key = zone_fixture.key.clone();
            let active = zone_fixture.active;
            let zone = zone_fixture.try_into_zone()?;

            for carrier in zone.carriers() {
                self.check_currency(carrier.base_price().currency())?;
            }

            if let Some(threshold) = zone.free_shipping().and_then(|policy| policy.min_order) {
                self.check_currency(threshold.currency())?;
            }

            if active {
                let zone_key = self.zones.insert(zone);

                self.zone_keys.insert(key, Some(zone_key));
            } else {
                self.zone_keys.insert(key, None);
            }
        }

        Ok(self)
    }

    /// Load cart items from a YAML fixture file.
    ///
    /// Zone references are resolved against previously loaded zones; a
    /// reference to an inactive zone is dropped from the item's eligible
    /// set, since the product cannot ship through it anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a referenced
    /// zone does not exist, a price is invalid, or currencies are
    /// inconsistent.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for item_fixture in fixture.items {
            let unit_price = parse_money(&item_fixture.unit_price)?;

            self.check_currency(unit_price.currency())?;

            let mut eligible: SmallVec<[ZoneKey; 4]> = SmallVec::new();

            for zone_name in &item_fixture.zones {
                let entry = self
                    .zone_keys
                    .get(zone_name)
                    .ok_or_else(|| FixtureError::ZoneNotFound(zone_name.clone()))?;

                if let Some(zone_key) = entry {
                    eligible.push(*zone_key);
                }
            }

            self.items.push(CartItem::with_zones(
                item_fixture.product,
                item_fixture.quantity,
                unit_price,
                item_fixture.unit_weight,
                eligible,
            ));
        }

        Ok(self)
    }

    /// Load the destination address from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_address(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("addresses")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: AddressFixture = serde_norway::from_str(&contents)?;

        self.address = Some(Address::from(fixture.address));

        Ok(self)
    }

    /// Load a complete fixture set (zones, cart and address with the same name).
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_zones(name)?
            .load_cart(name)?
            .load_address(name)?;

        Ok(fixture)
    }

    /// Get the zone book (active zones only).
    pub fn zone_book(&self) -> &SlotMap<ZoneKey, Zone<'a>> {
        &self.zones
    }

    /// Get a zone key by its string key.
    ///
    /// # Errors
    ///
    /// Returns an error if the zone is unknown or inactive.
    pub fn zone_key(&self, key: &str) -> Result<ZoneKey, FixtureError> {
        match self.zone_keys.get(key) {
            Some(Some(zone_key)) => Ok(*zone_key),
            Some(None) => Err(FixtureError::InactiveZone(key.to_string())),
            None => Err(FixtureError::ZoneNotFound(key.to_string())),
        }
    }

    /// Get all loaded cart items.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Get the loaded destination address.
    ///
    /// # Errors
    ///
    /// Returns an error if no address has been loaded.
    pub fn address(&self) -> Result<&Address, FixtureError> {
        self.address.as_ref().ok_or(FixtureError::NoAddress)
    }

    /// Create a cart from the loaded items.
    ///
    /// # Errors
    ///
    /// Returns an error if no items are loaded or cart creation fails.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.items.is_empty() {
            return Err(FixtureError::NoItems);
        }

        Ok(Cart::with_items(self.items.clone(), currency)?)
    }

    /// Get the currency shared by the fixture set.
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Validate one more price currency against the set's currency.
    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(())
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
