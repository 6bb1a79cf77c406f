//! Address Fixtures
//!
//! Upstream payloads disagree on the postal-code field name, so the fixture
//! boundary accepts the common synonyms and normalizes them to one canonical
//! field before the engine ever sees the address.

use serde::Deserialize;

use crate::address::Address;

/// Wrapper for an address in YAML.
#[derive(Debug, Deserialize)]
pub struct AddressFixture {
    /// The destination address.
    pub address: AddressRecord,
}

/// Address record from YAML.
#[derive(Debug, Deserialize)]
pub struct AddressRecord {
    /// Postal code. `zip`, `zipcode` and `postalCode` are accepted synonyms.
    #[serde(alias = "zip", alias = "zipcode", alias = "postalCode")]
    pub postal_code: String,

    /// State.
    pub state: String,

    /// City.
    #[serde(default)]
    pub city: String,

    /// Country.
    #[serde(default)]
    pub country: String,
}

impl From<AddressRecord> for Address {
    fn from(record: AddressRecord) -> Self {
        Address::new(record.postal_code, record.state, record.city, record.country)
    }
}
