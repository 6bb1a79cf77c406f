//! Zone Fixtures

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    zones::{
        CarrierOption, FreeShippingPolicy, PackageConfig, PostalRange, Zone, ZoneCoverage,
        ZoneScope,
    },
};

/// Wrapper for zones in YAML.
///
/// Zones are a sequence, not a map, so document order is preserved and the
/// zone book (and with it every downstream result) stays deterministic.
#[derive(Debug, Deserialize)]
pub struct ZonesFixture {
    /// Zone definitions in document order.
    pub zones: Vec<ZoneFixture>,
}

/// Zone fixture from YAML.
#[derive(Debug, Deserialize)]
pub struct ZoneFixture {
    /// String key other fixtures reference this zone by.
    pub key: String,

    /// Display name.
    pub name: String,

    /// Geographic scope.
    pub scope: ScopeFixture,

    /// Whether the zone is active. Inactive zones are parsed but never enter
    /// the zone book, mirroring a repository that only lists active records.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Positional coverage.
    pub coverage: CoverageFixture,

    /// Optional free-shipping policy.
    #[serde(default)]
    pub free_shipping: Option<FreeShippingFixture>,

    /// Carrier options offered by the zone.
    #[serde(default)]
    pub carriers: Vec<CarrierFixture>,
}

fn default_active() -> bool {
    true
}

/// Zone scope from YAML.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFixture {
    /// Local scope
    Local,

    /// National scope
    National,

    /// Other scope
    Other,
}

impl From<ScopeFixture> for ZoneScope {
    fn from(scope: ScopeFixture) -> Self {
        match scope {
            ScopeFixture::Local => ZoneScope::Local,
            ScopeFixture::National => ZoneScope::National,
            ScopeFixture::Other => ZoneScope::Other,
        }
    }
}

/// Zone coverage from YAML.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoverageFixture {
    /// Matches every address in the given state.
    StateWildcard {
        /// State name.
        state: String,
    },

    /// Matches an explicit set of postal codes.
    PostalCodes {
        /// The postal codes.
        codes: Vec<String>,
    },

    /// Matches postal codes within inclusive ranges.
    PostalRanges {
        /// The ranges.
        ranges: Vec<PostalRangeFixture>,
    },

    /// No positional restriction.
    Unrestricted,
}

impl From<CoverageFixture> for ZoneCoverage {
    fn from(coverage: CoverageFixture) -> Self {
        match coverage {
            CoverageFixture::StateWildcard { state } => ZoneCoverage::StateWildcard { state },
            CoverageFixture::PostalCodes { codes } => ZoneCoverage::PostalCodes(codes),
            CoverageFixture::PostalRanges { ranges } => ZoneCoverage::PostalRanges(
                ranges
                    .into_iter()
                    .map(|range| PostalRange {
                        start: range.start,
                        end: range.end,
                    })
                    .collect(),
            ),
            CoverageFixture::Unrestricted => ZoneCoverage::Unrestricted,
        }
    }
}

/// Postal-code range from YAML.
#[derive(Debug, Deserialize)]
pub struct PostalRangeFixture {
    /// Lower bound, inclusive.
    pub start: String,

    /// Upper bound, inclusive.
    pub end: String,
}

/// Free-shipping policy from YAML.
#[derive(Debug, Deserialize)]
pub struct FreeShippingFixture {
    /// Shipping is always free.
    #[serde(default)]
    pub always: bool,

    /// Subtotal threshold above which shipping is free, e.g. "1500.00 USD".
    #[serde(default)]
    pub min_order: Option<String>,
}

/// Carrier option from YAML.
#[derive(Debug, Deserialize)]
pub struct CarrierFixture {
    /// Carrier/service name.
    pub name: String,

    /// Base price, e.g. "100.00 USD".
    pub base_price: String,

    /// Minimum delivery time in days.
    pub min_days: u32,

    /// Maximum delivery time in days.
    pub max_days: u32,

    /// Optional package limits.
    #[serde(default)]
    pub package: Option<PackageFixture>,
}

/// Package limits from YAML.
#[derive(Debug, Default, Deserialize)]
pub struct PackageFixture {
    /// Weight ceiling per package, in kilograms.
    #[serde(default)]
    pub max_weight_kg: Option<Decimal>,

    /// Surcharge per kilogram above the ceiling, e.g. "50.00 USD".
    #[serde(default)]
    pub cost_per_extra_kg: Option<String>,

    /// Unit-count ceiling per package.
    #[serde(default)]
    pub max_products: Option<u32>,

    /// Surcharge per unit beyond the first, e.g. "10.00 USD".
    #[serde(default)]
    pub cost_per_extra_product: Option<String>,
}

impl ZoneFixture {
    /// Convert to an engine-side [`Zone`].
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or names an unknown
    /// currency.
    pub fn try_into_zone(self) -> Result<Zone<'static>, FixtureError> {
        let carriers = self
            .carriers
            .into_iter()
            .map(CarrierFixture::try_into_carrier)
            .collect::<Result<Vec<_>, _>>()?;

        let mut zone = Zone::new(
            self.name,
            ZoneScope::from(self.scope),
            ZoneCoverage::from(self.coverage),
            carriers,
        );

        if let Some(free_shipping) = self.free_shipping {
            let min_order = free_shipping
                .min_order
                .as_deref()
                .map(parse_money)
                .transpose()?;

            zone = zone.with_free_shipping(FreeShippingPolicy {
                always_free: free_shipping.always,
                min_order,
            });
        }

        Ok(zone)
    }
}

impl CarrierFixture {
    /// Convert to an engine-side [`CarrierOption`].
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or names an unknown
    /// currency.
    pub fn try_into_carrier(self) -> Result<CarrierOption<'static>, FixtureError> {
        let base_price = parse_money(&self.base_price)?;

        let Some(package) = self.package else {
            return Ok(CarrierOption::new(
                self.name,
                base_price,
                self.min_days,
                self.max_days,
            ));
        };

        let package = PackageConfig {
            max_weight_kg: package.max_weight_kg,
            cost_per_extra_kg: package
                .cost_per_extra_kg
                .as_deref()
                .map(parse_money)
                .transpose()?,
            max_products: package.max_products,
            cost_per_extra_product: package
                .cost_per_extra_product
                .as_deref()
                .map(parse_money)
                .transpose()?,
        };

        Ok(CarrierOption::with_package(
            self.name,
            base_price,
            self.min_days,
            self.max_days,
            package,
        ))
    }
}

/// Parse a price string like "100.00 USD" into money.
///
/// # Errors
///
/// Returns an error if the string is malformed, names an unknown currency,
/// or carries more precision than the currency's minor unit.
pub fn parse_money(raw: &str) -> Result<Money<'static, iso::Currency>, FixtureError> {
    let (minor, currency) = parse_price(raw)?;

    Ok(Money::from_minor(minor, currency))
}

/// Parse a price string like "100.00 USD" into minor units and a currency.
///
/// # Errors
///
/// Returns an error if the string is malformed, names an unknown currency,
/// or carries more precision than the currency's minor unit.
pub fn parse_price(raw: &str) -> Result<(i64, &'static iso::Currency), FixtureError> {
    let mut parts = raw.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(raw.to_string()));
    };

    let amount: Decimal = amount
        .parse()
        .map_err(|_err| FixtureError::InvalidPrice(raw.to_string()))?;

    let currency =
        iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let factor = 10i64
        .checked_pow(currency.exponent)
        .ok_or_else(|| FixtureError::InvalidPrice(raw.to_string()))?;

    let scaled = amount
        .checked_mul(Decimal::from(factor))
        .ok_or_else(|| FixtureError::InvalidPrice(raw.to_string()))?;

    if !scaled.fract().is_zero() {
        return Err(FixtureError::InvalidPrice(raw.to_string()));
    }

    let minor = scaled
        .to_i64()
        .ok_or_else(|| FixtureError::InvalidPrice(raw.to_string()))?;

    Ok((minor, currency))
}
