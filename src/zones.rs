//! Shipping Zones
//!
//! A [`Zone`] is a named shipping rule scoping which destinations it serves
//! ([`ZoneCoverage`]) and which carrier services it offers
//! ([`CarrierOption`]). Zones live in a caller-owned
//! [`SlotMap`](slotmap::SlotMap) keyed by [`ZoneKey`]; cart items reference
//! them by key. Only active zones belong in that book — filtering inactive
//! records is the repository's job, so the engine-side type does not carry an
//! `active` flag at all.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::address::Address;

new_key_type! {
    /// Zone Key
    pub struct ZoneKey;
}

/// Geographic scope of a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneScope {
    /// Serves a metropolitan or otherwise local area.
    Local,

    /// Serves the whole country.
    National,

    /// Anything else (islands, cross-border annexes, special couriers).
    Other,
}

/// An inclusive postal-code range.
///
/// Bounds compare numerically when the bounds and the candidate code all
/// parse as unsigned integers, lexically otherwise, so one consistent
/// comparison is used per containment check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostalRange {
    /// Lower bound, inclusive.
    pub start: String,

    /// Upper bound, inclusive.
    pub end: String,
}

impl PostalRange {
    /// Whether the range contains the given postal code.
    #[must_use]
    pub fn contains(&self, postal_code: &str) -> bool {
        let code = postal_code.trim();
        let start = self.start.trim();
        let end = self.end.trim();

        match (
            start.parse::<u64>(),
            end.parse::<u64>(),
            code.parse::<u64>(),
        ) {
            (Ok(start), Ok(end), Ok(code)) => start <= code && code <= end,
            _ => start <= code && code <= end,
        }
    }
}

/// Positional restriction of a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneCoverage {
    /// Matches every address in the given state, regardless of postal code.
    StateWildcard {
        /// State compared case-insensitively and trimmed.
        state: String,
    },

    /// Matches addresses whose postal code is in the explicit set.
    PostalCodes(Vec<String>),

    /// Matches addresses whose postal code falls in any of the ranges.
    PostalRanges(Vec<PostalRange>),

    /// No positional restriction; the zone applies everywhere.
    Unrestricted,
}

impl ZoneCoverage {
    /// Whether an address falls under this coverage.
    ///
    /// Checks follow the documented precedence: state wildcard, explicit
    /// postal codes, postal ranges, unrestricted. A zone carries exactly one
    /// variant, so precedence here reduces to the variant's own rule.
    #[must_use]
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            ZoneCoverage::StateWildcard { state } => state
                .trim()
                .eq_ignore_ascii_case(address.state().trim()),
            ZoneCoverage::PostalCodes(codes) => codes
                .iter()
                .any(|code| code.trim() == address.postal_code().trim()),
            ZoneCoverage::PostalRanges(ranges) => ranges
                .iter()
                .any(|range| range.contains(address.postal_code())),
            ZoneCoverage::Unrestricted => true,
        }
    }
}

/// Free-shipping policy attached to a zone.
///
/// `always_free` and `min_order` are mutually exclusive in effect:
/// `always_free` wins when both are set.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeShippingPolicy<'a> {
    /// Shipping through this zone never costs anything.
    pub always_free: bool,

    /// Order subtotal at or above which shipping is free.
    pub min_order: Option<Money<'a, Currency>>,
}

impl<'a> FreeShippingPolicy<'a> {
    /// Policy that waives shipping unconditionally.
    #[must_use]
    pub fn always() -> Self {
        Self {
            always_free: true,
            min_order: None,
        }
    }

    /// Policy that waives shipping once the subtotal reaches `threshold`.
    #[must_use]
    pub fn above_threshold(threshold: Money<'a, Currency>) -> Self {
        Self {
            always_free: false,
            min_order: Some(threshold),
        }
    }
}

/// Per-package limits and surcharges for a carrier option.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackageConfig<'a> {
    /// Weight ceiling per package, in kilograms.
    pub max_weight_kg: Option<Decimal>,

    /// Surcharge per kilogram above the weight ceiling.
    pub cost_per_extra_kg: Option<Money<'a, Currency>>,

    /// Unit-count ceiling per package.
    pub max_products: Option<u32>,

    /// Surcharge per unit beyond the first.
    pub cost_per_extra_product: Option<Money<'a, Currency>>,
}

/// One carrier/service tier offered by a zone.
#[derive(Clone, Debug, PartialEq)]
pub struct CarrierOption<'a> {
    name: String,
    base_price: Money<'a, Currency>,
    min_days: u32,
    max_days: u32,
    package: Option<PackageConfig<'a>>,
}

impl<'a> CarrierOption<'a> {
    /// Create a new carrier option without package limits.
    pub fn new(
        name: impl Into<String>,
        base_price: Money<'a, Currency>,
        min_days: u32,
        max_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            base_price,
            min_days,
            max_days,
            package: None,
        }
    }

    /// Create a new carrier option with package limits.
    pub fn with_package(
        name: impl Into<String>,
        base_price: Money<'a, Currency>,
        min_days: u32,
        max_days: u32,
        package: PackageConfig<'a>,
    ) -> Self {
        Self {
            name: name.into(),
            base_price,
            min_days,
            max_days,
            package: Some(package),
        }
    }

    /// Return the carrier/service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the base price.
    #[must_use]
    pub fn base_price(&self) -> &Money<'a, Currency> {
        &self.base_price
    }

    /// Return the minimum delivery time in days.
    #[must_use]
    pub fn min_days(&self) -> u32 {
        self.min_days
    }

    /// Return the maximum delivery time in days.
    #[must_use]
    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    /// Return the package limits, if any.
    #[must_use]
    pub fn package(&self) -> Option<&PackageConfig<'a>> {
        self.package.as_ref()
    }

    /// Caller-facing delivery window, e.g. "1-3 days".
    #[must_use]
    pub fn delivery_estimate(&self) -> String {
        day_window_label(self.min_days, self.max_days)
    }
}

/// Format a delivery window in days for display.
pub(crate) fn day_window_label(min_days: u32, max_days: u32) -> String {
    if min_days == max_days {
        if min_days == 1 {
            "1 day".to_string()
        } else {
            format!("{min_days} days")
        }
    } else {
        format!("{min_days}-{max_days} days")
    }
}

/// A named shipping rule: which destinations it serves and which carrier
/// services it offers.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone<'a> {
    name: String,
    scope: ZoneScope,
    coverage: ZoneCoverage,
    free_shipping: Option<FreeShippingPolicy<'a>>,
    carriers: Vec<CarrierOption<'a>>,
}

impl<'a> Zone<'a> {
    /// Create a new zone without a free-shipping policy.
    pub fn new(
        name: impl Into<String>,
        scope: ZoneScope,
        coverage: ZoneCoverage,
        carriers: Vec<CarrierOption<'a>>,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            coverage,
            free_shipping: None,
            carriers,
        }
    }

    /// Attach a free-shipping policy.
    #[must_use]
    pub fn with_free_shipping(mut self, policy: FreeShippingPolicy<'a>) -> Self {
        self.free_shipping = Some(policy);
        self
    }

    /// Return the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the geographic scope.
    #[must_use]
    pub fn scope(&self) -> ZoneScope {
        self.scope
    }

    /// Return the positional coverage.
    #[must_use]
    pub fn coverage(&self) -> &ZoneCoverage {
        &self.coverage
    }

    /// Return the free-shipping policy, if any.
    #[must_use]
    pub fn free_shipping(&self) -> Option<&FreeShippingPolicy<'a>> {
        self.free_shipping.as_ref()
    }

    /// Return the carrier options offered by this zone.
    #[must_use]
    pub fn carriers(&self) -> &[CarrierOption<'a>] {
        &self.carriers
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn test_address(postal_code: &str, state: &str) -> Address {
        Address::new(postal_code, state, "Springfield", "US")
    }

    #[test]
    fn postal_range_compares_numerically_when_all_numeric() {
        let range = PostalRange {
            start: "1000".to_string(),
            end: "2000".to_string(),
        };

        assert!(range.contains("1500"));
        assert!(range.contains("1000"));
        assert!(range.contains("2000"));
        assert!(!range.contains("999"));
        assert!(!range.contains("2001"));

        // Lexically "200" > "1000"; numerically it is below the range.
        assert!(!range.contains("200"));
    }

    #[test]
    fn postal_range_falls_back_to_lexical_compare() {
        let range = PostalRange {
            start: "AB1".to_string(),
            end: "AB9".to_string(),
        };

        assert!(range.contains("AB5"));
        assert!(!range.contains("AC1"));
    }

    #[test]
    fn state_wildcard_matches_case_insensitively() {
        let coverage = ZoneCoverage::StateWildcard {
            state: " central ".to_string(),
        };

        assert!(coverage.matches(&test_address("9999", "CENTRAL")));
        assert!(!coverage.matches(&test_address("9999", "Coastal")));
    }

    #[test]
    fn postal_code_set_matches_exact_code() {
        let coverage =
            ZoneCoverage::PostalCodes(vec!["1000".to_string(), "1001".to_string()]);

        assert!(coverage.matches(&test_address("1000", "Central")));
        assert!(!coverage.matches(&test_address("1002", "Central")));
    }

    #[test]
    fn empty_postal_code_set_matches_nothing() {
        let coverage = ZoneCoverage::PostalCodes(Vec::new());

        assert!(!coverage.matches(&test_address("1000", "Central")));
    }

    #[test]
    fn unrestricted_matches_everything() {
        let coverage = ZoneCoverage::Unrestricted;

        assert!(coverage.matches(&test_address("1000", "Central")));
        assert!(coverage.matches(&test_address("", "")));
    }

    #[test]
    fn day_window_label_formats_singular_and_ranges() {
        assert_eq!(day_window_label(1, 1), "1 day");
        assert_eq!(day_window_label(2, 2), "2 days");
        assert_eq!(day_window_label(1, 3), "1-3 days");
        assert_eq!(day_window_label(0, 1), "0-1 days");
    }

    #[test]
    fn zone_accessors_return_constructor_values() {
        let option = CarrierOption::new("Ground", Money::from_minor(10_000, USD), 3, 5);

        let zone = Zone::new(
            "Nationwide",
            ZoneScope::National,
            ZoneCoverage::Unrestricted,
            vec![option],
        )
        .with_free_shipping(FreeShippingPolicy::above_threshold(Money::from_minor(
            150_000, USD,
        )));

        assert_eq!(zone.name(), "Nationwide");
        assert_eq!(zone.scope(), ZoneScope::National);
        assert_eq!(zone.coverage(), &ZoneCoverage::Unrestricted);
        assert_eq!(zone.carriers().len(), 1);
        assert!(zone.free_shipping().is_some_and(|p| !p.always_free));
    }

    #[test]
    fn carrier_option_delivery_estimate_uses_day_window() {
        let option = CarrierOption::new("Express", Money::from_minor(5000, USD), 1, 2);

        assert_eq!(option.delivery_estimate(), "1-2 days");
    }
}
