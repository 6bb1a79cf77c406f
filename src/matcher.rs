//! Zone Eligibility Matching
//!
//! Decides which zones of a caller-supplied zone book apply to a destination
//! address. Inactive zone records are the repository's problem and never
//! reach this module. An empty result is a valid outcome ("no shipping
//! available"), not an error.

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::{
    address::Address,
    zones::{Zone, ZoneKey},
};

/// Return the keys of every zone applicable to the address, in zone-book
/// insertion order.
///
/// A zone applies when its coverage matches the address: a state wildcard
/// matching the address state, an explicit postal-code set or postal-code
/// range containing the address postal code, or no positional restriction at
/// all.
#[must_use]
pub fn match_zones<'a>(
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    address: &Address,
) -> SmallVec<[ZoneKey; 4]> {
    zones
        .iter()
        .filter(|(_, zone)| zone.coverage().matches(address))
        .map(|(key, _)| key)
        .collect()
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};

    use crate::zones::{CarrierOption, PostalRange, ZoneCoverage, ZoneScope};

    use super::*;

    fn carrier<'a>() -> CarrierOption<'a> {
        CarrierOption::new("Ground", Money::from_minor(10_000, USD), 3, 5)
    }

    fn book<'a>(coverages: Vec<ZoneCoverage>) -> SlotMap<ZoneKey, Zone<'a>> {
        let mut zones = SlotMap::with_key();

        for (i, coverage) in coverages.into_iter().enumerate() {
            zones.insert(Zone::new(
                format!("zone-{i}"),
                ZoneScope::National,
                coverage,
                vec![carrier()],
            ));
        }

        zones
    }

    #[test]
    fn matches_explicit_postal_code() {
        let zones = book(vec![
            ZoneCoverage::PostalCodes(vec!["1000".to_string()]),
            ZoneCoverage::PostalCodes(vec!["2000".to_string()]),
        ]);

        let address = Address::new("1000", "Central", "Springfield", "US");
        let eligible = match_zones(&zones, &address);

        assert_eq!(eligible.len(), 1);
        assert!(
            eligible
                .first()
                .and_then(|&key| zones.get(key))
                .is_some_and(|zone| zone.name() == "zone-0"),
            "expected the explicit-code zone to match"
        );
    }

    #[test]
    fn matches_postal_range() {
        let zones = book(vec![ZoneCoverage::PostalRanges(vec![PostalRange {
            start: "1000".to_string(),
            end: "1999".to_string(),
        }])]);

        let in_range = Address::new("1500", "Central", "Springfield", "US");
        let out_of_range = Address::new("2500", "Central", "Springfield", "US");

        assert_eq!(match_zones(&zones, &in_range).len(), 1);
        assert!(match_zones(&zones, &out_of_range).is_empty());
    }

    #[test]
    fn matches_state_wildcard_ignoring_case() {
        let zones = book(vec![ZoneCoverage::StateWildcard {
            state: "Central".to_string(),
        }]);

        let address = Address::new("9999", "CENTRAL", "Springfield", "US");

        assert_eq!(match_zones(&zones, &address).len(), 1);
    }

    #[test]
    fn unrestricted_zone_matches_any_address() {
        let zones = book(vec![ZoneCoverage::Unrestricted]);

        let address = Address::new("0000", "Nowhere", "Nowhere", "US");

        assert_eq!(match_zones(&zones, &address).len(), 1);
    }

    #[test]
    fn no_match_returns_empty_not_error() {
        let zones = book(vec![ZoneCoverage::PostalCodes(vec!["1000".to_string()])]);

        let address = Address::new("2000", "Central", "Springfield", "US");

        assert!(match_zones(&zones, &address).is_empty());
    }

    #[test]
    fn result_preserves_zone_book_order() {
        let zones = book(vec![
            ZoneCoverage::Unrestricted,
            ZoneCoverage::PostalCodes(vec!["1000".to_string()]),
            ZoneCoverage::Unrestricted,
        ]);

        let address = Address::new("1000", "Central", "Springfield", "US");
        let eligible = match_zones(&zones, &address);

        let names: Vec<&str> = eligible
            .iter()
            .filter_map(|&key| zones.get(key).map(Zone::name))
            .collect();

        assert_eq!(names, vec!["zone-0", "zone-1", "zone-2"]);
    }
}
