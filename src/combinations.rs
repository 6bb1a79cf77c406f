//! Shipping Combinations
//!
//! The algorithmic core: partitions cart items across eligible zones into
//! fully covering, priced combinations. Four strategies run in a fixed
//! order, stopping at the first one that yields at least one covering
//! combination. The multi-zone pass is deliberately greedy rather than an
//! optimizer: the requirement is a valid shippable combination quickly, not
//! the cheapest split in all cases.

use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::{SmallVec, smallvec};

use crate::{
    cart::Cart,
    items::CartItem,
    pricing::{PricingError, ZonePrice, price_assignment},
    zones::{CarrierOption, Zone, ZoneKey, ZoneScope},
};

/// One zone's share of a combination: the carrier option used and the cart
/// items (by index) assigned to it, priced.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'a> {
    zone: ZoneKey,
    zone_name: String,
    option: CarrierOption<'a>,
    items: SmallVec<[usize; 10]>,
    price: ZonePrice<'a>,
}

impl<'a> Selection<'a> {
    /// Create a new selection.
    pub fn new(
        zone: ZoneKey,
        zone_name: impl Into<String>,
        option: CarrierOption<'a>,
        items: SmallVec<[usize; 10]>,
        price: ZonePrice<'a>,
    ) -> Self {
        Self {
            zone,
            zone_name: zone_name.into(),
            option,
            items,
            price,
        }
    }

    /// Return the zone key.
    #[must_use]
    pub fn zone(&self) -> ZoneKey {
        self.zone
    }

    /// Return the zone display name.
    #[must_use]
    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    /// Return the carrier option used for this selection.
    #[must_use]
    pub fn option(&self) -> &CarrierOption<'a> {
        &self.option
    }

    /// Return the assigned cart item indices.
    #[must_use]
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Return the price of this selection.
    #[must_use]
    pub fn price(&self) -> &ZonePrice<'a> {
        &self.price
    }
}

/// One complete, priced way of shipping an entire cart, possibly split
/// across multiple zones.
///
/// When `covers_all_items` is true, every cart item index appears in exactly
/// one selection; the builder never emits a combination violating that.
#[derive(Clone, Debug, PartialEq)]
pub struct ShippingCombination<'a> {
    id: u32,
    covers_all_items: bool,
    forced_fallback: bool,
    total: Money<'a, Currency>,
    selections: SmallVec<[Selection<'a>; 2]>,
}

impl<'a> ShippingCombination<'a> {
    /// Create a new combination.
    pub fn new(
        id: u32,
        covers_all_items: bool,
        forced_fallback: bool,
        total: Money<'a, Currency>,
        selections: SmallVec<[Selection<'a>; 2]>,
    ) -> Self {
        Self {
            id,
            covers_all_items,
            forced_fallback,
            total,
            selections,
        }
    }

    /// Return the combination id (emission order within one build).
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether every cart item is assigned to exactly one selection.
    #[must_use]
    pub fn covers_all_items(&self) -> bool {
        self.covers_all_items
    }

    /// Whether this combination force-assigned items to a national zone they
    /// did not declare as eligible.
    #[must_use]
    pub fn forced_fallback(&self) -> bool {
        self.forced_fallback
    }

    /// Return the total price across all selections.
    #[must_use]
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Return the per-zone selections.
    #[must_use]
    pub fn selections(&self) -> &[Selection<'a>] {
        &self.selections
    }
}

/// Build every valid combination for the cart over the eligible zones.
///
/// Strategies, in fixed order, stopping at the first that covers the cart:
/// single-zone coverage, local+national split, greedy multi-zone cover,
/// national-only forced fallback. An empty result means checkout cannot
/// proceed; it is a business outcome, not an error. Equal-price combinations
/// keep their emission order.
///
/// # Errors
///
/// Returns a [`PricingError`] if pricing a candidate assignment fails; a
/// cart that cannot be covered is *not* an error.
pub fn build_combinations<'a>(
    cart: &Cart<'a>,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
) -> Result<Vec<ShippingCombination<'a>>, PricingError> {
    if cart.is_empty() {
        return Ok(Vec::new());
    }

    let mut next_id = 0u32;

    let combos = single_zone_combinations(cart, zones, eligible, &mut next_id)?;

    if !combos.is_empty() {
        return Ok(combos);
    }

    let combos = local_national_split(cart, zones, eligible, &mut next_id)?;

    if !combos.is_empty() {
        return Ok(combos);
    }

    let combos = greedy_multi_zone(cart, zones, eligible, &mut next_id)?;

    if !combos.is_empty() {
        return Ok(combos);
    }

    national_fallback(cart, zones, eligible, &mut next_id)
}

/// Every eligible zone listed by all items emits one combination per carrier
/// option, priced over the whole cart.
fn single_zone_combinations<'a>(
    cart: &Cart<'a>,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
    next_id: &mut u32,
) -> Result<Vec<ShippingCombination<'a>>, PricingError> {
    let mut combos = Vec::new();
    let refs: SmallVec<[&CartItem<'a>; 10]> = cart.iter().collect();
    let all_items: SmallVec<[usize; 10]> = (0..cart.len()).collect();

    for &key in eligible {
        let Some(zone) = usable_zone(zones, key) else {
            continue;
        };

        if !cart.iter().all(|item| item.ships_through(key)) {
            continue;
        }

        for option in zone.carriers() {
            let price = price_assignment(zone, option, &refs)?;

            let selection = Selection::new(
                key,
                zone.name(),
                option.clone(),
                all_items.clone(),
                price,
            );

            combos.push(emit(next_id, false, smallvec![selection])?);
        }
    }

    Ok(combos)
}

/// Split the cart between the first eligible local zone and the first
/// eligible national zone, when that partition accounts for every item.
fn local_national_split<'a>(
    cart: &Cart<'a>,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
    next_id: &mut u32,
) -> Result<Vec<ShippingCombination<'a>>, PricingError> {
    let Some((local_key, local_zone)) = first_scoped(zones, eligible, ZoneScope::Local) else {
        return Ok(Vec::new());
    };

    let Some((national_key, national_zone)) = first_scoped(zones, eligible, ZoneScope::National)
    else {
        return Ok(Vec::new());
    };

    let mut local_items: SmallVec<[usize; 10]> = SmallVec::new();
    let mut national_items: SmallVec<[usize; 10]> = SmallVec::new();

    for (idx, item) in cart.iter().enumerate() {
        if item_reaches_scope(item, zones, eligible, ZoneScope::Local) {
            local_items.push(idx);
        } else if item_reaches_scope(item, zones, eligible, ZoneScope::National) {
            national_items.push(idx);
        } else {
            // The partition does not account for every item.
            return Ok(Vec::new());
        }
    }

    if local_items.is_empty() || national_items.is_empty() {
        return Ok(Vec::new());
    }

    let refs: SmallVec<[&CartItem<'a>; 10]> = cart.iter().collect();
    let local_refs = sub_refs(&refs, &local_items);
    let national_refs = sub_refs(&refs, &national_items);

    let mut combos = Vec::new();

    // National options typically vary more, so they drive the outer loop.
    for national_option in national_zone.carriers() {
        for local_option in local_zone.carriers() {
            let local_price = price_assignment(local_zone, local_option, &local_refs)?;
            let national_price = price_assignment(national_zone, national_option, &national_refs)?;

            let selections = smallvec![
                Selection::new(
                    local_key,
                    local_zone.name(),
                    local_option.clone(),
                    local_items.clone(),
                    local_price,
                ),
                Selection::new(
                    national_key,
                    national_zone.name(),
                    national_option.clone(),
                    national_items.clone(),
                    national_price,
                ),
            ];

            combos.push(emit(next_id, false, selections)?);
        }
    }

    Ok(combos)
}

/// Greedily assign still-uncovered items to zones in priority order
/// (national, then local, then other), emitting a single combination when
/// the pass covers everything. Heuristic by design; not provably cheapest.
fn greedy_multi_zone<'a>(
    cart: &Cart<'a>,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
    next_id: &mut u32,
) -> Result<Vec<ShippingCombination<'a>>, PricingError> {
    let refs: SmallVec<[&CartItem<'a>; 10]> = cart.iter().collect();
    let ordered = scope_ordered(zones, eligible);

    let mut remaining: SmallVec<[usize; 10]> = (0..cart.len()).collect();
    let mut assignments: SmallVec<[(ZoneKey, SmallVec<[usize; 10]>); 4]> = SmallVec::new();

    for key in ordered {
        if remaining.is_empty() {
            break;
        }

        if usable_zone(zones, key).is_none() {
            continue;
        }

        let taken: SmallVec<[usize; 10]> = remaining
            .iter()
            .copied()
            .filter(|&idx| refs.get(idx).is_some_and(|item| item.ships_through(key)))
            .collect();

        if taken.is_empty() {
            continue;
        }

        remaining.retain(|idx| !taken.contains(idx));
        assignments.push((key, taken));
    }

    if !remaining.is_empty() || assignments.is_empty() {
        return Ok(Vec::new());
    }

    let mut selections: SmallVec<[Selection<'a>; 2]> = SmallVec::new();

    for (key, indices) in assignments {
        // Both were checked during the pass; bail rather than emit a
        // combination that breaks the coverage invariant.
        let Some(zone) = usable_zone(zones, key) else {
            return Ok(Vec::new());
        };

        let Some(option) = zone.carriers().first() else {
            return Ok(Vec::new());
        };

        let assigned = sub_refs(&refs, &indices);
        let price = price_assignment(zone, option, &assigned)?;

        selections.push(Selection::new(
            key,
            zone.name(),
            option.clone(),
            indices,
            price,
        ));
    }

    Ok(vec![emit(next_id, false, selections)?])
}

/// Force-assign the whole cart to the first eligible national zone,
/// regardless of declared eligibility. Flagged so callers can warn the user.
fn national_fallback<'a>(
    cart: &Cart<'a>,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
    next_id: &mut u32,
) -> Result<Vec<ShippingCombination<'a>>, PricingError> {
    let Some((key, zone)) = first_scoped(zones, eligible, ZoneScope::National) else {
        return Ok(Vec::new());
    };

    let refs: SmallVec<[&CartItem<'a>; 10]> = cart.iter().collect();
    let all_items: SmallVec<[usize; 10]> = (0..cart.len()).collect();

    let mut combos = Vec::new();

    for option in zone.carriers() {
        let price = price_assignment(zone, option, &refs)?;

        let selection = Selection::new(
            key,
            zone.name(),
            option.clone(),
            all_items.clone(),
            price,
        );

        combos.push(emit(next_id, true, smallvec![selection])?);
    }

    Ok(combos)
}

/// Assemble a covering combination, totalling its selections.
fn emit<'a>(
    next_id: &mut u32,
    forced_fallback: bool,
    selections: SmallVec<[Selection<'a>; 2]>,
) -> Result<ShippingCombination<'a>, PricingError> {
    let first = selections.first().ok_or(PricingError::NoItems)?;

    let total = selections.iter().try_fold(
        Money::from_minor(0, first.price.price().currency()),
        |acc, selection| acc.add(*selection.price.price()),
    )?;

    let id = *next_id;
    *next_id += 1;

    Ok(ShippingCombination::new(id, true, forced_fallback, total, selections))
}

/// Look up a zone that actually offers at least one carrier option.
fn usable_zone<'z, 'a>(
    zones: &'z SlotMap<ZoneKey, Zone<'a>>,
    key: ZoneKey,
) -> Option<&'z Zone<'a>> {
    zones.get(key).filter(|zone| !zone.carriers().is_empty())
}

/// First eligible, usable zone with the given scope, in eligibility order.
fn first_scoped<'z, 'a>(
    zones: &'z SlotMap<ZoneKey, Zone<'a>>,
    eligible: &[ZoneKey],
    scope: ZoneScope,
) -> Option<(ZoneKey, &'z Zone<'a>)> {
    eligible.iter().find_map(|&key| {
        usable_zone(zones, key)
            .filter(|zone| zone.scope() == scope)
            .map(|zone| (key, zone))
    })
}

/// Whether the item lists an eligible, usable zone with the given scope.
fn item_reaches_scope(
    item: &CartItem<'_>,
    zones: &SlotMap<ZoneKey, Zone<'_>>,
    eligible: &[ZoneKey],
    scope: ZoneScope,
) -> bool {
    item.eligible_zones().iter().any(|&key| {
        eligible.contains(&key)
            && usable_zone(zones, key).is_some_and(|zone| zone.scope() == scope)
    })
}

/// Eligible zones reordered by scope priority: national, local, other.
/// Stable within each scope.
fn scope_ordered(
    zones: &SlotMap<ZoneKey, Zone<'_>>,
    eligible: &[ZoneKey],
) -> SmallVec<[ZoneKey; 4]> {
    let mut ordered: SmallVec<[ZoneKey; 4]> = eligible.iter().copied().collect();

    ordered.sort_by_key(|&key| match zones.get(key).map(Zone::scope) {
        Some(ZoneScope::National) => 0u8,
        Some(ZoneScope::Local) => 1,
        Some(ZoneScope::Other) | None => 2,
    });

    ordered
}

/// Collect references to the cart items at the given indices.
fn sub_refs<'r, 'a>(
    refs: &[&'r CartItem<'a>],
    indices: &[usize],
) -> SmallVec<[&'r CartItem<'a>; 10]> {
    indices
        .iter()
        .filter_map(|&idx| refs.get(idx).copied())
        .collect()
}
