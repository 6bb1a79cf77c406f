//! Option Ranking
//!
//! Normalizes built combinations into the caller-facing result shape: a
//! stable sort by coverage then total price, plus a display label and a
//! delivery estimate derived from the zone and carrier names.

use crate::{combinations::ShippingCombination, zones::day_window_label};

/// A ranked, caller-facing shipping option.
#[derive(Clone, Debug, PartialEq)]
pub struct RateOption<'a> {
    combination: ShippingCombination<'a>,
    label: String,
    estimated_delivery: String,
}

impl<'a> RateOption<'a> {
    /// Return the underlying combination.
    #[must_use]
    pub fn combination(&self) -> &ShippingCombination<'a> {
        &self.combination
    }

    /// Return the display label, e.g. "Metro (Courier) + Nationwide (Ground)".
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return the delivery estimate, e.g. "1-3 days".
    #[must_use]
    pub fn estimated_delivery(&self) -> &str {
        &self.estimated_delivery
    }
}

/// Sort combinations into presentation order and attach display fields.
///
/// Sort key, ascending: combinations covering all items first, then total
/// price in minor units. The sort is stable, so equal-price combinations
/// keep their emission order. The builder never emits non-covering
/// combinations, but the ordering contract holds for them regardless.
#[must_use]
pub fn rank(combinations: Vec<ShippingCombination<'_>>) -> Vec<RateOption<'_>> {
    let mut combinations = combinations;

    combinations.sort_by_key(|combination| {
        (
            u8::from(!combination.covers_all_items()),
            combination.total().to_minor_units(),
        )
    });

    combinations
        .into_iter()
        .map(|combination| {
            let label = combination_label(&combination);
            let estimated_delivery = delivery_estimate(&combination);

            RateOption {
                combination,
                label,
                estimated_delivery,
            }
        })
        .collect()
}

/// Join zone and carrier names across the combination's selections.
fn combination_label(combination: &ShippingCombination<'_>) -> String {
    combination
        .selections()
        .iter()
        .map(|selection| format!("{} ({})", selection.zone_name(), selection.option().name()))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Delivery window spanning the slowest bounds across all selections.
fn delivery_estimate(combination: &ShippingCombination<'_>) -> String {
    let min_days = combination
        .selections()
        .iter()
        .map(|selection| selection.option().min_days())
        .min()
        .unwrap_or(0);

    let max_days = combination
        .selections()
        .iter()
        .map(|selection| selection.option().max_days())
        .max()
        .unwrap_or(0);

    day_window_label(min_days, max_days)
}
