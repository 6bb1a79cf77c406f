//! Per-Zone Pricing
//!
//! Prices one set of cart items under one zone and carrier option. All
//! intermediate arithmetic stays in exact minor units and [`Decimal`] scale
//! factors; two-decimal rounding happens only when a [`Money`] value is
//! displayed.

use std::fmt;

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    items::CartItem,
    zones::{CarrierOption, Zone},
};

/// Errors that can occur while pricing an assignment.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No items were provided, so currency could not be determined.
    #[error("no items assigned; cannot price an empty assignment")]
    NoItems,

    /// Minor-unit arithmetic overflowed.
    #[error("price amount overflowed minor-unit arithmetic")]
    AmountOverflow,

    /// A weight surcharge could not be represented in minor units.
    #[error("weight surcharge over {kilograms} kg cannot be represented in minor units")]
    SurchargeNotRepresentable {
        /// Excess weight the surcharge was computed for.
        kilograms: Decimal,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Why a priced assignment came out free.
#[derive(Clone, Debug, PartialEq)]
pub enum FreeReason<'a> {
    /// The zone waives shipping unconditionally.
    AlwaysFree,

    /// The order subtotal reached the zone's free-shipping threshold.
    ThresholdMet {
        /// Configured free-shipping threshold.
        threshold: Money<'a, Currency>,

        /// Subtotal that met it.
        subtotal: Money<'a, Currency>,
    },
}

impl fmt::Display for FreeReason<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeReason::AlwaysFree => write!(f, "shipping is always free for this zone"),
            FreeReason::ThresholdMet {
                threshold,
                subtotal,
            } => write!(
                f,
                "order subtotal {subtotal} meets the {threshold} free-shipping threshold"
            ),
        }
    }
}

/// One line of a price breakdown.
#[derive(Clone, Debug, PartialEq)]
pub enum PriceComponent<'a> {
    /// The carrier option's base price.
    Base(Money<'a, Currency>),

    /// Surcharge for units beyond the first.
    ExtraProducts {
        /// Number of surcharged units.
        count: u64,

        /// Total surcharge amount.
        amount: Money<'a, Currency>,
    },

    /// Surcharge for weight above the per-package ceiling.
    ExtraWeight {
        /// Excess weight in kilograms.
        kilograms: Decimal,

        /// Total surcharge amount.
        amount: Money<'a, Currency>,
    },
}

/// Advisory warning that an assignment exceeds a per-package limit.
///
/// Never blocks pricing; the caller decides whether to force a multi-package
/// split upstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitBreach {
    /// Total weight exceeds the per-package weight ceiling.
    OverWeight {
        /// Total assignment weight in kilograms.
        total_kg: Decimal,

        /// Configured ceiling in kilograms.
        max_kg: Decimal,
    },

    /// Unit count exceeds the per-package product ceiling.
    OverProductCount {
        /// Total unit count of the assignment.
        count: u64,

        /// Configured ceiling.
        max: u32,
    },
}

impl fmt::Display for LimitBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitBreach::OverWeight { total_kg, max_kg } => write!(
                f,
                "total weight {total_kg} kg exceeds the {max_kg} kg per-package ceiling"
            ),
            LimitBreach::OverProductCount { count, max } => write!(
                f,
                "{count} units exceed the {max} units-per-package ceiling"
            ),
        }
    }
}

/// Result of pricing one set of items under one zone and carrier option.
#[derive(Clone, Debug, PartialEq)]
pub struct ZonePrice<'a> {
    price: Money<'a, Currency>,
    free_reason: Option<FreeReason<'a>>,
    breakdown: SmallVec<[PriceComponent<'a>; 3]>,
    limit_breaches: SmallVec<[LimitBreach; 2]>,
}

impl<'a> ZonePrice<'a> {
    /// Return the computed price.
    #[must_use]
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Whether the price was waived by a free-shipping policy.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.free_reason.is_some()
    }

    /// Return why the price was waived, if it was.
    #[must_use]
    pub fn free_reason(&self) -> Option<&FreeReason<'a>> {
        self.free_reason.as_ref()
    }

    /// Return the price breakdown (empty for free assignments).
    #[must_use]
    pub fn breakdown(&self) -> &[PriceComponent<'a>] {
        &self.breakdown
    }

    /// Return the advisory per-package limit breaches.
    #[must_use]
    pub fn limit_breaches(&self) -> &[LimitBreach] {
        &self.limit_breaches
    }

    /// Whether the assignment exceeds any per-package limit.
    #[must_use]
    pub fn exceeds_limits(&self) -> bool {
        !self.limit_breaches.is_empty()
    }
}

/// Calculate the total price of one cart item line.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the minor-unit multiplication
/// overflows.
pub fn line_total<'a>(item: &CartItem<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let minor = item
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(item.quantity()))
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Money::from_minor(minor, item.unit_price().currency()))
}

/// Calculate the subtotal of a set of items (unit price times quantity).
///
/// # Errors
///
/// - [`PricingError::NoItems`]: no items were provided, so currency could not
///   be determined.
/// - [`PricingError::AmountOverflow`]: minor-unit arithmetic overflowed.
/// - [`PricingError::Money`]: money arithmetic or currency mismatch error.
pub fn subtotal<'a>(items: &[&CartItem<'a>]) -> Result<Money<'a, Currency>, PricingError> {
    let first = items.first().ok_or(PricingError::NoItems)?;

    items.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, item| Ok(acc.add(line_total(item)?)?),
    )
}

/// Calculate the total weight of a set of items, in kilograms.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the decimal arithmetic
/// overflows.
pub fn total_weight(items: &[&CartItem<'_>]) -> Result<Decimal, PricingError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        let line = item
            .unit_weight()
            .checked_mul(Decimal::from(item.quantity()))
            .ok_or(PricingError::AmountOverflow)?;

        acc.checked_add(line).ok_or(PricingError::AmountOverflow)
    })
}

/// Count the total units in a set of items.
#[must_use]
pub fn unit_count(items: &[&CartItem<'_>]) -> u64 {
    items
        .iter()
        .map(|item| u64::from(item.quantity()))
        .sum()
}

/// Price a set of items under one zone and carrier option.
///
/// Free-shipping policies are checked first (`always_free` wins over a
/// subtotal threshold when both are set); otherwise the price starts from the
/// option's base price and adds the per-extra-product and per-extra-kilogram
/// surcharges. Per-package limit breaches are recorded as advisory warnings
/// in every case and never block pricing.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: the assignment is empty.
/// - [`PricingError::AmountOverflow`]: minor-unit or weight arithmetic
///   overflowed.
/// - [`PricingError::SurchargeNotRepresentable`]: a weight surcharge could
///   not be converted back to minor units.
/// - [`PricingError::Money`]: money arithmetic or currency mismatch error.
pub fn price_assignment<'a>(
    zone: &Zone<'a>,
    option: &CarrierOption<'a>,
    items: &[&CartItem<'a>],
) -> Result<ZonePrice<'a>, PricingError> {
    if items.is_empty() {
        return Err(PricingError::NoItems);
    }

    let currency = option.base_price().currency();
    let cart_subtotal = subtotal(items)?;
    let weight = total_weight(items)?;
    let units = unit_count(items);
    let limit_breaches = limit_breaches(option, weight, units);

    if let Some(policy) = zone.free_shipping() {
        if policy.always_free {
            return Ok(ZonePrice {
                price: Money::from_minor(0, currency),
                free_reason: Some(FreeReason::AlwaysFree),
                breakdown: SmallVec::new(),
                limit_breaches,
            });
        }

        if let Some(threshold) = policy.min_order
            && cart_subtotal.to_minor_units() >= threshold.to_minor_units()
        {
            return Ok(ZonePrice {
                price: Money::from_minor(0, currency),
                free_reason: Some(FreeReason::ThresholdMet {
                    threshold,
                    subtotal: cart_subtotal,
                }),
                breakdown: SmallVec::new(),
                limit_breaches,
            });
        }
    }

    let mut total_minor = option.base_price().to_minor_units();
    let mut breakdown: SmallVec<[PriceComponent<'a>; 3]> =
        smallvec![PriceComponent::Base(*option.base_price())];

    if let Some(package) = option.package() {
        // The first unit ships at the base price; only the rest are surcharged.
        if units > 1
            && let Some(per_extra) = package.cost_per_extra_product
            && per_extra.to_minor_units() > 0
        {
            let count = units - 1;
            let amount_minor = i64::try_from(count)
                .ok()
                .and_then(|count| count.checked_mul(per_extra.to_minor_units()))
                .ok_or(PricingError::AmountOverflow)?;

            breakdown.push(PriceComponent::ExtraProducts {
                count,
                amount: Money::from_minor(amount_minor, currency),
            });

            total_minor = total_minor
                .checked_add(amount_minor)
                .ok_or(PricingError::AmountOverflow)?;
        }

        if let (Some(max_kg), Some(per_kg)) = (package.max_weight_kg, package.cost_per_extra_kg)
            && weight > max_kg
            && max_kg > Decimal::ZERO
            && per_kg.to_minor_units() > 0
        {
            let kilograms = weight
                .checked_sub(max_kg)
                .ok_or(PricingError::AmountOverflow)?;

            let amount_minor = weight_surcharge_minor(kilograms, &per_kg)?;

            breakdown.push(PriceComponent::ExtraWeight {
                kilograms,
                amount: Money::from_minor(amount_minor, currency),
            });

            total_minor = total_minor
                .checked_add(amount_minor)
                .ok_or(PricingError::AmountOverflow)?;
        }
    }

    Ok(ZonePrice {
        price: Money::from_minor(total_minor, currency),
        free_reason: None,
        breakdown,
        limit_breaches,
    })
}

/// Collect advisory per-package limit breaches for an assignment.
fn limit_breaches(
    option: &CarrierOption<'_>,
    weight: Decimal,
    units: u64,
) -> SmallVec<[LimitBreach; 2]> {
    let mut breaches = SmallVec::new();

    let Some(package) = option.package() else {
        return breaches;
    };

    if let Some(max_kg) = package.max_weight_kg
        && weight > max_kg
    {
        breaches.push(LimitBreach::OverWeight {
            total_kg: weight,
            max_kg,
        });
    }

    if let Some(max) = package.max_products
        && units > u64::from(max)
    {
        breaches.push(LimitBreach::OverProductCount { count: units, max });
    }

    breaches
}

/// Convert a per-kilogram surcharge over an excess weight to minor units,
/// rounding halves away from zero.
fn weight_surcharge_minor(
    kilograms: Decimal,
    per_kg: &Money<'_, Currency>,
) -> Result<i64, PricingError> {
    let per_minor = Decimal::from(per_kg.to_minor_units());

    let applied = kilograms
        .checked_mul(per_minor)
        .ok_or(PricingError::SurchargeNotRepresentable { kilograms })?;

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded
        .to_i64()
        .ok_or(PricingError::SurchargeNotRepresentable { kilograms })
}
