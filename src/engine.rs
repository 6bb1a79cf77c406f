//! Resolution Engine
//!
//! The single entry point a checkout flow calls: validates the inputs, then
//! sequences matcher, combination builder and ranker. The engine is a pure,
//! synchronous computation over caller-supplied values: it keeps no state
//! between calls, performs no I/O and is safe to call concurrently.
//! "No shipping available" is a valid, empty result, never an error.

use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    address::Address,
    cart::Cart,
    combinations::build_combinations,
    matcher::match_zones,
    pricing::PricingError,
    ranking::{RateOption, rank},
    zones::{Zone, ZoneKey},
};

/// Input validation errors, rejected before any computation starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The cart has no items.
    #[error("cart has no items")]
    EmptyCart,

    /// The address has no postal code.
    #[error("address is missing a postal code")]
    MissingPostalCode,

    /// The address has no state.
    #[error("address is missing a state")]
    MissingState,

    /// An item has a zero quantity.
    #[error("item {index} has a zero quantity")]
    ZeroQuantity {
        /// Cart index of the offending item.
        index: usize,
    },

    /// An item has a negative unit price.
    #[error("item {index} has a negative unit price")]
    NegativeUnitPrice {
        /// Cart index of the offending item.
        index: usize,
    },

    /// An item has a negative unit weight.
    #[error("item {index} has a negative unit weight")]
    NegativeUnitWeight {
        /// Cart index of the offending item.
        index: usize,
    },
}

/// Errors surfaced by [`resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Wrapped input validation error.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Wrapped pricing arithmetic error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Structured reason why no shipping combination exists.
///
/// A business outcome for the caller to display, not an error: resolution
/// still returns `Ok` with an empty option list.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoverageFailure {
    /// No zone in the book applies to the destination address.
    #[error("no eligible zones for address")]
    NoEligibleZones,

    /// A product lists no usable zone among the eligible ones.
    #[error("product {product_id} has no eligible shipping zone")]
    UnshippableProduct {
        /// Identifier of the product that cannot ship.
        product_id: String,
    },
}

/// The result of one resolution call: ranked options, or a structured
/// failure reason when the option list is empty.
#[derive(Debug)]
pub struct Resolution<'a> {
    options: Vec<RateOption<'a>>,
    failure: Option<CoverageFailure>,
}

impl<'a> Resolution<'a> {
    /// Return the ranked shipping options, cheapest covering option first.
    #[must_use]
    pub fn options(&self) -> &[RateOption<'a>] {
        &self.options
    }

    /// Return why no option exists, when the option list is empty.
    #[must_use]
    pub fn failure(&self) -> Option<&CoverageFailure> {
        self.failure.as_ref()
    }

    /// Whether at least one shipping option was produced.
    #[must_use]
    pub fn is_shippable(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Compute every ranked shipping option for a cart and destination address.
///
/// Sequences matcher, combination builder and ranker over the caller-owned
/// zone book. The book must contain only active zones; filtering inactive
/// records is the repository's responsibility. Identical inputs produce
/// identical, order-stable output.
///
/// # Errors
///
/// - [`ResolveError::Validation`]: an input failed validation (empty cart,
///   missing address field, zero quantity, negative price or weight).
/// - [`ResolveError::Pricing`]: money or weight arithmetic failed while
///   pricing a candidate combination.
///
/// A cart that simply cannot ship is not an error: the resolution carries an
/// empty option list plus a [`CoverageFailure`].
pub fn resolve<'a>(
    cart: &Cart<'a>,
    address: &Address,
    zones: &SlotMap<ZoneKey, Zone<'a>>,
) -> Result<Resolution<'a>, ResolveError> {
    validate(cart, address)?;

    let eligible = match_zones(zones, address);
    let combinations = build_combinations(cart, zones, &eligible)?;

    let failure = if combinations.is_empty() {
        Some(coverage_failure(cart, zones, &eligible))
    } else {
        None
    };

    Ok(Resolution {
        options: rank(combinations),
        failure,
    })
}

/// Reject invalid inputs before any computation starts.
fn validate(cart: &Cart<'_>, address: &Address) -> Result<(), ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if address.postal_code().is_empty() {
        return Err(ValidationError::MissingPostalCode);
    }

    if address.state().is_empty() {
        return Err(ValidationError::MissingState);
    }

    for (index, item) in cart.iter().enumerate() {
        if item.quantity() == 0 {
            return Err(ValidationError::ZeroQuantity { index });
        }

        if item.unit_price().to_minor_units() < 0 {
            return Err(ValidationError::NegativeUnitPrice { index });
        }

        if item.unit_weight().is_sign_negative() && !item.unit_weight().is_zero() {
            return Err(ValidationError::NegativeUnitWeight { index });
        }
    }

    Ok(())
}

/// Work out why the builder produced nothing.
fn coverage_failure(
    cart: &Cart<'_>,
    zones: &SlotMap<ZoneKey, Zone<'_>>,
    eligible: &[ZoneKey],
) -> CoverageFailure {
    if eligible.is_empty() {
        return CoverageFailure::NoEligibleZones;
    }

    for item in cart.iter() {
        let has_usable_zone = item.eligible_zones().iter().any(|key| {
            eligible.contains(key)
                && zones
                    .get(*key)
                    .is_some_and(|zone| !zone.carriers().is_empty())
        });

        if !has_usable_zone {
            return CoverageFailure::UnshippableProduct {
                product_id: item.product_id().to_string(),
            };
        }
    }

    CoverageFailure::NoEligibleZones
}
