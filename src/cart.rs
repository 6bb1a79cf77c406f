//! Carts

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::CartItem,
    pricing::{PricingError, subtotal, total_weight, unit_count},
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was not found in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(usize),
}

/// A shopping cart: the item lines to be shipped, all priced in one currency.
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if any item's currency differs from the cart
    /// currency.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { items, currency })
    }

    /// Calculate the subtotal of the cart (unit price times quantity).
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` if there was a money arithmetic or currency
    /// mismatch error.
    pub fn subtotal(&'a self) -> Result<Money<'a, Currency>, PricingError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        let refs: SmallVec<[&CartItem<'a>; 10]> = self.items.iter().collect();

        subtotal(&refs)
    }

    /// Calculate the total weight of the cart, in kilograms.
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` if the decimal arithmetic overflows.
    pub fn total_weight(&self) -> Result<Decimal, PricingError> {
        let refs: SmallVec<[&CartItem<'a>; 10]> = self.items.iter().collect();

        total_weight(&refs)
    }

    /// Count the total units in the cart.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        let refs: SmallVec<[&CartItem<'a>; 10]> = self.items.iter().collect();

        unit_count(&refs)
    }

    /// Get an item from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the item is not found.
    pub fn get_item(&'a self, item: usize) -> Result<&'a CartItem<'a>, CartError> {
        self.items.get(item).ok_or(CartError::ItemNotFound(item))
    }

    /// Iterate over the items in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// Get the number of item lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use super::*;

    fn test_items<'a>() -> [CartItem<'a>; 2] {
        [
            CartItem::new("widget", 2, Money::from_minor(10_000, USD), Decimal::ONE),
            CartItem::new("gadget", 1, Money::from_minor(5_000, USD), Decimal::TWO),
        ]
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CartItem::new("widget", 1, Money::from_minor(100, USD), Decimal::ONE),
            CartItem::new("gadget", 1, Money::from_minor(100, EUR), Decimal::ONE),
        ];

        let result = Cart::with_items(items, USD);

        match result {
            Err(CartError::CurrencyMismatch(idx, item_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(item_currency, EUR.iso_alpha_code);
                assert_eq!(cart_currency, USD.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn subtotal_scales_by_quantity() -> TestResult {
        let cart = Cart::with_items(test_items(), USD)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(25_000, USD));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_items_is_zero() -> TestResult {
        let cart = Cart::new(USD);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn total_weight_scales_by_quantity() -> TestResult {
        let cart = Cart::with_items(test_items(), USD)?;

        assert_eq!(cart.total_weight()?, Decimal::new(4, 0));

        Ok(())
    }

    #[test]
    fn unit_count_sums_quantities() -> TestResult {
        let cart = Cart::with_items(test_items(), USD)?;

        assert_eq!(cart.unit_count(), 3);

        Ok(())
    }

    #[test]
    fn get_item_returns_item() -> TestResult {
        let cart = Cart::with_items(test_items(), USD)?;
        let item = cart.get_item(1)?;

        assert_eq!(item.product_id(), "gadget");

        Ok(())
    }

    #[test]
    fn get_item_missing_returns_error() {
        let cart = Cart::new(USD);

        let err = cart.get_item(0).err();

        assert!(matches!(err, Some(CartError::ItemNotFound(0))));
    }

    #[test]
    fn iter_returns_items_in_order() -> TestResult {
        let cart = Cart::with_items(test_items(), USD)?;

        let ids: Vec<&str> = cart.iter().map(CartItem::product_id).collect();

        assert_eq!(ids, vec!["widget", "gadget"]);

        Ok(())
    }

    #[test]
    fn len_and_is_empty() -> TestResult {
        let empty = Cart::new(USD);
        let cart = Cart::with_items(test_items(), USD)?;

        assert!(empty.is_empty());
        assert!(!cart.is_empty());
        assert_eq!(cart.len(), 2);

        Ok(())
    }
}
