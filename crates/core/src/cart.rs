//! The visitor's cart.
//!
//! A [`Cart`] is nothing more than a map from [`ProductId`] to a positive
//! quantity. It is stored in the visitor's session and knows nothing about
//! prices; [`Cart::resolve`] turns it into a priced [`FullCart`] given a way to
//! look products up.
//!
//! # Invariants
//!
//! - A line's quantity is never zero. Decrementing the last unit removes the line.
//! - Removing or deleting a product that is not in the cart is a no-op.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, PriceError, Product, ProductId};

/// Product quantities for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ProductId, u32>", into = "BTreeMap<ProductId, u32>")]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product_id`, creating the line if needed.
    ///
    /// Returns the new quantity. Quantities saturate at `u32::MAX`.
    pub fn add(&mut self, product_id: ProductId) -> u32 {
        let quantity = self.lines.entry(product_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Take one unit of `product_id` out of the cart.
    ///
    /// A line at quantity 1 is removed entirely. Returns `false` if the
    /// product was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        match self.lines.get_mut(&product_id) {
            Some(quantity) if *quantity > 1 => {
                *quantity -= 1;
                true
            }
            Some(_) => {
                self.lines.remove(&product_id);
                true
            }
            None => false,
        }
    }

    /// Drop the line for `product_id` whatever its quantity.
    ///
    /// Returns `false` if the product was not in the cart.
    pub fn delete(&mut self, product_id: ProductId) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of `product_id`, if present.
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Lines in product id order.
    pub fn lines(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(id, quantity)| (*id, *quantity))
    }

    /// Product ids in the cart.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.keys().copied().collect()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|q| u64::from(*q)).sum()
    }

    /// Price the cart.
    ///
    /// `lookup` resolves a product id to its catalog entry. Lines whose product
    /// does not resolve are left out of both the item list and the total, and
    /// reported in [`FullCart::missing`].
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if a product is priced in another currency than
    /// `currency` or the total overflows.
    pub fn resolve<'a, F>(&self, currency: CurrencyCode, mut lookup: F) -> Result<FullCart, PriceError>
    where
        F: FnMut(ProductId) -> Option<&'a Product>,
    {
        let mut full = FullCart::empty(currency);

        for (product_id, quantity) in self.lines() {
            let Some(product) = lookup(product_id) else {
                full.missing.push(product_id);
                continue;
            };

            let line_total = product.price.times(quantity)?;
            full.total = full.total.checked_add(line_total)?;
            full.item_count += u64::from(quantity);
            full.items.push(CartItem {
                product: product.clone(),
                quantity,
                line_total,
            });
        }

        Ok(full)
    }
}

impl From<BTreeMap<ProductId, u32>> for Cart {
    fn from(mut lines: BTreeMap<ProductId, u32>) -> Self {
        lines.retain(|_, quantity| *quantity > 0);
        Self { lines }
    }
}

impl From<Cart> for BTreeMap<ProductId, u32> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    /// Unit price times quantity.
    pub line_total: Price,
}

/// A cart with every resolvable line priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullCart {
    pub items: Vec<CartItem>,
    pub total: Price,
    /// Units across the priced lines.
    pub item_count: u64,
    /// Products in the cart that the catalog no longer knows.
    pub missing: Vec<ProductId>,
}

impl FullCart {
    /// A cart with nothing in it.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            total: Price::zero(currency),
            item_count: 0,
            missing: Vec::new(),
        }
    }
}
