//! Shopping cart.
//!
//! The cart lives entirely on the device. Lines are keyed by a locally
//! generated [`CartItemId`] and hold a snapshot of the product so totals can
//! be derived without the network. A product appears on at most one line:
//! adding it again increases that line's quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument};

use hungry_owl_core::{CartItemId, CurrencyCode, Price, Product, ProductId};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A quantity was zero, negative or too large.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
    pub product: Product,
}

impl CartItem {
    /// Price of the line after discount.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.effective_price() * Decimal::from(self.quantity)
    }

    /// Price of the line before discount.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart contents in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Quantity of `product_id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Total after discounts, exact.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total before discounts, exact.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_subtotal).sum()
    }

    /// Amount saved through discounts.
    #[must_use]
    pub fn total_savings(&self) -> Decimal {
        self.subtotal() - self.total_price()
    }

    fn add(&mut self, product: Product, quantity: u32) -> Result<CartItemId, CartError> {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                CartError::InvalidArgument(format!(
                    "quantity of product {} would overflow",
                    product.id
                ))
            })?;
            line.product = product;
            return Ok(line.id);
        }

        let id = CartItemId::generate();
        self.items.push(CartItem {
            id,
            product_id: product.id,
            quantity,
            product,
        });
        Ok(id)
    }

    fn remove(&mut self, id: CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    fn set_quantity(&mut self, id: CartItemId, quantity: u32) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }
}

/// Observable cart.
#[derive(Debug, Default)]
pub struct CartStore {
    state: watch::Sender<Cart>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an existing cart.
    #[must_use]
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            state: watch::Sender::new(cart),
        }
    }

    /// Receive every cart change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Snapshot of the cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line for the same product, refreshing its
    /// snapshot, or opens a new line. Returns the line's id.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if `quantity` is not positive or
    /// the merged quantity would overflow. The cart is unchanged.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&self, product: Product, quantity: i64) -> Result<CartItemId, CartError> {
        let quantity = positive_quantity(quantity)?;
        let mut outcome = None;
        self.state.send_if_modified(|cart| {
            let result = cart.add(product, quantity);
            let changed = result.is_ok();
            outcome = Some(result);
            changed
        });
        let id = outcome
            .unwrap_or_else(|| Err(CartError::InvalidArgument("cart was not updated".into())))?;
        debug!(cart_item_id = %id, quantity, "added to cart");
        Ok(id)
    }

    /// Remove a line. Unknown ids are ignored.
    pub fn remove_item(&self, id: CartItemId) {
        self.state.send_if_modified(|cart| cart.remove(id));
    }

    /// Set a line's quantity. Zero removes the line; unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if `quantity` is negative or does
    /// not fit a line quantity.
    pub fn update_quantity(&self, id: CartItemId, quantity: i64) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_item(id);
            return Ok(());
        }
        let quantity = positive_quantity(quantity)?;
        self.state
            .send_if_modified(|cart| cart.set_quantity(id, quantity));
        Ok(())
    }

    /// Remove every line.
    pub fn clear_cart(&self) {
        self.state.send_if_modified(|cart| {
            let changed = !cart.items.is_empty();
            cart.items.clear();
            changed
        });
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<CartItem> {
        self.state.borrow().item(id).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.state.borrow().line_count()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.borrow().item_count()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.state.borrow().quantity_of(product_id)
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.borrow().total_price()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.state.borrow().subtotal()
    }

    #[must_use]
    pub fn total_savings(&self) -> Decimal {
        self.state.borrow().total_savings()
    }

    /// Total rounded to the currency's minor unit for display.
    #[must_use]
    pub fn display_total(&self, currency: CurrencyCode) -> Price {
        Price::rounded(self.total_price(), currency)
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidArgument(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    u32::try_from(quantity)
        .map_err(|_| CartError::InvalidArgument(format!("quantity {quantity} is too large")))
}
