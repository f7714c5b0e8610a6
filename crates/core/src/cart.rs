//! Shopping cart reducer.
//!
//! The cart lives in the visitor's session and is edited without touching the
//! backend. Only checkout submits it, as a list of [`CheckoutItem`]s.
//!
//! Lines always have `quantity >= 1`; setting a quantity to zero or less
//! removes the line. Totals are computed from the lines on every call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::CheckoutItem;
use crate::types::{Price, RefaccionId};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: RefaccionId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default)]
    pub category: Option<String>,
}

impl CartItem {
    /// `price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price * self.quantity
    }
}

/// Highest unit price a cart line may carry, in pesos.
pub const MAX_UNIT_PRICE_PESOS: i64 = 1_000_000;

/// Whether `price` is a unit price the catalog could have shown.
#[must_use]
pub fn is_valid_unit_price(price: Price) -> bool {
    let amount = price.amount();
    !amount.is_sign_negative() && amount <= Decimal::from(MAX_UNIT_PRICE_PESOS)
}

/// Product snapshot taken when a part is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: RefaccionId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Every mutation the cart accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add `quantity` units (at least one), merging with an existing line.
    /// Ignored when the price fails [`is_valid_unit_price`].
    Add { item: NewCartItem, quantity: u32 },
    /// Set a line's quantity. Zero or negative removes it.
    UpdateQuantity { id: RefaccionId, quantity: i64 },
    Remove { id: RefaccionId },
    Clear,
    /// Replace the whole cart, dropping empty lines.
    Load(Vec<CartItem>),
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reducer form of the mutators below.
    #[must_use]
    pub fn apply(mut self, action: CartAction) -> Self {
        match action {
            CartAction::Add { item, quantity } => self.add_item(item, quantity),
            CartAction::UpdateQuantity { id, quantity } => self.update_quantity(id, quantity),
            CartAction::Remove { id } => self.remove_item(id),
            CartAction::Clear => self.clear(),
            CartAction::Load(items) => {
                self.items = items
                    .into_iter()
                    .filter(|i| i.quantity > 0 && is_valid_unit_price(i.price))
                    .collect();
            }
        }
        self
    }

    /// Add units of a product. Existing lines are incremented; a price
    /// outside `0..=MAX_UNIT_PRICE_PESOS` leaves the cart unchanged.
    pub fn add_item(&mut self, item: NewCartItem, quantity: u32) {
        if !is_valid_unit_price(item.price) {
            return;
        }
        let quantity = quantity.max(1);
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.items.push(CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            image: item.image,
            quantity,
            category: item.category,
        });
    }

    /// Set a line's quantity; `quantity <= 0` removes the line.
    pub fn update_quantity(&mut self, id: RefaccionId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn remove_item(&mut self, id: RefaccionId) {
        self.items.retain(|line| line.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ(price × quantity) over the current lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Units across all lines, shown on the header badge.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Units of one product, zero if it is not in the cart.
    #[must_use]
    pub fn item_count(&self, id: RefaccionId) -> u32 {
        self.items
            .iter()
            .find(|line| line.id == id)
            .map_or(0, |line| line.quantity)
    }

    /// Lines in the shape `POST /pedidos/checkout/` expects.
    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.items
            .iter()
            .map(|line| CheckoutItem {
                refaccion: line.id,
                cantidad: line.quantity,
            })
            .collect()
    }
}
