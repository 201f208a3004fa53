//! # Cart
//!
//! The cart model and its three transitions.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Transitions                                     │
//! │                                                                         │
//! │  UI Action            Transition            Resulting Entry             │
//! │  ─────────            ──────────            ───────────────             │
//! │                                                                         │
//! │  "Add to cart" ─────► add_to_cart(p) ─────► new: qty 1                  │
//! │                                             existing: qty + 1          │
//! │                                             (existing qty 0 → 1)       │
//! │                                                                         │
//! │  Tap "+" ───────────► increment(id) ──────► qty + 1                     │
//! │                                             (qty 0 → removed)          │
//! │                                                                         │
//! │  Tap "-" ───────────► decrement(id) ──────► qty - 1                     │
//! │                                             (qty ≤ 1 → removed)        │
//! │                                                                         │
//! │  Every transition returns a NEW Cart; the input is never mutated.      │
//! │  Updated entries are removed and re-appended, so order moves.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::types::{LineItem, Product};
use crate::validation::validate_product;

/// The shopping cart.
///
/// ## Invariants
/// - Entries are unique by `id` (adding the same product increases quantity)
/// - Transitions never leave an entry at quantity 0; it is removed instead
/// - Order is not meaningful to consumers
///
/// Serializes as a bare JSON array of line items, which is the persisted
/// record format.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

/// What happened while normalizing a persisted snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Entries kept.
    pub restored: usize,

    /// Entries dropped because an earlier entry had the same id.
    pub duplicates_dropped: usize,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from persisted entries.
    ///
    /// Keeps the first entry for each id. Quantities are taken as stored,
    /// including `0`.
    pub fn from_snapshot(items: Vec<LineItem>) -> (Self, SnapshotReport) {
        let mut report = SnapshotReport::default();
        let mut kept: Vec<LineItem> = Vec::with_capacity(items.len());

        for item in items {
            if kept.iter().any(|k| k.id == item.id) {
                report.duplicates_dropped += 1;
                continue;
            }
            kept.push(item);
        }

        report.restored = kept.len();
        (Cart { items: kept }, report)
    }

    /// Decodes a persisted JSON record.
    pub fn from_json(json: &str) -> CoreResult<(Self, SnapshotReport)> {
        let items: Vec<LineItem> = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(items))
    }

    /// Encodes the cart as the persisted JSON record.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: the existing entry is re-appended with
    ///   quantity + 1 (or 1 if its quantity was 0). Its stored title, image
    ///   and price are kept.
    /// - Product not in cart: appended with quantity 1.
    ///
    /// ## Errors
    /// Returns a validation error for a blank id or a non-finite price.
    pub fn add_to_cart(&self, product: &Product) -> CoreResult<Cart> {
        validate_product(product)?;

        let mut items = self.items_without(&product.id);
        match self.get(&product.id) {
            Some(existing) => {
                let quantity = if existing.quantity > 0 {
                    existing.quantity.saturating_add(1)
                } else {
                    1
                };
                items.push(existing.with_quantity(quantity));
            }
            None => items.push(LineItem::from_product(product, 1)),
        }

        Ok(Cart { items })
    }

    /// Adds one unit to the entry with `id`.
    ///
    /// An entry holding quantity 0 is dropped instead. Unknown ids leave the
    /// cart unchanged.
    pub fn increment(&self, id: &str) -> Cart {
        let Some(existing) = self.get(id) else {
            return self.clone();
        };

        let mut items = self.items_without(id);
        if existing.quantity > 0 {
            items.push(existing.with_quantity(existing.quantity.saturating_add(1)));
        }

        Cart { items }
    }

    /// Removes one unit from the entry with `id`.
    ///
    /// Decrementing an entry with quantity 1 (or 0) removes it. Unknown ids
    /// leave the cart unchanged.
    pub fn decrement(&self, id: &str) -> Cart {
        let Some(existing) = self.get(id) else {
            return self.clone();
        };

        let mut items = self.items_without(id);
        if existing.quantity > 1 {
            items.push(existing.with_quantity(existing.quantity - 1));
        }

        Cart { items }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the entries in their current order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the entry with `id`, if present.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the quantity held for `id`, if present.
    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|i| i.quantity)
    }

    /// Checks whether an entry with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of distinct entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all entries.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Returns the sum of price × quantity over all entries.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Returns the totals shown on the cart screen.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(self)
    }

    fn items_without(&self, id: &str) -> Vec<LineItem> {
        self.items.iter().filter(|i| i.id != id).cloned().collect()
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_quantity: u64,
    pub total_price: f64,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        CartSummary {
            item_count: cart.len(),
            total_quantity: cart.total_quantity(),
            total_price: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
