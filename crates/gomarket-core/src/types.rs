//! # Domain Types
//!
//! Core domain types used throughout the GoMarket cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   add_to_cart    ┌─────────────────┐              │
//! │  │    Product      │ ───────────────► │    LineItem     │              │
//! │  │  ─────────────  │                  │  ─────────────  │              │
//! │  │  id             │                  │  id             │              │
//! │  │  title          │                  │  title          │              │
//! │  │  image_url      │                  │  image_url      │              │
//! │  │  price          │                  │  price          │              │
//! │  └─────────────────┘                  │  quantity       │              │
//! │                                       └─────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are serialized as-is (`image_url`, not `imageUrl`) so the
//! persisted record stays readable by the storefront's existing installs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Product
// =============================================================================

/// A catalog product the UI can put into the cart.
///
/// Everything except `id` is opaque to the cart: it is carried along for
/// display and never inspected by the transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Stable product identifier, unique across the catalog.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Image shown next to the product.
    pub image_url: String,

    /// Unit price as delivered by the catalog.
    pub price: f64,
}

impl Product {
    /// Creates a product.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// An entry in the cart.
///
/// ## Quantity
/// Entries produced by the cart transitions always have `quantity >= 1`.
/// A persisted record may omit `quantity` or hold `0`; it then deserializes
/// as `0` and the transitions handle it (see [`crate::cart`]).
///
/// Only `id` is required when reading a record. Display fields are opaque
/// to the cart and default to empty / `0.0` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item from a product and quantity.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        LineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity,
        }
    }

    /// Returns a copy of this entry with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        LineItem {
            quantity,
            ..self.clone()
        }
    }

    /// Returns the product this entry was created from.
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }

    /// Price × quantity, for display totals.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
