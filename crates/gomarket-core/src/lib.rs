//! # gomarket-core: Pure Cart Logic for GoMarket
//!
//! This crate holds the cart model and its transitions as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GoMarket Cart Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI                                │   │
//! │  │    Product list ──► "Add to cart" ──► Cart screen (+ / -)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ use_cart()                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gomarket-cart (CartProvider)                    │   │
//! │  │    add_to_cart, increment, decrement, flush                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                   │   │
//! │  │   │   types   │  │   cart    │  │ validation│                   │   │
//! │  │   │  Product  │  │   Cart    │  │   rules   │                   │   │
//! │  │   │ LineItem  │  │ Summary   │  │  checks   │                   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  gomarket-db (Storage Layer)                    │   │
//! │  │              Key-value store, SQLite, migrations                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LineItem)
//! - [`cart`] - The cart and its add / increment / decrement transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, Product};
//!
//! let shirt = Product::new("p1", "Shirt", "https://cdn/p1.png", 10.0);
//!
//! let cart = Cart::new().add_to_cart(&shirt).unwrap();
//! let cart = cart.add_to_cart(&shirt).unwrap();
//! assert_eq!(cart.quantity_of("p1"), Some(2));
//!
//! let cart = cart.decrement("p1").decrement("p1");
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartSummary, SnapshotReport};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{LineItem, Product};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot is persisted under.
///
/// Shared with the storefront app's existing installs, so it must not change.
pub const DEFAULT_CART_KEY: &str = "@gomarket";
