//! # gomarket-cart: Cart Provider for the GoMarket Storefront
//!
//! Holds the shopping cart every screen shares, applies the three cart
//! transitions, and mirrors the cart to a key-value store so it survives
//! restarts.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      gomarket-cart Architecture                         │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────┐     ┌────────────────────┐  │
//! │  │ AppContext   │     │   CartHandle     │     │   PersistWriter    │  │
//! │  │              │     │                  │     │                    │  │
//! │  │ use_cart() ──┼────►│ products()       │     │ load on mount      │  │
//! │  │              │     │ add_to_cart()  ──┼────►│ ordered writes     │  │
//! │  │              │     │ increment()      │ mpsc│ coalescing         │  │
//! │  │              │     │ decrement()      │     │ flush / shutdown   │  │
//! │  └──────────────┘     └────────┬─────────┘     └─────────┬──────────┘  │
//! │                                │ watch                   │              │
//! │                                ▼                         ▼              │
//! │                       subscribers (screens)        KvStore (SQLite)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - Cart configuration (TOML + env)
//! - [`context`] - App context and `use_cart`
//! - [`error`] - Cart error types
//! - [`provider`] - `CartProvider` and `CartHandle`
//! - [`writer`] - Load and write-queue task
//!
//! ## Usage
//! ```rust,ignore
//! use gomarket_cart::{use_cart, AppContext, CartConfig, CartProvider};
//!
//! let db = Database::new(DbConfig::new(config.database_path()?)).await?;
//! let mut ctx = AppContext::new();
//! CartProvider::provide(&mut ctx, CartProvider::mount(Arc::new(db.kv()), &config));
//!
//! let cart = use_cart(&ctx)?;
//! cart.add_to_cart(&product).await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod provider;
pub mod writer;

pub use config::{CartConfig, CorruptPolicy, PersistenceSettings, StorageSettings};
pub use context::{use_cart, AppContext};
pub use error::{CartError, CartResult};
pub use provider::{CartHandle, CartProvider};
pub use writer::{LoadOutcome, LoadStatus, PersistWriter, WriteQueue};

pub use gomarket_core::{Cart, CartSummary, LineItem, Product};
