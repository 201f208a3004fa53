//! # App Context
//!
//! Shared state registry the app shell passes down to its screens. The
//! shell registers the cart once with [`CartProvider::provide`]; screens look
//! it up with [`use_cart`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  App shell                                                             │
//! │    let cart = CartProvider::mount(store, &config);                     │
//! │    CartProvider::provide(&mut ctx, cart);                              │
//! │         │                                                               │
//! │         ├──► ProductList screen ── use_cart(&ctx)? ── add_to_cart      │
//! │         └──► Cart screen ───────── use_cart(&ctx)? ── increment/dec    │
//! │                                                                         │
//! │  Screen given a context with no cart ──► CartError::OutsideProvider    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::debug;

use crate::error::{CartError, CartResult};
use crate::provider::{CartHandle, CartProvider};

/// Type-keyed registry of shared app state. One value per type.
#[derive(Default)]
pub struct AppContext {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl AppContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value`. Returns false, leaving the existing value in place,
    /// if a value of the same type is already registered.
    pub fn manage<T: Any + Send + Sync>(&mut self, value: T) -> bool {
        let type_id = TypeId::of::<T>();
        if self.values.contains_key(&type_id) {
            return false;
        }
        self.values.insert(type_id, Box::new(value));
        true
    }

    /// Returns the registered value of type `T`, if any.
    pub fn try_state<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns true if a value of type `T` is registered.
    pub fn has<T: Any + Send + Sync>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("values", &self.values.len())
            .finish()
    }
}

impl CartProvider {
    /// Makes `handle` available to everything holding `ctx`.
    ///
    /// Returns false if a cart was already provided.
    pub fn provide(ctx: &mut AppContext, handle: CartHandle) -> bool {
        let added = ctx.manage(handle);
        debug!(added, "Cart provided to app context");
        added
    }
}

/// Returns the cart registered in `ctx`.
///
/// ## Errors
/// [`CartError::OutsideProvider`] if no cart was provided. Callers should
/// treat it as a wiring bug and not retry.
pub fn use_cart(ctx: &AppContext) -> CartResult<CartHandle> {
    ctx.try_state::<CartHandle>()
        .cloned()
        .ok_or(CartError::OutsideProvider)
}
