//! # Validation Module
//!
//! Input validation for products entering the cart and entries restored
//! from storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI                                                │
//! │  └── Only offers catalog products                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart transitions (Rust)                                      │
//! │  └── THIS MODULE: id present, price representable in JSON              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Snapshot load                                                │
//! │  └── Decoding + duplicate-id normalization                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::Product;
//! use gomarket_core::validation::validate_product;
//!
//! assert!(validate_product(&Product::new("p1", "Shirt", "", 10.0)).is_ok());
//! assert!(validate_product(&Product::new("  ", "Shirt", "", 10.0)).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// `NaN` and infinities serialize to `null` in JSON, which would make the
/// persisted record unreadable on the next mount.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a product before it is added to the cart.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_price(product.price)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
