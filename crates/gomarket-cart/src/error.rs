//! # Cart Error Types
//!
//! Errors surfaced by the cart provider to UI code.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Programmer     │  │   Storage       │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  OutsideProvider│  │  Storage        │  │  InvalidConfig          │ │
//! │  │  InvalidProduct │  │  CorruptSnapshot│  │  ConfigLoadFailed       │ │
//! │  │                 │  │  Serialization  │  │  ConfigSaveFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ShuttingDown: the provider was shut down and takes no more work       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Variants carry messages rather than source errors so the error can be
//! cloned into every waiter of [`crate::CartHandle::ready`].

use gomarket_core::CoreError;
use gomarket_db::DbError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart provider error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart was requested from a context with no provider registered.
    ///
    /// A programming error: the screen was mounted outside the provider's
    /// subtree.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// The product handed to `add_to_cart` failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// The persisted record could not be decoded.
    #[error("Corrupt cart snapshot: {0}")]
    CorruptSnapshot(String),

    /// Reading or writing the key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encoding the cart for storage failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The provider has been shut down.
    #[error("Cart provider is shutting down")]
    ShuttingDown,

    /// Invalid cart configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => CartError::InvalidProduct(v.to_string()),
            CoreError::InvalidSnapshot(msg) => CartError::CorruptSnapshot(msg),
        }
    }
}

impl From<DbError> for CartError {
    fn from(err: DbError) -> Self {
        CartError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CartError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error came from the persisted copy of the cart.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            CartError::Storage(_) | CartError::CorruptSnapshot(_) | CartError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_core::ValidationError;

    #[test]
    fn test_outside_provider_message() {
        assert_eq!(
            CartError::OutsideProvider.to_string(),
            "use_cart must be used within a CartProvider"
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let err: CartError = CoreError::Validation(ValidationError::Required {
            field: "id".into(),
        })
        .into();
        assert_eq!(err, CartError::InvalidProduct("id is required".into()));

        let err: CartError = CoreError::InvalidSnapshot("eof".into()).into();
        assert_eq!(err, CartError::CorruptSnapshot("eof".into()));
    }

    #[test]
    fn test_categories() {
        assert!(CartError::Storage("disk full".into()).is_storage_error());
        assert!(CartError::CorruptSnapshot("x".into()).is_storage_error());
        assert!(!CartError::OutsideProvider.is_storage_error());

        assert!(CartError::InvalidConfig("empty key".into()).is_config_error());
        assert!(!CartError::ShuttingDown.is_config_error());
    }

    #[test]
    fn test_db_error_conversion() {
        let err: CartError = DbError::PoolExhausted.into();
        assert_eq!(err, CartError::Storage("Connection pool exhausted".into()));
    }
}
