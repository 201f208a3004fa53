//! # Cart Configuration
//!
//! Configuration management for the cart provider.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_DB_PATH=/tmp/cart.db                                      │
//! │     GOMARKET_ON_CORRUPT=fail                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket-cart/cart.toml (Linux)                          │
//! │     ~/Library/Application Support/com.gomarket.cart/cart.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key "@gomarket", coalesced writes, reset on corrupt record         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! path = "/data/gomarket.db"
//! key = "@gomarket"
//!
//! [persistence]
//! coalesce_writes = true
//! on_corrupt = "reset"  # reset | fail
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use gomarket_core::DEFAULT_CART_KEY;

use crate::error::{CartError, CartResult};

// =============================================================================
// Corrupt Record Policy
// =============================================================================

/// What to do when the persisted cart record cannot be decoded on mount.
///
/// ## Policy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  RESET (Default)                    │  FAIL                             │
/// │  ───────────────                    │  ────                             │
/// │  • ready() returns Reset            │  • ready() returns                │
/// │                                     │    CorruptSnapshot                │
/// │                                                                         │
/// │  Both: raw record copied to <key>.corrupt, cart starts empty, and the  │
/// │  next mutation overwrites the record.                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Back up the unreadable record and start with an empty cart.
    #[default]
    Reset,

    /// Report the load failure through `ready()`.
    Fail,
}

impl std::fmt::Display for CorruptPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorruptPolicy::Reset => write!(f, "reset"),
            CorruptPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for CorruptPolicy {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reset" | "empty" => Ok(CorruptPolicy::Reset),
            "fail" | "error" => Ok(CorruptPolicy::Fail),
            other => Err(CartError::InvalidConfig(format!(
                "Unknown corrupt-record policy: '{}'. Valid options: reset, fail",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file. `None` means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key the cart record is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            path: None,
            key: default_key(),
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// How the in-memory cart is mirrored to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Collapse snapshots still waiting in the queue into the newest one.
    #[serde(default = "default_true")]
    pub coalesce_writes: bool,

    /// Policy for an unreadable record on mount.
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            coalesce_writes: true,
            on_corrupt: CorruptPolicy::default(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage location.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Persistence behavior.
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        if let Some(ref path) = self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(CartError::InvalidConfig(
                    "storage.path must not be empty when set".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    ///
    /// ## Variables
    /// - `GOMARKET_DB_PATH`: database file
    /// - `GOMARKET_CART_KEY`: storage key
    /// - `GOMARKET_COALESCE_WRITES`: `true` / `false`
    /// - `GOMARKET_ON_CORRUPT`: `reset` / `fail`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("GOMARKET_CART_KEY") {
            debug!(key = %key, "Overriding cart key from environment");
            self.storage.key = key;
        }

        if let Some(value) = lookup("GOMARKET_COALESCE_WRITES") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.persistence.coalesce_writes = true,
                "0" | "false" | "no" => self.persistence.coalesce_writes = false,
                _ => warn!(value = %value, "Unknown GOMARKET_COALESCE_WRITES value"),
            }
        }

        if let Some(policy) = lookup("GOMARKET_ON_CORRUPT") {
            match policy.parse() {
                Ok(parsed) => self.persistence.on_corrupt = parsed,
                Err(e) => warn!(error = %e, "Ignoring GOMARKET_ON_CORRUPT"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Returns the database path: the configured one, or the platform
    /// data directory.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.gomarket.cart/gomarket.db`
    /// - **Windows**: `%APPDATA%\gomarket\cart\data\gomarket.db`
    /// - **Linux**: `~/.local/share/gomarket-cart/gomarket.db`
    pub fn database_path(&self) -> CartResult<PathBuf> {
        if let Some(ref path) = self.storage.path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("com", "gomarket", "cart").ok_or_else(|| {
            CartError::InvalidConfig("Could not determine app data directory".into())
        })?;

        Ok(dirs.data_dir().join("gomarket.db"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the key the unreadable record is backed up under.
    pub fn corrupt_backup_key(&self) -> String {
        format!("{}.corrupt", self.storage.key)
    }
}
