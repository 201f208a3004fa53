//! # Repository Module
//!
//! Database repository implementations for the GoMarket cart.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CartProvider write queue                                              │
//! │       │                                                                 │
//! │       │  store.set_item("@gomarket", json)                             │
//! │       ▼                                                                 │
//! │  KvRepository                                                          │
//! │  ├── get_item(&self, key)                                              │
//! │  ├── set_item(&self, key, value)   (upsert)                            │
//! │  ├── remove_item(&self, key)                                           │
//! │  └── keys(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (kv_store table)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KvRepository`](kv::KvRepository) - Key-value records

pub mod kv;
