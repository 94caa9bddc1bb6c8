//! # invento-store
//!
//! SQLite persistence for Invento, built on `sqlx`.
//!
//! - [`Store`]: queries over the `inventory`, `users` and `requests` tables,
//!   including the approval transaction
//! - [`bootstrap`]: startup initialization (schema, default data, integrity
//!   check) with retries
//! - [`password`]: Argon2 hashing for the `users.password` column

pub mod bootstrap;
pub mod error;
pub mod password;
pub mod store;

pub use bootstrap::{InitOptions, initialize, prepare};
pub use error::StoreError;
pub use store::{DecisionOutcome, InventoryChange, REQUIRED_TABLES, Store};
