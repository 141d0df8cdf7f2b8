//! Database module
//!
//! Connection pooling, schema migrations and the read-only store contract.

mod connection;
pub mod migrations;
mod store;

pub use connection::{Database, DbError, DbResult};
pub use store::{NutritionStore, SqliteStore};
