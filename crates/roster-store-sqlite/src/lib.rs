//! SQLite backend for the roster key-value storage.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements
//! [`roster_core::overlay::KeyValueStorage`], which is all the status overlay
//! needs.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStorage;
