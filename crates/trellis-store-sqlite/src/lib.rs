//! SQLite backend for the Trellis graph store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Referential integrity (cascade and
//! restrict rules, unique slugs, the edge-triple constraint) is enforced by
//! the schema; this crate classifies constraint violations into the core
//! error taxonomy rather than pre-checking them.

mod encode;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
