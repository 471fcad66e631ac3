//! # FinAgent Database Crate
//!
//! This crate is the optional PostgreSQL cache for downloaded price history.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application sees a
//!   `DataSource` and never learns whether the bars came from the store.
//! - **Read-through:** `CachedDataSource` answers from the store when the same
//!   range was fetched recently and otherwise asks the wrapped source, storing
//!   what it gets back.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   connection pool (`PgPool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `DbRepository`: Holds the pool and implements `SeriesStore`.
//! - `CachedDataSource`: The caching `DataSource` decorator.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod cache;
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use cache::{CachedDataSource, SeriesStore};
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
