//! SQLite storage implementation for BistPulse.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the storage traits defined in
//! `bistpulse-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The price history repository and the snapshot repository
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist; everything above it works with the core traits.

pub mod db;
pub mod errors;
pub mod schema;

pub mod history;
pub mod snapshots;

pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use errors::{IntoCore, StorageError};
pub use history::PriceHistoryRepository;
pub use snapshots::SnapshotRepository;

// Re-export from bistpulse-core for convenience
pub use bistpulse_core::errors::{DatabaseError, Error, Result};
