//! SQLite snapshot store.
//!
//! This module provides:
//! - Database initialization and migrations
//! - The repository holding exchange snapshots and computed asset records

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
