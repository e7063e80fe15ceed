//! # Postgres
//!
//! Database connection pooling for the Plan A backend.

/// Connection pool creation and connectivity checks
pub mod database;
