//! Shared types for the Bazaar marketplace backend
//!
//! Common types used across crates: the unified error system, API response
//! envelope, data models, and small utilities.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL).

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
