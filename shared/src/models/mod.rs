//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL).

pub mod category;
pub mod import;
pub mod product;
pub mod variant;

// Re-exports
pub use category::*;
pub use import::*;
pub use product::*;
pub use variant::*;
