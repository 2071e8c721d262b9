//! Database access layer
//!
//! One module per entity. Mutating functions run inside explicit
//! transactions; domain errors roll back before surfacing.

pub mod category;
pub mod product;
pub mod stock;
pub mod sub_category;
pub mod variant;

/// Postgres unique-violation SQLSTATE (23505). Used where a unique
/// constraint is the final arbiter for duplicate detection.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
