//! Service layer: multi-step operations above the db modules

pub mod import;
pub mod verification;
