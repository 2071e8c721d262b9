//! Bulk import result types

use serde::{Deserialize, Serialize};

/// One failed row from a bulk import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based data row number (header row excluded)
    pub row: usize,
    pub message: String,
}

/// Outcome of a bulk catalog import run.
///
/// Rows are processed independently; failures are collected here instead of
/// aborting the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Total data rows seen
    pub total: usize,
    /// Rows that created a product (or category, for category imports)
    pub imported: usize,
    /// Rows skipped: validation failures and duplicates
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    /// Record a row-level failure: counted as skipped with an error entry.
    pub fn record_error(&mut self, row: usize, message: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(ImportRowError {
            row,
            message: message.into(),
        });
    }
}
