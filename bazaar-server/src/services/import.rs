//! Catalog import pipeline
//!
//! Best-effort bulk ingestion from uploaded CSV/XLSX files. Rows are
//! processed sequentially and each row commits independently: a malformed
//! row is recorded in the report and never aborts the batch. Duplicate
//! products (same name/slug) and duplicate categories (case-insensitive
//! name) are skipped, not re-created. The transient source file is deleted
//! when the run completes.

use std::collections::HashMap;
use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use shared::error::{AppError, ErrorCode};
use shared::models::import::ImportReport;
use shared::models::variant::VariantInput;
use shared::util::now_millis;
use sqlx::PgPool;

use crate::catalog::pricing;
use crate::db;
use crate::error::{ServiceError, ServiceResult};

/// Source file format, detected from the uploaded file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Delimited text (csv crate)
    Csv,
    /// Spreadsheet workbook, first worksheet (calamine)
    Spreadsheet,
}

impl ImportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase()
            .as_str()
        {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// One source row: trimmed cell values keyed by lowercased header.
type RawRow = HashMap<String, String>;

fn cell(row: &RawRow, key: &str) -> Option<String> {
    row.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ── Parsing ──

fn read_rows(path: &Path, format: ImportFormat) -> Result<Vec<Result<RawRow, String>>, AppError> {
    match format {
        ImportFormat::Csv => read_csv_rows(path),
        ImportFormat::Spreadsheet => read_spreadsheet_rows(path),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Result<RawRow, String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::with_message(ErrorCode::ImportParseFailed, e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::with_message(ErrorCode::ImportParseFailed, e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let mut row = RawRow::new();
                for (i, field) in record.iter().enumerate() {
                    if let Some(header) = headers.get(i)
                        && !field.is_empty()
                    {
                        row.insert(header.clone(), field.to_string());
                    }
                }
                rows.push(Ok(row));
            }
            Err(e) => rows.push(Err(e.to_string())),
        }
    }
    Ok(rows)
}

fn read_spreadsheet_rows(path: &Path) -> Result<Vec<Result<RawRow, String>>, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::with_message(ErrorCode::ImportParseFailed, e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::with_message(ErrorCode::EmptyFile, "workbook has no sheets"))?
        .map_err(|e| AppError::with_message(ErrorCode::ImportParseFailed, e.to_string()))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| c.to_string().trim().to_lowercase())
            .collect(),
        None => return Ok(vec![]),
    };

    let mut rows = Vec::new();
    for source_row in row_iter {
        let mut row = RawRow::new();
        for (i, value) in source_row.iter().enumerate() {
            let value = value.to_string().trim().to_string();
            if let Some(header) = headers.get(i)
                && !value.is_empty()
            {
                row.insert(header.clone(), value);
            }
        }
        rows.push(Ok(row));
    }
    Ok(rows)
}

// ── Product rows ──

/// Validated fields of a product import row.
#[derive(Debug, Clone)]
pub(crate) struct ProductRow {
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub base_price: f64,
    pub mrp: Option<f64>,
    pub discount_percent: Option<f64>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub sku: Option<String>,
    pub stock: Option<i32>,
}

fn parse_optional_f64(row: &RawRow, key: &str) -> Result<Option<f64>, String> {
    match cell(row, key) {
        Some(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("{key} is not a number")),
        None => Ok(None),
    }
}

/// Minimal validation: a name and a positive base price are required,
/// everything else is optional.
pub(crate) fn parse_product_row(row: &RawRow) -> Result<ProductRow, String> {
    let name = cell(row, "name").ok_or("name is required")?;
    let base_price = cell(row, "base_price")
        .ok_or("a positive base_price is required")?
        .parse::<f64>()
        .map_err(|_| "base_price is not a number".to_string())?;
    if base_price <= 0.0 {
        return Err("a positive base_price is required".to_string());
    }

    let discount_percent = parse_optional_f64(row, "discount_percent")?;
    if let Some(d) = discount_percent
        && !(0.0..=100.0).contains(&d)
    {
        return Err("discount_percent must be within 0-100".to_string());
    }

    let stock = match cell(row, "stock") {
        Some(v) => {
            let s = v
                .parse::<i32>()
                .map_err(|_| "stock is not an integer".to_string())?;
            if s < 0 {
                return Err("stock must not be negative".to_string());
            }
            Some(s)
        }
        None => None,
    };

    Ok(ProductRow {
        name,
        short_description: cell(row, "short_description"),
        description: cell(row, "description"),
        base_price,
        mrp: parse_optional_f64(row, "mrp")?,
        discount_percent,
        category: cell(row, "category"),
        sub_category: cell(row, "subcategory"),
        sku: cell(row, "sku"),
        stock,
    })
}

/// In-run resolution caches so one import never creates the same
/// category/sub-category twice.
#[derive(Default)]
struct ResolveCache {
    categories: HashMap<String, i64>,
    sub_categories: HashMap<(i64, String), i64>,
}

enum RowOutcome {
    Imported,
    /// A product with the same name/slug already exists
    Duplicate,
}

async fn import_one_product(
    pool: &PgPool,
    vendor_id: i64,
    row: &ProductRow,
    cache: &mut ResolveCache,
) -> ServiceResult<RowOutcome> {
    // ResolveCategory: case-insensitive by name, created when missing
    let category_id = match &row.category {
        Some(name) => {
            let key = name.to_lowercase();
            let id = match cache.categories.get(&key) {
                Some(id) => *id,
                None => {
                    let (category, _created) =
                        db::category::get_or_create(pool, name, None, None).await?;
                    cache.categories.insert(key, category.id);
                    category.id
                }
            };
            Some(id)
        }
        None => None,
    };

    // ResolveSubCategory: scoped to (name, parent category)
    let sub_category_id = match (&row.sub_category, category_id) {
        (Some(name), Some(category_id)) => {
            let key = (category_id, name.to_lowercase());
            let id = match cache.sub_categories.get(&key) {
                Some(id) => *id,
                None => {
                    let (sub, _created) =
                        db::sub_category::get_or_create(pool, category_id, name, None, None)
                            .await?;
                    cache.sub_categories.insert(key, sub.id);
                    sub.id
                }
            };
            Some(id)
        }
        _ => None,
    };

    // Duplicate-skip: an unchanged name/slug pair never creates a second row
    let base_slug = db::product::base_slug(&row.name);
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
            .bind(&base_slug)
            .fetch_one(pool)
            .await?;
    if exists {
        return Ok(RowOutcome::Duplicate);
    }

    let now = now_millis();
    let final_price = pricing::final_price(row.base_price, row.discount_percent);

    let mut tx = pool.begin().await?;
    let product_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO products (
            vendor_id, name, slug, short_description, description,
            base_price, mrp, discount_percent, final_price,
            category_id, sub_category_id, stock, status, is_active,
            image_urls, video_urls, meta, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 'draft', TRUE, '{}', '{}', '{}', $12, $12)
        RETURNING id
        "#,
    )
    .bind(vendor_id)
    .bind(&row.name)
    .bind(&base_slug)
    .bind(&row.short_description)
    .bind(&row.description)
    .bind(row.base_price)
    .bind(row.mrp)
    .bind(row.discount_percent.unwrap_or(0.0))
    .bind(final_price)
    .bind(category_id)
    .bind(sub_category_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    // A row carrying sku/stock also gets one default variant mirroring the
    // product's pricing
    if row.sku.is_some() || row.stock.is_some() {
        let input = VariantInput {
            id: None,
            sku: row
                .sku
                .clone()
                .unwrap_or_else(|| format!("{base_slug}-default")),
            attributes: None,
            price: row.base_price,
            mrp: row.mrp,
            discount_percent: row.discount_percent,
            stock: row.stock,
            is_active: None,
        };
        db::variant::insert_variant(&mut tx, product_id, &input, now).await?;
    }

    tx.commit().await?;
    Ok(RowOutcome::Imported)
}

/// Bulk product import: Parse → ResolveCategory → ResolveSubCategory →
/// UpsertProduct, commit per row.
pub async fn import_products(
    pool: &PgPool,
    vendor_id: i64,
    path: &Path,
) -> ServiceResult<ImportReport> {
    let format =
        ImportFormat::from_path(path).ok_or(AppError::new(ErrorCode::UnsupportedFileFormat))?;
    let rows = read_rows(path, format)?;

    let mut report = ImportReport {
        total: rows.len(),
        ..Default::default()
    };
    let mut cache = ResolveCache::default();

    for (idx, row) in rows.into_iter().enumerate() {
        let row_no = idx + 1;
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                report.record_error(row_no, e);
                continue;
            }
        };
        let parsed = match parse_product_row(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.record_error(row_no, e);
                continue;
            }
        };
        match import_one_product(pool, vendor_id, &parsed, &mut cache).await {
            Ok(RowOutcome::Imported) => report.imported += 1,
            Ok(RowOutcome::Duplicate) => report.skipped += 1,
            Err(ServiceError::App(e)) => report.record_error(row_no, e.message),
            // Infrastructure failures abort the run
            Err(e) => return Err(e),
        }
    }

    remove_source_file(path).await;
    Ok(report)
}

// ── Category rows ──

/// Validated fields of a category import row.
#[derive(Debug, Clone)]
pub(crate) struct CategoryRow {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sub_name: Option<String>,
    pub sub_description: Option<String>,
    pub sub_image_url: Option<String>,
}

pub(crate) fn parse_category_row(row: &RawRow) -> Result<CategoryRow, String> {
    let name = cell(row, "categoryname")
        .or_else(|| cell(row, "name"))
        .ok_or("category name is required")?;
    Ok(CategoryRow {
        name,
        description: cell(row, "categorydesc").or_else(|| cell(row, "description")),
        image_url: cell(row, "image").or_else(|| cell(row, "image_url")),
        sub_name: cell(row, "subcategoryname"),
        sub_description: cell(row, "subcategorydesc"),
        sub_image_url: cell(row, "subcategoryimage"),
    })
}

/// Bulk category/sub-category import. A row creating its category counts
/// as imported; a row whose category already exists counts as skipped.
/// Sub-categories are resolved scoped to the parent either way.
pub async fn import_categories(pool: &PgPool, path: &Path) -> ServiceResult<ImportReport> {
    let format =
        ImportFormat::from_path(path).ok_or(AppError::new(ErrorCode::UnsupportedFileFormat))?;
    let rows = read_rows(path, format)?;

    let mut report = ImportReport {
        total: rows.len(),
        ..Default::default()
    };
    let mut cache = ResolveCache::default();

    for (idx, row) in rows.into_iter().enumerate() {
        let row_no = idx + 1;
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                report.record_error(row_no, e);
                continue;
            }
        };
        let parsed = match parse_category_row(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.record_error(row_no, e);
                continue;
            }
        };

        let outcome = import_one_category(pool, &parsed, &mut cache).await;
        match outcome {
            Ok(true) => report.imported += 1,
            Ok(false) => report.skipped += 1,
            Err(ServiceError::App(e)) => report.record_error(row_no, e.message),
            Err(e) => return Err(e),
        }
    }

    remove_source_file(path).await;
    Ok(report)
}

async fn import_one_category(
    pool: &PgPool,
    row: &CategoryRow,
    cache: &mut ResolveCache,
) -> ServiceResult<bool> {
    let key = row.name.to_lowercase();
    let (category_id, created) = match cache.categories.get(&key) {
        Some(id) => (*id, false),
        None => {
            let (category, created) = db::category::get_or_create(
                pool,
                &row.name,
                row.description.as_deref(),
                row.image_url.as_deref(),
            )
            .await?;
            cache.categories.insert(key, category.id);
            (category.id, created)
        }
    };

    if let Some(sub_name) = &row.sub_name {
        let sub_key = (category_id, sub_name.to_lowercase());
        if !cache.sub_categories.contains_key(&sub_key) {
            let (sub, _created) = db::sub_category::get_or_create(
                pool,
                category_id,
                sub_name,
                row.sub_description.as_deref(),
                row.sub_image_url.as_deref(),
            )
            .await?;
            cache.sub_categories.insert(sub_key, sub.id);
        }
    }

    Ok(created)
}

/// Delete the transient uploaded source file; the pipeline owns it once
/// the run starts.
async fn remove_source_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to delete import file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImportFormat::from_path(Path::new("upload/products.csv")),
            Some(ImportFormat::Csv)
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("upload/catalog.XLSX")),
            Some(ImportFormat::Spreadsheet)
        );
        assert_eq!(ImportFormat::from_path(Path::new("upload/readme.pdf")), None);
        assert_eq!(ImportFormat::from_path(Path::new("noextension")), None);
    }

    #[test]
    fn test_parse_product_row_minimal() {
        let parsed = parse_product_row(&row(&[("name", "Mouse"), ("base_price", "19.99")])).unwrap();
        assert_eq!(parsed.name, "Mouse");
        assert_eq!(parsed.base_price, 19.99);
        assert!(parsed.discount_percent.is_none());
        assert!(parsed.sku.is_none());
    }

    #[test]
    fn test_parse_product_row_missing_name() {
        let err = parse_product_row(&row(&[("base_price", "10")])).unwrap_err();
        assert_eq!(err, "name is required");
    }

    #[test]
    fn test_parse_product_row_missing_or_invalid_price() {
        let err = parse_product_row(&row(&[("name", "Mouse")])).unwrap_err();
        assert_eq!(err, "a positive base_price is required");

        let err = parse_product_row(&row(&[("name", "Mouse"), ("base_price", "0")])).unwrap_err();
        assert_eq!(err, "a positive base_price is required");

        let err = parse_product_row(&row(&[("name", "Mouse"), ("base_price", "cheap")])).unwrap_err();
        assert_eq!(err, "base_price is not a number");
    }

    #[test]
    fn test_parse_product_row_discount_range() {
        let err = parse_product_row(&row(&[
            ("name", "Mouse"),
            ("base_price", "10"),
            ("discount_percent", "120"),
        ]))
        .unwrap_err();
        assert_eq!(err, "discount_percent must be within 0-100");

        let parsed = parse_product_row(&row(&[
            ("name", "Mouse"),
            ("base_price", "10"),
            ("discount_percent", "15"),
        ]))
        .unwrap();
        assert_eq!(parsed.discount_percent, Some(15.0));
    }

    #[test]
    fn test_parse_product_row_negative_stock() {
        let err = parse_product_row(&row(&[
            ("name", "Mouse"),
            ("base_price", "10"),
            ("stock", "-1"),
        ]))
        .unwrap_err();
        assert_eq!(err, "stock must not be negative");
    }

    #[test]
    fn test_parse_category_row_column_aliases() {
        let parsed = parse_category_row(&row(&[
            ("categoryname", "Electronics"),
            ("subcategoryname", "Audio"),
        ]))
        .unwrap();
        assert_eq!(parsed.name, "Electronics");
        assert_eq!(parsed.sub_name.as_deref(), Some("Audio"));

        let parsed = parse_category_row(&row(&[("name", "Garden")])).unwrap();
        assert_eq!(parsed.name, "Garden");

        assert!(parse_category_row(&row(&[("description", "no name")])).is_err());
    }

    #[test]
    fn test_read_csv_rows() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "name,base_price,category").unwrap();
        writeln!(file, "Mouse,19.99,Electronics").unwrap();
        writeln!(file, "Keyboard,,Electronics").unwrap();
        file.flush().unwrap();

        let rows = read_csv_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.get("name").unwrap(), "Mouse");
        assert_eq!(first.get("base_price").unwrap(), "19.99");
        assert_eq!(first.get("category").unwrap(), "Electronics");

        // Empty cells are absent, so validation sees a missing base_price
        let second = rows[1].as_ref().unwrap();
        assert!(second.get("base_price").is_none());
        assert_eq!(
            parse_product_row(second).unwrap_err(),
            "a positive base_price is required"
        );
    }

    #[test]
    fn test_csv_row_validation_counts() {
        // Three rows: 1 and 3 valid and share a category, 2 lacks base_price
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "name,base_price,category").unwrap();
        writeln!(file, "Mouse,19.99,Electronics").unwrap();
        writeln!(file, "Keyboard,,Electronics").unwrap();
        writeln!(file, "Webcam,49.50,Electronics").unwrap();
        file.flush().unwrap();

        let rows = read_csv_rows(file.path()).unwrap();
        let mut report = ImportReport {
            total: rows.len(),
            ..Default::default()
        };
        let mut valid = Vec::new();
        for (idx, raw) in rows.iter().enumerate() {
            match raw
                .as_ref()
                .map_err(|e| e.clone())
                .and_then(|r| parse_product_row(r))
            {
                Ok(parsed) => valid.push(parsed),
                Err(e) => report.record_error(idx + 1, e),
            }
        }

        assert_eq!(report.total, 3);
        assert_eq!(valid.len(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 2);
        // Both valid rows resolve to the same category name
        assert_eq!(valid[0].category, valid[1].category);
    }
}
