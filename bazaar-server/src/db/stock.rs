//! Stock ledger database operations
//!
//! Adjustments use a conditional UPDATE ("subtract where stock >= qty") so
//! the non-negative invariant holds even under concurrent requests; a
//! zero-row result means insufficient stock and nothing was written.

use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, Transaction};

use crate::catalog::stock::{StockDirection, next_stock};
use crate::error::ServiceResult;

/// Adjust the stock counter of an owned product, or of one of its
/// variants when `variant_id` is given. Exactly one target per call.
/// Returns the new stock level.
pub async fn adjust_stock(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
    variant_id: Option<i64>,
    direction: StockDirection,
    qty: i32,
) -> ServiceResult<i32> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    // Ownership check precedes any stock read
    let product = super::product::fetch_owned(&mut tx, product_id, vendor_id).await?;

    let new_stock = match variant_id {
        Some(variant_id) => {
            let current: Option<i32> =
                sqlx::query_scalar("SELECT stock FROM product_variants WHERE id = $1 AND product_id = $2")
                    .bind(variant_id)
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let current = current.ok_or(AppError::new(ErrorCode::VariantNotFound))?;
            adjust_variant_row(&mut tx, variant_id, current, direction, qty, now).await?
        }
        None => adjust_product_row(&mut tx, product_id, product.stock, direction, qty, now).await?,
    };

    tx.commit().await?;
    Ok(new_stock)
}

async fn adjust_product_row(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    current: i32,
    direction: StockDirection,
    qty: i32,
    now: i64,
) -> ServiceResult<i32> {
    // Arithmetic guard first: the rejected case never touches the row
    next_stock(current, direction, qty)?;

    let sql = match direction {
        StockDirection::In => {
            "UPDATE products SET stock = stock + $1, updated_at = $2 WHERE id = $3 RETURNING stock"
        }
        StockDirection::Out => {
            "UPDATE products SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $1 RETURNING stock"
        }
    };
    let updated: Option<i32> = sqlx::query_scalar(sql)
        .bind(qty)
        .bind(now)
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;
    updated.ok_or_else(|| AppError::insufficient_stock(current, qty).into())
}

async fn adjust_variant_row(
    tx: &mut Transaction<'_, Postgres>,
    variant_id: i64,
    current: i32,
    direction: StockDirection,
    qty: i32,
    now: i64,
) -> ServiceResult<i32> {
    next_stock(current, direction, qty)?;

    let sql = match direction {
        StockDirection::In => {
            "UPDATE product_variants SET stock = stock + $1, updated_at = $2 WHERE id = $3 RETURNING stock"
        }
        StockDirection::Out => {
            "UPDATE product_variants SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $1 RETURNING stock"
        }
    };
    let updated: Option<i32> = sqlx::query_scalar(sql)
        .bind(qty)
        .bind(now)
        .bind(variant_id)
        .fetch_optional(&mut **tx)
        .await?;
    updated.ok_or_else(|| AppError::insufficient_stock(current, qty).into())
}
