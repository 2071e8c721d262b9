//! Variant database operations

use shared::error::{AppError, ErrorCode};
use shared::models::variant::{ProductVariant, VariantInput};
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, Transaction};

use crate::catalog::pricing;
use crate::error::ServiceResult;

use super::is_unique_violation;

/// Insert a new variant row scoped to a product, with final_price computed
/// at creation time. Duplicate SKUs surface as a Conflict.
pub(crate) async fn insert_variant(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    input: &VariantInput,
    now: i64,
) -> ServiceResult<ProductVariant> {
    let final_price = pricing::final_price(input.price, input.discount_percent);
    let attributes = input
        .attributes
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));

    let result = sqlx::query_as::<_, ProductVariant>(
        r#"
        INSERT INTO product_variants (
            product_id, sku, attributes, price, mrp, discount_percent,
            final_price, stock, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING *
        "#,
    )
    .bind(product_id)
    .bind(&input.sku)
    .bind(&attributes)
    .bind(input.price)
    .bind(input.mrp)
    .bind(input.discount_percent.unwrap_or(0.0))
    .bind(final_price)
    .bind(input.stock.unwrap_or(0))
    .bind(input.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(variant) => Ok(variant),
        Err(e) if is_unique_violation(&e) => Err(AppError::with_message(
            ErrorCode::SkuExists,
            format!("SKU {} already exists", input.sku),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Create-or-update a variant of an owned product, in one transaction.
///
/// `input.id` present → the existing variant is loaded (must belong to the
/// product) and updated, with final_price recomputed from the effective
/// price/discount. `input.id` absent → a new variant is created.
pub async fn upsert_variant(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
    input: &VariantInput,
) -> ServiceResult<ProductVariant> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    super::product::fetch_owned(&mut tx, product_id, vendor_id).await?;

    let variant = match input.id {
        Some(variant_id) => {
            let existing: Option<ProductVariant> = sqlx::query_as(
                "SELECT * FROM product_variants WHERE id = $1 AND product_id = $2",
            )
            .bind(variant_id)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
            let existing = existing.ok_or(AppError::new(ErrorCode::VariantNotFound))?;

            let price = input.price;
            let discount = input.discount_percent.unwrap_or(existing.discount_percent);
            let final_price = pricing::final_price(price, Some(discount));
            let attributes = input
                .attributes
                .clone()
                .unwrap_or_else(|| existing.attributes.clone());

            let result = sqlx::query_as::<_, ProductVariant>(
                r#"
                UPDATE product_variants SET
                    sku = $1, attributes = $2, price = $3, mrp = COALESCE($4, mrp),
                    discount_percent = $5, final_price = $6,
                    stock = COALESCE($7, stock), is_active = COALESCE($8, is_active),
                    updated_at = $9
                WHERE id = $10
                RETURNING *
                "#,
            )
            .bind(&input.sku)
            .bind(&attributes)
            .bind(price)
            .bind(input.mrp)
            .bind(discount)
            .bind(final_price)
            .bind(input.stock)
            .bind(input.is_active)
            .bind(now)
            .bind(variant_id)
            .fetch_one(&mut *tx)
            .await;

            match result {
                Ok(v) => v,
                Err(e) if is_unique_violation(&e) => {
                    return Err(AppError::with_message(
                        ErrorCode::SkuExists,
                        format!("SKU {} already exists", input.sku),
                    )
                    .into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => insert_variant(&mut tx, product_id, input, now).await?,
    };

    tx.commit().await?;
    Ok(variant)
}
