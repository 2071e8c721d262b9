//! Product database operations

use shared::error::{AppError, ErrorCode};
use shared::models::product::{
    MediaFile, MediaKind, PricingUpdate, Product, ProductCreate, ProductPage, ProductStatus,
    ProductUpdate, ProductWithVariants,
};
use shared::models::variant::ProductVariant;
use shared::util::now_millis;
use sqlx::{PgPool, Postgres, Transaction};

use crate::catalog::{pricing, slug};
use crate::error::ServiceResult;

/// Split stored media references into image and video URL lists.
pub(crate) fn partition_media(media: &[MediaFile]) -> (Vec<String>, Vec<String>) {
    let mut images = Vec::new();
    let mut videos = Vec::new();
    for m in media {
        match m.kind {
            MediaKind::Image => images.push(m.path.clone()),
            MediaKind::Video => videos.push(m.path.clone()),
        }
    }
    (images, videos)
}

/// Slugify a product name with a fallback for names that normalize to nothing.
pub(crate) fn base_slug(name: &str) -> String {
    let s = slug::slugify(name);
    if s.is_empty() { "product".to_string() } else { s }
}

/// Allocate a unique product slug: the base form, or timestamp-suffixed
/// when the base is already taken.
async fn allocate_slug(tx: &mut Transaction<'_, Postgres>, name: &str) -> ServiceResult<String> {
    let base = base_slug(name);
    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1)")
            .bind(&base)
            .fetch_one(&mut **tx)
            .await?;
    Ok(if taken {
        slug::with_suffix(&base, now_millis())
    } else {
        base
    })
}

/// Load a product and verify vendor ownership.
///
/// Runs inside the caller's transaction so subsequent writes see the same
/// row. Ownership mismatch fails before any other read or write.
pub(crate) async fn fetch_owned(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    vendor_id: i64,
) -> ServiceResult<Product> {
    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;
    let product = product.ok_or(AppError::new(ErrorCode::ProductNotFound))?;
    if product.vendor_id != vendor_id {
        return Err(AppError::permission_denied("Product belongs to another vendor").into());
    }
    Ok(product)
}

/// Create a product together with its variants, all-or-nothing.
///
/// The slug is allocated under the suffix policy and every variant's
/// final_price is computed before insertion. Any failure (including a
/// duplicate SKU inside the batch) rolls the whole aggregate back.
pub async fn create_product_with_variants(
    pool: &PgPool,
    vendor_id: i64,
    data: &ProductCreate,
) -> ServiceResult<ProductWithVariants> {
    let now = now_millis();
    let status = data
        .status
        .as_deref()
        .unwrap_or(ProductStatus::Draft.as_str());
    let (images, videos) = partition_media(&data.media);
    let meta = data.meta.clone().unwrap_or_else(|| serde_json::json!({}));
    let final_price = pricing::final_price(data.base_price, data.discount_percent);

    let mut tx = pool.begin().await?;

    let slug = allocate_slug(&mut tx, &data.name).await?;

    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (
            vendor_id, name, slug, short_description, description,
            base_price, mrp, discount_percent, final_price,
            category_id, sub_category_id, stock, status, is_active,
            image_urls, video_urls, meta, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14, $15, $16, $17, $17)
        RETURNING *
        "#,
    )
    .bind(vendor_id)
    .bind(data.name.trim())
    .bind(&slug)
    .bind(&data.short_description)
    .bind(&data.description)
    .bind(data.base_price)
    .bind(data.mrp)
    .bind(data.discount_percent.unwrap_or(0.0))
    .bind(final_price)
    .bind(data.category_id)
    .bind(data.sub_category_id)
    .bind(data.stock.unwrap_or(0))
    .bind(status)
    .bind(&images)
    .bind(&videos)
    .bind(&meta)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let mut variants = Vec::with_capacity(data.variants.len());
    for input in &data.variants {
        variants.push(super::variant::insert_variant(&mut tx, product.id, input, now).await?);
    }

    tx.commit().await?;
    Ok(ProductWithVariants { product, variants })
}

/// Partial update of an owned product.
///
/// Renames re-derive the slug under the suffix policy; final_price is
/// recomputed when base_price or discount_percent is present.
pub async fn update_product(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
    data: &ProductUpdate,
) -> ServiceResult<Product> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let current = fetch_owned(&mut tx, product_id, vendor_id).await?;

    let slug = match &data.name {
        Some(name) => {
            let base = base_slug(name);
            if base == current.slug {
                None
            } else {
                let taken: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM products WHERE slug = $1 AND id <> $2)",
                )
                .bind(&base)
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
                Some(if taken {
                    slug::with_suffix(&base, now)
                } else {
                    base
                })
            }
        }
        None => None,
    };

    let final_price = if data.base_price.is_some() || data.discount_percent.is_some() {
        let bp = data.base_price.unwrap_or(current.base_price);
        let dp = data.discount_percent.unwrap_or(current.discount_percent);
        Some(pricing::final_price(bp, Some(dp)))
    } else {
        None
    };

    let (new_images, new_videos) = partition_media(&data.media);

    let product: Product = sqlx::query_as(
        r#"
        UPDATE products SET
            name = COALESCE($1, name),
            slug = COALESCE($2, slug),
            short_description = COALESCE($3, short_description),
            description = COALESCE($4, description),
            base_price = COALESCE($5, base_price),
            mrp = COALESCE($6, mrp),
            discount_percent = COALESCE($7, discount_percent),
            final_price = COALESCE($8, final_price),
            category_id = COALESCE($9, category_id),
            sub_category_id = COALESCE($10, sub_category_id),
            status = COALESCE($11, status),
            meta = COALESCE($12, meta),
            is_active = COALESCE($13, is_active),
            image_urls = image_urls || $14,
            video_urls = video_urls || $15,
            updated_at = $16
        WHERE id = $17
        RETURNING *
        "#,
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&slug)
    .bind(&data.short_description)
    .bind(&data.description)
    .bind(data.base_price)
    .bind(data.mrp)
    .bind(data.discount_percent)
    .bind(final_price)
    .bind(data.category_id)
    .bind(data.sub_category_id)
    .bind(&data.status)
    .bind(&data.meta)
    .bind(data.is_active)
    .bind(&new_images)
    .bind(&new_videos)
    .bind(now)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(product)
}

/// Delete an owned product: soft by default (is_active=false,
/// status=inactive), hard on `force` (variants cascade).
pub async fn delete_product(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
    force: bool,
) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    fetch_owned(&mut tx, product_id, vendor_id).await?;

    if force {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "UPDATE products SET is_active = FALSE, status = 'inactive', updated_at = $2 WHERE id = $1",
        )
        .bind(product_id)
        .bind(now_millis())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Read an owned product together with its variants.
pub async fn get_with_variants(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
) -> ServiceResult<ProductWithVariants> {
    let mut tx = pool.begin().await?;
    let product = fetch_owned(&mut tx, product_id, vendor_id).await?;
    let variants: Vec<ProductVariant> =
        sqlx::query_as("SELECT * FROM product_variants WHERE product_id = $1 ORDER BY id")
            .bind(product_id)
            .fetch_all(&mut *tx)
            .await?;
    tx.commit().await?;
    Ok(ProductWithVariants { product, variants })
}

/// Paginated vendor product listing with search and filters.
pub async fn list_products(
    pool: &PgPool,
    vendor_id: i64,
    q: Option<&str>,
    status: Option<&str>,
    category_id: Option<i64>,
    page: i64,
    limit: i64,
) -> ServiceResult<ProductPage> {
    let pattern = q.map(|s| format!("%{s}%"));
    let offset = (page - 1) * limit;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM products
        WHERE vendor_id = $1
          AND ($2::text IS NULL OR status = $2)
          AND ($3::bigint IS NULL OR category_id = $3)
          AND ($4::text IS NULL OR name ILIKE $4 OR short_description ILIKE $4 OR description ILIKE $4)
        "#,
    )
    .bind(vendor_id)
    .bind(status)
    .bind(category_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let products: Vec<Product> = sqlx::query_as(
        r#"
        SELECT * FROM products
        WHERE vendor_id = $1
          AND ($2::text IS NULL OR status = $2)
          AND ($3::bigint IS NULL OR category_id = $3)
          AND ($4::text IS NULL OR name ILIKE $4 OR short_description ILIKE $4 OR description ILIKE $4)
        ORDER BY updated_at DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(vendor_id)
    .bind(status)
    .bind(category_id)
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(ProductPage {
        total,
        page,
        limit,
        products,
    })
}

/// Pricing update target: the product itself or one of its variants.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum PricingTarget {
    Product(Product),
    Variant(ProductVariant),
}

/// Apply a partial pricing update to a product or one of its variants,
/// recomputing final_price from the effective (new-or-current) values.
pub async fn set_pricing(
    pool: &PgPool,
    vendor_id: i64,
    product_id: i64,
    data: &PricingUpdate,
) -> ServiceResult<PricingTarget> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let product = fetch_owned(&mut tx, product_id, vendor_id).await?;

    let target = match data.variant_id {
        Some(variant_id) => {
            let variant: Option<ProductVariant> = sqlx::query_as(
                "SELECT * FROM product_variants WHERE id = $1 AND product_id = $2",
            )
            .bind(variant_id)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
            let variant = variant.ok_or(AppError::new(ErrorCode::VariantNotFound))?;

            let price = data.base_price.unwrap_or(variant.price);
            let discount = data.discount_percent.unwrap_or(variant.discount_percent);
            let final_price = pricing::final_price(price, Some(discount));

            let updated: ProductVariant = sqlx::query_as(
                r#"
                UPDATE product_variants SET
                    price = $1, mrp = COALESCE($2, mrp), discount_percent = $3,
                    final_price = $4, updated_at = $5
                WHERE id = $6
                RETURNING *
                "#,
            )
            .bind(price)
            .bind(data.mrp)
            .bind(discount)
            .bind(final_price)
            .bind(now)
            .bind(variant_id)
            .fetch_one(&mut *tx)
            .await?;
            PricingTarget::Variant(updated)
        }
        None => {
            let price = data.base_price.unwrap_or(product.base_price);
            let discount = data.discount_percent.unwrap_or(product.discount_percent);
            let final_price = pricing::final_price(price, Some(discount));

            let updated: Product = sqlx::query_as(
                r#"
                UPDATE products SET
                    base_price = $1, mrp = COALESCE($2, mrp), discount_percent = $3,
                    final_price = $4, updated_at = $5
                WHERE id = $6
                RETURNING *
                "#,
            )
            .bind(price)
            .bind(data.mrp)
            .bind(discount)
            .bind(final_price)
            .bind(now)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;
            PricingTarget::Product(updated)
        }
    };

    tx.commit().await?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_media() {
        let media = vec![
            MediaFile {
                path: "/uploads/products/a.jpg".into(),
                kind: MediaKind::Image,
            },
            MediaFile {
                path: "/uploads/products/clip.mp4".into(),
                kind: MediaKind::Video,
            },
            MediaFile {
                path: "/uploads/products/b.png".into(),
                kind: MediaKind::Image,
            },
        ];
        let (images, videos) = partition_media(&media);
        assert_eq!(images, vec!["/uploads/products/a.jpg", "/uploads/products/b.png"]);
        assert_eq!(videos, vec!["/uploads/products/clip.mp4"]);
    }

    #[test]
    fn test_partition_media_empty() {
        let (images, videos) = partition_media(&[]);
        assert!(images.is_empty());
        assert!(videos.is_empty());
    }

    #[test]
    fn test_base_slug_fallback() {
        assert_eq!(base_slug("Wireless Mouse"), "wireless-mouse");
        assert_eq!(base_slug("!!!"), "product");
    }
}
