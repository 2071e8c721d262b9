//! Sub-category database operations
//!
//! Sub-categories are scoped to a parent category: names are unique per
//! parent, slugs are globally unique. Same-name sub-categories under
//! different parents get a parent-id slug suffix so both can exist.

use shared::error::{AppError, ErrorCode};
use shared::models::category::{SubCategory, SubCategoryCreate};
use shared::util::now_millis;
use sqlx::PgPool;

use crate::catalog::slug;
use crate::error::ServiceResult;

use super::is_unique_violation;

async fn parent_exists(pool: &PgPool, category_id: i64) -> ServiceResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }
    Ok(())
}

/// Case-insensitive lookup scoped to a parent category.
pub async fn find_by_name_ci(
    pool: &PgPool,
    category_id: i64,
    name: &str,
) -> ServiceResult<Option<SubCategory>> {
    let sub: Option<SubCategory> = sqlx::query_as(
        "SELECT * FROM sub_categories WHERE category_id = $1 AND LOWER(name) = LOWER($2)",
    )
    .bind(category_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(sub)
}

/// Create a sub-category under a parent category.
pub async fn create_sub_category(
    pool: &PgPool,
    category_id: i64,
    data: &SubCategoryCreate,
) -> ServiceResult<SubCategory> {
    parent_exists(pool, category_id).await?;

    let name = data.name.trim();
    if find_by_name_ci(pool, category_id, name).await?.is_some() {
        return Err(AppError::with_message(
            ErrorCode::SubCategoryNameExists,
            format!("SubCategory {name} already exists in this category"),
        )
        .into());
    }

    let base = slug::slugify(name);
    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sub_categories WHERE slug = $1)")
            .bind(&base)
            .fetch_one(pool)
            .await?;
    let slug = if taken {
        format!("{base}-{category_id}")
    } else {
        base
    };

    let result = sqlx::query_as::<_, SubCategory>(
        r#"
        INSERT INTO sub_categories (category_id, name, slug, description, image_url, display_order, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(category_id)
    .bind(name)
    .bind(&slug)
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(data.display_order.unwrap_or(0))
    .bind(now_millis())
    .fetch_one(pool)
    .await;

    match result {
        Ok(sub) => Ok(sub),
        Err(e) if is_unique_violation(&e) => Err(AppError::with_message(
            ErrorCode::SubCategoryNameExists,
            format!("SubCategory {name} already exists"),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve or create a sub-category under a parent for import runs.
/// Returns the sub-category and whether this call created it.
pub async fn get_or_create(
    pool: &PgPool,
    category_id: i64,
    name: &str,
    description: Option<&str>,
    image_url: Option<&str>,
) -> ServiceResult<(SubCategory, bool)> {
    if let Some(existing) = find_by_name_ci(pool, category_id, name).await? {
        return Ok((existing, false));
    }
    let created = create_sub_category(
        pool,
        category_id,
        &SubCategoryCreate {
            name: name.to_string(),
            description: description.map(str::to_string),
            image_url: image_url.map(str::to_string),
            display_order: None,
        },
    )
    .await?;
    Ok((created, true))
}

/// List sub-categories of a parent category.
pub async fn list_sub_categories(
    pool: &PgPool,
    category_id: i64,
) -> ServiceResult<Vec<SubCategory>> {
    parent_exists(pool, category_id).await?;
    let subs: Vec<SubCategory> = sqlx::query_as(
        "SELECT * FROM sub_categories WHERE category_id = $1 ORDER BY display_order, id",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(subs)
}

/// Partial update of a sub-category.
pub async fn update_sub_category(
    pool: &PgPool,
    sub_category_id: i64,
    description: Option<&str>,
    image_url: Option<&str>,
    display_order: Option<i32>,
) -> ServiceResult<SubCategory> {
    let updated: Option<SubCategory> = sqlx::query_as(
        r#"
        UPDATE sub_categories SET
            description = COALESCE($1, description),
            image_url = COALESCE($2, image_url),
            display_order = COALESCE($3, display_order)
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(description)
    .bind(image_url)
    .bind(display_order)
    .bind(sub_category_id)
    .fetch_optional(pool)
    .await?;

    updated.ok_or_else(|| AppError::new(ErrorCode::SubCategoryNotFound).into())
}

/// Delete a sub-category.
pub async fn delete_sub_category(pool: &PgPool, sub_category_id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM sub_categories WHERE id = $1")
        .bind(sub_category_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::SubCategoryNotFound).into());
    }
    Ok(())
}
