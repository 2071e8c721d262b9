//! Category database operations

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::category::{Category, CategoryCreate, CategoryUpdate, CategoryWithSubs, SubCategory};
use shared::util::now_millis;
use sqlx::PgPool;

use crate::catalog::slug;
use crate::error::ServiceResult;

use super::is_unique_violation;

/// Case-insensitive lookup by display name.
pub async fn find_by_name_ci(pool: &PgPool, name: &str) -> ServiceResult<Option<Category>> {
    let category: Option<Category> =
        sqlx::query_as("SELECT * FROM categories WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(category)
}

/// Create a category. Names are globally unique: a collision fails with a
/// Conflict, with the unique constraint as the final arbiter under
/// concurrent creation.
pub async fn create_category(pool: &PgPool, data: &CategoryCreate) -> ServiceResult<Category> {
    let name = data.name.trim();
    let slug = slug::slugify(name);

    if find_by_name_ci(pool, name).await?.is_some() {
        return Err(AppError::with_message(
            ErrorCode::CategoryNameExists,
            format!("Category {name} already exists"),
        )
        .into());
    }

    let result = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (
            name, slug, description, image_url,
            meta_title, meta_description, meta_keywords,
            is_active, display_order, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(&slug)
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(&data.meta_keywords)
    .bind(data.display_order.unwrap_or(0))
    .bind(now_millis())
    .fetch_one(pool)
    .await;

    match result {
        Ok(category) => Ok(category),
        Err(e) if is_unique_violation(&e) => Err(AppError::with_message(
            ErrorCode::CategoryNameExists,
            format!("Category {name} already exists"),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve or create a category by name for import runs.
///
/// Lookup is case-insensitive; creation races are arbitrated by the unique
/// constraint (the loser re-reads the winner's row). Returns the category
/// and whether this call created it.
pub async fn get_or_create(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    image_url: Option<&str>,
) -> ServiceResult<(Category, bool)> {
    if let Some(existing) = find_by_name_ci(pool, name).await? {
        return Ok((existing, false));
    }

    let result = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, slug, description, image_url, is_active, display_order, created_at)
        VALUES ($1, $2, $3, $4, TRUE, 0, $5)
        ON CONFLICT (name) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(name.trim())
    .bind(slug::slugify(name))
    .bind(description)
    .bind(image_url)
    .bind(now_millis())
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(category)) => Ok((category, true)),
        // Conflict on name (DO NOTHING) or on slug: reuse the existing row
        Ok(None) => reread_after_conflict(pool, name).await,
        Err(e) if is_unique_violation(&e) => reread_after_conflict(pool, name).await,
        Err(e) => Err(e.into()),
    }
}

async fn reread_after_conflict(pool: &PgPool, name: &str) -> ServiceResult<(Category, bool)> {
    find_by_name_ci(pool, name)
        .await?
        .map(|c| (c, false))
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CategoryNameExists,
                format!("Category {name} conflicts with an existing slug"),
            )
            .into()
        })
}

/// List all categories with their sub-categories, ordered for display.
pub async fn list_with_subs(pool: &PgPool) -> ServiceResult<Vec<CategoryWithSubs>> {
    let categories: Vec<Category> =
        sqlx::query_as("SELECT * FROM categories ORDER BY display_order, id")
            .fetch_all(pool)
            .await?;
    if categories.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
    let subs: Vec<SubCategory> = sqlx::query_as(
        "SELECT * FROM sub_categories WHERE category_id = ANY($1) ORDER BY display_order, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut sub_map: HashMap<i64, Vec<SubCategory>> = HashMap::new();
    for s in subs {
        sub_map.entry(s.category_id).or_default().push(s);
    }

    Ok(categories
        .into_iter()
        .map(|c| CategoryWithSubs {
            subcategories: sub_map.remove(&c.id).unwrap_or_default(),
            category: c,
        })
        .collect())
}

/// Partial update of a category.
pub async fn update_category(
    pool: &PgPool,
    category_id: i64,
    data: &CategoryUpdate,
) -> ServiceResult<Category> {
    let updated: Option<Category> = sqlx::query_as(
        r#"
        UPDATE categories SET
            description = COALESCE($1, description),
            image_url = COALESCE($2, image_url),
            meta_title = COALESCE($3, meta_title),
            meta_description = COALESCE($4, meta_description),
            meta_keywords = COALESCE($5, meta_keywords),
            is_active = COALESCE($6, is_active),
            display_order = COALESCE($7, display_order)
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(&data.meta_keywords)
    .bind(data.is_active)
    .bind(data.display_order)
    .bind(category_id)
    .fetch_optional(pool)
    .await?;

    updated.ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound).into())
}

/// Delete a category; sub-categories cascade.
pub async fn delete_category(pool: &PgPool, category_id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }
    Ok(())
}
