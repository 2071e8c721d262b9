//! Category and sub-category models

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    /// Globally unique display name
    pub name: String,
    /// Globally unique URL identifier
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub display_order: Option<i32>,
}

/// Update category payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

/// Sub-category entity, scoped to a parent category
///
/// Names are unique per parent; slugs are globally unique. Deleting the
/// parent category cascades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SubCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub created_at: i64,
}

/// Create sub-category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
}

/// Category with its sub-categories (listing reads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithSubs {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<SubCategory>,
}
