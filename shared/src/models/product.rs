//! Product model

use serde::{Deserialize, Serialize};

use super::variant::VariantInput;

/// Product lifecycle status, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Inactive => "inactive",
        }
    }

    /// Parse from the stored text form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Kind of an uploaded media file, declared by the upload handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A stored media file reference attached to a product.
///
/// The multipart upload handler (external) stores the file and passes the
/// resulting path here together with the declared kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: String,
    pub kind: MediaKind,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub base_price: f64,
    pub mrp: Option<f64>,
    pub discount_percent: f64,
    /// Derived from base_price and discount_percent, never authoritative input
    pub final_price: f64,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    /// Own stock counter, used only when the product has no variants
    pub stock: i32,
    pub status: String,
    pub is_active: bool,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    /// Free-form metadata map; key validation is the caller's concern
    pub meta: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub base_price: f64,
    pub mrp: Option<f64>,
    pub discount_percent: Option<f64>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub status: Option<String>,
    pub stock: Option<i32>,
    pub meta: Option<serde_json::Value>,
    /// Stored media references from the upload handler
    #[serde(default)]
    pub media: Vec<MediaFile>,
    /// Variants created atomically with the product
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

/// Update product payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub mrp: Option<f64>,
    pub discount_percent: Option<f64>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub status: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    /// New media appended to the existing lists
    #[serde(default)]
    pub media: Vec<MediaFile>,
}

/// Partial pricing update for a product or one of its variants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingUpdate {
    pub variant_id: Option<i64>,
    pub base_price: Option<f64>,
    pub mrp: Option<f64>,
    pub discount_percent: Option<f64>,
}

/// Product together with its variants (detail/preview reads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<super::variant::ProductVariant>,
}

/// Paginated vendor product listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub products: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["draft", "published", "inactive"] {
            assert_eq!(ProductStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ProductStatus::parse("archived").is_none());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&ProductStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }

    #[test]
    fn test_media_kind_serde() {
        let media: MediaFile =
            serde_json::from_str(r#"{"path":"/uploads/products/a.jpg","kind":"image"}"#).unwrap();
        assert_eq!(media.kind, MediaKind::Image);
    }
}
