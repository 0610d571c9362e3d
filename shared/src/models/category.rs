//! Category Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductListItem;
use super::serde_helpers;

/// Category entity
///
/// `parent_id` forms a forest; the chain of parents never contains a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub company_id: Option<i64>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Category joined with its derived active-product count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryWithCount {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// Create category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCreate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent: Option<i64>,
    pub company: Option<i64>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Update category payload
///
/// `parent`/`company` distinguish "leave unchanged" (absent) from "clear" (`null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::double_option")]
    pub parent: Option<Option<i64>>,
    #[serde(default, deserialize_with = "serde_helpers::double_option")]
    pub company: Option<Option<i64>>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Category as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryListItem {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub product_count: i64,
    pub parent: Option<i64>,
}

/// One step of a breadcrumb trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub id: i64,
    pub name: String,
}

/// Category detail view
///
/// `product_count` covers direct products plus those of active direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent: Option<i64>,
    pub parent_name: Option<String>,
    pub company: Option<i64>,
    pub product_count: i64,
    pub children: Vec<CategoryListItem>,
    /// Root first, current category last
    pub breadcrumbs: Vec<Breadcrumb>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Response of `GET /categories/{id}/products`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryProducts {
    pub category: CategoryDetail,
    pub products: Vec<ProductListItem>,
    pub count: usize,
}

/// Price aggregate over a category's direct products
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceStats {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub avg: Option<Decimal>,
}

/// In-stock / out-of-stock split
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockSplit {
    pub in_stock: i64,
    pub out_of_stock: i64,
}

/// Response of `GET /categories/{id}/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category_id: i64,
    pub category_name: String,
    pub product_count: i64,
    pub subcategory_count: i64,
    pub price_stats: PriceStats,
    pub stock: StockSplit,
    pub brands: Vec<String>,
}

/// Category search suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySuggestion {
    pub id: i64,
    pub name: String,
    pub product_count: i64,
}

/// Per-company category count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CompanyCategoryCount {
    pub id: i64,
    pub name: String,
    pub category_count: i64,
}

/// Response of `GET /categories/filters`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFilters {
    pub total_categories: i64,
    pub root_categories: i64,
    pub with_products: i64,
    pub without_products: i64,
    pub companies: Vec<CompanyCategoryCount>,
}
