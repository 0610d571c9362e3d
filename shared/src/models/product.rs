//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{CategoryListItem, StockSplit};
use super::serde_helpers;
use crate::pagination::Page;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    /// Merchant-assigned code, unique across all products
    pub seller_code: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: i64,
    pub seller_id: i64,
    pub company_id: Option<i64>,
    pub in_stock: bool,
    pub brand: String,
    /// Kilograms
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub color: String,
    pub material: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Product image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    /// Path relative to the media root
    pub image: String,
    pub alt_text: String,
    pub is_primary: bool,
    pub sort_order: i32,
    pub created_at: i64,
}

/// Product image as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImageView {
    pub id: i64,
    pub image_url: String,
    pub alt_text: String,
    pub is_primary: bool,
    pub order: i32,
}

/// Name/value specification pair (unique per product + name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductSpecification {
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub product_id: i64,
    pub name: String,
    pub value: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
}

/// Nested image payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageInput {
    pub image: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub is_primary: bool,
    pub order: Option<i32>,
}

/// Nested specification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationInput {
    pub name: String,
    pub value: String,
    pub order: Option<i32>,
}

/// Create product payload (the seller is the authenticated user)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub seller_code: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<Decimal>,
    pub category: Option<i64>,
    pub company: Option<i64>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub brand: String,
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub material: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_featured: bool,
    #[serde(default)]
    pub images: Vec<ProductImageInput>,
    #[serde(default)]
    pub specifications: Vec<SpecificationInput>,
}

fn default_true() -> bool {
    true
}

/// Update product payload
///
/// `images`/`specifications`, when present, replace the whole set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub seller_code: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::double_option")]
    pub company: Option<Option<i64>>,
    pub in_stock: Option<bool>,
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::double_option")]
    pub weight: Option<Option<Decimal>>,
    pub dimensions: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub images: Option<Vec<ProductImageInput>>,
    pub specifications: Option<Vec<SpecificationInput>>,
}

/// Product as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListItem {
    pub id: i64,
    pub title: String,
    pub seller_code: String,
    pub price: Decimal,
    /// Primary image, falling back to the first image
    pub primary_image: Option<String>,
    pub category_name: String,
    pub seller_name: String,
    pub in_stock: bool,
    pub is_featured: bool,
    pub brand: String,
    pub created_at: i64,
}

/// Product detail view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: i64,
    pub title: String,
    pub seller_code: String,
    pub description: String,
    pub price: Decimal,
    pub category: CategoryListItem,
    pub company: Option<i64>,
    pub seller_name: String,
    pub seller_phone: String,
    pub in_stock: bool,
    pub brand: String,
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub color: String,
    pub material: String,
    pub primary_image: Option<String>,
    pub images: Vec<ProductImageView>,
    pub specifications: Vec<ProductSpecification>,
    pub is_featured: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Raw filter values echoed back by the product listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FiltersApplied {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
}

/// Response of `GET /products/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    #[serde(flatten)]
    pub page: Page<ProductListItem>,
    pub filters_applied: FiltersApplied,
}

/// Response of `GET /products/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchResponse {
    pub count: i64,
    pub query: String,
    pub results: Page<ProductListItem>,
}

/// Price bounds over the active catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Entity id/name with an active-product count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NamedProductCount {
    pub id: i64,
    pub name: String,
    pub product_count: i64,
}

/// Response of `GET /products/filters`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFilterOptions {
    pub price_range: PriceRange,
    pub brands: Vec<String>,
    pub categories: Vec<NamedProductCount>,
    pub companies: Vec<NamedProductCount>,
    pub stock: StockSplit,
    pub total_products: i64,
}

/// Kind of a product search suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Product,
    Brand,
}

/// Product search suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSuggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}
