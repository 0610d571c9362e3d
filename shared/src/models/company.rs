//! Company Model

use serde::{Deserialize, Serialize};

use super::category::CategoryListItem;

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create company payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCreate {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub logo: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Company as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyListItem {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub logo_url: Option<String>,
    pub slug: String,
    /// Active root categories
    pub categories_count: i64,
    /// Active products
    pub products_count: i64,
}

/// Company detail with its root categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetail {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub logo_url: Option<String>,
    pub description: String,
    pub slug: String,
    pub categories: Vec<CategoryListItem>,
    pub created_at: i64,
}
