//! Product Repository
//!
//! Listing queries share one joined row shape (`ProductRow`) and a single
//! filter builder. Images and specifications are written with their product
//! inside one transaction.

use super::{RepoError, RepoResult, like_pattern};
use rust_decimal::Decimal;
use shared::PageRequest;
use shared::models::{
    NamedProductCount, PriceRange, Product, ProductCreate, ProductFilterOptions, ProductImage,
    ProductImageInput, ProductSpecification, ProductUpdate, SpecificationInput, StockSplit,
};
use shared::money::{from_cents, to_cents};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;

const PRODUCT_ROW_SELECT: &str = "SELECT p.id, p.title, p.seller_code, p.description, p.price_cents, p.category_id, p.seller_id, p.company_id, \
     p.in_stock, p.brand, p.weight, p.dimensions, p.color, p.material, p.is_active, p.is_featured, p.created_at, p.updated_at, \
     cat.name AS category_name, cat.image AS category_image, cat.parent_id AS category_parent_id, \
     (SELECT COUNT(*) FROM product p2 WHERE p2.category_id = p.category_id AND p2.is_active = 1) AS category_product_count, \
     u.first_name AS seller_first_name, u.last_name AS seller_last_name, u.phone_number AS seller_phone, \
     (SELECT pi.image FROM product_image pi WHERE pi.product_id = p.id ORDER BY pi.is_primary DESC, pi.sort_order, pi.id LIMIT 1) AS primary_image \
     FROM product p JOIN category cat ON cat.id = p.category_id JOIN user u ON u.id = p.seller_id";

/// Product joined with its category, seller and primary image
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub seller_code: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: i64,
    pub seller_id: i64,
    pub company_id: Option<i64>,
    pub in_stock: bool,
    pub brand: String,
    pub weight: Option<String>,
    pub dimensions: String,
    pub color: String,
    pub material: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub category_name: String,
    pub category_image: Option<String>,
    pub category_parent_id: Option<i64>,
    pub category_product_count: i64,
    pub seller_first_name: String,
    pub seller_last_name: String,
    pub seller_phone: String,
    /// Flagged primary image, else the first image by order
    pub primary_image: Option<String>,
}

impl ProductRow {
    pub fn price(&self) -> Decimal {
        from_cents(self.price_cents)
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight.as_deref().and_then(|w| Decimal::from_str(w).ok())
    }

    pub fn seller_name(&self) -> String {
        format!("{} {}", self.seller_first_name, self.seller_last_name)
    }

    pub fn to_product(&self) -> Product {
        Product {
            id: self.id,
            title: self.title.clone(),
            seller_code: self.seller_code.clone(),
            description: self.description.clone(),
            price: self.price(),
            category_id: self.category_id,
            seller_id: self.seller_id,
            company_id: self.company_id,
            in_stock: self.in_stock,
            brand: self.brand.clone(),
            weight: self.weight(),
            dimensions: self.dimensions.clone(),
            color: self.color.clone(),
            material: self.material.clone(),
            is_active: self.is_active,
            is_featured: self.is_featured,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing filters; every `None` means "do not filter"
///
/// Only active products are ever listed.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Category ids matched with `IN` (already expanded by the caller)
    pub category_ids: Option<Vec<i64>>,
    pub company_id: Option<i64>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub brand: Option<String>,
    pub brand_contains: Option<String>,
    pub brands: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    /// Substring over title, description, seller code and brand
    pub search: Option<String>,
    pub title_contains: Option<String>,
    /// Case-insensitive exact match
    pub seller_code: Option<String>,
    pub exclude_id: Option<i64>,
}

/// Listing order; ties break on id in the same direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrdering {
    PriceAsc,
    PriceDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
    TitleAsc,
    TitleDesc,
    Random,
}

impl ProductOrdering {
    /// Parse an `ordering` query value; unknown values yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "price" => Some(Self::PriceAsc),
            "-price" => Some(Self::PriceDesc),
            "created_at" => Some(Self::CreatedAsc),
            "-created_at" => Some(Self::CreatedDesc),
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::PriceAsc => " ORDER BY p.price_cents ASC, p.id ASC",
            Self::PriceDesc => " ORDER BY p.price_cents DESC, p.id DESC",
            Self::CreatedAsc => " ORDER BY p.created_at ASC, p.id ASC",
            Self::CreatedDesc => " ORDER BY p.created_at DESC, p.id DESC",
            Self::TitleAsc => " ORDER BY p.title ASC, p.id ASC",
            Self::TitleDesc => " ORDER BY p.title DESC, p.id DESC",
            Self::Random => " ORDER BY RANDOM()",
        }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    qb.push(" WHERE p.is_active = 1");
    if let Some(ids) = &filter.category_ids {
        if ids.is_empty() {
            qb.push(" AND 0");
        } else {
            qb.push(" AND p.category_id IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
    }
    if let Some(company) = filter.company_id {
        qb.push(" AND p.company_id = ").push_bind(company);
    }
    if let Some(min) = filter.min_price_cents {
        qb.push(" AND p.price_cents >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price_cents {
        qb.push(" AND p.price_cents <= ").push_bind(max);
    }
    if let Some(brand) = &filter.brand {
        qb.push(" AND p.brand = ").push_bind(brand.clone());
    }
    if let Some(brand) = &filter.brand_contains {
        qb.push(" AND p.brand LIKE ")
            .push_bind(like_pattern(brand))
            .push(" ESCAPE '\\'");
    }
    if let Some(brands) = &filter.brands {
        if brands.is_empty() {
            qb.push(" AND 0");
        } else {
            qb.push(" AND p.brand IN (");
            let mut separated = qb.separated(", ");
            for brand in brands {
                separated.push_bind(brand.clone());
            }
            separated.push_unseparated(")");
        }
    }
    if let Some(in_stock) = filter.in_stock {
        qb.push(" AND p.in_stock = ").push_bind(in_stock);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND p.is_featured = ").push_bind(featured);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (");
        for (i, column) in ["p.title", "p.description", "p.seller_code", "p.brand"]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        qb.push(")");
    }
    if let Some(title) = &filter.title_contains {
        qb.push(" AND p.title LIKE ")
            .push_bind(like_pattern(title))
            .push(" ESCAPE '\\'");
    }
    if let Some(code) = &filter.seller_code {
        qb.push(" AND LOWER(p.seller_code) = LOWER(")
            .push_bind(code.clone())
            .push(")");
    }
    if let Some(exclude) = filter.exclude_id {
        qb.push(" AND p.id <> ").push_bind(exclude);
    }
}

/// Filtered active products, one page at a time
pub async fn find_page(
    pool: &SqlitePool,
    filter: &ProductFilter,
    ordering: ProductOrdering,
    page: PageRequest,
) -> RepoResult<(Vec<ProductRow>, i64)> {
    let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_ROW_SELECT);
    push_filters(&mut qb, filter);
    qb.push(ordering.sql())
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<ProductRow>().fetch_all(pool).await?;

    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM product p");
    push_filters(&mut count_qb, filter);
    let count = count_qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok((rows, count))
}

/// Filtered active products, at most `limit` rows
pub async fn find_limited(
    pool: &SqlitePool,
    filter: &ProductFilter,
    ordering: ProductOrdering,
    limit: i64,
) -> RepoResult<Vec<ProductRow>> {
    let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_ROW_SELECT);
    push_filters(&mut qb, filter);
    qb.push(ordering.sql()).push(" LIMIT ").push_bind(limit);
    let rows = qb.build_query_as::<ProductRow>().fetch_all(pool).await?;
    Ok(rows)
}

/// Any product by id, active or not
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductRow>> {
    let sql = format!("{PRODUCT_ROW_SELECT} WHERE p.id = ?");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active product by id; inactive products behave as missing
pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductRow>> {
    Ok(find_by_id(pool, id).await?.filter(|p| p.is_active))
}

/// Whether another product already uses `seller_code`
pub async fn seller_code_taken(
    pool: &SqlitePool,
    seller_code: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM product WHERE seller_code = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(seller_code)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn images(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<ProductImage>> {
    let images = sqlx::query_as::<_, ProductImage>(
        "SELECT id, product_id, image, alt_text, is_primary, sort_order, created_at FROM product_image WHERE product_id = ? ORDER BY sort_order, created_at, id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(images)
}

pub async fn specifications(
    pool: &SqlitePool,
    product_id: i64,
) -> RepoResult<Vec<ProductSpecification>> {
    let specs = sqlx::query_as::<_, ProductSpecification>(
        "SELECT id, product_id, name, value, sort_order FROM product_specification WHERE product_id = ? ORDER BY sort_order, id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(specs)
}

fn price_cents(price: Decimal) -> RepoResult<i64> {
    to_cents(price).ok_or_else(|| RepoError::Validation(format!("Price {price} is out of range")))
}

/// Insert a product with its nested images and specifications; returns the new id
pub async fn create(pool: &SqlitePool, seller_id: i64, data: &ProductCreate) -> RepoResult<i64> {
    let price = data
        .price
        .ok_or_else(|| RepoError::Validation("price is required".into()))?;
    let category = data
        .category
        .ok_or_else(|| RepoError::Validation("category is required".into()))?;
    let cents = price_cents(price)?;
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (title, seller_code, description, price_cents, category_id, seller_id, company_id, in_stock, brand, weight, dimensions, color, material, is_featured, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.title.trim())
    .bind(data.seller_code.trim())
    .bind(&data.description)
    .bind(cents)
    .bind(category)
    .bind(seller_id)
    .bind(data.company)
    .bind(data.in_stock)
    .bind(&data.brand)
    .bind(data.weight.map(|w| w.to_string()))
    .bind(&data.dimensions)
    .bind(&data.color)
    .bind(&data.material)
    .bind(data.is_featured)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    insert_images(&mut *tx, id, &data.images).await?;
    insert_specifications(&mut *tx, id, &data.specifications).await?;
    tx.commit().await?;
    Ok(id)
}

/// Partial update; `images`/`specifications`, when present, replace the whole set
pub async fn update(pool: &SqlitePool, id: i64, data: &ProductUpdate) -> RepoResult<()> {
    let cents = data.price.map(price_cents).transpose()?;
    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE product SET title = COALESCE(?1, title), seller_code = COALESCE(?2, seller_code), description = COALESCE(?3, description), \
         price_cents = COALESCE(?4, price_cents), category_id = COALESCE(?5, category_id), \
         company_id = CASE WHEN ?6 THEN ?7 ELSE company_id END, \
         in_stock = COALESCE(?8, in_stock), brand = COALESCE(?9, brand), \
         weight = CASE WHEN ?10 THEN ?11 ELSE weight END, \
         dimensions = COALESCE(?12, dimensions), color = COALESCE(?13, color), material = COALESCE(?14, material), \
         is_active = COALESCE(?15, is_active), is_featured = COALESCE(?16, is_featured), updated_at = ?17 WHERE id = ?18",
    )
    .bind(data.title.as_deref().map(str::trim))
    .bind(data.seller_code.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(cents)
    .bind(data.category)
    .bind(data.company.is_some())
    .bind(data.company.flatten())
    .bind(data.in_stock)
    .bind(&data.brand)
    .bind(data.weight.is_some())
    .bind(data.weight.flatten().map(|w| w.to_string()))
    .bind(&data.dimensions)
    .bind(&data.color)
    .bind(&data.material)
    .bind(data.is_active)
    .bind(data.is_featured)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    if let Some(images) = &data.images {
        sqlx::query("DELETE FROM product_image WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_images(&mut *tx, id, images).await?;
    }
    if let Some(specs) = &data.specifications {
        sqlx::query("DELETE FROM product_specification WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_specifications(&mut *tx, id, specs).await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE product SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(is_active)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

async fn insert_images(
    conn: &mut SqliteConnection,
    product_id: i64,
    images: &[ProductImageInput],
) -> RepoResult<()> {
    // At most one primary image: the last flagged one wins
    let primary = images.iter().rposition(|img| img.is_primary);
    let now = now_millis();
    for (idx, img) in images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_image (product_id, image, alt_text, is_primary, sort_order, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(&img.image)
        .bind(&img.alt_text)
        .bind(primary == Some(idx))
        .bind(img.order.unwrap_or(0))
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_specifications(
    conn: &mut SqliteConnection,
    product_id: i64,
    specs: &[SpecificationInput],
) -> RepoResult<()> {
    for spec in specs {
        sqlx::query(
            "INSERT INTO product_specification (product_id, name, value, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(spec.name.trim())
        .bind(&spec.value)
        .bind(spec.order.unwrap_or(0))
        .execute(&mut *conn)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => RepoError::Duplicate(format!(
                "Specification '{}' is listed more than once",
                spec.name.trim()
            )),
            other => other,
        })?;
    }
    Ok(())
}

/// Aggregate metadata over the active catalog
pub async fn filter_options(pool: &SqlitePool) -> RepoResult<ProductFilterOptions> {
    let (total, in_stock, min_cents, max_cents): (i64, i64, Option<i64>, Option<i64>) =
        sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(in_stock), 0), MIN(price_cents), MAX(price_cents) FROM product WHERE is_active = 1",
        )
        .fetch_one(pool)
        .await?;
    let brands = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT brand FROM product WHERE is_active = 1 AND brand <> '' ORDER BY brand",
    )
    .fetch_all(pool)
    .await?;
    let categories = sqlx::query_as::<_, NamedProductCount>(
        "SELECT c.id, c.name, COUNT(p.id) AS product_count FROM category c \
         JOIN product p ON p.category_id = c.id AND p.is_active = 1 \
         WHERE c.is_active = 1 GROUP BY c.id, c.name ORDER BY c.name",
    )
    .fetch_all(pool)
    .await?;
    let companies = sqlx::query_as::<_, NamedProductCount>(
        "SELECT co.id, co.name, COUNT(p.id) AS product_count FROM company co \
         JOIN product p ON p.company_id = co.id AND p.is_active = 1 \
         WHERE co.is_active = 1 GROUP BY co.id, co.name ORDER BY co.name",
    )
    .fetch_all(pool)
    .await?;
    Ok(ProductFilterOptions {
        price_range: PriceRange {
            min: from_cents(min_cents.unwrap_or(0)),
            max: from_cents(max_cents.unwrap_or(0)),
        },
        brands,
        categories,
        companies,
        stock: StockSplit {
            in_stock,
            out_of_stock: total - in_stock,
        },
        total_products: total,
    })
}

/// Titles of active products containing `term`
pub async fn title_suggestions(pool: &SqlitePool, term: &str, limit: i64) -> RepoResult<Vec<String>> {
    let titles = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT title FROM product WHERE is_active = 1 AND title LIKE ? ESCAPE '\\' ORDER BY title LIMIT ?",
    )
    .bind(like_pattern(term))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(titles)
}

/// Distinct brands of active products containing `term`
pub async fn brand_suggestions(pool: &SqlitePool, term: &str, limit: i64) -> RepoResult<Vec<String>> {
    let brands = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT brand FROM product WHERE is_active = 1 AND brand <> '' AND brand LIKE ? ESCAPE '\\' ORDER BY brand LIMIT ?",
    )
    .bind(like_pattern(term))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(brands)
}
