//! Category Repository
//!
//! `product_count` is always derived: active products whose category is
//! exactly this one.

use super::{RepoError, RepoResult, like_pattern};
use shared::PageRequest;
use shared::models::{
    Breadcrumb, Category, CategoryCreate, CategoryFilters, CategoryUpdate, CategoryWithCount,
    CompanyCategoryCount,
};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const CATEGORY_SELECT: &str = "SELECT id, name, description, image, parent_id, company_id, sort_order, is_active, created_at, updated_at FROM category";

/// Active categories with their product counts, as a derived table `t`
const ACTIVE_WITH_COUNT: &str = "SELECT * FROM (SELECT c.id, c.name, c.description, c.image, c.parent_id, c.company_id, c.sort_order, c.is_active, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM product p WHERE p.category_id = c.id AND p.is_active = 1) AS product_count \
     FROM category c WHERE c.is_active = 1) t";

/// Guard against walking a corrupted parent chain forever
const MAX_DEPTH: i64 = 1000;

/// Listing filters for `GET /categories/`
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub parent_only: bool,
    pub parent_id: Option<i64>,
    pub company_id: Option<i64>,
    pub search: Option<String>,
    pub has_products: Option<bool>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &CategoryFilter) {
    qb.push(" WHERE 1 = 1");
    if filter.parent_only {
        qb.push(" AND t.parent_id IS NULL");
    }
    if let Some(parent) = filter.parent_id {
        qb.push(" AND t.parent_id = ").push_bind(parent);
    }
    if let Some(company) = filter.company_id {
        qb.push(" AND t.company_id = ").push_bind(company);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (t.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    match filter.has_products {
        Some(true) => {
            qb.push(" AND t.product_count > 0");
        }
        Some(false) => {
            qb.push(" AND t.product_count = 0");
        }
        None => {}
    }
}

/// Filtered active categories ordered by name, one page at a time
pub async fn find_page(
    pool: &SqlitePool,
    filter: &CategoryFilter,
    page: PageRequest,
) -> RepoResult<(Vec<CategoryWithCount>, i64)> {
    let mut qb = QueryBuilder::<Sqlite>::new(ACTIVE_WITH_COUNT);
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY t.name, t.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb
        .build_query_as::<CategoryWithCount>()
        .fetch_all(pool)
        .await?;

    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM (");
    count_qb.push(ACTIVE_WITH_COUNT);
    push_filters(&mut count_qb, filter);
    count_qb.push(")");
    let count = count_qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok((rows, count))
}

/// Any category by id, active or not
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("{CATEGORY_SELECT} WHERE id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Active category with its product count
pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CategoryWithCount>> {
    let sql = format!("{ACTIVE_WITH_COUNT} WHERE t.id = ?");
    let category = sqlx::query_as::<_, CategoryWithCount>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Active direct children, ordered by (sort_order, name)
pub async fn find_active_children(
    pool: &SqlitePool,
    parent_id: i64,
) -> RepoResult<Vec<CategoryWithCount>> {
    let sql = format!("{ACTIVE_WITH_COUNT} WHERE t.parent_id = ? ORDER BY t.sort_order, t.name");
    let rows = sqlx::query_as::<_, CategoryWithCount>(&sql)
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active root categories, optionally limited to one company
pub async fn find_active_roots(
    pool: &SqlitePool,
    company_id: Option<i64>,
) -> RepoResult<Vec<CategoryWithCount>> {
    let mut qb = QueryBuilder::<Sqlite>::new(ACTIVE_WITH_COUNT);
    qb.push(" WHERE t.parent_id IS NULL");
    if let Some(company) = company_id {
        qb.push(" AND t.company_id = ").push_bind(company);
    }
    qb.push(" ORDER BY t.sort_order, t.name");
    let rows = qb
        .build_query_as::<CategoryWithCount>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Top categories by direct product count (only those with products)
pub async fn find_popular(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<CategoryWithCount>> {
    let sql = format!(
        "{ACTIVE_WITH_COUNT} WHERE t.product_count > 0 ORDER BY t.product_count DESC, t.name LIMIT ?"
    );
    let rows = sqlx::query_as::<_, CategoryWithCount>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active categories without any active product
pub async fn find_empty(pool: &SqlitePool) -> RepoResult<Vec<CategoryWithCount>> {
    let sql = format!("{ACTIVE_WITH_COUNT} WHERE t.product_count = 0 ORDER BY t.name");
    let rows = sqlx::query_as::<_, CategoryWithCount>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active categories whose name contains `term`
pub async fn search_names(
    pool: &SqlitePool,
    term: &str,
    limit: i64,
) -> RepoResult<Vec<CategoryWithCount>> {
    let sql = format!("{ACTIVE_WITH_COUNT} WHERE t.name LIKE ? ESCAPE '\\' ORDER BY t.name LIMIT ?");
    let rows = sqlx::query_as::<_, CategoryWithCount>(&sql)
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Ids of `start` and all its ancestors, nearest first
pub async fn parent_chain(pool: &SqlitePool, start: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "WITH RECURSIVE chain(id, parent_id, depth) AS ( \
           SELECT id, parent_id, 0 FROM category WHERE id = ?1 \
           UNION ALL \
           SELECT c.id, c.parent_id, chain.depth + 1 FROM category c JOIN chain ON c.id = chain.parent_id WHERE chain.depth < ?2 \
         ) SELECT id FROM chain ORDER BY depth",
    )
    .bind(start)
    .bind(MAX_DEPTH)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Breadcrumb trail from the root down to `id` (inclusive)
pub async fn breadcrumbs(pool: &SqlitePool, id: i64) -> RepoResult<Vec<Breadcrumb>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "WITH RECURSIVE chain(id, name, parent_id, depth) AS ( \
           SELECT id, name, parent_id, 0 FROM category WHERE id = ?1 \
           UNION ALL \
           SELECT c.id, c.name, c.parent_id, chain.depth + 1 FROM category c JOIN chain ON c.id = chain.parent_id WHERE chain.depth < ?2 \
         ) SELECT id, name FROM chain ORDER BY depth DESC",
    )
    .bind(id)
    .bind(MAX_DEPTH)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| Breadcrumb { id, name })
        .collect())
}

/// Why a proposed parent is not acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentConflict {
    SelfParent,
    Circular,
}

/// Check a re-parenting of `node_id` under `parent_id`
///
/// `parent_chain` is the proposed parent followed by its ancestors; the move
/// would form a cycle when the node appears anywhere in it.
pub fn check_parent(
    node_id: i64,
    parent_id: i64,
    parent_chain: &[i64],
) -> Result<(), ParentConflict> {
    if node_id == parent_id {
        return Err(ParentConflict::SelfParent);
    }
    if parent_chain.contains(&node_id) {
        return Err(ParentConflict::Circular);
    }
    Ok(())
}

/// Number of active direct children
pub async fn count_active_children(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM category WHERE parent_id = ? AND is_active = 1")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Price and stock aggregate over a category's direct active products
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ProductAggregate {
    pub product_count: i64,
    pub in_stock_count: i64,
    pub min_cents: Option<i64>,
    pub max_cents: Option<i64>,
    pub sum_cents: Option<i64>,
}

pub async fn product_aggregate(pool: &SqlitePool, id: i64) -> RepoResult<ProductAggregate> {
    let aggregate = sqlx::query_as::<_, ProductAggregate>(
        "SELECT COUNT(*) AS product_count, COALESCE(SUM(in_stock), 0) AS in_stock_count, \
         MIN(price_cents) AS min_cents, MAX(price_cents) AS max_cents, SUM(price_cents) AS sum_cents \
         FROM product WHERE category_id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(aggregate)
}

/// Distinct non-empty brands of a category's direct active products
pub async fn brands(pool: &SqlitePool, id: i64) -> RepoResult<Vec<String>> {
    let brands = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT brand FROM product WHERE category_id = ? AND is_active = 1 AND brand <> '' ORDER BY brand",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(brands)
}

/// Catalog-wide category counters
pub async fn filters(pool: &SqlitePool) -> RepoResult<CategoryFilters> {
    let (total_categories, root_categories, with_products): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(t.parent_id IS NULL), 0), COALESCE(SUM(t.product_count > 0), 0) FROM (\
         SELECT c.parent_id, (SELECT COUNT(*) FROM product p WHERE p.category_id = c.id AND p.is_active = 1) AS product_count \
         FROM category c WHERE c.is_active = 1) t",
    )
    .fetch_one(pool)
    .await?;
    let companies = sqlx::query_as::<_, CompanyCategoryCount>(
        "SELECT co.id, co.name, \
         (SELECT COUNT(*) FROM category c WHERE c.company_id = co.id AND c.is_active = 1) AS category_count \
         FROM company co WHERE co.is_active = 1 ORDER BY co.sort_order, co.name",
    )
    .fetch_all(pool)
    .await?;
    Ok(CategoryFilters {
        total_categories,
        root_categories,
        with_products,
        without_products: total_categories - with_products,
        companies,
    })
}

pub async fn create(pool: &SqlitePool, data: &CategoryCreate) -> RepoResult<Category> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO category (name, description, image, parent_id, company_id, sort_order, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(&data.image)
    .bind(data.parent)
    .bind(data.company)
    .bind(data.order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

/// Partial update; `parent`/`company` are only written when present in the patch
pub async fn update(pool: &SqlitePool, id: i64, data: &CategoryUpdate) -> RepoResult<Category> {
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), image = COALESCE(?3, image), \
         parent_id = CASE WHEN ?4 THEN ?5 ELSE parent_id END, \
         company_id = CASE WHEN ?6 THEN ?7 ELSE company_id END, \
         sort_order = COALESCE(?8, sort_order), is_active = COALESCE(?9, is_active), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(&data.image)
    .bind(data.parent.is_some())
    .bind(data.parent.flatten())
    .bind(data.company.is_some())
    .bind(data.company.flatten())
    .bind(data.order)
    .bind(data.is_active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}
