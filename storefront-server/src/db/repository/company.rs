//! Company Repository

use super::{RepoError, RepoResult};
use shared::PageRequest;
use shared::models::{Company, CompanyCreate};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COMPANY_SELECT: &str =
    "SELECT id, name, slug, description, logo, sort_order, is_active, created_at, updated_at FROM company";

/// Company with its active root-category and active-product counts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyWithCounts {
    #[sqlx(flatten)]
    pub company: Company,
    pub categories_count: i64,
    pub products_count: i64,
}

/// Active companies ordered by (sort_order, name), one page at a time
pub async fn find_active_page(
    pool: &SqlitePool,
    page: PageRequest,
) -> RepoResult<(Vec<CompanyWithCounts>, i64)> {
    let rows = sqlx::query_as::<_, CompanyWithCounts>(
        "SELECT c.id, c.name, c.slug, c.description, c.logo, c.sort_order, c.is_active, c.created_at, c.updated_at, \
         (SELECT COUNT(*) FROM category cat WHERE cat.company_id = c.id AND cat.is_active = 1 AND cat.parent_id IS NULL) AS categories_count, \
         (SELECT COUNT(*) FROM product p WHERE p.company_id = c.id AND p.is_active = 1) AS products_count \
         FROM company c WHERE c.is_active = 1 ORDER BY c.sort_order, c.name LIMIT ? OFFSET ?",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company WHERE is_active = 1")
        .fetch_one(pool)
        .await?;
    Ok((rows, count))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Company>> {
    let sql = format!("{COMPANY_SELECT} WHERE id = ?");
    let company = sqlx::query_as::<_, Company>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(company)
}

/// Active company by id; inactive companies behave as missing
pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Company>> {
    Ok(find_by_id(pool, id).await?.filter(|c| c.is_active))
}

pub async fn create(pool: &SqlitePool, data: CompanyCreate) -> RepoResult<Company> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO company (name, slug, description, logo, sort_order, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(&data.logo)
    .bind(data.sort_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create company".into()))
}
