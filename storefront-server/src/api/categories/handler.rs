//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::models::{
    Category, CategoryCreate, CategoryDetail, CategoryFilters, CategoryListItem, CategoryProducts,
    CategoryStats, CategorySuggestion, CategoryUpdate, CategoryWithCount, PriceStats, StockSplit,
};
use shared::money::{from_cents, round_money};
use shared::{AppError, AppResult, ErrorCode, Page};
use sqlx::SqlitePool;

use crate::api::convert;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::category::{CategoryFilter, ParentConflict};
use crate::db::repository::product::{ProductFilter, ProductOrdering};
use crate::db::repository::{category, company, product};
use crate::utils::validation::{MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text};
use crate::utils::{MediaUrls, QueryParams};

const POPULAR_LIMIT: i64 = 10;
const SUGGESTION_LIMIT: i64 = 8;
const SUGGESTION_MIN_LEN: usize = 2;
const PRODUCTS_DEFAULT_LIMIT: i64 = 20;
const PRODUCTS_MAX_LIMIT: i64 = 100;

fn category_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

async fn load_active(pool: &SqlitePool, id: i64) -> AppResult<CategoryWithCount> {
    category::find_active_by_id(pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

/// Detail view: active children, breadcrumbs, and a count that adds the
/// children's direct products to this category's own
async fn build_detail(
    pool: &SqlitePool,
    row: CategoryWithCount,
    media: &MediaUrls,
) -> AppResult<CategoryDetail> {
    let CategoryWithCount {
        category,
        product_count,
    } = row;
    let children = category::find_active_children(pool, category.id).await?;
    let breadcrumbs = category::breadcrumbs(pool, category.id).await?;
    let parent_name = category
        .parent_id
        .and_then(|_| breadcrumbs.iter().rev().nth(1))
        .map(|crumb| crumb.name.clone());
    let total = product_count + children.iter().map(|c| c.product_count).sum::<i64>();

    Ok(CategoryDetail {
        id: category.id,
        image_url: media.url_opt(category.image.as_deref()),
        name: category.name,
        description: category.description,
        parent: category.parent_id,
        parent_name,
        company: category.company_id,
        product_count: total,
        children: convert::category_list_items(&children, media),
        breadcrumbs,
        is_active: category.is_active,
        created_at: category.created_at,
        updated_at: category.updated_at,
    })
}

/// Detail of any category (active or not) after a write
async fn detail_after_write(
    pool: &SqlitePool,
    saved: Category,
    media: &MediaUrls,
) -> AppResult<CategoryDetail> {
    let product_count = match category::find_active_by_id(pool, saved.id).await? {
        Some(row) => row.product_count,
        None => 0,
    };
    build_detail(
        pool,
        CategoryWithCount {
            category: saved,
            product_count,
        },
        media,
    )
    .await
}

async fn ensure_company_exists(pool: &SqlitePool, company_id: i64) -> AppResult<()> {
    if company::find_by_id(pool, company_id).await?.is_none() {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "company",
            format!("Invalid pk \"{company_id}\" - object does not exist."),
        ));
    }
    Ok(())
}

async fn ensure_parent_exists(pool: &SqlitePool, parent_id: i64) -> AppResult<()> {
    if category::find_by_id(pool, parent_id).await?.is_none() {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "parent",
            format!("Invalid pk \"{parent_id}\" - object does not exist."),
        ));
    }
    Ok(())
}

/// GET /api/categories
pub async fn list(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<Page<CategoryListItem>>> {
    let filter = CategoryFilter {
        parent_only: params.bool("parent_only").unwrap_or(false),
        parent_id: params.i64("parent"),
        company_id: params.i64("company"),
        search: params.text("search").map(String::from),
        has_products: params.bool("has_products"),
    };
    let request = params.page();
    let (rows, count) = category::find_page(&state.pool, &filter, request).await?;
    let page = Page::new(rows, count, request)
        .map(|row| convert::category_list_item(&row.category, row.product_count, &media));
    Ok(Json(page))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDetail>> {
    let row = load_active(&state.pool, id).await?;
    Ok(Json(build_detail(&state.pool, row, &media).await?))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    media: MediaUrls,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<CategoryDetail>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(payload.image.as_deref(), "image", MAX_URL_LEN)?;
    if let Some(parent) = payload.parent {
        ensure_parent_exists(&state.pool, parent).await?;
    }
    if let Some(company_id) = payload.company {
        ensure_company_exists(&state.pool, company_id).await?;
    }

    let created = category::create(&state.pool, &payload).await?;
    tracing::info!(category_id = created.id, user_id = current_user.id(), "Category created");
    let detail = detail_after_write(&state.pool, created, &media).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/categories/{id}
///
/// Re-parenting is rejected when the new parent is the category itself or
/// one of its descendants.
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    media: MediaUrls,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<CategoryDetail>> {
    if category::find_by_id(&state.pool, id).await?.is_none() {
        return Err(category_not_found(id));
    }
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(payload.image.as_deref(), "image", MAX_URL_LEN)?;

    if let Some(Some(parent)) = payload.parent {
        if parent != id {
            ensure_parent_exists(&state.pool, parent).await?;
        }
        let chain = category::parent_chain(&state.pool, parent).await?;
        match category::check_parent(id, parent, &chain) {
            Ok(()) => {}
            Err(ParentConflict::SelfParent) => {
                return Err(AppError::field(
                    ErrorCode::CategorySelfParent,
                    "parent",
                    "Category cannot be parent of itself",
                ));
            }
            Err(ParentConflict::Circular) => {
                return Err(AppError::field(
                    ErrorCode::CategoryCircularParent,
                    "parent",
                    "Cannot create circular parent relationship",
                ));
            }
        }
    }
    if let Some(Some(company_id)) = payload.company {
        ensure_company_exists(&state.pool, company_id).await?;
    }

    let updated = category::update(&state.pool, id, &payload).await?;
    tracing::info!(category_id = id, user_id = current_user.id(), "Category updated");
    Ok(Json(detail_after_write(&state.pool, updated, &media).await?))
}

/// GET /api/categories/tree
///
/// Every active root with one level of active children.
pub async fn tree(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<CategoryDetail>>> {
    let roots = category::find_active_roots(&state.pool, None).await?;
    let mut nodes = Vec::with_capacity(roots.len());
    for root in roots {
        nodes.push(build_detail(&state.pool, root, &media).await?);
    }
    Ok(Json(nodes))
}

/// GET /api/categories/{id}/tree
pub async fn subtree(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDetail>> {
    let row = load_active(&state.pool, id).await?;
    Ok(Json(build_detail(&state.pool, row, &media).await?))
}

/// GET /api/categories/root
pub async fn roots(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<CategoryListItem>>> {
    let rows = category::find_active_roots(&state.pool, None).await?;
    Ok(Json(convert::category_list_items(&rows, &media)))
}

/// GET /api/categories/popular
///
/// Placeholder ranking: most direct products first.
pub async fn popular(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<CategoryListItem>>> {
    let rows = category::find_popular(&state.pool, POPULAR_LIMIT).await?;
    Ok(Json(convert::category_list_items(&rows, &media)))
}

/// GET /api/categories/empty
pub async fn empty(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<CategoryListItem>>> {
    let rows = category::find_empty(&state.pool).await?;
    Ok(Json(convert::category_list_items(&rows, &media)))
}

/// GET /api/categories/search_suggestions?q=
pub async fn search_suggestions(
    State(state): State<ServerState>,
    params: QueryParams,
) -> AppResult<Json<Vec<CategorySuggestion>>> {
    let Some(term) = params
        .text("q")
        .filter(|q| q.chars().count() >= SUGGESTION_MIN_LEN)
    else {
        return Ok(Json(Vec::new()));
    };
    let rows = category::search_names(&state.pool, term, SUGGESTION_LIMIT).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| CategorySuggestion {
                id: row.category.id,
                name: row.category.name,
                product_count: row.product_count,
            })
            .collect(),
    ))
}

/// GET /api/categories/filters
pub async fn filters(State(state): State<ServerState>) -> AppResult<Json<CategoryFilters>> {
    Ok(Json(category::filters(&state.pool).await?))
}

/// GET /api/categories/{id}/subcategories
pub async fn subcategories(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<CategoryListItem>>> {
    load_active(&state.pool, id).await?;
    let rows = category::find_active_children(&state.pool, id).await?;
    Ok(Json(convert::category_list_items(&rows, &media)))
}

/// GET /api/categories/{id}/products?include_subcategories=&ordering=&limit=
pub async fn products(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
    params: QueryParams,
) -> AppResult<Json<CategoryProducts>> {
    let row = load_active(&state.pool, id).await?;

    let mut category_ids = vec![id];
    if params.bool("include_subcategories").unwrap_or(false) {
        let children = category::find_active_children(&state.pool, id).await?;
        category_ids.extend(children.iter().map(|c| c.category.id));
    }
    let filter = ProductFilter {
        category_ids: Some(category_ids),
        ..Default::default()
    };
    let ordering = params
        .text("ordering")
        .and_then(ProductOrdering::parse)
        .unwrap_or_default();
    let limit = params.limit("limit", PRODUCTS_DEFAULT_LIMIT, PRODUCTS_MAX_LIMIT);
    let rows = product::find_limited(&state.pool, &filter, ordering, limit).await?;
    let products = convert::product_list_items(&rows, &media);

    Ok(Json(CategoryProducts {
        category: build_detail(&state.pool, row, &media).await?,
        count: products.len(),
        products,
    }))
}

/// GET /api/categories/{id}/stats
pub async fn stats(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryStats>> {
    let row = load_active(&state.pool, id).await?;
    let aggregate = category::product_aggregate(&state.pool, id).await?;
    let subcategory_count = category::count_active_children(&state.pool, id).await?;
    let brands = category::brands(&state.pool, id).await?;

    let avg = match (aggregate.sum_cents, aggregate.product_count) {
        (Some(sum), count) if count > 0 => Some(round_money(from_cents(sum) / Decimal::from(count))),
        _ => None,
    };
    Ok(Json(CategoryStats {
        category_id: id,
        category_name: row.category.name,
        product_count: aggregate.product_count,
        subcategory_count,
        price_stats: PriceStats {
            min: aggregate.min_cents.map(from_cents),
            max: aggregate.max_cents.map(from_cents),
            avg,
        },
        stock: StockSplit {
            in_stock: aggregate.in_stock_count,
            out_of_stock: aggregate.product_count - aggregate.in_stock_count,
        },
        brands,
    }))
}
