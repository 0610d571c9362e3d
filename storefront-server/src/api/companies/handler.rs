//! Company API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{CategoryListItem, Company, CompanyDetail, CompanyListItem, ProductListItem};
use shared::money::to_cents;
use shared::{AppError, AppResult, ErrorCode, Page};

use crate::api::convert;
use crate::core::ServerState;
use crate::db::repository::product::{ProductFilter, ProductOrdering};
use crate::db::repository::{category, company, product};
use crate::utils::{MediaUrls, QueryParams};

async fn load_company(state: &ServerState, id: i64) -> AppResult<Company> {
    company::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::CompanyNotFound, format!("Company {id} not found"))
        })
}

/// GET /api/companies
pub async fn list(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<Page<CompanyListItem>>> {
    let request = params.page();
    let (rows, count) = company::find_active_page(&state.pool, request).await?;
    let page = Page::new(rows, count, request).map(|row| convert::company_list_item(row, &media));
    Ok(Json(page))
}

/// GET /api/companies/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<CompanyDetail>> {
    let found = load_company(&state, id).await?;
    let roots = category::find_active_roots(&state.pool, Some(id)).await?;
    Ok(Json(CompanyDetail {
        id: found.id,
        logo_url: media.url_opt(found.logo.as_deref()),
        name: found.name,
        logo: found.logo,
        description: found.description,
        slug: found.slug,
        categories: convert::category_list_items(&roots, &media),
        created_at: found.created_at,
    }))
}

/// GET /api/companies/{id}/categories
///
/// Active root categories of the company.
pub async fn categories(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<CategoryListItem>>> {
    load_company(&state, id).await?;
    let roots = category::find_active_roots(&state.pool, Some(id)).await?;
    Ok(Json(convert::category_list_items(&roots, &media)))
}

/// GET /api/companies/{id}/products
///
/// Filters: `category` (exact match), `search` (title substring), `min_price`, `max_price`, `page`.
pub async fn products(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
    params: QueryParams,
) -> AppResult<Json<Page<ProductListItem>>> {
    load_company(&state, id).await?;
    let filter = ProductFilter {
        company_id: Some(id),
        category_ids: params.i64("category").map(|category_id| vec![category_id]),
        title_contains: params.text("search").map(String::from),
        min_price_cents: params.decimal("min_price").and_then(to_cents),
        max_price_cents: params.decimal("max_price").and_then(to_cents),
        ..Default::default()
    };
    let request = params.page();
    let (rows, count) =
        product::find_page(&state.pool, &filter, ProductOrdering::default(), request).await?;
    let page = Page::new(rows, count, request).map(|row| convert::product_list_item(&row, &media));
    Ok(Json(page))
}
