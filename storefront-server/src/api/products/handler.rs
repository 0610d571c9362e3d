//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    FiltersApplied, ProductCreate, ProductDetail, ProductFilterOptions, ProductImageInput,
    ProductImageView, ProductListItem, ProductListResponse, ProductSearchResponse,
    ProductSpecification, ProductUpdate, SearchSuggestion, SpecificationInput, SuggestionKind,
};
use shared::money::to_cents;
use shared::{AppError, AppResult, ErrorCode, Page};
use std::collections::HashSet;

use super::category_scope;
use crate::api::convert;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::product::{ProductFilter, ProductOrdering, ProductRow};
use crate::db::repository::{RepoError, category, company, product};
use crate::utils::validation::{
    MAX_CODE_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, MAX_URL_LEN, require_id,
    validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{MediaUrls, QueryParams};

const FEATURED_LIMIT: i64 = 12;
const LATEST_DEFAULT_LIMIT: i64 = 20;
const LATEST_MAX_LIMIT: i64 = 100;
const POPULAR_LIMIT: i64 = 15;
const RELATED_LIMIT: i64 = 8;
const SUGGESTION_MIN_LEN: usize = 2;
const TITLE_SUGGESTIONS: i64 = 5;
const BRAND_SUGGESTIONS: i64 = 3;
const MAX_SUGGESTIONS: usize = 8;

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

async fn load_active(state: &ServerState, id: i64) -> AppResult<ProductRow> {
    product::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))
}

async fn build_detail(
    state: &ServerState,
    row: ProductRow,
    media: &MediaUrls,
) -> AppResult<ProductDetail> {
    let images = product::images(&state.pool, row.id).await?;
    let specifications = product::specifications(&state.pool, row.id).await?;
    Ok(ProductDetail {
        id: row.id,
        category: convert::product_category(&row, media),
        price: row.price(),
        weight: row.weight(),
        seller_name: row.seller_name(),
        primary_image: media.url_opt(row.primary_image.as_deref()),
        images: images
            .into_iter()
            .map(|img| convert::product_image_view(img, media))
            .collect(),
        specifications,
        title: row.title,
        seller_code: row.seller_code,
        description: row.description,
        company: row.company_id,
        seller_phone: row.seller_phone,
        in_stock: row.in_stock,
        brand: row.brand,
        dimensions: row.dimensions,
        color: row.color,
        material: row.material,
        is_featured: row.is_featured,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn list_page(rows: Vec<ProductRow>, count: i64, params: &QueryParams, media: &MediaUrls) -> Page<ProductListItem> {
    Page::new(rows, count, params.page()).map(|row| convert::product_list_item(&row, media))
}

/// Build the listing filter from query parameters; malformed values are ignored
async fn filter_from_params(state: &ServerState, params: &QueryParams) -> AppResult<ProductFilter> {
    let mut category_ids = match params.i64("category") {
        Some(id) => Some(category_scope(state, id).await?),
        None => None,
    };
    if let Some(listed) = params.id_list("categories") {
        category_ids = Some(match category_ids {
            Some(scope) => scope.into_iter().filter(|id| listed.contains(id)).collect(),
            None => listed,
        });
    }
    Ok(ProductFilter {
        category_ids,
        company_id: params.i64("company"),
        min_price_cents: params.decimal("min_price").and_then(to_cents),
        max_price_cents: params.decimal("max_price").and_then(to_cents),
        brand: params.text("brand").map(String::from),
        brand_contains: params.text("brand__icontains").map(String::from),
        brands: params.text_list("brands"),
        in_stock: params.bool("in_stock"),
        featured: params.bool("featured").or_else(|| params.bool("is_featured")),
        search: params.text("search").map(String::from),
        title_contains: params.text("title").map(String::from),
        seller_code: params.text("seller_code").map(String::from),
        exclude_id: None,
    })
}

/// GET /api/products
pub async fn list(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<ProductListResponse>> {
    let filter = filter_from_params(&state, &params).await?;
    let ordering = params
        .text("ordering")
        .and_then(ProductOrdering::parse)
        .unwrap_or_default();
    let (rows, count) = product::find_page(&state.pool, &filter, ordering, params.page()).await?;

    let echo = |key: &str| params.raw(key).map(String::from);
    Ok(Json(ProductListResponse {
        page: list_page(rows, count, &params, &media),
        filters_applied: FiltersApplied {
            category: echo("category"),
            search: echo("search"),
            min_price: echo("min_price"),
            max_price: echo("max_price"),
            in_stock: echo("in_stock"),
        },
    }))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let row = load_active(&state, id).await?;
    Ok(Json(build_detail(&state, row, &media).await?))
}

/// GET /api/products/search?q=&category=&company=&page=
pub async fn search(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<ProductSearchResponse>> {
    let Some(query) = params.text("q") else {
        return Err(AppError::field(
            ErrorCode::SearchQueryRequired,
            "q",
            "Search query is required",
        ));
    };
    let category_ids = match params.i64("category") {
        Some(id) => Some(category_scope(&state, id).await?),
        None => None,
    };
    let filter = ProductFilter {
        search: Some(query.to_string()),
        category_ids,
        company_id: params.i64("company"),
        ..Default::default()
    };
    let (rows, count) =
        product::find_page(&state.pool, &filter, ProductOrdering::default(), params.page()).await?;
    Ok(Json(ProductSearchResponse {
        count,
        query: query.to_string(),
        results: list_page(rows, count, &params, &media),
    }))
}

/// GET /api/products/featured
pub async fn featured(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<ProductListItem>>> {
    let filter = ProductFilter {
        featured: Some(true),
        ..Default::default()
    };
    let rows = product::find_limited(&state.pool, &filter, ProductOrdering::default(), FEATURED_LIMIT).await?;
    Ok(Json(convert::product_list_items(&rows, &media)))
}

/// GET /api/products/latest?limit=
pub async fn latest(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<Vec<ProductListItem>>> {
    let limit = params.limit("limit", LATEST_DEFAULT_LIMIT, LATEST_MAX_LIMIT);
    let rows = product::find_limited(
        &state.pool,
        &ProductFilter::default(),
        ProductOrdering::CreatedDesc,
        limit,
    )
    .await?;
    Ok(Json(convert::product_list_items(&rows, &media)))
}

/// GET /api/products/popular
///
/// Placeholder ranking: a random sample of featured products.
pub async fn popular(
    State(state): State<ServerState>,
    media: MediaUrls,
) -> AppResult<Json<Vec<ProductListItem>>> {
    let filter = ProductFilter {
        featured: Some(true),
        ..Default::default()
    };
    let rows = product::find_limited(&state.pool, &filter, ProductOrdering::Random, POPULAR_LIMIT).await?;
    Ok(Json(convert::product_list_items(&rows, &media)))
}

async fn by_stock(
    state: &ServerState,
    media: &MediaUrls,
    params: &QueryParams,
    in_stock: bool,
) -> AppResult<Page<ProductListItem>> {
    let filter = ProductFilter {
        in_stock: Some(in_stock),
        ..Default::default()
    };
    let (rows, count) =
        product::find_page(&state.pool, &filter, ProductOrdering::default(), params.page()).await?;
    Ok(list_page(rows, count, params, media))
}

/// GET /api/products/in_stock
pub async fn in_stock(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<Page<ProductListItem>>> {
    Ok(Json(by_stock(&state, &media, &params, true).await?))
}

/// GET /api/products/out_of_stock
pub async fn out_of_stock(
    State(state): State<ServerState>,
    media: MediaUrls,
    params: QueryParams,
) -> AppResult<Json<Page<ProductListItem>>> {
    Ok(Json(by_stock(&state, &media, &params, false).await?))
}

/// GET /api/products/{id}/related (also /similar)
///
/// Same category, excluding the product itself; narrowed to the same brand
/// when that leaves anything.
pub async fn related(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ProductListItem>>> {
    let row = load_active(&state, id).await?;
    let base = ProductFilter {
        category_ids: Some(vec![row.category_id]),
        exclude_id: Some(id),
        ..Default::default()
    };
    if !row.brand.is_empty() {
        let same_brand = ProductFilter {
            brand: Some(row.brand.clone()),
            ..base.clone()
        };
        let rows = product::find_limited(&state.pool, &same_brand, ProductOrdering::default(), RELATED_LIMIT).await?;
        if !rows.is_empty() {
            return Ok(Json(convert::product_list_items(&rows, &media)));
        }
    }
    let rows = product::find_limited(&state.pool, &base, ProductOrdering::default(), RELATED_LIMIT).await?;
    Ok(Json(convert::product_list_items(&rows, &media)))
}

/// GET /api/products/{id}/images
pub async fn images(
    State(state): State<ServerState>,
    media: MediaUrls,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ProductImageView>>> {
    load_active(&state, id).await?;
    let images = product::images(&state.pool, id).await?;
    Ok(Json(
        images
            .into_iter()
            .map(|img| convert::product_image_view(img, &media))
            .collect(),
    ))
}

/// GET /api/products/{id}/specifications
pub async fn specifications(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ProductSpecification>>> {
    load_active(&state, id).await?;
    Ok(Json(product::specifications(&state.pool, id).await?))
}

/// GET /api/products/filters
pub async fn filters(State(state): State<ServerState>) -> AppResult<Json<ProductFilterOptions>> {
    Ok(Json(product::filter_options(&state.pool).await?))
}

/// GET /api/products/search_suggestions?q=
pub async fn search_suggestions(
    State(state): State<ServerState>,
    params: QueryParams,
) -> AppResult<Json<Vec<SearchSuggestion>>> {
    let Some(term) = params
        .text("q")
        .filter(|q| q.chars().count() >= SUGGESTION_MIN_LEN)
    else {
        return Ok(Json(Vec::new()));
    };
    let titles = product::title_suggestions(&state.pool, term, TITLE_SUGGESTIONS).await?;
    let brands = product::brand_suggestions(&state.pool, term, BRAND_SUGGESTIONS).await?;

    let suggestions = titles
        .into_iter()
        .map(|text| SearchSuggestion {
            text,
            kind: SuggestionKind::Product,
        })
        .chain(brands.into_iter().map(|text| SearchSuggestion {
            text,
            kind: SuggestionKind::Brand,
        }))
        .take(MAX_SUGGESTIONS)
        .collect();
    Ok(Json(suggestions))
}

// ==================== Writes ====================

fn validate_attributes(
    brand: Option<&str>,
    dimensions: Option<&str>,
    color: Option<&str>,
    material: Option<&str>,
) -> AppResult<()> {
    validate_optional_text(brand, "brand", MAX_NAME_LEN)?;
    validate_optional_text(dimensions, "dimensions", MAX_NAME_LEN)?;
    validate_optional_text(color, "color", MAX_CODE_LEN)?;
    validate_optional_text(material, "material", MAX_NAME_LEN)?;
    Ok(())
}

fn validate_images(images: &[ProductImageInput]) -> AppResult<()> {
    for image in images {
        validate_required_text(&image.image, "images", MAX_URL_LEN)?;
        validate_optional_text(Some(image.alt_text.as_str()), "images", MAX_TITLE_LEN)?;
    }
    Ok(())
}

/// Specification names are required and unique within one product
fn validate_specifications(specs: &[SpecificationInput]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        validate_required_text(&spec.name, "specifications", MAX_NAME_LEN)?;
        validate_optional_text(Some(spec.value.as_str()), "specifications", MAX_SHORT_TEXT_LEN)?;
        if !seen.insert(spec.name.trim().to_string()) {
            return Err(AppError::field(
                ErrorCode::SpecificationNameDuplicate,
                "specifications",
                format!("Specification '{}' is listed more than once", spec.name.trim()),
            ));
        }
    }
    Ok(())
}

fn seller_code_exists() -> AppError {
    AppError::field(
        ErrorCode::SellerCodeExists,
        "seller_code",
        "A product with this seller code already exists.",
    )
}

async fn ensure_category(state: &ServerState, id: i64) -> AppResult<()> {
    if category::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "category",
            format!("Invalid pk \"{id}\" - object does not exist."),
        ));
    }
    Ok(())
}

async fn ensure_company(state: &ServerState, id: i64) -> AppResult<()> {
    if company::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "company",
            format!("Invalid pk \"{id}\" - object does not exist."),
        ));
    }
    Ok(())
}

fn map_write_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("seller_code") => seller_code_exists(),
        RepoError::Duplicate(msg) => {
            AppError::field(ErrorCode::SpecificationNameDuplicate, "specifications", msg)
        }
        other => other.into(),
    }
}

/// POST /api/products
///
/// The authenticated user becomes the seller.
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    media: MediaUrls,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductDetail>)> {
    validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
    validate_required_text(&payload.seller_code, "seller_code", MAX_CODE_LEN)?;
    validate_price(payload.price, "price")?;
    let category_id = require_id(payload.category, "category")?;
    validate_attributes(
        Some(payload.brand.as_str()),
        Some(payload.dimensions.as_str()),
        Some(payload.color.as_str()),
        Some(payload.material.as_str()),
    )?;
    validate_images(&payload.images)?;
    validate_specifications(&payload.specifications)?;
    if payload.weight.is_some_and(|w| w.is_sign_negative() && !w.is_zero()) {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "weight",
            "Ensure this value is greater than or equal to 0.",
        ));
    }

    ensure_category(&state, category_id).await?;
    if let Some(company_id) = payload.company {
        ensure_company(&state, company_id).await?;
    }
    if product::seller_code_taken(&state.pool, payload.seller_code.trim(), None).await? {
        return Err(seller_code_exists());
    }

    let id = product::create(&state.pool, current_user.id(), &payload)
        .await
        .map_err(map_write_error)?;
    tracing::info!(product_id = id, seller_id = current_user.id(), "Product created");

    let row = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok((StatusCode::CREATED, Json(build_detail(&state, row, &media).await?)))
}

/// PUT /api/products/{id}
///
/// Only the seller may update. Keeping the product's own seller code is
/// not a conflict.
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    media: MediaUrls,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductDetail>> {
    let existing = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    if existing.seller_id != current_user.id() {
        return Err(AppError::with_message(
            ErrorCode::NotProductSeller,
            "Only the seller can modify this product",
        ));
    }

    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    if let Some(code) = &payload.seller_code {
        validate_required_text(code, "seller_code", MAX_CODE_LEN)?;
        if product::seller_code_taken(&state.pool, code.trim(), Some(id)).await? {
            return Err(seller_code_exists());
        }
    }
    if payload.price.is_some() {
        validate_price(payload.price, "price")?;
    }
    validate_attributes(
        payload.brand.as_deref(),
        payload.dimensions.as_deref(),
        payload.color.as_deref(),
        payload.material.as_deref(),
    )?;
    if let Some(images) = &payload.images {
        validate_images(images)?;
    }
    if let Some(specs) = &payload.specifications {
        validate_specifications(specs)?;
    }
    if let Some(category_id) = payload.category {
        ensure_category(&state, category_id).await?;
    }
    if let Some(Some(company_id)) = payload.company {
        ensure_company(&state, company_id).await?;
    }

    product::update(&state.pool, id, &payload)
        .await
        .map_err(map_write_error)?;
    tracing::info!(product_id = id, seller_id = current_user.id(), "Product updated");

    let row = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(build_detail(&state, row, &media).await?))
}
