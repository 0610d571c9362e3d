//! Product API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/products | GET, POST | POST: token |
//! | /api/products/search | GET | none |
//! | /api/products/featured | GET | none |
//! | /api/products/latest | GET | none |
//! | /api/products/popular | GET | none |
//! | /api/products/in_stock | GET | none |
//! | /api/products/out_of_stock | GET | none |
//! | /api/products/filters | GET | none |
//! | /api/products/search_suggestions | GET | none |
//! | /api/products/{id} | GET, PUT | PUT: seller token |
//! | /api/products/{id}/related | GET | none |
//! | /api/products/{id}/similar | GET | none |
//! | /api/products/{id}/images | GET | none |
//! | /api/products/{id}/specifications | GET | none |

mod handler;

use axum::{Router, routing::get};
use shared::AppResult;

use crate::core::ServerState;
use crate::db::repository::category;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/search", get(handler::search))
        .route("/featured", get(handler::featured))
        .route("/latest", get(handler::latest))
        .route("/popular", get(handler::popular))
        .route("/in_stock", get(handler::in_stock))
        .route("/out_of_stock", get(handler::out_of_stock))
        .route("/filters", get(handler::filters))
        .route("/search_suggestions", get(handler::search_suggestions))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/related", get(handler::related))
        .route("/{id}/similar", get(handler::related))
        .route("/{id}/images", get(handler::images))
        .route("/{id}/specifications", get(handler::specifications))
}

/// A category filter covers the category and its active direct children
pub async fn category_scope(state: &ServerState, category_id: i64) -> AppResult<Vec<i64>> {
    let children = category::find_active_children(&state.pool, category_id).await?;
    let mut ids = Vec::with_capacity(children.len() + 1);
    ids.push(category_id);
    ids.extend(children.iter().map(|c| c.category.id));
    Ok(ids)
}
