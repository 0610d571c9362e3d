//! Category API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/categories | GET, POST | POST: token |
//! | /api/categories/tree | GET | none |
//! | /api/categories/root | GET | none |
//! | /api/categories/popular | GET | none |
//! | /api/categories/empty | GET | none |
//! | /api/categories/search_suggestions | GET | none |
//! | /api/categories/filters | GET | none |
//! | /api/categories/{id} | GET, PUT | PUT: token |
//! | /api/categories/{id}/tree | GET | none |
//! | /api/categories/{id}/subcategories | GET | none |
//! | /api/categories/{id}/products | GET | none |
//! | /api/categories/{id}/stats | GET | none |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/tree", get(handler::tree))
        .route("/root", get(handler::roots))
        .route("/popular", get(handler::popular))
        .route("/empty", get(handler::empty))
        .route("/search_suggestions", get(handler::search_suggestions))
        .route("/filters", get(handler::filters))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/tree", get(handler::subtree))
        .route("/{id}/subcategories", get(handler::subcategories))
        .route("/{id}/products", get(handler::products))
        .route("/{id}/stats", get(handler::stats))
}
