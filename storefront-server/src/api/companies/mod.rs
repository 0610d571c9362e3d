//! Company API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/companies | GET | none |
//! | /api/companies/{id} | GET | none |
//! | /api/companies/{id}/categories | GET | none |
//! | /api/companies/{id}/products | GET | none |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/companies", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/categories", get(handler::categories))
        .route("/{id}/products", get(handler::products))
}
