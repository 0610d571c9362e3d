//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | GET, POST | token |
//! | /api/orders/{id} | GET | owner or staff |
//! | /api/orders/{id}/cancel | POST | owner |
//! | /api/orders/{id}/status | PUT | staff |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", put(handler::update_status))
}
