//! Accounts API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/accounts/register | POST | none |
//! | /api/accounts/login | POST | none |
//! | /api/accounts/logout | POST | token |
//! | /api/accounts/profile | GET, PUT | token |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/accounts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/profile", get(handler::profile).put(handler::update_profile))
}
