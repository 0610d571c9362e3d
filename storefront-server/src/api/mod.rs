//! API routing
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`accounts`] - registration, login, profile
//! - [`companies`] - company directory
//! - [`categories`] - category tree
//! - [`products`] - product catalog
//! - [`orders`] - order ledger

pub mod convert;

pub mod accounts;
pub mod health;

// Catalog API
pub mod categories;
pub mod companies;
pub mod products;

pub mod orders;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;
use crate::middleware;

/// UUID v4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(accounts::router())
        .merge(companies::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(orders::router())
}

/// Router with the full middleware stack
pub fn build_app() -> Router<ServerState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}

/// The app as served: `/api/products/` and `/api/products` reach the same route
///
/// Trailing slashes are trimmed before routing, so this wraps the router
/// instead of being one of its layers.
pub fn build_service(state: ServerState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(build_app().with_state(state))
}
