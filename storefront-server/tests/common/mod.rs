//! In-process test harness: the full router over an in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use storefront_server::{Config, ServerState, api};
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

pub const PASSWORD: &str = "Tashkent#2024";

pub struct TestApp {
    pub state: ServerState,
    service: NormalizePath<Router>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_delivery_fee(Decimal::ZERO).await
    }

    pub async fn with_delivery_fee(fee: Decimal) -> Self {
        let mut config = Config::with_database(":memory:");
        config.delivery_fee = fee;
        let state = ServerState::in_memory(config).await.unwrap();
        let service = api::build_service(state.clone());
        Self { state, service }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "localhost:8000");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Token {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.service.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await.unwrap()
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await.unwrap()
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await.unwrap()
    }

    /// Register a user and return its token
    pub async fn register(&self, phone: &str) -> String {
        let (status, body) = self
            .post(
                "/api/accounts/register",
                None,
                json!({
                    "phone_number": phone,
                    "first_name": "Ali",
                    "last_name": "Valiyev",
                    "password": PASSWORD,
                    "password_confirm": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn category(&self, token: &str, name: &str, parent: Option<i64>) -> i64 {
        let (status, body) = self
            .post(
                "/api/categories",
                Some(token),
                json!({ "name": name, "parent": parent }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn product(&self, token: &str, code: &str, price: &str, category: i64, in_stock: bool) -> i64 {
        let (status, body) = self
            .post(
                "/api/products",
                Some(token),
                json!({
                    "title": format!("Product {code}"),
                    "seller_code": code,
                    "price": price,
                    "category": category,
                    "in_stock": in_stock,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

/// Money fields arrive as JSON strings or numbers
pub fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

pub fn error_code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap()
}
