mod common;

use common::{TestApp, dec, error_code, money};
use http::StatusCode;
use serde_json::{Value, json};
use storefront_server::ErrorCode;

async fn catalog(app: &TestApp, token: &str) -> (i64, i64) {
    let category = app.category(token, "Electronics", None).await;
    let cable = app.product(token, "CABLE-1", "15.00", category, true).await;
    let charger = app.product(token, "CHARGER-1", "30.00", category, true).await;
    (cable, charger)
}

fn order_body(items: Value) -> Value {
    json!({
        "payment_method": "cash",
        "delivery_address": "Tashkent, Amir Temur 1",
        "delivery_phone": "+998901234567",
        "items": items,
    })
}

#[tokio::test]
async fn test_order_totals_include_delivery_fee() {
    let app = TestApp::with_delivery_fee(dec("5.00")).await;
    let token = app.register("+998901234567").await;
    let (cable, charger) = catalog(&app, &token).await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            order_body(json!([
                { "product": cable, "quantity": 2 },
                { "product": charger, "quantity": 1 }
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(money(&body["subtotal"]), dec("60.00"));
    assert_eq!(money(&body["delivery_fee"]), dec("5.00"));
    assert_eq!(money(&body["total_amount"]), dec("65.00"));
    assert_eq!(body["status"], "pending");
    assert_eq!(money(&body["items"][0]["total_price"]), dec("30.00"));

    let number = body["order_number"].as_str().unwrap();
    assert!(number.starts_with("ORD-"));
    assert_eq!(number.len(), 12);
}

#[tokio::test]
async fn test_order_keeps_price_snapshot() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let (cable, _) = catalog(&app, &token).await;

    let (_, body) = app
        .post(
            "/api/orders",
            Some(&token),
            order_body(json!([{ "product": cable, "quantity": 3 }])),
        )
        .await;
    let order_id = body["id"].as_i64().unwrap();

    let (status, _) = app
        .put(&format!("/api/products/{cable}"), Some(&token), json!({ "price": "99.00" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/orders/{order_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["items"][0]["price"]), dec("15.00"));
    assert_eq!(money(&body["items"][0]["total_price"]), dec("45.00"));
    assert_eq!(money(&body["total_amount"]), dec("45.00"));
}

#[tokio::test]
async fn test_order_validation() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let (cable, _) = catalog(&app, &token).await;

    let (status, body) = app.post("/api/orders", Some(&token), order_body(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::OrderEmpty.code()));

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            order_body(json!([{ "product": cable, "quantity": 0 }])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::OrderInvalidQuantity.code()));

    let mut bad_payment = order_body(json!([{ "product": cable, "quantity": 1 }]));
    bad_payment["payment_method"] = json!("card");
    let (status, body) = app.post("/api/orders", Some(&token), bad_payment).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::PaymentInvalidMethod.code()));

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            order_body(json!([{ "product": 9999, "quantity": 1 }])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::OrderProductUnavailable.code()));

    let (_, body) = app.get("/api/orders", Some(&token)).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_order_quantity_limits() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Jewellery", None).await;
    let gold = app.product(&token, "GOLD-1", "99999999", category, true).await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            order_body(json!([{ "product": gold, "quantity": 2_147_483_648_i64 }])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::ValidationFailed.code()));
    assert!(body["details"]["items"].is_array(), "{body}");

    let lines: Vec<Value> = (0..100)
        .map(|_| json!({ "product": gold, "quantity": 2_147_483_647_i64 }))
        .collect();
    let (status, body) = app
        .post("/api/orders", Some(&token), order_body(Value::Array(lines)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::ValidationFailed.code()));

    let (_, body) = app.get("/api/orders", Some(&token)).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_orders_are_private() {
    let app = TestApp::new().await;
    let owner = app.register("+998901234567").await;
    let stranger = app.register("+998907654321").await;
    let (cable, _) = catalog(&app, &owner).await;

    let (_, body) = app
        .post(
            "/api/orders",
            Some(&owner),
            order_body(json!([{ "product": cable, "quantity": 1 }])),
        )
        .await;
    let order_id = body["id"].as_i64().unwrap();

    let (status, _) = app.get(&format!("/api/orders/{order_id}"), Some(&stranger)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/orders", Some(&stranger)).await;
    assert_eq!(body["count"], 0);

    let (_, body) = app.get("/api/orders", Some(&owner)).await;
    assert_eq!(body["count"], 1);

    let (status, _) = app.get("/api/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cancel_and_status_transitions() {
    let app = TestApp::new().await;
    let owner = app.register("+998901234567").await;
    let staff = app.register("+998907654321").await;
    sqlx::query("UPDATE user SET is_staff = 1 WHERE phone_number = ?")
        .bind("+998907654321")
        .execute(&app.state.pool)
        .await
        .unwrap();
    let (cable, _) = catalog(&app, &owner).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let (_, body) = app
            .post(
                "/api/orders",
                Some(&owner),
                order_body(json!([{ "product": cable, "quantity": 1 }])),
            )
            .await;
        ids.push(body["id"].as_i64().unwrap());
    }

    // Customers cannot drive the status
    let (status, body) = app
        .put(&format!("/api/orders/{}/status", ids[0]), Some(&owner), json!({ "status": "shipped" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), u64::from(ErrorCode::StaffRequired.code()));

    let (status, body) = app
        .put(&format!("/api/orders/{}/status", ids[0]), Some(&staff), json!({ "status": "shipped" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "shipped");

    // No going back
    let (status, body) = app
        .put(&format!("/api/orders/{}/status", ids[0]), Some(&staff), json!({ "status": "pending" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::OrderInvalidTransition.code()));

    let (status, body) = app
        .post(&format!("/api/orders/{}/cancel", ids[1]), Some(&owner), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = app
        .post(&format!("/api/orders/{}/cancel", ids[1]), Some(&owner), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::OrderInvalidTransition.code()));
}
