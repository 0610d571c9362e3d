mod common;

use common::{TestApp, dec, error_code, money};
use http::StatusCode;
use serde_json::json;
use storefront_server::ErrorCode;

#[tokio::test]
async fn test_category_tree_and_breadcrumbs() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let electronics = app.category(&token, "Electronics", None).await;
    let phones = app.category(&token, "Phones", Some(electronics)).await;
    let smartphones = app.category(&token, "Smartphones", Some(phones)).await;

    let (status, body) = app.get(&format!("/api/categories/{smartphones}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let trail: Vec<&str> = body["breadcrumbs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(trail, ["Electronics", "Phones", "Smartphones"]);
    assert_eq!(body["parent_name"], "Phones");

    // Two levels only: roots with their direct children
    let (status, body) = app.get("/api/categories/tree", None).await;
    assert_eq!(status, StatusCode::OK);
    let roots = body.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["name"], "Phones");
}

#[tokio::test]
async fn test_reparenting_rejects_cycles() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let root = app.category(&token, "Electronics", None).await;
    let child = app.category(&token, "Phones", Some(root)).await;
    let grandchild = app.category(&token, "Smartphones", Some(child)).await;

    let (status, body) = app
        .put(&format!("/api/categories/{root}"), Some(&token), json!({ "parent": grandchild }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::CategoryCircularParent.code()));

    let (status, body) = app
        .put(&format!("/api/categories/{child}"), Some(&token), json!({ "parent": child }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::CategorySelfParent.code()));

    // Moving a leaf to the root level is fine
    let (status, body) = app
        .put(&format!("/api/categories/{grandchild}"), Some(&token), json!({ "parent": null }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["parent"].is_null());
}

#[tokio::test]
async fn test_category_write_requires_token() {
    let app = TestApp::new().await;
    let (status, _) = app.post("/api/categories", None, json!({ "name": "Books" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_price_and_stock_filter() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Electronics", None).await;
    app.product(&token, "CHEAP-1", "5.00", category, true).await;
    let wanted = app.product(&token, "MID-1", "25.00", category, true).await;
    app.product(&token, "MID-2", "45.00", category, false).await;
    app.product(&token, "HIGH-1", "60.00", category, true).await;

    let (status, body) = app
        .get("/api/products?min_price=10&max_price=50&in_stock=true", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], wanted);
    assert_eq!(money(&body["results"][0]["price"]), dec("25.00"));
    assert_eq!(body["filters_applied"]["min_price"], "10");
    assert_eq!(body["filters_applied"]["in_stock"], "true");

    // Malformed filters are ignored
    let (status, body) = app.get("/api/products?min_price=abc&in_stock=maybe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
}

#[tokio::test]
async fn test_listing_defaults_to_newest_first() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Books", None).await;
    let first = app.product(&token, "BOOK-1", "10.00", category, true).await;
    let second = app.product(&token, "BOOK-2", "12.00", category, true).await;

    let (_, body) = app.get("/api/products", None).await;
    assert_eq!(body["results"][0]["id"], second);
    assert_eq!(body["results"][1]["id"], first);

    let (_, body) = app.get("/api/products?ordering=price", None).await;
    assert_eq!(body["results"][0]["id"], first);
}

#[tokio::test]
async fn test_category_filter_covers_direct_children() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let root = app.category(&token, "Electronics", None).await;
    let child = app.category(&token, "Phones", Some(root)).await;
    let grandchild = app.category(&token, "Smartphones", Some(child)).await;
    app.product(&token, "ROOT-1", "10.00", root, true).await;
    app.product(&token, "CHILD-1", "10.00", child, true).await;
    app.product(&token, "DEEP-1", "10.00", grandchild, true).await;

    let (_, body) = app.get(&format!("/api/products?category={root}"), None).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_seller_code_must_be_unique() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Electronics", None).await;
    let first = app.product(&token, "SKU-1", "10.00", category, true).await;
    app.product(&token, "SKU-2", "10.00", category, true).await;

    let (status, body) = app
        .post(
            "/api/products",
            Some(&token),
            json!({ "title": "Copy", "seller_code": "SKU-1", "price": "3.00", "category": category }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::SellerCodeExists.code()));

    // Keeping its own code is not a conflict
    let (status, _) = app
        .put(
            &format!("/api/products/{first}"),
            Some(&token),
            json!({ "seller_code": "SKU-1", "title": "Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&format!("/api/products/{first}"), Some(&token), json!({ "seller_code": "SKU-2" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::SellerCodeExists.code()));
}

#[tokio::test]
async fn test_only_seller_updates_product() {
    let app = TestApp::new().await;
    let seller = app.register("+998901234567").await;
    let other = app.register("+998907654321").await;
    let category = app.category(&seller, "Electronics", None).await;
    let product = app.product(&seller, "SKU-1", "10.00", category, true).await;

    let (status, body) = app
        .put(&format!("/api/products/{product}"), Some(&other), json!({ "title": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), u64::from(ErrorCode::NotProductSeller.code()));
}

#[tokio::test]
async fn test_inactive_products_are_hidden() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Electronics", None).await;
    let visible = app.product(&token, "SKU-1", "10.00", category, true).await;
    let hidden = app.product(&token, "SKU-2", "10.00", category, true).await;

    let (status, _) = app
        .put(&format!("/api/products/{hidden}"), Some(&token), json!({ "is_active": false }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/products", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], visible);

    let (status, _) = app.get(&format!("/api/products/{hidden}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&format!("/api/categories/{category}"), None).await;
    assert_eq!(body["product_count"], 1);
}

#[tokio::test]
async fn test_product_detail_with_images_and_specifications() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Electronics", None).await;

    let (status, body) = app
        .post(
            "/api/products",
            Some(&token),
            json!({
                "title": "Galaxy S24",
                "seller_code": "SGS24",
                "price": "899.99",
                "category": category,
                "brand": "Samsung",
                "images": [
                    { "image": "products/front.jpg", "order": 0 },
                    { "image": "products/back.jpg", "is_primary": true, "order": 1 }
                ],
                "specifications": [
                    { "name": "RAM", "value": "8 GB", "order": 0 },
                    { "name": "Storage", "value": "256 GB", "order": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
        body["primary_image"],
        "http://localhost:8000/media/products/back.jpg"
    );
    assert_eq!(body["images"].as_array().unwrap().len(), 2);
    assert_eq!(body["specifications"][0]["name"], "RAM");
    assert_eq!(body["seller_name"], "Ali Valiyev");

    let (status, body) = app
        .post(
            "/api/products",
            Some(&token),
            json!({
                "title": "Dup specs",
                "seller_code": "DUP-1",
                "price": "1.00",
                "category": category,
                "specifications": [
                    { "name": "RAM", "value": "8 GB" },
                    { "name": "RAM", "value": "16 GB" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_code(&body),
        u64::from(ErrorCode::SpecificationNameDuplicate.code())
    );
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Electronics", None).await;
    app.product(&token, "IPHONE-15", "999.00", category, true).await;

    let (status, body) = app.get("/api/products/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::SearchQueryRequired.code()));

    let (status, body) = app.get("/api/products/search?q=iphone", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["query"], "iphone");
}

#[tokio::test]
async fn test_related_prefers_same_brand() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Phones", None).await;

    let mut ids = Vec::new();
    for (code, brand) in [("A-1", "Apple"), ("A-2", "Apple"), ("S-1", "Samsung")] {
        let (status, body) = app
            .post(
                "/api/products",
                Some(&token),
                json!({ "title": code, "seller_code": code, "price": "100.00", "category": category, "brand": brand }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["id"].as_i64().unwrap());
    }

    let (status, body) = app.get(&format!("/api/products/{}/related", ids[0]), None).await;
    assert_eq!(status, StatusCode::OK);
    let related = body.as_array().unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["id"], ids[1]);

    let (_, body) = app.get(&format!("/api/products/{}/similar", ids[2]), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_category_stats() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Phones", None).await;
    app.product(&token, "P-1", "10.00", category, true).await;
    app.product(&token, "P-2", "20.00", category, false).await;

    let (status, body) = app.get(&format!("/api/categories/{category}/stats"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["product_count"], 2);
    assert_eq!(money(&body["price_stats"]["min"]), dec("10.00"));
    assert_eq!(money(&body["price_stats"]["max"]), dec("20.00"));
    assert_eq!(money(&body["price_stats"]["avg"]), dec("15.00"));
    assert_eq!(body["stock"]["in_stock"], 1);
    assert_eq!(body["stock"]["out_of_stock"], 1);
}

#[tokio::test]
async fn test_pagination_past_the_end() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;
    let category = app.category(&token, "Phones", None).await;
    app.product(&token, "P-1", "10.00", category, true).await;

    let (status, body) = app.get("/api/products?page=9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(body["results"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/products?page=abc", None).await;
    assert_eq!(body["page"], 1);
}
