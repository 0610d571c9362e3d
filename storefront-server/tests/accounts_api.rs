mod common;

use common::{PASSWORD, TestApp, error_code};
use http::StatusCode;
use serde_json::json;
use storefront_server::ErrorCode;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_returns_token_and_profile() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/accounts/register",
            None,
            json!({
                "phone_number": "+998901234567",
                "first_name": "Ali",
                "last_name": "Valiyev",
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token"].as_str().unwrap().len(), 40);
    assert_eq!(body["user"]["phone_number"], "+998901234567");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/accounts/register",
            None,
            json!({
                "phone_number": "+998901234567",
                "first_name": "Ali",
                "last_name": "Valiyev",
                "password": PASSWORD,
                "password_confirm": "Samarkand#2024",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::PasswordMismatch.code()));
}

#[tokio::test]
async fn test_register_rejects_common_password() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/accounts/register",
            None,
            json!({
                "phone_number": "+998901234567",
                "first_name": "Ali",
                "last_name": "Valiyev",
                "password": "password",
                "password_confirm": "password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::PasswordTooWeak.code()));
}

#[tokio::test]
async fn test_register_duplicate_phone() {
    let app = TestApp::new().await;
    app.register("+998901234567").await;
    let (status, body) = app
        .post(
            "/api/accounts/register",
            None,
            json!({
                "phone_number": "+998901234567",
                "first_name": "Vali",
                "last_name": "Aliyev",
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::PhoneNumberExists.code()));
}

#[tokio::test]
async fn test_login_profile_logout() {
    let app = TestApp::new().await;
    let registered = app.register("+998901234567").await;

    let (status, body) = app
        .post(
            "/api/accounts/login",
            None,
            json!({ "phone_number": "+998901234567", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token, registered);

    let (status, body) = app.get("/api/accounts/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ali");

    let (status, _) = app.post("/api/accounts/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/accounts/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    app.register("+998901234567").await;
    let (status, _) = app
        .post(
            "/api/accounts/login",
            None,
            json!({ "phone_number": "+998901234567", "password": "Wrong#2024x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_phone_matches_wrong_password() {
    let app = TestApp::new().await;
    app.register("+998901234567").await;

    let (status, wrong) = app
        .post(
            "/api/accounts/login",
            None,
            json!({ "phone_number": "+998901234567", "password": "Wrong#2024x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = app
        .post(
            "/api/accounts/login",
            None,
            json!({ "phone_number": "+998907777777", "password": "Wrong#2024x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong);

    let (status, _) = app
        .post(
            "/api/accounts/login",
            None,
            json!({ "phone_number": "not a phone", "password": "Wrong#2024x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new().await;
    let (status, _) = app.get("/api/accounts/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_rejects_read_only_fields() {
    let app = TestApp::new().await;
    let token = app.register("+998901234567").await;

    let (status, body) = app
        .put(
            "/api/accounts/profile",
            Some(&token),
            json!({ "phone_number": "+998907654321" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), u64::from(ErrorCode::ReadOnlyField.code()));

    let (status, body) = app
        .put(
            "/api/accounts/profile",
            Some(&token),
            json!({ "location": "Tashkent" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Tashkent");
    assert_eq!(body["phone_number"], "+998901234567");
}
