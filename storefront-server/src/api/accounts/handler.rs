//! Accounts API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::models::{
    AuthResponse, LoginRequest, ProfileUpdate, READ_ONLY_PROFILE_FIELDS, RegisterRequest,
    UserCreate, UserProfile,
};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::policy::{self, UserAttributes};
use crate::auth::{CurrentUser, hash_password, verify_password, verify_unknown_account};
use crate::core::ServerState;
use crate::db::repository::{RepoError, auth_token, user};
use crate::security_log;
use crate::utils::phone;
use crate::utils::validation::{
    MAX_PASSWORD_LEN, MAX_PERSON_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Hash off the async runtime; Argon2 is deliberately slow
async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
}

/// POST /api/accounts/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_required_text(&payload.phone_number, "phone_number", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.first_name, "first_name", MAX_PERSON_NAME_LEN)?;
    validate_required_text(&payload.last_name, "last_name", MAX_PERSON_NAME_LEN)?;
    validate_required_text(&payload.password, "password", MAX_PASSWORD_LEN)?;
    validate_optional_text(payload.location.as_deref(), "location", MAX_SHORT_TEXT_LEN)?;

    let phone_number = phone::normalize(&payload.phone_number).ok_or_else(|| {
        AppError::field(
            ErrorCode::PhoneNumberInvalid,
            "phone_number",
            "The phone number entered is not valid.",
        )
    })?;

    if payload.password != payload.password_confirm {
        return Err(AppError::field(
            ErrorCode::PasswordMismatch,
            "password_confirm",
            "Passwords do not match.",
        ));
    }

    let first_name = payload.first_name.trim().to_string();
    let last_name = payload.last_name.trim().to_string();
    let attributes = UserAttributes {
        phone_number: &phone_number,
        first_name: &first_name,
        last_name: &last_name,
    };
    if let Err(messages) = policy::validate(&payload.password, &attributes) {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooWeak,
            messages.join(" "),
        )
        .with_field_errors("password", messages));
    }

    let phone_taken = || {
        AppError::field(
            ErrorCode::PhoneNumberExists,
            "phone_number",
            "A user with this phone number already exists.",
        )
    };
    if user::find_by_phone(&state.pool, &phone_number).await?.is_some() {
        return Err(phone_taken());
    }

    let password_hash = hash_blocking(payload.password).await?;
    let location = payload
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    let created = user::create(
        &state.pool,
        UserCreate {
            phone_number,
            first_name,
            last_name,
            location,
            password_hash,
            is_staff: false,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => phone_taken(),
        other => other.into(),
    })?;

    let token = auth_token::get_or_create(&state.pool, created.id).await?;
    tracing::info!(user_id = created.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".into(),
            user: UserProfile::from(&created),
            token,
        }),
    ))
}

/// POST /api/accounts/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (Some(raw_phone), Some(password)) = (
        payload.phone_number.filter(|p| !p.trim().is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Phone number and password are required",
        ));
    };

    let found = match phone::normalize(&raw_phone) {
        Some(phone_number) => user::find_by_phone(&state.pool, &phone_number).await?,
        None => None,
    };
    let Some(found) = found else {
        tokio::task::spawn_blocking(move || verify_unknown_account(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?;
        security_log!("WARN", "login_failed", reason = "unknown_phone");
        return Err(AppError::invalid_credentials());
    };

    if !verify_blocking(password, found.password_hash.clone()).await? {
        security_log!("WARN", "login_failed", reason = "bad_password", user_id = found.id);
        return Err(AppError::invalid_credentials());
    }
    if !found.is_active {
        security_log!("WARN", "login_failed", reason = "inactive", user_id = found.id);
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            "User account is disabled.",
        ));
    }

    let token = auth_token::get_or_create(&state.pool, found.id).await?;
    tracing::info!(user_id = found.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        user: UserProfile::from(&found),
        token,
    }))
}

/// POST /api/accounts/logout
///
/// Succeeds even when the token row is already gone.
pub async fn logout(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    let removed = auth_token::delete_for_user(&state.pool, current_user.id()).await?;
    tracing::info!(user_id = current_user.id(), removed, "User logged out");
    Ok(Json(MessageResponse {
        message: "Successfully logged out".into(),
    }))
}

/// GET /api/accounts/profile
pub async fn profile(current_user: CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(&current_user.0))
}

/// PUT /api/accounts/profile
///
/// Partial update of the editable fields; any read-only key fails the request.
pub async fn update_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<UserProfile>> {
    let read_only: Vec<&str> = READ_ONLY_PROFILE_FIELDS
        .iter()
        .copied()
        .filter(|field| payload.contains_key(*field))
        .collect();
    if !read_only.is_empty() {
        let mut err = AppError::with_message(
            ErrorCode::ReadOnlyField,
            format!("Read-only fields cannot be updated: {}", read_only.join(", ")),
        );
        for field in read_only {
            err = err.with_field_errors(field, ["This field is read-only."]);
        }
        return Err(err);
    }

    let update: ProfileUpdate = serde_json::from_value(Value::Object(payload))
        .map_err(|e| AppError::invalid_request(format!("Invalid profile payload: {e}")))?;
    if let Some(first_name) = &update.first_name {
        validate_required_text(first_name, "first_name", MAX_PERSON_NAME_LEN)?;
    }
    if let Some(last_name) = &update.last_name {
        validate_required_text(last_name, "last_name", MAX_PERSON_NAME_LEN)?;
    }
    validate_optional_text(update.location.as_deref(), "location", MAX_SHORT_TEXT_LEN)?;

    let update = ProfileUpdate {
        first_name: update.first_name.map(|s| s.trim().to_string()),
        last_name: update.last_name.map(|s| s.trim().to_string()),
        location: update.location.map(|s| s.trim().to_string()),
    };
    let updated = user::update_profile(&state.pool, current_user.id(), update).await?;
    Ok(Json(UserProfile::from(&updated)))
}
