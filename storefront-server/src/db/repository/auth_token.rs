//! Auth Token Repository
//!
//! One opaque token per user, created on first login and removed on logout.

use super::RepoResult;
use rand::RngCore;
use shared::models::User;
use shared::util::now_millis;
use sqlx::SqlitePool;

/// 20 random bytes rendered as 40 hex characters
fn generate_token() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Return the user's token, creating it if none exists
pub async fn get_or_create(pool: &SqlitePool, user_id: i64) -> RepoResult<String> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO auth_token (token, user_id, created_at) VALUES (?, ?, ?) ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(&token)
    .bind(user_id)
    .bind(now_millis())
    .execute(pool)
    .await?;
    let stored: String = sqlx::query_scalar("SELECT token FROM auth_token WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(stored)
}

/// Resolve a presented token to its user
pub async fn find_user(pool: &SqlitePool, token: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT u.id, u.phone_number, u.first_name, u.last_name, u.location, u.password_hash, u.is_verified, u.is_active, u.is_staff, u.date_joined, u.updated_at FROM auth_token t JOIN user u ON u.id = t.user_id WHERE t.token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Delete the user's token; `false` when there was none
pub async fn delete_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM auth_token WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
