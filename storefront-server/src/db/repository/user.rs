//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{ProfileUpdate, User, UserCreate};
use shared::util::now_millis;
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, phone_number, first_name, last_name, location, password_hash, is_verified, is_active, is_staff, date_joined, updated_at FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_phone(pool: &SqlitePool, phone_number: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE phone_number = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO user (phone_number, first_name, last_name, location, password_hash, is_staff, date_joined, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.phone_number)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.location)
    .bind(&data.password_hash)
    .bind(data.is_staff)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!(
            "User with phone number {} already exists",
            data.phone_number
        )),
        other => other,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update_profile(pool: &SqlitePool, id: i64, data: ProfileUpdate) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE user SET first_name = COALESCE(?1, first_name), last_name = COALESCE(?2, last_name), location = COALESCE(?3, location), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.first_name)
    .bind(data.last_name)
    .bind(data.location)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn test_phone_number_is_unique() {
        let pool = testing::pool().await;
        let user = testing::seller(&pool, "+998901234567").await;
        assert!(user.is_active);
        assert!(!user.is_verified);

        let dup = create(
            &pool,
            UserCreate {
                phone_number: "+998901234567".into(),
                first_name: "B".into(),
                last_name: "C".into(),
                location: None,
                password_hash: "x".into(),
                is_staff: false,
            },
        )
        .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let pool = testing::pool().await;
        let user = testing::seller(&pool, "+998901234567").await;
        let updated = update_profile(
            &pool,
            user.id,
            ProfileUpdate {
                location: Some("Tashkent".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.first_name, "Ali");
        assert_eq!(updated.location.as_deref(), Some("Tashkent"));

        let found = find_by_phone(&pool, "+998901234567").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }
}
