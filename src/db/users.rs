//! User persistence, keyed by the Google subject id.

use super::models::User;
use super::DbPool;

pub async fn find_by_google_id(
    pool: &DbPool,
    google_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = ?")
        .bind(google_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create a user on first login. Role starts as the table default (`unset`);
/// the row is re-read by id to pick that up.
pub async fn create(
    pool: &DbPool,
    google_id: &str,
    email: &str,
    name: &str,
) -> Result<User, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (google_id, email, name) VALUES (?, ?, ?)")
        .bind(google_id)
        .bind(email)
        .bind(name)
        .execute(pool)
        .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    tracing::info!(user_id = user.id, "User created");
    Ok(user)
}

/// Resolve the user for a Google profile, creating it on first login.
pub async fn find_or_create(
    pool: &DbPool,
    google_id: &str,
    email: &str,
    name: &str,
) -> Result<User, sqlx::Error> {
    if let Some(user) = find_by_google_id(pool, google_id).await? {
        return Ok(user);
    }
    create(pool, google_id, email, name).await
}

/// Set the user's role and return the updated record, or `None` if the user
/// is gone.
pub async fn update_role(
    pool: &DbPool,
    id: i64,
    role: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id).await
}
