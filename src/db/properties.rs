//! The property registry: listing CRUD, mutations scoped to the owning host.

use super::models::{Property, PropertyRequest};
use super::DbPool;

/// Outcome of a deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyDelete {
    Deleted,
    /// The property still has pending or confirmed bookings.
    ActiveBookings,
    /// Absent, or not owned by the calling host. The two are not
    /// distinguished.
    NotFound,
}

pub async fn get_all(pool: &DbPool) -> Result<Vec<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create a listing owned by `host_id` and return the persisted row.
pub async fn create(
    pool: &DbPool,
    host_id: i64,
    data: &PropertyRequest,
) -> Result<Property, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO properties
            (host_id, title, description, price_per_night, location, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(host_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.price_per_night)
    .bind(&data.location)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    tracing::info!(property_id = property.id, host_id, "Property created");
    Ok(property)
}

/// Update a listing. The write only matches when `host_id` owns the
/// property; otherwise nothing changes and `None` is returned, which the API
/// surfaces as a uniform not-found.
pub async fn update(
    pool: &DbPool,
    id: i64,
    host_id: i64,
    data: &PropertyRequest,
) -> Result<Option<Property>, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE properties
        SET title = ?, description = ?, price_per_night = ?, location = ?, updated_at = ?
        WHERE id = ? AND host_id = ?
        "#,
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.price_per_night)
    .bind(&data.location)
    .bind(&now)
    .bind(id)
    .bind(host_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

/// Delete a listing. Blocked while the property has pending or confirmed
/// bookings; cancelled and rejected bookings do not hold the listing alive.
pub async fn delete(pool: &DbPool, id: i64, host_id: i64) -> Result<PropertyDelete, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM properties
        WHERE id = ? AND host_id = ?
          AND NOT EXISTS (
              SELECT 1 FROM bookings
              WHERE bookings.property_id = properties.id
                AND bookings.status IN ('pending', 'confirmed')
          )
        "#,
    )
    .bind(id)
    .bind(host_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(property_id = id, host_id, "Property deleted");
        return Ok(PropertyDelete::Deleted);
    }

    // Distinguish "blocked by bookings" from "not yours / not there", but
    // only for properties this host actually owns.
    let owned: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM properties WHERE id = ? AND host_id = ?")
            .bind(id)
            .bind(host_id)
            .fetch_optional(pool)
            .await?;

    match owned {
        Some(_) => Ok(PropertyDelete::ActiveBookings),
        None => Ok(PropertyDelete::NotFound),
    }
}
