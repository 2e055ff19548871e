//! The booking ledger.
//!
//! Enforces the no-double-booking invariant: for a fixed property, no two
//! `confirmed` bookings may cover overlapping `[check_in, check_out)`
//! intervals. Two half-open intervals overlap exactly when
//! `a.check_in < b.check_out AND a.check_out > b.check_in`; every conflict
//! query below uses that canonical form.
//!
//! Both mutations that can introduce a confirmed booking (creation against
//! an existing confirmed range, and the pending-to-confirmed transition)
//! embed the conflict check in the write statement itself, so the check and
//! the mutation commit atomically under SQLite's writer lock. There is no
//! read-then-write window for two racing requests to slip through.

use chrono::NaiveDate;
use thiserror::Error;

use super::models::{Booking, BookingStatus};
use super::DbPool;

/// Domain failures of the ledger, kept distinct from infrastructure failures
/// so the API layer can map them to different responses.
#[derive(Debug, Error)]
pub enum BookingError {
    /// A confirmed booking already covers part of the requested range.
    #[error("property is already booked for these dates")]
    Conflict,
    /// Check-in must fall strictly before check-out.
    #[error("check-in date must be before check-out date")]
    InvalidDates,
    /// The requested status is not a valid target for a host decision.
    #[error("bookings cannot be moved back to pending")]
    InvalidStatus,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Create a booking for `renter_id` on `property_id`.
///
/// The new booking starts out `pending`. The insert is guarded by the
/// conflict check in a single statement; when a confirmed booking overlaps
/// the requested range, nothing is written and `BookingError::Conflict` is
/// returned. On success the persisted row is re-read by id so the caller
/// sees server-computed defaults (status, timestamps).
pub async fn create(
    pool: &DbPool,
    property_id: i64,
    renter_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Booking, BookingError> {
    if check_in >= check_out {
        return Err(BookingError::InvalidDates);
    }

    let check_in = check_in.format("%Y-%m-%d").to_string();
    let check_out = check_out.format("%Y-%m-%d").to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO bookings
            (property_id, renter_id, check_in_date, check_out_date, status, created_at, updated_at)
        SELECT ?, ?, ?, ?, 'pending', ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM bookings
            WHERE property_id = ?
              AND status = 'confirmed'
              AND check_in_date < ?
              AND check_out_date > ?
        )
        "#,
    )
    .bind(property_id)
    .bind(renter_id)
    .bind(&check_in)
    .bind(&check_out)
    .bind(&now)
    .bind(&now)
    .bind(property_id)
    .bind(&check_out)
    .bind(&check_in)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(BookingError::Conflict);
    }

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    tracing::info!(
        booking_id = booking.id,
        property_id,
        renter_id,
        "Booking created"
    );

    Ok(booking)
}

/// Fetch a booking by id.
pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Booking>, BookingError> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(booking)
}

/// Move a booking to `status` on behalf of `host_id`.
///
/// Authorization is embedded in the update: the statement only matches when
/// the booking's property is owned by `host_id`. Returns `Ok(false)` both
/// when the booking does not exist and when it belongs to another host's
/// property; the two cases are deliberately indistinguishable so a host
/// cannot probe for bookings on properties they do not own.
///
/// Confirming additionally re-checks the overlap invariant against every
/// other confirmed booking on the property, inside the same statement. A
/// confirmation blocked by an overlap surfaces as `BookingError::Conflict`.
pub async fn update_status(
    pool: &DbPool,
    id: i64,
    host_id: i64,
    status: BookingStatus,
) -> Result<bool, BookingError> {
    if status == BookingStatus::Pending {
        return Err(BookingError::InvalidStatus);
    }

    let now = chrono::Utc::now().to_rfc3339();

    let result = if status == BookingStatus::Confirmed {
        sqlx::query(
            r#"
            UPDATE bookings SET status = 'confirmed', updated_at = ?
            WHERE id = ?
              AND property_id IN (SELECT id FROM properties WHERE host_id = ?)
              AND NOT EXISTS (
                  SELECT 1 FROM bookings other
                  WHERE other.property_id = bookings.property_id
                    AND other.id <> bookings.id
                    AND other.status = 'confirmed'
                    AND other.check_in_date < bookings.check_out_date
                    AND other.check_out_date > bookings.check_in_date
              )
            "#,
        )
        .bind(&now)
        .bind(id)
        .bind(host_id)
        .execute(pool)
        .await?
    } else {
        sqlx::query(
            r#"
            UPDATE bookings SET status = ?, updated_at = ?
            WHERE id = ?
              AND property_id IN (SELECT id FROM properties WHERE host_id = ?)
            "#,
        )
        .bind(status)
        .bind(&now)
        .bind(id)
        .bind(host_id)
        .execute(pool)
        .await?
    };

    if result.rows_affected() > 0 {
        tracing::info!(booking_id = id, status = %status, "Booking status updated");
        return Ok(true);
    }

    if status == BookingStatus::Confirmed {
        // The guarded update matched nothing. If the booking exists and this
        // host owns it, the overlap guard is what blocked it.
        let owned: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT b.id FROM bookings b
            JOIN properties p ON p.id = b.property_id
            WHERE b.id = ? AND p.host_id = ?
            "#,
        )
        .bind(id)
        .bind(host_id)
        .fetch_optional(pool)
        .await?;

        if owned.is_some() {
            return Err(BookingError::Conflict);
        }
    }

    Ok(false)
}

/// All bookings made by `renter_id`, in every status.
pub async fn get_user_bookings(
    pool: &DbPool,
    renter_id: i64,
) -> Result<Vec<Booking>, BookingError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE renter_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(renter_id)
    .fetch_all(pool)
    .await?;
    Ok(bookings)
}
