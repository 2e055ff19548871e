//! Booking API endpoints: thin adapters over the booking ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{bookings, Booking, CreateBookingRequest, UpdateBookingStatusRequest, User};
use crate::AppState;

use super::auth::Host;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::parse_date;

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub message: String,
}

/// Create a booking for the authenticated user.
///
/// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    let check_in = match parse_date(&req.check_in_date, "check_in_date") {
        Ok(date) => Some(date),
        Err(e) => {
            errors.add("check_in_date", e);
            None
        }
    };
    let check_out = match parse_date(&req.check_out_date, "check_out_date") {
        Ok(date) => Some(date),
        Err(e) => {
            errors.add("check_out_date", e);
            None
        }
    };
    if req.property_id <= 0 {
        errors.add("property_id", "property_id must be a positive integer");
    }
    errors.finish()?;

    // Both dates parsed, or finish() would have returned above
    let (check_in, check_out) = (check_in.unwrap(), check_out.unwrap());

    let booking =
        bookings::create(&state.db, req.property_id, user.id, check_in, check_out).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Adjudicate a booking on one of the caller's properties.
///
/// PUT /api/bookings/:id/status
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let updated = bookings::update_status(&state.db, id, host.id, req.status).await?;

    if !updated {
        // Absent and not-owned deliberately look the same
        return Err(ApiError::not_found("Booking not found"));
    }

    Ok(Json(UpdateStatusResponse {
        message: "Booking status updated successfully".to_string(),
    }))
}

/// All bookings made by the authenticated user, in every status.
///
/// GET /api/bookings/user
pub async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = bookings::get_user_bookings(&state.db, user.id).await?;
    Ok(Json(bookings))
}
