//! Property API endpoints. Listings are publicly readable; mutations require
//! the host role and are scoped to the owning host.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{properties, properties::PropertyDelete, Property, PropertyRequest};
use crate::AppState;

use super::auth::Host;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_description, validate_location, validate_price, validate_title};

fn validate_request(req: &PropertyRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_title(&req.title) {
        errors.add("title", e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }
    if let Err(e) = validate_location(&req.location) {
        errors.add("location", e);
    }
    if let Err(e) = validate_price(req.price_per_night) {
        errors.add("price_per_night", e);
    }

    errors.finish()
}

/// List all properties.
///
/// GET /api/properties
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = properties::get_all(&state.db).await?;
    Ok(Json(properties))
}

/// Get a property by id.
///
/// GET /api/properties/:id
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Property>, ApiError> {
    let property = properties::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    Ok(Json(property))
}

/// Create a listing owned by the calling host.
///
/// POST /api/properties
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Json(req): Json<PropertyRequest>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    validate_request(&req)?;

    let property = properties::create(&state.db, host.id, &req).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// Update a listing. A listing owned by someone else reads as absent.
///
/// PUT /api/properties/:id
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Path(id): Path<i64>,
    Json(req): Json<PropertyRequest>,
) -> Result<Json<Property>, ApiError> {
    validate_request(&req)?;

    let property = properties::update(&state.db, id, host.id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    Ok(Json(property))
}

/// Delete a listing. Refused while pending or confirmed bookings exist.
///
/// DELETE /api/properties/:id
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    match properties::delete(&state.db, id, host.id).await? {
        PropertyDelete::Deleted => Ok(StatusCode::NO_CONTENT),
        PropertyDelete::ActiveBookings => Err(ApiError::conflict(
            "Property has active bookings and cannot be deleted",
        )),
        PropertyDelete::NotFound => Err(ApiError::not_found("Property not found")),
    }
}
