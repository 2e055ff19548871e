pub mod auth;
mod bookings;
mod error;
mod properties;
mod validation;

pub use error::{ApiError, ErrorCode, ErrorResponse};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
        .route("/logout", get(auth::logout))
        .route("/me", get(auth::me))
        .route("/role", put(auth::update_role));

    let property_routes = Router::new()
        .route("/", get(properties::list_properties))
        .route("/", post(properties::create_property))
        .route("/:id", get(properties::get_property))
        .route("/:id", put(properties::update_property))
        .route("/:id", delete(properties::delete_property));

    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/user", get(bookings::get_user_bookings))
        .route("/:id/status", put(bookings::update_booking_status));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/bookings", booking_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
