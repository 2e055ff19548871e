//! Property listing models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub description: String,
    pub price_per_night: f64,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for both create and update; the registry always writes the full set
/// of listing fields.
#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price_per_night: f64,
    pub location: String,
}
