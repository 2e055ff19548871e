//! Booking models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Booking lifecycle states. A booking is created as `pending`; the host of
/// the referenced property moves it to one of the other states. Only
/// `confirmed` bookings participate in the overlap-conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub property_id: i64,
    pub renter_id: i64,
    /// ISO date, inclusive start of the stay
    pub check_in_date: String,
    /// ISO date, exclusive end of the stay
    pub check_out_date: String,
    pub status: BookingStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: i64,
    pub check_in_date: String,
    pub check_out_date: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let status: BookingStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"confirmed\"");
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<BookingStatus>("\"approved\"").is_err());
    }
}
