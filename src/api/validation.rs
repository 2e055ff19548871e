//! Request validation helpers.

use chrono::NaiveDate;

/// Parse an ISO `YYYY-MM-DD` date field.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field} must be a date in YYYY-MM-DD format"))
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if title.len() > 200 {
        return Err("Title is too long (max 200 characters)".to_string());
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.len() > 2000 {
        return Err("Description is too long (max 2000 characters)".to_string());
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), String> {
    if location.trim().is_empty() {
        return Err("Location is required".to_string());
    }
    if location.len() > 200 {
        return Err("Location is too long (max 200 characters)".to_string());
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("Price per night must be a positive number".to_string());
    }
    Ok(())
}
