//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User roles. Stored as plain text; a user starts out as `unset` until the
/// role-selection call picks `renter` or `host`.
pub mod roles {
    pub const UNSET: &str = "unset";
    pub const RENTER: &str = "renter";
    pub const HOST: &str = "host";

    /// The roles a user may select for themselves.
    pub fn is_selectable(role: &str) -> bool {
        role == RENTER || role == HOST
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectable_roles() {
        assert!(roles::is_selectable("renter"));
        assert!(roles::is_selectable("host"));
        assert!(!roles::is_selectable("unset"));
        assert!(!roles::is_selectable("admin"));
        assert!(!roles::is_selectable(""));
    }
}
