mod models;

pub mod bookings;
pub mod properties;
pub mod users;

pub use bookings::BookingError;
pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("lodgr.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: users, properties, bookings
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    // Migration 002: sessions table
    let has_sessions_table: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='sessions'",
    )
    .fetch_optional(pool)
    .await?;
    if has_sessions_table.is_none() {
        execute_sql(pool, include_str!("../../migrations/002_sessions.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A fresh in-memory database with the full schema applied. Shared-cache
    /// mode so every pool connection sees the same database.
    pub async fn test_pool() -> DbPool {
        let db_url = format!(
            "sqlite:file:{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .expect("failed to open in-memory database");
        run_migrations(&pool).await.expect("migrations failed");
        pool
    }

    /// Insert a user and return its id.
    pub async fn insert_user(pool: &DbPool, google_id: &str, role: &str) -> i64 {
        sqlx::query("INSERT INTO users (google_id, email, name, role) VALUES (?, ?, ?, ?)")
            .bind(google_id)
            .bind(format!("{google_id}@example.com"))
            .bind(google_id)
            .bind(role)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    /// Insert a property owned by `host_id` and return its id.
    pub async fn insert_property(pool: &DbPool, host_id: i64) -> i64 {
        sqlx::query(
            "INSERT INTO properties (host_id, title, description, price_per_night, location)
             VALUES (?, 'Seaside cottage', 'Two bedrooms by the water', 120.0, 'Brighton')",
        )
        .bind(host_id)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }
}
