//! Google OAuth login, server-side sessions, and the request extractors that
//! gate protected routes.
//!
//! The session cookie carries an opaque random token; only its SHA-256 hash
//! is stored, and expiry is enforced in the lookup query.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::{roles, users, DbPool, Session, UpdateRoleRequest, User};
use crate::AppState;

use super::error::ApiError;

const SESSION_COOKIE: &str = "lodgr_session";
const STATE_COOKIE: &str = "lodgr_oauth_state";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session row for `user_id` and return the raw token.
pub async fn create_session(
    pool: &DbPool,
    user_id: i64,
    ttl_days: i64,
) -> Result<String, sqlx::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);

    // SQLite datetime() format, so the expiry comparison in lookups is exact
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(ttl_days))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let session_id = uuid::Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(user_id)
        .bind(&token_hash)
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve the user behind a session token, rejecting expired sessions.
pub async fn get_current_user(pool: &DbPool, token: &str) -> Result<User, ApiError> {
    let token_hash = hash_token(token);
    let session: Option<Session> = sqlx::query_as(
        "SELECT * FROM sessions WHERE token_hash = ? AND expires_at > datetime('now')",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let session = session.ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    users::find_by_id(pool, session.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Start the Google OAuth flow.
///
/// GET /auth/google
pub async fn google_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let oauth_state = generate_token();

    let url = reqwest::Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", state.config.auth.google_client_id.as_str()),
            ("redirect_uri", state.config.auth.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", oauth_state.as_str()),
        ],
    )
    .map_err(|_| ApiError::internal("Failed to build authorization URL"))?;

    let state_cookie = Cookie::build((STATE_COOKIE, oauth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(state_cookie), Redirect::to(url.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    id: String,
    email: String,
    #[serde(default)]
    name: String,
}

/// Handle the redirect back from Google: verify state, exchange the code,
/// resolve or create the local user, and establish a session.
///
/// GET /auth/google/callback
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let expected = jar
        .get(STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Missing OAuth state"))?;
    if expected != query.state {
        return Err(ApiError::unauthorized("OAuth state mismatch"));
    }

    let client = reqwest::Client::new();

    let token: TokenResponse = client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("client_id", state.config.auth.google_client_id.as_str()),
            (
                "client_secret",
                state.config.auth.google_client_secret.as_str(),
            ),
            ("code", query.code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", state.config.auth.redirect_url.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let profile: GoogleProfile = client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let name = if profile.name.is_empty() {
        profile.email.clone()
    } else {
        profile.name.clone()
    };

    let user = users::find_or_create(&state.db, &profile.id, &profile.email, &name).await?;

    let token = create_session(&state.db, user.id, state.config.auth.session_ttl_days).await?;

    tracing::info!(user_id = user.id, "User logged in");

    let jar = jar
        .remove(Cookie::build(STATE_COOKIE).path("/").build())
        .add(session_cookie(token));

    Ok((jar, Redirect::to(&state.config.auth.frontend_url)))
}

/// Destroy the session and clear the cookie.
///
/// GET /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let token_hash = hash_token(cookie.value());
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&state.db)
            .await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Redirect::to(&state.config.auth.frontend_url)))
}

/// Current user record.
///
/// GET /auth/me
pub async fn me(user: User) -> Json<User> {
    Json(user)
}

/// Select the caller's role.
///
/// PUT /auth/role
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<User>, ApiError> {
    if !roles::is_selectable(&req.role) {
        return Err(ApiError::validation_field(
            "role",
            "Role must be either 'renter' or 'host'",
        ));
    }

    let updated = users::update_role(&state.db, user.id, &req.role)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = updated.id, role = %updated.role, "User role updated");
    Ok(Json(updated))
}

/// Extractor for the current authenticated user. Rejects with 401 when the
/// session cookie is missing, expired, or unresolvable.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
        get_current_user(&state.db, &token).await
    }
}

/// Extractor for routes that require the host role. Authentication is
/// checked first by delegating to the `User` extractor, then the role; a
/// logged-in non-host gets 403.
pub struct Host(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Host {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = User::from_request_parts(parts, state).await?;
        if user.role != roles::HOST {
            return Err(ApiError::forbidden("Host access required"));
        }
        Ok(Host(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, test_pool};

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_hash_is_stable_and_distinct() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        // Raw token never equals what gets stored
        assert_ne!(hash_token("abc"), "abc");
    }

    #[tokio::test]
    async fn session_round_trip() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "g-1", "renter").await;

        let token = create_session(&pool, user_id, 7).await.unwrap();
        let user = get_current_user(&pool, &token).await.unwrap();
        assert_eq!(user.id, user_id);

        assert!(get_current_user(&pool, "bogus-token").await.is_err());
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "g-2", "renter").await;

        let token = generate_token();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at)
             VALUES (?, ?, ?, '2000-01-01 00:00:00')",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(hash_token(&token))
        .execute(&pool)
        .await
        .unwrap();

        assert!(get_current_user(&pool, &token).await.is_err());
    }

    #[tokio::test]
    async fn logout_deletes_only_the_matching_session() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "g-3", "renter").await;

        let keep = create_session(&pool, user_id, 7).await.unwrap();
        let discard = create_session(&pool, user_id, 7).await.unwrap();

        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(&discard))
            .execute(&pool)
            .await
            .unwrap();

        assert!(get_current_user(&pool, &keep).await.is_ok());
        assert!(get_current_user(&pool, &discard).await.is_err());
    }
}
