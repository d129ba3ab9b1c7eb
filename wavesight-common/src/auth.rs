//! Authentication helpers: password hashing and session tokens
//!
//! Passwords are stored as SHA-256 of salt + password with a per-user
//! random salt. Sessions are opaque random bearer tokens stored in the
//! sessions table with an expiry.
//!
//! This module contains only pure functions and database operations. No
//! HTTP framework dependencies - those live in the API service.

use crate::{Error, Result};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Seeded read-only user, present in every database
pub const ANONYMOUS_USER_GUID: Uuid = Uuid::from_u128(1);

/// Default session lifetime in hours
pub const SESSION_TTL_HOURS: i64 = 24 * 7;

/// Hash a password with the given hex salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Generate a random hex salt (16 bytes)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Generate a random session token (32 bytes, hex)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create a user and their profile row
///
/// Fails with InvalidInput if the username is taken or empty.
pub async fn create_user(db: &SqlitePool, username: &str, password: &str) -> Result<Uuid> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }
    if password.len() < 8 {
        return Err(Error::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT guid FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await?;
    if existing.is_some() {
        return Err(Error::InvalidInput(format!(
            "username '{}' is already taken",
            username
        )));
    }

    let guid = Uuid::new_v4();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(guid.to_string())
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .execute(db)
    .await?;

    sqlx::query("INSERT INTO user_profiles (user_guid) VALUES (?)")
        .bind(guid.to_string())
        .execute(db)
        .await?;

    Ok(guid)
}

/// Verify a username/password pair, returning the user guid
pub async fn verify_password(db: &SqlitePool, username: &str, password: &str) -> Result<Uuid> {
    let row: Option<(String, String, String)> = sqlx::query_as(
        "SELECT guid, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db)
    .await?;

    let (guid, stored_hash, salt) = row.ok_or_else(|| {
        Error::Unauthorized("unknown username or wrong password".to_string())
    })?;

    if hash_password(password, &salt) != stored_hash {
        return Err(Error::Unauthorized(
            "unknown username or wrong password".to_string(),
        ));
    }

    Uuid::parse_str(&guid).map_err(|e| Error::Internal(format!("invalid user guid: {}", e)))
}

/// Issue a session token for a user
pub async fn create_session(db: &SqlitePool, user_guid: Uuid) -> Result<String> {
    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

    sqlx::query("INSERT INTO sessions (token, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_guid.to_string())
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok(token)
}

/// Resolve a session token to a user guid
///
/// Returns None for unknown or expired tokens. Expired tokens are removed.
pub async fn lookup_session(db: &SqlitePool, token: &str) -> Result<Option<Uuid>> {
    let row: Option<(String, chrono::DateTime<Utc>)> =
        sqlx::query_as("SELECT user_guid, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(db)
            .await?;

    match row {
        Some((guid, expires_at)) => {
            if expires_at < Utc::now() {
                sqlx::query("DELETE FROM sessions WHERE token = ?")
                    .bind(token)
                    .execute(db)
                    .await?;
                return Ok(None);
            }
            let guid = Uuid::parse_str(&guid)
                .map_err(|e| Error::Internal(format!("invalid user guid: {}", e)))?;
            Ok(Some(guid))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();
        (dir, pool)
    }

    #[test]
    fn hashing_is_salted() {
        let salt_a = generate_salt();
        let salt_b = generate_salt();
        assert_ne!(salt_a, salt_b);
        assert_ne!(
            hash_password("hunter22", &salt_a),
            hash_password("hunter22", &salt_b)
        );
        assert_eq!(
            hash_password("hunter22", &salt_a),
            hash_password("hunter22", &salt_a)
        );
    }

    #[tokio::test]
    async fn register_and_login() {
        let (_dir, pool) = test_db().await;
        let guid = create_user(&pool, "wavespotter", "correct horse").await.unwrap();
        let verified = verify_password(&pool, "wavespotter", "correct horse")
            .await
            .unwrap();
        assert_eq!(guid, verified);

        let err = verify_password(&pool, "wavespotter", "wrong").await;
        assert!(matches!(err, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let (_dir, pool) = test_db().await;
        create_user(&pool, "spotter", "password1").await.unwrap();
        let err = create_user(&pool, "spotter", "password2").await;
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn sessions_resolve_until_expiry() {
        let (_dir, pool) = test_db().await;
        let guid = create_user(&pool, "spotter", "password1").await.unwrap();
        let token = create_session(&pool, guid).await.unwrap();

        assert_eq!(lookup_session(&pool, &token).await.unwrap(), Some(guid));
        assert_eq!(lookup_session(&pool, "bogus-token").await.unwrap(), None);

        // Force-expire the session
        sqlx::query("UPDATE sessions SET expires_at = datetime('now', '-1 hour') WHERE token = ?")
            .bind(&token)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(lookup_session(&pool, &token).await.unwrap(), None);
    }
}
