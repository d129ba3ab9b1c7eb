//! Settings database access
//!
//! Read/write settings from the settings table (key-value store).
//! All settings are global/system-wide (not user-specific).

use crate::error::{Error, Result};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Generic setting getter
///
/// Returns None if key doesn't exist in database.
/// Parses value from string using FromStr trait.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();

        assert_eq!(get_setting::<i64>(&pool, "no_such_key").await.unwrap(), None);

        set_setting(&pool, "validation_threshold", 5i64).await.unwrap();
        assert_eq!(
            get_setting::<i64>(&pool, "validation_threshold").await.unwrap(),
            Some(5)
        );

        // Upsert overwrites
        set_setting(&pool, "validation_threshold", 7i64).await.unwrap();
        assert_eq!(
            get_setting::<i64>(&pool, "validation_threshold").await.unwrap(),
            Some(7)
        );
    }

    #[tokio::test]
    async fn unparsable_value_is_config_error() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();

        set_setting(&pool, "earnings_submission_base", "not-a-number")
            .await
            .unwrap();
        let result = get_setting::<f64>(&pool, "earnings_submission_base").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
