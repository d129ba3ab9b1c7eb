//! Database initialization
//!
//! Creates the database on first run, applies pragmas, the baseline
//! schema, versioned migrations and default settings. Safe to call on
//! every startup.

use crate::auth::ANONYMOUS_USER_GUID;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Wait out short write locks instead of erroring immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema_version_table(&pool).await?;
    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;
    create_settings_table(&pool).await?;
    create_user_profiles_table(&pool).await?;
    create_trend_submissions_table(&pool).await?;
    create_trend_votes_table(&pool).await?;
    create_earnings_ledger_table(&pool).await?;
    create_xp_events_table(&pool).await?;

    // Versioned migrations for databases created by older builds
    crate::db::migrations::run_migrations(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create Anonymous user if it doesn't exist (read-only access only)
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (guid, username, password_hash, password_salt)
        VALUES (?, 'Anonymous', '', '')
        "#,
    )
    .bind(ANONYMOUS_USER_GUID.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            user_guid TEXT PRIMARY KEY REFERENCES users(guid),
            performance_tier TEXT NOT NULL DEFAULT 'learning',
            session_streak INTEGER NOT NULL DEFAULT 0,
            daily_streak INTEGER NOT NULL DEFAULT 0,
            last_submission_at TIMESTAMP,
            last_active_date TEXT,
            approved_count INTEGER NOT NULL DEFAULT 0,
            rejected_count INTEGER NOT NULL DEFAULT 0,
            total_earned REAL NOT NULL DEFAULT 0,
            pending_earnings REAL NOT NULL DEFAULT 0,
            paid_earnings REAL NOT NULL DEFAULT 0,
            total_xp INTEGER NOT NULL DEFAULT 0,
            current_level INTEGER NOT NULL DEFAULT 1,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_trend_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trend_submissions (
            guid TEXT PRIMARY KEY,
            spotter_guid TEXT NOT NULL REFERENCES users(guid),
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            evidence TEXT NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'submitted'
                CHECK (status IN ('submitted', 'validating', 'validated', 'rejected')),
            approve_count INTEGER NOT NULL DEFAULT 0 CHECK (approve_count >= 0),
            reject_count INTEGER NOT NULL DEFAULT 0 CHECK (reject_count >= 0),
            validation_count INTEGER NOT NULL DEFAULT 0 CHECK (validation_count >= 0),
            payment_amount REAL NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_spotter ON trend_submissions(spotter_guid)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_status ON trend_submissions(status)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_trend_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trend_votes (
            guid TEXT PRIMARY KEY,
            submission_guid TEXT NOT NULL REFERENCES trend_submissions(guid),
            voter_guid TEXT NOT NULL REFERENCES users(guid),
            vote TEXT NOT NULL CHECK (vote IN ('approve', 'reject')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (submission_guid, voter_guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_votes_submission ON trend_votes(submission_guid)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_earnings_ledger_table(pool: &SqlitePool) -> Result<()> {
    // Append-only: the application never updates or deletes rows
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS earnings_ledger (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid),
            amount REAL NOT NULL,
            entry_type TEXT NOT NULL CHECK (entry_type IN ('submission', 'validation', 'bonus')),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'paid')),
            submission_guid TEXT REFERENCES trend_submissions(guid),
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ledger_user ON earnings_ledger(user_guid)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_xp_events_table(pool: &SqlitePool) -> Result<()> {
    // Append-only, amounts may be negative (rejection penalty)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS xp_events (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid),
            amount INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            submission_guid TEXT REFERENCES trend_submissions(guid),
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_xp_user ON xp_events(user_guid)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Seed default settings on first run
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    let defaults: [(&str, &str); 2] = [
        ("submission_rate_limit_per_hour", "20"),
        ("validation_threshold", "3"),
    ];

    for (key, value) in defaults {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_all_tables() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();

        for table in [
            "users",
            "sessions",
            "settings",
            "user_profiles",
            "trend_submissions",
            "trend_votes",
            "earnings_ledger",
            "xp_events",
            "schema_version",
        ] {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert!(exists, "missing table: {}", table);
        }
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wavesight.db");
        let pool = init_database(&path).await.unwrap();
        drop(pool);
        // Second init against the same file must succeed
        init_database(&path).await.unwrap();
    }

    #[tokio::test]
    async fn anonymous_user_is_seeded() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'Anonymous'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn vote_uniqueness_enforced() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();

        let spotter = crate::auth::create_user(&pool, "spotter", "password1")
            .await
            .unwrap();
        let voter = crate::auth::create_user(&pool, "voter", "password1")
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO trend_submissions (guid, spotter_guid, category, description) VALUES ('s1', ?, 'meme_format', 'a trend')",
        )
        .bind(spotter.to_string())
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO trend_votes (guid, submission_guid, voter_guid, vote) VALUES ('v1', 's1', ?, 'approve')",
        )
        .bind(voter.to_string())
        .execute(&pool)
        .await
        .unwrap();

        let duplicate = sqlx::query(
            "INSERT INTO trend_votes (guid, submission_guid, voter_guid, vote) VALUES ('v2', 's1', ?, 'reject')",
        )
        .bind(voter.to_string())
        .execute(&pool)
        .await;
        assert!(duplicate.is_err());
    }
}
