//! XP event log access
//!
//! XP is append-only like the earnings ledger. The profile's total_xp and
//! current_level columns are snapshots refreshed on each append by summing
//! the event log and flooring at zero, the same derivation the
//! reconciliation job uses, so a rejection penalty cannot push a user
//! negative and the two never disagree.

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;
use wavesight_common::db::models::XpEvent;
use wavesight_common::xp::level_for_xp;
use wavesight_common::Result;

/// Append an XP event and refresh the user's profile snapshot
pub async fn append_event(
    conn: &mut SqliteConnection,
    user_guid: Uuid,
    amount: i64,
    event_type: &str,
    submission_guid: Option<Uuid>,
) -> Result<Uuid> {
    let guid = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO xp_events (guid, user_guid, amount, event_type, submission_guid, metadata)
        VALUES (?, ?, ?, ?, ?, '{}')
        "#,
    )
    .bind(guid.to_string())
    .bind(user_guid.to_string())
    .bind(amount)
    .bind(event_type)
    .bind(submission_guid.map(|g| g.to_string()))
    .execute(&mut *conn)
    .await?;

    let summed: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM xp_events WHERE user_guid = ?")
            .bind(user_guid.to_string())
            .fetch_one(&mut *conn)
            .await?;
    let total_xp = summed.max(0);

    sqlx::query("UPDATE user_profiles SET total_xp = ?, current_level = ? WHERE user_guid = ?")
        .bind(total_xp)
        .bind(level_for_xp(total_xp))
        .bind(user_guid.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(guid)
}

/// List a user's XP events, newest first
pub async fn events_for_user(db: &SqlitePool, user_guid: Uuid, limit: i64) -> Result<Vec<XpEvent>> {
    let events = sqlx::query_as::<_, XpEvent>(
        r#"
        SELECT guid, user_guid, amount, event_type, submission_guid, metadata, created_at
        FROM xp_events
        WHERE user_guid = ?
        ORDER BY created_at DESC, guid DESC
        LIMIT ?
        "#,
    )
    .bind(user_guid.to_string())
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(events)
}

/// Sum a user's XP events, floored at zero
pub async fn total_for_user(db: &SqlitePool, user_guid: Uuid) -> Result<i64> {
    let total: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM xp_events WHERE user_guid = ?")
            .bind(user_guid.to_string())
            .fetch_one(db)
            .await?;

    Ok(total.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wavesight_common::db::init_database;

    async fn seed_user(pool: &SqlitePool) -> Uuid {
        let guid = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, 'spotter', '', '')",
        )
        .bind(guid.to_string())
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO user_profiles (user_guid) VALUES (?)")
            .bind(guid.to_string())
            .execute(pool)
            .await
            .unwrap();
        guid
    }

    async fn profile_xp(pool: &SqlitePool, user: Uuid) -> (i64, i64) {
        sqlx::query_as("SELECT total_xp, current_level FROM user_profiles WHERE user_guid = ?")
            .bind(user.to_string())
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn snapshot_is_floored_sum_not_per_event_floor() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("wavesight.db")).await.unwrap();
        let user = seed_user(&pool).await;

        // A penalty with no prior gains leaves the visible total at zero,
        // but the event log still carries the -10.
        let mut conn = pool.acquire().await.unwrap();
        append_event(&mut conn, user, -10, "rejection", None).await.unwrap();
        assert_eq!(profile_xp(&pool, user).await, (0, 1));

        // A later gain is offset by the logged penalty. Flooring per event
        // instead would report 25 here and disagree with the event sum.
        append_event(&mut conn, user, 25, "submission", None).await.unwrap();
        assert_eq!(profile_xp(&pool, user).await, (15, 1));
        assert_eq!(total_for_user(&pool, user).await.unwrap(), 15);
    }
}

