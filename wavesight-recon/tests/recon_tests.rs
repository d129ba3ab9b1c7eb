//! Integration tests for the reconciliation passes
//!
//! Each test seeds a fresh database, deliberately corrupts a denormalized
//! snapshot or counter, runs reconciliation and asserts the ledgers won.

use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;
use wavesight_common::db::init_database;
use wavesight_common::rewards::RewardsConfig;
use wavesight_recon::reconcile;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("tempdir");
    let pool = init_database(&dir.path().join("wavesight.db"))
        .await
        .expect("init database");
    (dir, pool)
}

async fn seed_user(pool: &SqlitePool, username: &str) -> String {
    let guid = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, '', '')",
    )
    .bind(&guid)
    .bind(username)
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO user_profiles (user_guid) VALUES (?)")
        .bind(&guid)
        .execute(pool)
        .await
        .unwrap();
    guid
}

async fn seed_submission(pool: &SqlitePool, spotter: &str, status: &str) -> String {
    let guid = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO trend_submissions (guid, spotter_guid, category, description, status)
        VALUES (?, ?, 'meme_format', 'seed submission for reconciliation tests', ?)
        "#,
    )
    .bind(&guid)
    .bind(spotter)
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
    guid
}

async fn seed_ledger(pool: &SqlitePool, user: &str, amount: f64, status: &str) {
    sqlx::query(
        r#"
        INSERT INTO earnings_ledger (guid, user_guid, amount, entry_type, status)
        VALUES (?, ?, ?, 'submission', ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user)
    .bind(amount)
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_xp(pool: &SqlitePool, user: &str, amount: i64) {
    sqlx::query(
        "INSERT INTO xp_events (guid, user_guid, amount, event_type) VALUES (?, ?, ?, 'submission')",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user)
    .bind(amount)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_vote(pool: &SqlitePool, submission: &str, voter: &str, direction: &str) {
    sqlx::query(
        "INSERT INTO trend_votes (guid, submission_guid, voter_guid, vote) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(submission)
    .bind(voter)
    .bind(direction)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn clean_database_reports_no_drift() {
    let (_dir, pool) = setup_db().await;
    seed_user(&pool, "spotter").await;

    let report = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert!(!report.drift_found());
    assert!(report.profiles_checked >= 1);
}

#[tokio::test]
async fn earnings_snapshot_repaired_from_ledger() {
    let (_dir, pool) = setup_db().await;
    let user = seed_user(&pool, "spotter").await;
    seed_ledger(&pool, &user, 0.25, "pending").await;
    seed_ledger(&pool, &user, 1.0, "paid").await;

    // Corrupt the snapshot
    sqlx::query("UPDATE user_profiles SET total_earned = 99.0, pending_earnings = 50.0 WHERE user_guid = ?")
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();

    let report = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert_eq!(report.earnings_repaired, 1);

    let (total, pending, paid): (f64, f64, f64) = sqlx::query_as(
        "SELECT total_earned, pending_earnings, paid_earnings FROM user_profiles WHERE user_guid = ?",
    )
    .bind(&user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!((total - 1.25).abs() < 1e-9);
    assert!((pending - 0.25).abs() < 1e-9);
    assert!((paid - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn xp_totals_floor_at_zero() {
    let (_dir, pool) = setup_db().await;
    let user = seed_user(&pool, "spotter").await;
    seed_xp(&pool, &user, -50).await;
    sqlx::query("UPDATE user_profiles SET total_xp = 100, current_level = 2 WHERE user_guid = ?")
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();

    let report = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert_eq!(report.xp_repaired, 1);

    let (xp, level): (i64, i64) =
        sqlx::query_as("SELECT total_xp, current_level FROM user_profiles WHERE user_guid = ?")
            .bind(&user)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(xp, 0);
    assert_eq!(level, 1);
}

#[tokio::test]
async fn vote_counters_and_status_rederived() {
    let (_dir, pool) = setup_db().await;
    let author = seed_user(&pool, "author").await;
    let v1 = seed_user(&pool, "voter1").await;
    let v2 = seed_user(&pool, "voter2").await;
    let v3 = seed_user(&pool, "voter3").await;

    // Votes landed but the counter updates were lost
    let submission = seed_submission(&pool, &author, "validating").await;
    seed_vote(&pool, &submission, &v1, "approve").await;
    seed_vote(&pool, &submission, &v2, "approve").await;
    seed_vote(&pool, &submission, &v3, "reject").await;

    let report = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert_eq!(report.submissions_repaired, 1);

    let (approve, reject, total, status): (i64, i64, i64, String) = sqlx::query_as(
        "SELECT approve_count, reject_count, validation_count, status FROM trend_submissions WHERE guid = ?",
    )
    .bind(&submission)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((approve, reject, total), (2, 1, 3));
    assert_eq!(total, approve + reject);
    assert_eq!(status, "validated");
}

#[tokio::test]
async fn tie_at_threshold_rederives_as_rejected() {
    let (_dir, pool) = setup_db().await;
    let author = seed_user(&pool, "author").await;
    let v1 = seed_user(&pool, "voter1").await;
    let v2 = seed_user(&pool, "voter2").await;

    let submission = seed_submission(&pool, &author, "validating").await;
    seed_vote(&pool, &submission, &v1, "approve").await;
    seed_vote(&pool, &submission, &v2, "reject").await;

    let rewards = RewardsConfig {
        validation_threshold: 2,
        ..RewardsConfig::default()
    };
    reconcile(&pool, &rewards).await.unwrap();

    let status: String = sqlx::query_scalar("SELECT status FROM trend_submissions WHERE guid = ?")
        .bind(&submission)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "rejected");
}

#[tokio::test]
async fn tiers_reevaluated_from_decided_submissions() {
    let (_dir, pool) = setup_db().await;
    let author = seed_user(&pool, "author").await;
    for _ in 0..12 {
        seed_submission(&pool, &author, "validated").await;
    }

    let report = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert_eq!(report.tiers_changed, 1);

    let (tier, approved): (String, i64) = sqlx::query_as(
        "SELECT performance_tier, approved_count FROM user_profiles WHERE user_guid = ?",
    )
    .bind(&author)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(approved, 12);
    assert_eq!(tier, "verified");
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
    let (_dir, pool) = setup_db().await;
    let user = seed_user(&pool, "spotter").await;
    seed_ledger(&pool, &user, 0.25, "pending").await;
    sqlx::query("UPDATE user_profiles SET total_earned = 5.0 WHERE user_guid = ?")
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();

    let first = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert!(first.drift_found());
    let second = reconcile(&pool, &RewardsConfig::default()).await.unwrap();
    assert!(!second.drift_found());
}
