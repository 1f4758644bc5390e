//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: hour records and derived daily summaries
    r#"
    -- ============================================
    -- Canonical: one row per (date, hour) pair
    -- ============================================

    CREATE TABLE IF NOT EXISTS hour_records (
        id          TEXT PRIMARY KEY,    -- "YYYY-MM-DD-HH"
        date        TEXT NOT NULL,       -- "YYYY-MM-DD", for exact-match and range queries
        hour        INTEGER NOT NULL,    -- 0-23
        date_time   TEXT NOT NULL,
        rating      INTEGER,             -- 1-5, NULL when not yet rated
        tags        JSON NOT NULL,
        notes       TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,

        UNIQUE(date, hour)
    );

    CREATE INDEX IF NOT EXISTS idx_hour_records_date ON hour_records(date);
    CREATE INDEX IF NOT EXISTS idx_hour_records_rated
        ON hour_records(date) WHERE rating IS NOT NULL;

    -- ============================================
    -- Derived: recomputed on every rating write
    -- ============================================

    CREATE TABLE IF NOT EXISTS daily_summaries (
        date                   TEXT PRIMARY KEY,
        total_hours_rated      INTEGER NOT NULL,
        achievement_percentage REAL NOT NULL,
        average_rating         REAL NOT NULL,
        peak_hours             JSON NOT NULL,
        low_hours              JSON NOT NULL,
        top_tags               JSON NOT NULL,
        insights               JSON NOT NULL,
        wins                   JSON NOT NULL,
        challenges             JSON NOT NULL,
        journal_entry          TEXT,     -- authored by the user, survives recomputation
        created_at             TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_daily_summaries_achievement
        ON daily_summaries(achievement_percentage);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
