//! Database repository layer
//!
//! Provides query and upsert operations for hour records and daily summaries.

use crate::error::{Error, Result};
use crate::types::{DailySummary, HourRecord, Rating};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Database handle with a single serialized connection
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Hour record operations
    // ============================================

    /// Insert or replace the record for its (date, hour) slot.
    ///
    /// Every field is replaced except `created_at`, which keeps the stored
    /// value so the audit trail survives re-rating an hour.
    pub fn upsert_hour_record(&self, record: &HourRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO hour_records (id, date, hour, date_time, rating, tags, notes,
                                      created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                date_time = excluded.date_time,
                rating = excluded.rating,
                tags = excluded.tags,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
            params![
                record.id,
                record.date().format(DATE_FORMAT).to_string(),
                record.hour,
                record.date_time.format(DATE_TIME_FORMAT).to_string(),
                record.rating.map(|r| r.get()),
                serde_json::to_string(&record.tags)?,
                record.notes,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get an hour record by id
    pub fn get_hour_record(&self, id: &str) -> Result<Option<HourRecord>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM hour_records WHERE id = ?", [id], |row| {
            Self::row_to_hour_record(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// All hour records for a date (rated or not), ordered by hour ascending
    pub fn hour_records_for_date(&self, date: NaiveDate) -> Result<Vec<HourRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM hour_records WHERE date = ? ORDER BY hour ASC")?;
        let records = stmt
            .query_map([date.format(DATE_FORMAT).to_string()], Self::row_to_hour_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Hour records for a date with a non-null rating, ordered by hour ascending
    pub fn rated_hours_for_date(&self, date: NaiveDate) -> Result<Vec<HourRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM hour_records
             WHERE date = ? AND rating IS NOT NULL
             ORDER BY hour ASC",
        )?;
        let records = stmt
            .query_map([date.format(DATE_FORMAT).to_string()], Self::row_to_hour_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Mean of the date's non-null ratings, 0 when none exist
    pub fn average_rating_for_date(&self, date: NaiveDate) -> Result<f32> {
        let conn = self.conn.lock().unwrap();
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(rating) FROM hour_records WHERE date = ? AND rating IS NOT NULL",
            [date.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(avg.unwrap_or(0.0) as f32)
    }

    /// Delete an hour record by id
    pub fn delete_hour_record(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM hour_records WHERE id = ?", [id])?;
        Ok(())
    }

    fn row_to_hour_record(row: &Row) -> rusqlite::Result<HourRecord> {
        let date_time_str: String = row.get("date_time")?;
        let rating: Option<u8> = row.get("rating")?;
        let tags_str: String = row.get("tags")?;
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(HourRecord {
            id: row.get("id")?,
            date_time: NaiveDateTime::parse_from_str(&date_time_str, DATE_TIME_FORMAT)
                .unwrap_or_default(),
            hour: row.get("hour")?,
            rating: rating.and_then(|r| Rating::new(r).ok()),
            tags: serde_json::from_str(&tags_str).unwrap_or_default(),
            notes: row.get("notes")?,
            created_at: parse_utc(&created_at_str),
            updated_at: parse_utc(&updated_at_str),
        })
    }

    // ============================================
    // Daily summary operations
    // ============================================

    /// Insert or replace the summary for its date.
    ///
    /// The replace keeps the stored `journal_entry` and `created_at`: the
    /// journal is authored independently and must survive recomputation.
    pub fn upsert_summary(&self, summary: &DailySummary) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO daily_summaries (date, total_hours_rated, achievement_percentage,
                                         average_rating, peak_hours, low_hours, top_tags,
                                         insights, wins, challenges, journal_entry, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(date) DO UPDATE SET
                total_hours_rated = excluded.total_hours_rated,
                achievement_percentage = excluded.achievement_percentage,
                average_rating = excluded.average_rating,
                peak_hours = excluded.peak_hours,
                low_hours = excluded.low_hours,
                top_tags = excluded.top_tags,
                insights = excluded.insights,
                wins = excluded.wins,
                challenges = excluded.challenges
            "#,
            params![
                summary.date.format(DATE_FORMAT).to_string(),
                summary.total_hours_rated,
                summary.achievement_percentage,
                summary.average_rating,
                serde_json::to_string(&summary.peak_hours)?,
                serde_json::to_string(&summary.low_hours)?,
                serde_json::to_string(&summary.top_tags)?,
                serde_json::to_string(&summary.insights)?,
                serde_json::to_string(&summary.wins)?,
                serde_json::to_string(&summary.challenges)?,
                summary.journal_entry,
                summary.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Set (or clear) the user-authored journal entry for a date.
    ///
    /// Returns false when no summary exists for the date yet: the journal
    /// lives on the derived summary row, which only appears once at least one
    /// hour has been rated.
    pub fn set_journal_entry(&self, date: NaiveDate, entry: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE daily_summaries SET journal_entry = ?1 WHERE date = ?2",
            params![entry, date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(updated > 0)
    }

    /// Latest summary for a date, `None` when never computed
    pub fn summary_for_date(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM daily_summaries WHERE date = ?",
            [date.format(DATE_FORMAT).to_string()],
            Self::row_to_summary,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Summaries in the inclusive date range, newest first
    pub fn summaries_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM daily_summaries WHERE date BETWEEN ?1 AND ?2 ORDER BY date DESC",
        )?;
        let summaries = stmt
            .query_map(
                params![
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string()
                ],
                Self::row_to_summary,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// The most recent summaries, newest first
    pub fn recent_summaries(&self, limit: usize) -> Result<Vec<DailySummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM daily_summaries ORDER BY date DESC LIMIT ?")?;
        let summaries = stmt
            .query_map([limit as i64], Self::row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// Mean achievement percentage over the inclusive date range, `None` when
    /// the range holds no summaries
    pub fn average_achievement_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<f32>> {
        let conn = self.conn.lock().unwrap();
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(achievement_percentage) FROM daily_summaries WHERE date BETWEEN ?1 AND ?2",
            params![
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(avg.map(|a| a as f32))
    }

    /// Days with achievement at or above 80%, newest first
    pub fn excellent_days(&self) -> Result<Vec<DailySummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM daily_summaries WHERE achievement_percentage >= 80 ORDER BY date DESC",
        )?;
        let summaries = stmt
            .query_map([], Self::row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    fn row_to_summary(row: &Row) -> rusqlite::Result<DailySummary> {
        let date_str: String = row.get("date")?;
        let peak_str: String = row.get("peak_hours")?;
        let low_str: String = row.get("low_hours")?;
        let top_tags_str: String = row.get("top_tags")?;
        let insights_str: String = row.get("insights")?;
        let wins_str: String = row.get("wins")?;
        let challenges_str: String = row.get("challenges")?;
        let created_at_str: String = row.get("created_at")?;
        let achievement: f64 = row.get("achievement_percentage")?;
        let average: f64 = row.get("average_rating")?;

        Ok(DailySummary {
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT).unwrap_or_default(),
            total_hours_rated: row.get("total_hours_rated")?,
            achievement_percentage: achievement as f32,
            average_rating: average as f32,
            peak_hours: serde_json::from_str(&peak_str).unwrap_or_default(),
            low_hours: serde_json::from_str(&low_str).unwrap_or_default(),
            top_tags: serde_json::from_str(&top_tags_str).unwrap_or_default(),
            insights: serde_json::from_str(&insights_str).unwrap_or_default(),
            wins: serde_json::from_str(&wins_str).unwrap_or_default(),
            challenges: serde_json::from_str(&challenges_str).unwrap_or_default(),
            journal_entry: row.get("journal_entry")?,
            created_at: parse_utc(&created_at_str),
        })
    }
}

fn parse_utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
