//! Rating write path and daily summary recomputation
//!
//! This module orchestrates the flow from a single hour rating to the derived
//! daily summary.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌─────────────────────┐
//! │ save_hour_rating │ ──► │     Tracker      │ ──► │      Database       │
//! │  (UI/consumers)  │     │ (recompute/date) │     │ (records,summaries) │
//! └──────────────────┘     └──────────────────┘     └─────────────────────┘
//!                                  │
//!                                  ▼
//!                     ┌─────────────────────────┐
//!                     │  scoring + insight      │
//!                     │  (pure, stateless)      │
//!                     └─────────────────────────┘
//! ```
//!
//! Every successful write also publishes a [`StoreEvent`] on a broadcast
//! channel so UI consumers can re-read the affected date.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hourline_core::{Config, Database, Tracker};
//!
//! let db = Database::open(&Config::database_path())?;
//! db.migrate()?;
//! let tracker = Tracker::new(db);
//!
//! let mut events = tracker.subscribe();
//! tracker.save_hour_rating_now(9, 4, vec!["work".into()], None)?;
//! ```

use crate::db::Database;
use crate::error::{Error, Result};
use crate::insight;
use crate::scoring;
use crate::types::{DailySummary, HourRecord, Rating, StoreEvent};
use chrono::{Local, NaiveDate, Utc};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Buffered store events per subscriber before lagging kicks in
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Maximum entries kept in each summary list (top tags, insights, wins, challenges)
const SUMMARY_LIST_LIMIT: usize = 3;

/// Owns the rating write path and the derived-summary lifecycle.
///
/// The tracker is the only writer of daily summaries. Scoring and insight
/// generation are pure; all I/O goes through the [`Database`] handle. A
/// tracker is constructed once by the application's composition root and
/// shared by reference.
pub struct Tracker {
    db: Database,
    events: broadcast::Sender<StoreEvent>,
    /// Serializes the read-recompute-write sequence so two nearly simultaneous
    /// rating writes for the same date cannot lose each other's updates.
    recompute_lock: Mutex<()>,
}

impl Tracker {
    /// Create a tracker owning the given database handle
    pub fn new(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db,
            events,
            recompute_lock: Mutex::new(()),
        }
    }

    /// Read access to the underlying store
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Subscribe to change notifications.
    ///
    /// Each receiver sees every [`StoreEvent`] published after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ============================================
    // Rating write path
    // ============================================

    /// Save a rating for one hour of the given date.
    ///
    /// This is the single mutation entry point for hour ratings: the full
    /// record for the (date, hour) slot is replaced, then the date's summary
    /// is recomputed synchronously. The rating is validated before anything
    /// is persisted.
    pub fn save_hour_rating(
        &self,
        date: NaiveDate,
        hour: u8,
        rating: u8,
        tags: Vec<String>,
        notes: Option<String>,
    ) -> Result<HourRecord> {
        let rating = Rating::new(rating)?;
        let date_time = date
            .and_hms_opt(hour as u32, 0, 0)
            .ok_or(Error::InvalidHour(hour))?;

        let _guard = self.recompute_lock.lock().unwrap();

        let now = Utc::now();
        let record = HourRecord {
            id: HourRecord::record_id(date, hour),
            date_time,
            hour,
            rating: Some(rating),
            tags,
            notes,
            created_at: now,
            updated_at: now,
        };

        self.db.upsert_hour_record(&record)?;
        tracing::info!(
            id = %record.id,
            rating = rating.get(),
            tags = record.tags.len(),
            "Saved hour rating"
        );
        self.notify(StoreEvent::HourRecordSaved { date, hour });

        self.recompute_locked(date)?;

        Ok(record)
    }

    /// Save a rating for an hour of today's date (local time).
    pub fn save_hour_rating_now(
        &self,
        hour: u8,
        rating: u8,
        tags: Vec<String>,
        notes: Option<String>,
    ) -> Result<HourRecord> {
        self.save_hour_rating(Local::now().date_naive(), hour, rating, tags, notes)
    }

    // ============================================
    // Daily summary recomputation
    // ============================================

    /// Recompute the derived summary for a date.
    ///
    /// Returns the stored summary, or `None` when the date has no rated
    /// hours - in that case nothing is written and any previous summary is
    /// left untouched.
    pub fn recompute_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let _guard = self.recompute_lock.lock().unwrap();
        self.recompute_locked(date)
    }

    fn recompute_locked(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let rated = self.db.rated_hours_for_date(date)?;

        if rated.is_empty() {
            tracing::debug!(%date, "No rated hours, skipping summary recompute");
            return Ok(None);
        }

        let achievement = scoring::calculate_achievement_percentage(&rated);
        let average_rating = self.db.average_rating_for_date(date)?;

        let peak_hours: Vec<u8> = rated
            .iter()
            .filter(|r| r.rating.map_or(false, |rating| rating.is_peak()))
            .map(|r| r.hour)
            .collect();
        let low_hours: Vec<u8> = rated
            .iter()
            .filter(|r| r.rating.map_or(false, |rating| rating.is_low()))
            .map(|r| r.hour)
            .collect();

        let top_tags = top_tags(&rated);
        let insights =
            insight::generate_daily_insights(&rated, achievement, &peak_hours, &low_hours);

        let wins = collect_notes(&rated, |rating| rating.is_peak());
        let challenges = collect_notes(&rated, |rating| rating.is_low());

        let summary = DailySummary {
            date,
            total_hours_rated: rated.len() as u32,
            achievement_percentage: achievement,
            average_rating,
            peak_hours,
            low_hours,
            top_tags,
            insights,
            wins,
            challenges,
            journal_entry: None,
            created_at: Utc::now(),
        };

        self.db.upsert_summary(&summary)?;
        tracing::info!(
            %date,
            achievement = summary.achievement_percentage,
            hours_rated = summary.total_hours_rated,
            "Recomputed daily summary"
        );
        self.notify(StoreEvent::SummaryUpdated { date });

        // Re-read so callers see the stored row, including any preserved
        // journal entry and original created_at.
        self.db.summary_for_date(date)
    }

    // ============================================
    // Journal and summary reads
    // ============================================

    /// Set the user-authored journal entry for a date.
    ///
    /// Returns false when the date has no summary yet (nothing rated so far).
    pub fn set_journal_entry(&self, date: NaiveDate, entry: Option<&str>) -> Result<bool> {
        let updated = self.db.set_journal_entry(date, entry)?;
        if updated {
            self.notify(StoreEvent::SummaryUpdated { date });
        } else {
            tracing::warn!(%date, "Journal entry dropped: no summary for date");
        }
        Ok(updated)
    }

    /// Summaries for the trailing 7 days, today included, newest first
    pub fn weekly_summaries(&self) -> Result<Vec<DailySummary>> {
        let end = Local::now().date_naive();
        let start = end - chrono::Duration::days(6);
        self.db.summaries_between(start, end)
    }

    /// Summaries for the trailing 30 days, today included, newest first
    pub fn monthly_summaries(&self) -> Result<Vec<DailySummary>> {
        let end = Local::now().date_naive();
        let start = end - chrono::Duration::days(29);
        self.db.summaries_between(start, end)
    }

    fn notify(&self, event: StoreEvent) {
        // A send error just means nobody is subscribed right now
        let _ = self.events.send(event);
    }
}

/// Up to 3 most-frequent tags across the rated records.
///
/// Counting preserves first-seen order, and the descending sort is stable, so
/// equally frequent tags rank in first-seen order - recomputation over the
/// same records always yields the same list.
fn top_tags(rated: &[HourRecord]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in rated {
        for tag in &record.tags {
            match counts.iter_mut().find(|(t, _)| t == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(SUMMARY_LIST_LIMIT)
        .map(|(tag, _)| tag)
        .collect()
}

/// Up to 3 non-blank notes from records whose rating matches the predicate,
/// in the records' natural order.
fn collect_notes(rated: &[HourRecord], matches: impl Fn(Rating) -> bool) -> Vec<String> {
    rated
        .iter()
        .filter(|r| r.rating.map_or(false, &matches))
        .filter_map(|r| r.notes.as_deref())
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string)
        .take(SUMMARY_LIST_LIMIT)
        .collect()
}
