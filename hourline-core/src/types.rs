//! Core domain types for hourline
//!
//! These types represent the canonical data model: one [`HourRecord`] per
//! (date, hour) pair, and one derived [`DailySummary`] per date.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **HourRecord** | The atomic unit of tracked data: one hour-of-day's rating, tags, and notes |
//! | **Rating** | A 1-5 star score for a single hour |
//! | **Peak hour** | An hour-of-day rated 4 or 5 |
//! | **Low hour** | An hour-of-day rated 1 or 2 |
//! | **DailySummary** | The derived, recomputed-on-write aggregate of a date's hour records |
//! | **Achievement** | Normalized 0-100 score relative to worst/best outcomes for the rated hours |
//! | **Trend** | Three-way classification of achievement change between two periods |

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Rating
// ============================================

/// A 1-5 star rating for a single hour.
///
/// Construction validates the range, so a stored rating is always in [1, 5].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest allowed rating
    pub const MIN: u8 = 1;
    /// Highest allowed rating
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside [1, 5]
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidRating(value))
        }
    }

    /// The raw star value
    pub fn get(self) -> u8 {
        self.0
    }

    /// Rated 4 or 5
    pub fn is_peak(self) -> bool {
        self.0 >= 4
    }

    /// Rated 1 or 2
    pub fn is_low(self) -> bool {
        self.0 <= 2
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================
// Hour Records
// ============================================

/// One tracked hour: rating, activity tags, and free-text notes.
///
/// At most one record exists per (date, hour) pair, enforced by the
/// deterministic id and insert-or-replace semantics in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    /// Deterministic key derived from date and hour, e.g. `"2026-08-07-09"`
    pub id: String,
    /// The calendar date and hour this record represents
    pub date_time: NaiveDateTime,
    /// Hour of day, 0-23 (redundant with `date_time`, kept for fast grouping queries)
    pub hour: u8,
    /// 1-5 stars; `None` means not yet rated
    pub rating: Option<Rating>,
    /// Activity tags in insertion order (e.g. "work", "study", "health")
    pub tags: Vec<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Set once at first creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every rating change
    pub updated_at: DateTime<Utc>,
}

impl HourRecord {
    /// Build the deterministic record id for a date and hour-of-day.
    pub fn record_id(date: NaiveDate, hour: u8) -> String {
        format!("{}-{:02}", date.format("%Y-%m-%d"), hour)
    }

    /// The calendar date this record belongs to
    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }

    /// Whether a rating has been entered for this hour
    pub fn is_rated(&self) -> bool {
        self.rating.is_some()
    }
}

// ============================================
// Daily Summaries
// ============================================

/// Derived aggregate of one date's hour records.
///
/// Recomputed and fully replaced on every rating write for the date, except
/// `journal_entry` (authored separately by the user) and `created_at`, which
/// survive replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Unique key
    pub date: NaiveDate,
    /// Count of hour records with a rating
    pub total_hours_rated: u32,
    /// Normalized achievement score, 0-100, rounded to 1 decimal
    pub achievement_percentage: f32,
    /// Mean of the date's ratings (0 if none)
    pub average_rating: f32,
    /// Hours-of-day rated 4 or 5, chronological
    pub peak_hours: Vec<u8>,
    /// Hours-of-day rated 1 or 2, chronological
    pub low_hours: Vec<u8>,
    /// Up to 3 most-frequent tags, ties broken by first-seen order
    pub top_tags: Vec<String>,
    /// Up to 3 generated insight strings
    pub insights: Vec<String>,
    /// Up to 3 non-blank notes from peak hours
    pub wins: Vec<String>,
    /// Up to 3 non-blank notes from low hours
    pub challenges: Vec<String>,
    /// Free text authored by the user, never derived
    pub journal_entry: Option<String>,
    /// Set once at first creation
    pub created_at: DateTime<Utc>,
}

impl DailySummary {
    /// Coarse label for the achievement percentage band
    pub fn productivity_level(&self) -> &'static str {
        match self.achievement_percentage {
            p if p >= 80.0 => "Excellent",
            p if p >= 60.0 => "Good",
            p if p >= 40.0 => "Fair",
            _ => "Needs Improvement",
        }
    }
}

// ============================================
// Trend
// ============================================

/// Three-way classification of achievement change relative to a prior period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// More than 5 percentage points above the prior period
    Improving,
    /// More than 5 percentage points below the prior period
    Declining,
    /// Within the 5-point deadband
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "improving" => Ok(Trend::Improving),
            "declining" => Ok(Trend::Declining),
            "stable" => Ok(Trend::Stable),
            _ => Err(format!("unknown trend: {}", s)),
        }
    }
}

// ============================================
// Store Events
// ============================================

/// Change notification published after every successful store write.
///
/// Consumers subscribe via [`crate::tracker::Tracker::subscribe`] and re-read
/// the records or summary for the named date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// An hour record was inserted or replaced
    HourRecordSaved { date: NaiveDate, hour: u8 },
    /// The daily summary for a date was recomputed or its journal edited
    SummaryUpdated { date: NaiveDate },
}
