//! Integration tests for the hourline rating write path and summary pipeline
//!
//! These tests drive the full flow through a real SQLite database: save hour
//! ratings, verify the recomputed daily summary, and observe the store's
//! change notifications.

use chrono::NaiveDate;
use hourline_core::db::Database;
use hourline_core::types::StoreEvent;
use hourline_core::{Error, Tracker};
use tempfile::TempDir;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

/// Open a tracker backed by a database file in a temp directory
fn tracker_in(temp_dir: &TempDir) -> Tracker {
    let db_path = temp_dir.path().join("test.db");
    let db = Database::open(&db_path).expect("database should open");
    db.migrate().expect("migrations should run");
    Tracker::new(db)
}

// ============================================
// Rating Write Path Tests
// ============================================

#[test]
fn test_save_rating_creates_record_and_summary() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    let record = tracker
        .save_hour_rating(date, 9, 4, vec!["work".to_string()], None)
        .expect("save should succeed");

    assert_eq!(record.id, "2026-08-07-09");
    assert_eq!(record.hour, 9);
    assert_eq!(record.rating.unwrap().get(), 4);

    let stored = tracker
        .database()
        .get_hour_record(&record.id)
        .unwrap()
        .expect("record should exist");
    assert_eq!(stored.tags, vec!["work"]);

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .expect("summary should be computed");
    assert_eq!(summary.total_hours_rated, 1);
    assert_eq!(summary.achievement_percentage, 75.0);
    assert_eq!(summary.average_rating, 4.0);
    assert_eq!(summary.top_tags, vec!["work"]);
    assert!(!summary.insights.is_empty());
}

#[test]
fn test_save_rating_overwrites_same_hour() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 2, vec![], None)
        .unwrap();
    tracker
        .save_hour_rating(date, 9, 5, vec!["deep-work".to_string()], None)
        .unwrap();

    // Exactly one record exists for the slot, carrying the second write
    let records = tracker.database().hour_records_for_date(date).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rating.unwrap().get(), 5);
    assert_eq!(records[0].tags, vec!["deep-work"]);

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_hours_rated, 1);
    assert_eq!(summary.achievement_percentage, 100.0);
}

#[test]
fn test_invalid_rating_rejected_before_persistence() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    for bad in [0u8, 6, 200] {
        let err = tracker
            .save_hour_rating(date, 9, bad, vec![], None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRating(r) if r == bad));
    }

    // Nothing was written
    assert!(tracker
        .database()
        .hour_records_for_date(date)
        .unwrap()
        .is_empty());
    assert!(tracker.database().summary_for_date(date).unwrap().is_none());
}

#[test]
fn test_invalid_hour_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);

    let err = tracker
        .save_hour_rating(test_date(), 24, 3, vec![], None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHour(24)));
}

// ============================================
// Summary Recomputation Tests
// ============================================

#[test]
fn test_peak_and_low_hour_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 5, vec![], None)
        .unwrap();
    tracker
        .save_hour_rating(date, 14, 1, vec![], None)
        .unwrap();

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    assert_eq!(summary.peak_hours, vec![9]);
    assert_eq!(summary.low_hours, vec![14]);
}

#[test]
fn test_worked_achievement_example() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    // Ratings [5,5,4,4,3,3,2,2,1,1] across ten hours: achievement is 50.0
    for (hour, rating) in [5, 5, 4, 4, 3, 3, 2, 2, 1, 1].into_iter().enumerate() {
        tracker
            .save_hour_rating(date, 8 + hour as u8, rating, vec![], None)
            .unwrap();
    }

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_hours_rated, 10);
    assert_eq!(summary.achievement_percentage, 50.0);
    assert_eq!(summary.average_rating, 3.0);
}

#[test]
fn test_recompute_skipped_when_nothing_rated() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    let result = tracker.recompute_summary(date).unwrap();
    assert!(result.is_none());
    assert!(tracker.database().summary_for_date(date).unwrap().is_none());
}

#[test]
fn test_recompute_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 5, vec!["work".to_string()], Some("good focus".to_string()))
        .unwrap();
    tracker
        .save_hour_rating(date, 14, 2, vec!["meetings".to_string()], None)
        .unwrap();

    let first = tracker.recompute_summary(date).unwrap().unwrap();
    let second = tracker.recompute_summary(date).unwrap().unwrap();

    // Identical records in, identical summary out (created_at is preserved
    // from the first write, so whole-struct equality holds)
    assert_eq!(first, second);
}

#[test]
fn test_wins_and_challenges_from_notes() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 8, 5, vec![], Some("shipped the release".to_string()))
        .unwrap();
    tracker
        .save_hour_rating(date, 9, 4, vec![], Some("   ".to_string()))
        .unwrap();
    tracker
        .save_hour_rating(date, 10, 3, vec![], Some("average hour".to_string()))
        .unwrap();
    tracker
        .save_hour_rating(date, 14, 1, vec![], Some("context switching".to_string()))
        .unwrap();

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    assert_eq!(summary.wins, vec!["shipped the release"]);
    assert_eq!(summary.challenges, vec!["context switching"]);
}

#[test]
fn test_top_tags_ranked_with_stable_ties() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 4, vec!["work".into(), "focus".into()], None)
        .unwrap();
    tracker
        .save_hour_rating(date, 10, 4, vec!["work".into()], None)
        .unwrap();
    tracker
        .save_hour_rating(date, 11, 3, vec!["errands".into(), "health".into()], None)
        .unwrap();

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    // "work" leads on count; "focus" and "errands" tie and keep first-seen order
    assert_eq!(summary.top_tags, vec!["work", "focus", "errands"]);
}

// ============================================
// Journal Entry Tests
// ============================================

#[test]
fn test_journal_survives_recomputation() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 4, vec![], None)
        .unwrap();
    assert!(tracker
        .set_journal_entry(date, Some("productive morning overall"))
        .unwrap());

    // A later rating write replaces the summary but must keep the journal
    tracker
        .save_hour_rating(date, 15, 2, vec![], None)
        .unwrap();

    let summary = tracker
        .database()
        .summary_for_date(date)
        .unwrap()
        .unwrap();
    assert_eq!(
        summary.journal_entry.as_deref(),
        Some("productive morning overall")
    );
    assert_eq!(summary.total_hours_rated, 2);
}

#[test]
fn test_journal_without_summary_reports_false() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);

    assert!(!tracker
        .set_journal_entry(test_date(), Some("nothing rated yet"))
        .unwrap());
}

// ============================================
// Subscription Tests
// ============================================

#[test]
fn test_subscribers_observe_writes() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();
    let mut events = tracker.subscribe();

    tracker
        .save_hour_rating(date, 9, 4, vec![], None)
        .unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::HourRecordSaved { date, hour: 9 }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::SummaryUpdated { date }
    );
    assert!(events.try_recv().is_err(), "no further events expected");
}

#[test]
fn test_journal_edit_notifies_subscribers() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);
    let date = test_date();

    tracker
        .save_hour_rating(date, 9, 4, vec![], None)
        .unwrap();

    let mut events = tracker.subscribe();
    tracker.set_journal_entry(date, Some("note")).unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::SummaryUpdated { date }
    );
}

// ============================================
// Summary Read Surface Tests
// ============================================

#[test]
fn test_summaries_between_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);

    let d1 = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let d3 = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
    for date in [d1, d2, d3] {
        tracker.save_hour_rating(date, 9, 4, vec![], None).unwrap();
    }

    let summaries = tracker.database().summaries_between(d1, d2).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].date, d2);
    assert_eq!(summaries[1].date, d1);

    let recent = tracker.database().recent_summaries(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].date, d3);
}

#[test]
fn test_excellent_days_and_average_achievement() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);

    let great = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
    let rough = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    tracker.save_hour_rating(great, 9, 5, vec![], None).unwrap(); // 100%
    tracker.save_hour_rating(rough, 9, 2, vec![], None).unwrap(); // 25%

    let excellent = tracker.database().excellent_days().unwrap();
    assert_eq!(excellent.len(), 1);
    assert_eq!(excellent[0].date, great);

    let avg = tracker
        .database()
        .average_achievement_between(great, rough)
        .unwrap()
        .unwrap();
    assert_eq!(avg, 62.5);

    // Empty range reports absent, not zero
    let empty = tracker
        .database()
        .average_achievement_between(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        )
        .unwrap();
    assert!(empty.is_none());
}

#[test]
fn test_rating_now_lands_in_weekly_window() {
    let temp_dir = TempDir::new().unwrap();
    let tracker = tracker_in(&temp_dir);

    tracker
        .save_hour_rating_now(9, 4, vec!["work".to_string()], None)
        .unwrap();

    let weekly = tracker.weekly_summaries().unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!(weekly[0].total_hours_rated, 1);

    let monthly = tracker.monthly_summaries().unwrap();
    assert_eq!(monthly.len(), 1);
}
