//! Rule-based daily insight generation
//!
//! Maps a day's rated hours plus the derived achievement/peak/low data to a
//! short list of human-readable observations. Candidates are produced in a
//! fixed priority order and the first [`MAX_INSIGHTS`] survive:
//!
//! 1. Achievement band message (always present)
//! 2. Peak-hour ranges (when any hour rated 4-5)
//! 3. Low-hour suggestion (when any hour rated 1-2)
//! 4. Pattern observations (morning strength, post-lunch dip, consistency)
//! 5. Tag observations (best and worst tag by mean rating)
//!
//! No side effects, no localization; templates are fixed strings with
//! numeric interpolation.

use crate::format::{format_hour, format_hour_ranges};
use crate::types::HourRecord;

/// Upper bound on the number of insights returned per day
pub const MAX_INSIGHTS: usize = 3;

/// Hour-of-day bands mapped to contextual low-energy suggestions.
/// Checked in order; the first band containing the hour wins.
const LOW_HOUR_SUGGESTIONS: &[(std::ops::RangeInclusive<u8>, &str)] = &[
    (11..=13, "post-lunch dip \u{2192} try a 10-min walk or light stretching"),
    (
        14..=16,
        "afternoon slump \u{2192} consider a healthy snack or brief meditation",
    ),
    (
        20..=23,
        "evening fatigue \u{2192} wind down with lighter tasks or planning",
    ),
    (
        0..=6,
        "late night hours \u{2192} prioritize sleep for better next-day performance",
    ),
];

const GENERIC_LOW_SUGGESTION: &str =
    "energy dip \u{2192} try changing your environment or task type";

/// Generate up to [`MAX_INSIGHTS`] insight strings for one day.
///
/// `peak_hours` and `low_hours` are hour-of-day values in chronological
/// order, as produced by the daily aggregation.
pub fn generate_daily_insights(
    rated_records: &[HourRecord],
    achievement_percentage: f32,
    peak_hours: &[u8],
    low_hours: &[u8],
) -> Vec<String> {
    let mut insights = Vec::new();

    insights.push(achievement_insight(achievement_percentage));

    if !peak_hours.is_empty() {
        insights.push(peak_hours_insight(peak_hours));
    }

    if !low_hours.is_empty() {
        insights.push(low_hours_insight(low_hours));
    }

    insights.extend(pattern_insights(rated_records));
    insights.extend(tag_insights(rated_records));

    insights.truncate(MAX_INSIGHTS);
    insights
}

fn achievement_insight(percentage: f32) -> String {
    let rounded = percentage.round() as i32;
    match percentage {
        p if p >= 80.0 => format!(
            "Excellent day! You achieved {}% productivity. Keep up the outstanding work! \u{1F31F}",
            rounded
        ),
        p if p >= 60.0 => format!(
            "Good progress today with {}% achievement. You're on the right track! \u{1F4AA}",
            rounded
        ),
        p if p >= 40.0 => format!(
            "You achieved {}% today. Try to maintain focus during your peak hours tomorrow.",
            rounded
        ),
        _ => format!(
            "Achievement at {}%. Consider breaking tasks into smaller chunks for better momentum.",
            rounded
        ),
    }
}

fn peak_hours_insight(peak_hours: &[u8]) -> String {
    format!(
        "Your peak performance hours: {}. Schedule important tasks during these times! \u{26A1}",
        format_hour_ranges(peak_hours)
    )
}

fn low_hours_insight(low_hours: &[u8]) -> String {
    // Callers pass chronological data, so the first entry is the earliest low hour.
    let first_low_hour = low_hours[0];
    let suggestion = LOW_HOUR_SUGGESTIONS
        .iter()
        .find(|(band, _)| band.contains(&first_low_hour))
        .map(|(_, suggestion)| *suggestion)
        .unwrap_or(GENERIC_LOW_SUGGESTION);

    format!(
        "Low ratings around {} suggest {}",
        format_hour(first_low_hour),
        suggestion
    )
}

fn pattern_insights(rated_records: &[HourRecord]) -> Vec<String> {
    let mut insights = Vec::new();

    // Consistent morning strength
    let morning_ratings = ratings_in_hours(rated_records, 6..=11);
    if morning_ratings.len() >= 3 {
        let avg = mean(&morning_ratings);
        if avg >= 4.0 {
            insights.push(format!(
                "Strong morning performance (avg {:.1}\u{2605}). You're a morning person! \u{1F305}",
                avg
            ));
        }
    }

    // Post-meal dip
    let post_lunch_ratings = ratings_in_hours(rated_records, 13..=14);
    if !post_lunch_ratings.is_empty() && mean(&post_lunch_ratings) <= 2.5 {
        insights.push(
            "Post-lunch productivity dip detected. Try lighter meals or a quick walk \u{1F6B6}"
                .to_string(),
        );
    }

    // Consistency across the whole day
    let all_ratings: Vec<f64> = rated_records
        .iter()
        .filter_map(|r| r.rating.map(|rating| rating.get() as f64))
        .collect();
    if all_ratings.len() >= 5 && variance(&all_ratings) < 0.5 {
        insights
            .push("Very consistent performance today! Stability is a superpower \u{1F4AB}".to_string());
    }

    insights
}

fn tag_insights(rated_records: &[HourRecord]) -> Vec<String> {
    let mut insights = Vec::new();

    // Group ratings by tag, preserving first-seen order so ties resolve
    // deterministically and recomputation stays idempotent.
    let mut tag_ratings: Vec<(String, Vec<f64>)> = Vec::new();
    for record in rated_records {
        if let Some(rating) = record.rating {
            for tag in &record.tags {
                match tag_ratings.iter_mut().find(|(t, _)| t == tag) {
                    Some((_, ratings)) => ratings.push(rating.get() as f64),
                    None => tag_ratings.push((tag.clone(), vec![rating.get() as f64])),
                }
            }
        }
    }

    let tag_averages: Vec<(&str, f64)> = tag_ratings
        .iter()
        .map(|(tag, ratings)| (tag.as_str(), mean(ratings)))
        .collect();

    if let Some((tag, avg)) = best_by(&tag_averages, |a, b| a > b) {
        if avg >= 4.0 {
            insights.push(format!(
                "{} activities drove your best performance ({:.1}\u{2605} avg)",
                tag, avg
            ));
        }
    }

    if let Some((tag, avg)) = best_by(&tag_averages, |a, b| a < b) {
        if avg <= 2.5 {
            insights.push(format!(
                "{} tasks were challenging today. Consider different approaches or timing",
                tag
            ));
        }
    }

    insights
}

/// First entry winning the strict comparison; first-seen wins ties.
fn best_by<'a>(
    tag_averages: &[(&'a str, f64)],
    better: impl Fn(f64, f64) -> bool,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for &(tag, avg) in tag_averages {
        match best {
            Some((_, current)) if !better(avg, current) => {}
            _ => best = Some((tag, avg)),
        }
    }
    best
}

fn ratings_in_hours(
    rated_records: &[HourRecord],
    hours: std::ops::RangeInclusive<u8>,
) -> Vec<f64> {
    rated_records
        .iter()
        .filter(|r| hours.contains(&r.hour))
        .filter_map(|r| r.rating.map(|rating| rating.get() as f64))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}
