//! Achievement scoring
//!
//! Pure functions mapping a day's rated hours to a normalized 0-100
//! achievement percentage, plus a trend classification between two periods.
//!
//! The plain score normalizes against the worst case (all 1s) and best case
//! (all 5s) for exactly the hours actually rated, so achievement is
//! comparable across days with different numbers of rated hours:
//!
//! ```text
//! achievement = ((sum - n*1) / (n*5 - n*1)) * 100
//! ```
//!
//! For ratings [5,5,4,4,3,3,2,2,1,1]: sum = 30, n = 10,
//! achievement = ((30 - 10) / (50 - 10)) * 100 = 50.0.

use crate::types::{HourRecord, Trend};

/// Default per-hour-of-day weights for [`calculate_weighted_achievement`].
///
/// Indexed by hour of day. Conventional working hours carry more weight,
/// lunch and late night less; midnight-to-4AM bottoms out at 0.3.
pub const DEFAULT_HOUR_WEIGHTS: [f32; 24] = [
    0.4, 0.3, 0.3, 0.3, 0.4, // 12AM-4AM
    0.8, 0.9, 1.0, 1.0, // 5AM-8AM
    1.2, 1.2, 1.2, // 9AM-11AM
    0.7, // lunch
    1.1, 1.2, 1.2, 1.1, 1.0, // 1PM-5PM
    0.9, 0.8, 0.8, 0.7, // 6PM-9PM
    0.6, 0.5, // 10PM-11PM
];

/// Achievement deltas within this many percentage points count as stable.
const TREND_DEADBAND: f32 = 5.0;

/// Normalized achievement percentage for a set of rated hours.
///
/// Records without a rating are ignored. Returns 0 when nothing is rated.
/// The result is clamped to [0, 100] and rounded to 1 decimal place.
pub fn calculate_achievement_percentage(rated_records: &[HourRecord]) -> f32 {
    let ratings: Vec<u8> = rated_records
        .iter()
        .filter_map(|r| r.rating.map(|rating| rating.get()))
        .collect();

    if ratings.is_empty() {
        return 0.0;
    }

    let sum: f32 = ratings.iter().map(|&r| r as f32).sum();
    let n = ratings.len() as f32;

    let min_possible = n * 1.0;
    let max_possible = n * 5.0;

    let achievement = if max_possible > min_possible {
        ((sum - min_possible) / (max_possible - min_possible)) * 100.0
    } else {
        0.0
    };

    round_to_tenth(achievement.clamp(0.0, 100.0))
}

/// Weighted achievement percentage using a per-hour-of-day weight table.
///
/// Computes the weighted mean rating and maps the [1, 5] mean linearly to
/// [0, 100]. Returns 0 when the total weight is 0 (no rated hours).
pub fn calculate_weighted_achievement(
    rated_records: &[HourRecord],
    hour_weights: &[f32; 24],
) -> f32 {
    let mut weighted_sum = 0.0f32;
    let mut total_weight = 0.0f32;

    for record in rated_records {
        if let Some(rating) = record.rating {
            let weight = hour_weights
                .get(record.hour as usize)
                .copied()
                .unwrap_or(1.0);
            weighted_sum += rating.get() as f32 * weight;
            total_weight += weight;
        }
    }

    if total_weight == 0.0 {
        return 0.0;
    }

    let weighted_mean = weighted_sum / total_weight;
    let achievement = ((weighted_mean - 1.0) / 4.0) * 100.0;

    round_to_tenth(achievement.clamp(0.0, 100.0))
}

/// Classify the achievement change between two periods.
///
/// Symmetric around a 5-point-percentage deadband: deltas above +5 improve,
/// below -5 decline, anything in between is stable.
pub fn calculate_trend(current: f32, previous: f32) -> Trend {
    let difference = current - previous;
    if difference > TREND_DEADBAND {
        Trend::Improving
    } else if difference < -TREND_DEADBAND {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
