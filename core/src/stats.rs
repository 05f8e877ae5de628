//! Summary statistics and weight series over a dog's feeding log.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::FeedingEntry;
use crate::transition::percentage;

/// Changes smaller than this between consecutive readings count as stable.
pub const TREND_THRESHOLD_LBS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub current_weight: f64,
    pub weight_change: f64,
    pub average_calories: i64,
    pub adherence_rate: i64,
    pub total_entries: usize,
}

/// Stats over `entries` in any order.
///
/// Current weight comes from the newest entry with a reading, falling back to
/// `profile_weight` and then 0. Weight change compares the newest and oldest
/// entries and is 0 unless both carry a reading.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn progress_stats(entries: &[FeedingEntry], profile_weight: Option<f64>) -> ProgressStats {
    let fallback_weight = profile_weight.unwrap_or(0.0);
    let (Some(newest), Some(oldest)) = (
        entries.iter().max_by_key(|e| e.date),
        entries.iter().min_by_key(|e| e.date),
    ) else {
        return ProgressStats {
            current_weight: fallback_weight,
            weight_change: 0.0,
            average_calories: 0,
            adherence_rate: 0,
            total_entries: 0,
        };
    };

    let weight_change = match (newest.effective_weight(), oldest.effective_weight()) {
        (Some(now), Some(then)) => now - then,
        _ => 0.0,
    };
    let total_calories: i64 = entries.iter().map(|e| e.calories).sum();
    let followed = entries.iter().filter(|e| e.followed_plan_today).count();

    ProgressStats {
        current_weight: newest.effective_weight().unwrap_or(fallback_weight),
        weight_change,
        average_calories: (total_calories as f64 / entries.len() as f64).round() as i64,
        adherence_rate: percentage(followed, entries.len()).round() as i64,
        total_entries: entries.len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

/// The last `days` weighed entries, oldest first.
#[must_use]
pub fn weight_series(entries: &[FeedingEntry], days: usize) -> Vec<WeightPoint> {
    let mut points: Vec<WeightPoint> = entries
        .iter()
        .filter_map(|e| {
            e.effective_weight().map(|weight| WeightPoint {
                date: e.date,
                weight,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    let skip = points.len().saturating_sub(days);
    points.split_off(skip)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    #[must_use]
    pub fn between(previous: f64, current: f64) -> Self {
        let delta = current - previous;
        if delta.abs() < TREND_THRESHOLD_LBS {
            Self::Stable
        } else if delta > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTrend {
    pub point: WeightPoint,
    /// Change from the previous point; `None` for the first.
    pub change: Option<f64>,
    pub trend: Trend,
}

/// Annotate each point with its direction relative to the one before it.
#[must_use]
pub fn weight_trend(series: &[WeightPoint]) -> Vec<WeightTrend> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|point| {
            let trend = previous.map_or(Trend::Stable, |p| Trend::between(p, point.weight));
            let change = previous.map(|p| point.weight - p);
            previous = Some(point.weight);
            WeightTrend {
                point: *point,
                change,
                trend,
            }
        })
        .collect()
}
