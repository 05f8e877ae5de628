//! Daily calorie guidance by body weight, goal, and activity level.
//!
//! The table covers 5–100 lbs in disjoint inclusive brackets. Weights outside
//! every bracket (including the gaps between integer brackets) fall back to a
//! linear estimate of 30 kcal per pound.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::models::{ActivityLevel, WeightGoal, round1};

/// Average dry food energy density.
pub const DEFAULT_CALORIES_PER_CUP: f64 = 340.0;

pub const FALLBACK_CALORIES_PER_LB: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivityMultipliers {
    pub sedentary: f64,
    pub moderate: f64,
    pub active: f64,
    pub very_active: f64,
}

impl ActivityMultipliers {
    pub const STANDARD: Self = Self {
        sedentary: 0.8,
        moderate: 1.0,
        active: 1.2,
        very_active: 1.4,
    };

    #[must_use]
    pub fn for_level(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::Moderate => self.moderate,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaloricGuidanceRow {
    pub weight_range_low: f64,
    pub weight_range_high: f64,
    pub maintain_calories: i64,
    pub lose_weight_calories: i64,
    pub gain_weight_calories: i64,
    pub activity_multiplier: ActivityMultipliers,
}

impl CaloricGuidanceRow {
    const fn new(low: f64, high: f64, maintain: i64, lose: i64, gain: i64) -> Self {
        Self {
            weight_range_low: low,
            weight_range_high: high,
            maintain_calories: maintain,
            lose_weight_calories: lose,
            gain_weight_calories: gain,
            activity_multiplier: ActivityMultipliers::STANDARD,
        }
    }

    #[must_use]
    pub fn contains(&self, weight: f64) -> bool {
        self.weight_range_low <= weight && weight <= self.weight_range_high
    }

    #[must_use]
    pub fn base_calories(&self, goal: WeightGoal) -> i64 {
        match goal {
            WeightGoal::Maintain => self.maintain_calories,
            WeightGoal::Lose => self.lose_weight_calories,
            WeightGoal::Gain => self.gain_weight_calories,
        }
    }
}

pub const CALORIC_GUIDANCE_TABLE: &[CaloricGuidanceRow] = &[
    CaloricGuidanceRow::new(5.0, 10.0, 300, 240, 360),
    CaloricGuidanceRow::new(11.0, 20.0, 500, 400, 600),
    CaloricGuidanceRow::new(21.0, 35.0, 750, 600, 900),
    CaloricGuidanceRow::new(36.0, 50.0, 1000, 800, 1200),
    CaloricGuidanceRow::new(51.0, 75.0, 1300, 1040, 1560),
    CaloricGuidanceRow::new(76.0, 100.0, 1600, 1280, 1920),
];

impl WeightGoal {
    /// Scale applied to the linear estimate for weights outside the table.
    #[must_use]
    pub fn fallback_multiplier(self) -> f64 {
        match self {
            Self::Lose => 0.8,
            Self::Maintain => 1.0,
            Self::Gain => 1.2,
        }
    }
}

/// First bracket containing `weight`, if any.
#[must_use]
pub fn find_row(weight: f64) -> Option<&'static CaloricGuidanceRow> {
    CALORIC_GUIDANCE_TABLE.iter().find(|row| row.contains(weight))
}

/// Daily calorie target in kcal. Callers must pass a finite weight.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calories_for_weight(weight: f64, goal: WeightGoal, activity: ActivityLevel) -> i64 {
    match find_row(weight) {
        Some(row) => {
            let base = row.base_calories(goal) as f64;
            (base * row.activity_multiplier.for_level(activity)).round() as i64
        }
        None => {
            let base = weight * FALLBACK_CALORIES_PER_LB;
            (base
                * goal.fallback_multiplier()
                * ActivityMultipliers::STANDARD.for_level(activity))
            .round() as i64
        }
    }
}

/// Cups of food needed to supply `calories`, to one decimal place.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn food_amount_for_calories(calories: i64, calories_per_cup: f64) -> f64 {
    round1(calories as f64 / calories_per_cup)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub weight_lbs: f64,
    pub goal: WeightGoal,
    pub activity: ActivityLevel,
    pub calories: i64,
    pub calories_per_cup: f64,
    pub cups: f64,
    /// True when the weight fell outside every table bracket.
    pub used_fallback: bool,
}

/// Validate advisor input and produce a calorie and portion recommendation.
///
/// A missing or non-positive `calories_per_cup` uses [`DEFAULT_CALORIES_PER_CUP`].
pub fn recommend(
    weight_lbs: f64,
    goal: WeightGoal,
    activity: ActivityLevel,
    calories_per_cup: Option<f64>,
) -> Result<Recommendation> {
    if !weight_lbs.is_finite() || weight_lbs <= 0.0 {
        bail!("Please enter a valid current weight");
    }
    let calories_per_cup = calories_per_cup
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(DEFAULT_CALORIES_PER_CUP);

    let used_fallback = find_row(weight_lbs).is_none();
    if used_fallback {
        tracing::warn!(
            weight_lbs,
            "weight outside guidance table, using linear estimate"
        );
    }

    let calories = calories_for_weight(weight_lbs, goal, activity);
    Ok(Recommendation {
        weight_lbs,
        goal,
        activity,
        calories,
        calories_per_cup,
        cups: food_amount_for_calories(calories, calories_per_cup),
        used_fallback,
    })
}
