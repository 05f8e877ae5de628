//! Demo data: one dog partway through a lamb-to-salmon switch.

use chrono::{Duration, NaiveDate};

use crate::models::{NewDogProfile, NewFeedingEntry, NewTransitionPlan};

#[must_use]
pub fn sample_profile() -> NewDogProfile {
    NewDogProfile {
        name: "Devo".to_string(),
        breed: "Mixed".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2020, 1, 1),
        ideal_weight_lbs: 25.0,
        current_weight_lbs: Some(27.5),
        notes: Some("Prefers lamb-based food.".to_string()),
        allergies: vec!["chicken".to_string(), "corn".to_string()],
    }
}

/// An active default-schedule plan starting on `start`.
#[must_use]
pub fn sample_plan(dog_id: &str, start: NaiveDate) -> NewTransitionPlan {
    NewTransitionPlan {
        dog_id: dog_id.to_string(),
        name: "Lamb to Salmon Transition".to_string(),
        start_date: start,
        phases: Vec::new(),
        old_food_name: "Lamb & Rice Formula".to_string(),
        new_food_name: "Salmon & Sweet Potato".to_string(),
        total_days: None,
        is_active: true,
    }
}

/// Two logged days at the start of the plan, both following the 75/25 blend.
#[must_use]
pub fn sample_entries(dog_id: &str, start: NaiveDate) -> Vec<NewFeedingEntry> {
    let day = |offset: i64, am: f64, pm: f64, notes: Option<&str>| NewFeedingEntry {
        dog_id: dog_id.to_string(),
        date: start + Duration::days(offset),
        am_weight: Some(am),
        pm_weight: Some(pm),
        food_amount: 2.5,
        calories: 850,
        notes: notes.map(str::to_string),
        followed_plan_today: true,
        old_food_amount: Some(1.9),
        new_food_amount: Some(0.6),
    };
    vec![
        day(
            0,
            27.8,
            27.6,
            Some("Started transition today. Devo seems to like the new food!"),
        ),
        day(1, 27.5, 27.4, None),
    ]
}
