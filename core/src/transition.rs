//! Food transition schedule: phase lookup, progress, adherence, and blend suggestions.
//!
//! Progress is a pure snapshot computed from a plan and a calendar date. It is
//! never stored.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{TransitionPhase, TransitionPlan, round1};
use crate::repository::FeedingLogRepository;

/// The standard 14-day schedule.
#[must_use]
pub fn default_transition_phases() -> Vec<TransitionPhase> {
    let phase = |n: u8, label: &str, start, end, new: u8, description: &str| TransitionPhase {
        id: format!("phase-{n}"),
        label: label.to_string(),
        start_day: start,
        end_day: end,
        old_food_percentage: 100 - new,
        new_food_percentage: new,
        description: Some(description.to_string()),
    };
    vec![
        phase(
            1,
            "Days 1-3",
            1,
            3,
            25,
            "Start with 25% new food mixed with 75% old food",
        ),
        phase(2, "Days 4-6", 4, 6, 50, "Equal parts new and old food"),
        phase(3, "Days 7-9", 7, 9, 75, "75% new food with 25% old food"),
        phase(
            4,
            "Days 10-12",
            10,
            12,
            90,
            "Almost fully transitioned to new food",
        ),
        phase(5, "Day 13+", 13, 14, 100, "Complete transition to new food"),
    ]
}

/// Longest transition a plan may schedule, in days.
pub const MAX_TRANSITION_DAYS: i64 = 365;

/// Check that phases tile days `1..=total_days` in order with valid blends.
pub fn validate_phases(phases: &[TransitionPhase], total_days: i64) -> Result<()> {
    if phases.is_empty() {
        bail!("A transition plan needs at least one phase");
    }
    if !(1..=MAX_TRANSITION_DAYS).contains(&total_days) {
        bail!("total_days must be between 1 and {MAX_TRANSITION_DAYS} (got {total_days})");
    }
    let mut expected_start = 1;
    for phase in phases {
        if phase.label.trim().is_empty() {
            bail!("Phase label must not be empty");
        }
        if u16::from(phase.old_food_percentage) + u16::from(phase.new_food_percentage) != 100 {
            bail!(
                "Phase '{}' percentages must sum to 100 (got {} + {})",
                phase.label,
                phase.old_food_percentage,
                phase.new_food_percentage
            );
        }
        if phase.start_day > phase.end_day {
            bail!(
                "Phase '{}' starts after it ends (day {} > day {})",
                phase.label,
                phase.start_day,
                phase.end_day
            );
        }
        if phase.end_day > MAX_TRANSITION_DAYS {
            bail!(
                "Phase '{}' ends on day {}, past the {MAX_TRANSITION_DAYS}-day limit",
                phase.label,
                phase.end_day
            );
        }
        if phase.start_day != expected_start {
            bail!(
                "Phase '{}' must start on day {expected_start} (got day {})",
                phase.label,
                phase.start_day
            );
        }
        expected_start = phase.end_day + 1;
    }
    let last_end = expected_start - 1;
    if last_end != total_days {
        bail!("Phases end on day {last_end} but the plan lasts {total_days} days");
    }
    Ok(())
}

/// 1-indexed day number of `today` within a plan starting on `start`.
///
/// Zero or negative before the plan starts.
#[must_use]
pub fn days_since_start(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days() + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Current,
    Upcoming,
}

#[must_use]
pub fn phase_status(phase: &TransitionPhase, current_day: i64) -> PhaseStatus {
    if current_day > phase.end_day {
        PhaseStatus::Completed
    } else if phase.contains_day(current_day) {
        PhaseStatus::Current
    } else {
        PhaseStatus::Upcoming
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionProgress {
    pub current_day: i64,
    pub current_phase: TransitionPhase,
    pub days_remaining: i64,
    pub percent_complete: f64,
    pub adherence_rate: f64,
    /// Today precedes the first phase; `current_phase` is the first phase.
    pub not_started: bool,
}

/// Phase in effect on `day`.
///
/// Before the first phase this is the first phase; past the last one (or in a
/// gap) it is the last phase. `None` only when there are no phases.
#[must_use]
pub fn phase_for_day(phases: &[TransitionPhase], day: i64) -> Option<&TransitionPhase> {
    let first = phases.first()?;
    if day < first.start_day {
        return Some(first);
    }
    phases.iter().find(|p| p.contains_day(day)).or(phases.last())
}

/// Progress snapshot for `plan` on `today`. `None` when the plan has no phases.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_progress(
    plan: &TransitionPlan,
    today: NaiveDate,
    adherence_rate: f64,
) -> Option<TransitionProgress> {
    let current_day = days_since_start(plan.start_date, today);
    let current_phase = phase_for_day(&plan.phases, current_day)?.clone();
    let not_started = current_day < current_phase.start_day;

    let total_days = plan.total_days.max(1);
    let percent_complete = (current_day as f64 / total_days as f64 * 100.0).clamp(0.0, 100.0);
    let days_remaining = (plan.total_days - current_day + 1).clamp(0, total_days);

    Some(TransitionProgress {
        current_day,
        current_phase,
        days_remaining,
        percent_complete,
        adherence_rate,
        not_started,
    })
}

/// Share of logged days in the plan window where the plan was followed, 0-100.
///
/// The window runs from the plan start to the earlier of `today` and the plan's
/// last day. Returns 0 when nothing was logged.
pub fn adherence_rate(
    log: &dyn FeedingLogRepository,
    plan: &TransitionPlan,
    today: NaiveDate,
) -> Result<f64> {
    let end = plan.end_date().min(today);
    if end < plan.start_date {
        return Ok(0.0);
    }
    let entries = log.entries_in_range(&plan.dog_id, plan.start_date, end)?;
    let followed = entries.iter().filter(|e| e.followed_plan_today).count();
    Ok(percentage(followed, entries.len()))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Progress with adherence read from the feeding log.
pub fn progress_for_plan(
    plan: &TransitionPlan,
    today: NaiveDate,
    log: &dyn FeedingLogRepository,
) -> Result<Option<TransitionProgress>> {
    let progress = calculate_progress(plan, today, adherence_rate(log, plan, today)?);
    if progress.as_ref().is_some_and(|p| p.not_started) {
        tracing::debug!(plan = %plan.id, "transition plan has not started yet");
    }
    Ok(progress)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixSuggestion {
    pub old_food_amount: f64,
    pub new_food_amount: f64,
}

/// Split a day's food between old and new per the phase blend.
///
/// Each side is rounded on its own, so the two may not add back to `total_amount`.
#[must_use]
pub fn mix_suggestion(total_amount: f64, phase: &TransitionPhase) -> MixSuggestion {
    MixSuggestion {
        old_food_amount: round1(total_amount * f64::from(phase.old_food_percentage) / 100.0),
        new_food_amount: round1(total_amount * f64::from(phase.new_food_percentage) / 100.0),
    }
}

/// A plan together with today's progress and per-phase status.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveTransition {
    pub plan: TransitionPlan,
    pub progress: TransitionProgress,
    pub phase_statuses: Vec<PhaseStatus>,
}

impl ActiveTransition {
    #[must_use]
    pub fn new(plan: TransitionPlan, progress: TransitionProgress) -> Self {
        let phase_statuses = plan
            .phases
            .iter()
            .map(|p| phase_status(p, progress.current_day))
            .collect();
        Self {
            plan,
            progress,
            phase_statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::models::{FeedingEntry, NewFeedingEntry, UpdateFeedingEntry};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_plan() -> TransitionPlan {
        TransitionPlan {
            id: "transition-1".to_string(),
            dog_id: "dog-1".to_string(),
            name: "Lamb to Salmon Transition".to_string(),
            start_date: d(2024, 6, 1),
            phases: default_transition_phases(),
            old_food_name: "Lamb & Rice Formula".to_string(),
            new_food_name: "Salmon & Sweet Potato".to_string(),
            total_days: 14,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn entry(date: NaiveDate, followed: bool) -> FeedingEntry {
        FeedingEntry {
            id: format!("entry-{date}"),
            dog_id: "dog-1".to_string(),
            date,
            am_weight: None,
            pm_weight: None,
            average_weight: None,
            food_amount: 2.5,
            calories: 850,
            notes: None,
            followed_plan_today: followed,
            old_food_amount: None,
            new_food_amount: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    /// Feeding log backed by a vector; records the ranges it was asked for.
    struct MockLog {
        entries: Vec<FeedingEntry>,
        ranges: RefCell<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl MockLog {
        fn new(entries: Vec<FeedingEntry>) -> Self {
            Self {
                entries,
                ranges: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeedingLogRepository for MockLog {
        fn upsert_entry(&self, _entry: &NewFeedingEntry) -> Result<FeedingEntry> {
            unimplemented!()
        }

        fn update_entry(&self, _id: &str, _update: &UpdateFeedingEntry) -> Result<FeedingEntry> {
            unimplemented!()
        }

        fn delete_entry(&self, _id: &str) -> Result<bool> {
            unimplemented!()
        }

        fn get_entry(&self, id: &str) -> Result<Option<FeedingEntry>> {
            Ok(self.entries.iter().find(|e| e.id == id).cloned())
        }

        fn entry_for_date(&self, dog_id: &str, date: NaiveDate) -> Result<Option<FeedingEntry>> {
            Ok(self
                .entries
                .iter()
                .find(|e| e.dog_id == dog_id && e.date == date)
                .cloned())
        }

        fn entries_for_dog(&self, dog_id: &str) -> Result<Vec<FeedingEntry>> {
            Ok(self
                .entries
                .iter()
                .filter(|e| e.dog_id == dog_id)
                .cloned()
                .collect())
        }

        fn entries_in_range(
            &self,
            dog_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<FeedingEntry>> {
            self.ranges.borrow_mut().push((start, end));
            Ok(self
                .entries
                .iter()
                .filter(|e| e.dog_id == dog_id && e.date >= start && e.date <= end)
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_default_phases_are_valid() {
        let phases = default_transition_phases();
        assert_eq!(phases.len(), 5);
        validate_phases(&phases, 14).unwrap();
        for p in &phases {
            assert_eq!(p.old_food_percentage + p.new_food_percentage, 100);
        }
    }

    #[test]
    fn test_validate_phases_rejects_bad_schedules() {
        let mut phases = default_transition_phases();
        assert!(validate_phases(&phases, 15).is_err());
        assert!(validate_phases(&[], 14).is_err());

        phases[1].start_day = 5;
        assert!(validate_phases(&phases, 14).is_err());

        let mut phases = default_transition_phases();
        phases[2].old_food_percentage = 30;
        assert!(validate_phases(&phases, 14).is_err());

        let mut phases = default_transition_phases();
        phases[0].start_day = 4;
        assert!(validate_phases(&phases, 14).is_err());
    }

    #[test]
    fn test_validate_phases_rejects_overlong_plans() {
        let mut phases = vec![default_transition_phases().remove(0)];
        phases[0].end_day = 4_000_000_000;
        let err = validate_phases(&phases, 4_000_000_000).unwrap_err();
        assert!(err.to_string().contains("between 1 and 365"));

        // The last phase alone running long is caught even with a plausible total.
        assert!(validate_phases(&phases, 14).is_err());

        phases[0].end_day = MAX_TRANSITION_DAYS;
        validate_phases(&phases, MAX_TRANSITION_DAYS).unwrap();
    }

    #[test]
    fn test_days_since_start() {
        assert_eq!(days_since_start(d(2024, 6, 1), d(2024, 6, 1)), 1);
        assert_eq!(days_since_start(d(2024, 6, 1), d(2024, 6, 14)), 14);
        assert_eq!(days_since_start(d(2024, 6, 1), d(2024, 5, 30)), -1);
    }

    #[test]
    fn test_progress_first_day() {
        let plan = sample_plan();
        let p = calculate_progress(&plan, d(2024, 6, 1), 0.0).unwrap();
        assert_eq!(p.current_day, 1);
        assert_eq!(p.current_phase.label, "Days 1-3");
        assert!((p.percent_complete - 100.0 / 14.0).abs() < 1e-9);
        assert_eq!(p.days_remaining, 14);
        assert!(!p.not_started);
    }

    #[test]
    fn test_progress_last_day() {
        let plan = sample_plan();
        let p = calculate_progress(&plan, d(2024, 6, 14), 0.0).unwrap();
        assert_eq!(p.current_day, 14);
        assert_eq!(p.current_phase.label, "Day 13+");
        assert!((p.percent_complete - 100.0).abs() < f64::EPSILON);
        assert_eq!(p.days_remaining, 1);
    }

    #[test]
    fn test_progress_mid_phase() {
        let plan = sample_plan();
        let p = calculate_progress(&plan, d(2024, 6, 8), 0.0).unwrap();
        assert_eq!(p.current_day, 8);
        assert_eq!(p.current_phase.label, "Days 7-9");
        assert_eq!(p.current_phase.new_food_percentage, 75);
        assert_eq!(p.days_remaining, 7);
    }

    #[test]
    fn test_progress_overrun_uses_last_phase() {
        let plan = sample_plan();
        let p = calculate_progress(&plan, d(2024, 6, 21), 0.0).unwrap();
        assert_eq!(p.current_day, 21);
        assert_eq!(p.current_phase.label, "Day 13+");
        assert!((p.percent_complete - 100.0).abs() < f64::EPSILON);
        assert_eq!(p.days_remaining, 0);
    }

    #[test]
    fn test_progress_underrun_uses_first_phase() {
        let plan = sample_plan();
        let p = calculate_progress(&plan, d(2024, 5, 29), 0.0).unwrap();
        assert_eq!(p.current_day, -2);
        assert_eq!(p.current_phase.label, "Days 1-3");
        assert!(p.not_started);
        assert!(p.percent_complete.abs() < f64::EPSILON);
        assert_eq!(p.days_remaining, 14);
    }

    #[test]
    fn test_progress_without_phases() {
        let mut plan = sample_plan();
        plan.phases.clear();
        assert!(calculate_progress(&plan, d(2024, 6, 1), 0.0).is_none());
    }

    #[test]
    fn test_progress_is_idempotent() {
        let plan = sample_plan();
        let a = calculate_progress(&plan, d(2024, 6, 5), 50.0);
        let b = calculate_progress(&plan, d(2024, 6, 5), 50.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_phase_status() {
        let phases = default_transition_phases();
        assert_eq!(phase_status(&phases[0], 5), PhaseStatus::Completed);
        assert_eq!(phase_status(&phases[1], 5), PhaseStatus::Current);
        assert_eq!(phase_status(&phases[2], 5), PhaseStatus::Upcoming);
        assert_eq!(phase_status(&phases[0], 0), PhaseStatus::Upcoming);
    }

    #[test]
    fn test_mix_suggestion() {
        let phases = default_transition_phases();
        let mix = mix_suggestion(2.5, &phases[0]);
        assert!((mix.old_food_amount - 1.9).abs() < f64::EPSILON);
        assert!((mix.new_food_amount - 0.6).abs() < f64::EPSILON);

        let mix = mix_suggestion(3.0, &phases[4]);
        assert!(mix.old_food_amount.abs() < f64::EPSILON);
        assert!((mix.new_food_amount - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mix_suggestion_rounding_tolerance() {
        // 90/10 of 1.55 rounds each side independently
        let phases = default_transition_phases();
        let mix = mix_suggestion(1.55, &phases[3]);
        let sum = mix.old_food_amount + mix.new_food_amount;
        assert!((sum - 1.55).abs() <= 0.1 + 1e-9);
    }

    #[test]
    fn test_adherence_rate_counts_plan_window() {
        let plan = sample_plan();
        let log = MockLog::new(vec![
            entry(d(2024, 5, 31), false),
            entry(d(2024, 6, 1), true),
            entry(d(2024, 6, 2), true),
            entry(d(2024, 6, 3), false),
            entry(d(2024, 6, 4), true),
            entry(d(2024, 6, 20), false),
        ]);
        let rate = adherence_rate(&log, &plan, d(2024, 6, 30)).unwrap();
        assert!((rate - 75.0).abs() < 1e-9);
        assert_eq!(
            log.ranges.borrow().last().copied(),
            Some((d(2024, 6, 1), d(2024, 6, 14)))
        );
    }

    #[test]
    fn test_adherence_rate_stops_at_today() {
        let plan = sample_plan();
        let log = MockLog::new(vec![entry(d(2024, 6, 1), true), entry(d(2024, 6, 2), false)]);
        let rate = adherence_rate(&log, &plan, d(2024, 6, 1)).unwrap();
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_adherence_rate_empty_log_is_zero() {
        let plan = sample_plan();
        let log = MockLog::new(vec![]);
        assert!(adherence_rate(&log, &plan, d(2024, 6, 10)).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_adherence_rate_before_start_skips_lookup() {
        let plan = sample_plan();
        let log = MockLog::new(vec![entry(d(2024, 6, 1), true)]);
        assert!(adherence_rate(&log, &plan, d(2024, 5, 20)).unwrap().abs() < f64::EPSILON);
        assert!(log.ranges.borrow().is_empty());
    }

    #[test]
    fn test_progress_for_plan_includes_adherence() {
        let plan = sample_plan();
        let log = MockLog::new(vec![entry(d(2024, 6, 1), true), entry(d(2024, 6, 2), false)]);
        let p = progress_for_plan(&plan, d(2024, 6, 2), &log)
            .unwrap()
            .unwrap();
        assert_eq!(p.current_day, 2);
        assert!((p.adherence_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_active_transition_statuses() {
        let plan = sample_plan();
        let progress = calculate_progress(&plan, d(2024, 6, 8), 0.0).unwrap();
        let active = ActiveTransition::new(plan, progress);
        assert_eq!(
            active.phase_statuses,
            vec![
                PhaseStatus::Completed,
                PhaseStatus::Completed,
                PhaseStatus::Current,
                PhaseStatus::Upcoming,
                PhaseStatus::Upcoming,
            ]
        );
    }
}
