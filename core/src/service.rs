use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::guidance::{self, Recommendation};
use crate::models::{
    ActivityLevel, AppSettings, DogProfile, ExportData, FeedingEntry, ImportSummary,
    NewDogProfile, NewFeedingEntry, NewTransitionPlan, TransitionPhase, TransitionPlan,
    UpdateDogProfile, UpdateFeedingEntry, UpdateTransitionPlan, WeightGoal,
};
use crate::repository::{
    FeedingLogRepository, ProfileRepository, SettingsRepository, TransitionRepository,
};
use crate::sample;
use crate::stats::{self, ProgressStats, WeightTrend};
use crate::transition::{
    ActiveTransition, MixSuggestion, days_since_start, mix_suggestion, phase_for_day,
    progress_for_plan,
};

/// One day's log as entered by the owner. The blend split is filled in from
/// the active transition plan.
#[derive(Debug, Clone)]
pub struct DailyLogInput {
    pub dog_id: String,
    pub date: NaiveDate,
    pub am_weight: Option<f64>,
    pub pm_weight: Option<f64>,
    pub food_amount: f64,
    pub calories: i64,
    pub notes: Option<String>,
    pub followed_plan_today: bool,
}

/// The blend in effect for a dog on a given date.
#[derive(Debug, Clone, Serialize)]
pub struct Blend {
    pub plan_id: String,
    pub day: i64,
    pub phase: TransitionPhase,
    pub old_food_name: String,
    pub new_food_name: String,
    pub suggestion: MixSuggestion,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    pub entry: FeedingEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend: Option<Blend>,
}

pub struct KibbleService {
    db: Database,
}

impl KibbleService {
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    // --- Profiles ---

    /// Add a profile. The first profile becomes the active one.
    pub fn add_profile(&self, profile: &NewDogProfile) -> Result<DogProfile> {
        let created = self.db.insert_profile(profile)?;
        if self.db.active_profile_id()?.is_none() {
            self.db.set_active_profile_id(Some(&created.id))?;
        }
        Ok(created)
    }

    pub fn update_profile(&self, id: &str, update: &UpdateDogProfile) -> Result<DogProfile> {
        self.db.update_profile(id, update)
    }

    pub fn delete_profile(&self, id: &str) -> Result<bool> {
        self.db.delete_profile(id)
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<DogProfile>> {
        self.db.get_profile(id)
    }

    pub fn list_profiles(&self) -> Result<Vec<DogProfile>> {
        self.db.list_profiles()
    }

    pub fn active_profile(&self) -> Result<Option<DogProfile>> {
        match self.db.active_profile_id()? {
            Some(id) => self.db.get_profile(&id),
            None => Ok(None),
        }
    }

    pub fn set_active_profile(&self, id: &str) -> Result<DogProfile> {
        self.db.set_active_profile_id(Some(id))?;
        self.db.get_profile(id)?.context("Dog profile not found")
    }

    /// Find a profile by id or case-insensitive name, or the active one when
    /// `selector` is `None`.
    pub fn resolve_profile(&self, selector: Option<&str>) -> Result<Option<DogProfile>> {
        let Some(selector) = selector else {
            return self.active_profile();
        };
        if let Some(profile) = self.db.get_profile(selector)? {
            return Ok(Some(profile));
        }
        let matches: Vec<DogProfile> = self
            .db
            .list_profiles()?
            .into_iter()
            .filter(|p| p.name.eq_ignore_ascii_case(selector))
            .collect();
        match matches.len() {
            0 => bail!("No dog profile matches '{selector}'"),
            1 => Ok(matches.into_iter().next()),
            n => bail!("{n} dog profiles are named '{selector}'; use the profile id instead"),
        }
    }

    // --- Feeding log ---

    /// Save the day's log for a dog, recording the suggested blend when a
    /// transition plan is running on that date.
    pub fn daily_log(&self, input: &DailyLogInput) -> Result<DailyLog> {
        self.db
            .get_profile(&input.dog_id)?
            .context("Dog profile not found")?;
        let blend = self.blend_for(&input.dog_id, input.date, input.food_amount)?;
        let entry = self.db.upsert_entry(&NewFeedingEntry {
            dog_id: input.dog_id.clone(),
            date: input.date,
            am_weight: input.am_weight,
            pm_weight: input.pm_weight,
            food_amount: input.food_amount,
            calories: input.calories,
            notes: input.notes.clone().filter(|n| !n.trim().is_empty()),
            followed_plan_today: input.followed_plan_today,
            old_food_amount: blend.as_ref().map(|b| b.suggestion.old_food_amount),
            new_food_amount: blend.as_ref().map(|b| b.suggestion.new_food_amount),
        })?;
        Ok(DailyLog { entry, blend })
    }

    /// Blend for `total_amount` of food on `date` under the dog's active plan.
    ///
    /// `None` without an active plan or before the plan starts.
    pub fn blend_for(
        &self,
        dog_id: &str,
        date: NaiveDate,
        total_amount: f64,
    ) -> Result<Option<Blend>> {
        let Some(plan) = self.db.active_plan(dog_id)? else {
            return Ok(None);
        };
        let day = days_since_start(plan.start_date, date);
        let Some(phase) = phase_for_day(&plan.phases, day) else {
            return Ok(None);
        };
        if day < phase.start_day {
            return Ok(None);
        }
        Ok(Some(Blend {
            suggestion: mix_suggestion(total_amount, phase),
            phase: phase.clone(),
            day,
            plan_id: plan.id,
            old_food_name: plan.old_food_name,
            new_food_name: plan.new_food_name,
        }))
    }

    /// Patch an entry. A new food amount re-splits the day's blend under the active plan.
    pub fn update_entry(&self, id: &str, update: &UpdateFeedingEntry) -> Result<FeedingEntry> {
        let Some(amount) = update.food_amount else {
            return self.db.update_entry(id, update);
        };
        let entry = self.db.get_entry(id)?.context("Feeding entry not found")?;
        let blend = self.blend_for(&entry.dog_id, entry.date, amount)?;
        let update = UpdateFeedingEntry {
            old_food_amount: Some(blend.as_ref().map(|b| b.suggestion.old_food_amount)),
            new_food_amount: Some(blend.as_ref().map(|b| b.suggestion.new_food_amount)),
            ..update.clone()
        };
        self.db.update_entry(id, &update)
    }

    pub fn delete_entry(&self, id: &str) -> Result<bool> {
        self.db.delete_entry(id)
    }

    pub fn get_entry(&self, id: &str) -> Result<Option<FeedingEntry>> {
        self.db.get_entry(id)
    }

    pub fn entry_for_date(&self, dog_id: &str, date: NaiveDate) -> Result<Option<FeedingEntry>> {
        self.db.entry_for_date(dog_id, date)
    }

    pub fn entries_for_dog(&self, dog_id: &str) -> Result<Vec<FeedingEntry>> {
        self.db.entries_for_dog(dog_id)
    }

    pub fn recent_entries(
        &self,
        dog_id: &str,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<FeedingEntry>> {
        self.db.recent_entries(dog_id, today, days)
    }

    // --- Transitions ---

    /// Create a plan and make it the dog's only active one.
    pub fn start_transition(&self, plan: &NewTransitionPlan) -> Result<TransitionPlan> {
        self.db
            .get_profile(&plan.dog_id)?
            .context("Dog profile not found")?;
        let plan = NewTransitionPlan {
            is_active: true,
            ..plan.clone()
        };
        let created = self.db.insert_plan(&plan)?;
        tracing::info!(plan = %created.id, dog = %created.dog_id, "started transition");
        Ok(created)
    }

    pub fn add_plan(&self, plan: &NewTransitionPlan) -> Result<TransitionPlan> {
        self.db
            .get_profile(&plan.dog_id)?
            .context("Dog profile not found")?;
        self.db.insert_plan(plan)
    }

    pub fn update_plan(&self, id: &str, update: &UpdateTransitionPlan) -> Result<TransitionPlan> {
        self.db.update_plan(id, update)
    }

    pub fn delete_plan(&self, id: &str) -> Result<bool> {
        self.db.delete_plan(id)
    }

    pub fn get_plan(&self, id: &str) -> Result<Option<TransitionPlan>> {
        self.db.get_plan(id)
    }

    pub fn plans_for_dog(&self, dog_id: &str) -> Result<Vec<TransitionPlan>> {
        self.db.plans_for_dog(dog_id)
    }

    pub fn active_plan(&self, dog_id: &str) -> Result<Option<TransitionPlan>> {
        self.db.active_plan(dog_id)
    }

    pub fn activate_plan(&self, id: &str) -> Result<TransitionPlan> {
        self.db.activate_plan(id)
    }

    /// Deactivate every plan for the dog. Returns how many were active.
    pub fn stop_transition(&self, dog_id: &str) -> Result<usize> {
        self.db.deactivate_all_plans(dog_id)
    }

    /// The dog's active plan with today's progress, or `None` without one.
    pub fn active_progress(
        &self,
        dog_id: &str,
        today: NaiveDate,
    ) -> Result<Option<ActiveTransition>> {
        match self.db.active_plan(dog_id)? {
            Some(plan) => self.with_progress(plan, today),
            None => Ok(None),
        }
    }

    /// Progress for any plan by id, active or not.
    pub fn plan_progress(&self, plan_id: &str, today: NaiveDate) -> Result<Option<ActiveTransition>> {
        let plan = self
            .db
            .get_plan(plan_id)?
            .context("Transition plan not found")?;
        self.with_progress(plan, today)
    }

    fn with_progress(
        &self,
        plan: TransitionPlan,
        today: NaiveDate,
    ) -> Result<Option<ActiveTransition>> {
        Ok(progress_for_plan(&plan, today, &self.db)?
            .map(|progress| ActiveTransition::new(plan, progress)))
    }

    // --- Advisor ---

    pub fn advise(
        &self,
        weight_lbs: f64,
        goal: WeightGoal,
        activity: ActivityLevel,
        calories_per_cup: Option<f64>,
    ) -> Result<Recommendation> {
        guidance::recommend(weight_lbs, goal, activity, calories_per_cup)
    }

    /// Advise for a dog, defaulting the weight to the profile's current weight.
    pub fn advise_for_profile(
        &self,
        dog_id: &str,
        weight_lbs: Option<f64>,
        goal: WeightGoal,
        activity: ActivityLevel,
        calories_per_cup: Option<f64>,
    ) -> Result<Recommendation> {
        let profile = self
            .db
            .get_profile(dog_id)?
            .context("Dog profile not found")?;
        let Some(weight) = weight_lbs.or(profile.current_weight_lbs) else {
            bail!("Please enter a valid current weight");
        };
        guidance::recommend(weight, goal, activity, calories_per_cup)
    }

    // --- Stats ---

    pub fn stats(&self, dog_id: &str) -> Result<ProgressStats> {
        let profile = self
            .db
            .get_profile(dog_id)?
            .context("Dog profile not found")?;
        let entries = self.db.entries_for_dog(dog_id)?;
        Ok(stats::progress_stats(&entries, profile.current_weight_lbs))
    }

    /// Weight readings from the last `points` weighed days, oldest first.
    pub fn weight_history(&self, dog_id: &str, points: usize) -> Result<Vec<WeightTrend>> {
        let entries = self.db.entries_for_dog(dog_id)?;
        Ok(stats::weight_trend(&stats::weight_series(&entries, points)))
    }

    // --- Settings ---

    pub fn settings(&self) -> Result<AppSettings> {
        self.db.load_settings()
    }

    /// Change one setting by key and persist the whole settings object.
    pub fn update_setting(&self, key: &str, value: &str) -> Result<AppSettings> {
        let mut settings = self.db.load_settings()?;
        settings.apply(key, value)?;
        self.db.save_settings(&settings)?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.db.save_settings(settings)
    }

    pub fn reset_settings(&self) -> Result<AppSettings> {
        self.db.reset_settings()?;
        self.db.load_settings()
    }

    // --- Sample data ---

    /// Add the demo dog with a transition that started yesterday.
    pub fn load_sample_data(&self, today: NaiveDate) -> Result<DogProfile> {
        let profile = self.add_profile(&sample::sample_profile())?;
        let start = today - Duration::days(1);
        self.start_transition(&sample::sample_plan(&profile.id, start))?;
        for entry in sample::sample_entries(&profile.id, start) {
            self.db.upsert_entry(&entry)?;
        }
        Ok(profile)
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        self.db.export_all()
    }

    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        self.db.import_all(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::PhaseStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn new_dog(name: &str) -> NewDogProfile {
        NewDogProfile {
            name: name.to_string(),
            breed: "Mixed".to_string(),
            ideal_weight_lbs: 25.0,
            current_weight_lbs: Some(27.5),
            ..Default::default()
        }
    }

    fn plan_for(dog_id: &str, start: NaiveDate) -> NewTransitionPlan {
        sample::sample_plan(dog_id, start)
    }

    fn log_input(dog_id: &str, date: NaiveDate, followed: bool) -> DailyLogInput {
        DailyLogInput {
            dog_id: dog_id.to_string(),
            date,
            am_weight: Some(27.8),
            pm_weight: Some(27.6),
            food_amount: 2.5,
            calories: 850,
            notes: Some("  ".to_string()),
            followed_plan_today: followed,
        }
    }

    #[test]
    fn test_first_profile_becomes_active() {
        let svc = KibbleService::new_in_memory().unwrap();
        assert!(svc.active_profile().unwrap().is_none());

        let devo = svc.add_profile(&new_dog("Devo")).unwrap();
        let biscuit = svc.add_profile(&new_dog("Biscuit")).unwrap();
        assert_eq!(svc.active_profile().unwrap().unwrap().id, devo.id);

        svc.set_active_profile(&biscuit.id).unwrap();
        assert_eq!(svc.active_profile().unwrap().unwrap().id, biscuit.id);
    }

    #[test]
    fn test_resolve_profile() {
        let svc = KibbleService::new_in_memory().unwrap();
        let devo = svc.add_profile(&new_dog("Devo")).unwrap();

        assert_eq!(svc.resolve_profile(None).unwrap().unwrap().id, devo.id);
        assert_eq!(svc.resolve_profile(Some("devo")).unwrap().unwrap().id, devo.id);
        assert_eq!(svc.resolve_profile(Some(&devo.id)).unwrap().unwrap().id, devo.id);
        assert!(svc.resolve_profile(Some("Rex")).is_err());

        svc.add_profile(&new_dog("Devo")).unwrap();
        assert!(svc.resolve_profile(Some("Devo")).is_err());
    }

    #[test]
    fn test_daily_log_without_plan_has_no_blend() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        let log = svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();

        assert!(log.blend.is_none());
        assert_eq!(log.entry.average_weight, Some(27.7));
        assert!(log.entry.old_food_amount.is_none());
        assert!(log.entry.notes.is_none());
    }

    #[test]
    fn test_daily_log_records_blend() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        svc.start_transition(&plan_for(&dog.id, d(2024, 6, 1))).unwrap();

        let log = svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();
        let blend = log.blend.unwrap();
        assert_eq!(blend.day, 1);
        assert_eq!(blend.phase.label, "Days 1-3");
        assert_eq!(log.entry.old_food_amount, Some(1.9));
        assert_eq!(log.entry.new_food_amount, Some(0.6));

        let log = svc.daily_log(&log_input(&dog.id, d(2024, 6, 5), true)).unwrap();
        assert_eq!(log.entry.old_food_amount, Some(1.3));
        assert_eq!(log.entry.new_food_amount, Some(1.3));
    }

    #[test]
    fn test_daily_log_before_plan_start_has_no_blend() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        svc.start_transition(&plan_for(&dog.id, d(2024, 6, 10))).unwrap();

        let log = svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();
        assert!(log.blend.is_none());
    }

    #[test]
    fn test_daily_log_same_day_updates() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        let first = svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();
        let mut input = log_input(&dog.id, d(2024, 6, 1), false);
        input.calories = 900;
        let second = svc.daily_log(&input).unwrap();

        assert_eq!(first.entry.id, second.entry.id);
        assert_eq!(second.entry.calories, 900);
        assert!(!second.entry.followed_plan_today);
    }

    #[test]
    fn test_daily_log_unknown_dog() {
        let svc = KibbleService::new_in_memory().unwrap();
        assert!(svc.daily_log(&log_input("nope", d(2024, 6, 1), true)).is_err());
    }

    #[test]
    fn test_start_transition_replaces_active_plan() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        let first = svc.start_transition(&plan_for(&dog.id, d(2024, 6, 1))).unwrap();
        let second = svc.start_transition(&plan_for(&dog.id, d(2024, 7, 1))).unwrap();

        assert_eq!(svc.active_plan(&dog.id).unwrap().unwrap().id, second.id);
        assert!(!svc.get_plan(&first.id).unwrap().unwrap().is_active);
        assert_eq!(svc.plans_for_dog(&dog.id).unwrap().len(), 2);

        assert_eq!(svc.stop_transition(&dog.id).unwrap(), 1);
        assert!(svc.active_progress(&dog.id, d(2024, 7, 2)).unwrap().is_none());
    }

    #[test]
    fn test_active_progress_uses_log_adherence() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        svc.start_transition(&plan_for(&dog.id, d(2024, 6, 1))).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 6, 2), true)).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 6, 3), true)).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 6, 4), false)).unwrap();

        let active = svc.active_progress(&dog.id, d(2024, 6, 5)).unwrap().unwrap();
        assert_eq!(active.progress.current_day, 5);
        assert_eq!(active.progress.current_phase.label, "Days 4-6");
        assert!((active.progress.adherence_rate - 75.0).abs() < 1e-9);
        assert_eq!(active.phase_statuses[0], PhaseStatus::Completed);
        assert_eq!(active.phase_statuses[1], PhaseStatus::Current);
    }

    #[test]
    fn test_plan_progress_missing_plan() {
        let svc = KibbleService::new_in_memory().unwrap();
        assert!(svc.plan_progress("missing", d(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_advise_for_profile_defaults_weight() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();

        let rec = svc
            .advise_for_profile(&dog.id, None, WeightGoal::Maintain, ActivityLevel::Moderate, None)
            .unwrap();
        assert!((rec.weight_lbs - 27.5).abs() < f64::EPSILON);
        assert_eq!(rec.calories, 750);

        let rec = svc
            .advise_for_profile(
                &dog.id,
                Some(40.0),
                WeightGoal::Lose,
                ActivityLevel::Active,
                Some(400.0),
            )
            .unwrap();
        assert_eq!(rec.calories, 960);
        assert!((rec.cups - 2.4).abs() < f64::EPSILON);

        let no_weight = svc
            .add_profile(&NewDogProfile {
                current_weight_lbs: None,
                ..new_dog("Biscuit")
            })
            .unwrap();
        assert!(
            svc.advise_for_profile(
                &no_weight.id,
                None,
                WeightGoal::Maintain,
                ActivityLevel::Moderate,
                None
            )
            .is_err()
        );
    }

    #[test]
    fn test_stats_and_weight_history() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        assert_eq!(svc.stats(&dog.id).unwrap().total_entries, 0);
        assert!((svc.stats(&dog.id).unwrap().current_weight - 27.5).abs() < f64::EPSILON);

        svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();
        let mut input = log_input(&dog.id, d(2024, 6, 2), false);
        input.am_weight = Some(27.0);
        input.pm_weight = None;
        input.calories = 800;
        svc.daily_log(&input).unwrap();

        let stats = svc.stats(&dog.id).unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.average_calories, 825);
        assert_eq!(stats.adherence_rate, 50);
        assert!((stats.current_weight - 27.0).abs() < f64::EPSILON);

        let history = svc.weight_history(&dog.id, 14).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].trend, stats::Trend::Down);
    }

    #[test]
    fn test_update_entry_food_resplits_blend() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        let start = d(2024, 6, 1);
        svc.start_transition(&plan_for(&dog.id, start)).unwrap();
        let logged = svc.daily_log(&log_input(&dog.id, start, true)).unwrap().entry;
        assert_eq!(logged.old_food_amount, Some(1.9));

        let updated = svc
            .update_entry(
                &logged.id,
                &UpdateFeedingEntry {
                    food_amount: Some(4.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!((updated.food_amount - 4.0).abs() < f64::EPSILON);
        assert_eq!(updated.old_food_amount, Some(3.0));
        assert_eq!(updated.new_food_amount, Some(1.0));

        svc.stop_transition(&dog.id).unwrap();
        let cleared = svc
            .update_entry(
                &logged.id,
                &UpdateFeedingEntry {
                    food_amount: Some(3.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.old_food_amount, None);
        assert_eq!(cleared.new_food_amount, None);
    }

    #[test]
    fn test_recent_entries_with_huge_window_returns_whole_log() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 5, 1), true)).unwrap();
        svc.daily_log(&log_input(&dog.id, d(2024, 6, 1), true)).unwrap();

        let entries = svc
            .recent_entries(&dog.id, d(2024, 6, 1), 1_000_000_000)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            svc.recent_entries(&dog.id, d(2024, 6, 1), i64::MAX).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_start_transition_rejects_overlong_phases() {
        let svc = KibbleService::new_in_memory().unwrap();
        let dog = svc.add_profile(&new_dog("Devo")).unwrap();
        let mut plan = plan_for(&dog.id, d(2024, 6, 1));
        let mut phase = crate::transition::default_transition_phases().remove(0);
        phase.end_day = 4_000_000_000;
        plan.phases = vec![phase];

        assert!(svc.start_transition(&plan).is_err());
        assert!(svc.active_plan(&dog.id).unwrap().is_none());
    }

    #[test]
    fn test_update_setting_persists() {
        let svc = KibbleService::new_in_memory().unwrap();
        let settings = svc.update_setting("weight_unit", "kilograms").unwrap();
        assert_eq!(settings.weight_unit, crate::models::WeightUnit::Kilograms);
        assert_eq!(svc.settings().unwrap(), settings);

        assert!(svc.update_setting("reminder_time", "noon").is_err());
        assert_eq!(svc.settings().unwrap(), settings);

        assert_eq!(svc.reset_settings().unwrap(), AppSettings::default());
    }

    #[test]
    fn test_load_sample_data() {
        let svc = KibbleService::new_in_memory().unwrap();
        let today = d(2024, 6, 2);
        let devo = svc.load_sample_data(today).unwrap();

        assert_eq!(devo.name, "Devo");
        assert_eq!(svc.active_profile().unwrap().unwrap().id, devo.id);
        assert_eq!(svc.entries_for_dog(&devo.id).unwrap().len(), 2);
        let active = svc.active_progress(&devo.id, today).unwrap().unwrap();
        assert_eq!(active.progress.current_day, 2);
        assert!((active.progress.adherence_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_import_via_service() {
        let svc = KibbleService::new_in_memory().unwrap();
        svc.load_sample_data(d(2024, 6, 2)).unwrap();
        let data = svc.export_all().unwrap();

        let other = KibbleService::new_in_memory().unwrap();
        let summary = other.import_all(&data).unwrap();
        assert_eq!(summary.profiles_imported, 1);
        assert_eq!(summary.feeding_entries_imported, 2);
        assert_eq!(other.active_profile().unwrap().unwrap().name, "Devo");
    }
}
