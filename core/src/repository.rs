//! Storage contracts for profiles, the feeding log, transition plans, and settings.
//!
//! Calculations take these as `&dyn` collaborators so they can run against the
//! SQLite store or an in-memory double.

use anyhow::Result;
use chrono::{Duration, NaiveDate};

use crate::models::{
    AppSettings, DogProfile, FeedingEntry, NewDogProfile, NewFeedingEntry, NewTransitionPlan,
    TransitionPlan, UpdateDogProfile, UpdateFeedingEntry, UpdateTransitionPlan,
};

pub trait ProfileRepository {
    fn insert_profile(&self, profile: &NewDogProfile) -> Result<DogProfile>;
    fn update_profile(&self, id: &str, update: &UpdateDogProfile) -> Result<DogProfile>;
    /// Removes the profile with its log and plans. If it was active, the
    /// oldest remaining profile becomes active.
    fn delete_profile(&self, id: &str) -> Result<bool>;
    fn get_profile(&self, id: &str) -> Result<Option<DogProfile>>;
    fn list_profiles(&self) -> Result<Vec<DogProfile>>;
    fn active_profile_id(&self) -> Result<Option<String>>;
    fn set_active_profile_id(&self, id: Option<&str>) -> Result<()>;
}

pub trait FeedingLogRepository {
    /// Insert or replace the entry for `(dog_id, date)`.
    fn upsert_entry(&self, entry: &NewFeedingEntry) -> Result<FeedingEntry>;
    fn update_entry(&self, id: &str, update: &UpdateFeedingEntry) -> Result<FeedingEntry>;
    fn delete_entry(&self, id: &str) -> Result<bool>;
    fn get_entry(&self, id: &str) -> Result<Option<FeedingEntry>>;
    fn entry_for_date(&self, dog_id: &str, date: NaiveDate) -> Result<Option<FeedingEntry>>;
    /// Newest first.
    fn entries_for_dog(&self, dog_id: &str) -> Result<Vec<FeedingEntry>>;
    /// Entries dated `start..=end`, newest first.
    fn entries_in_range(
        &self,
        dog_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FeedingEntry>>;

    /// Entries from the last `days` days up to `today`, newest first.
    ///
    /// A window reaching past the earliest representable date covers the whole log.
    fn recent_entries(&self, dog_id: &str, today: NaiveDate, days: i64) -> Result<Vec<FeedingEntry>> {
        let start = Duration::try_days(days.max(0))
            .and_then(|span| today.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        self.entries_in_range(dog_id, start, today)
    }
}

pub trait TransitionRepository {
    /// Inserting an active plan deactivates the dog's other plans.
    fn insert_plan(&self, plan: &NewTransitionPlan) -> Result<TransitionPlan>;
    fn update_plan(&self, id: &str, update: &UpdateTransitionPlan) -> Result<TransitionPlan>;
    fn delete_plan(&self, id: &str) -> Result<bool>;
    fn get_plan(&self, id: &str) -> Result<Option<TransitionPlan>>;
    /// Newest start date first.
    fn plans_for_dog(&self, dog_id: &str) -> Result<Vec<TransitionPlan>>;
    fn active_plan(&self, dog_id: &str) -> Result<Option<TransitionPlan>>;
    /// Make `id` the only active plan for its dog.
    fn activate_plan(&self, id: &str) -> Result<TransitionPlan>;
    /// Returns how many plans were deactivated.
    fn deactivate_all_plans(&self, dog_id: &str) -> Result<usize>;
}

pub trait SettingsRepository {
    /// Stored settings over the defaults.
    fn load_settings(&self) -> Result<AppSettings>;
    fn save_settings(&self, settings: &AppSettings) -> Result<()>;
    fn reset_settings(&self) -> Result<()>;
}
