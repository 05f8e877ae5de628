use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::transition::{default_transition_phases, validate_phases};

pub const LBS_PER_KG: f64 = 2.20462;
pub const KG_PER_LB: f64 = 0.453_592;

/// Round to one decimal place, half away from zero.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average of the AM and PM readings. A single reading stands on its own.
#[must_use]
pub fn average_weight(am: Option<f64>, pm: Option<f64>) -> Option<f64> {
    match (am, pm) {
        (Some(a), Some(p)) => Some(round1((a + p) / 2.0)),
        (Some(w), None) | (None, Some(w)) => Some(w),
        (None, None) => None,
    }
}

// --- Dog profiles ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogProfile {
    pub id: String,
    pub name: String,
    pub breed: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date_of_birth: Option<NaiveDate>,
    pub ideal_weight_lbs: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_weight_lbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl DogProfile {
    /// Human-readable age such as "4 years old" or "7 months old".
    #[must_use]
    pub fn age_label(&self, today: NaiveDate) -> Option<String> {
        let dob = self.date_of_birth?;
        let mut months = (today.year() - dob.year()) * 12 + today.month() as i32
            - dob.month() as i32;
        if today.day() < dob.day() {
            months -= 1;
        }
        let months = months.max(0);
        let years = months / 12;
        Some(if years > 0 {
            format!("{years} year{} old", if years > 1 { "s" } else { "" })
        } else {
            format!("{months} month{} old", if months == 1 { "" } else { "s" })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDogProfile {
    pub name: String,
    pub breed: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub ideal_weight_lbs: f64,
    #[serde(default)]
    pub current_weight_lbs: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct UpdateDogProfile {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub ideal_weight_lbs: Option<f64>,
    pub current_weight_lbs: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
    pub allergies: Option<Vec<String>>,
}

impl UpdateDogProfile {
    /// Apply the update in place and check the result.
    pub fn apply(&self, profile: &mut DogProfile) -> Result<()> {
        if let Some(ref name) = self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(ref breed) = self.breed {
            profile.breed = breed.trim().to_string();
        }
        if let Some(dob) = self.date_of_birth {
            profile.date_of_birth = dob;
        }
        if let Some(ideal) = self.ideal_weight_lbs {
            profile.ideal_weight_lbs = ideal;
        }
        if let Some(current) = self.current_weight_lbs {
            profile.current_weight_lbs = current;
        }
        if let Some(ref notes) = self.notes {
            profile.notes = notes.clone().filter(|n| !n.trim().is_empty());
        }
        if let Some(ref allergies) = self.allergies {
            profile.allergies.clone_from(allergies);
        }
        validate_profile(
            &profile.name,
            &profile.breed,
            profile.ideal_weight_lbs,
            profile.current_weight_lbs,
        )
    }
}

/// Split a comma-separated allergy list, dropping blanks.
#[must_use]
pub fn parse_allergies(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_profile(
    name: &str,
    breed: &str,
    ideal_weight_lbs: f64,
    current_weight_lbs: Option<f64>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Dog name must not be empty");
    }
    if breed.trim().is_empty() {
        bail!("Breed must not be empty");
    }
    validate_weight("ideal_weight_lbs", ideal_weight_lbs)?;
    if let Some(w) = current_weight_lbs {
        validate_weight("current_weight_lbs", w)?;
    }
    Ok(())
}

fn validate_weight(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        bail!("{field} must be a number greater than 0");
    }
    Ok(())
}

// --- Feeding log ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingEntry {
    pub id: String,
    pub dog_id: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub am_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pm_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_weight: Option<f64>,
    pub food_amount: f64,
    pub calories: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub followed_plan_today: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub old_food_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_food_amount: Option<f64>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl FeedingEntry {
    /// Best available weight for the day: the average, else whichever reading exists.
    #[must_use]
    pub fn effective_weight(&self) -> Option<f64> {
        self.average_weight.or(self.am_weight).or(self.pm_weight)
    }
}

#[derive(Debug, Clone)]
pub struct NewFeedingEntry {
    pub dog_id: String,
    pub date: NaiveDate,
    pub am_weight: Option<f64>,
    pub pm_weight: Option<f64>,
    pub food_amount: f64,
    pub calories: i64,
    pub notes: Option<String>,
    pub followed_plan_today: bool,
    pub old_food_amount: Option<f64>,
    pub new_food_amount: Option<f64>,
}

#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct UpdateFeedingEntry {
    pub am_weight: Option<Option<f64>>,
    pub pm_weight: Option<Option<f64>>,
    pub food_amount: Option<f64>,
    pub calories: Option<i64>,
    pub notes: Option<Option<String>>,
    pub followed_plan_today: Option<bool>,
    pub old_food_amount: Option<Option<f64>>,
    pub new_food_amount: Option<Option<f64>>,
}

impl UpdateFeedingEntry {
    /// Apply the update in place, recomputing the average weight.
    pub fn apply(&self, entry: &mut FeedingEntry) {
        if let Some(am) = self.am_weight {
            entry.am_weight = am;
        }
        if let Some(pm) = self.pm_weight {
            entry.pm_weight = pm;
        }
        if let Some(amount) = self.food_amount {
            entry.food_amount = amount;
        }
        if let Some(calories) = self.calories {
            entry.calories = calories;
        }
        if let Some(ref notes) = self.notes {
            entry.notes.clone_from(notes);
        }
        if let Some(followed) = self.followed_plan_today {
            entry.followed_plan_today = followed;
        }
        if let Some(old) = self.old_food_amount {
            entry.old_food_amount = old;
        }
        if let Some(new) = self.new_food_amount {
            entry.new_food_amount = new;
        }
        entry.average_weight = average_weight(entry.am_weight, entry.pm_weight);
    }
}

pub fn validate_feeding_values(
    am_weight: Option<f64>,
    pm_weight: Option<f64>,
    food_amount: f64,
    calories: i64,
) -> Result<()> {
    if let Some(w) = am_weight {
        validate_weight("am_weight", w)?;
    }
    if let Some(w) = pm_weight {
        validate_weight("pm_weight", w)?;
    }
    if !food_amount.is_finite() || food_amount < 0.0 {
        bail!("food_amount must be a number of at least 0");
    }
    if calories < 0 {
        bail!("calories must not be negative");
    }
    Ok(())
}

pub fn validate_feeding_entry(entry: &FeedingEntry) -> Result<()> {
    validate_feeding_values(
        entry.am_weight,
        entry.pm_weight,
        entry.food_amount,
        entry.calories,
    )
}

// --- Transition plans ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPhase {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub start_day: i64,
    pub end_day: i64,
    pub old_food_percentage: u8,
    pub new_food_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl TransitionPhase {
    #[must_use]
    pub fn contains_day(&self, day: i64) -> bool {
        self.start_day <= day && day <= self.end_day
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub id: String,
    pub dog_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub phases: Vec<TransitionPhase>,
    pub old_food_name: String,
    pub new_food_name: String,
    pub total_days: i64,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl TransitionPlan {
    /// Last calendar day covered by the plan (start date is day 1).
    /// Saturates at the latest representable date.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        chrono::Duration::try_days((self.total_days - 1).max(0))
            .and_then(|span| self.start_date.checked_add_signed(span))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransitionPlan {
    pub dog_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    /// Empty means the default five-phase schedule.
    #[serde(default)]
    pub phases: Vec<TransitionPhase>,
    pub old_food_name: String,
    pub new_food_name: String,
    /// Defaults to the last phase's end day.
    #[serde(default)]
    pub total_days: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
}

impl NewTransitionPlan {
    /// Phases and length the plan will be stored with: the default schedule
    /// when no phases are given, phase ids filled in, everything validated.
    pub fn schedule(&self) -> Result<(Vec<TransitionPhase>, i64)> {
        if self.name.trim().is_empty() {
            bail!("Plan name must not be empty");
        }
        let mut phases = if self.phases.is_empty() {
            default_transition_phases()
        } else {
            self.phases.clone()
        };
        for (i, phase) in phases.iter_mut().enumerate() {
            if phase.id.is_empty() {
                phase.id = format!("phase-{}", i + 1);
            }
        }
        let total_days = match self.total_days {
            Some(days) => days,
            None => phases.last().map_or(0, |p| p.end_day),
        };
        validate_phases(&phases, total_days)?;
        Ok((phases, total_days))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransitionPlan {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub phases: Option<Vec<TransitionPhase>>,
    #[serde(default)]
    pub old_food_name: Option<String>,
    #[serde(default)]
    pub new_food_name: Option<String>,
}

impl UpdateTransitionPlan {
    /// Apply the update in place. New phases reset the length to the last
    /// phase's end day.
    pub fn apply(&self, plan: &mut TransitionPlan) -> Result<()> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                bail!("Plan name must not be empty");
            }
            plan.name = name.trim().to_string();
        }
        if let Some(start) = self.start_date {
            plan.start_date = start;
        }
        if let Some(ref phases) = self.phases {
            plan.phases.clone_from(phases);
            plan.total_days = phases.last().map_or(0, |p| p.end_day);
        }
        if let Some(ref old) = self.old_food_name {
            plan.old_food_name = old.trim().to_string();
        }
        if let Some(ref new) = self.new_food_name {
            plan.new_food_name = new.trim().to_string();
        }
        validate_phases(&plan.phases, plan.total_days)
    }
}

// --- Advisor inputs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeightGoal {
    #[default]
    Maintain,
    Lose,
    Gain,
}

impl WeightGoal {
    pub const ALL: [WeightGoal; 3] = [Self::Maintain, Self::Lose, Self::Gain];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Maintain => "Maintain Current Weight",
            Self::Lose => "Lose Weight",
            Self::Gain => "Gain Weight",
        }
    }
}

impl fmt::Display for WeightGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Maintain => "maintain",
            Self::Lose => "lose",
            Self::Gain => "gain",
        })
    }
}

impl FromStr for WeightGoal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "maintain" => Ok(Self::Maintain),
            "lose" => Ok(Self::Lose),
            "gain" => Ok(Self::Gain),
            _ => bail!("Invalid goal '{s}'. Must be one of: maintain, lose, gain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 4] = [
        Self::Sedentary,
        Self::Moderate,
        Self::Active,
        Self::VeryActive,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary (minimal exercise)",
            Self::Moderate => "Moderate (daily walks)",
            Self::Active => "Active (regular exercise)",
            Self::VeryActive => "Very Active (intense daily exercise)",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sedentary => "sedentary",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "veryActive",
        })
    }
}

impl FromStr for ActivityLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "moderate" => Ok(Self::Moderate),
            "active" => Ok(Self::Active),
            "veryactive" => Ok(Self::VeryActive),
            _ => bail!(
                "Invalid activity level '{s}'. Must be one of: sedentary, moderate, active, veryActive"
            ),
        }
    }
}

// --- Settings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Pounds,
    Kilograms,
}

impl WeightUnit {
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Pounds => "lbs",
            Self::Kilograms => "kg",
        }
    }

    /// Convert a value expressed in this unit to pounds.
    #[must_use]
    pub fn to_pounds(self, value: f64) -> f64 {
        match self {
            Self::Pounds => value,
            Self::Kilograms => value * LBS_PER_KG,
        }
    }

    /// Convert pounds into this unit.
    #[must_use]
    pub fn from_pounds(self, pounds: f64) -> f64 {
        match self {
            Self::Pounds => pounds,
            Self::Kilograms => pounds * KG_PER_LB,
        }
    }

    #[must_use]
    pub fn format(self, pounds: f64) -> String {
        format!("{:.1} {}", self.from_pounds(pounds), self.abbreviation())
    }
}

impl FromStr for WeightUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pounds" | "lbs" | "lb" => Ok(Self::Pounds),
            "kilograms" | "kg" => Ok(Self::Kilograms),
            _ => bail!("Invalid weight unit '{s}'. Use 'pounds' or 'kilograms'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodUnit {
    #[default]
    Cups,
    Grams,
}

impl FoodUnit {
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Cups => "cups",
            Self::Grams => "g",
        }
    }
}

impl FromStr for FoodUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cups" | "cup" => Ok(Self::Cups),
            "grams" | "g" => Ok(Self::Grams),
            _ => bail!("Invalid food unit '{s}'. Use 'cups' or 'grams'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardRadius {
    Sharp,
    #[default]
    Rounded,
    VeryRounded,
}

/// Presentation options handed to rendering layers. Nothing in the domain reads these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub theme: Theme,
    pub accent_color: AccentColor,
    pub font_size: FontSize,
    pub animation_speed: AnimationSpeed,
    pub card_radius: CardRadius,
}

impl Presentation {
    #[must_use]
    pub fn animation_duration_ms(&self) -> u32 {
        match self.animation_speed {
            AnimationSpeed::Slow => 800,
            AnimationSpeed::Normal => 400,
            AnimationSpeed::Fast => 200,
        }
    }

    #[must_use]
    pub fn border_radius(&self) -> u32 {
        match self.card_radius {
            CardRadius::Sharp => 4,
            CardRadius::Rounded => 12,
            CardRadius::VeryRounded => 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub weight_unit: WeightUnit,
    pub food_unit: FoodUnit,
    pub reminder_enabled: bool,
    pub reminder_time: String,
    pub transition_reminder_enabled: bool,
    pub presentation: Presentation,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::default(),
            food_unit: FoodUnit::default(),
            reminder_enabled: false,
            reminder_time: "08:00".to_string(),
            transition_reminder_enabled: true,
            presentation: Presentation::default(),
        }
    }
}

pub const SETTING_KEYS: &[&str] = &[
    "weight_unit",
    "food_unit",
    "reminder_enabled",
    "reminder_time",
    "transition_reminder_enabled",
    "theme",
    "accent_color",
    "font_size",
    "animation_speed",
    "card_radius",
];

impl AppSettings {
    /// Set a single field from its textual form, e.g. `("weight_unit", "kilograms")`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.replace('-', "_").to_lowercase();
        match key.as_str() {
            "weight_unit" => self.weight_unit = value.parse()?,
            "food_unit" => self.food_unit = value.parse()?,
            "reminder_enabled" => self.reminder_enabled = parse_bool(value)?,
            "reminder_time" => {
                validate_reminder_time(value)?;
                self.reminder_time = value.to_string();
            }
            "transition_reminder_enabled" => self.transition_reminder_enabled = parse_bool(value)?,
            "theme" => self.presentation.theme = parse_enum(&key, value)?,
            "accent_color" => self.presentation.accent_color = parse_enum(&key, value)?,
            "font_size" => self.presentation.font_size = parse_enum(&key, value)?,
            "animation_speed" => self.presentation.animation_speed = parse_enum(&key, value)?,
            "card_radius" => self.presentation.card_radius = parse_enum(&key, value)?,
            _ => bail!(
                "Unknown setting '{key}'. Must be one of: {}",
                SETTING_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => bail!("Invalid boolean '{value}'. Use true/false or on/off"),
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| anyhow::anyhow!("Invalid value '{value}' for {key}"))
}

pub fn validate_reminder_time(value: &str) -> Result<()> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| anyhow::anyhow!("Invalid reminder time '{value}'. Use HH:MM"))?;
    Ok(())
}

// --- Export / Import types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: i64,
    pub exported_at: String,
    pub profiles: Vec<DogProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_id: Option<String>,
    #[serde(default)]
    pub feeding_entries: Vec<FeedingEntry>,
    #[serde(default)]
    pub transition_plans: Vec<TransitionPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
}

impl ExportData {
    /// Check the version and every record. Import writes nothing unless this passes.
    pub fn validate(&self) -> Result<()> {
        if self.version > EXPORT_VERSION {
            bail!(
                "Unsupported export version {} (this build reads up to {EXPORT_VERSION})",
                self.version
            );
        }
        for profile in &self.profiles {
            validate_profile(
                &profile.name,
                &profile.breed,
                profile.ideal_weight_lbs,
                profile.current_weight_lbs,
            )
            .with_context(|| format!("Invalid dog profile '{}'", profile.id))?;
        }
        for entry in &self.feeding_entries {
            validate_feeding_entry(entry)
                .with_context(|| format!("Invalid feeding entry '{}'", entry.id))?;
        }
        for plan in &self.transition_plans {
            validate_phases(&plan.phases, plan.total_days)
                .with_context(|| format!("Invalid transition plan '{}'", plan.id))?;
        }
        if let Some(settings) = &self.settings {
            validate_reminder_time(&settings.reminder_time).context("Invalid settings")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub profiles_imported: i64,
    pub feeding_entries_imported: i64,
    pub transition_plans_imported: i64,
    pub settings_imported: bool,
}

pub const EXPORT_VERSION: i64 = 1;
