use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{
    AppSettings, DogProfile, EXPORT_VERSION, ExportData, FeedingEntry, ImportSummary,
    NewDogProfile, NewFeedingEntry, NewTransitionPlan, TransitionPhase, TransitionPlan,
    UpdateDogProfile, UpdateFeedingEntry, UpdateTransitionPlan, average_weight,
    validate_feeding_entry, validate_feeding_values, validate_profile,
};
use crate::repository::{
    FeedingLogRepository, ProfileRepository, SettingsRepository, TransitionRepository,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

const ACTIVE_PROFILE_KEY: &str = "active_profile_id";

/// Settings stored under their own key but nested under `presentation` in [`AppSettings`].
const PRESENTATION_KEYS: &[&str] = &[
    "theme",
    "accent_color",
    "font_size",
    "animation_speed",
    "card_radius",
];

const PROFILE_COLUMNS: &str = "id, name, breed, date_of_birth, ideal_weight_lbs, current_weight_lbs,
     notes, allergies, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, dog_id, date, am_weight, pm_weight, average_weight, food_amount,
     calories, notes, followed_plan_today, old_food_amount, new_food_amount, created_at, updated_at";

const PLAN_COLUMNS: &str = "id, dog_id, name, start_date, old_food_name, new_food_name, total_days,
     is_active, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS dog_profiles (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    breed TEXT NOT NULL,
                    date_of_birth TEXT,
                    ideal_weight_lbs REAL NOT NULL,
                    current_weight_lbs REAL,
                    notes TEXT,
                    allergies TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS feeding_entries (
                    id TEXT PRIMARY KEY NOT NULL,
                    dog_id TEXT NOT NULL REFERENCES dog_profiles(id) ON DELETE CASCADE,
                    date TEXT NOT NULL,
                    am_weight REAL,
                    pm_weight REAL,
                    average_weight REAL,
                    food_amount REAL NOT NULL,
                    calories INTEGER NOT NULL,
                    notes TEXT,
                    followed_plan_today INTEGER NOT NULL DEFAULT 0,
                    old_food_amount REAL,
                    new_food_amount REAL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE(dog_id, date)
                );

                CREATE TABLE IF NOT EXISTS transition_plans (
                    id TEXT PRIMARY KEY NOT NULL,
                    dog_id TEXT NOT NULL REFERENCES dog_profiles(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    old_food_name TEXT NOT NULL,
                    new_food_name TEXT NOT NULL,
                    total_days INTEGER NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_transition_plans_one_active
                    ON transition_plans(dog_id) WHERE is_active = 1;

                CREATE TABLE IF NOT EXISTS transition_phases (
                    plan_id TEXT NOT NULL REFERENCES transition_plans(id) ON DELETE CASCADE,
                    position INTEGER NOT NULL,
                    id TEXT NOT NULL,
                    label TEXT NOT NULL,
                    start_day INTEGER NOT NULL,
                    end_day INTEGER NOT NULL,
                    old_food_percentage INTEGER NOT NULL,
                    new_food_percentage INTEGER NOT NULL,
                    description TEXT,
                    PRIMARY KEY (plan_id, position)
                );

                CREATE TABLE IF NOT EXISTS user_settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                CREATE TABLE IF NOT EXISTS app_state (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
            tracing::info!("initialized database schema v1");
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<DogProfile> {
        let allergies: String = row.get(7)?;
        Ok(DogProfile {
            id: row.get(0)?,
            name: row.get(1)?,
            breed: row.get(2)?,
            date_of_birth: optional_date_column(row, 3)?,
            ideal_weight_lbs: row.get(4)?,
            current_weight_lbs: row.get(5)?,
            notes: row.get(6)?,
            allergies: serde_json::from_str(&allergies)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FeedingEntry> {
        Ok(FeedingEntry {
            id: row.get(0)?,
            dog_id: row.get(1)?,
            date: date_column(row, 2)?,
            am_weight: row.get(3)?,
            pm_weight: row.get(4)?,
            average_weight: row.get(5)?,
            food_amount: row.get(6)?,
            calories: row.get(7)?,
            notes: row.get(8)?,
            followed_plan_today: row.get(9)?,
            old_food_amount: row.get(10)?,
            new_food_amount: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    // Phases are loaded separately; see `with_phases`.
    fn plan_from_row(row: &rusqlite::Row) -> rusqlite::Result<TransitionPlan> {
        Ok(TransitionPlan {
            id: row.get(0)?,
            dog_id: row.get(1)?,
            name: row.get(2)?,
            start_date: date_column(row, 3)?,
            phases: Vec::new(),
            old_food_name: row.get(4)?,
            new_food_name: row.get(5)?,
            total_days: row.get(6)?,
            is_active: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn phase_from_row(row: &rusqlite::Row) -> rusqlite::Result<TransitionPhase> {
        Ok(TransitionPhase {
            id: row.get(0)?,
            label: row.get(1)?,
            start_day: row.get(2)?,
            end_day: row.get(3)?,
            old_food_percentage: row.get(4)?,
            new_food_percentage: row.get(5)?,
            description: row.get(6)?,
        })
    }

    // --- Dog profiles ---

    fn write_profile(conn: &Connection, profile: &DogProfile) -> Result<()> {
        conn.execute(
            "INSERT INTO dog_profiles (id, name, breed, date_of_birth, ideal_weight_lbs,
                current_weight_lbs, notes, allergies, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                breed = excluded.breed,
                date_of_birth = excluded.date_of_birth,
                ideal_weight_lbs = excluded.ideal_weight_lbs,
                current_weight_lbs = excluded.current_weight_lbs,
                notes = excluded.notes,
                allergies = excluded.allergies,
                updated_at = excluded.updated_at",
            params![
                profile.id,
                profile.name,
                profile.breed,
                profile.date_of_birth.map(date_to_sql),
                profile.ideal_weight_lbs,
                profile.current_weight_lbs,
                profile.notes,
                serde_json::to_string(&profile.allergies)?,
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        Ok(())
    }

    fn first_profile_id(&self) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM dog_profiles ORDER BY created_at, id LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    // --- Feeding entries ---

    fn write_entry(conn: &Connection, entry: &FeedingEntry) -> Result<()> {
        conn.execute(
            "INSERT INTO feeding_entries (id, dog_id, date, am_weight, pm_weight, average_weight,
                food_amount, calories, notes, followed_plan_today, old_food_amount, new_food_amount,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                dog_id = excluded.dog_id,
                date = excluded.date,
                am_weight = excluded.am_weight,
                pm_weight = excluded.pm_weight,
                average_weight = excluded.average_weight,
                food_amount = excluded.food_amount,
                calories = excluded.calories,
                notes = excluded.notes,
                followed_plan_today = excluded.followed_plan_today,
                old_food_amount = excluded.old_food_amount,
                new_food_amount = excluded.new_food_amount,
                updated_at = excluded.updated_at",
            params![
                entry.id,
                entry.dog_id,
                date_to_sql(entry.date),
                entry.am_weight,
                entry.pm_weight,
                entry.average_weight,
                entry.food_amount,
                entry.calories,
                entry.notes,
                entry.followed_plan_today,
                entry.old_food_amount,
                entry.new_food_amount,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    fn query_entries(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<FeedingEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // --- Transition plans ---

    fn write_plan(conn: &Connection, plan: &TransitionPlan) -> Result<()> {
        if plan.is_active {
            conn.execute(
                "UPDATE transition_plans SET is_active = 0 WHERE dog_id = ?1 AND id <> ?2",
                params![plan.dog_id, plan.id],
            )?;
        }
        conn.execute(
            "INSERT INTO transition_plans (id, dog_id, name, start_date, old_food_name,
                new_food_name, total_days, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                dog_id = excluded.dog_id,
                name = excluded.name,
                start_date = excluded.start_date,
                old_food_name = excluded.old_food_name,
                new_food_name = excluded.new_food_name,
                total_days = excluded.total_days,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at",
            params![
                plan.id,
                plan.dog_id,
                plan.name,
                date_to_sql(plan.start_date),
                plan.old_food_name,
                plan.new_food_name,
                plan.total_days,
                plan.is_active,
                plan.created_at,
                plan.updated_at,
            ],
        )?;

        conn.execute(
            "DELETE FROM transition_phases WHERE plan_id = ?1",
            params![plan.id],
        )?;
        for (position, phase) in plan.phases.iter().enumerate() {
            conn.execute(
                "INSERT INTO transition_phases (plan_id, position, id, label, start_day, end_day,
                    old_food_percentage, new_food_percentage, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    plan.id,
                    i64::try_from(position)?,
                    phase.id,
                    phase.label,
                    phase.start_day,
                    phase.end_day,
                    phase.old_food_percentage,
                    phase.new_food_percentage,
                    phase.description,
                ],
            )?;
        }
        Ok(())
    }

    fn phases_for_plan(&self, plan_id: &str) -> Result<Vec<TransitionPhase>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, start_day, end_day, old_food_percentage, new_food_percentage,
                    description
             FROM transition_phases WHERE plan_id = ?1 ORDER BY position",
        )?;
        let phases = stmt
            .query_map(params![plan_id], Self::phase_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(phases)
    }

    fn with_phases(&self, mut plan: TransitionPlan) -> Result<TransitionPlan> {
        plan.phases = self.phases_for_plan(&plan.id)?;
        Ok(plan)
    }

    fn query_plans(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<TransitionPlan>> {
        let mut stmt = self.conn.prepare(sql)?;
        let plans = stmt
            .query_map(params, Self::plan_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        plans.into_iter().map(|p| self.with_phases(p)).collect()
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        let profiles = self.list_profiles()?;
        let feeding_entries = self.query_entries(
            &format!("SELECT {ENTRY_COLUMNS} FROM feeding_entries ORDER BY dog_id, date"),
            [],
        )?;
        let transition_plans = self.query_plans(
            &format!("SELECT {PLAN_COLUMNS} FROM transition_plans ORDER BY dog_id, start_date"),
            [],
        )?;

        Ok(ExportData {
            version: EXPORT_VERSION,
            exported_at: Local::now().to_rfc3339(),
            profiles,
            active_profile_id: self.active_profile_id()?,
            feeding_entries,
            transition_plans,
            settings: Some(self.load_settings()?),
        })
    }

    /// Upsert every record by id. Nothing is written unless all records validate.
    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        data.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        for profile in &data.profiles {
            Self::write_profile(&tx, profile)?;
        }
        for entry in &data.feeding_entries {
            let mut entry = entry.clone();
            entry.average_weight = average_weight(entry.am_weight, entry.pm_weight);
            tx.execute(
                "DELETE FROM feeding_entries WHERE dog_id = ?1 AND date = ?2 AND id <> ?3",
                params![entry.dog_id, date_to_sql(entry.date), entry.id],
            )?;
            Self::write_entry(&tx, &entry).with_context(|| {
                format!("Failed to import feeding entry '{}' for dog '{}'", entry.id, entry.dog_id)
            })?;
        }
        for plan in &data.transition_plans {
            Self::write_plan(&tx, plan).with_context(|| {
                format!("Failed to import transition plan '{}' for dog '{}'", plan.id, plan.dog_id)
            })?;
        }
        let settings_imported = if let Some(settings) = &data.settings {
            Self::write_settings(&tx, settings)?;
            true
        } else {
            false
        };
        if let Some(id) = &data.active_profile_id {
            if self.get_profile(id)?.is_some() {
                Self::write_active_profile(&tx, Some(id))?;
            } else {
                tracing::warn!(id = %id, "backup names an unknown active profile, ignoring");
            }
        }
        tx.commit()?;

        let summary = ImportSummary {
            profiles_imported: i64::try_from(data.profiles.len())?,
            feeding_entries_imported: i64::try_from(data.feeding_entries.len())?,
            transition_plans_imported: i64::try_from(data.transition_plans.len())?,
            settings_imported,
        };
        tracing::info!(
            profiles = summary.profiles_imported,
            entries = summary.feeding_entries_imported,
            plans = summary.transition_plans_imported,
            "imported backup"
        );
        Ok(summary)
    }

    // --- App state / settings ---

    fn write_active_profile(conn: &Connection, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => {
                conn.execute(
                    "INSERT INTO app_state (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![ACTIVE_PROFILE_KEY, id],
                )?;
            }
            None => {
                conn.execute(
                    "DELETE FROM app_state WHERE key = ?1",
                    params![ACTIVE_PROFILE_KEY],
                )?;
            }
        }
        Ok(())
    }

    fn write_settings(conn: &Connection, settings: &AppSettings) -> Result<()> {
        let now = Local::now().to_rfc3339();
        conn.execute("DELETE FROM user_settings", [])?;
        for (key, value) in settings_to_pairs(settings)? {
            conn.execute(
                "INSERT INTO user_settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        Ok(())
    }
}

impl ProfileRepository for Database {
    fn insert_profile(&self, profile: &NewDogProfile) -> Result<DogProfile> {
        validate_profile(
            &profile.name,
            &profile.breed,
            profile.ideal_weight_lbs,
            profile.current_weight_lbs,
        )?;
        let now = Local::now().to_rfc3339();
        let created = DogProfile {
            id: Uuid::new_v4().to_string(),
            name: profile.name.trim().to_string(),
            breed: profile.breed.trim().to_string(),
            date_of_birth: profile.date_of_birth,
            ideal_weight_lbs: profile.ideal_weight_lbs,
            current_weight_lbs: profile.current_weight_lbs,
            notes: profile.notes.clone().filter(|n| !n.trim().is_empty()),
            allergies: profile.allergies.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        Self::write_profile(&self.conn, &created)?;
        tracing::debug!(id = %created.id, name = %created.name, "inserted dog profile");
        Ok(created)
    }

    fn update_profile(&self, id: &str, update: &UpdateDogProfile) -> Result<DogProfile> {
        let mut profile = self.get_profile(id)?.context("Dog profile not found")?;
        update.apply(&mut profile)?;
        profile.updated_at = Local::now().to_rfc3339();
        Self::write_profile(&self.conn, &profile)?;
        tracing::debug!(id, "updated dog profile");
        Ok(profile)
    }

    fn delete_profile(&self, id: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let rows = tx.execute("DELETE FROM dog_profiles WHERE id = ?1", params![id])?;
        if rows > 0 && self.active_profile_id()?.as_deref() == Some(id) {
            let next = self.first_profile_id()?;
            Self::write_active_profile(&tx, next.as_deref())?;
            tracing::debug!(next = ?next, "re-pointed active profile");
        }
        tx.commit()?;
        Ok(rows > 0)
    }

    fn get_profile(&self, id: &str) -> Result<Option<DogProfile>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM dog_profiles WHERE id = ?1"),
                params![id],
                Self::profile_from_row,
            )
            .optional()?)
    }

    fn list_profiles(&self) -> Result<Vec<DogProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM dog_profiles ORDER BY created_at, id"
        ))?;
        let profiles = stmt
            .query_map([], Self::profile_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    fn active_profile_id(&self) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![ACTIVE_PROFILE_KEY],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_active_profile_id(&self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            self.get_profile(id)?.context("Dog profile not found")?;
        }
        Self::write_active_profile(&self.conn, id)
    }
}

impl FeedingLogRepository for Database {
    fn upsert_entry(&self, entry: &NewFeedingEntry) -> Result<FeedingEntry> {
        validate_feeding_values(
            entry.am_weight,
            entry.pm_weight,
            entry.food_amount,
            entry.calories,
        )?;
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO feeding_entries (id, dog_id, date, am_weight, pm_weight, average_weight,
                food_amount, calories, notes, followed_plan_today, old_food_amount, new_food_amount,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(dog_id, date) DO UPDATE SET
                am_weight = excluded.am_weight,
                pm_weight = excluded.pm_weight,
                average_weight = excluded.average_weight,
                food_amount = excluded.food_amount,
                calories = excluded.calories,
                notes = excluded.notes,
                followed_plan_today = excluded.followed_plan_today,
                old_food_amount = excluded.old_food_amount,
                new_food_amount = excluded.new_food_amount,
                updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                entry.dog_id,
                date_to_sql(entry.date),
                entry.am_weight,
                entry.pm_weight,
                average_weight(entry.am_weight, entry.pm_weight),
                entry.food_amount,
                entry.calories,
                entry.notes,
                entry.followed_plan_today,
                entry.old_food_amount,
                entry.new_food_amount,
                now,
                now,
            ],
        )
        .with_context(|| format!("Failed to save feeding entry for dog '{}'", entry.dog_id))?;
        tracing::debug!(dog_id = %entry.dog_id, date = %entry.date, "upserted feeding entry");
        self.entry_for_date(&entry.dog_id, entry.date)?
            .context("Feeding entry not found after upsert")
    }

    fn update_entry(&self, id: &str, update: &UpdateFeedingEntry) -> Result<FeedingEntry> {
        let mut entry = self.get_entry(id)?.context("Feeding entry not found")?;
        update.apply(&mut entry);
        validate_feeding_entry(&entry)?;
        entry.updated_at = Local::now().to_rfc3339();
        Self::write_entry(&self.conn, &entry)?;
        tracing::debug!(id, "updated feeding entry");
        Ok(entry)
    }

    fn delete_entry(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM feeding_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn get_entry(&self, id: &str) -> Result<Option<FeedingEntry>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM feeding_entries WHERE id = ?1"),
                params![id],
                Self::entry_from_row,
            )
            .optional()?)
    }

    fn entry_for_date(&self, dog_id: &str, date: NaiveDate) -> Result<Option<FeedingEntry>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM feeding_entries WHERE dog_id = ?1 AND date = ?2"
                ),
                params![dog_id, date_to_sql(date)],
                Self::entry_from_row,
            )
            .optional()?)
    }

    fn entries_for_dog(&self, dog_id: &str) -> Result<Vec<FeedingEntry>> {
        self.query_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM feeding_entries WHERE dog_id = ?1 ORDER BY date DESC"
            ),
            params![dog_id],
        )
    }

    fn entries_in_range(
        &self,
        dog_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FeedingEntry>> {
        self.query_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM feeding_entries
                 WHERE dog_id = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date DESC"
            ),
            params![dog_id, date_to_sql(start), date_to_sql(end)],
        )
    }
}

impl TransitionRepository for Database {
    fn insert_plan(&self, plan: &NewTransitionPlan) -> Result<TransitionPlan> {
        let (phases, total_days) = plan.schedule()?;

        let now = Local::now().to_rfc3339();
        let created = TransitionPlan {
            id: Uuid::new_v4().to_string(),
            dog_id: plan.dog_id.clone(),
            name: plan.name.trim().to_string(),
            start_date: plan.start_date,
            phases,
            old_food_name: plan.old_food_name.trim().to_string(),
            new_food_name: plan.new_food_name.trim().to_string(),
            total_days,
            is_active: plan.is_active,
            created_at: now.clone(),
            updated_at: now,
        };

        let tx = self.conn.unchecked_transaction()?;
        Self::write_plan(&tx, &created)
            .with_context(|| format!("Failed to save transition plan for dog '{}'", plan.dog_id))?;
        tx.commit()?;
        tracing::debug!(id = %created.id, active = created.is_active, "inserted transition plan");
        Ok(created)
    }

    fn update_plan(&self, id: &str, update: &UpdateTransitionPlan) -> Result<TransitionPlan> {
        let mut plan = self.get_plan(id)?.context("Transition plan not found")?;
        update.apply(&mut plan)?;
        plan.updated_at = Local::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        Self::write_plan(&tx, &plan)?;
        tx.commit()?;
        tracing::debug!(id, "updated transition plan");
        Ok(plan)
    }

    fn delete_plan(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM transition_plans WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn get_plan(&self, id: &str) -> Result<Option<TransitionPlan>> {
        let plan = self
            .conn
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM transition_plans WHERE id = ?1"),
                params![id],
                Self::plan_from_row,
            )
            .optional()?;
        plan.map(|p| self.with_phases(p)).transpose()
    }

    fn plans_for_dog(&self, dog_id: &str) -> Result<Vec<TransitionPlan>> {
        self.query_plans(
            &format!(
                "SELECT {PLAN_COLUMNS} FROM transition_plans
                 WHERE dog_id = ?1 ORDER BY start_date DESC, created_at DESC"
            ),
            params![dog_id],
        )
    }

    fn active_plan(&self, dog_id: &str) -> Result<Option<TransitionPlan>> {
        let plan = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PLAN_COLUMNS} FROM transition_plans WHERE dog_id = ?1 AND is_active = 1"
                ),
                params![dog_id],
                Self::plan_from_row,
            )
            .optional()?;
        plan.map(|p| self.with_phases(p)).transpose()
    }

    fn activate_plan(&self, id: &str) -> Result<TransitionPlan> {
        let dog_id: String = self
            .conn
            .query_row(
                "SELECT dog_id FROM transition_plans WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .context("Transition plan not found")?;

        let now = Local::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE transition_plans SET is_active = 0, updated_at = ?2
             WHERE dog_id = ?1 AND is_active = 1",
            params![dog_id, now],
        )?;
        tx.execute(
            "UPDATE transition_plans SET is_active = 1, updated_at = ?2 WHERE id = ?1",
            params![id, now],
        )?;
        tx.commit()?;
        tracing::info!(plan = id, dog = %dog_id, "activated transition plan");

        self.get_plan(id)?.context("Transition plan not found")
    }

    fn deactivate_all_plans(&self, dog_id: &str) -> Result<usize> {
        let rows = self.conn.execute(
            "UPDATE transition_plans SET is_active = 0, updated_at = ?2
             WHERE dog_id = ?1 AND is_active = 1",
            params![dog_id, Local::now().to_rfc3339()],
        )?;
        if rows > 0 {
            tracing::info!(dog = dog_id, "deactivated transition plans");
        }
        Ok(rows)
    }
}

impl SettingsRepository for Database {
    fn load_settings(&self) -> Result<AppSettings> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM user_settings")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut top = Map::new();
        let mut presentation = Map::new();
        for (key, raw) in rows {
            let value: Value = serde_json::from_str(&raw)
                .with_context(|| format!("Stored setting '{key}' is not valid JSON"))?;
            if PRESENTATION_KEYS.contains(&key.as_str()) {
                presentation.insert(key, value);
            } else {
                top.insert(key, value);
            }
        }
        top.insert("presentation".to_string(), Value::Object(presentation));
        serde_json::from_value(Value::Object(top)).context("Stored settings are invalid")
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        crate::models::validate_reminder_time(&settings.reminder_time)?;
        let tx = self.conn.unchecked_transaction()?;
        Self::write_settings(&tx, settings)?;
        tx.commit()?;
        tracing::debug!("saved settings");
        Ok(())
    }

    fn reset_settings(&self) -> Result<()> {
        self.conn.execute("DELETE FROM user_settings", [])?;
        Ok(())
    }
}

/// Flatten settings into `(key, JSON scalar)` pairs, one per stored key.
fn settings_to_pairs(settings: &AppSettings) -> Result<Vec<(String, String)>> {
    let Value::Object(mut map) = serde_json::to_value(settings)? else {
        bail!("Settings did not serialize to an object");
    };
    let mut pairs = Vec::new();
    if let Some(Value::Object(presentation)) = map.remove("presentation") {
        pairs.extend(presentation.into_iter().map(|(k, v)| (k, v.to_string())));
    }
    pairs.extend(map.into_iter().map(|(k, v)| (k, v.to_string())));
    Ok(pairs)
}

fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date_column(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let value: String = row.get(idx)?;
    parse_date_column(idx, &value)
}

fn optional_date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value.map(|v| parse_date_column(idx, &v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardRadius, FoodUnit, Theme, WeightUnit};
    use crate::transition::default_transition_phases;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_profile() -> NewDogProfile {
        NewDogProfile {
            name: "Devo".to_string(),
            breed: "Mixed Breed".to_string(),
            date_of_birth: Some(d(2020, 3, 15)),
            ideal_weight_lbs: 25.0,
            current_weight_lbs: Some(27.5),
            notes: Some("Loves walks".to_string()),
            allergies: vec!["chicken".to_string()],
        }
    }

    fn sample_entry(dog_id: &str, date: NaiveDate) -> NewFeedingEntry {
        NewFeedingEntry {
            dog_id: dog_id.to_string(),
            date,
            am_weight: Some(27.8),
            pm_weight: Some(27.6),
            food_amount: 2.5,
            calories: 850,
            notes: None,
            followed_plan_today: true,
            old_food_amount: None,
            new_food_amount: None,
        }
    }

    fn sample_plan(dog_id: &str, active: bool) -> NewTransitionPlan {
        NewTransitionPlan {
            dog_id: dog_id.to_string(),
            name: "Lamb to Salmon Transition".to_string(),
            start_date: d(2024, 6, 1),
            phases: vec![],
            old_food_name: "Lamb & Rice Formula".to_string(),
            new_food_name: "Salmon & Sweet Potato".to_string(),
            total_days: None,
            is_active: active,
        }
    }

    #[test]
    fn test_insert_and_get_profile() {
        let db = Database::open_in_memory().unwrap();
        let profile = db.insert_profile(&sample_profile()).unwrap();

        assert_eq!(profile.name, "Devo");
        assert_eq!(profile.allergies, vec!["chicken".to_string()]);

        let fetched = db.get_profile(&profile.id).unwrap().unwrap();
        assert_eq!(fetched, profile);
        assert!(db.get_profile("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_profile_validates() {
        let db = Database::open_in_memory().unwrap();
        let mut bad = sample_profile();
        bad.name = "  ".to_string();
        assert!(db.insert_profile(&bad).is_err());
        assert!(db.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_update_profile_clears_optional_fields() {
        let db = Database::open_in_memory().unwrap();
        let profile = db.insert_profile(&sample_profile()).unwrap();

        let updated = db
            .update_profile(
                &profile.id,
                &UpdateDogProfile {
                    current_weight_lbs: Some(Some(26.0)),
                    notes: Some(None),
                    date_of_birth: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.current_weight_lbs, Some(26.0));
        assert!(updated.notes.is_none());
        assert!(updated.date_of_birth.is_none());
        assert_eq!(updated.name, "Devo");

        let err = db
            .update_profile(
                &profile.id,
                &UpdateDogProfile {
                    ideal_weight_lbs: Some(0.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("ideal_weight_lbs"));
    }

    #[test]
    fn test_delete_active_profile_repoints() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_profile(&sample_profile()).unwrap();
        let second = db
            .insert_profile(&NewDogProfile {
                name: "Biscuit".to_string(),
                ..sample_profile()
            })
            .unwrap();
        db.set_active_profile_id(Some(&first.id)).unwrap();

        assert!(db.delete_profile(&first.id).unwrap());
        assert_eq!(db.active_profile_id().unwrap(), Some(second.id.clone()));

        assert!(db.delete_profile(&second.id).unwrap());
        assert_eq!(db.active_profile_id().unwrap(), None);
        assert!(!db.delete_profile(&second.id).unwrap());
    }

    #[test]
    fn test_set_active_profile_requires_existing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.set_active_profile_id(Some("nope")).is_err());
        db.set_active_profile_id(None).unwrap();
    }

    #[test]
    fn test_delete_profile_cascades() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        let plan = db.insert_plan(&sample_plan(&dog.id, true)).unwrap();

        db.delete_profile(&dog.id).unwrap();
        assert!(db.entries_for_dog(&dog.id).unwrap().is_empty());
        assert!(db.get_plan(&plan.id).unwrap().is_none());
    }

    #[test]
    fn test_upsert_entry_computes_average() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let entry = db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        assert_eq!(entry.average_weight, Some(27.7));
        assert_eq!(entry.date, d(2024, 6, 1));
        assert!(entry.followed_plan_today);
    }

    #[test]
    fn test_upsert_entry_replaces_same_day() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let first = db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();

        let mut again = sample_entry(&dog.id, d(2024, 6, 1));
        again.pm_weight = None;
        again.calories = 800;
        let second = db.upsert_entry(&again).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.calories, 800);
        assert_eq!(second.average_weight, Some(27.8));
        assert_eq!(db.entries_for_dog(&dog.id).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_entry_unknown_dog_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.upsert_entry(&sample_entry("ghost", d(2024, 6, 1))).is_err());
    }

    #[test]
    fn test_update_entry_recomputes_average() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let entry = db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();

        let updated = db
            .update_entry(
                &entry.id,
                &UpdateFeedingEntry {
                    am_weight: Some(Some(28.2)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.average_weight, Some(27.9));
        let stored = db.get_entry(&entry.id).unwrap().unwrap();
        assert_eq!(stored.average_weight, Some(27.9));

        assert!(
            db.update_entry(
                &entry.id,
                &UpdateFeedingEntry {
                    calories: Some(-1),
                    ..Default::default()
                }
            )
            .is_err()
        );
        assert!(db.update_entry("missing", &UpdateFeedingEntry::default()).is_err());
    }

    #[test]
    fn test_entries_ordering_and_range() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        for day in [3, 1, 5, 2, 4] {
            db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, day))).unwrap();
        }

        let all = db.entries_for_dog(&dog.id).unwrap();
        let dates: Vec<u32> = all.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(dates, vec![5, 4, 3, 2, 1]);

        let range = db.entries_in_range(&dog.id, d(2024, 6, 2), d(2024, 6, 4)).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range[0].date, d(2024, 6, 4));

        let recent = db.recent_entries(&dog.id, d(2024, 6, 5), 1).unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let entry = db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        assert!(db.delete_entry(&entry.id).unwrap());
        assert!(!db.delete_entry(&entry.id).unwrap());
        assert!(db.entry_for_date(&dog.id, d(2024, 6, 1)).unwrap().is_none());
    }

    #[test]
    fn test_insert_plan_defaults_phases() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let plan = db.insert_plan(&sample_plan(&dog.id, true)).unwrap();

        assert_eq!(plan.total_days, 14);
        assert_eq!(plan.phases.len(), 5);

        let fetched = db.get_plan(&plan.id).unwrap().unwrap();
        assert_eq!(fetched.phases, plan.phases);
        assert_eq!(fetched.phases[4].label, "Day 13+");
        assert!(fetched.is_active);
    }

    #[test]
    fn test_insert_plan_rejects_bad_phases() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let mut plan = sample_plan(&dog.id, false);
        plan.phases = default_transition_phases();
        plan.phases.remove(1);
        assert!(db.insert_plan(&plan).is_err());

        let mut plan = sample_plan(&dog.id, false);
        plan.total_days = Some(20);
        assert!(db.insert_plan(&plan).is_err());
    }

    #[test]
    fn test_one_active_plan_per_dog() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let first = db.insert_plan(&sample_plan(&dog.id, true)).unwrap();
        let second = db.insert_plan(&sample_plan(&dog.id, true)).unwrap();

        assert_eq!(db.active_plan(&dog.id).unwrap().unwrap().id, second.id);
        assert!(!db.get_plan(&first.id).unwrap().unwrap().is_active);

        let reactivated = db.activate_plan(&first.id).unwrap();
        assert!(reactivated.is_active);
        assert_eq!(db.active_plan(&dog.id).unwrap().unwrap().id, first.id);
        let active_count = db
            .plans_for_dog(&dog.id)
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .count();
        assert_eq!(active_count, 1);

        assert_eq!(db.deactivate_all_plans(&dog.id).unwrap(), 1);
        assert!(db.active_plan(&dog.id).unwrap().is_none());
        assert!(db.activate_plan("missing").is_err());
    }

    #[test]
    fn test_active_plans_are_per_dog() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_profile(&sample_profile()).unwrap();
        let b = db.insert_profile(&sample_profile()).unwrap();
        db.insert_plan(&sample_plan(&a.id, true)).unwrap();
        db.insert_plan(&sample_plan(&b.id, true)).unwrap();
        assert!(db.active_plan(&a.id).unwrap().is_some());
        assert!(db.active_plan(&b.id).unwrap().is_some());
    }

    #[test]
    fn test_update_plan_phases() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let plan = db.insert_plan(&sample_plan(&dog.id, true)).unwrap();

        let mut phases = default_transition_phases();
        phases.truncate(4);
        let updated = db
            .update_plan(
                &plan.id,
                &UpdateTransitionPlan {
                    name: Some("Quick switch".to_string()),
                    phases: Some(phases),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.total_days, 12);
        assert_eq!(updated.name, "Quick switch");
        assert_eq!(db.get_plan(&plan.id).unwrap().unwrap().phases.len(), 4);
        assert!(db.get_plan(&plan.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_delete_plan() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let plan = db.insert_plan(&sample_plan(&dog.id, false)).unwrap();
        assert!(db.delete_plan(&plan.id).unwrap());
        assert!(db.phases_for_plan(&plan.id).unwrap().is_empty());
        assert!(!db.delete_plan(&plan.id).unwrap());
    }

    #[test]
    fn test_settings_defaults_and_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_settings().unwrap(), AppSettings::default());

        let mut settings = AppSettings::default();
        settings.weight_unit = WeightUnit::Kilograms;
        settings.food_unit = FoodUnit::Grams;
        settings.presentation.theme = Theme::Dark;
        settings.presentation.card_radius = CardRadius::VeryRounded;
        db.save_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), settings);

        db.reset_settings().unwrap();
        assert_eq!(db.load_settings().unwrap(), AppSettings::default());
    }

    #[test]
    fn test_settings_rows_are_json_scalars() {
        let db = Database::open_in_memory().unwrap();
        db.save_settings(&AppSettings::default()).unwrap();
        let raw: String = db
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE key = 'card_radius'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, "\"rounded\"");
    }

    #[test]
    fn test_save_settings_rejects_bad_time() {
        let db = Database::open_in_memory().unwrap();
        let settings = AppSettings {
            reminder_time: "8am".to_string(),
            ..AppSettings::default()
        };
        assert!(db.save_settings(&settings).is_err());
    }

    #[test]
    fn test_export_import_into_fresh_database() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        db.set_active_profile_id(Some(&dog.id)).unwrap();
        db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 2))).unwrap();
        db.insert_plan(&sample_plan(&dog.id, true)).unwrap();

        let data = db.export_all().unwrap();
        assert_eq!(data.version, EXPORT_VERSION);
        let json = serde_json::to_string(&data).unwrap();
        let parsed: ExportData = serde_json::from_str(&json).unwrap();

        let fresh = Database::open_in_memory().unwrap();
        let summary = fresh.import_all(&parsed).unwrap();
        assert_eq!(summary.profiles_imported, 1);
        assert_eq!(summary.feeding_entries_imported, 2);
        assert_eq!(summary.transition_plans_imported, 1);
        assert!(summary.settings_imported);

        assert_eq!(fresh.active_profile_id().unwrap(), Some(dog.id.clone()));
        assert_eq!(fresh.entries_for_dog(&dog.id).unwrap().len(), 2);
        let plan = fresh.active_plan(&dog.id).unwrap().unwrap();
        assert_eq!(plan.phases.len(), 5);
    }

    #[test]
    fn test_import_is_idempotent_and_keeps_ids() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let entry = db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        let data = db.export_all().unwrap();

        db.import_all(&data).unwrap();
        db.import_all(&data).unwrap();
        let entries = db.entries_for_dog(&dog.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);
        assert_eq!(db.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn test_import_replaces_conflicting_day() {
        let db = Database::open_in_memory().unwrap();
        let dog = db.insert_profile(&sample_profile()).unwrap();
        let mut data = db.export_all().unwrap();
        db.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();

        let now = Local::now().to_rfc3339();
        data.feeding_entries.push(FeedingEntry {
            id: "imported-1".to_string(),
            dog_id: dog.id.clone(),
            date: d(2024, 6, 1),
            am_weight: Some(30.0),
            pm_weight: None,
            average_weight: None,
            food_amount: 3.0,
            calories: 900,
            notes: None,
            followed_plan_today: false,
            old_food_amount: None,
            new_food_amount: None,
            created_at: now.clone(),
            updated_at: now,
        });
        db.import_all(&data).unwrap();

        let entry = db.entry_for_date(&dog.id, d(2024, 6, 1)).unwrap().unwrap();
        assert_eq!(entry.id, "imported-1");
        assert_eq!(entry.average_weight, Some(30.0));
    }

    #[test]
    fn test_import_validates_before_writing() {
        let db = Database::open_in_memory().unwrap();
        let source = Database::open_in_memory().unwrap();
        let dog = source.insert_profile(&sample_profile()).unwrap();
        source.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        let mut data = source.export_all().unwrap();
        data.feeding_entries[0].calories = -10;

        assert!(db.import_all(&data).is_err());
        assert!(db.list_profiles().unwrap().is_empty());

        data.feeding_entries.clear();
        data.version = EXPORT_VERSION + 1;
        assert!(db.import_all(&data).is_err());
    }

    #[test]
    fn test_import_unknown_dog_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let source = Database::open_in_memory().unwrap();
        let dog = source.insert_profile(&sample_profile()).unwrap();
        source.upsert_entry(&sample_entry(&dog.id, d(2024, 6, 1))).unwrap();
        let mut data = source.export_all().unwrap();
        data.feeding_entries[0].dog_id = "ghost".to_string();

        assert!(db.import_all(&data).is_err());
        assert!(db.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kibble.db");
        let id = {
            let db = Database::open(&path).unwrap();
            db.insert_profile(&sample_profile()).unwrap().id
        };

        let db = Database::open(&path).unwrap();
        assert!(db.get_profile(&id).unwrap().is_some());
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
