use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use kibble_core::guidance::{CALORIC_GUIDANCE_TABLE, CaloricGuidanceRow, Recommendation};
use kibble_core::models::{
    ActivityLevel, AppSettings, DogProfile, ExportData, FeedingEntry, ImportSummary,
    NewDogProfile, NewTransitionPlan, TransitionPhase, TransitionPlan, UpdateDogProfile,
    UpdateFeedingEntry, UpdateTransitionPlan, WeightGoal, validate_feeding_entry,
    validate_feeding_values, validate_profile, validate_reminder_time,
};
use kibble_core::service::{Blend, DailyLog, DailyLogInput, KibbleService};
use kibble_core::stats::{ProgressStats, WeightTrend};
use kibble_core::transition::ActiveTransition;

const BODY_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

const DEFAULT_TREND_POINTS: usize = 7;

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<KibbleService>>,
    api_key: Option<String>,
}

impl AppState {
    fn svc(&self) -> MutexGuard<'_, KibbleService> {
        self.svc.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// --- Request / Response types ---

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[allow(clippy::option_option)]
struct UpdateProfileRequest {
    name: Option<String>,
    breed: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    date_of_birth: Option<Option<NaiveDate>>,
    ideal_weight_lbs: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    current_weight_lbs: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    notes: Option<Option<String>>,
    allergies: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct SetActiveProfileRequest {
    id: String,
}

#[derive(Deserialize)]
struct LogDayRequest {
    date: Option<String>,
    am_weight: Option<f64>,
    pm_weight: Option<f64>,
    food_amount: f64,
    calories: i64,
    notes: Option<String>,
    #[serde(default = "default_true")]
    followed_plan_today: bool,
}

#[derive(Deserialize)]
#[allow(clippy::option_option)]
struct UpdateEntryRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    am_weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pm_weight: Option<Option<f64>>,
    food_amount: Option<f64>,
    calories: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    notes: Option<Option<String>>,
    followed_plan_today: Option<bool>,
}

#[derive(Deserialize)]
struct EntriesQuery {
    days: Option<i64>,
}

#[derive(Deserialize)]
struct CreatePlanRequest {
    name: String,
    start_date: Option<String>,
    #[serde(default)]
    phases: Vec<TransitionPhase>,
    old_food_name: String,
    new_food_name: String,
    total_days: Option<i64>,
    #[serde(default = "default_true")]
    is_active: bool,
}

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
struct BlendQuery {
    date: Option<String>,
    amount: f64,
}

#[derive(Deserialize)]
struct AdviseRequest {
    dog_id: Option<String>,
    weight_lbs: Option<f64>,
    #[serde(default)]
    goal: WeightGoal,
    #[serde(default)]
    activity: ActivityLevel,
    calories_per_cup: Option<f64>,
}

#[derive(Deserialize)]
struct StatsQuery {
    points: Option<usize>,
}

#[derive(Serialize)]
struct StatsResponse {
    stats: ProgressStats,
    weight_history: Vec<WeightTrend>,
}

#[derive(Deserialize)]
struct SettingChange {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn invalid(err: &anyhow::Error) -> Self {
        Self::BadRequest(format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    match value {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD"))),
    }
}

fn require_profile(svc: &KibbleService, id: &str) -> Result<DogProfile, ApiError> {
    svc.get_profile(id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("Dog profile '{id}' not found")))
}

fn require_plan(svc: &KibbleService, id: &str) -> Result<TransitionPlan, ApiError> {
    svc.get_plan(id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("Transition plan '{id}' not found")))
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Profile handlers ---

async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<DogProfile>>, ApiError> {
    let profiles = state.svc().list_profiles().context("database error")?;
    Ok(Json(profiles))
}

async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<NewDogProfile>,
) -> Result<(StatusCode, Json<DogProfile>), ApiError> {
    validate_profile(
        &req.name,
        &req.breed,
        req.ideal_weight_lbs,
        req.current_weight_lbs,
    )
    .map_err(|e| ApiError::invalid(&e))?;

    let profile = state
        .svc()
        .add_profile(&req)
        .context("failed to create dog profile")?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DogProfile>, ApiError> {
    Ok(Json(require_profile(&state.svc(), &id)?))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<DogProfile>, ApiError> {
    let update = UpdateDogProfile {
        name: req.name,
        breed: req.breed,
        date_of_birth: req.date_of_birth,
        ideal_weight_lbs: req.ideal_weight_lbs,
        current_weight_lbs: req.current_weight_lbs,
        notes: req.notes,
        allergies: req.allergies,
    };

    let svc = state.svc();
    let mut preview = require_profile(&svc, &id)?;
    update
        .apply(&mut preview)
        .map_err(|e| ApiError::invalid(&e))?;

    let profile = svc
        .update_profile(&id, &update)
        .context("failed to update dog profile")?;
    Ok(Json(profile))
}

async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.svc().delete_profile(&id).context("database error")? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Dog profile '{id}' not found")))
    }
}

async fn get_active_profile(State(state): State<AppState>) -> Result<Json<DogProfile>, ApiError> {
    state
        .svc()
        .active_profile()
        .context("database error")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No active dog profile".to_string()))
}

async fn set_active_profile(
    State(state): State<AppState>,
    Json(req): Json<SetActiveProfileRequest>,
) -> Result<Json<DogProfile>, ApiError> {
    let svc = state.svc();
    require_profile(&svc, &req.id)?;
    let profile = svc
        .set_active_profile(&req.id)
        .context("failed to set active profile")?;
    Ok(Json(profile))
}

// --- Feeding log handlers ---

async fn list_entries(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Query(query): Query<EntriesQuery>,
) -> Result<Json<Vec<FeedingEntry>>, ApiError> {
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let entries = match query.days {
        Some(days) if days <= 0 => {
            return Err(ApiError::BadRequest(
                "days must be at least 1".to_string(),
            ));
        }
        Some(days) => svc.recent_entries(&dog_id, Local::now().date_naive(), days),
        None => svc.entries_for_dog(&dog_id),
    }
    .context("database error")?;
    Ok(Json(entries))
}

async fn log_day(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Json(req): Json<LogDayRequest>,
) -> Result<Json<DailyLog>, ApiError> {
    let date = parse_date(req.date.as_deref())?;
    validate_feeding_values(req.am_weight, req.pm_weight, req.food_amount, req.calories)
        .map_err(|e| ApiError::invalid(&e))?;

    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let log = svc
        .daily_log(&DailyLogInput {
            dog_id,
            date,
            am_weight: req.am_weight,
            pm_weight: req.pm_weight,
            food_amount: req.food_amount,
            calories: req.calories,
            notes: req.notes,
            followed_plan_today: req.followed_plan_today,
        })
        .context("failed to save feeding entry")?;
    Ok(Json(log))
}

async fn get_entry_for_date(
    State(state): State<AppState>,
    Path((dog_id, date)): Path<(String, String)>,
) -> Result<Json<FeedingEntry>, ApiError> {
    let date = parse_date(Some(&date))?;
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    svc.entry_for_date(&dog_id, date)
        .context("database error")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No feeding entry for {date}")))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<FeedingEntry>, ApiError> {
    if req.am_weight.is_none()
        && req.pm_weight.is_none()
        && req.food_amount.is_none()
        && req.calories.is_none()
        && req.notes.is_none()
        && req.followed_plan_today.is_none()
    {
        return Err(ApiError::BadRequest(
            "At least one field must be provided".to_string(),
        ));
    }

    let update = UpdateFeedingEntry {
        am_weight: req.am_weight,
        pm_weight: req.pm_weight,
        food_amount: req.food_amount,
        calories: req.calories,
        notes: req.notes,
        followed_plan_today: req.followed_plan_today,
        ..UpdateFeedingEntry::default()
    };

    let svc = state.svc();
    let mut preview = svc
        .get_entry(&id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("Feeding entry '{id}' not found")))?;
    update.apply(&mut preview);
    validate_feeding_entry(&preview).map_err(|e| ApiError::invalid(&e))?;

    let entry = svc
        .update_entry(&id, &update)
        .context("failed to update feeding entry")?;
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.svc().delete_entry(&id).context("database error")? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Feeding entry '{id}' not found")))
    }
}

async fn get_blend(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Query(query): Query<BlendQuery>,
) -> Result<Json<Option<Blend>>, ApiError> {
    if !query.amount.is_finite() || query.amount < 0.0 {
        return Err(ApiError::BadRequest(
            "amount must be a number of at least 0".to_string(),
        ));
    }
    let date = parse_date(query.date.as_deref())?;
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let blend = svc
        .blend_for(&dog_id, date, query.amount)
        .context("database error")?;
    Ok(Json(blend))
}

// --- Transition handlers ---

async fn list_plans(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
) -> Result<Json<Vec<TransitionPlan>>, ApiError> {
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let plans = svc.plans_for_dog(&dog_id).context("database error")?;
    Ok(Json(plans))
}

async fn create_plan(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<TransitionPlan>), ApiError> {
    let plan = NewTransitionPlan {
        dog_id,
        name: req.name,
        start_date: parse_date(req.start_date.as_deref())?,
        phases: req.phases,
        old_food_name: req.old_food_name,
        new_food_name: req.new_food_name,
        total_days: req.total_days,
        is_active: req.is_active,
    };
    plan.schedule().map_err(|e| ApiError::invalid(&e))?;

    let svc = state.svc();
    require_profile(&svc, &plan.dog_id)?;
    let created = if plan.is_active {
        svc.start_transition(&plan)
    } else {
        svc.add_plan(&plan)
    }
    .context("failed to create transition plan")?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_active_transition(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ActiveTransition>, ApiError> {
    let today = parse_date(query.date.as_deref())?;
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    svc.active_progress(&dog_id, today)
        .context("database error")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No active transition".to_string()))
}

async fn stop_transition(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let stopped = svc
        .stop_transition(&dog_id)
        .context("failed to stop transition")?;
    Ok(Json(serde_json::json!({ "stopped": stopped })))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionPlan>, ApiError> {
    Ok(Json(require_plan(&state.svc(), &id)?))
}

async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UpdateTransitionPlan>,
) -> Result<Json<TransitionPlan>, ApiError> {
    let svc = state.svc();
    let mut preview = require_plan(&svc, &id)?;
    update
        .apply(&mut preview)
        .map_err(|e| ApiError::invalid(&e))?;

    let plan = svc
        .update_plan(&id, &update)
        .context("failed to update transition plan")?;
    Ok(Json(plan))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.svc().delete_plan(&id).context("database error")? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Transition plan '{id}' not found")))
    }
}

async fn activate_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionPlan>, ApiError> {
    let svc = state.svc();
    require_plan(&svc, &id)?;
    let plan = svc
        .activate_plan(&id)
        .context("failed to activate transition plan")?;
    Ok(Json(plan))
}

async fn plan_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ActiveTransition>, ApiError> {
    let today = parse_date(query.date.as_deref())?;
    let svc = state.svc();
    require_plan(&svc, &id)?;
    svc.plan_progress(&id, today)
        .context("database error")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Transition plan '{id}' has no phases")))
}

// --- Advisor and stats handlers ---

async fn advise(
    State(state): State<AppState>,
    Json(req): Json<AdviseRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    let svc = state.svc();
    let profile_weight = match req.dog_id {
        Some(ref id) => require_profile(&svc, id)?.current_weight_lbs,
        None => None,
    };
    let weight = req.weight_lbs.or(profile_weight).ok_or_else(|| {
        ApiError::BadRequest("Please enter a valid current weight".to_string())
    })?;
    let recommendation = svc
        .advise(weight, req.goal, req.activity, req.calories_per_cup)
        .map_err(|e| ApiError::invalid(&e))?;
    Ok(Json(recommendation))
}

async fn guidance_table() -> Json<&'static [CaloricGuidanceRow]> {
    Json(CALORIC_GUIDANCE_TABLE)
}

async fn get_stats(
    State(state): State<AppState>,
    Path(dog_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let points = query.points.unwrap_or(DEFAULT_TREND_POINTS);
    if points == 0 {
        return Err(ApiError::BadRequest(
            "points must be at least 1".to_string(),
        ));
    }
    let svc = state.svc();
    require_profile(&svc, &dog_id)?;
    let stats = svc.stats(&dog_id).context("database error")?;
    let weight_history = svc
        .weight_history(&dog_id, points)
        .context("database error")?;
    Ok(Json(StatsResponse {
        stats,
        weight_history,
    }))
}

// --- Settings handlers ---

async fn get_settings(State(state): State<AppState>) -> Result<Json<AppSettings>, ApiError> {
    let settings = state.svc().settings().context("database error")?;
    Ok(Json(settings))
}

async fn replace_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, ApiError> {
    validate_reminder_time(&settings.reminder_time).map_err(|e| ApiError::invalid(&e))?;
    state
        .svc()
        .save_settings(&settings)
        .context("failed to save settings")?;
    Ok(Json(settings))
}

async fn change_setting(
    State(state): State<AppState>,
    Json(change): Json<SettingChange>,
) -> Result<Json<AppSettings>, ApiError> {
    let svc = state.svc();
    let mut settings = svc.settings().context("database error")?;
    settings
        .apply(&change.key, &change.value)
        .map_err(|e| ApiError::invalid(&e))?;
    svc.save_settings(&settings)
        .context("failed to save settings")?;
    Ok(Json(settings))
}

async fn reset_settings(State(state): State<AppState>) -> Result<Json<AppSettings>, ApiError> {
    let settings = state
        .svc()
        .reset_settings()
        .context("failed to reset settings")?;
    Ok(Json(settings))
}

// --- Export / Import handlers ---

async fn export_data(State(state): State<AppState>) -> Result<Json<ExportData>, ApiError> {
    let data = state.svc().export_all().context("failed to export data")?;
    Ok(Json(data))
}

async fn import_data(
    State(state): State<AppState>,
    Json(data): Json<ExportData>,
) -> Result<Json<ImportSummary>, ApiError> {
    data.validate().map_err(|e| ApiError::invalid(&e))?;

    let svc = state.svc();
    let incoming: HashSet<&str> = data.profiles.iter().map(|p| p.id.as_str()).collect();
    let dog_ids = data
        .feeding_entries
        .iter()
        .map(|e| e.dog_id.as_str())
        .chain(data.transition_plans.iter().map(|p| p.dog_id.as_str()));
    for dog_id in dog_ids {
        if !incoming.contains(dog_id) && svc.get_profile(dog_id).context("database error")?.is_none()
        {
            return Err(ApiError::BadRequest(format!(
                "Backup references unknown dog profile '{dog_id}'"
            )));
        }
    }

    let summary = svc.import_all(&data).context("failed to import data")?;
    Ok(Json(summary))
}

async fn load_sample(State(state): State<AppState>) -> Result<(StatusCode, Json<DogProfile>), ApiError> {
    let profile = state
        .svc()
        .load_sample_data(Local::now().date_naive())
        .context("failed to load sample data")?;
    Ok((StatusCode::CREATED, Json(profile)))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/profiles", get(list_profiles).post(create_profile))
        .route(
            "/api/profiles/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route(
            "/api/active-profile",
            get(get_active_profile).put(set_active_profile),
        )
        .route(
            "/api/profiles/{id}/entries",
            get(list_entries).post(log_day),
        )
        .route("/api/profiles/{id}/entries/{date}", get(get_entry_for_date))
        .route("/api/entries/{id}", put(update_entry).delete(delete_entry))
        .route("/api/profiles/{id}/blend", get(get_blend))
        .route(
            "/api/profiles/{id}/transitions",
            get(list_plans).post(create_plan),
        )
        .route(
            "/api/profiles/{id}/transition",
            get(get_active_transition).delete(stop_transition),
        )
        .route(
            "/api/transitions/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/api/transitions/{id}/activate", post(activate_plan))
        .route("/api/transitions/{id}/progress", get(plan_progress))
        .route("/api/profiles/{id}/stats", get(get_stats))
        .route("/api/advise", post(advise))
        .route("/api/guidance", get(guidance_table))
        .route(
            "/api/settings",
            get(get_settings)
                .put(replace_settings)
                .patch(change_setting)
                .delete(reset_settings),
        )
        .route("/api/export", get(export_data))
        .route("/api/import", post(import_data))
        .route("/api/sample", post(load_sample))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    svc: KibbleService,
    port: u16,
    bind: &str,
    api_key: Option<String>,
    new_api_key: bool,
) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {}...{} (see api_key file in data directory)",
            &key[..4],
            &key[key.len() - 4..],
        );
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    if new_api_key && api_key.is_some() {
        eprintln!(
            "Try: curl -H \"Authorization: Bearer $(cat <data dir>/api_key)\" http://{bind}:{port}/api/profiles"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!(bind, port, auth = api_key.is_some(), "server started");
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
