use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use kibble_core::models::{DogProfile, WeightUnit};
use kibble_core::service::KibbleService;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Like [`parse_date`] but `None` stays `None` instead of meaning today.
pub(crate) fn parse_optional_date(date_str: Option<String>) -> Result<Option<NaiveDate>> {
    date_str.map(|s| parse_date(Some(s))).transpose()
}

/// Profile named by `--dog`, or the active one.
pub(crate) fn require_profile(svc: &KibbleService, dog: Option<&str>) -> Result<DogProfile> {
    match svc.resolve_profile(dog)? {
        Some(profile) => Ok(profile),
        None => bail!("No active dog profile. Create one with `kibble profile add`"),
    }
}

/// Convert a weight typed in the user's unit to pounds, rejecting non-positive values.
pub(crate) fn weight_input(unit: WeightUnit, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(unit.to_pounds(value))
}

pub(crate) fn format_weight(unit: WeightUnit, pounds: Option<f64>) -> String {
    pounds.map_or_else(|| "-".to_string(), |lbs| unit.format(no_neg_zero(lbs)))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
