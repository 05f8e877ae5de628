use anyhow::{Result, bail};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kibble_core::models::WeightUnit;
use kibble_core::stats::{ProgressStats, WeightTrend};
use kibble_core::service::KibbleService;

use super::helpers::{format_weight, no_neg_zero, print_json, require_profile};

pub(crate) fn cmd_stats(
    svc: &KibbleService,
    dog: Option<&str>,
    points: usize,
    json: bool,
) -> Result<()> {
    if points == 0 {
        bail!("--points must be at least 1");
    }
    let profile = require_profile(svc, dog)?;
    let stats = svc.stats(&profile.id)?;
    let history = svc.weight_history(&profile.id, points)?;

    if json {
        #[derive(Serialize)]
        struct StatsOutput<'a> {
            dog_id: &'a str,
            stats: &'a ProgressStats,
            weight_history: &'a [WeightTrend],
        }
        print_json(&StatsOutput {
            dog_id: &profile.id,
            stats: &stats,
            weight_history: &history,
        })?;
        return Ok(());
    }

    let unit = svc.settings()?.weight_unit;
    println!("=== {} ===\n", profile.name);
    println!(
        "  Current weight:   {}",
        format_weight(unit, Some(stats.current_weight))
    );
    println!(
        "  Weight change:    {}",
        format_change(unit, stats.weight_change)
    );
    println!("  Avg calories:     {} kcal", stats.average_calories);
    println!("  Plan adherence:   {}%", stats.adherence_rate);
    println!("  Days logged:      {}", stats.total_entries);

    if history.is_empty() {
        return Ok(());
    }
    println!();

    #[derive(Tabled)]
    struct TrendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Change")]
        change: String,
        #[tabled(rename = "")]
        trend: &'static str,
    }

    let rows: Vec<TrendRow> = history
        .iter()
        .map(|t| TrendRow {
            date: t.point.date.format("%Y-%m-%d").to_string(),
            weight: format_weight(unit, Some(t.point.weight)),
            change: t
                .change
                .map_or_else(|| "-".to_string(), |c| format_change(unit, c)),
            trend: t.trend.symbol(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

/// Signed weight delta in the user's unit, e.g. `-1.2 lbs`.
fn format_change(unit: WeightUnit, delta_lbs: f64) -> String {
    let value = no_neg_zero((unit.from_pounds(delta_lbs) * 10.0).round() / 10.0);
    format!("{value:+.1} {}", unit.abbreviation())
}
