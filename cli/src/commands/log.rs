use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kibble_core::models::{AppSettings, FeedingEntry, UpdateFeedingEntry};
use kibble_core::service::{Blend, DailyLogInput, KibbleService};

use super::helpers::{
    format_weight, json_error, parse_date, print_json, require_profile, truncate, weight_input,
};

/// Fields accepted by `entry update`.
#[derive(clap::Args)]
pub(crate) struct EntryUpdateArgs {
    /// Morning weight in your weight unit
    #[arg(long, conflicts_with = "clear_am")]
    pub am: Option<f64>,
    /// Remove the morning weight
    #[arg(long)]
    pub clear_am: bool,
    /// Evening weight in your weight unit
    #[arg(long, conflicts_with = "clear_pm")]
    pub pm: Option<f64>,
    /// Remove the evening weight
    #[arg(long)]
    pub clear_pm: bool,
    /// Total food amount in your food unit
    #[arg(long)]
    pub food: Option<f64>,
    /// Calories fed
    #[arg(long)]
    pub calories: Option<i64>,
    /// Notes for the day
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    /// Remove notes
    #[arg(long)]
    pub clear_notes: bool,
    /// Mark the plan as followed (true) or skipped (false)
    #[arg(long)]
    pub followed: Option<bool>,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_log(
    svc: &KibbleService,
    dog: Option<&str>,
    date: Option<String>,
    am: Option<f64>,
    pm: Option<f64>,
    food: f64,
    calories: i64,
    notes: Option<String>,
    skipped: bool,
    json: bool,
) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let settings = svc.settings()?;
    let unit = settings.weight_unit;

    let log = svc.daily_log(&DailyLogInput {
        dog_id: profile.id.clone(),
        date: parse_date(date)?,
        am_weight: am.map(|w| weight_input(unit, w)).transpose()?,
        pm_weight: pm.map(|w| weight_input(unit, w)).transpose()?,
        food_amount: food,
        calories,
        notes,
        followed_plan_today: !skipped,
    })?;

    if json {
        print_json(&log)?;
        return Ok(());
    }

    let entry = &log.entry;
    println!(
        "Logged {} for {} on {}",
        format_food(&settings, entry.food_amount),
        profile.name,
        entry.date.format("%Y-%m-%d")
    );
    println!("  Calories: {} kcal", entry.calories);
    if let Some(avg) = entry.average_weight {
        println!("  Weight:   {} (average)", format_weight(unit, Some(avg)));
    }
    if let Some(ref blend) = log.blend {
        print_blend(&settings, blend);
    }
    if !entry.followed_plan_today {
        println!("  Plan:     skipped");
    }
    Ok(())
}

pub(crate) fn cmd_entries(
    svc: &KibbleService,
    dog: Option<&str>,
    days: Option<i64>,
    json: bool,
) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let entries = match days {
        Some(days) if days <= 0 => bail!("--days must be at least 1"),
        Some(days) => svc.recent_entries(&profile.id, Local::now().date_naive(), days)?,
        None => svc.entries_for_dog(&profile.id)?,
    };

    if json {
        print_json(&entries)?;
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!(
            "No feeding entries for {}. Use `kibble log` to record a day.",
            profile.name
        );
        return Ok(());
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "AM")]
        am: String,
        #[tabled(rename = "PM")]
        pm: String,
        #[tabled(rename = "Avg")]
        avg: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Calories")]
        calories: i64,
        #[tabled(rename = "Plan")]
        plan: &'static str,
        #[tabled(rename = "Notes")]
        notes: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let settings = svc.settings()?;
    let unit = settings.weight_unit;
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            am: format_weight(unit, e.am_weight),
            pm: format_weight(unit, e.pm_weight),
            avg: format_weight(unit, e.average_weight),
            food: format_food(&settings, e.food_amount),
            calories: e.calories,
            plan: if e.followed_plan_today { "yes" } else { "no" },
            notes: truncate(e.notes.as_deref().unwrap_or_default(), 30),
            id: e.id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_entry_show(
    svc: &KibbleService,
    dog: Option<&str>,
    selector: &str,
    json: bool,
) -> Result<()> {
    let Some(entry) = find_entry(svc, dog, selector)? else {
        let msg = format!("No feeding entry matches '{selector}'");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    };

    if json {
        print_json(&entry)?;
    } else {
        print_entry(&svc.settings()?, &entry);
    }
    Ok(())
}

pub(crate) fn cmd_entry_update(
    svc: &KibbleService,
    dog: Option<&str>,
    selector: &str,
    args: EntryUpdateArgs,
    json: bool,
) -> Result<()> {
    let entry = find_entry(svc, dog, selector)?
        .with_context(|| format!("No feeding entry matches '{selector}'"))?;
    let settings = svc.settings()?;
    let unit = settings.weight_unit;

    let optional_weight = |clear: bool, value: Option<f64>| -> Result<Option<Option<f64>>> {
        if clear {
            Ok(Some(None))
        } else {
            value.map(|w| weight_input(unit, w).map(Some)).transpose()
        }
    };

    let update = UpdateFeedingEntry {
        am_weight: optional_weight(args.clear_am, args.am)?,
        pm_weight: optional_weight(args.clear_pm, args.pm)?,
        food_amount: args.food,
        calories: args.calories,
        notes: if args.clear_notes {
            Some(None)
        } else {
            args.notes.map(Some)
        },
        followed_plan_today: args.followed,
        ..UpdateFeedingEntry::default()
    };
    let updated = svc.update_entry(&entry.id, &update)?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Updated entry for {}", updated.date.format("%Y-%m-%d"));
        print_entry(&settings, &updated);
    }
    Ok(())
}

pub(crate) fn cmd_entry_delete(
    svc: &KibbleService,
    dog: Option<&str>,
    selector: &str,
    json: bool,
) -> Result<()> {
    let entry = find_entry(svc, dog, selector)?
        .with_context(|| format!("No feeding entry matches '{selector}'"))?;
    svc.delete_entry(&entry.id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": entry.id }));
    } else {
        println!("Deleted entry for {}", entry.date.format("%Y-%m-%d"));
    }
    Ok(())
}

/// Look an entry up by id, or by date for the selected dog.
fn find_entry(
    svc: &KibbleService,
    dog: Option<&str>,
    selector: &str,
) -> Result<Option<FeedingEntry>> {
    if let Some(entry) = svc.get_entry(selector)? {
        return Ok(Some(entry));
    }
    let Ok(date) = parse_date(Some(selector.to_string())) else {
        return Ok(None);
    };
    let profile = require_profile(svc, dog)?;
    svc.entry_for_date(&profile.id, date)
}

fn format_food(settings: &AppSettings, amount: f64) -> String {
    format!("{amount:.1} {}", settings.food_unit.abbreviation())
}

fn print_blend(settings: &AppSettings, blend: &Blend) {
    println!(
        "  Blend:    {} ({}% new, day {})",
        blend.phase.label, blend.phase.new_food_percentage, blend.day
    );
    println!(
        "            {} {} + {} {}",
        format_food(settings, blend.suggestion.old_food_amount),
        blend.old_food_name,
        format_food(settings, blend.suggestion.new_food_amount),
        blend.new_food_name
    );
}

fn print_entry(settings: &AppSettings, entry: &FeedingEntry) {
    let unit = settings.weight_unit;
    println!("{}", format_entry_date(entry.date));
    println!(
        "  Weight:   AM {} | PM {} | Avg {}",
        format_weight(unit, entry.am_weight),
        format_weight(unit, entry.pm_weight),
        format_weight(unit, entry.average_weight)
    );
    println!(
        "  Food:     {} ({} kcal)",
        format_food(settings, entry.food_amount),
        entry.calories
    );
    if let (Some(old), Some(new)) = (entry.old_food_amount, entry.new_food_amount) {
        println!(
            "  Mix:      {} old + {} new",
            format_food(settings, old),
            format_food(settings, new)
        );
    }
    println!(
        "  Plan:     {}",
        if entry.followed_plan_today {
            "followed"
        } else {
            "skipped"
        }
    );
    if let Some(ref notes) = entry.notes {
        println!("  Notes:    {notes}");
    }
    println!("  ID:       {}", entry.id);
}

fn format_entry_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
