use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kibble_core::models::{NewTransitionPlan, TransitionPhase, TransitionPlan};
use kibble_core::service::KibbleService;
use kibble_core::transition::{ActiveTransition, PhaseStatus, default_transition_phases};

use super::helpers::{parse_date, print_json, require_profile, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_transition_start(
    svc: &KibbleService,
    dog: Option<&str>,
    name: Option<String>,
    old_food: &str,
    new_food: &str,
    start: Option<String>,
    phases_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let phases = match phases_file {
        Some(path) => read_phases(path)?,
        None => Vec::new(),
    };

    let plan = svc.start_transition(&NewTransitionPlan {
        dog_id: profile.id.clone(),
        name: name.unwrap_or_else(|| format!("{old_food} to {new_food}")),
        start_date: parse_date(start)?,
        phases,
        old_food_name: old_food.to_string(),
        new_food_name: new_food.to_string(),
        total_days: None,
        is_active: true,
    })?;

    if json {
        print_json(&plan)?;
    } else {
        println!(
            "Started '{}' for {} on {} ({} days)",
            plan.name,
            profile.name,
            plan.start_date.format("%Y-%m-%d"),
            plan.total_days
        );
        print_phases(&plan.phases, None);
    }
    Ok(())
}

pub(crate) fn cmd_transition_show(
    svc: &KibbleService,
    dog: Option<&str>,
    plan_id: Option<&str>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let active = match plan_id {
        Some(id) => svc.plan_progress(id, today)?,
        None => {
            let profile = require_profile(svc, dog)?;
            let active = svc.active_progress(&profile.id, today)?;
            if active.is_none() && !json {
                eprintln!(
                    "{} has no active transition. Use `kibble transition start` to begin one.",
                    profile.name
                );
                return Ok(());
            }
            active
        }
    };

    if json {
        print_json(&active)?;
        return Ok(());
    }
    let Some(active) = active else {
        eprintln!("That plan has no phases");
        return Ok(());
    };
    print_progress(&active);
    Ok(())
}

pub(crate) fn cmd_transition_phases(json: bool) -> Result<()> {
    let phases = default_transition_phases();
    if json {
        print_json(&phases)?;
    } else {
        print_phases(&phases, None);
    }
    Ok(())
}

pub(crate) fn cmd_transition_list(svc: &KibbleService, dog: Option<&str>, json: bool) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let plans = svc.plans_for_dog(&profile.id)?;

    if json {
        print_json(&plans)?;
        return Ok(());
    }
    if plans.is_empty() {
        eprintln!("No transition plans for {}", profile.name);
        return Ok(());
    }

    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "")]
        active: &'static str,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "From")]
        old_food: String,
        #[tabled(rename = "To")]
        new_food: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "Days")]
        days: i64,
        #[tabled(rename = "ID")]
        id: String,
    }

    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|p| PlanRow {
            active: if p.is_active { "*" } else { "" },
            name: truncate(&p.name, 30),
            old_food: truncate(&p.old_food_name, 20),
            new_food: truncate(&p.new_food_name, 20),
            start: p.start_date.format("%Y-%m-%d").to_string(),
            days: p.total_days,
            id: p.id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_transition_activate(svc: &KibbleService, plan_id: &str, json: bool) -> Result<()> {
    let plan = svc.activate_plan(plan_id)?;
    if json {
        print_json(&plan)?;
    } else {
        println!("'{}' is now the active transition", plan.name);
    }
    Ok(())
}

pub(crate) fn cmd_transition_stop(svc: &KibbleService, dog: Option<&str>, json: bool) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let stopped = svc.stop_transition(&profile.id)?;
    if json {
        println!("{}", serde_json::json!({ "stopped": stopped }));
    } else if stopped == 0 {
        println!("{} had no active transition", profile.name);
    } else {
        println!("Stopped the transition for {}", profile.name);
    }
    Ok(())
}

pub(crate) fn cmd_transition_delete(svc: &KibbleService, plan_id: &str, json: bool) -> Result<()> {
    let plan = svc
        .get_plan(plan_id)?
        .context("Transition plan not found")?;
    svc.delete_plan(&plan.id)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": plan.id }));
    } else {
        println!("Deleted transition plan '{}'", plan.name);
    }
    Ok(())
}

fn read_phases(path: &Path) -> Result<Vec<TransitionPhase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of phases", path.display()))
}

fn print_progress(active: &ActiveTransition) {
    let plan: &TransitionPlan = &active.plan;
    let progress = &active.progress;
    println!("{} ({} -> {})", plan.name, plan.old_food_name, plan.new_food_name);
    if progress.not_started {
        println!(
            "  Starts {} ({} days)",
            plan.start_date.format("%Y-%m-%d"),
            plan.total_days
        );
    } else {
        println!(
            "  Day {} of {} | {:.0}% complete | {} days remaining",
            progress.current_day.min(plan.total_days),
            plan.total_days,
            progress.percent_complete,
            progress.days_remaining
        );
        println!(
            "  Today: {} ({}% old / {}% new)",
            progress.current_phase.label,
            progress.current_phase.old_food_percentage,
            progress.current_phase.new_food_percentage
        );
    }
    println!("  Adherence: {:.0}%", progress.adherence_rate);
    print_phases(&plan.phases, Some(&active.phase_statuses));
}

fn print_phases(phases: &[TransitionPhase], statuses: Option<&[PhaseStatus]>) {
    #[derive(Tabled)]
    struct PhaseRow {
        #[tabled(rename = "Phase")]
        label: String,
        #[tabled(rename = "Days")]
        days: String,
        #[tabled(rename = "Old")]
        old: String,
        #[tabled(rename = "New")]
        new: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Notes")]
        description: String,
    }

    let rows: Vec<PhaseRow> = phases
        .iter()
        .enumerate()
        .map(|(i, p)| PhaseRow {
            label: p.label.clone(),
            days: format!("{}-{}", p.start_day, p.end_day),
            old: format!("{}%", p.old_food_percentage),
            new: format!("{}%", p.new_food_percentage),
            status: statuses
                .and_then(|s| s.get(i))
                .map(|s| status_label(*s).to_string())
                .unwrap_or_default(),
            description: p.description.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

fn status_label(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Completed => "done",
        PhaseStatus::Current => "current",
        PhaseStatus::Upcoming => "upcoming",
    }
}
