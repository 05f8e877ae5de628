use anyhow::{Context, Result};
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kibble_core::models::{
    DogProfile, NewDogProfile, UpdateDogProfile, WeightUnit, parse_allergies,
};
use kibble_core::service::KibbleService;

use super::helpers::{
    format_weight, parse_optional_date, print_json, require_profile, truncate, weight_input,
};

/// Fields accepted by `profile update`; every one is optional.
#[derive(clap::Args)]
pub(crate) struct ProfileUpdateArgs {
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New breed
    #[arg(long)]
    pub breed: Option<String>,
    /// Ideal weight in your weight unit
    #[arg(long)]
    pub ideal: Option<f64>,
    /// Current weight in your weight unit
    #[arg(long, conflicts_with = "clear_current")]
    pub current: Option<f64>,
    /// Forget the current weight
    #[arg(long)]
    pub clear_current: bool,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_dob")]
    pub dob: Option<String>,
    /// Forget the date of birth
    #[arg(long)]
    pub clear_dob: bool,
    /// Free-text notes
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    /// Remove notes
    #[arg(long)]
    pub clear_notes: bool,
    /// Comma-separated allergies (empty string clears them)
    #[arg(long)]
    pub allergies: Option<String>,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_profile_add(
    svc: &KibbleService,
    name: &str,
    breed: &str,
    ideal: f64,
    current: Option<f64>,
    dob: Option<String>,
    notes: Option<String>,
    allergies: Option<&str>,
    json: bool,
) -> Result<()> {
    let unit = svc.settings()?.weight_unit;
    let profile = svc.add_profile(&NewDogProfile {
        name: name.to_string(),
        breed: breed.to_string(),
        date_of_birth: parse_optional_date(dob)?,
        ideal_weight_lbs: weight_input(unit, ideal)?,
        current_weight_lbs: current.map(|w| weight_input(unit, w)).transpose()?,
        notes,
        allergies: allergies.map(parse_allergies).unwrap_or_default(),
    })?;

    if json {
        print_json(&profile)?;
    } else {
        println!("Added {} ({})", profile.name, profile.breed);
        let active = svc.active_profile()?;
        if active.is_some_and(|a| a.id == profile.id) {
            println!("  {} is now the active dog", profile.name);
        }
    }
    Ok(())
}

pub(crate) fn cmd_profile_list(svc: &KibbleService, json: bool) -> Result<()> {
    let profiles = svc.list_profiles()?;
    let active_id = svc.active_profile()?.map(|p| p.id);

    if json {
        print_json(&profiles)?;
        return Ok(());
    }
    if profiles.is_empty() {
        eprintln!("No dog profiles yet. Use `kibble profile add` to create one.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ProfileRow {
        #[tabled(rename = "")]
        active: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Breed")]
        breed: String,
        #[tabled(rename = "Age")]
        age: String,
        #[tabled(rename = "Current")]
        current: String,
        #[tabled(rename = "Ideal")]
        ideal: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let unit = svc.settings()?.weight_unit;
    let today = Local::now().date_naive();
    let rows: Vec<ProfileRow> = profiles
        .iter()
        .map(|p| ProfileRow {
            active: if active_id.as_deref() == Some(p.id.as_str()) {
                "*".to_string()
            } else {
                String::new()
            },
            name: truncate(&p.name, 24),
            breed: truncate(&p.breed, 24),
            age: p.age_label(today).unwrap_or_else(|| "-".to_string()),
            current: format_weight(unit, p.current_weight_lbs),
            ideal: format_weight(unit, Some(p.ideal_weight_lbs)),
            id: p.id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_profile_show(svc: &KibbleService, dog: Option<&str>, json: bool) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    if json {
        print_json(&profile)?;
    } else {
        print_profile(&profile, svc.settings()?.weight_unit);
    }
    Ok(())
}

pub(crate) fn cmd_profile_use(svc: &KibbleService, selector: &str, json: bool) -> Result<()> {
    let profile = svc
        .resolve_profile(Some(selector))?
        .context("Dog profile not found")?;
    let profile = svc.set_active_profile(&profile.id)?;
    if json {
        print_json(&profile)?;
    } else {
        println!("{} is now the active dog", profile.name);
    }
    Ok(())
}

pub(crate) fn cmd_profile_update(
    svc: &KibbleService,
    dog: Option<&str>,
    args: ProfileUpdateArgs,
    json: bool,
) -> Result<()> {
    let profile = require_profile(svc, dog)?;
    let unit = svc.settings()?.weight_unit;

    let current_weight_lbs = if args.clear_current {
        Some(None)
    } else {
        args.current
            .map(|w| weight_input(unit, w).map(Some))
            .transpose()?
    };
    let date_of_birth = if args.clear_dob {
        Some(None)
    } else {
        parse_optional_date(args.dob)?.map(Some)
    };
    let notes = if args.clear_notes {
        Some(None)
    } else {
        args.notes.map(Some)
    };

    let updated = svc.update_profile(
        &profile.id,
        &UpdateDogProfile {
            name: args.name,
            breed: args.breed,
            date_of_birth,
            ideal_weight_lbs: args.ideal.map(|w| weight_input(unit, w)).transpose()?,
            current_weight_lbs,
            notes,
            allergies: args.allergies.as_deref().map(parse_allergies),
        },
    )?;

    if json {
        print_json(&updated)?;
    } else {
        println!("Updated {}", updated.name);
        print_profile(&updated, unit);
    }
    Ok(())
}

pub(crate) fn cmd_profile_delete(svc: &KibbleService, selector: &str, json: bool) -> Result<()> {
    let profile = svc
        .resolve_profile(Some(selector))?
        .context("Dog profile not found")?;
    svc.delete_profile(&profile.id)?;
    let active = svc.active_profile()?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "deleted": profile.id,
                "active_profile_id": active.as_ref().map(|p| &p.id),
            })
        );
    } else {
        println!("Deleted {} and all of their logs and plans", profile.name);
        match active {
            Some(p) => println!("  Active dog is now {}", p.name),
            None => println!("  No dog profiles remain"),
        }
    }
    Ok(())
}

fn print_profile(profile: &DogProfile, unit: WeightUnit) {
    let today = Local::now().date_naive();
    println!("{} ({})", profile.name, profile.breed);
    if let Some(dob) = profile.date_of_birth {
        let age = profile.age_label(today).unwrap_or_default();
        println!("  Born:      {} ({age})", dob.format("%Y-%m-%d"));
    }
    println!(
        "  Weight:    {} (ideal {})",
        format_weight(unit, profile.current_weight_lbs),
        format_weight(unit, Some(profile.ideal_weight_lbs))
    );
    if !profile.allergies.is_empty() {
        println!("  Allergies: {}", profile.allergies.join(", "));
    }
    if let Some(ref notes) = profile.notes {
        println!("  Notes:     {notes}");
    }
    println!("  ID:        {}", profile.id);
}
