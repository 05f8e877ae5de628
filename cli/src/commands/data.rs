use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;

use kibble_core::models::ExportData;
use kibble_core::service::KibbleService;

use super::helpers::print_json;

/// Write every profile, entry, plan, and the settings as JSON to `file` or stdout.
pub(crate) fn cmd_export(svc: &KibbleService, file: Option<&Path>) -> Result<()> {
    let data = svc.export_all()?;
    let body = serde_json::to_string_pretty(&data)?;

    match file {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} profiles, {} entries, {} plans to {}",
                data.profiles.len(),
                data.feeding_entries.len(),
                data.transition_plans.len(),
                path.display()
            );
        }
        None => println!("{body}"),
    }
    Ok(())
}

pub(crate) fn cmd_import(svc: &KibbleService, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let data: ExportData = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a kibble export", file.display()))?;
    let summary = svc.import_all(&data)?;

    if json {
        print_json(&summary)?;
    } else {
        println!("Import complete:");
        println!("  Profiles:         {}", summary.profiles_imported);
        println!("  Feeding entries:  {}", summary.feeding_entries_imported);
        println!("  Transition plans: {}", summary.transition_plans_imported);
        if summary.settings_imported {
            println!("  Settings:         replaced");
        }
    }
    Ok(())
}

/// Add the demo dog with a running transition and two logged days.
pub(crate) fn cmd_demo(svc: &KibbleService, json: bool) -> Result<()> {
    let profile = svc.load_sample_data(Local::now().date_naive())?;
    if json {
        print_json(&profile)?;
    } else {
        println!("Added sample dog {} with a food transition in progress", profile.name);
        println!("  Try `kibble transition show` or `kibble entries`");
    }
    Ok(())
}
