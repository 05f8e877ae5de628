use anyhow::Result;

use kibble_core::guidance::{CALORIC_GUIDANCE_TABLE, Recommendation};
use kibble_core::models::{ActivityLevel, WeightGoal, WeightUnit};
use kibble_core::service::KibbleService;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use super::helpers::{format_weight, print_json, weight_input};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_advise(
    svc: &KibbleService,
    dog: Option<&str>,
    weight: Option<f64>,
    goal: &str,
    activity: &str,
    calories_per_cup: Option<f64>,
    json: bool,
) -> Result<()> {
    let goal: WeightGoal = goal.parse()?;
    let activity: ActivityLevel = activity.parse()?;
    let unit = svc.settings()?.weight_unit;
    let weight_lbs = weight.map(|w| weight_input(unit, w)).transpose()?;

    // An explicit weight works without any profile.
    let recommendation = match (weight_lbs, svc.resolve_profile(dog)?) {
        (Some(lbs), None) => svc.advise(lbs, goal, activity, calories_per_cup)?,
        (lbs, Some(profile)) => {
            svc.advise_for_profile(&profile.id, lbs, goal, activity, calories_per_cup)?
        }
        (None, None) => {
            anyhow::bail!("Pass --weight or create a dog profile with `kibble profile add`")
        }
    };

    if json {
        print_json(&recommendation)?;
    } else {
        print_recommendation(&recommendation, unit);
    }
    Ok(())
}

pub(crate) fn cmd_guidance_table(svc: &KibbleService, json: bool) -> Result<()> {
    if json {
        print_json(&CALORIC_GUIDANCE_TABLE)?;
        return Ok(());
    }

    #[derive(Tabled)]
    struct GuidanceRow {
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Maintain")]
        maintain: i64,
        #[tabled(rename = "Lose")]
        lose: i64,
        #[tabled(rename = "Gain")]
        gain: i64,
    }

    let unit = svc.settings()?.weight_unit;
    let rows: Vec<GuidanceRow> = CALORIC_GUIDANCE_TABLE
        .iter()
        .map(|row| GuidanceRow {
            weight: format!(
                "{} - {}",
                format_weight(unit, Some(row.weight_range_low)),
                format_weight(unit, Some(row.weight_range_high))
            ),
            maintain: row.maintain_calories,
            lose: row.lose_weight_calories,
            gain: row.gain_weight_calories,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!("Calories per day at moderate activity. Sedentary x0.8, active x1.2, very active x1.4.");
    Ok(())
}

fn print_recommendation(rec: &Recommendation, unit: WeightUnit) {
    println!(
        "{} at {} ({})",
        rec.goal.label(),
        format_weight(unit, Some(rec.weight_lbs)),
        rec.activity.label()
    );
    println!("  Daily calories: {} kcal", rec.calories);
    println!(
        "  Daily food:     {:.1} cups ({:.0} kcal/cup)",
        rec.cups, rec.calories_per_cup
    );
    if rec.used_fallback {
        println!("  Outside the guidance table; estimated at 30 kcal per lb.");
    }
}
