use anyhow::Result;

use kibble_core::models::AppSettings;
use kibble_core::service::KibbleService;

use super::helpers::print_json;

pub(crate) fn cmd_settings_show(svc: &KibbleService, json: bool) -> Result<()> {
    let settings = svc.settings()?;
    if json {
        print_json(&settings)?;
    } else {
        print_settings(&settings)?;
    }
    Ok(())
}

pub(crate) fn cmd_settings_set(
    svc: &KibbleService,
    key: &str,
    value: &str,
    json: bool,
) -> Result<()> {
    let settings = svc.update_setting(key, value)?;
    if json {
        print_json(&settings)?;
    } else {
        println!("Set {key} = {value}");
    }
    Ok(())
}

pub(crate) fn cmd_settings_reset(svc: &KibbleService, json: bool) -> Result<()> {
    let settings = svc.reset_settings()?;
    if json {
        print_json(&settings)?;
    } else {
        println!("Settings restored to defaults");
        print_settings(&settings)?;
    }
    Ok(())
}

/// One `key  value` line per setting, using the same keys `settings set` accepts.
fn print_settings(settings: &AppSettings) -> Result<()> {
    for (key, value) in setting_lines(settings)? {
        println!("  {key:<28} {value}");
    }
    Ok(())
}

fn setting_lines(settings: &AppSettings) -> Result<Vec<(String, String)>> {
    let mut value = serde_json::to_value(settings)?;
    let mut lines = Vec::new();
    if let Some(map) = value.as_object_mut() {
        let presentation = map.remove("presentation");
        let nested = presentation
            .as_ref()
            .and_then(serde_json::Value::as_object)
            .into_iter()
            .flatten();
        for (key, v) in map.iter().chain(nested) {
            let text = v.as_str().map_or_else(|| v.to_string(), str::to_string);
            lines.push((key.clone(), text));
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kibble_core::models::SETTING_KEYS;

    #[test]
    fn test_setting_lines_cover_every_key() {
        let lines = setting_lines(&AppSettings::default()).unwrap();
        let keys: Vec<&str> = lines.iter().map(|(k, _)| k.as_str()).collect();
        for key in SETTING_KEYS {
            assert!(keys.contains(key), "missing {key}");
        }
        assert_eq!(lines.len(), SETTING_KEYS.len());
    }

    #[test]
    fn test_setting_lines_render_plain_values() {
        let lines = setting_lines(&AppSettings::default()).unwrap();
        let lookup = |key: &str| {
            lines
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(lookup("weight_unit"), "pounds");
        assert_eq!(lookup("reminder_time"), "08:00");
        assert_eq!(lookup("reminder_enabled"), "false");
        assert_eq!(lookup("card_radius"), "rounded");
    }

    #[test]
    fn test_settings_set_persists() {
        let svc = KibbleService::new_in_memory().unwrap();
        cmd_settings_set(&svc, "weight_unit", "kg", true).unwrap();
        assert_eq!(
            svc.settings().unwrap().weight_unit,
            kibble_core::models::WeightUnit::Kilograms
        );
    }
}
