mod advise;
mod data;
mod helpers;
mod log;
mod profile;
mod settings;
mod stats;
mod transition;

pub(crate) use advise::{cmd_advise, cmd_guidance_table};
pub(crate) use data::{cmd_demo, cmd_export, cmd_import};
pub(crate) use log::{
    EntryUpdateArgs, cmd_entries, cmd_entry_delete, cmd_entry_show, cmd_entry_update, cmd_log,
};
pub(crate) use profile::{
    ProfileUpdateArgs, cmd_profile_add, cmd_profile_delete, cmd_profile_list, cmd_profile_show,
    cmd_profile_update, cmd_profile_use,
};
pub(crate) use settings::{cmd_settings_reset, cmd_settings_set, cmd_settings_show};
pub(crate) use stats::cmd_stats;
pub(crate) use transition::{
    cmd_transition_activate, cmd_transition_delete, cmd_transition_list, cmd_transition_phases,
    cmd_transition_show, cmd_transition_start, cmd_transition_stop,
};
