mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    EntryUpdateArgs, ProfileUpdateArgs, cmd_advise, cmd_demo, cmd_entries, cmd_entry_delete,
    cmd_entry_show, cmd_entry_update, cmd_export, cmd_guidance_table, cmd_import, cmd_log,
    cmd_profile_add, cmd_profile_delete, cmd_profile_list, cmd_profile_show, cmd_profile_update,
    cmd_profile_use, cmd_settings_reset, cmd_settings_set, cmd_settings_show, cmd_stats,
    cmd_transition_activate, cmd_transition_delete, cmd_transition_list, cmd_transition_phases,
    cmd_transition_show, cmd_transition_start, cmd_transition_stop,
};
use crate::config::Config;
use kibble_core::service::KibbleService;

#[derive(Parser)]
#[command(
    name = "kibble",
    version,
    about = "Track your dog's weight, meals, and food transitions",
    long_about = "\n\n  ██╗  ██╗██╗██████╗ ██████╗ ██╗     ███████╗
  ██║ ██╔╝██║██╔══██╗██╔══██╗██║     ██╔════╝
  █████╔╝ ██║██████╔╝██████╔╝██║     █████╗
  ██╔═██╗ ██║██╔══██╗██╔══██╗██║     ██╔══╝
  ██║  ██╗██║██████╔╝██████╔╝███████╗███████╗
  ╚═╝  ╚═╝╚═╝╚═════╝ ╚═════╝ ╚══════╝╚══════╝
        one bowl at a time.
"
)]
struct Cli {
    /// Dog to act on, by name or id (default: the active dog)
    #[arg(long, global = true)]
    dog: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage dog profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log a day's weight and food (replaces any entry for that date)
    Log {
        /// Total food fed, in your food unit
        #[arg(short, long)]
        food: f64,
        /// Calories fed
        #[arg(short, long)]
        calories: i64,
        /// Morning weight, in your weight unit
        #[arg(long)]
        am: Option<f64>,
        /// Evening weight, in your weight unit
        #[arg(long)]
        pm: Option<f64>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Notes for the day
        #[arg(long)]
        notes: Option<String>,
        /// The transition plan was not followed today
        #[arg(long)]
        skipped: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List feeding entries, newest first
    Entries {
        /// Only the last N days (default: all)
        #[arg(short, long)]
        days: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show, edit, or delete a single feeding entry
    Entry {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Plan and follow a switch from one food to another
    Transition {
        #[command(subcommand)]
        command: TransitionCommands,
    },
    /// Recommend daily calories and portions
    Advise {
        /// Weight in your weight unit (default: the dog's current weight)
        #[arg(short, long)]
        weight: Option<f64>,
        /// Goal: maintain, lose, gain
        #[arg(short, long, default_value = "maintain")]
        goal: String,
        /// Activity: sedentary, moderate, active, veryActive
        #[arg(short, long, default_value = "moderate")]
        activity: String,
        /// Calories per cup of the food (default: 340)
        #[arg(long)]
        cal_per_cup: Option<f64>,
        /// Print the whole guidance table instead
        #[arg(long)]
        table: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show progress stats and recent weight trend
    Stats {
        /// Number of weighed days to include in the trend
        #[arg(short, long, default_value = "7")]
        points: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Export all data as JSON
    Export {
        /// File to write (default: stdout)
        file: Option<PathBuf>,
    },
    /// Import a JSON export, merging by id
    Import {
        /// Export file to read
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a sample dog with a transition in progress
    Demo {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Add a dog
    Add {
        /// Dog's name
        name: String,
        /// Breed
        #[arg(long)]
        breed: String,
        /// Ideal weight, in your weight unit
        #[arg(long)]
        ideal: f64,
        /// Current weight, in your weight unit
        #[arg(long)]
        current: Option<f64>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated allergies, e.g. "chicken, corn"
        #[arg(long)]
        allergies: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all dogs (* marks the active one)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a dog's profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Make a dog the active one
    Use {
        /// Name or id
        dog: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a dog's profile
    Update {
        #[command(flatten)]
        fields: ProfileUpdateArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a dog with all of their entries and plans
    Delete {
        /// Name or id
        dog: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum EntryCommands {
    /// Show an entry
    Show {
        /// Entry id, or a date for the selected dog
        entry: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an entry
    Update {
        /// Entry id, or a date for the selected dog
        entry: String,
        #[command(flatten)]
        fields: EntryUpdateArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry
    Delete {
        /// Entry id, or a date for the selected dog
        entry: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TransitionCommands {
    /// Start a transition and make it the active one
    Start {
        /// Food being phased out
        #[arg(long = "from")]
        old_food: String,
        /// Food being phased in
        #[arg(long = "to")]
        new_food: String,
        /// Plan name (default: "<from> to <to>")
        #[arg(long)]
        name: Option<String>,
        /// First day (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        start: Option<String>,
        /// JSON file with custom phases (default: the 14-day schedule)
        #[arg(long, value_name = "PATH")]
        phases: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's progress for the active plan, or a given plan
    Show {
        /// Plan id (default: the dog's active plan)
        plan: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default 14-day schedule
    Phases {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a dog's plans (* marks the active one)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Make a plan the active one
    Activate {
        /// Plan id
        plan: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop the dog's active transition
    Stop {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a plan
    Delete {
        /// Plan id
        plan: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show all settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one setting, e.g. `settings set weight_unit kilograms`
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the defaults
    Reset {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = KibbleService::open(&config.db_path)?;
    let dog = cli.dog.as_deref();

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Add {
                name,
                breed,
                ideal,
                current,
                dob,
                notes,
                allergies,
                json,
            } => cmd_profile_add(
                &svc,
                &name,
                &breed,
                ideal,
                current,
                dob,
                notes,
                allergies.as_deref(),
                json,
            ),
            ProfileCommands::List { json } => cmd_profile_list(&svc, json),
            ProfileCommands::Show { json } => cmd_profile_show(&svc, dog, json),
            ProfileCommands::Use { dog, json } => cmd_profile_use(&svc, &dog, json),
            ProfileCommands::Update { fields, json } => cmd_profile_update(&svc, dog, fields, json),
            ProfileCommands::Delete { dog, json } => cmd_profile_delete(&svc, &dog, json),
        },
        Commands::Log {
            food,
            calories,
            am,
            pm,
            date,
            notes,
            skipped,
            json,
        } => cmd_log(
            &svc, dog, date, am, pm, food, calories, notes, skipped, json,
        ),
        Commands::Entries { days, json } => cmd_entries(&svc, dog, days, json),
        Commands::Entry { command } => match command {
            EntryCommands::Show { entry, json } => cmd_entry_show(&svc, dog, &entry, json),
            EntryCommands::Update {
                entry,
                fields,
                json,
            } => cmd_entry_update(&svc, dog, &entry, fields, json),
            EntryCommands::Delete { entry, json } => cmd_entry_delete(&svc, dog, &entry, json),
        },
        Commands::Transition { command } => match command {
            TransitionCommands::Start {
                old_food,
                new_food,
                name,
                start,
                phases,
                json,
            } => cmd_transition_start(
                &svc,
                dog,
                name,
                &old_food,
                &new_food,
                start,
                phases.as_deref(),
                json,
            ),
            TransitionCommands::Show { plan, json } => {
                cmd_transition_show(&svc, dog, plan.as_deref(), json)
            }
            TransitionCommands::Phases { json } => cmd_transition_phases(json),
            TransitionCommands::List { json } => cmd_transition_list(&svc, dog, json),
            TransitionCommands::Activate { plan, json } => {
                cmd_transition_activate(&svc, &plan, json)
            }
            TransitionCommands::Stop { json } => cmd_transition_stop(&svc, dog, json),
            TransitionCommands::Delete { plan, json } => cmd_transition_delete(&svc, &plan, json),
        },
        Commands::Advise {
            weight,
            goal,
            activity,
            cal_per_cup,
            table,
            json,
        } => {
            if table {
                cmd_guidance_table(&svc, json)
            } else {
                cmd_advise(&svc, dog, weight, &goal, &activity, cal_per_cup, json)
            }
        }
        Commands::Stats { points, json } => cmd_stats(&svc, dog, points, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&svc, json),
            SettingsCommands::Set { key, value, json } => {
                cmd_settings_set(&svc, &key, &value, json)
            }
            SettingsCommands::Reset { json } => cmd_settings_reset(&svc, json),
        },
        Commands::Export { file } => cmd_export(&svc, file.as_deref()),
        Commands::Import { file, json } => cmd_import(&svc, &file, json),
        Commands::Demo { json } => cmd_demo(&svc, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let (api_key, new_api_key) = if no_auth {
                (None, false)
            } else {
                let (key, new) = config.load_or_create_api_key()?;
                (Some(key), new)
            };
            server::start_server(svc, port, &bind, api_key, new_api_key).await
        }
    }
}
