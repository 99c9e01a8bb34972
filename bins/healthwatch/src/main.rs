//! HealthWatch - health-awareness events near you
//!
//! Searches events by radius or map viewport, keeps a saved-events list and
//! a signed-in session between runs, and manages the user's health record.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use healthwatch_api_client::{ApiError, ClientConfig, HealthWatchClient};
use healthwatch_cli::output::Status;
use healthwatch_core::config::Config;
use healthwatch_core::error::exit_codes;
use healthwatch_core::storage::Storage;
use healthwatch_geo::Coordinate;
use healthwatch_state::{Action, Settings, StateError, Store};
use healthwatch_telemetry::TelemetryConfig;
use serde::Serialize;
use tracing::warn;

#[derive(Parser)]
#[command(name = "healthwatch")]
#[command(about = "Find health-awareness events near you")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true, env = "HEALTHWATCH_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and save events
    #[command(subcommand)]
    Events(EventsCommand),

    /// Remember where to search from
    #[command(subcommand)]
    Location(LocationCommand),

    /// Search defaults kept between runs
    Settings {
        /// Default radius: 25km, 50km or 100km
        #[arg(long)]
        radius: Option<String>,
        /// Events per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Turn event reminders on or off
        #[arg(long)]
        notifications: Option<bool>,
    },

    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HEALTHWATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "HEALTHWATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Health profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Symptom journal
    #[command(subcommand)]
    Symptoms(SymptomsCommand),

    /// Appointments with health facilities
    #[command(subcommand)]
    Appointments(AppointmentsCommand),

    /// Messages and reminders
    #[command(subcommand)]
    Notifications(NotificationsCommand),

    /// Reviews of attended events
    #[command(subcommand)]
    Reviews(ReviewsCommand),
}

#[derive(Subcommand)]
enum EventsCommand {
    /// Events within a radius, grouped by date
    Search(SearchArgs),

    /// Events inside a map viewport
    Map {
        /// North-east corner as lat,lng
        #[arg(long, allow_hyphen_values = true)]
        ne: Coordinate,
        /// South-west corner as lat,lng
        #[arg(long, allow_hyphen_values = true)]
        sw: Coordinate,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Details of one event
    Show { id: String },

    /// Add an event to the saved list
    Save { id: String },

    /// Remove an event from the saved list
    Unsave { id: String },

    /// List saved events
    Saved,
}

#[derive(Args)]
struct SearchArgs {
    /// Search from here instead of the saved location (lat,lng)
    #[arg(long, allow_hyphen_values = true)]
    near: Option<Coordinate>,

    /// Radius: 25km, 50km or 100km
    #[arg(short, long)]
    radius: Option<String>,

    #[command(flatten)]
    filters: FilterArgs,

    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
struct FilterArgs {
    /// Match in title or description
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long)]
    region: Option<String>,

    /// Events on this day (YYYY-MM-DD)
    #[arg(long, conflicts_with = "from")]
    date: Option<NaiveDate>,

    /// Start of a date range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of a date range; requires --from
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum LocationCommand {
    /// Save the location searches start from
    Set {
        /// lat,lng
        #[arg(allow_hyphen_values = true)]
        coordinates: Coordinate,
        /// Name to show, e.g. a town
        #[arg(long)]
        label: Option<String>,
    },
    /// Show the saved location
    Show,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Fetch and show the health profile
    Show,
    /// Update fields of the health profile
    Set(ProfileArgs),
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    gender: Option<String>,
    /// Kilograms
    #[arg(long)]
    weight: Option<f64>,
    /// Centimeters
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    blood_type: Option<String>,
    /// Repeat for several
    #[arg(long = "allergy")]
    allergies: Vec<String>,
    #[arg(long = "condition")]
    chronic_conditions: Vec<String>,
    #[arg(long = "medication")]
    medications: Vec<String>,
}

#[derive(Subcommand)]
enum SymptomsCommand {
    /// Journal entries, newest first
    List,
    /// Record symptoms
    Log {
        /// Repeat for several
        #[arg(short, long = "symptom", required = true)]
        symptoms: Vec<String>,
        /// mild, moderate or severe
        #[arg(long, default_value = "mild")]
        severity: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum AppointmentsCommand {
    /// Upcoming and past appointments
    List,
    /// Book an appointment
    Book {
        #[arg(long)]
        facility: String,
        /// RFC 3339, or "YYYY-MM-DD HH:MM" local time
        #[arg(long)]
        date: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Cancel a scheduled appointment
    Cancel { id: String },
}

#[derive(Subcommand)]
enum NotificationsCommand {
    /// Notifications, newest first
    List,
    /// Mark one as read
    Read { id: String },
}

#[derive(Subcommand)]
enum ReviewsCommand {
    /// Reviews of an event
    List { event_id: String },
    /// Review an event
    Add {
        event_id: String,
        /// 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Everything a command needs
pub struct App {
    pub client: HealthWatchClient,
    pub store: Store,
    pub config: Config,
    pub json: bool,
}

impl App {
    fn new(config: Config, json: bool) -> Result<Self> {
        let mut store = match Storage::open(config.schema.storage.resolved_dir()) {
            Ok(storage) => Store::open(storage),
            Err(e) => {
                warn!(error = %e, "Storage unavailable, state will not be kept");
                Store::in_memory()
            }
        };

        // Search defaults from the config file until the user picks their own
        if store.state().settings == Settings::default() {
            let mut search = store.state().search.clone();
            search.radius = Some(config.schema.search.default_radius.clone());
            search.limit = Some(config.schema.search.page_size);
            store.dispatch(Action::FiltersChanged(search))?;
        }

        let client = HealthWatchClient::with_config(ClientConfig::from_sources(Some(&config.schema.api))?)?;
        if let Some(token) = store.token() {
            client.set_token(token);
        }

        Ok(Self {
            client,
            store,
            config,
            json,
        })
    }

    /// Print as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    healthwatch_telemetry::init_with_config(TelemetryConfig::for_cli(
        &config.schema.logging.level,
        cli.verbose,
    ))?;

    let mut app = match App::new(config, cli.json) {
        Ok(app) => app,
        Err(e) => {
            Status::error(&format!("{e:#}"));
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Events(cmd) => commands::events::run(&mut app, cmd).await,
        Commands::Location(cmd) => commands::events::run_location(&mut app, cmd),
        Commands::Settings {
            radius,
            page_size,
            notifications,
        } => commands::events::run_settings(&mut app, radius, page_size, notifications),
        Commands::Login { email, password } => commands::account::login(&mut app, email, password).await,
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&mut app, name, email, password).await,
        Commands::Logout => commands::account::logout(&mut app),
        Commands::Whoami => commands::account::whoami(&mut app).await,
        Commands::Profile(cmd) => commands::account::profile(&mut app, cmd).await,
        Commands::Symptoms(cmd) => commands::health::symptoms(&app, cmd).await,
        Commands::Appointments(cmd) => commands::health::appointments(&app, cmd).await,
        Commands::Notifications(cmd) => commands::health::notifications(&app, cmd).await,
        Commands::Reviews(cmd) => commands::health::reviews(&app, cmd).await,
    };

    if let Err(e) = result {
        std::process::exit(report(&e));
    }
    Ok(())
}

/// Print an error the way the user needs to see it and pick an exit code
fn report(error: &anyhow::Error) -> i32 {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        if api.is_validation() {
            Status::error("Please correct the following:");
            for (field, message) in api.field_errors().iter() {
                eprintln!("  {field}: {message}");
            }
            return exit_codes::VALIDATION_ERROR;
        }
        if api.is_unauthorized() || matches!(api, ApiError::NotAuthenticated) {
            Status::error("Not signed in. Run `healthwatch login` first.");
            return exit_codes::FAILURE;
        }
        Status::error(&api.to_string());
        return if api.is_backend_failure() || matches!(api, ApiError::CircuitOpen) {
            exit_codes::NETWORK_ERROR
        } else {
            exit_codes::FAILURE
        };
    }
    if let Some(state @ (StateError::Location(_) | StateError::Settings(_))) = error.downcast_ref::<StateError>() {
        Status::error(&state.to_string());
        return exit_codes::VALIDATION_ERROR;
    }
    Status::error(&format!("{error:#}"));
    exit_codes::FAILURE
}
