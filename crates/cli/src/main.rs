//! Fairway CLI - golf match discovery, courses, events and messages.
//!
//! # Usage
//!
//! ```bash
//! # Golfers within 25 miles with a handicap between 5 and 20
//! fairway discover --handicap-min 5 --handicap-max 20 --max-distance 25
//!
//! # Search the course directory
//! fairway courses list --search pine --location local
//!
//! # Toggle your RSVP to the first listed event
//! fairway events rsvp 0
//!
//! # Follow a conversation (polls every FAIRWAY_MESSAGE_POLL_SECS)
//! fairway messages watch 2vxsx-fae
//!
//! # Try everything against seeded in-memory data
//! fairway --offline discover
//! ```
//!
//! # Commands
//!
//! - `discover` - Nearby golfers matching handicap, distance and preference
//! - `profile` - Show or save the caller's profile
//! - `courses` - Course directory, course members, adding courses (admins)
//! - `events` - Upcoming and past events, creating events, RSVPs
//! - `messages` - Show, send and watch direct messages
//! - `sponsors` - Sponsor list

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fairway_client::{AppContext, ClientConfig};
use fairway_core::{
    EventId, Gender, LocationFilter, Preference, PreferenceFilter, Principal, UserProfile,
};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod offline;

#[derive(Parser)]
#[command(name = "fairway")]
#[command(author, version, about = "Fairway golf matching client")]
struct Cli {
    /// Use seeded in-memory data instead of the configured backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find nearby golfers
    Discover {
        #[arg(long, default_value_t = UserProfile::HANDICAP_MIN, allow_hyphen_values = true)]
        handicap_min: i64,

        #[arg(long, default_value_t = UserProfile::HANDICAP_MAX, allow_hyphen_values = true)]
        handicap_max: i64,

        /// Maximum distance in miles
        #[arg(long, default_value_t = fairway_core::discovery::DEFAULT_MAX_DISTANCE_MILES)]
        max_distance: f64,

        /// `any` or one of pleasure, romantic, business, casual
        #[arg(long, default_value = "any")]
        preference: PreferenceFilter,
    },
    /// Show or save your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse the course directory
    Courses {
        #[command(subcommand)]
        action: CourseAction,
    },
    /// Golf events and RSVPs
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Direct messages
    Messages {
        #[command(subcommand)]
        action: MessageAction,
    },
    /// List sponsors
    Sponsors,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Create or update your profile
    Save {
        #[arg(long, allow_hyphen_values = true)]
        handicap: i64,

        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,

        /// female, male or couple
        #[arg(long)]
        gender: Gender,

        #[arg(long)]
        looking_for: Gender,

        #[arg(long)]
        gender_preference: Gender,

        /// pleasure, romantic, business or casual
        #[arg(long)]
        preference: Preference,

        #[arg(long)]
        bio: String,

        /// JPEG or PNG, at most 5 MB
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CourseAction {
    /// List courses
    List {
        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, local or regional
        #[arg(short, long, default_value = "all")]
        location: LocationFilter,
    },
    /// Show a course and its members
    Show { name: String },
    /// Add a course (admins only)
    Add {
        name: String,
        website: String,

        /// Bookable directly rather than regional
        #[arg(long)]
        local: bool,
    },
}

#[derive(Subcommand)]
enum EventAction {
    /// List upcoming and past events
    List,
    /// Create an event
    Create {
        course_name: String,
        description: String,
    },
    /// Toggle your RSVP
    Rsvp { event_id: EventId },
}

#[derive(Subcommand)]
enum MessageAction {
    /// Show a conversation
    Show { with_user: Principal },
    /// Send a message
    Send { recipient: Principal, text: String },
    /// Follow a conversation until Ctrl+C
    Watch {
        with_user: Principal,

        /// Stop after this many refreshes
        #[arg(long)]
        refreshes: Option<usize>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fairway_cli=info,fairway_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let app = AppContext::new(config);
    let result = run(cli, &app).await;
    app.shutdown().await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, app: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let me = if cli.offline {
        let backend = offline::seeded_backend().await?;
        let me = backend.caller().clone();
        app.connect(Arc::new(backend));
        tracing::info!(caller = %me, "Using offline demo data");
        Some(me)
    } else {
        app.connect_http()?;
        app.config().principal.clone()
    };

    match cli.command {
        Commands::Discover {
            handicap_min,
            handicap_max,
            max_distance,
            preference,
        } => {
            let filters = fairway_core::DiscoveryFilters {
                handicap_min,
                handicap_max,
                max_distance_miles: max_distance,
                preference,
            };
            commands::discover::run(app, &filters).await?;
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(app).await?,
            ProfileAction::Save {
                handicap,
                latitude,
                longitude,
                gender,
                looking_for,
                gender_preference,
                preference,
                bio,
                avatar,
            } => {
                let avatar = match avatar {
                    Some(path) => Some(commands::profile::read_avatar(&path).await?),
                    None => None,
                };
                let draft = fairway_core::ProfileDraft {
                    handicap,
                    latitude,
                    longitude,
                    gender,
                    looking_for,
                    gender_preference,
                    preference,
                    bio,
                    avatar,
                };
                commands::profile::save(app, draft).await?;
            }
        },
        Commands::Courses { action } => match action {
            CourseAction::List { search, location } => {
                commands::courses::list(app, search, location).await?;
            }
            CourseAction::Show { name } => commands::courses::show(app, &name).await?,
            CourseAction::Add {
                name,
                website,
                local,
            } => commands::courses::add(app, &name, &website, local).await?,
        },
        Commands::Events { action } => match action {
            EventAction::List => commands::events::list(app, me.as_ref()).await?,
            EventAction::Create {
                course_name,
                description,
            } => commands::events::create(app, &course_name, &description).await?,
            EventAction::Rsvp { event_id } => {
                commands::events::toggle_rsvp(app, commands::require_principal(me)?, event_id)
                    .await?;
            }
        },
        Commands::Messages { action } => match action {
            MessageAction::Show { with_user } => {
                commands::messages::show(app, me.as_ref(), &with_user).await?;
            }
            MessageAction::Send { recipient, text } => {
                commands::messages::send(app, &recipient, &text).await?;
            }
            MessageAction::Watch {
                with_user,
                refreshes,
            } => {
                commands::messages::watch(
                    app,
                    commands::require_principal(me)?,
                    with_user,
                    refreshes,
                )
                .await?;
            }
        },
        Commands::Sponsors => commands::sponsors::list(app).await?,
    }
    Ok(())
}
