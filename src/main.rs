//! reprise - a recurring-backup scheduler.
//!
//! Usage:
//!   reprise run <profiles-dir>        Run the scheduler over a profile directory
//!   reprise validate <profiles-dir>   Validate profiles without running
//!   reprise list <profiles-dir>       List all profiles in the directory
//!   reprise next <profiles-dir> <profile>  Print a profile's next occurrences

use clap::{Parser, Subcommand};
use reprise::{
    load_profiles_from_directory, resolve_next_n, EventBus, EventHandler, JsonDirStore, Scheduler,
    ZonedCalendar,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// reprise - a recurring-backup scheduler
#[derive(Parser)]
#[command(name = "reprise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler over a profile directory
    Run {
        /// Path to the directory containing profile JSON files
        #[arg(value_name = "PROFILES_DIR")]
        profiles_dir: PathBuf,

        /// Scheduler tick interval in seconds (default: 1)
        #[arg(long, default_value = "1")]
        tick_interval: u64,

        /// Timezone schedules are evaluated in (default: UTC)
        #[arg(short = 'z', long)]
        timezone: Option<String>,
    },

    /// Validate profile configurations without running
    Validate {
        /// Path to the directory containing profile JSON files
        #[arg(value_name = "PROFILES_DIR")]
        profiles_dir: PathBuf,
    },

    /// List all profiles in the directory
    List {
        /// Path to the directory containing profile JSON files
        #[arg(value_name = "PROFILES_DIR")]
        profiles_dir: PathBuf,
    },

    /// Print a profile's next occurrences
    Next {
        /// Path to the directory containing profile JSON files
        #[arg(value_name = "PROFILES_DIR")]
        profiles_dir: PathBuf,

        /// Profile name or uuid
        #[arg(value_name = "PROFILE")]
        profile: String,

        /// How many occurrences to print
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Timezone schedules are evaluated in (default: UTC)
        #[arg(short = 'z', long)]
        timezone: Option<String>,
    },
}

/// Simple logging event handler that prints scheduler events.
struct LoggingHandler;

#[async_trait::async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: &reprise::Event) {
        match event {
            reprise::Event::BackupDue {
                profile_id,
                name,
                due_at,
                ..
            } => {
                info!("Backup due for '{}' at {} (profile: {})", name, due_at, profile_id);
            }
            reprise::Event::ProfileRescheduled {
                name, next_backup, ..
            } => {
                info!("'{}' rescheduled, next backup at {}", name, next_backup);
            }
            reprise::Event::ProfileRegistered {
                name, next_backup, ..
            } => {
                info!("Registered '{}', first backup at {}", name, next_backup);
            }
            reprise::Event::ProfileRemoved { profile_id, .. } => {
                info!("Removed profile {}", profile_id);
            }
        }
    }
}

fn calendar_for(timezone: Option<&str>) -> Result<ZonedCalendar, Box<dyn std::error::Error>> {
    match timezone {
        Some(name) => Ok(ZonedCalendar::from_name(name)?),
        None => Ok(ZonedCalendar::utc()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            profiles_dir,
            tick_interval,
            timezone,
        } => {
            run_scheduler(profiles_dir, tick_interval, timezone.as_deref()).await?;
        }
        Commands::Validate { profiles_dir } => {
            validate_profiles(profiles_dir).await?;
        }
        Commands::List { profiles_dir } => {
            list_profiles(profiles_dir).await?;
        }
        Commands::Next {
            profiles_dir,
            profile,
            count,
            timezone,
        } => {
            print_next_occurrences(profiles_dir, profile, count, timezone.as_deref()).await?;
        }
    }

    Ok(())
}

/// Run the scheduler over a profile directory.
async fn run_scheduler(
    profiles_dir: PathBuf,
    tick_interval: u64,
    timezone: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading profiles from: {}", profiles_dir.display());

    let profiles = load_profiles_from_directory(&profiles_dir).await?;
    if profiles.is_empty() {
        warn!("No profile files found in {}", profiles_dir.display());
        return Ok(());
    }

    info!("Loaded {} profile(s):", profiles.len());
    for profile in &profiles {
        info!(
            "  - {} ({}): next backup at {}",
            profile.name(),
            profile.id(),
            profile.next_backup()
        );
    }

    let event_bus = EventBus::new();
    event_bus.register(Arc::new(LoggingHandler)).await;

    let calendar = calendar_for(timezone)?;
    let store = JsonDirStore::new(&profiles_dir)?;
    let scheduler = Scheduler::new(store)
        .with_event_bus(event_bus)
        .with_calendar(calendar)
        .with_tick_interval(Duration::from_secs(tick_interval));

    info!("Starting scheduler (tick interval: {}s)...", tick_interval);
    info!("Press Ctrl+C to stop");

    let (handle, scheduler_task) = scheduler.start().await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("\nShutting down...");
            handle.shutdown().await?;
        }
        _ = scheduler_task => {
            info!("Scheduler stopped");
        }
    }

    info!("Goodbye!");
    Ok(())
}

/// Validate profile configurations without running.
async fn validate_profiles(profiles_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating profiles in: {}", profiles_dir.display());

    match load_profiles_from_directory(&profiles_dir).await {
        Ok(profiles) => {
            info!("All {} profile(s) are valid:", profiles.len());
            for profile in &profiles {
                info!("  - {} ({}): OK", profile.name(), profile.id());
            }
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// List all profiles in the directory.
async fn list_profiles(profiles_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = load_profiles_from_directory(&profiles_dir).await?;

    if profiles.is_empty() {
        println!("No profiles found in {}", profiles_dir.display());
        return Ok(());
    }

    println!("Profiles in {}:", profiles_dir.display());
    println!();

    for profile in &profiles {
        println!("{} ({})", profile.name(), profile.id());
        println!("  Target: {}", profile.target_dir().display());
        println!("  Next backup: {}", profile.next_backup());
        if !profile.dirs_to_include().is_empty() {
            println!("  Directories:");
            for dir in profile.dirs_to_include() {
                println!("    - {}", dir.display());
            }
        }
        if !profile.files_to_include().is_empty() {
            println!("  Files:");
            for file in profile.files_to_include() {
                println!("    - {}", file.display());
            }
        }
        let excluded = profile.files_to_exclude().len() + profile.dirs_to_exclude().len();
        if excluded > 0 {
            println!("  Exclusions: {}", excluded);
        }
        println!();
    }

    Ok(())
}

/// Print a profile's next occurrences.
async fn print_next_occurrences(
    profiles_dir: PathBuf,
    wanted: String,
    count: usize,
    timezone: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = load_profiles_from_directory(&profiles_dir).await?;

    let Some(profile) = profiles
        .iter()
        .find(|p| p.name() == wanted || p.id().to_string() == wanted)
    else {
        error!("Profile '{}' not found", wanted);
        error!(
            "Available profiles: {}",
            profiles
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        return Err(format!("Profile '{}' not found", wanted).into());
    };

    let calendar = calendar_for(timezone)?;
    let occurrences = resolve_next_n(
        profile.interval(),
        chrono::Utc::now(),
        count,
        reprise::default_horizon(),
        &calendar,
    )?;

    println!("Next {} occurrence(s) for '{}':", occurrences.len(), profile.name());
    for occurrence in occurrences {
        println!("  {}", occurrence);
    }

    Ok(())
}
