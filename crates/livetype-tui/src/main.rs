//! Livetype TUI entry point.

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use dialoguer::{Input, theme::ColorfulTheme};
use livetype_client::Profile;
use livetype_tui::{Runtime, SystemEnv, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Livetype terminal client
#[derive(Parser, Debug)]
#[command(name = "livetype-tui")]
#[command(about = "Terminal client for real-time livetype chat rooms")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "https://classic.talkomatic.co")]
    server: String,

    /// Display name; prompted for when missing
    #[arg(short, long)]
    username: Option<String>,

    /// Location shown next to your name; prompted for when missing
    #[arg(short, long)]
    location: Option<String>,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let username = match args.username {
        Some(name) => name,
        None => prompt_username()?,
    };
    let location = match args.location {
        Some(location) => location,
        None => prompt_location()?,
    };
    let profile = Profile::new(username, location);

    tracing::info!(server = %args.server, username = %profile.username, "livetype starting");

    let driver = TerminalDriver::new()?;
    let runtime = Runtime::new(driver, SystemEnv::new(), profile, args.server);

    Ok(runtime.run().await?)
}

/// Location used when the user accepts the prompt default.
const DEFAULT_LOCATION: &str = "On The Web";

/// Ask for a display name, refusing blank input.
fn prompt_username() -> dialoguer::Result<String> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your username")
        .validate_with(|input: &String| non_blank(input))
        .interact_text()?;
    Ok(name.trim().to_string())
}

/// Ask for a location, offering [`DEFAULT_LOCATION`].
fn prompt_location() -> dialoguer::Result<String> {
    let location: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your location")
        .default(DEFAULT_LOCATION.to_string())
        .interact_text()?;
    Ok(location.trim().to_string())
}

fn non_blank(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() { Err("Username cannot be empty") } else { Ok(()) }
}
