//! hellocare-admin - a command-line admin console for the HelloCare
//! appointment platform.
//!
//! Signs an administrator in, keeps the session between runs and lists the
//! backend's doctors, patients, appointments and audit logs.

mod commands;
mod format;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hellocare_core::models::{AppointmentStatus, LogRole};
use hellocare_core::{ApiClient, Config, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "hellocare-admin", version, about = "HelloCare admin console")]
struct Cli {
    /// Backend base URL (overrides HELLOCARE_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with an admin email and password
    Login {
        #[arg(long, env = "HELLOCARE_EMAIL")]
        email: Option<String>,
    },
    /// Sign in as the built-in demo admin without contacting the backend
    DemoLogin,
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Platform totals and the latest appointments
    Stats,
    Doctors,
    /// Patients with their appointment counts
    Patients,
    Appointments {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Change an appointment's status
    SetStatus {
        appointment_id: String,
        status: AppointmentStatus,
    },
    /// Billable appointments and totals
    Revenue,
    /// Audit logs for one kind of actor
    Logs {
        #[arg(long, default_value = "patient")]
        role: LogRole,
        #[arg(long, default_value_t = commands::DEFAULT_LOG_LIMIT)]
        limit: u32,
    },
    /// GET an arbitrary backend path and print the JSON
    Get { path: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    info!(api_url = %config.api_url, storage = ?config.storage, "hellocare-admin starting");

    let session = SessionStore::from_config(&config)?;
    session.restore();
    let mut events = session.subscribe();
    let api = ApiClient::new(&config, session)?;

    let result = commands::run(cli.command, &config, &api).await;
    commands::report_session_events(&mut events);
    result
}
