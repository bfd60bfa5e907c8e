//! Command implementations. Each command is one view of the dashboard:
//! it checks for a session, calls the gateway and prints rows.

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{error, warn};

use hellocare_core::models::{PatientSummary, RevenueSummary};
use hellocare_core::{ApiClient, Config, SessionEvent};

use crate::format::{format_date, format_dollars, format_phone, truncate_string};
use crate::Command;

/// Audit log page size
pub const DEFAULT_LOG_LIMIT: u32 = 50;

/// Appointments fetched for the dashboard's recent activity
const RECENT_APPOINTMENTS_FETCH: u32 = 5;

/// Appointments shown as recent activity
const RECENT_APPOINTMENTS_SHOWN: usize = 3;

const NOT_SIGNED_IN: &str =
    "Not signed in. Run `hellocare-admin login` or `hellocare-admin demo-login` first.";

pub async fn run(command: Command, config: &Config, api: &ApiClient) -> Result<()> {
    match command {
        Command::Login { email } => login(config, api, email).await,
        Command::DemoLogin => {
            let session = api.session().demo_login();
            println!(
                "Signed in as {} ({}) in demo mode",
                session.identity.display_name(),
                session.identity.role.as_str()
            );
            Ok(())
        }
        Command::Logout => {
            api.session().logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => whoami(api),
        Command::Stats => stats(api).await,
        Command::Doctors => doctors(api).await,
        Command::Patients => patients(api).await,
        Command::Appointments { limit } => appointments(api, limit).await,
        Command::SetStatus {
            appointment_id,
            status,
        } => {
            require_session(api)?;
            api.update_appointment_status(&appointment_id, status)
                .await
                .context("Failed to update status")?;
            println!("Appointment {} is now {}", appointment_id, status);
            Ok(())
        }
        Command::Revenue => revenue(api).await,
        Command::Logs { role, limit } => {
            require_session(api)?;
            let logs = api
                .fetch_audit_logs(role, limit)
                .await
                .context("Failed to fetch logs")?;
            if logs.is_empty() {
                println!("No {} logs", role);
            }
            for log in &logs {
                let when = log
                    .timestamp_utc()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<19}  {:<24}  {:<20}  {:<15}  {}",
                    when,
                    truncate_string(log.actor(), 24),
                    truncate_string(&log.action, 20),
                    log.ip.as_deref().unwrap_or("-"),
                    truncate_string(&log.details_display(), 60)
                );
            }
            Ok(())
        }
        Command::Get { path } => {
            require_session(api)?;
            let value: serde_json::Value = api
                .get(&path)
                .await
                .with_context(|| format!("GET {} failed", path))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

/// Tell the user when the backend ended their session during this run
pub fn report_session_events(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Invalidated { redirect_to }) => {
                warn!(redirect_to, "Session invalidated");
                eprintln!(
                    "Your session has expired. Run `hellocare-admin login` to sign in again."
                );
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

fn require_session(api: &ApiClient) -> Result<()> {
    if api.session().is_authenticated() {
        Ok(())
    } else {
        Err(anyhow!(NOT_SIGNED_IN))
    }
}

fn read_line() -> Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    read_line()
}

/// Offer the last email used, or ask for a different one
fn choose_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => {
            print!("Use last email ({})? [Y/n]: ", last);
            let answer = read_line()?;
            if accepts_default(&answer) {
                Ok(last.to_string())
            } else {
                prompt_email()
            }
        }
        None => prompt_email(),
    }
}

/// Empty input or anything but "n"/"no" keeps the default
fn accepts_default(answer: &str) -> bool {
    !matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}

fn prompt_password() -> Result<String> {
    if let Ok(password) = std::env::var("HELLOCARE_PASSWORD") {
        return Ok(password);
    }
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

async fn login(config: &Config, api: &ApiClient, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => choose_email(config.last_email.as_deref())?,
    };
    let password = prompt_password()?;

    let result = api.session().login(api, &email, &password).await;
    if !result.success {
        let message = result.error.unwrap_or_else(|| "Login failed".to_string());
        return Err(anyhow!(message));
    }

    if let Err(e) = Config::remember_email(&email) {
        warn!(error = %e, "Failed to save config");
    }

    if let Some(identity) = api.session().identity() {
        println!(
            "Signed in as {} ({})",
            identity.display_name(),
            identity.role.as_str()
        );
        if !identity.is_admin() {
            eprintln!("Warning: this account is not an admin; most commands will be refused");
        }
    }
    Ok(())
}

fn whoami(api: &ApiClient) -> Result<()> {
    let identity = api.session().identity().ok_or_else(|| anyhow!(NOT_SIGNED_IN))?;
    println!("{}", identity.display_name());
    println!("  user id: {}", identity.user_id);
    println!("  email:   {}", identity.email);
    println!("  role:    {}", identity.role.as_str());
    Ok(())
}

async fn stats(api: &ApiClient) -> Result<()> {
    require_session(api)?;

    // Each half of the dashboard fails independently
    let (stats, recent) = futures::join!(
        api.fetch_stats(),
        api.fetch_appointments(Some(RECENT_APPOINTMENTS_FETCH))
    );

    match stats {
        Ok(stats) => {
            println!("Doctors:       {}", stats.doctors);
            println!("Patients:      {}", stats.patients);
            println!("Appointments:  {}", stats.appointments);
            println!("Revenue:       {}", format_dollars(stats.revenue));
        }
        Err(e) => {
            error!(error = %e, "Error fetching stats");
            eprintln!("Failed to load stats: {}", e);
        }
    }

    match recent {
        Ok(appointments) => {
            println!();
            println!("Recent activity");
            for appt in appointments.iter().take(RECENT_APPOINTMENTS_SHOWN) {
                println!(
                    "  {}  {}  {}",
                    appt.date.as_deref().map(format_date).unwrap_or_default(),
                    appt.patient_name,
                    appt.status
                );
            }
        }
        Err(e) => {
            error!(error = %e, "Error fetching appointments");
            eprintln!("Failed to load recent appointments: {}", e);
        }
    }
    Ok(())
}

async fn doctors(api: &ApiClient) -> Result<()> {
    require_session(api)?;
    let doctors = api.fetch_doctors().await.context("Failed to fetch doctors")?;
    if doctors.is_empty() {
        println!("No doctors found");
    }
    for doctor in &doctors {
        println!(
            "{:<28}  {:<20}  {:<30}  {:<16}  {:>4}  {}",
            truncate_string(&doctor.name, 28),
            truncate_string(&doctor.specialization, 20),
            truncate_string(&doctor.email, 30),
            format_phone(doctor.phone_display()),
            doctor.rating_display().unwrap_or_default(),
            doctor
                .years_of_experience
                .map(|y| format!("{} years exp.", y))
                .unwrap_or_default()
        );
    }
    Ok(())
}

async fn patients(api: &ApiClient) -> Result<()> {
    require_session(api)?;
    let (patients, appointments) =
        futures::try_join!(api.fetch_patients(), api.fetch_appointments(None))
            .context("Failed to load data")?;

    let summaries = PatientSummary::build(&patients, &appointments);
    if summaries.is_empty() {
        println!("No patients found");
    }
    for summary in &summaries {
        let last = summary
            .last_appointment
            .as_ref()
            .and_then(|a| a.date.as_deref())
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28}  {:<30}  {:<16}  {:>3} appts  last {}",
            truncate_string(summary.patient.name_display(), 28),
            truncate_string(summary.patient.email_display(), 30),
            format_phone(summary.patient.phone_display()),
            summary.total_appointments,
            last
        );
    }
    Ok(())
}

async fn appointments(api: &ApiClient, limit: Option<u32>) -> Result<()> {
    require_session(api)?;
    let appointments = api
        .fetch_appointments(limit)
        .await
        .context("Failed to fetch appointments")?;
    if appointments.is_empty() {
        println!("No appointments found");
    }
    for appt in &appointments {
        println!(
            "{:<24}  {:<24}  {:<12}  {:<8}  {:<10}  {}",
            truncate_string(&appt.appointment_id, 24),
            truncate_string(&appt.patient_name, 24),
            appt.date.as_deref().map(format_date).unwrap_or_default(),
            appt.time.as_deref().unwrap_or(""),
            appt.status,
            truncate_string(appt.notes_display(), 40)
        );
    }
    Ok(())
}

async fn revenue(api: &ApiClient) -> Result<()> {
    require_session(api)?;
    let appointments = api
        .fetch_appointments(None)
        .await
        .context("Failed to load revenue data")?;

    for appt in appointments.iter().filter(|a| a.is_billable()) {
        println!(
            "{:<24}  {:<12}  {:<8}  {:<7}  {}",
            truncate_string(&appt.patient_name, 24),
            appt.date.as_deref().map(format_date).unwrap_or_default(),
            appt.time.as_deref().unwrap_or(""),
            if appt.is_paid() { "Paid" } else { "Pending" },
            appt.payment_method.as_deref().unwrap_or("Cash")
        );
    }

    let summary = RevenueSummary::from_appointments(&appointments);
    println!();
    println!("Transactions:  {}", summary.transactions);
    println!("Total:         {}", format_dollars(summary.total as f64));
    println!("Paid:          {}", format_dollars(summary.paid as f64));
    println!("Pending:       {}", format_dollars(summary.pending as f64));
    Ok(())
}
