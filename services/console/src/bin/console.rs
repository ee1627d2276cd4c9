//! services/console/src/bin/console.rs
//!
//! Smoke binary: wires the REST adapter, file vault, and stores together,
//! restores or establishes a session, and prints the collections the
//! current role can see.

use std::sync::Arc;

use console_lib::{
    adapters::{rest::RestClient, vault::FileVault},
    config::Config,
    error::ConsoleError,
    stores::{ClassStore, ReportsStore, SchoolStore, SessionStore, StudentStore, TeacherStore},
};
use school_console_core::domain::{LoginCredentials, Role};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Connecting to {}", config.api_base_url);

    // --- 2. Initialize Adapters ---
    let rest = Arc::new(RestClient::from_config(&config)?);
    let vault = Arc::new(FileVault::new(config.session_file.clone()));

    // --- 3. Build the Stores ---
    let session = Arc::new(SessionStore::new(rest.clone(), vault));
    session.restore();

    if !session.is_authenticated() {
        let (email, password) = match (&config.login_email, &config.login_password) {
            (Some(email), Some(password)) => (email.clone(), password.clone()),
            _ => {
                warn!("No persisted session and CONSOLE_EMAIL/CONSOLE_PASSWORD not set; nothing to do");
                return Ok(());
            }
        };
        session
            .login(&LoginCredentials { email, password })
            .await?;
    }
    info!(
        role = %session.role().map(|r| r.to_string()).unwrap_or_default(),
        school = %session.school_name().unwrap_or_default(),
        "session ready"
    );

    // --- 4. Fetch What the Role Can See ---
    let reports = ReportsStore::new(rest.clone(), session.clone());
    if let Err(err) = reports.refresh_summary().await {
        warn!(error = %err, "summary unavailable");
    } else if let Some(summary) = reports.summary() {
        info!(
            schools = summary.schools,
            classes = summary.classes,
            students = summary.students,
            teachers = summary.teachers,
            "dashboard summary"
        );
    }

    if session.has_role(Role::Oversight) {
        let schools = SchoolStore::new(rest.clone(), session.clone());
        schools.refresh().await?;
        info!(count = schools.school_count(), "schools fetched");
    } else {
        let classes = ClassStore::new(rest.clone(), session.clone());
        let students = StudentStore::new(rest.clone(), session.clone());
        let teachers = TeacherStore::new(rest.clone(), session.clone());
        classes.refresh().await?;
        students.refresh().await?;
        teachers.refresh().await?;
        info!(
            classes = classes.len(),
            students = students.len(),
            teachers = teachers.len(),
            grades = ?classes.unique_grades(),
            "school collections fetched"
        );
    }

    Ok(())
}
