//! Nutrilog
//!
//! Runs the analysis pipeline: submits any unanalyzed food entries to the
//! remote analyzer, persists the results, then prints the weekly report for
//! the most recent fully tracked week as JSON on stdout.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use nutrilog::analysis::{HttpAnalysisClient, JobOrchestrator};
use nutrilog::db::{migrations, Database, SqliteStore};
use nutrilog::models::{AnalysisResult, Day, FoodEntry, Gender, Week};
use nutrilog::report::ReportAssembler;
use nutrilog::{build_info, db};

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("NUTRILOG_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("nutrilog.db");
            path
        })
}

fn get_api_url() -> String {
    std::env::var("NUTRILOG_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn get_age_group() -> String {
    std::env::var("NUTRILOG_AGE_GROUP").unwrap_or_else(|_| "19-30".to_string())
}

fn get_gender() -> Gender {
    std::env::var("NUTRILOG_GENDER")
        .ok()
        .and_then(|s| Gender::from_str(&s))
        .unwrap_or(Gender::All)
}

/// Submit every unanalyzed food entry, day by day, and persist the results
async fn run_pending_analyses(
    database: &Database,
    orchestrator: &JobOrchestrator<HttpAnalysisClient>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut analyzed = 0;

    let weeks = database.with_conn(Week::list_all)?;
    for week in weeks {
        let days = database.with_conn(|conn| Day::list_for_week(conn, week.id))?;
        for day in days {
            let pending =
                database.with_conn(|conn| FoodEntry::list_unanalyzed_for_day(conn, day.id))?;
            if pending.is_empty() {
                continue;
            }

            eprintln!("Analyzing {} foods for {}...", pending.len(), day.date);
            let rows = orchestrator.analyze(&pending).await?;

            database.with_conn(|conn| {
                for row in &rows {
                    AnalysisResult::create(conn, row)?;
                }
                Ok(())
            })?;
            analyzed += rows.len();
        }
    }

    Ok(analyzed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (stderr; stdout carries the report JSON)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutrilog=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        let version = migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let api_url = get_api_url();
    eprintln!("Analysis API: {}", api_url);
    let orchestrator = JobOrchestrator::new(HttpAnalysisClient::new(api_url));

    let analyzed = run_pending_analyses(&database, &orchestrator).await?;
    if analyzed > 0 {
        eprintln!("Analyzed {} food entries", analyzed);
    }

    let store = SqliteStore::new(database);
    let assembler = ReportAssembler::new(store, get_age_group(), get_gender());

    let available = assembler.get_available_weeks();
    match available.last() {
        Some(week) => {
            let trend = assembler.generate_weekly_trend(week.id)?;
            println!("{}", serde_json::to_string_pretty(&trend)?);
        }
        None => {
            eprintln!("No week with 7 tracked days yet; nothing to report.");
        }
    }

    Ok(())
}
