//! Utility to print the weekly report for a given week

use std::path::PathBuf;

use nutrilog::db::{migrations, SqliteStore};
use nutrilog::models::Gender;
use nutrilog::report::ReportAssembler;

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

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    let database = nutrilog::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let age_group =
        std::env::var("NUTRILOG_AGE_GROUP").unwrap_or_else(|_| "19-30".to_string());
    let gender = std::env::var("NUTRILOG_GENDER")
        .ok()
        .and_then(|s| Gender::from_str(&s))
        .unwrap_or(Gender::All);

    let assembler = ReportAssembler::new(SqliteStore::new(database), age_group, gender);

    // Explicit week id, or the most recent available week
    let week_id = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<i64>()?,
        None => match assembler.get_available_weeks().last() {
            Some(week) => week.id,
            None => {
                eprintln!("No week with 7 tracked days yet.");
                return Ok(());
            }
        },
    };

    let trend = assembler.generate_weekly_trend(week_id)?;
    println!("{}", serde_json::to_string_pretty(&trend)?);

    Ok(())
}
