//! Utility to log a food entry for a day

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use nutrilog::db::migrations;
use nutrilog::models::{Day, FoodEntry, FoodEntryCreate, MealType, Week};

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
            std::fs::create_dir_all(&path).ok();
            path.push("nutrilog.db");
            path
        })
}

/// Monday of the week containing the given date
fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("Usage: log_food <date> <meal> <name> [portion] [quantity] [unit]");
        std::process::exit(2);
    }

    let date = NaiveDate::parse_from_str(&args[0], "%Y-%m-%d")?;
    let meal_type = MealType::from_str(&args[1])
        .ok_or("meal must be breakfast, lunch, dinner or snack")?;
    let name = args[2].clone();
    let portion = args.get(3).cloned().unwrap_or_default();
    let quantity: f64 = args.get(4).map(|q| q.parse()).transpose()?.unwrap_or(1.0);
    let unit = args.get(5).cloned().unwrap_or_else(|| "serving".to_string());

    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    let database = nutrilog::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        Ok(())
    })?;

    database.with_conn(|conn| {
        let week = Week::get_or_create(conn, &week_start(date).to_string())?;
        let day = Day::get_or_create(conn, week.id, &date.to_string())?;
        let entry = FoodEntry::create(
            conn,
            &FoodEntryCreate {
                day_id: day.id,
                name,
                meal_type,
                portion,
                quantity,
                unit,
            },
        )?;
        println!("Logged entry {} for {}", entry.id, day.date);

        let entries = FoodEntry::list_for_day(conn, day.id)?;
        println!("Entries for {}:", day.date);
        for e in &entries {
            println!("  [{}] {} {}", e.meal_type.as_str(), e.name, e.portion);
        }
        Ok(())
    })?;

    Ok(())
}
