//! Database migrations
//!
//! Schema creation and migration logic. Reference data (substance categories
//! and reference bands) is seeded here so a fresh database can classify the
//! common substances out of the box.

use rusqlite::Connection;

use super::connection::DbResult;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- WEEKS / DAYS
        -- Tracking periods; a week holds up to 7 days
        -- ============================================
        CREATE TABLE weeks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date TEXT NOT NULL UNIQUE,     -- ISO date of first day
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE days (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_id INTEGER NOT NULL REFERENCES weeks(id) ON DELETE CASCADE,
            date TEXT NOT NULL UNIQUE,           -- ISO date
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_days_week ON days(week_id);

        -- ============================================
        -- FOOD ENTRIES
        -- User-logged foods, immutable once saved
        -- ============================================
        CREATE TABLE food_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            day_id INTEGER NOT NULL REFERENCES days(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast','lunch','dinner','snack')),
            portion TEXT NOT NULL DEFAULT '',
            quantity REAL NOT NULL DEFAULT 1,
            unit TEXT NOT NULL DEFAULT 'serving',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_entries_day ON food_entries(day_id);

        -- ============================================
        -- ANALYSIS RESULTS
        -- One row per completed remote analysis of a food entry
        -- ============================================
        CREATE TABLE analysis_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_entry_id INTEGER NOT NULL REFERENCES food_entries(id) ON DELETE CASCADE,
            day_id INTEGER NOT NULL REFERENCES days(id) ON DELETE CASCADE,
            food_name TEXT NOT NULL,
            ingredients TEXT NOT NULL DEFAULT '[]',   -- JSON array of names
            analyzed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_analysis_results_day ON analysis_results(day_id);

        CREATE TABLE analysis_substances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_id INTEGER NOT NULL REFERENCES analysis_results(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'unknown',
            amount REAL NOT NULL,
            unit TEXT NOT NULL DEFAULT 'g',
            meal_type TEXT,
            standard_consumption REAL
        );

        CREATE INDEX idx_analysis_substances_analysis ON analysis_substances(analysis_id);

        -- ============================================
        -- REFERENCE DATA
        -- Externally seeded, read-only to the engine
        -- ============================================
        CREATE TABLE substance_categories (
            substance_name TEXT PRIMARY KEY,      -- canonical key
            category TEXT NOT NULL CHECK(category IN
                ('macronutrient','micronutrient','calorie','harmful','unknown')),
            default_unit TEXT NOT NULL DEFAULT 'g'
        );

        CREATE TABLE reference_values (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            substance_name TEXT NOT NULL,
            age_group TEXT NOT NULL,
            gender TEXT NOT NULL CHECK(gender IN ('male','female','all')),
            ref_type TEXT NOT NULL CHECK(ref_type IN
                ('recommended','minimum','maximum','upper_limit')),
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#4CAF50',
            label TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX idx_reference_values_lookup
            ON reference_values(substance_name, age_group, gender);

        -- ============================================
        -- SEED: substance categories
        -- ============================================
        INSERT INTO substance_categories (substance_name, category, default_unit) VALUES
            ('calories', 'calorie', 'kcal'),
            ('protein', 'macronutrient', 'g'),
            ('carbs', 'macronutrient', 'g'),
            ('fat', 'macronutrient', 'g'),
            ('fiber', 'macronutrient', 'g'),
            ('vitamin-c', 'micronutrient', 'mg'),
            ('vitamin-d', 'micronutrient', 'mcg'),
            ('calcium', 'micronutrient', 'mg'),
            ('iron', 'micronutrient', 'mg'),
            ('potassium', 'micronutrient', 'mg'),
            ('sodium', 'harmful', 'mg'),
            ('sugar', 'harmful', 'g'),
            ('saturated-fat', 'harmful', 'g'),
            ('cholesterol', 'harmful', 'mg'),
            ('trans-fat', 'harmful', 'g');

        -- ============================================
        -- SEED: reference values (adult 19-30, unisex baseline)
        -- ============================================
        INSERT INTO reference_values
            (substance_name, age_group, gender, ref_type, value, unit, color, label) VALUES
            ('calories', '19-30', 'all', 'recommended', 2000, 'kcal', '#4CAF50', 'Recommended'),
            ('protein', '19-30', 'all', 'recommended', 50, 'g', '#4CAF50', 'Recommended'),
            ('protein', '19-30', 'all', 'minimum', 35, 'g', '#FF9800', 'Minimum'),
            ('carbs', '19-30', 'all', 'recommended', 300, 'g', '#4CAF50', 'Recommended'),
            ('fat', '19-30', 'all', 'recommended', 65, 'g', '#4CAF50', 'Recommended'),
            ('fat', '19-30', 'all', 'maximum', 90, 'g', '#F44336', 'Maximum'),
            ('fiber', '19-30', 'all', 'recommended', 28, 'g', '#4CAF50', 'Recommended'),
            ('vitamin-c', '19-30', 'all', 'recommended', 90, 'mg', '#4CAF50', 'Recommended'),
            ('vitamin-c', '19-30', 'all', 'upper_limit', 2000, 'mg', '#F44336', 'Upper limit'),
            ('vitamin-d', '19-30', 'all', 'recommended', 15, 'mcg', '#4CAF50', 'Recommended'),
            ('calcium', '19-30', 'all', 'recommended', 1000, 'mg', '#4CAF50', 'Recommended'),
            ('calcium', '19-30', 'all', 'upper_limit', 2500, 'mg', '#F44336', 'Upper limit'),
            ('iron', '19-30', 'male', 'recommended', 8, 'mg', '#4CAF50', 'Recommended'),
            ('iron', '19-30', 'female', 'recommended', 18, 'mg', '#4CAF50', 'Recommended'),
            ('potassium', '19-30', 'all', 'recommended', 3400, 'mg', '#4CAF50', 'Recommended'),
            ('sodium', '19-30', 'all', 'upper_limit', 2300, 'mg', '#F44336', 'Upper limit'),
            ('sugar', '19-30', 'all', 'maximum', 50, 'g', '#F44336', 'Maximum'),
            ('saturated-fat', '19-30', 'all', 'upper_limit', 20, 'g', '#F44336', 'Upper limit'),
            ('cholesterol', '19-30', 'all', 'upper_limit', 300, 'mg', '#F44336', 'Upper limit');
        "#,
    )?;

    Ok(())
}
