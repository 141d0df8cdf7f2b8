//! Food entry model
//!
//! A single food the user logged for a day. Immutable once saved; analysis
//! results reference entries by id.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Meal slot a food entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    pub day_id: i64,
    pub name: String,
    pub meal_type: MealType,
    /// Free-form portion descriptor, e.g. "1 bowl"
    pub portion: String,
    pub quantity: f64,
    pub unit: String,
    pub created_at: String,
}

/// Data for creating a food entry
#[derive(Debug, Clone)]
pub struct FoodEntryCreate {
    pub day_id: i64,
    pub name: String,
    pub meal_type: MealType,
    pub portion: String,
    pub quantity: f64,
    pub unit: String,
}

impl FoodEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        Ok(Self {
            id: row.get("id")?,
            day_id: row.get("day_id")?,
            name: row.get("name")?,
            meal_type: MealType::from_str(&meal_type).unwrap_or(MealType::Snack),
            portion: row.get("portion")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new food entry
    pub fn create(conn: &Connection, data: &FoodEntryCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_entries (day_id, name, meal_type, portion, quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.day_id,
                data.name,
                data.meal_type.as_str(),
                data.portion,
                data.quantity,
                data.unit,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a food entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List the food entries of a day in logged order
    pub fn list_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM food_entries WHERE day_id = ?1 ORDER BY id ASC")?;

        let entries = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// List food entries of a day that have no analysis result yet
    pub fn list_unanalyzed_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT fe.* FROM food_entries fe
            LEFT JOIN analysis_results ar ON ar.food_entry_id = fe.id
            WHERE fe.day_id = ?1 AND ar.id IS NULL
            ORDER BY fe.id ASC
            "#,
        )?;

        let entries = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
