//! Day model
//!
//! A tracked day within a week. Aggregated consumption is derived on demand,
//! never cached here.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A day container for food entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub id: i64,
    pub week_id: i64,
    /// ISO date: "2025-01-09"
    pub date: String,
    pub created_at: String,
}

impl Day {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            week_id: row.get("week_id")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new day in a week
    pub fn create(conn: &Connection, week_id: i64, date: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO days (week_id, date) VALUES (?1, ?2)",
            params![week_id, date],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a day by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM days WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(day) => Ok(Some(day)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a day by date
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM days WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(day) => Ok(Some(day)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get or create a day by date within a week
    pub fn get_or_create(conn: &Connection, week_id: i64, date: &str) -> DbResult<Self> {
        if let Some(day) = Self::get_by_date(conn, date)? {
            return Ok(day);
        }
        Self::create(conn, week_id, date)
    }

    /// List the days of a week, oldest first
    pub fn list_for_week(conn: &Connection, week_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM days WHERE week_id = ?1 ORDER BY date ASC")?;

        let days = stmt
            .query_map([week_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(days)
    }
}
