//! Week model
//!
//! A 7-day tracking period anchored at its start date.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A tracking week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Week {
    pub id: i64,
    /// ISO date of the week's first day: "2025-01-06"
    pub start_date: String,
    pub created_at: String,
}

impl Week {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            start_date: row.get("start_date")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new week
    pub fn create(conn: &Connection, start_date: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO weeks (start_date) VALUES (?1)",
            params![start_date],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a week by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weeks WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(week) => Ok(Some(week)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a week by its start date
    pub fn get_by_start_date(conn: &Connection, start_date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weeks WHERE start_date = ?1")?;

        let result = stmt.query_row([start_date], Self::from_row);
        match result {
            Ok(week) => Ok(Some(week)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get or create a week by start date
    pub fn get_or_create(conn: &Connection, start_date: &str) -> DbResult<Self> {
        if let Some(week) = Self::get_by_start_date(conn, start_date)? {
            return Ok(week);
        }
        Self::create(conn, start_date)
    }

    /// List every week in creation order
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weeks ORDER BY id ASC")?;

        let weeks = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(weeks)
    }
}
