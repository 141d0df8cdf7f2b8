//! Reference value model
//!
//! Externally seeded targets and limits per substance, scoped by age group
//! and gender. Read-only to the engine.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::SubstanceCategory;

/// Kind of reference threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Recommended,
    Minimum,
    Maximum,
    UpperLimit,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Recommended => "recommended",
            ReferenceType::Minimum => "minimum",
            ReferenceType::Maximum => "maximum",
            ReferenceType::UpperLimit => "upper_limit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "recommended" => Some(ReferenceType::Recommended),
            "minimum" => Some(ReferenceType::Minimum),
            "maximum" => Some(ReferenceType::Maximum),
            "upper_limit" => Some(ReferenceType::UpperLimit),
            _ => None,
        }
    }
}

/// Gender scope of a reference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    All,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "all" => Some(Gender::All),
            _ => None,
        }
    }
}

/// A single reference threshold for a substance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    pub substance_name: String,
    pub age_group: String,
    pub gender: Gender,
    pub ref_type: ReferenceType,
    pub value: f64,
    pub unit: String,
    /// Display color for the band this threshold opens
    pub color: String,
    pub label: String,
}

/// Substance category lookup row from the reference store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstanceInfo {
    pub substance_name: String,
    pub category: SubstanceCategory,
    pub default_unit: String,
}

impl ReferenceValue {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender: String = row.get("gender")?;
        let ref_type: String = row.get("ref_type")?;

        Ok(Self {
            substance_name: row.get("substance_name")?,
            age_group: row.get("age_group")?,
            gender: Gender::from_str(&gender).unwrap_or(Gender::All),
            ref_type: ReferenceType::from_str(&ref_type).unwrap_or(ReferenceType::Recommended),
            value: row.get("value")?,
            unit: row.get("unit")?,
            color: row.get("color")?,
            label: row.get("label")?,
        })
    }

    /// Fetch the reference values for a substance, scoped by age group and
    /// gender. Gender-specific rows fall back to "all" rows.
    pub fn list_for_substance(
        conn: &Connection,
        substance: &str,
        age_group: &str,
        gender: Gender,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM reference_values
            WHERE substance_name = ?1
              AND age_group = ?2
              AND gender IN (?3, 'all')
            ORDER BY value ASC
            "#,
        )?;

        let values = stmt
            .query_map(
                rusqlite::params![substance, age_group, gender.as_str()],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(values)
    }
}

impl SubstanceInfo {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;

        Ok(Self {
            substance_name: row.get("substance_name")?,
            category: SubstanceCategory::from_str(&category).unwrap_or(SubstanceCategory::Unknown),
            default_unit: row.get("default_unit")?,
        })
    }

    /// List every known substance with its category
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM substance_categories ORDER BY substance_name ASC")?;

        let infos = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(infos)
    }
}
