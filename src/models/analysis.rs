//! Analysis result models
//!
//! A completed analysis job yields one `AnalysisResult` per food entry: the
//! ingredient list and the per-substance breakdown the remote analyzer
//! extracted. Results are written once and never mutated.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::MealType;

/// Category of a tracked substance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstanceCategory {
    Macronutrient,
    Micronutrient,
    Calorie,
    Harmful,
    Unknown,
}

impl SubstanceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubstanceCategory::Macronutrient => "macronutrient",
            SubstanceCategory::Micronutrient => "micronutrient",
            SubstanceCategory::Calorie => "calorie",
            SubstanceCategory::Harmful => "harmful",
            SubstanceCategory::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "macronutrient" => Some(SubstanceCategory::Macronutrient),
            "micronutrient" => Some(SubstanceCategory::Micronutrient),
            "calorie" | "calories" => Some(SubstanceCategory::Calorie),
            "harmful" => Some(SubstanceCategory::Harmful),
            "unknown" => Some(SubstanceCategory::Unknown),
            _ => None,
        }
    }

    /// True for substances where consuming more is generally beneficial
    pub fn is_beneficial(&self) -> bool {
        matches!(
            self,
            SubstanceCategory::Macronutrient | SubstanceCategory::Micronutrient
        )
    }

    /// Fixed display order used when sorting comparison output
    pub fn display_order(&self) -> u8 {
        match self {
            SubstanceCategory::Macronutrient => 0,
            SubstanceCategory::Micronutrient => 1,
            SubstanceCategory::Calorie => 2,
            SubstanceCategory::Harmful => 3,
            SubstanceCategory::Unknown => 4,
        }
    }
}

/// A single substance measurement extracted from a food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemicalSubstance {
    pub name: String,
    pub category: SubstanceCategory,
    /// Numeric amount, unit-less until compared against a reference value
    pub amount: f64,
    pub unit: String,
    pub meal_type: Option<MealType>,
    /// Analyzer-provided daily standard for an average adult, when present
    pub standard_consumption: Option<f64>,
}

/// A completed per-food analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    pub food_entry_id: i64,
    pub day_id: i64,
    pub food_name: String,
    pub ingredients: Vec<String>,
    pub substances: Vec<ChemicalSubstance>,
    pub analyzed_at: String,
}

/// Data for persisting a completed analysis
#[derive(Debug, Clone)]
pub struct AnalysisResultCreate {
    pub food_entry_id: i64,
    pub day_id: i64,
    pub food_name: String,
    pub ingredients: Vec<String>,
    pub substances: Vec<ChemicalSubstance>,
}

impl AnalysisResult {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let ingredients_json: String = row.get("ingredients")?;
        let ingredients = serde_json::from_str(&ingredients_json).unwrap_or_default();

        Ok(Self {
            id: row.get("id")?,
            food_entry_id: row.get("food_entry_id")?,
            day_id: row.get("day_id")?,
            food_name: row.get("food_name")?,
            ingredients,
            substances: Vec::new(),
            analyzed_at: row.get("analyzed_at")?,
        })
    }

    fn substance_from_row(row: &Row) -> rusqlite::Result<ChemicalSubstance> {
        let category: String = row.get("category")?;
        let meal_type: Option<String> = row.get("meal_type")?;

        Ok(ChemicalSubstance {
            name: row.get("name")?,
            category: SubstanceCategory::from_str(&category).unwrap_or(SubstanceCategory::Unknown),
            amount: row.get("amount")?,
            unit: row.get("unit")?,
            meal_type: meal_type.as_deref().and_then(MealType::from_str),
            standard_consumption: row.get("standard_consumption")?,
        })
    }

    fn load_substances(conn: &Connection, analysis_id: i64) -> DbResult<Vec<ChemicalSubstance>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM analysis_substances WHERE analysis_id = ?1 ORDER BY id ASC",
        )?;

        let substances = stmt
            .query_map([analysis_id], Self::substance_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(substances)
    }

    /// Persist a completed analysis together with its substances
    pub fn create(conn: &Connection, data: &AnalysisResultCreate) -> DbResult<Self> {
        let ingredients_json =
            serde_json::to_string(&data.ingredients).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            r#"
            INSERT INTO analysis_results (food_entry_id, day_id, food_name, ingredients)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.food_entry_id, data.day_id, data.food_name, ingredients_json],
        )?;

        let id = conn.last_insert_rowid();

        for substance in &data.substances {
            conn.execute(
                r#"
                INSERT INTO analysis_substances
                    (analysis_id, name, category, amount, unit, meal_type, standard_consumption)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    id,
                    substance.name,
                    substance.category.as_str(),
                    substance.amount,
                    substance.unit,
                    substance.meal_type.map(|m| m.as_str()),
                    substance.standard_consumption,
                ],
            )?;
        }

        Self::get_by_id(conn, id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get an analysis result by ID, substances included
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM analysis_results WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(mut analysis) => {
                analysis.substances = Self::load_substances(conn, analysis.id)?;
                Ok(Some(analysis))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List the analysis results of a day, substances included
    pub fn list_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM analysis_results WHERE day_id = ?1 ORDER BY id ASC")?;

        let mut results = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for analysis in &mut results {
            analysis.substances = Self::load_substances(conn, analysis.id)?;
        }

        Ok(results)
    }
}
