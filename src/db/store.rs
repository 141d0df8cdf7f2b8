//! Read-only persistence contract for the engine
//!
//! The aggregation and report code never touches SQL directly; it consumes
//! this trait. `SqliteStore` is the production implementation backed by the
//! connection pool, tests supply in-memory fakes.

use crate::models::{AnalysisResult, Day, Gender, ReferenceValue, SubstanceInfo, Week};

use super::connection::{Database, DbResult};

/// Read-only access to weeks, days, analyses and reference data
pub trait NutritionStore {
    fn get_week(&self, week_id: i64) -> DbResult<Option<Week>>;
    fn get_all_weeks(&self) -> DbResult<Vec<Week>>;
    fn get_days_for_week(&self, week_id: i64) -> DbResult<Vec<Day>>;
    fn get_analysis_for_day(&self, day_id: i64) -> DbResult<Vec<AnalysisResult>>;
    fn get_substances_with_categories(&self) -> DbResult<Vec<SubstanceInfo>>;
    fn get_reference_values(
        &self,
        substance: &str,
        age_group: &str,
        gender: Gender,
    ) -> DbResult<Vec<ReferenceValue>>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl NutritionStore for SqliteStore {
    fn get_week(&self, week_id: i64) -> DbResult<Option<Week>> {
        self.db.with_conn(|conn| Week::get_by_id(conn, week_id))
    }

    fn get_all_weeks(&self) -> DbResult<Vec<Week>> {
        self.db.with_conn(Week::list_all)
    }

    fn get_days_for_week(&self, week_id: i64) -> DbResult<Vec<Day>> {
        self.db.with_conn(|conn| Day::list_for_week(conn, week_id))
    }

    fn get_analysis_for_day(&self, day_id: i64) -> DbResult<Vec<AnalysisResult>> {
        self.db
            .with_conn(|conn| AnalysisResult::list_for_day(conn, day_id))
    }

    fn get_substances_with_categories(&self) -> DbResult<Vec<SubstanceInfo>> {
        self.db.with_conn(SubstanceInfo::list_all)
    }

    fn get_reference_values(
        &self,
        substance: &str,
        age_group: &str,
        gender: Gender,
    ) -> DbResult<Vec<ReferenceValue>> {
        self.db.with_conn(|conn| {
            ReferenceValue::list_for_substance(conn, substance, age_group, gender)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{
        AnalysisResultCreate, ChemicalSubstance, FoodEntry, FoodEntryCreate, MealType,
        ReferenceType, SubstanceCategory,
    };

    fn test_store() -> SqliteStore {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        SqliteStore::new(db)
    }

    #[test]
    fn test_week_day_analysis_roundtrip() {
        let store = test_store();
        let db = store.database().clone();

        let (week_id, day_id) = db
            .with_conn(|conn| {
                let week = Week::create(conn, "2025-01-06")?;
                let day = Day::create(conn, week.id, "2025-01-06")?;
                let entry = FoodEntry::create(
                    conn,
                    &FoodEntryCreate {
                        day_id: day.id,
                        name: "Oatmeal".to_string(),
                        meal_type: MealType::Breakfast,
                        portion: "1 bowl".to_string(),
                        quantity: 1.0,
                        unit: "serving".to_string(),
                    },
                )?;
                AnalysisResult::create(
                    conn,
                    &AnalysisResultCreate {
                        food_entry_id: entry.id,
                        day_id: day.id,
                        food_name: "Oatmeal".to_string(),
                        ingredients: vec!["oats".to_string(), "water".to_string()],
                        substances: vec![ChemicalSubstance {
                            name: "protein".to_string(),
                            category: SubstanceCategory::Macronutrient,
                            amount: 6.0,
                            unit: "g".to_string(),
                            meal_type: Some(MealType::Breakfast),
                            standard_consumption: Some(50.0),
                        }],
                    },
                )?;
                Ok((week.id, day.id))
            })
            .unwrap();

        let weeks = store.get_all_weeks().unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].id, week_id);

        let days = store.get_days_for_week(week_id).unwrap();
        assert_eq!(days.len(), 1);

        let analyses = store.get_analysis_for_day(day_id).unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].ingredients.len(), 2);
        assert_eq!(analyses[0].substances.len(), 1);
        assert_eq!(analyses[0].substances[0].name, "protein");
    }

    #[test]
    fn test_seeded_reference_data() {
        let store = test_store();

        let infos = store.get_substances_with_categories().unwrap();
        assert!(infos.iter().any(|i| i.substance_name == "protein"
            && i.category == SubstanceCategory::Macronutrient));
        assert!(infos
            .iter()
            .any(|i| i.substance_name == "sodium" && i.category == SubstanceCategory::Harmful));

        let refs = store
            .get_reference_values("protein", "19-30", Gender::All)
            .unwrap();
        let rda = refs
            .iter()
            .find(|r| r.ref_type == ReferenceType::Recommended)
            .unwrap();
        assert_eq!(rda.value, 50.0);
    }

    #[test]
    fn test_gender_specific_reference_fallback() {
        let store = test_store();

        // iron has male/female rows, no 'all' row
        let refs = store
            .get_reference_values("iron", "19-30", Gender::Female)
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].value, 18.0);

        // sodium has only an 'all' row, visible to any gender
        let refs = store
            .get_reference_values("sodium", "19-30", Gender::Male)
            .unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].ref_type, ReferenceType::UpperLimit);
    }

    #[test]
    fn test_unanalyzed_entries() {
        let store = test_store();
        let db = store.database().clone();

        db.with_conn(|conn| {
            let week = Week::create(conn, "2025-01-06")?;
            let day = Day::create(conn, week.id, "2025-01-07")?;
            let analyzed = FoodEntry::create(
                conn,
                &FoodEntryCreate {
                    day_id: day.id,
                    name: "Salad".to_string(),
                    meal_type: MealType::Lunch,
                    portion: String::new(),
                    quantity: 1.0,
                    unit: "serving".to_string(),
                },
            )?;
            FoodEntry::create(
                conn,
                &FoodEntryCreate {
                    day_id: day.id,
                    name: "Soup".to_string(),
                    meal_type: MealType::Dinner,
                    portion: String::new(),
                    quantity: 1.0,
                    unit: "serving".to_string(),
                },
            )?;
            AnalysisResult::create(
                conn,
                &AnalysisResultCreate {
                    food_entry_id: analyzed.id,
                    day_id: day.id,
                    food_name: "Salad".to_string(),
                    ingredients: vec![],
                    substances: vec![],
                },
            )?;

            let pending = FoodEntry::list_unanalyzed_for_day(conn, day.id)?;
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].name, "Soup");
            Ok(())
        })
        .unwrap();
    }
}
