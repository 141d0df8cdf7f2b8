//! Data models
//!
//! Rust structs representing database entities.

mod analysis;
mod day;
mod food_entry;
mod reference;
mod week;

pub use analysis::{AnalysisResult, AnalysisResultCreate, ChemicalSubstance, SubstanceCategory};
pub use day::Day;
pub use food_entry::{FoodEntry, FoodEntryCreate, MealType};
pub use reference::{Gender, ReferenceType, ReferenceValue, SubstanceInfo};
pub use week::Week;
