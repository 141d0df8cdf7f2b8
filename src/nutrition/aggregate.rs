//! Substance aggregation
//!
//! Sums substance amounts across analysis results, days and weeks, keyed by
//! canonical substance names.

use std::collections::BTreeMap;
use std::collections::HashMap;

use thiserror::Error;

use crate::models::{AnalysisResult, ChemicalSubstance, SubstanceCategory, SubstanceInfo};

use super::normalize::normalize;

/// Aggregation failure on malformed analyzer payloads
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Malformed substance payload: {0}")]
    Malformed(String),
}

/// Per-day consumption maps plus the week total.
///
/// The total is built by summing the per-day maps, so
/// `total[s] == sum over days of per_day[day][s]` holds by construction.
#[derive(Debug, Clone, Default)]
pub struct DayAggregates {
    /// Day date -> canonical substance -> summed amount
    pub per_day: BTreeMap<String, BTreeMap<String, f64>>,
    /// Canonical substance -> summed amount over all days
    pub total: BTreeMap<String, f64>,
}

/// Aggregates substance amounts under canonical keys
#[derive(Debug, Clone, Default)]
pub struct SubstanceAggregator {
    categories: HashMap<String, SubstanceCategory>,
}

impl SubstanceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an aggregator that can categorize substances from the
    /// reference store's category table.
    pub fn with_categories(infos: &[SubstanceInfo]) -> Self {
        let categories = infos
            .iter()
            .map(|info| (normalize(&info.substance_name), info.category))
            .collect();
        Self { categories }
    }

    /// Category for a canonical key. Substances missing from the table are
    /// carried as `Unknown`, never dropped.
    pub fn category_of(&self, canonical_key: &str) -> SubstanceCategory {
        self.categories
            .get(canonical_key)
            .copied()
            .unwrap_or(SubstanceCategory::Unknown)
    }

    /// Sum amounts per canonical substance across every substance of every
    /// result, irrespective of meal type. Empty input yields an empty map.
    pub fn aggregate(
        &self,
        results: &[AnalysisResult],
    ) -> Result<BTreeMap<String, f64>, AggregationError> {
        let mut totals = BTreeMap::new();

        for result in results {
            for substance in &result.substances {
                validate(substance)?;
                let key = normalize(&substance.name);
                *totals.entry(key).or_insert(0.0) += substance.amount;
            }
        }

        Ok(totals)
    }

    /// Aggregate per day and roll the days into a week total.
    pub fn aggregate_by_day(
        &self,
        per_day_results: &[(String, Vec<AnalysisResult>)],
    ) -> Result<DayAggregates, AggregationError> {
        let mut aggregates = DayAggregates::default();

        for (date, results) in per_day_results {
            let day_totals = self.aggregate(results)?;
            for (key, amount) in &day_totals {
                *aggregates.total.entry(key.clone()).or_insert(0.0) += amount;
            }
            aggregates.per_day.insert(date.clone(), day_totals);
        }

        Ok(aggregates)
    }
}

fn validate(substance: &ChemicalSubstance) -> Result<(), AggregationError> {
    if substance.name.trim().is_empty() {
        return Err(AggregationError::Malformed(
            "substance with empty name".to_string(),
        ));
    }
    if !substance.amount.is_finite() {
        return Err(AggregationError::Malformed(format!(
            "non-finite amount for '{}'",
            substance.name
        )));
    }
    if substance.amount < 0.0 {
        return Err(AggregationError::Malformed(format!(
            "negative amount {} for '{}'",
            substance.amount, substance.name
        )));
    }
    Ok(())
}
