//! Weekly report assembly
//!
//! Pulls a week's analyzed data out of the store, runs it through
//! aggregation, comparison, scoring and trend analysis, and produces the
//! report object the presentation layer consumes. The assembler is a plain
//! struct constructed once at startup and passed by reference; it holds no
//! mutable state.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::db::NutritionStore;
use crate::models::{Day, Gender, ReferenceType, ReferenceValue, SubstanceCategory, Week};
use crate::nutrition::{
    compare_enhanced, compare_totals, consistency_score, daily_variation, display_name, normalize,
    score_simple, week_over_week, ComparisonData, DailyVariation, EnhancedComparisonData,
    NutritionScore, SubstanceAggregator, SubstanceReading, WeekMetrics, WeekOverWeek,
};

/// Report generation failures
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Week with ID {0} not found")]
    WeekNotFound(i64),

    #[error("Failed to generate weekly report: {0}")]
    Generation(String),
}

fn generation(err: impl std::fmt::Display) -> ReportError {
    ReportError::Generation(err.to_string())
}

/// One day's slice of the weekly report
#[derive(Debug, Clone, Serialize)]
pub struct DailyBreakdown {
    pub day: String,
    /// Canonical substance -> amount consumed that day
    pub consumption: BTreeMap<String, f64>,
    pub meal_count: usize,
    pub total_calories: f64,
}

/// Headline figures of the weekly report
#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub days_with_data: usize,
    pub total_days: usize,
    /// Top 3 beneficial substances by percentage of recommended
    pub top_nutrients: Vec<String>,
    pub nutrition_score: NutritionScore,
    pub recommendations: Vec<String>,
}

/// The full weekly report object
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub generated_at: String,
    pub week: Week,
    pub days: Vec<Day>,
    pub total_consumption: BTreeMap<String, f64>,
    pub weekly_recommended: BTreeMap<String, f64>,
    pub weekly_comparison: Vec<ComparisonData>,
    pub enhanced_comparison: Vec<EnhancedComparisonData>,
    pub daily_breakdown: Vec<DailyBreakdown>,
    pub summary: WeeklySummary,
}

/// Weekly report extended with trend metrics
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyTrendAnalysis {
    pub report: WeeklyReport,
    /// None when no prior tracked week exists
    pub week_over_week: Option<WeekOverWeek>,
    pub consistency_score: f64,
    pub daily_variation: Vec<DailyVariation>,
}

/// Facts observed about a substance while walking the week's analyses.
/// Used as fallbacks when the reference tables have no entry.
#[derive(Debug, Default)]
struct ObservedSubstance {
    unit: Option<String>,
    category: Option<SubstanceCategory>,
    standard_consumption: Option<f64>,
}

/// Assembles weekly reports from stored analysis data
pub struct ReportAssembler<S: NutritionStore> {
    store: S,
    age_group: String,
    gender: Gender,
}

impl<S: NutritionStore> ReportAssembler<S> {
    pub fn new(store: S, age_group: impl Into<String>, gender: Gender) -> Self {
        Self {
            store,
            age_group: age_group.into(),
            gender,
        }
    }

    /// Generate the report for one week.
    ///
    /// A missing week is its own error and is not wrapped; every other
    /// underlying failure surfaces as `ReportError::Generation`.
    pub fn generate_weekly_report(&self, week_id: i64) -> Result<WeeklyReport, ReportError> {
        let week = self
            .store
            .get_week(week_id)
            .map_err(generation)?
            .ok_or(ReportError::WeekNotFound(week_id))?;

        self.build_report(week)
    }

    fn build_report(&self, week: Week) -> Result<WeeklyReport, ReportError> {
        let mut days = self.store.get_days_for_week(week.id).map_err(generation)?;
        days.truncate(7);

        let infos = self
            .store
            .get_substances_with_categories()
            .map_err(generation)?;
        let aggregator = SubstanceAggregator::with_categories(&infos);
        let default_units: BTreeMap<String, String> = infos
            .iter()
            .map(|i| (normalize(&i.substance_name), i.default_unit.clone()))
            .collect();

        // Walk the week's analyses once, remembering analyzer-reported
        // facts as fallbacks for substances the reference tables miss.
        let mut per_day_results = Vec::with_capacity(days.len());
        let mut observed: BTreeMap<String, ObservedSubstance> = BTreeMap::new();
        for day in &days {
            let results = self.store.get_analysis_for_day(day.id).map_err(generation)?;
            for result in &results {
                for substance in &result.substances {
                    let entry = observed.entry(normalize(&substance.name)).or_default();
                    if entry.unit.is_none() && !substance.unit.is_empty() {
                        entry.unit = Some(substance.unit.clone());
                    }
                    if entry.category.is_none()
                        && substance.category != SubstanceCategory::Unknown
                    {
                        entry.category = Some(substance.category);
                    }
                    if entry.standard_consumption.is_none() {
                        entry.standard_consumption = substance.standard_consumption;
                    }
                }
            }
            per_day_results.push((day.date.clone(), results));
        }

        let aggregates = aggregator
            .aggregate_by_day(&per_day_results)
            .map_err(generation)?;

        // Daily recommended intake, fetched once over the substances
        // actually consumed; weekly is exactly daily * 7.
        let mut references: BTreeMap<String, Vec<ReferenceValue>> = BTreeMap::new();
        let mut weekly_recommended = BTreeMap::new();
        for substance in aggregates.total.keys() {
            let refs = self
                .store
                .get_reference_values(substance, &self.age_group, self.gender)
                .map_err(generation)?;

            let daily = refs
                .iter()
                .find(|r| r.ref_type == ReferenceType::Recommended)
                .map(|r| r.value)
                .or_else(|| {
                    observed
                        .get(substance)
                        .and_then(|o| o.standard_consumption)
                });
            if let Some(daily) = daily {
                weekly_recommended.insert(substance.clone(), daily * 7.0);
            }

            references.insert(substance.clone(), refs);
        }

        let weekly_comparison = compare_totals(&aggregates.total, &weekly_recommended);

        let category_of = |substance: &str| -> SubstanceCategory {
            let from_table = aggregator.category_of(substance);
            if from_table != SubstanceCategory::Unknown {
                return from_table;
            }
            observed
                .get(substance)
                .and_then(|o| o.category)
                .unwrap_or(SubstanceCategory::Unknown)
        };

        let categorized: Vec<(ComparisonData, SubstanceCategory)> = weekly_comparison
            .iter()
            .map(|c| (c.clone(), category_of(&c.substance)))
            .collect();
        let score = score_simple(&categorized);

        // Enhanced view compares weekly totals, so every reference
        // threshold scales by 7 as well.
        let readings: Vec<SubstanceReading> = aggregates
            .total
            .iter()
            .map(|(substance, &consumed)| {
                let refs = references
                    .get(substance)
                    .map(|refs| {
                        refs.iter()
                            .cloned()
                            .map(|mut r| {
                                r.value *= 7.0;
                                r
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let unit = observed
                    .get(substance)
                    .and_then(|o| o.unit.clone())
                    .or_else(|| default_units.get(substance).cloned())
                    .unwrap_or_else(|| "g".to_string());
                SubstanceReading {
                    substance: substance.clone(),
                    category: category_of(substance),
                    consumed,
                    unit,
                    references: refs,
                }
            })
            .collect();
        let enhanced_comparison = compare_enhanced(&readings);

        let daily_breakdown: Vec<DailyBreakdown> = days
            .iter()
            .zip(&per_day_results)
            .map(|(day, (_, results))| {
                let consumption = aggregates
                    .per_day
                    .get(&day.date)
                    .cloned()
                    .unwrap_or_default();
                let total_calories = consumption.get("calories").copied().unwrap_or(0.0);
                DailyBreakdown {
                    day: day.date.clone(),
                    consumption,
                    meal_count: results.len(),
                    total_calories,
                }
            })
            .collect();

        let days_with_data = per_day_results
            .iter()
            .filter(|(_, results)| !results.is_empty())
            .count();

        let mut beneficial: Vec<&ComparisonData> = categorized
            .iter()
            .filter(|(c, category)| category.is_beneficial() && c.recommended > 0.0)
            .map(|(c, _)| c)
            .collect();
        beneficial.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        let top_nutrients = beneficial
            .iter()
            .take(3)
            .map(|c| display_name(&c.substance))
            .collect();

        let summary = WeeklySummary {
            days_with_data,
            total_days: days.len(),
            top_nutrients,
            recommendations: score.recommendations.clone(),
            nutrition_score: score,
        };

        Ok(WeeklyReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            week,
            days,
            total_consumption: aggregates.total,
            weekly_recommended,
            weekly_comparison,
            enhanced_comparison,
            daily_breakdown,
            summary,
        })
    }

    /// True iff the week has a full 7 days of tracking. Feeds UI gating
    /// only, so persistence errors degrade to `false` instead of failing.
    pub fn is_weekly_report_available(&self, week_id: i64) -> bool {
        match self.store.get_days_for_week(week_id) {
            Ok(days) => days.len() >= 7,
            Err(e) => {
                warn!(week_id, error = %e, "availability check failed");
                false
            }
        }
    }

    /// Weeks with at least 7 tracked days, in original order. Any store
    /// error degrades the whole call to an empty list.
    pub fn get_available_weeks(&self) -> Vec<Week> {
        let weeks = match self.store.get_all_weeks() {
            Ok(weeks) => weeks,
            Err(e) => {
                warn!(error = %e, "listing weeks failed");
                return Vec::new();
            }
        };

        let mut available = Vec::new();
        for week in weeks {
            match self.store.get_days_for_week(week.id) {
                Ok(days) if days.len() >= 7 => available.push(week),
                Ok(_) => {}
                Err(e) => {
                    warn!(week_id = week.id, error = %e, "listing days failed");
                    return Vec::new();
                }
            }
        }
        available
    }

    /// Generate the weekly report extended with trend metrics against the
    /// chronologically previous available week, when one exists.
    pub fn generate_weekly_trend(&self, week_id: i64) -> Result<WeeklyTrendAnalysis, ReportError> {
        let report = self.generate_weekly_report(week_id)?;

        let previous_report = self
            .previous_available_week(&report.week)
            .and_then(|week| self.generate_weekly_report(week.id).ok());

        let current_metrics = Self::metrics(&report);
        let previous_metrics = previous_report.as_ref().map(Self::metrics);
        let week_over_week = week_over_week(&current_metrics, previous_metrics.as_ref());

        let per_day: BTreeMap<String, BTreeMap<String, f64>> = report
            .daily_breakdown
            .iter()
            .map(|d| (d.day.clone(), d.consumption.clone()))
            .collect();
        let daily_variation = daily_variation(&per_day, report.summary.total_days);

        let consistency_score =
            consistency_score(report.summary.days_with_data, report.summary.total_days);

        Ok(WeeklyTrendAnalysis {
            report,
            week_over_week,
            consistency_score,
            daily_variation,
        })
    }

    /// The available week with the latest start date before the given week
    fn previous_available_week(&self, current: &Week) -> Option<Week> {
        self.get_available_weeks()
            .into_iter()
            .filter(|week| week.start_date < current.start_date)
            .max_by(|a, b| a.start_date.cmp(&b.start_date))
    }

    fn metrics(report: &WeeklyReport) -> WeekMetrics {
        let total_days = report.summary.total_days;
        let avg_daily_calories = if total_days > 0 {
            report
                .total_consumption
                .get("calories")
                .copied()
                .unwrap_or(0.0)
                / total_days as f64
        } else {
            0.0
        };

        WeekMetrics {
            week_id: report.week.id,
            start_date: report.week.start_date.clone(),
            overall_score: report.summary.nutrition_score.overall,
            percentages: report
                .weekly_comparison
                .iter()
                .map(|c| (c.substance.clone(), c.percentage))
                .collect(),
            avg_daily_calories,
            days_with_data: report.summary.days_with_data,
            total_days,
        }
    }
}
