//! Week-over-week trend analysis
//!
//! Compares a week's consumption profile against the prior week and derives
//! consistency and variation figures from the daily totals. All inputs come
//! in as plain metric structs so the analysis stays independent of storage.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One week's consumption profile, prepared by the report assembler
#[derive(Debug, Clone)]
pub struct WeekMetrics {
    pub week_id: i64,
    pub start_date: String,
    pub overall_score: u8,
    /// Canonical substance -> percent of the weekly recommended amount
    pub percentages: BTreeMap<String, f64>,
    /// Average calories per day across the week
    pub avg_daily_calories: f64,
    pub days_with_data: usize,
    pub total_days: usize,
}

/// Direction of movement relative to the optimal band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Week-over-week movement for one substance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceTrend {
    pub substance: String,
    pub previous_percentage: f64,
    pub current_percentage: f64,
    pub direction: TrendDirection,
}

/// Week-over-week comparison across all substances of two weeks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekOverWeek {
    pub nutrition_score_change: i32,
    /// Change in average daily calories
    pub calorie_change: f64,
    pub substances: Vec<SubstanceTrend>,
    pub improving: usize,
    pub declining: usize,
    pub stable: usize,
}

/// Distance of a percentage from the 80-120% optimal band. Inside the band
/// the distance is 0.
pub fn band_distance(percentage: f64) -> f64 {
    if percentage < 80.0 {
        80.0 - percentage
    } else if percentage > 120.0 {
        percentage - 120.0
    } else {
        0.0
    }
}

/// Compare the current week against the prior week.
///
/// Returns `None` when there is no prior week; a trend needs two weeks of
/// data. Substances present in only one of the weeks are compared with a
/// zero percentage on the other side.
pub fn week_over_week(current: &WeekMetrics, previous: Option<&WeekMetrics>) -> Option<WeekOverWeek> {
    let previous = previous?;

    let substances: BTreeSet<&String> = current
        .percentages
        .keys()
        .chain(previous.percentages.keys())
        .collect();

    let mut trends = Vec::with_capacity(substances.len());
    let (mut improving, mut declining, mut stable) = (0, 0, 0);

    for substance in substances {
        let prev_pct = previous.percentages.get(substance).copied().unwrap_or(0.0);
        let cur_pct = current.percentages.get(substance).copied().unwrap_or(0.0);

        let prev_distance = band_distance(prev_pct);
        let cur_distance = band_distance(cur_pct);

        let direction = if cur_distance < prev_distance {
            improving += 1;
            TrendDirection::Improving
        } else if cur_distance > prev_distance {
            declining += 1;
            TrendDirection::Declining
        } else {
            stable += 1;
            TrendDirection::Stable
        };

        trends.push(SubstanceTrend {
            substance: substance.clone(),
            previous_percentage: prev_pct,
            current_percentage: cur_pct,
            direction,
        });
    }

    Some(WeekOverWeek {
        nutrition_score_change: current.overall_score as i32 - previous.overall_score as i32,
        calorie_change: current.avg_daily_calories - previous.avg_daily_calories,
        substances: trends,
        improving,
        declining,
        stable,
    })
}

/// Share of the week's days that have any analyzed data, as a percentage
pub fn consistency_score(days_with_data: usize, total_days: usize) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    days_with_data as f64 / total_days as f64 * 100.0
}

/// Qualitative label for day-to-day variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationLevel {
    VeryConsistent,
    ModeratelyConsistent,
    HighlyVariable,
}

impl VariationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationLevel::VeryConsistent => "very consistent",
            VariationLevel::ModeratelyConsistent => "moderately consistent",
            VariationLevel::HighlyVariable => "highly variable",
        }
    }
}

/// Day-to-day variation of one substance across the week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVariation {
    pub substance: String,
    pub std_deviation: f64,
    pub label: VariationLevel,
}

/// Sample standard deviation (n-1). Fewer than two values give 0.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

fn variation_level(std_deviation: f64) -> VariationLevel {
    if std_deviation < 10.0 {
        VariationLevel::VeryConsistent
    } else if std_deviation < 25.0 {
        VariationLevel::ModeratelyConsistent
    } else {
        VariationLevel::HighlyVariable
    }
}

/// Per-substance variation of daily amounts across the week.
///
/// `per_day` maps day date to that day's consumption map; days the
/// substance has no entry for count as 0.0, and `total_days` pads days with
/// no data at all. Output is sorted by substance name.
pub fn daily_variation(
    per_day: &BTreeMap<String, BTreeMap<String, f64>>,
    total_days: usize,
) -> Vec<DailyVariation> {
    let substances: BTreeSet<&String> = per_day.values().flat_map(|day| day.keys()).collect();

    substances
        .into_iter()
        .map(|substance| {
            let mut amounts: Vec<f64> = per_day
                .values()
                .map(|day| day.get(substance).copied().unwrap_or(0.0))
                .collect();
            amounts.resize(total_days.max(amounts.len()), 0.0);

            let std_deviation = std_dev(&amounts);
            DailyVariation {
                substance: substance.clone(),
                std_deviation,
                label: variation_level(std_deviation),
            }
        })
        .collect()
}
