//! Composite nutrition scoring
//!
//! Turns comparison results into a 0-100 score with a per-bucket breakdown
//! and a short list of actionable recommendations. Scoring is deterministic:
//! the same comparisons always produce the same score.

use serde::{Deserialize, Serialize};

use crate::models::SubstanceCategory;

use super::compare::{ComparisonData, ComparisonStatus, EnhancedComparisonData, EnhancedStatus};
use super::normalize::display_name;

/// Per-bucket scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub macronutrients: u8,
    pub micronutrients: u8,
    pub harmful_substances: u8,
}

/// Composite score with breakdown and capped recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionScore {
    pub overall: u8,
    pub breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
}

// ===== Sub-score tables =====

/// Points for a simple three-band status. `Neutral` carries no points and
/// is excluded from the bucket mean entirely.
fn simple_points(status: ComparisonStatus) -> Option<f64> {
    match status {
        ComparisonStatus::Optimal => Some(100.0),
        ComparisonStatus::Under | ComparisonStatus::Over => Some(0.0),
        ComparisonStatus::Neutral => None,
    }
}

fn enhanced_points(status: EnhancedStatus) -> f64 {
    match status {
        EnhancedStatus::Optimal => 100.0,
        EnhancedStatus::Acceptable => 70.0,
        EnhancedStatus::Deficient => 40.0,
        EnhancedStatus::Excess => 20.0,
    }
}

/// Rounded mean of the bucket's points, clamped to 0-100. An empty bucket
/// scores 0.
fn bucket_score(points: &[f64]) -> u8 {
    if points.is_empty() {
        return 0;
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

fn overall_score(breakdown: &ScoreBreakdown) -> u8 {
    let sum = breakdown.macronutrients as f64
        + breakdown.micronutrients as f64
        + breakdown.harmful_substances as f64;
    (sum / 3.0).round().clamp(0.0, 100.0) as u8
}

// ===== Recommendation generation =====

const MAX_RECOMMENDATIONS: usize = 3;

/// A recommendation candidate with a severity rank; lower ranks surface
/// first when the list is cut to [`MAX_RECOMMENDATIONS`].
struct Candidate {
    rank: u8,
    /// Distance from the optimal band, used to break rank ties
    distance: f64,
    message: String,
}

fn cut_recommendations(mut candidates: Vec<Candidate>) -> Vec<String> {
    candidates.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| b.distance.total_cmp(&a.distance))
            .then_with(|| a.message.cmp(&b.message))
    });
    candidates
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|c| c.message)
        .collect()
}

// ===== Scoring entry points =====

/// Score simple comparisons. Each comparison is paired with its substance
/// category so it lands in the right breakdown bucket; `Calorie` and
/// `Unknown` substances do not participate in scoring.
pub fn score_simple(comparisons: &[(ComparisonData, SubstanceCategory)]) -> NutritionScore {
    let mut macros = Vec::new();
    let mut micros = Vec::new();
    let mut harmful = Vec::new();
    let mut candidates = Vec::new();

    for (comparison, category) in comparisons {
        if let Some(points) = simple_points(comparison.status) {
            match category {
                SubstanceCategory::Macronutrient => macros.push(points),
                SubstanceCategory::Micronutrient => micros.push(points),
                SubstanceCategory::Harmful => harmful.push(points),
                SubstanceCategory::Calorie | SubstanceCategory::Unknown => {}
            }
        }

        // Advice is directional: under-consumption only matters for
        // beneficial substances, and a low harmful reading is a good sign,
        // not a deficit. Unknown substances get no advice at all.
        let name = display_name(&comparison.substance);
        match comparison.status {
            ComparisonStatus::Over if *category == SubstanceCategory::Harmful => {
                candidates.push(Candidate {
                    rank: 0,
                    distance: comparison.percentage - 120.0,
                    message: format!(
                        "Reduce {} intake: {:.0}% of the recommended limit",
                        name, comparison.percentage
                    ),
                });
            }
            ComparisonStatus::Under if category.is_beneficial() => {
                candidates.push(Candidate {
                    rank: 1,
                    distance: 80.0 - comparison.percentage,
                    message: format!(
                        "Increase {} intake: only {:.0}% of the recommended amount",
                        name, comparison.percentage
                    ),
                });
            }
            ComparisonStatus::Over if category.is_beneficial() => {
                candidates.push(Candidate {
                    rank: 2,
                    distance: comparison.percentage - 120.0,
                    message: format!(
                        "Reduce {} intake: {:.0}% of the recommended amount",
                        name, comparison.percentage
                    ),
                });
            }
            _ => {}
        }
    }

    let breakdown = ScoreBreakdown {
        macronutrients: bucket_score(&macros),
        micronutrients: bucket_score(&micros),
        harmful_substances: bucket_score(&harmful),
    };

    NutritionScore {
        overall: overall_score(&breakdown),
        breakdown,
        recommendations: cut_recommendations(candidates),
    }
}

/// Score enhanced comparisons. The four-band statuses carry graded points,
/// so a deficient substance still contributes more than an excessive one.
pub fn score_enhanced(comparisons: &[EnhancedComparisonData]) -> NutritionScore {
    let mut macros = Vec::new();
    let mut micros = Vec::new();
    let mut harmful = Vec::new();
    let mut candidates = Vec::new();

    for comparison in comparisons {
        let points = enhanced_points(comparison.status);
        match comparison.category {
            SubstanceCategory::Macronutrient => macros.push(points),
            SubstanceCategory::Micronutrient => micros.push(points),
            SubstanceCategory::Harmful => harmful.push(points),
            SubstanceCategory::Calorie | SubstanceCategory::Unknown => {}
        }

        let name = display_name(&comparison.substance);
        match (comparison.status, comparison.category) {
            (EnhancedStatus::Excess, SubstanceCategory::Harmful) => {
                candidates.push(Candidate {
                    rank: 0,
                    distance: comparison.consumed,
                    message: format!("Reduce {} intake: above the upper limit", name),
                });
            }
            (EnhancedStatus::Deficient, category) if category.is_beneficial() => {
                candidates.push(Candidate {
                    rank: 1,
                    distance: -comparison.consumed,
                    message: format!("Increase {} intake: below the recommended minimum", name),
                });
            }
            (EnhancedStatus::Excess, _) => {
                candidates.push(Candidate {
                    rank: 2,
                    distance: comparison.consumed,
                    message: format!("Reduce {} intake: well above the recommended amount", name),
                });
            }
            (EnhancedStatus::Acceptable, category) if category.is_beneficial() => {
                candidates.push(Candidate {
                    rank: 3,
                    distance: 0.0,
                    message: format!("Watch {} intake: above the optimal range", name),
                });
            }
            _ => {}
        }
    }

    let breakdown = ScoreBreakdown {
        macronutrients: bucket_score(&macros),
        micronutrients: bucket_score(&micros),
        harmful_substances: bucket_score(&harmful),
    };

    NutritionScore {
        overall: overall_score(&breakdown),
        breakdown,
        recommendations: cut_recommendations(candidates),
    }
}
