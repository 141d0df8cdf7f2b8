//! Reference comparison
//!
//! Classifies aggregated consumption against reference values. Two policies:
//! a simple three-band percentage comparison against a single recommended
//! amount, and an enhanced four-band comparison driven by the full
//! reference-value set. Both are pure functions of their inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ReferenceType, ReferenceValue, SubstanceCategory};

/// Simple comparison band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Under,
    Optimal,
    Over,
    /// No reference exists; the amount is carried but not judged
    Neutral,
}

impl ComparisonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonStatus::Under => "under",
            ComparisonStatus::Optimal => "optimal",
            ComparisonStatus::Over => "over",
            ComparisonStatus::Neutral => "neutral",
        }
    }
}

/// Consumed-vs-recommended comparison for one substance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonData {
    pub substance: String,
    pub consumed: f64,
    pub recommended: f64,
    pub percentage: f64,
    pub status: ComparisonStatus,
}

/// Classify a consumed amount against a recommended amount.
///
/// Returns `(percentage, status)`. A zero recommendation classifies as
/// `Neutral` with percentage 0 instead of dividing by zero.
pub fn classify(consumed: f64, recommended: f64) -> (f64, ComparisonStatus) {
    if recommended <= 0.0 {
        return (0.0, ComparisonStatus::Neutral);
    }

    let percentage = consumed / recommended * 100.0;
    let status = if percentage < 80.0 {
        ComparisonStatus::Under
    } else if percentage <= 120.0 {
        ComparisonStatus::Optimal
    } else {
        ComparisonStatus::Over
    };

    (percentage, status)
}

/// Compare aggregated totals against a recommended map.
///
/// Output is sorted alphabetically by substance. Substances without a
/// recommendation come out `Neutral`, never dropped.
pub fn compare_totals(
    totals: &BTreeMap<String, f64>,
    recommended: &BTreeMap<String, f64>,
) -> Vec<ComparisonData> {
    totals
        .iter()
        .map(|(substance, &consumed)| {
            let rec = recommended.get(substance).copied().unwrap_or(0.0);
            let (percentage, status) = classify(consumed, rec);
            ComparisonData {
                substance: substance.clone(),
                consumed,
                recommended: rec,
                percentage,
                status,
            }
        })
        .collect()
}

/// Enhanced four-band status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancedStatus {
    Deficient,
    Optimal,
    Acceptable,
    Excess,
}

impl EnhancedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancedStatus::Deficient => "deficient",
            EnhancedStatus::Optimal => "optimal",
            EnhancedStatus::Acceptable => "acceptable",
            EnhancedStatus::Excess => "excess",
        }
    }
}

/// One rendering band derived from a reference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLayer {
    pub value: f64,
    pub color: String,
    pub label: String,
}

/// A substance reading awaiting enhanced comparison
#[derive(Debug, Clone)]
pub struct SubstanceReading {
    pub substance: String,
    pub category: SubstanceCategory,
    pub consumed: f64,
    pub unit: String,
    pub references: Vec<ReferenceValue>,
}

/// Enhanced comparison output for one substance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedComparisonData {
    pub substance: String,
    pub category: SubstanceCategory,
    pub consumed: f64,
    pub unit: String,
    pub status: EnhancedStatus,
    /// Reference values ordered ascending by value
    pub reference_values: Vec<ReferenceValue>,
    /// Rendering bands derived from the ordered reference values
    pub layers: Vec<ReferenceLayer>,
}

fn threshold(references: &[ReferenceValue], ref_type: ReferenceType) -> Option<f64> {
    references
        .iter()
        .find(|r| r.ref_type == ref_type)
        .map(|r| r.value)
}

/// Classify a consumed amount against the full reference set.
///
/// Harmful substances are judged only against their upper threshold; there
/// is no deficiency penalty for under-consuming them. For beneficial
/// substances the deficiency floor is the lower of the explicit minimum and
/// 80% of the recommended amount; the optimal band closes at 120% of the
/// recommended amount, the acceptable band at the maximum/upper limit (or
/// 150% of the recommended amount when no limit is given).
pub fn classify_enhanced(
    consumed: f64,
    references: &[ReferenceValue],
    category: SubstanceCategory,
) -> EnhancedStatus {
    let rda = threshold(references, ReferenceType::Recommended);
    let minimum = threshold(references, ReferenceType::Minimum);
    let upper = threshold(references, ReferenceType::UpperLimit)
        .or_else(|| threshold(references, ReferenceType::Maximum));

    if category == SubstanceCategory::Harmful {
        return match upper {
            Some(limit) if consumed > limit => EnhancedStatus::Excess,
            _ => EnhancedStatus::Optimal,
        };
    }

    let floor = match (minimum, rda) {
        (Some(min), Some(rda)) => Some(min.min(rda * 0.8)),
        (Some(min), None) => Some(min),
        (None, Some(rda)) => Some(rda * 0.8),
        (None, None) => None,
    };
    if let Some(floor) = floor {
        if consumed < floor {
            return EnhancedStatus::Deficient;
        }
    }

    match (rda, upper) {
        (Some(rda), _) => {
            let percentage = consumed / rda * 100.0;
            if percentage <= 120.0 {
                EnhancedStatus::Optimal
            } else {
                match upper {
                    Some(limit) if consumed > limit => EnhancedStatus::Excess,
                    Some(_) => EnhancedStatus::Acceptable,
                    None if percentage <= 150.0 => EnhancedStatus::Acceptable,
                    None => EnhancedStatus::Excess,
                }
            }
        }
        (None, Some(limit)) => {
            if consumed > limit {
                EnhancedStatus::Excess
            } else {
                EnhancedStatus::Optimal
            }
        }
        (None, None) if floor.is_some() => EnhancedStatus::Optimal,
        // No references at all: an uncalibrated middle band
        (None, None) => EnhancedStatus::Acceptable,
    }
}

/// Build the enhanced comparison for one reading
pub fn compare_reading(reading: &SubstanceReading) -> EnhancedComparisonData {
    let mut references = reading.references.clone();
    references.sort_by(|a, b| a.value.total_cmp(&b.value));

    let layers = references
        .iter()
        .map(|r| ReferenceLayer {
            value: r.value,
            color: r.color.clone(),
            label: r.label.clone(),
        })
        .collect();

    EnhancedComparisonData {
        substance: reading.substance.clone(),
        category: reading.category,
        consumed: reading.consumed,
        unit: reading.unit.clone(),
        status: classify_enhanced(reading.consumed, &references, reading.category),
        reference_values: references,
        layers,
    }
}

/// Compare a batch of readings.
///
/// Output is sorted by category display order, then substance name.
pub fn compare_enhanced(readings: &[SubstanceReading]) -> Vec<EnhancedComparisonData> {
    let mut output: Vec<EnhancedComparisonData> = readings.iter().map(compare_reading).collect();

    output.sort_by(|a, b| {
        a.category
            .display_order()
            .cmp(&b.category.display_order())
            .then_with(|| a.substance.cmp(&b.substance))
    });

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn reference(substance: &str, ref_type: ReferenceType, value: f64) -> ReferenceValue {
        ReferenceValue {
            substance_name: substance.to_string(),
            age_group: "19-30".to_string(),
            gender: Gender::All,
            ref_type,
            value,
            unit: "g".to_string(),
            color: "#4CAF50".to_string(),
            label: ref_type.as_str().to_string(),
        }
    }

    #[test]
    fn test_percentage_formula() {
        let (pct, _) = classify(25.5, 50.0);
        assert!((pct - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(79.99, 100.0).1, ComparisonStatus::Under);
        assert_eq!(classify(80.0, 100.0).1, ComparisonStatus::Optimal);
        assert_eq!(classify(120.0, 100.0).1, ComparisonStatus::Optimal);
        assert_eq!(classify(120.01, 100.0).1, ComparisonStatus::Over);
    }

    #[test]
    fn test_zero_recommendation_is_neutral() {
        let (pct, status) = classify(42.0, 0.0);
        assert_eq!(pct, 0.0);
        assert_eq!(status, ComparisonStatus::Neutral);
    }

    #[test]
    fn test_compare_totals_sorted_and_complete() {
        let mut totals = BTreeMap::new();
        totals.insert("protein".to_string(), 40.0);
        totals.insert("carbs".to_string(), 250.0);
        totals.insert("mystery".to_string(), 3.0);

        let mut recommended = BTreeMap::new();
        recommended.insert("protein".to_string(), 50.0);
        recommended.insert("carbs".to_string(), 300.0);

        let comparisons = compare_totals(&totals, &recommended);

        let names: Vec<&str> = comparisons.iter().map(|c| c.substance.as_str()).collect();
        assert_eq!(names, vec!["carbs", "mystery", "protein"]);

        let mystery = &comparisons[1];
        assert_eq!(mystery.status, ComparisonStatus::Neutral);
        assert_eq!(mystery.percentage, 0.0);

        let protein = &comparisons[2];
        assert_eq!(protein.status, ComparisonStatus::Optimal);
    }

    #[test]
    fn test_harmful_only_judged_on_upper_threshold() {
        let refs = vec![reference("sodium", ReferenceType::UpperLimit, 2300.0)];

        // Well under the limit: no deficiency penalty for a harmful substance
        assert_eq!(
            classify_enhanced(10.0, &refs, SubstanceCategory::Harmful),
            EnhancedStatus::Optimal
        );
        assert_eq!(
            classify_enhanced(2300.0, &refs, SubstanceCategory::Harmful),
            EnhancedStatus::Optimal
        );
        assert_eq!(
            classify_enhanced(2301.0, &refs, SubstanceCategory::Harmful),
            EnhancedStatus::Excess
        );
    }

    #[test]
    fn test_beneficial_four_bands() {
        let refs = vec![
            reference("protein", ReferenceType::Minimum, 35.0),
            reference("protein", ReferenceType::Recommended, 50.0),
            reference("protein", ReferenceType::UpperLimit, 100.0),
        ];
        let cat = SubstanceCategory::Macronutrient;

        assert_eq!(classify_enhanced(20.0, &refs, cat), EnhancedStatus::Deficient);
        assert_eq!(classify_enhanced(50.0, &refs, cat), EnhancedStatus::Optimal);
        assert_eq!(classify_enhanced(60.0, &refs, cat), EnhancedStatus::Optimal);
        assert_eq!(classify_enhanced(80.0, &refs, cat), EnhancedStatus::Acceptable);
        assert_eq!(classify_enhanced(120.0, &refs, cat), EnhancedStatus::Excess);
    }

    #[test]
    fn test_beneficial_rda_only() {
        let refs = vec![reference("fiber", ReferenceType::Recommended, 28.0)];
        let cat = SubstanceCategory::Macronutrient;

        // 80% floor without an explicit minimum
        assert_eq!(classify_enhanced(22.0, &refs, cat), EnhancedStatus::Deficient);
        assert_eq!(classify_enhanced(28.0, &refs, cat), EnhancedStatus::Optimal);
        // Acceptable spans 120-150% when no upper limit exists
        assert_eq!(classify_enhanced(38.0, &refs, cat), EnhancedStatus::Acceptable);
        assert_eq!(classify_enhanced(45.0, &refs, cat), EnhancedStatus::Excess);
    }

    #[test]
    fn test_no_references_is_acceptable() {
        assert_eq!(
            classify_enhanced(5.0, &[], SubstanceCategory::Unknown),
            EnhancedStatus::Acceptable
        );
    }

    #[test]
    fn test_enhanced_output_ordering_and_layers() {
        let readings = vec![
            SubstanceReading {
                substance: "sodium".to_string(),
                category: SubstanceCategory::Harmful,
                consumed: 1500.0,
                unit: "mg".to_string(),
                references: vec![reference("sodium", ReferenceType::UpperLimit, 2300.0)],
            },
            SubstanceReading {
                substance: "vitamin-c".to_string(),
                category: SubstanceCategory::Micronutrient,
                consumed: 90.0,
                unit: "mg".to_string(),
                references: vec![
                    reference("vitamin-c", ReferenceType::UpperLimit, 2000.0),
                    reference("vitamin-c", ReferenceType::Recommended, 90.0),
                ],
            },
            SubstanceReading {
                substance: "protein".to_string(),
                category: SubstanceCategory::Macronutrient,
                consumed: 50.0,
                unit: "g".to_string(),
                references: vec![reference("protein", ReferenceType::Recommended, 50.0)],
            },
        ];

        let output = compare_enhanced(&readings);

        let names: Vec<&str> = output.iter().map(|c| c.substance.as_str()).collect();
        assert_eq!(names, vec!["protein", "vitamin-c", "sodium"]);

        // Layers follow the ascending reference ordering
        let vitamin_c = &output[1];
        assert_eq!(vitamin_c.layers.len(), 2);
        assert!(vitamin_c.layers[0].value < vitamin_c.layers[1].value);
        assert_eq!(vitamin_c.reference_values[0].ref_type, ReferenceType::Recommended);
    }

    /// Ten concurrent invocations on identical inputs must produce ten
    /// identical outputs: the comparison is a pure function.
    #[test]
    fn test_enhanced_comparison_is_idempotent_under_concurrency() {
        let readings = vec![SubstanceReading {
            substance: "protein".to_string(),
            category: SubstanceCategory::Macronutrient,
            consumed: 42.0,
            unit: "g".to_string(),
            references: vec![reference("protein", ReferenceType::Recommended, 50.0)],
        }];

        let outputs: Vec<Vec<EnhancedComparisonData>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..10)
                .map(|_| scope.spawn(|| compare_enhanced(&readings)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = &outputs[0];
        assert_eq!(first[0].consumed, 42.0);
        assert_eq!(first[0].substance, "protein");
        for output in &outputs {
            assert_eq!(output, first);
        }
    }
}
