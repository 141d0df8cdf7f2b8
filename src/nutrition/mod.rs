//! Nutrition computation
//!
//! Pure functions over analyzed food data: name normalization, aggregation,
//! reference comparison, scoring and trend analysis. Nothing in this module
//! performs I/O.

pub mod aggregate;
pub mod compare;
pub mod normalize;
pub mod score;
pub mod trends;

pub use aggregate::{AggregationError, DayAggregates, SubstanceAggregator};
pub use compare::{
    classify, classify_enhanced, compare_enhanced, compare_totals, ComparisonData,
    ComparisonStatus, EnhancedComparisonData, EnhancedStatus, ReferenceLayer, SubstanceReading,
};
pub use normalize::{display_name, normalize};
pub use score::{score_enhanced, score_simple, NutritionScore, ScoreBreakdown};
pub use trends::{
    band_distance, consistency_score, daily_variation, week_over_week, DailyVariation,
    SubstanceTrend, TrendDirection, VariationLevel, WeekMetrics, WeekOverWeek,
};
