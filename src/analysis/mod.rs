//! Aggregation, benchmark and ranking functions.
//!
//! Everything here is synchronous and pure: inputs are slices of
//! canonical records, outputs are freshly computed value objects.

pub mod aggregator;
pub mod benchmark;
pub mod ranking;

pub use aggregator::*;
pub use benchmark::{
    calculate_capability_benchmark, calculate_capability_benchmark_from_scores,
    calculate_percentile, calculate_sentiment_benchmark, BenchmarkFilters, CapabilityBenchmark,
    CapabilityBenchmarkFilters, DimensionMap, SentimentBenchmark,
};
pub use ranking::{
    calculate_capability_assessment, calculate_ranked_heatmap, get_highest_scoring_cells,
    get_lowest_scoring_cells, get_ranked_color, get_weakest_constructs, get_weakest_dimensions,
    CapabilityOverview, DimensionScore, DimensionStatus, RankedCell, RankedHeatmap,
    SentimentStats,
};
