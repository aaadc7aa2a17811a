//! Survey aggregation and statistics.
//!
//! This module turns raw respondent records into the heatmap cells,
//! capability dimensions and composite readiness score the report shows.
//! Every function is pure and total: empty or incomplete input degrades
//! to zero values instead of failing.

use crate::constants::{
    dimension_by_key, heatmap_description, CAPABILITY_DIMENSIONS, PLACEHOLDER_BENCHMARK,
    SCALE_MIDPOINT,
};
use crate::models::{
    CapabilityConstruct, CapabilityDimension, CapabilityResponse, FilterState, Filterable,
    GapAnalysis, HeatmapCell, SentimentReason, SentimentResponse,
};

/// Keep the records that satisfy every active filter, preserving order.
pub fn filter_responses<'a, T: Filterable>(data: &'a [T], filters: &FilterState) -> Vec<&'a T> {
    data.iter().filter(|record| filters.matches(*record)).collect()
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Round to a fixed number of decimals.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Build the 5x5 sentiment heatmap.
///
/// Cells are emitted level 5 down to level 1, and `R1..R5` within each
/// level. Grid renderers rely on this order.
pub fn calculate_sentiment_heatmap(
    responses: &[SentimentResponse],
    filters: &FilterState,
) -> Vec<HeatmapCell> {
    let filtered = filter_responses(responses, filters);
    let mut cells = Vec::with_capacity(25);

    for level in (1..=5u8).rev() {
        for reason in SentimentReason::ALL {
            let levels: Vec<f64> = filtered
                .iter()
                .filter(|r| r.coordinate() == Some((level, reason)))
                .map(|_| f64::from(level))
                .collect();

            let count = levels.len();
            let value = mean(levels).unwrap_or(0.0);
            let description = heatmap_description(level, reason.index() as u8 + 1);

            cells.push(HeatmapCell {
                x: reason.index(),
                y: 5 - usize::from(level),
                value,
                count,
                label: description.map(|d| d.label.to_string()).unwrap_or_else(|| {
                    format!("Level {}, Reason {}", level, reason.index() + 1)
                }),
                description: description
                    .map(|d| d.description.to_string())
                    .unwrap_or_default(),
                color: get_heatmap_color(value).to_string(),
            });
        }
    }

    cells
}

/// Per-respondent average over a dimension's valid construct scores.
fn respondent_dimension_average(record: &CapabilityResponse, dimension: usize) -> Option<f64> {
    mean((0..4).filter_map(|position| record.construct_score(dimension, position)))
}

/// Summarise the eight capability dimensions in table order.
///
/// `constructs` is left empty; construct detail for one dimension comes
/// from [`calculate_construct_details`].
pub fn calculate_capability_dimensions(
    responses: &[CapabilityResponse],
    filters: &FilterState,
) -> Vec<CapabilityDimension> {
    let filtered = filter_responses(responses, filters);

    CAPABILITY_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(index, dim)| {
            let scores: Vec<f64> = filtered
                .iter()
                .filter_map(|r| respondent_dimension_average(r, index))
                .filter(|s| *s > 0.0)
                .collect();

            let average = mean(scores.iter().copied()).unwrap_or(0.0);
            let min_score = scores.iter().copied().reduce(f64::min).unwrap_or(0.0);
            let max_score = scores.iter().copied().reduce(f64::max).unwrap_or(0.0);

            CapabilityDimension {
                dimension_id: dim.key.to_string(),
                name: dim.name.to_string(),
                average_score: round_to(average, 2),
                min_score,
                max_score,
                benchmark_score: Some(PLACEHOLDER_BENCHMARK),
                constructs: Vec::new(),
            }
        })
        .collect()
}

/// Construct-level averages and gaps for one dimension.
///
/// An unknown dimension key yields four zero-valued constructs.
pub fn calculate_construct_details(
    responses: &[CapabilityResponse],
    dimension_id: &str,
    filters: &FilterState,
) -> Vec<CapabilityConstruct> {
    let filtered = filter_responses(responses, filters);
    let dimension = dimension_by_key(dimension_id);

    (0..4)
        .map(|position| {
            let average = dimension
                .and_then(|(index, _)| {
                    mean(
                        filtered
                            .iter()
                            .filter_map(|r| r.construct_score(index, position))
                            .filter(|s| *s > 0.0),
                    )
                })
                .unwrap_or(0.0);

            let name = dimension
                .map(|(_, d)| d.construct_labels[position].to_string())
                .unwrap_or_else(|| format!("Construct {}", position + 1));

            CapabilityConstruct {
                construct_id: format!("{}_C{}", dimension_id, position + 1),
                name,
                average_score: round_to(average, 2),
                benchmark_score: Some(PLACEHOLDER_BENCHMARK),
                gap_analysis: GapAnalysis {
                    vs_average: average - SCALE_MIDPOINT,
                    vs_benchmark: Some(average - PLACEHOLDER_BENCHMARK),
                },
            }
        })
        .collect()
}

/// Composite readiness on a 0-100 scale.
///
/// Sentiment weighs 40% and capability 60%. A missing source contributes
/// zero to its term rather than being reweighted away.
pub fn calculate_readiness_score(
    sentiment: &[SentimentResponse],
    capability: &[CapabilityResponse],
) -> f64 {
    let sentiment_avg = mean(
        sentiment
            .iter()
            .map(|r| r.sentiment_level.map(f64::from).unwrap_or(0.0)),
    )
    .unwrap_or(0.0);

    let dimensions = calculate_capability_dimensions(capability, &FilterState::default());
    let capability_avg = mean(dimensions.iter().map(|d| d.average_score)).unwrap_or(0.0);

    round_to((sentiment_avg * 0.4 + capability_avg * 0.6) * 20.0, 1)
}

/// Colour for a heatmap value; grey marks "no data".
pub fn get_heatmap_color(value: f64) -> &'static str {
    if value == 0.0 {
        "#6B7280"
    } else if value < 2.0 {
        "#B91C1C"
    } else if value < 2.5 {
        "#EA580C"
    } else if value < 3.0 {
        "#FCD34D"
    } else if value < 3.5 {
        "#A3E635"
    } else {
        "#15803D"
    }
}

/// Labels of the lowest-valued populated cells below the neutral line.
pub fn get_top_sentiment_issues(cells: &[HeatmapCell], limit: usize) -> Vec<String> {
    let mut issues: Vec<&HeatmapCell> = cells
        .iter()
        .filter(|c| c.count > 0 && c.value < 3.0)
        .collect();
    issues.sort_by(|a, b| a.value.total_cmp(&b.value));
    issues
        .into_iter()
        .take(limit)
        .map(|c| c.label.clone())
        .collect()
}

/// Names of the lowest-scoring dimensions.
pub fn get_weakest_capabilities(dimensions: &[CapabilityDimension], limit: usize) -> Vec<String> {
    let mut sorted: Vec<&CapabilityDimension> = dimensions.iter().collect();
    sorted.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    sorted.into_iter().take(limit).map(|d| d.name.clone()).collect()
}

/// Names of the highest-scoring dimensions.
pub fn get_strongest_capabilities(
    dimensions: &[CapabilityDimension],
    limit: usize,
) -> Vec<String> {
    let mut sorted: Vec<&CapabilityDimension> = dimensions.iter().collect();
    sorted.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    sorted.into_iter().take(limit).map(|d| d.name.clone()).collect()
}

/// Format a number with a fixed number of decimals.
pub fn format_number(num: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, num)
}

/// Format a fraction (0.0-1.0) as a whole percentage.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
