//! Relative rankings over the question grid and the capability scan.
//!
//! The question grid colours cells by their rank among the cells that
//! have data rather than by absolute thresholds. The capability
//! assessment rolls construct means up into dimensions and classifies
//! each dimension against a benchmark.

use crate::analysis::aggregator::{filter_responses, mean};
use crate::analysis::benchmark::DimensionMap;
use crate::constants::{
    color_ranking, constructs_for_dimension, sentiment_cell_id, CAPABILITY_DIMENSIONS,
    SENTIMENT_CATEGORIES, SENTIMENT_LEVELS, SENTIMENT_QUESTION_COUNT,
};
use crate::models::{CapabilityResponse, FilterState, SentimentResponse};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Rank given to cells without data.
pub const UNRANKED: usize = 99;

/// Scores closer than this share a rank.
const RANK_TOLERANCE: f64 = 0.001;

/// One cell of the question-based sentiment grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCell {
    pub level_id: u8,
    pub category_id: u8,
    /// `L{level}_C{category}`.
    pub cell_id: String,
    pub score: f64,
    pub count: usize,
    /// 1 is the highest score; [`UNRANKED`] when `count` is 0.
    pub rank: usize,
    pub color: String,
    pub level_name: String,
    pub category_name: String,
    pub description: String,
}

impl RankedCell {
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Summary statistics over the cells that have data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub overall_average: f64,
    /// Population standard deviation of the cell means.
    pub standard_deviation: f64,
    pub total_respondents: usize,
    pub row_averages: [f64; 5],
    pub column_averages: [f64; 5],
}

/// Ranked grid plus its statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedHeatmap {
    pub cells: Vec<RankedCell>,
    pub stats: SentimentStats,
}

fn rank_color(rank: usize, ranked: usize) -> &'static str {
    if rank <= 3 {
        color_ranking::TOP_3
    } else if rank <= 8 {
        color_ranking::TOP_8
    } else if rank >= ranked.saturating_sub(2) {
        color_ranking::BOTTOM_3
    } else if rank >= ranked.saturating_sub(7) {
        color_ranking::BOTTOM_8
    } else {
        color_ranking::MIDDLE
    }
}

/// Build the 25-cell question grid in question order.
///
/// Returns no cells and zeroed statistics when the filter leaves no
/// respondents.
pub fn calculate_ranked_heatmap(
    records: &[SentimentResponse],
    filters: &FilterState,
) -> RankedHeatmap {
    let filtered = filter_responses(records, filters);
    if filtered.is_empty() {
        return RankedHeatmap::default();
    }

    let cell_scores: Vec<(f64, usize)> = (1..=SENTIMENT_QUESTION_COUNT)
        .map(|question| {
            let scores: Vec<f64> = filtered
                .iter()
                .filter_map(|r| r.question_score(question))
                .collect();
            (mean(scores.iter().copied()).unwrap_or(0.0), scores.len())
        })
        .collect();

    let mut ranking: Vec<f64> = cell_scores
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(score, _)| *score)
        .collect();
    ranking.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let cells: Vec<RankedCell> = cell_scores
        .iter()
        .enumerate()
        .map(|(i, &(score, count))| {
            let level = &SENTIMENT_LEVELS[i / 5];
            let category = &SENTIMENT_CATEGORIES[i % 5];

            let (rank, color) = if count > 0 {
                let rank = ranking
                    .iter()
                    .position(|s| (s - score).abs() < RANK_TOLERANCE)
                    .map_or(UNRANKED, |p| p + 1);
                (rank, rank_color(rank, ranking.len()))
            } else {
                (UNRANKED, color_ranking::NO_DATA)
            };

            RankedCell {
                level_id: level.id,
                category_id: category.id,
                cell_id: sentiment_cell_id(i + 1).unwrap_or_default(),
                score,
                count,
                rank,
                color: color.to_string(),
                level_name: level.name.to_string(),
                category_name: category.name.to_string(),
                description: format!(
                    "{} × {}: {}",
                    level.name, category.name, level.description
                ),
            }
        })
        .collect();

    let overall_average = mean(ranking.iter().copied()).unwrap_or(0.0);
    let variance = mean(ranking.iter().map(|s| (s - overall_average).powi(2))).unwrap_or(0.0);

    let mut row_averages = [0.0; 5];
    let mut column_averages = [0.0; 5];
    for (i, slot) in row_averages.iter_mut().enumerate() {
        *slot = mean(
            cells
                .iter()
                .filter(|c| c.has_data() && usize::from(c.level_id) == i + 1)
                .map(|c| c.score),
        )
        .unwrap_or(0.0);
    }
    for (i, slot) in column_averages.iter_mut().enumerate() {
        *slot = mean(
            cells
                .iter()
                .filter(|c| c.has_data() && usize::from(c.category_id) == i + 1)
                .map(|c| c.score),
        )
        .unwrap_or(0.0);
    }

    RankedHeatmap {
        cells,
        stats: SentimentStats {
            overall_average,
            standard_deviation: variance.sqrt(),
            total_respondents: filtered.len(),
            row_averages,
            column_averages,
        },
    }
}

fn cells_with_data_sorted(cells: &[RankedCell], descending: bool) -> Vec<&RankedCell> {
    let mut with_data: Vec<&RankedCell> = cells.iter().filter(|c| c.has_data()).collect();
    with_data.sort_by(|a, b| {
        let ord = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    with_data
}

/// The `count` lowest scoring cells that have data.
pub fn get_lowest_scoring_cells(cells: &[RankedCell], count: usize) -> Vec<&RankedCell> {
    let mut lowest = cells_with_data_sorted(cells, false);
    lowest.truncate(count);
    lowest
}

/// The `count` highest scoring cells that have data.
pub fn get_highest_scoring_cells(cells: &[RankedCell], count: usize) -> Vec<&RankedCell> {
    let mut highest = cells_with_data_sorted(cells, true);
    highest.truncate(count);
    highest
}

/// Colour for `score` relative to a set of scores, lowest being best.
///
/// Used when scores arrive without a precomputed rank.
pub fn get_ranked_color(score: f64, all_scores: &[f64]) -> &'static str {
    let mut sorted: Vec<f64> = all_scores.iter().copied().filter(|s| s.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return color_ranking::NO_DATA;
    };

    let from_bottom = |n: usize| {
        sorted
            .len()
            .checked_sub(n)
            .and_then(|i| sorted.get(i).copied())
            .unwrap_or(first)
    };

    let top3 = sorted.get(2).copied().unwrap_or(last);
    let top8 = sorted.get(7).copied().unwrap_or(last);
    let bottom3 = from_bottom(3);
    let bottom8 = from_bottom(8);

    if score <= top3 {
        color_ranking::TOP_3
    } else if score <= top8 {
        color_ranking::TOP_8
    } else if score >= bottom3 {
        color_ranking::BOTTOM_3
    } else if score >= bottom8 {
        color_ranking::BOTTOM_8
    } else {
        color_ranking::MIDDLE
    }
}

/// Position of a dimension relative to its benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Above,
    At,
    Below,
    SignificantlyBelow,
}

impl DimensionStatus {
    /// Classify `average - benchmark`.
    pub fn from_gap(gap: f64) -> Self {
        if gap > 0.5 {
            DimensionStatus::Above
        } else if gap < -1.0 {
            DimensionStatus::SignificantlyBelow
        } else if gap < -0.3 {
            DimensionStatus::Below
        } else {
            DimensionStatus::At
        }
    }
}

impl DimensionStatus {
    /// Badge used in Markdown reports.
    pub fn emoji(&self) -> &'static str {
        match self {
            DimensionStatus::Above => "🟢",
            DimensionStatus::At => "🟡",
            DimensionStatus::Below => "🟠",
            DimensionStatus::SignificantlyBelow => "🔴",
        }
    }
}

impl fmt::Display for DimensionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DimensionStatus::Above => "above",
            DimensionStatus::At => "at",
            DimensionStatus::Below => "below",
            DimensionStatus::SignificantlyBelow => "significantly below",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructScore {
    pub construct_id: u8,
    pub name: String,
    /// Mean over respondents, 0 when nobody answered.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension_id: u8,
    pub name: String,
    pub description: String,
    /// Mean of the non-zero construct means.
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub spread: f64,
    pub benchmark: f64,
    pub status: DimensionStatus,
    pub constructs: Vec<ConstructScore>,
}

impl DimensionScore {
    pub fn gap(&self) -> f64 {
        self.average - self.benchmark
    }

    pub fn has_data(&self) -> bool {
        self.average > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallCapability {
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest: Option<DimensionScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest: Option<DimensionScore>,
    /// Dimension with the widest construct spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biggest_gap: Option<DimensionScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOverview {
    pub dimensions: Vec<DimensionScore>,
    pub overall: OverallCapability,
}

/// Best dimension under `better`; the earliest wins ties.
fn pick<'a, F>(dimensions: &[&'a DimensionScore], better: F) -> Option<&'a DimensionScore>
where
    F: Fn(&DimensionScore, &DimensionScore) -> bool,
{
    let (first, rest) = dimensions.split_first()?;
    Some(
        rest.iter()
            .fold(*first, |best, d| if better(d, best) { *d } else { best }),
    )
}

/// Assess every dimension against `benchmarks` (dimension id to score).
///
/// Dimensions missing from `benchmarks` are compared against 0.
pub fn calculate_capability_assessment(
    records: &[CapabilityResponse],
    benchmarks: &DimensionMap,
    filters: &FilterState,
) -> CapabilityOverview {
    let filtered = filter_responses(records, filters);
    if filtered.is_empty() {
        return CapabilityOverview::default();
    }

    let dimensions: Vec<DimensionScore> = CAPABILITY_DIMENSIONS
        .iter()
        .map(|dim| {
            let constructs: Vec<ConstructScore> = constructs_for_dimension(dim.id)
                .map(|construct| ConstructScore {
                    construct_id: construct.id,
                    name: construct.name.to_string(),
                    score: mean(
                        filtered
                            .iter()
                            .filter_map(|r| r.score_by_construct_id(construct.id)),
                    )
                    .unwrap_or(0.0),
                    benchmark: None,
                })
                .collect();

            let valid: Vec<f64> = constructs
                .iter()
                .map(|c| c.score)
                .filter(|s| *s > 0.0)
                .collect();
            let average = mean(valid.iter().copied()).unwrap_or(0.0);
            let (max, min) = if valid.is_empty() {
                (0.0, 0.0)
            } else {
                (
                    valid.iter().copied().fold(f64::MIN, f64::max),
                    valid.iter().copied().fold(f64::MAX, f64::min),
                )
            };
            let benchmark = benchmarks.get(&dim.id).copied().unwrap_or(0.0);

            DimensionScore {
                dimension_id: dim.id,
                name: dim.name.to_string(),
                description: dim.description.to_string(),
                average,
                max,
                min,
                spread: max - min,
                benchmark,
                status: DimensionStatus::from_gap(average - benchmark),
                constructs,
            }
        })
        .collect();

    let valid: Vec<&DimensionScore> = dimensions.iter().filter(|d| d.has_data()).collect();
    let overall = OverallCapability {
        average: mean(valid.iter().map(|d| d.average)).unwrap_or(0.0),
        highest: pick(&valid, |a, b| a.average > b.average).cloned(),
        lowest: pick(&valid, |a, b| a.average < b.average).cloned(),
        biggest_gap: pick(&valid, |a, b| a.spread > b.spread).cloned(),
    };

    CapabilityOverview {
        dimensions,
        overall,
    }
}

/// Dimensions with data, furthest below their benchmark first.
pub fn get_weakest_dimensions(dimensions: &[DimensionScore], count: usize) -> Vec<&DimensionScore> {
    let mut weakest: Vec<&DimensionScore> = dimensions.iter().filter(|d| d.has_data()).collect();
    weakest.sort_by(|a, b| a.gap().partial_cmp(&b.gap()).unwrap_or(Ordering::Equal));
    weakest.truncate(count);
    weakest
}

/// A construct together with the dimension it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeakConstruct<'a> {
    pub dimension_name: &'a str,
    pub construct: &'a ConstructScore,
}

/// Lowest scoring constructs with data across all dimensions.
pub fn get_weakest_constructs(
    dimensions: &[DimensionScore],
    count: usize,
) -> Vec<WeakConstruct<'_>> {
    let mut constructs: Vec<WeakConstruct<'_>> = dimensions
        .iter()
        .flat_map(|d| {
            d.constructs.iter().map(move |c| WeakConstruct {
                dimension_name: &d.name,
                construct: c,
            })
        })
        .filter(|w| w.construct.score > 0.0)
        .collect();
    constructs.sort_by(|a, b| {
        a.construct
            .score
            .partial_cmp(&b.construct.score)
            .unwrap_or(Ordering::Equal)
    });
    constructs.truncate(count);
    constructs
}
