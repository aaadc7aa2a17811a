//! Data models for the readiness survey.
//!
//! This module contains the canonical record shapes produced by the dataset
//! adapter, the filter state applied to them, the derived value objects
//! that the aggregation functions return, and the report they end up in.

use crate::analysis::benchmark::{CapabilityBenchmark, SentimentBenchmark};
use crate::analysis::ranking::{CapabilityOverview, RankedHeatmap};
use crate::constants::CAPABILITY_DIMENSIONS;
use crate::insights::Insight;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Resistance reason, the column coordinate of the sentiment heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentReason {
    R1,
    R2,
    R3,
    R4,
    R5,
}

impl SentimentReason {
    pub const ALL: [SentimentReason; 5] = [
        SentimentReason::R1,
        SentimentReason::R2,
        SentimentReason::R3,
        SentimentReason::R4,
        SentimentReason::R5,
    ];

    /// Zero-based column index.
    pub fn index(self) -> usize {
        match self {
            SentimentReason::R1 => 0,
            SentimentReason::R2 => 1,
            SentimentReason::R3 => 2,
            SentimentReason::R4 => 3,
            SentimentReason::R5 => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human readable reason, e.g. "Fear of Job Loss".
    pub fn label(self) -> &'static str {
        crate::constants::SENTIMENT_REASONS[self.index()]
    }
}

impl fmt::Display for SentimentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.index() + 1)
    }
}

/// Categorical attributes used purely as filter and slicing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
}

impl Demographics {
    /// Value of a filterable attribute.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        let value = match key {
            FilterKey::Region => &self.region,
            FilterKey::Department => &self.department,
            FilterKey::Function => &self.function,
            FilterKey::AgeGroup => &self.age_group,
            FilterKey::BusinessUnit => &self.business_unit,
            FilterKey::Role => &self.role,
        };
        value.as_deref()
    }
}

/// Attribute names a [`FilterState`] can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Region,
    Department,
    Function,
    AgeGroup,
    BusinessUnit,
    Role,
}

impl FilterKey {
    pub const ALL: [FilterKey; 6] = [
        FilterKey::Region,
        FilterKey::Department,
        FilterKey::Function,
        FilterKey::AgeGroup,
        FilterKey::BusinessUnit,
        FilterKey::Role,
    ];
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKey::Region => "region",
            FilterKey::Department => "department",
            FilterKey::Function => "function",
            FilterKey::AgeGroup => "age_group",
            FilterKey::BusinessUnit => "business_unit",
            FilterKey::Role => "role",
        };
        f.write_str(name)
    }
}

/// Records that can be narrowed by a [`FilterState`].
pub trait Filterable {
    fn attribute(&self, key: FilterKey) -> Option<&str>;
}

/// Sparse mapping of attribute to required value.
///
/// A missing or empty value places no constraint on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl FilterState {
    /// Required value for `key`, if the filter constrains it.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        let value = match key {
            FilterKey::Region => &self.region,
            FilterKey::Department => &self.department,
            FilterKey::Function => &self.function,
            FilterKey::AgeGroup => &self.age_group,
            FilterKey::BusinessUnit => &self.business_unit,
            FilterKey::Role => &self.role,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// All active constraints in a fixed key order.
    pub fn constraints(&self) -> impl Iterator<Item = (FilterKey, &str)> + '_ {
        FilterKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.constraints().next().is_none()
    }

    /// Does the record satisfy every active constraint?
    pub fn matches<T: Filterable + ?Sized>(&self, record: &T) -> bool {
        self.constraints()
            .all(|(key, value)| record.attribute(key) == Some(value))
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merged_with(&self, other: &FilterState) -> FilterState {
        FilterState {
            region: other.region.clone().or_else(|| self.region.clone()),
            department: other.department.clone().or_else(|| self.department.clone()),
            function: other.function.clone().or_else(|| self.function.clone()),
            age_group: other.age_group.clone().or_else(|| self.age_group.clone()),
            business_unit: other
                .business_unit
                .clone()
                .or_else(|| self.business_unit.clone()),
            role: other.role.clone().or_else(|| self.role.clone()),
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let parts: Vec<String> = self
            .constraints()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// One survey respondent's sentiment answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub response_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(flatten)]
    pub demographics: Demographics,
    /// Readiness level 1-5, the row coordinate of the heatmap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_reason: Option<SentimentReason>,
    /// Per-question scores `sentiment_1..sentiment_25`.
    pub scores: [Option<f64>; 25],
}

impl SentimentResponse {
    /// Heatmap coordinate, if both level and reason are valid.
    pub fn coordinate(&self) -> Option<(u8, SentimentReason)> {
        let level = self.sentiment_level.filter(|l| (1..=5).contains(l))?;
        Some((level, self.sentiment_reason?))
    }

    /// Score for a 1-based question number.
    pub fn question_score(&self, question: usize) -> Option<f64> {
        question
            .checked_sub(1)
            .and_then(|i| self.scores.get(i).copied().flatten())
            .filter(|s| s.is_finite())
    }
}

impl Filterable for SentimentResponse {
    fn attribute(&self, key: FilterKey) -> Option<&str> {
        self.demographics.get(key)
    }
}

/// One respondent's capability answers in wide format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResponse {
    pub response_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(flatten)]
    pub demographics: Demographics,
    /// Construct scores indexed `[dimension][construct]` in table order.
    pub scores: [[Option<f64>; 4]; 8],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_feedback: Option<String>,
}

impl CapabilityResponse {
    /// Score of construct `position` (0-3) inside dimension `dimension` (0-7).
    pub fn construct_score(&self, dimension: usize, position: usize) -> Option<f64> {
        self.scores
            .get(dimension)
            .and_then(|d| d.get(position))
            .copied()
            .flatten()
            .filter(|s| s.is_finite())
    }

    /// Score by global construct id (1-32).
    pub fn score_by_construct_id(&self, construct_id: u8) -> Option<f64> {
        let (dimension, position) = construct_position(construct_id)?;
        self.construct_score(dimension, position)
    }

    /// Set a score by global construct id. Ids outside 1-32 are ignored.
    pub fn set_construct(&mut self, construct_id: u8, score: Option<f64>) {
        if let Some((dimension, position)) = construct_position(construct_id) {
            self.scores[dimension][position] = score;
        }
    }
}

impl Filterable for CapabilityResponse {
    fn attribute(&self, key: FilterKey) -> Option<&str> {
        self.demographics.get(key)
    }
}

/// Map a construct id (1-32) to `(dimension index, position)`.
pub fn construct_position(construct_id: u8) -> Option<(usize, usize)> {
    if !(1..=32).contains(&construct_id) {
        return None;
    }
    let zero_based = usize::from(construct_id - 1);
    Some((zero_based / 4, zero_based % 4))
}

/// One (respondent, construct) score in long format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityScore {
    pub respondent_id: String,
    pub company_id: String,
    pub dimension_id: u8,
    pub construct_id: u8,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_synthetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_synthetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent_synthetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_synthetic: Option<String>,
}

impl Filterable for CapabilityScore {
    fn attribute(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Region => self.country_synthetic.as_deref(),
            FilterKey::Role => self.role_synthetic.as_deref(),
            _ => None,
        }
    }
}

/// One cell of the 5x5 sentiment heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Reason column, 0-4.
    pub x: usize,
    /// Grid row, 0-4; row 0 holds level 5.
    pub y: usize,
    /// Mean sentiment level, 0 when `count` is 0.
    pub value: f64,
    pub count: usize,
    pub label: String,
    pub description: String,
    pub color: String,
}

impl HeatmapCell {
    /// Readiness level (1-5) this cell represents.
    pub fn level(&self) -> usize {
        5 - self.y
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Gap of a construct average against fixed reference points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub vs_average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_benchmark: Option<f64>,
}

/// Summary of a single construct inside a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityConstruct {
    pub construct_id: String,
    pub name: String,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_score: Option<f64>,
    pub gap_analysis: GapAnalysis,
}

/// Summary of one capability dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDimension {
    pub dimension_id: String,
    pub name: String,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Fixed placeholder; population benchmarks come from `analysis::benchmark`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_score: Option<f64>,
    pub constructs: Vec<CapabilityConstruct>,
}

impl CapabilityDimension {
    /// Radar chart colour for this dimension.
    pub fn color(&self) -> &'static str {
        CAPABILITY_DIMENSIONS
            .iter()
            .find(|d| d.key == self.dimension_id)
            .map(|d| d.color)
            .unwrap_or("#6B7280")
    }
}

/// Whether a bigger number is a better result for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    HigherIsBetter,
    LowerIsBetter,
}

impl MetricDirection {
    /// Is `peer` strictly worse than `subject`?
    pub fn is_worse(self, peer: f64, subject: f64) -> bool {
        match self {
            MetricDirection::HigherIsBetter => peer < subject,
            MetricDirection::LowerIsBetter => peer > subject,
        }
    }
}

/// The kind of score being ranked; fixes its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Sentiment scores measure resistance; lower is better.
    Sentiment,
    /// Capability scores measure maturity; higher is better.
    Capability,
}

impl MetricKind {
    pub fn direction(self) -> MetricDirection {
        match self {
            MetricKind::Sentiment => MetricDirection::LowerIsBetter,
            MetricKind::Capability => MetricDirection::HigherIsBetter,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Sentiment => write!(f, "Sentiment"),
            MetricKind::Capability => write!(f, "Capability"),
        }
    }
}

/// Metadata about a readiness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Input files the records were read from.
    pub sources: Vec<String>,
    /// Company the report is scoped to; benchmarks need one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub filters: FilterState,
    /// Sentiment respondents left after filtering.
    pub sentiment_respondents: usize,
    /// Capability respondents left after filtering.
    pub capability_respondents: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Short lists of what stands out, for the report summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub top_sentiment_issues: Vec<String>,
    pub weakest_capabilities: Vec<String>,
    pub strongest_capabilities: Vec<String>,
    /// Lowest question cells as `L{level}_C{category}` with their score.
    pub lowest_cells: Vec<String>,
    pub highest_cells: Vec<String>,
    /// Dimensions furthest below their benchmark.
    pub largest_gaps: Vec<String>,
    pub weakest_constructs: Vec<String>,
}

/// Population comparisons, present only for company-scoped runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentBenchmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityBenchmark>,
}

impl Benchmarks {
    pub fn is_empty(&self) -> bool {
        self.sentiment.is_none() && self.capability.is_none()
    }
}

/// The complete readiness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Combined score on a 0-100 scale.
    pub readiness_score: f64,
    pub heatmap: Vec<HeatmapCell>,
    pub ranked_heatmap: RankedHeatmap,
    pub dimensions: Vec<CapabilityDimension>,
    /// Construct breakdown keyed by dimension key.
    pub construct_details: BTreeMap<String, Vec<CapabilityConstruct>>,
    pub assessment: CapabilityOverview,
    pub highlights: Highlights,
    #[serde(default, skip_serializing_if = "Benchmarks::is_empty")]
    pub benchmarks: Benchmarks,
    pub insights: Vec<Insight>,
}

impl Report {
    /// Creates an empty report with the given metadata.
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            readiness_score: 0.0,
            heatmap: Vec::new(),
            ranked_heatmap: RankedHeatmap::default(),
            dimensions: Vec::new(),
            construct_details: BTreeMap::new(),
            assessment: CapabilityOverview::default(),
            highlights: Highlights::default(),
            benchmarks: Benchmarks::default(),
            insights: Vec::new(),
        }
    }

    pub fn has_sentiment(&self) -> bool {
        self.metadata.sentiment_respondents > 0
    }

    pub fn has_capability(&self) -> bool {
        self.metadata.capability_respondents > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_region(region: Option<&str>) -> SentimentResponse {
        SentimentResponse {
            response_id: "r".to_string(),
            demographics: Demographics {
                region: region.map(String::from),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_reason_index_round_trip() {
        for (i, reason) in SentimentReason::ALL.iter().enumerate() {
            assert_eq!(reason.index(), i);
            assert_eq!(SentimentReason::from_index(i), Some(*reason));
        }
        assert_eq!(SentimentReason::from_index(5), None);
        assert_eq!(SentimentReason::R3.to_string(), "R3");
        assert_eq!(SentimentReason::R1.label(), "Fear of Job Loss");
    }

    #[test]
    fn test_empty_filter_values_are_ignored() {
        let filters = FilterState {
            region: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert!(filters.matches(&with_region(None)));
    }

    #[test]
    fn test_filter_matching_is_exact() {
        let filters = FilterState {
            region: Some("North".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&with_region(Some("North"))));
        assert!(!filters.matches(&with_region(Some("north"))));
        assert!(!filters.matches(&with_region(None)));
    }

    #[test]
    fn test_filter_merge_prefers_override() {
        let base = FilterState {
            region: Some("North".to_string()),
            department: Some("Finance".to_string()),
            ..Default::default()
        };
        let overlay = FilterState {
            region: Some("South".to_string()),
            ..Default::default()
        };
        let merged = base.merged_with(&overlay);
        assert_eq!(merged.region.as_deref(), Some("South"));
        assert_eq!(merged.department.as_deref(), Some("Finance"));
        assert_eq!(merged.to_string(), "region=South, department=Finance");
        assert_eq!(FilterState::default().to_string(), "none");
    }

    #[test]
    fn test_coordinate_requires_both_parts() {
        let mut record = with_region(None);
        assert_eq!(record.coordinate(), None);
        record.sentiment_level = Some(3);
        assert_eq!(record.coordinate(), None);
        record.sentiment_reason = Some(SentimentReason::R2);
        assert_eq!(record.coordinate(), Some((3, SentimentReason::R2)));
        record.sentiment_level = Some(6);
        assert_eq!(record.coordinate(), None);
    }

    #[test]
    fn test_construct_position() {
        assert_eq!(construct_position(1), Some((0, 0)));
        assert_eq!(construct_position(8), Some((1, 3)));
        assert_eq!(construct_position(32), Some((7, 3)));
        assert_eq!(construct_position(0), None);
        assert_eq!(construct_position(33), None);

        let mut record = CapabilityResponse::default();
        record.set_construct(6, Some(4.0));
        assert_eq!(record.construct_score(1, 1), Some(4.0));
        assert_eq!(record.score_by_construct_id(6), Some(4.0));
        record.set_construct(7, Some(f64::NAN));
        assert_eq!(record.score_by_construct_id(7), None);
    }

    #[test]
    fn test_metric_direction() {
        assert_eq!(
            MetricKind::Sentiment.direction(),
            MetricDirection::LowerIsBetter
        );
        assert!(MetricDirection::LowerIsBetter.is_worse(4.0, 3.0));
        assert!(MetricDirection::HigherIsBetter.is_worse(2.0, 3.0));
        assert!(!MetricDirection::HigherIsBetter.is_worse(3.0, 3.0));
    }
}
