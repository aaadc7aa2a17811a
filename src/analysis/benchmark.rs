//! Cross-company benchmarks.
//!
//! A benchmark compares one company's scores with a population of
//! respondents from many companies. Each company in the population is
//! aggregated the same way as the subject and the subject is ranked
//! against those per-company values.

use crate::analysis::aggregator::mean;
use crate::constants::{sentiment_cell_id, CAPABILITY_DIMENSIONS, SENTIMENT_QUESTION_COUNT};
use crate::models::{
    CapabilityResponse, CapabilityScore, Demographics, MetricKind, SentimentResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile reported when there are no peers to rank against.
pub const NEUTRAL_PERCENTILE: u8 = 50;

/// Share of peers (0-100) that the subject strictly outperforms.
///
/// Ties are never counted as outperformed.
pub fn calculate_percentile(score: f64, peers: &[f64], kind: MetricKind) -> u8 {
    if peers.is_empty() {
        return NEUTRAL_PERCENTILE;
    }

    let direction = kind.direction();
    let worse = peers
        .iter()
        .filter(|peer| direction.is_worse(**peer, score))
        .count();

    ((worse as f64 / peers.len() as f64) * 100.0).round() as u8
}

fn slice_matches(required: &Option<String>, actual: &Option<String>) -> bool {
    match required.as_deref().filter(|v| !v.is_empty()) {
        Some(required) => actual.as_deref() == Some(required),
        None => true,
    }
}

/// Population slice for the wide-format benchmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl BenchmarkFilters {
    fn allows(&self, demographics: &Demographics) -> bool {
        slice_matches(&self.region, &demographics.region)
            && slice_matches(&self.department, &demographics.department)
            && slice_matches(&self.industry, &demographics.industry)
    }
}

/// Population slice for the long-format capability benchmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityBenchmarkFilters {
    /// Matched against `country_synthetic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
}

impl CapabilityBenchmarkFilters {
    fn allows(&self, score: &CapabilityScore) -> bool {
        slice_matches(&self.region, &score.country_synthetic)
            && slice_matches(&self.industry, &score.industry_synthetic)
            && slice_matches(&self.continent, &score.continent_synthetic)
    }
}

/// Sentiment comparison of one company against the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBenchmark {
    pub overall_average: f64,
    /// Population mean per grid cell, keyed `L{level}_C{category}`.
    pub cell_averages: BTreeMap<String, f64>,
    pub company_score: f64,
    /// Company minus population; negative means less resistance.
    pub company_vs_benchmark: f64,
    pub percentile: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_averages: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_averages: Option<BTreeMap<String, f64>>,
}

impl SentimentBenchmark {
    fn empty() -> Self {
        Self {
            overall_average: 0.0,
            cell_averages: BTreeMap::new(),
            company_score: 0.0,
            company_vs_benchmark: 0.0,
            percentile: NEUTRAL_PERCENTILE,
            region_averages: None,
            department_averages: None,
        }
    }
}

/// Dimension id (1-8) to value.
pub type DimensionMap = BTreeMap<u8, f64>;

/// Capability comparison of one company against the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityBenchmark {
    pub dimension_averages: DimensionMap,
    pub overall_average: f64,
    pub company_scores: DimensionMap,
    /// Company minus population; positive means the company is ahead.
    pub company_vs_benchmark: DimensionMap,
    pub percentiles: BTreeMap<u8, u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_averages: Option<BTreeMap<String, DimensionMap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_averages: Option<BTreeMap<String, DimensionMap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_averages: Option<BTreeMap<String, DimensionMap>>,
}

impl CapabilityBenchmark {
    fn empty() -> Self {
        Self {
            dimension_averages: BTreeMap::new(),
            overall_average: 0.0,
            company_scores: BTreeMap::new(),
            company_vs_benchmark: BTreeMap::new(),
            percentiles: BTreeMap::new(),
            region_averages: None,
            department_averages: None,
            industry_averages: None,
        }
    }
}

/// Group records by a key, keeping first-seen order inside each group.
fn group_by<'a, T, F>(records: &[&'a T], key: F) -> BTreeMap<String, Vec<&'a T>>
where
    F: Fn(&T) -> String,
{
    let mut groups: BTreeMap<String, Vec<&'a T>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(*record);
    }
    groups
}

fn company_key(company_id: &Option<String>) -> String {
    company_id.clone().unwrap_or_default()
}

fn unknown_if_missing(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// Mean of each question's answers across `rows`, `None` for unanswered.
fn question_means(rows: &[&SentimentResponse]) -> Vec<Option<f64>> {
    (1..=SENTIMENT_QUESTION_COUNT)
        .map(|question| mean(rows.iter().filter_map(|r| r.question_score(question))))
        .collect()
}

/// Overall sentiment of a group: mean of its non-empty question means.
fn sentiment_group_score(rows: &[&SentimentResponse]) -> Option<f64> {
    mean(question_means(rows).into_iter().flatten())
}

/// Compare a company's sentiment with the benchmark population.
///
/// Lower sentiment scores mean less resistance and rank better.
pub fn calculate_sentiment_benchmark(
    all: &[SentimentResponse],
    company: &[SentimentResponse],
    filters: &BenchmarkFilters,
) -> SentimentBenchmark {
    let population: Vec<&SentimentResponse> = all
        .iter()
        .filter(|r| filters.allows(&r.demographics))
        .collect();

    if population.is_empty() {
        return SentimentBenchmark::empty();
    }

    let cell_averages: BTreeMap<String, f64> = question_means(&population)
        .into_iter()
        .enumerate()
        .filter_map(|(i, avg)| sentiment_cell_id(i + 1).map(|id| (id, avg.unwrap_or(0.0))))
        .collect();

    let overall_average =
        mean(cell_averages.values().copied().filter(|s| *s > 0.0)).unwrap_or(0.0);

    let company_rows: Vec<&SentimentResponse> = company.iter().collect();
    let company_score = sentiment_group_score(&company_rows).unwrap_or(0.0);

    let peer_scores: Vec<f64> = group_by(&population, |r| company_key(&r.company_id))
        .values()
        .filter_map(|rows| sentiment_group_score(rows))
        .collect();

    let region_averages: BTreeMap<String, f64> =
        group_by(&population, |r| unknown_if_missing(&r.demographics.region))
            .into_iter()
            .filter_map(|(region, rows)| sentiment_group_score(&rows).map(|s| (region, s)))
            .collect();

    let department_averages: BTreeMap<String, f64> =
        group_by(&population, |r| unknown_if_missing(&r.demographics.department))
            .into_iter()
            .filter_map(|(dept, rows)| sentiment_group_score(&rows).map(|s| (dept, s)))
            .collect();

    SentimentBenchmark {
        overall_average,
        cell_averages,
        company_score,
        company_vs_benchmark: company_score - overall_average,
        percentile: calculate_percentile(company_score, &peer_scores, MetricKind::Sentiment),
        region_averages: Some(region_averages),
        department_averages: Some(department_averages),
    }
}

/// Dimension score of a wide-format group: mean of its construct means.
fn wide_dimension_score(rows: &[&CapabilityResponse], constructs: &[u8; 4]) -> Option<f64> {
    mean(
        constructs
            .iter()
            .filter_map(|id| mean(rows.iter().filter_map(|r| r.score_by_construct_id(*id)))),
    )
}

fn wide_dimension_map(rows: &[&CapabilityResponse]) -> DimensionMap {
    CAPABILITY_DIMENSIONS
        .iter()
        .filter_map(|dim| wide_dimension_score(rows, &dim.constructs).map(|s| (dim.id, s)))
        .collect()
}

/// Compare a company's capability with the population (wide format).
///
/// Higher capability scores rank better.
pub fn calculate_capability_benchmark(
    all: &[CapabilityResponse],
    company: &[CapabilityResponse],
    filters: &BenchmarkFilters,
) -> CapabilityBenchmark {
    let population: Vec<&CapabilityResponse> = all
        .iter()
        .filter(|r| filters.allows(&r.demographics))
        .collect();

    if population.is_empty() {
        return CapabilityBenchmark::empty();
    }

    let company_rows: Vec<&CapabilityResponse> = company.iter().collect();
    let companies = group_by(&population, |r| company_key(&r.company_id));

    let mut result = CapabilityBenchmark::empty();
    for dim in &CAPABILITY_DIMENSIONS {
        let benchmark = wide_dimension_score(&population, &dim.constructs).unwrap_or(0.0);
        let company_score = wide_dimension_score(&company_rows, &dim.constructs).unwrap_or(0.0);
        let peers: Vec<f64> = companies
            .values()
            .filter_map(|rows| wide_dimension_score(rows, &dim.constructs))
            .collect();

        result.dimension_averages.insert(dim.id, benchmark);
        result.company_scores.insert(dim.id, company_score);
        result
            .company_vs_benchmark
            .insert(dim.id, company_score - benchmark);
        result.percentiles.insert(
            dim.id,
            calculate_percentile(company_score, &peers, MetricKind::Capability),
        );
    }

    result.overall_average = mean(
        result
            .dimension_averages
            .values()
            .copied()
            .filter(|s| *s > 0.0),
    )
    .unwrap_or(0.0);

    result.region_averages = Some(
        group_by(&population, |r| unknown_if_missing(&r.demographics.region))
            .into_iter()
            .map(|(region, rows)| (region, wide_dimension_map(&rows)))
            .collect(),
    );
    result.department_averages = Some(
        group_by(&population, |r| unknown_if_missing(&r.demographics.department))
            .into_iter()
            .map(|(dept, rows)| (dept, wide_dimension_map(&rows)))
            .collect(),
    );

    result
}

fn long_dimension_average<'a, I>(scores: I, dimension_id: u8) -> Option<f64>
where
    I: IntoIterator<Item = &'a CapabilityScore>,
{
    mean(
        scores
            .into_iter()
            .filter(|s| s.dimension_id == dimension_id && s.score.is_finite())
            .map(|s| s.score),
    )
}

/// Per-slice dimension averages; every dimension gets an entry (0 if empty).
fn long_slice_averages<F>(scores: &[&CapabilityScore], key: F) -> BTreeMap<String, DimensionMap>
where
    F: Fn(&CapabilityScore) -> Option<&str>,
{
    let mut slices: BTreeMap<String, Vec<&CapabilityScore>> = BTreeMap::new();
    for score in scores {
        if let Some(slice) = key(*score).filter(|k| !k.is_empty()) {
            slices.entry(slice.to_string()).or_default().push(*score);
        }
    }

    slices
        .into_iter()
        .map(|(slice, rows)| {
            let averages = CAPABILITY_DIMENSIONS
                .iter()
                .map(|dim| {
                    let avg = long_dimension_average(rows.iter().copied(), dim.id);
                    (dim.id, avg.unwrap_or(0.0))
                })
                .collect();
            (slice, averages)
        })
        .collect()
}

/// Compare a company's capability with the population (long format).
///
/// Each row is one (respondent, construct) score; dimension averages are
/// taken over all rows of that dimension.
pub fn calculate_capability_benchmark_from_scores(
    all: &[CapabilityScore],
    company: &[CapabilityScore],
    filters: &CapabilityBenchmarkFilters,
) -> CapabilityBenchmark {
    let population: Vec<&CapabilityScore> = all.iter().filter(|s| filters.allows(s)).collect();

    if population.is_empty() {
        return CapabilityBenchmark::empty();
    }

    let companies = group_by(&population, |s| s.company_id.clone());

    let mut result = CapabilityBenchmark::empty();
    for dim in &CAPABILITY_DIMENSIONS {
        let benchmark = long_dimension_average(population.iter().copied(), dim.id).unwrap_or(0.0);
        let company_score = long_dimension_average(company, dim.id).unwrap_or(0.0);
        let peers: Vec<f64> = companies
            .values()
            .filter_map(|rows| long_dimension_average(rows.iter().copied(), dim.id))
            .collect();

        result.dimension_averages.insert(dim.id, benchmark);
        result.company_scores.insert(dim.id, company_score);
        result
            .company_vs_benchmark
            .insert(dim.id, company_score - benchmark);
        result.percentiles.insert(
            dim.id,
            calculate_percentile(company_score, &peers, MetricKind::Capability),
        );
    }

    result.overall_average = mean(
        result
            .dimension_averages
            .values()
            .copied()
            .filter(|s| *s > 0.0),
    )
    .unwrap_or(0.0);

    result.region_averages = Some(long_slice_averages(&population, |s| {
        s.country_synthetic.as_deref()
    }));
    result.industry_averages = Some(long_slice_averages(&population, |s| {
        s.industry_synthetic.as_deref()
    }));

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentiment_row(company: &str, region: Option<&str>, score: f64) -> SentimentResponse {
        SentimentResponse {
            response_id: format!("{}-{}", company, score),
            company_id: Some(company.to_string()),
            demographics: Demographics {
                region: region.map(String::from),
                ..Default::default()
            },
            scores: [Some(score); 25],
            ..Default::default()
        }
    }

    fn long_row(company: &str, dimension_id: u8, score: f64) -> CapabilityScore {
        CapabilityScore {
            respondent_id: format!("{}-r", company),
            company_id: company.to_string(),
            dimension_id,
            construct_id: (dimension_id - 1) * 4 + 1,
            score,
            country_synthetic: Some("NL".to_string()),
            industry_synthetic: Some("Finance".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_percentile_bounds_and_direction() {
        let peers = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(calculate_percentile(5.0, &peers, MetricKind::Capability), 100);
        assert_eq!(calculate_percentile(0.5, &peers, MetricKind::Capability), 0);
        assert_eq!(calculate_percentile(0.5, &peers, MetricKind::Sentiment), 100);
        assert_eq!(calculate_percentile(5.0, &peers, MetricKind::Sentiment), 0);
    }

    #[test]
    fn test_percentile_empty_and_ties() {
        assert_eq!(calculate_percentile(3.0, &[], MetricKind::Capability), 50);
        // ties count as neither better nor worse
        assert_eq!(
            calculate_percentile(3.0, &[3.0, 3.0, 1.0, 5.0], MetricKind::Capability),
            25
        );
        assert_eq!(
            calculate_percentile(3.0, &[3.0, 3.0, 1.0, 5.0], MetricKind::Sentiment),
            25
        );
    }

    #[test]
    fn test_percentile_average_company_sits_mid_population() {
        let peers = [1.0, 2.0, 4.0, 5.0];
        assert_eq!(calculate_percentile(3.0, &peers, MetricKind::Capability), 50);
    }

    #[test]
    fn test_sentiment_benchmark_empty_population() {
        let company = vec![sentiment_row("a", None, 2.0)];
        let filters = BenchmarkFilters {
            region: Some("Mars".to_string()),
            ..Default::default()
        };
        let benchmark = calculate_sentiment_benchmark(&company, &company, &filters);
        assert_eq!(benchmark.percentile, 50);
        assert_eq!(benchmark.overall_average, 0.0);
        assert!(benchmark.cell_averages.is_empty());
        assert!(benchmark.region_averages.is_none());
    }

    #[test]
    fn test_sentiment_benchmark_ranks_lower_as_better() {
        let all = vec![
            sentiment_row("a", Some("North"), 2.0),
            sentiment_row("b", Some("North"), 3.0),
            sentiment_row("c", Some("South"), 4.0),
            sentiment_row("d", None, 5.0),
        ];
        let company = vec![all[0].clone()];
        let benchmark = calculate_sentiment_benchmark(&all, &company, &BenchmarkFilters::default());

        assert_eq!(benchmark.cell_averages.len(), 25);
        assert_eq!(benchmark.cell_averages["L1_C1"], 3.5);
        assert_eq!(benchmark.overall_average, 3.5);
        assert_eq!(benchmark.company_score, 2.0);
        assert_eq!(benchmark.company_vs_benchmark, -1.5);
        // three of four companies have more resistance
        assert_eq!(benchmark.percentile, 75);

        let regions = benchmark.region_averages.unwrap();
        assert_eq!(regions["North"], 2.5);
        assert_eq!(regions["Unknown"], 5.0);
    }

    #[test]
    fn test_capability_benchmark_wide() {
        let mut strong = CapabilityResponse {
            company_id: Some("a".to_string()),
            ..Default::default()
        };
        strong.scores[0] = [Some(5.0); 4];
        let mut weak = CapabilityResponse {
            company_id: Some("b".to_string()),
            ..Default::default()
        };
        weak.scores[0] = [Some(1.0); 4];

        let all = vec![strong.clone(), weak];
        let benchmark =
            calculate_capability_benchmark(&all, &[strong], &BenchmarkFilters::default());

        assert_eq!(benchmark.dimension_averages[&1], 3.0);
        assert_eq!(benchmark.company_scores[&1], 5.0);
        assert_eq!(benchmark.company_vs_benchmark[&1], 2.0);
        assert_eq!(benchmark.percentiles[&1], 50);
        // dimensions without data still appear with zeros
        assert_eq!(benchmark.dimension_averages[&8], 0.0);
        assert_eq!(benchmark.percentiles[&8], 50);
        assert_eq!(benchmark.overall_average, 3.0);
    }

    #[test]
    fn test_capability_benchmark_from_scores() {
        let all = vec![
            long_row("a", 2, 4.0),
            long_row("a", 2, 5.0),
            long_row("b", 2, 2.0),
            long_row("c", 2, 3.0),
        ];
        let company: Vec<CapabilityScore> =
            all.iter().filter(|s| s.company_id == "a").cloned().collect();

        let benchmark = calculate_capability_benchmark_from_scores(
            &all,
            &company,
            &CapabilityBenchmarkFilters::default(),
        );

        assert_eq!(benchmark.dimension_averages[&2], 3.5);
        assert_eq!(benchmark.company_scores[&2], 4.5);
        assert_eq!(benchmark.company_vs_benchmark[&2], 1.0);
        // beats b and c, ties with itself
        assert_eq!(benchmark.percentiles[&2], 67);
        assert_eq!(benchmark.dimension_averages.len(), 8);

        let regions = benchmark.region_averages.unwrap();
        assert_eq!(regions["NL"][&2], 3.5);
        assert_eq!(regions["NL"][&1], 0.0);
        assert!(benchmark.industry_averages.unwrap().contains_key("Finance"));
    }

    #[test]
    fn test_capability_benchmark_from_scores_filters() {
        let all = vec![long_row("a", 1, 4.0)];
        let filters = CapabilityBenchmarkFilters {
            continent: Some("Europe".to_string()),
            ..Default::default()
        };
        let benchmark = calculate_capability_benchmark_from_scores(&all, &all, &filters);
        assert!(benchmark.dimension_averages.is_empty());
        assert_eq!(benchmark.overall_average, 0.0);
    }
}
