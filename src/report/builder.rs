//! Runs every aggregation over a dataset and collects the results.

use crate::analysis::{
    calculate_capability_assessment, calculate_capability_benchmark,
    calculate_capability_benchmark_from_scores, calculate_capability_dimensions,
    calculate_construct_details, calculate_ranked_heatmap, calculate_readiness_score,
    calculate_sentiment_benchmark, calculate_sentiment_heatmap, filter_responses,
    format_number, get_highest_scoring_cells, get_lowest_scoring_cells,
    get_strongest_capabilities, get_top_sentiment_issues, get_weakest_capabilities,
    get_weakest_constructs, get_weakest_dimensions,
    BenchmarkFilters, CapabilityBenchmarkFilters, DimensionMap, RankedCell,
};
use crate::constants::{dimension_by_key, CAPABILITY_DIMENSIONS, PLACEHOLDER_BENCHMARK};
use crate::dataset::Dataset;
use crate::models::{
    Benchmarks, CapabilityResponse, FilterState, Highlights, Report, ReportMetadata,
};
use tracing::{debug, warn};

/// What a report is computed from.
pub struct ReportInput<'a> {
    /// Records the report describes (one company, or everything).
    pub subject: &'a Dataset,
    /// Benchmark population; only set for company-scoped runs.
    pub population: Option<&'a Dataset>,
    pub filters: &'a FilterState,
    /// Dimension keys to break down into constructs.
    pub detail_dimensions: &'a [String],
    /// Length of each highlight list.
    pub highlight_limit: usize,
}

fn benchmark_filters(filters: &FilterState) -> BenchmarkFilters {
    BenchmarkFilters {
        region: filters.region.clone(),
        department: filters.department.clone(),
        industry: None,
    }
}

fn calculate_benchmarks(
    subject: &Dataset,
    population: &Dataset,
    subject_capability: &[CapabilityResponse],
    filters: &FilterState,
) -> Benchmarks {
    let sentiment = (!population.sentiment.is_empty()).then(|| {
        calculate_sentiment_benchmark(
            &population.sentiment,
            &subject.sentiment,
            &benchmark_filters(filters),
        )
    });

    let capability = if !population.capability.is_empty() {
        Some(calculate_capability_benchmark(
            &population.capability,
            subject_capability,
            &benchmark_filters(filters),
        ))
    } else if !population.scores.is_empty() {
        let long_filters = CapabilityBenchmarkFilters {
            region: filters.region.clone(),
            ..Default::default()
        };
        Some(calculate_capability_benchmark_from_scores(
            &population.scores,
            &subject.scores,
            &long_filters,
        ))
    } else {
        None
    };

    Benchmarks {
        sentiment,
        capability,
    }
}

fn describe_cell(cell: &RankedCell) -> String {
    format!(
        "{} {} ({})",
        cell.cell_id,
        cell.description,
        format_number(cell.score, 2)
    )
}

/// Open feedback texts from capability rows that pass the filters.
pub fn collect_feedback(records: &[CapabilityResponse], filters: &FilterState) -> Vec<String> {
    filter_responses(records, filters)
        .into_iter()
        .filter_map(|r| r.open_feedback.clone())
        .filter(|f| !f.trim().is_empty())
        .collect()
}

/// Compute every section of the report. Insights are added by the caller.
pub fn build_report(input: &ReportInput<'_>, mut metadata: ReportMetadata) -> Report {
    let filters = input.filters;
    let capability = input.subject.capability_records();

    let sentiment_rows: Vec<_> = filter_responses(&input.subject.sentiment, filters)
        .into_iter()
        .cloned()
        .collect();
    let capability_rows: Vec<_> = filter_responses(&capability, filters)
        .into_iter()
        .cloned()
        .collect();
    metadata.sentiment_respondents = sentiment_rows.len();
    metadata.capability_respondents = capability_rows.len();
    metadata.filters = filters.clone();

    let mut report = Report::new(metadata);
    report.readiness_score = calculate_readiness_score(&sentiment_rows, &capability_rows);
    report.heatmap = calculate_sentiment_heatmap(&input.subject.sentiment, filters);
    report.ranked_heatmap = calculate_ranked_heatmap(&input.subject.sentiment, filters);
    report.dimensions = calculate_capability_dimensions(&capability, filters);

    for key in input.detail_dimensions {
        if dimension_by_key(key).is_none() {
            warn!("Unknown capability dimension '{}'", key);
        }
        report.construct_details.insert(
            key.clone(),
            calculate_construct_details(&capability, key, filters),
        );
    }

    if let Some(population) = input.population {
        report.benchmarks = calculate_benchmarks(input.subject, population, &capability, filters);
    }

    let dimension_benchmarks: DimensionMap = match &report.benchmarks.capability {
        Some(benchmark) => benchmark.dimension_averages.clone(),
        None => CAPABILITY_DIMENSIONS
            .iter()
            .map(|d| (d.id, PLACEHOLDER_BENCHMARK))
            .collect(),
    };
    report.assessment =
        calculate_capability_assessment(&capability, &dimension_benchmarks, filters);

    let limit = input.highlight_limit;
    report.highlights = Highlights {
        top_sentiment_issues: get_top_sentiment_issues(&report.heatmap, limit),
        weakest_capabilities: get_weakest_capabilities(&report.dimensions, limit),
        strongest_capabilities: get_strongest_capabilities(&report.dimensions, limit),
        lowest_cells: get_lowest_scoring_cells(&report.ranked_heatmap.cells, limit)
            .into_iter()
            .map(describe_cell)
            .collect(),
        highest_cells: get_highest_scoring_cells(&report.ranked_heatmap.cells, limit)
            .into_iter()
            .map(describe_cell)
            .collect(),
        largest_gaps: get_weakest_dimensions(&report.assessment.dimensions, limit)
            .into_iter()
            .map(|d| {
                format!(
                    "{}: {} vs {} ({})",
                    d.name,
                    format_number(d.average, 2),
                    format_number(d.benchmark, 2),
                    d.status
                )
            })
            .collect(),
        weakest_constructs: get_weakest_constructs(&report.assessment.dimensions, limit)
            .into_iter()
            .map(|w| {
                format!(
                    "{}: {} ({})",
                    w.dimension_name,
                    w.construct.name,
                    format_number(w.construct.score, 2)
                )
            })
            .collect(),
    };

    debug!(
        "Built report: readiness {}, {} heatmap cells, {} dimensions",
        report.readiness_score,
        report.heatmap.len(),
        report.dimensions.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Demographics, SentimentReason, SentimentResponse};
    use chrono::Utc;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            generated_at: Utc::now(),
            sources: vec!["sentiment.json".to_string()],
            company_id: None,
            filters: FilterState::default(),
            sentiment_respondents: 0,
            capability_respondents: 0,
            duration_seconds: 0.0,
        }
    }

    fn sentiment(company: &str, region: &str, level: u8, score: f64) -> SentimentResponse {
        SentimentResponse {
            response_id: format!("{}-{}", company, level),
            company_id: Some(company.to_string()),
            demographics: Demographics {
                region: Some(region.to_string()),
                ..Default::default()
            },
            sentiment_level: Some(level),
            sentiment_reason: Some(SentimentReason::R1),
            scores: [Some(score); 25],
        }
    }

    fn capability(company: &str, score: f64) -> CapabilityResponse {
        CapabilityResponse {
            response_id: company.to_string(),
            company_id: Some(company.to_string()),
            scores: [[Some(score); 4]; 8],
            open_feedback: Some(format!("{} wants training", company)),
            ..Default::default()
        }
    }

    fn population() -> Dataset {
        Dataset {
            sentiment: vec![
                sentiment("acme", "North", 4, 2.0),
                sentiment("globex", "South", 2, 4.0),
            ],
            capability: vec![capability("acme", 4.0), capability("globex", 2.0)],
            scores: Vec::new(),
        }
    }

    #[test]
    fn test_build_report_without_company() {
        let dataset = population();
        let detail = vec!["data".to_string()];
        let input = ReportInput {
            subject: &dataset,
            population: None,
            filters: &FilterState::default(),
            detail_dimensions: &detail,
            highlight_limit: 3,
        };
        let report = build_report(&input, metadata());

        assert_eq!(report.metadata.sentiment_respondents, 2);
        assert_eq!(report.heatmap.len(), 25);
        assert_eq!(report.ranked_heatmap.cells.len(), 25);
        assert_eq!(report.dimensions.len(), 8);
        assert_eq!(report.construct_details["data"].len(), 4);
        assert!(report.benchmarks.is_empty());
        // sentiment average 3, capability average 3
        assert_eq!(report.readiness_score, 60.0);
        assert_eq!(report.assessment.dimensions[0].benchmark, PLACEHOLDER_BENCHMARK);
        assert_eq!(report.highlights.top_sentiment_issues.len(), 1);
        assert_eq!(report.highlights.highest_cells.len(), 3);
        assert_eq!(report.highlights.largest_gaps.len(), 3);
        assert!(report.highlights.largest_gaps[0].contains("vs 3.50"));
    }

    #[test]
    fn test_build_report_for_company_has_benchmarks() {
        let dataset = population();
        let acme = dataset.for_company("acme");
        let input = ReportInput {
            subject: &acme,
            population: Some(&dataset),
            filters: &FilterState::default(),
            detail_dimensions: &[],
            highlight_limit: 3,
        };
        let report = build_report(&input, metadata());

        let sentiment = report.benchmarks.sentiment.as_ref().unwrap();
        assert_eq!(sentiment.company_score, 2.0);
        assert_eq!(sentiment.percentile, 50);

        let capability = report.benchmarks.capability.as_ref().unwrap();
        assert_eq!(capability.company_scores[&1], 4.0);
        assert_eq!(capability.dimension_averages[&1], 3.0);
        assert_eq!(report.assessment.dimensions[0].benchmark, 3.0);
    }

    #[test]
    fn test_filters_narrow_respondent_counts() {
        let dataset = population();
        let filters = FilterState {
            region: Some("North".to_string()),
            ..Default::default()
        };
        let input = ReportInput {
            subject: &dataset,
            population: None,
            filters: &filters,
            detail_dimensions: &[],
            highlight_limit: 3,
        };
        let report = build_report(&input, metadata());
        assert_eq!(report.metadata.sentiment_respondents, 1);
        // capability rows carry no region
        assert_eq!(report.metadata.capability_respondents, 0);
        assert_eq!(report.metadata.filters, filters);
    }

    #[test]
    fn test_collect_feedback() {
        let mut records = vec![capability("acme", 4.0), capability("globex", 2.0)];
        records[1].open_feedback = Some("  ".to_string());
        let feedback = collect_feedback(&records, &FilterState::default());
        assert_eq!(feedback, vec!["acme wants training".to_string()]);
    }
}
