//! Markdown report generation.
//!
//! This module renders a readiness report as Markdown tables or as
//! pretty-printed JSON.

use crate::analysis::{
    format_number, format_percentage, get_ranked_color, CapabilityBenchmark, RankedHeatmap,
    SentimentBenchmark,
};
use crate::constants::{
    dimension_by_id, dimension_by_key, SENTIMENT_CATEGORIES, SENTIMENT_COLORS,
    SENTIMENT_LEVEL_NAMES,
};
use crate::models::{
    CapabilityConstruct, CapabilityDimension, HeatmapCell, Highlights, Report, ReportMetadata,
    SentimentReason,
};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# AI Readiness Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));
    output.push_str(&generate_summary_section(report.readiness_score, &report.highlights));

    if report.has_sentiment() {
        output.push_str(&generate_heatmap_section(&report.heatmap));
        output.push_str(&generate_ranked_section(&report.ranked_heatmap));
    }

    if report.has_capability() {
        output.push_str(&generate_dimensions_section(&report.dimensions));
        output.push_str(&generate_assessment_section(report));
        output.push_str(&generate_construct_section(&report.construct_details));
    }

    output.push_str(&generate_benchmark_section(
        report.benchmarks.sentiment.as_ref(),
        report.benchmarks.capability.as_ref(),
    ));
    output.push_str(&generate_insights_section(report));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref company) = metadata.company_id {
        section.push_str(&format!("- **Company:** `{}`\n", company));
    }
    if !metadata.sources.is_empty() {
        section.push_str(&format!("- **Sources:** {}\n", metadata.sources.join(", ")));
    }
    section.push_str(&format!("- **Filters:** {}\n", metadata.filters));
    section.push_str(&format!(
        "- **Sentiment Respondents:** {}\n",
        metadata.sentiment_respondents
    ));
    section.push_str(&format!(
        "- **Capability Respondents:** {}\n",
        metadata.capability_respondents
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &Report) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");

    if report.has_sentiment() {
        toc.push_str("- [Sentiment Heatmap](#sentiment-heatmap)\n");
        toc.push_str("- [Question Grid](#question-grid)\n");
    }
    if report.has_capability() {
        toc.push_str("- [Capability Dimensions](#capability-dimensions)\n");
        toc.push_str("- [Capability Assessment](#capability-assessment)\n");
        if !report.construct_details.is_empty() {
            toc.push_str("- [Construct Details](#construct-details)\n");
        }
    }
    if !report.benchmarks.is_empty() {
        toc.push_str("- [Benchmarks](#benchmarks)\n");
    }
    if !report.insights.is_empty() {
        toc.push_str("- [Insights](#insights)\n");
    }

    toc.push('\n');

    toc
}

fn push_list(section: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section.push_str(&format!("### {}\n\n", title));
    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');
}

/// Generate the summary section.
fn generate_summary_section(readiness_score: f64, highlights: &Highlights) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "**Readiness Score:** {} / 100\n\n",
        format_number(readiness_score, 1)
    ));

    push_list(
        &mut section,
        "Top Sentiment Issues",
        &highlights.top_sentiment_issues,
    );
    push_list(&mut section, "Lowest Question Cells", &highlights.lowest_cells);
    push_list(&mut section, "Highest Question Cells", &highlights.highest_cells);
    push_list(
        &mut section,
        "Weakest Capabilities",
        &highlights.weakest_capabilities,
    );
    push_list(
        &mut section,
        "Strongest Capabilities",
        &highlights.strongest_capabilities,
    );
    push_list(&mut section, "Largest Benchmark Gaps", &highlights.largest_gaps);
    push_list(&mut section, "Weakest Constructs", &highlights.weakest_constructs);

    section
}

/// Generate the 5x5 heatmap table, level 5 at the top.
fn generate_heatmap_section(cells: &[HeatmapCell]) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Heatmap\n\n");
    section.push_str(
        "Mean level, respondent count and share of respondents \
         per readiness level and reason.\n\n",
    );
    let total: usize = cells.iter().map(|c| c.count).sum();

    section.push_str("| Level |");
    for reason in SentimentReason::ALL {
        section.push_str(&format!(" {} {} |", reason, reason.label()));
    }
    section.push('\n');
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for row in cells.chunks(5) {
        let Some(first) = row.first() else { continue };
        let level = first.level();
        section.push_str(&format!(
            "| {} {} |",
            level,
            SENTIMENT_LEVEL_NAMES.get(level - 1).copied().unwrap_or_default()
        ));
        for cell in row {
            if cell.has_data() {
                section.push_str(&format!(
                    " {} (n={}, {}) |",
                    format_number(cell.value, 1),
                    cell.count,
                    format_percentage(cell.count as f64 / total as f64)
                ));
            } else {
                section.push_str(" - |");
            }
        }
        section.push('\n');
    }
    section.push('\n');

    let legend: Vec<String> = SENTIMENT_LEVEL_NAMES
        .iter()
        .zip(SENTIMENT_COLORS)
        .enumerate()
        .map(|(i, (name, color))| format!("{} {} `{}`", i + 1, name, color))
        .collect();
    section.push_str(&format!("Level colours: {}\n\n", legend.join(" | ")));

    section
}

/// Generate the ranked question grid with its statistics.
fn generate_ranked_section(ranked: &RankedHeatmap) -> String {
    let mut section = String::new();

    section.push_str("## Question Grid\n\n");
    if ranked.cells.is_empty() {
        section.push_str("No question scores were found.\n\n");
        return section;
    }

    section.push_str("Mean score and rank per cell (rank 1 is the highest score).\n\n");
    section.push_str("| Level |");
    for category in &SENTIMENT_CATEGORIES {
        section.push_str(&format!(" {} |", category.short_name));
    }
    section.push_str(" Avg |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");

    for (row, cells) in ranked.cells.chunks(5).enumerate() {
        let Some(first) = cells.first() else { continue };
        section.push_str(&format!("| {} |", first.level_name));
        for cell in cells {
            if cell.has_data() {
                section.push_str(&format!(
                    " {} (#{}) |",
                    format_number(cell.score, 2),
                    cell.rank
                ));
            } else {
                section.push_str(" - |");
            }
        }
        let row_average = ranked.stats.row_averages[row];
        section.push_str(&format!(
            " {} `{}` |\n",
            format_number(row_average, 2),
            get_ranked_color(row_average, &ranked.stats.row_averages)
        ));
    }

    section.push_str("| **Avg** |");
    for avg in &ranked.stats.column_averages {
        section.push_str(&format!(" {} |", format_number(*avg, 2)));
    }
    section.push_str(&format!(
        " **{}** |\n\n",
        format_number(ranked.stats.overall_average, 2)
    ));

    section.push_str(&format!(
        "*Respondents: {} | Standard deviation: {}*\n\n",
        ranked.stats.total_respondents,
        format_number(ranked.stats.standard_deviation, 2)
    ));

    section
}

/// Generate the dimension overview table.
fn generate_dimensions_section(dimensions: &[CapabilityDimension]) -> String {
    let mut section = String::new();

    section.push_str("## Capability Dimensions\n\n");
    section.push_str("| Dimension | Average | Min | Max | Benchmark | Colour |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for dim in dimensions {
        let benchmark = dim
            .benchmark_score
            .map(|b| format_number(b, 1))
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | `{}` |\n",
            dim.name,
            format_number(dim.average_score, 2),
            format_number(dim.min_score, 2),
            format_number(dim.max_score, 2),
            benchmark,
            dim.color()
        ));
    }
    section.push('\n');

    section
}

/// Generate the dimension status table.
fn generate_assessment_section(report: &Report) -> String {
    let assessment = &report.assessment;
    let mut section = String::new();

    section.push_str("## Capability Assessment\n\n");
    section.push_str("| Dimension | Average | Spread | Benchmark | Status |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");

    for dim in assessment.dimensions.iter().filter(|d| d.has_data()) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} {} |\n",
            dim.name,
            format_number(dim.average, 2),
            format_number(dim.spread, 2),
            format_number(dim.benchmark, 2),
            dim.status.emoji(),
            dim.status
        ));
    }
    section.push('\n');

    let overall = &assessment.overall;
    section.push_str(&format!(
        "**Overall average:** {}\n\n",
        format_number(overall.average, 2)
    ));
    if let Some(ref highest) = overall.highest {
        section.push_str(&format!("- **Highest:** {}\n", highest.name));
    }
    if let Some(ref lowest) = overall.lowest {
        section.push_str(&format!("- **Lowest:** {}\n", lowest.name));
    }
    if let Some(ref gap) = overall.biggest_gap {
        section.push_str(&format!(
            "- **Widest construct spread:** {} ({})\n",
            gap.name,
            format_number(gap.spread, 2)
        ));
    }
    section.push('\n');

    section
}

/// Generate the construct breakdown for each requested dimension.
fn generate_construct_section(details: &BTreeMap<String, Vec<CapabilityConstruct>>) -> String {
    if details.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Construct Details\n\n");

    for (key, constructs) in details {
        let title = dimension_by_key(key).map_or(key.as_str(), |(_, d)| d.name);
        section.push_str(&format!("### {}\n\n", title));
        section.push_str("| Construct | Average | vs Midpoint | vs Benchmark |\n");
        section.push_str("|:---|:---:|:---:|:---:|\n");
        for construct in constructs {
            let vs_benchmark = construct
                .gap_analysis
                .vs_benchmark
                .map(|g| format!("{:+.2}", g))
                .unwrap_or_else(|| "-".to_string());
            section.push_str(&format!(
                "| {} | {} | {:+.2} | {} |\n",
                construct.name,
                format_number(construct.average_score, 2),
                construct.gap_analysis.vs_average,
                vs_benchmark
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the benchmark section; empty unless a company was selected.
fn generate_benchmark_section(
    sentiment: Option<&SentimentBenchmark>,
    capability: Option<&CapabilityBenchmark>,
) -> String {
    if sentiment.is_none() && capability.is_none() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Benchmarks\n\n");

    if let Some(benchmark) = sentiment {
        section.push_str("### Sentiment\n\n");
        section.push_str("Lower scores mean less resistance.\n\n");
        section.push_str(&format!(
            "- **Company score:** {}\n\
             - **Population average:** {}\n\
             - **Difference:** {:+.2}\n\
             - **Percentile:** {}\n\n",
            format_number(benchmark.company_score, 2),
            format_number(benchmark.overall_average, 2),
            benchmark.company_vs_benchmark,
            benchmark.percentile
        ));
    }

    if let Some(benchmark) = capability {
        section.push_str("### Capability\n\n");
        section.push_str("| Dimension | Company | Population | Difference | Percentile |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
        for (id, population) in &benchmark.dimension_averages {
            let name = dimension_by_id(*id).map_or("Unknown", |d| d.name);
            let company = benchmark.company_scores.get(id).copied().unwrap_or(0.0);
            let diff = benchmark.company_vs_benchmark.get(id).copied().unwrap_or(0.0);
            let percentile = benchmark.percentiles.get(id).copied().unwrap_or(50);
            section.push_str(&format!(
                "| {} | {} | {} | {:+.2} | {} |\n",
                name,
                format_number(company, 2),
                format_number(*population, 2),
                diff,
                percentile
            ));
        }
        section.push_str(&format!(
            "\n*Population overall average: {}*\n\n",
            format_number(benchmark.overall_average, 2)
        ));
    }

    section
}

/// Generate the narrative summaries.
fn generate_insights_section(report: &Report) -> String {
    if report.insights.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Insights\n\n");
    for insight in &report.insights {
        let mut title = insight.context.to_string();
        if let Some(first) = title.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        section.push_str(&format!("### {}\n\n", title));
        section.push_str(&insight.summary);
        section.push_str(&format!("\n\n*Source: {}*\n\n", insight.provider));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by ai-navigator v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Write the Markdown report to a file.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
