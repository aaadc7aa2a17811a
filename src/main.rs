//! AI Navigator - AI readiness survey analytics
//!
//! A CLI tool that aggregates sentiment and capability survey exports
//! into readiness reports with heatmaps, dimension scores and
//! cross-company benchmarks.
//!
//! Exit codes:
//!   0 - Success (score at or above --fail-below, or no threshold set)
//!   1 - Runtime error (unreadable data, bad config, etc.)
//!   2 - Readiness score below the --fail-below threshold

mod analysis;
mod cli;
mod config;
mod constants;
mod dataset;
mod insights;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::{DataFile, DataScanner, Dataset, ScanConfig};
use indicatif::{ProgressBar, ProgressStyle};
use insights::{
    summarize_with_fallback, Insight, InsightContext, InsightProvider, OllamaConfig,
    OllamaInsights, StaticInsights,
};
use models::{Report, ReportMetadata};
use report::ReportInput;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("AI Navigator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ainav.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set default filters, output format and insight model.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete report workflow. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Find the data files
    let files = resolve_files(&args, &config)?;
    if files.is_empty() {
        anyhow::bail!(
            "No input given: use --data-dir or one of --sentiment, --capability, --scores"
        );
    }

    // Handle --dry-run: list files and exit
    if args.dry_run {
        return handle_dry_run(&files);
    }

    // Step 2: Load records
    println!("📥 Loading {} data file(s)...", files.len());
    let dataset = Dataset::from_files(&files).context("Failed to load survey data")?;
    if dataset.is_empty() {
        anyhow::bail!("The input files contain no survey rows");
    }

    // Step 3: Scope to a company; the full dataset becomes the benchmark population
    let company = args.company.clone();
    let subject = match company {
        Some(ref id) => {
            let subset = dataset.for_company(id);
            if subset.is_empty() {
                anyhow::bail!("No rows found for company '{}'", id);
            }
            info!("Benchmarking company {} against all loaded companies", id);
            subset
        }
        None => dataset.clone(),
    };

    // Step 4: Aggregate
    println!("📊 Aggregating survey results...");
    println!("   Filters: {}", config.filters);

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        sources: files.iter().map(|f| f.path.display().to_string()).collect(),
        company_id: company.clone(),
        filters: config.filters.clone(),
        sentiment_respondents: 0,
        capability_respondents: 0,
        duration_seconds: 0.0,
    };

    let input = ReportInput {
        subject: &subject,
        population: company.as_ref().map(|_| &dataset),
        filters: &config.filters,
        detail_dimensions: &config.report.dimensions,
        highlight_limit: config.report.highlight_limit,
    };
    let mut report = report::build_report(&input, metadata);

    // Step 5: Narrative summaries
    if config.insights.enabled {
        report.insights = generate_insights(&config, &report, &subject, args.quiet).await;
    }

    report.metadata.duration_seconds = start_time.elapsed().as_secs_f64();

    // Step 6: Write the report
    println!("\n📝 Generating report...");
    let output_path = config.output_path();
    match config.report.format {
        OutputFormat::Json => report::write_json_report(&report, &output_path)?,
        OutputFormat::Markdown => report::write_report(&report, &output_path)?,
    }

    print_summary(&report, &output_path);

    // Check --fail-below threshold
    if let Some(threshold) = config.report.fail_below {
        if report.readiness_score < threshold {
            eprintln!(
                "\n⛔ Readiness score {:.1} is below {:.1}. Failing (exit code 2).",
                report.readiness_score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Explicit input files, or the scanned data directory.
///
/// A data directory from the config file is only used when no input
/// was given on the command line.
fn resolve_files(args: &Args, config: &Config) -> Result<Vec<DataFile>> {
    let mut files = args.input_files();

    let data_dir = match args.data_dir {
        Some(ref dir) => Some(dir.clone()),
        None if files.is_empty() => config.general.data_dir.as_ref().map(PathBuf::from),
        None => None,
    };

    if let Some(dir) = data_dir {
        info!("Scanning data directory: {}", dir.display());
        let scanner = DataScanner::new(&dir, ScanConfig::from(&config.scanner));
        files.extend(
            scanner
                .scan()
                .with_context(|| format!("Failed to scan {}", dir.display()))?,
        );
    }

    Ok(files)
}

/// Handle --dry-run: print the files that would be loaded, exit.
fn handle_dry_run(files: &[DataFile]) -> Result<i32> {
    println!("\n🔍 Dry run: data files that would be loaded...\n");

    for file in files {
        let size = std::fs::metadata(&file.path).map(|m| m.len()).unwrap_or(0);
        println!(
            "     📄 {} ({:?}, {} bytes)",
            file.path.display(),
            file.kind,
            size
        );
    }
    println!("\n   Total: {} files", files.len());

    println!("\n✅ Dry run complete. No records were aggregated.");
    Ok(0)
}

/// Ask the configured model for both summaries behind a spinner.
async fn generate_insights(
    config: &Config,
    report: &Report,
    subject: &Dataset,
    quiet: bool,
) -> Vec<Insight> {
    let provider: Box<dyn InsightProvider> =
        match OllamaInsights::new(OllamaConfig::from(&config.insights)) {
            Ok(provider) => Box::new(provider),
            Err(e) => {
                warn!("Ollama provider unavailable, using static summaries: {:#}", e);
                Box::new(StaticInsights)
            }
        };

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut insights = Vec::new();

    if report.has_sentiment() {
        spinner.set_message(format!("Summarising sentiment with {}...", provider.name()));
        insights.push(
            summarize_with_fallback(provider.as_ref(), InsightContext::Sentiment, &[]).await,
        );
    }

    if report.has_capability() {
        spinner.set_message(format!("Summarising capability with {}...", provider.name()));
        let feedback =
            report::collect_feedback(&subject.capability_records(), &config.filters);
        debug!("Collected {} feedback entries", feedback.len());
        insights.push(
            summarize_with_fallback(provider.as_ref(), InsightContext::Capability, &feedback)
                .await,
        );
    }

    spinner.finish_and_clear();
    insights
}

/// Print the run summary to stdout.
fn print_summary(report: &Report, output_path: &Path) {
    let metadata = &report.metadata;

    println!("\n📊 Readiness Summary:");
    println!("   Readiness score: {:.1}", report.readiness_score);
    println!(
        "   Respondents: {} sentiment | {} capability",
        metadata.sentiment_respondents, metadata.capability_respondents
    );
    if let Some(highest) = report.assessment.overall.highest.as_ref() {
        println!("   Strongest dimension: {} ({:.2})", highest.name, highest.average);
    }
    if let Some(lowest) = report.assessment.overall.lowest.as_ref() {
        println!("   Weakest dimension: {} ({:.2})", lowest.name, lowest.average);
    }
    if let Some(sentiment) = report.benchmarks.sentiment.as_ref() {
        println!("   Sentiment percentile: {}", sentiment.percentile);
    }
    println!("   Duration: {:.1}s", metadata.duration_seconds);
    println!(
        "\n✅ Report complete! Saved to: {}",
        output_path.display()
    );
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
