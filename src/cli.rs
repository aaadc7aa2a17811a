//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dataset::{DataFile, DataKind};
use crate::models::FilterState;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// AI Navigator - AI readiness survey analytics
///
/// Aggregate sentiment and capability survey exports into a readiness
/// report: a 5x5 sentiment heatmap, eight capability dimensions, a
/// composite readiness score and, for a single company, cross-company
/// benchmarks with percentiles.
///
/// Examples:
///   ai-navigator --data-dir ./exports
///   ai-navigator --sentiment respondents.json --capability capability.json --region North
///   ai-navigator --data-dir ./exports --company acme --format json -o acme.json
///   ai-navigator --data-dir ./exports --insights --model llama3.2:latest
///   ai-navigator --data-dir ./exports --fail-below 60
///   ai-navigator --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Sentiment export (JSON array or {"data": [...]} envelope)
    #[arg(long, value_name = "FILE")]
    pub sentiment: Option<PathBuf>,

    /// Wide-format capability export
    #[arg(long, value_name = "FILE")]
    pub capability: Option<PathBuf>,

    /// Long-format capability scores export
    #[arg(long, value_name = "FILE")]
    pub scores: Option<PathBuf>,

    /// Directory to scan for exports
    ///
    /// Files are classified by name: sentiment*.json, respondents*.json,
    /// capability*.json and capability_scores*.json.
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Company to report on
    ///
    /// Rows with this company_id form the report; all rows form the
    /// benchmark population.
    #[arg(long, value_name = "ID")]
    pub company: Option<String>,

    /// Only include respondents from this region
    #[arg(long)]
    pub region: Option<String>,

    /// Only include respondents from this department
    #[arg(long)]
    pub department: Option<String>,

    /// Only include respondents with this function
    #[arg(long)]
    pub function: Option<String>,

    /// Only include respondents in this age group
    #[arg(long)]
    pub age_group: Option<String>,

    /// Only include respondents from this business unit
    #[arg(long)]
    pub business_unit: Option<String>,

    /// Only include respondents with this role
    #[arg(long)]
    pub role: Option<String>,

    /// Capability dimension to break down into constructs (repeatable)
    ///
    /// Keys: strategyVision, data, technology, talentSkills, orgProcesses,
    /// innovation, adaptation, ethics.
    #[arg(long = "dimension", value_name = "KEY", value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Number of entries in each highlight list
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Add narrative summaries from a local Ollama model
    ///
    /// Falls back to built-in summaries when the model is unavailable.
    #[arg(long)]
    pub insights: bool,

    /// Ollama model used for narrative summaries
    #[arg(short, long, env = "AINAV_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for summaries (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ainav.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the data files that would be loaded and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .ainav.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Fail if the readiness score is below this value
    ///
    /// Useful for CI pipelines. Exit code 2 when the score is lower.
    #[arg(long, value_name = "SCORE")]
    pub fail_below: Option<f64>,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

fn check_file(flag: &str, path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("{} file does not exist: {}", flag, path.display()));
    }
    Ok(())
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref path) = self.sentiment {
            check_file("Sentiment", path)?;
        }
        if let Some(ref path) = self.capability {
            check_file("Capability", path)?;
        }
        if let Some(ref path) = self.scores {
            check_file("Scores", path)?;
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.is_dir() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(threshold) = self.fail_below {
            if !(0.0..=100.0).contains(&threshold) {
                return Err("--fail-below must be between 0 and 100".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Input files named explicitly with --sentiment, --capability or --scores.
    pub fn input_files(&self) -> Vec<DataFile> {
        [
            (&self.sentiment, DataKind::Sentiment),
            (&self.capability, DataKind::Capability),
            (&self.scores, DataKind::CapabilityScores),
        ]
        .into_iter()
        .filter_map(|(path, kind)| {
            path.as_ref().map(|path| DataFile {
                path: path.clone(),
                kind,
            })
        })
        .collect()
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filters given on the command line.
    pub fn filters(&self) -> FilterState {
        FilterState {
            region: self.region.clone(),
            department: self.department.clone(),
            function: self.function.clone(),
            age_group: self.age_group.clone(),
            business_unit: self.business_unit.clone(),
            role: self.role.clone(),
        }
    }
}
