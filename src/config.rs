//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ainav.toml` files.

use crate::cli::OutputFormat;
use crate::dataset::ScanConfig;
use crate::insights::OllamaConfig;
use crate::models::FilterState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".ainav.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Default respondent filters.
    #[serde(default)]
    pub filters: FilterState,

    /// Narrative summary settings.
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Data directory scanning.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Directory scanned when no input flag is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            data_dir: None,
        }
    }
}

fn default_output() -> String {
    "readiness_report.md".to_string()
}

/// Ollama settings for narrative summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Ask the model for summaries. Off means built-in summaries.
    #[serde(default)]
    pub enabled: bool,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    120
}

impl From<&InsightsConfig> for OllamaConfig {
    fn from(config: &InsightsConfig) -> Self {
        OllamaConfig {
            ollama_url: config.ollama_url.clone(),
            model_name: config.model.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// Data directory scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Directory names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum directory depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            excludes: scan.excludes,
            max_depth: scan.max_depth,
        }
    }
}

fn default_excludes() -> Vec<String> {
    ScanConfig::default().excludes
}

fn default_max_depth() -> usize {
    ScanConfig::default().max_depth
}

impl From<&ScannerConfig> for ScanConfig {
    fn from(config: &ScannerConfig) -> Self {
        ScanConfig {
            excludes: config.excludes.clone(),
            max_depth: config.max_depth,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Dimension keys broken down into constructs.
    #[serde(default)]
    pub dimensions: Vec<String>,

    /// Entries in each highlight list.
    #[serde(default = "default_highlight_limit")]
    pub highlight_limit: usize,

    /// Readiness score below which the run exits with code 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_below: Option<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            dimensions: Vec::new(),
            highlight_limit: default_highlight_limit(),
            fail_below: None,
        }
    }
}

fn default_highlight_limit() -> usize {
    3
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Filters are merged field by field.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        self.filters = self.filters.merged_with(&args.filters());

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref dir) = args.data_dir {
            self.general.data_dir = Some(dir.display().to_string());
        }
        if args.insights {
            self.insights.enabled = true;
        }
        if let Some(ref model) = args.model {
            self.insights.model = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.insights.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.insights.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.insights.timeout_seconds = timeout;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if !args.dimensions.is_empty() {
            self.report.dimensions = args.dimensions.clone();
        }
        if let Some(top) = args.top {
            self.report.highlight_limit = top;
        }
        if args.fail_below.is_some() {
            self.report.fail_below = args.fail_below;
        }
    }

    /// Output path. The default file name follows the report format.
    pub fn output_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.general.output);
        if self.general.output == default_output() {
            path.with_extension(self.report.format.extension())
        } else {
            path
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "readiness_report.md");
        assert_eq!(config.insights.model, "llama3.2:latest");
        assert!(!config.insights.enabled);
        assert_eq!(config.report.highlight_limit, 3);
        assert!(config.scanner.excludes.contains(&"node_modules".to_string()));
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "acme.json"
data_dir = "exports"

[filters]
region = "North"

[insights]
enabled = true
model = "mistral:7b"

[report]
format = "json"
dimensions = ["data", "ethics"]
fail_below = 55.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "acme.json");
        assert_eq!(config.general.data_dir.as_deref(), Some("exports"));
        assert_eq!(config.filters.region.as_deref(), Some("North"));
        assert!(config.insights.enabled);
        assert_eq!(config.insights.model, "mistral:7b");
        assert_eq!(config.insights.timeout_seconds, 120);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.dimensions, vec!["data", "ethics"]);
        assert_eq!(config.report.fail_below, Some(55.0));
        assert_eq!(config.report.highlight_limit, 3);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[insights]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.output, "readiness_report.md");
        assert_eq!(parsed.scanner.max_depth, 4);
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config: Config = toml::from_str(
            r#"
[filters]
region = "North"
department = "Sales"

[insights]
model = "mistral:7b"
"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "ai-navigator",
            "--data-dir",
            ".",
            "--region",
            "South",
            "--format",
            "json",
            "--top",
            "5",
        ])
        .unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.filters.region.as_deref(), Some("South"));
        assert_eq!(config.filters.department.as_deref(), Some("Sales"));
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.highlight_limit, 5);
        assert_eq!(config.general.data_dir.as_deref(), Some("."));
    }

    #[test]
    fn test_output_path_follows_format() {
        let mut config = Config::default();
        assert_eq!(config.output_path(), PathBuf::from("readiness_report.md"));

        config.report.format = OutputFormat::Json;
        assert_eq!(config.output_path(), PathBuf::from("readiness_report.json"));

        config.general.output = "out/report.txt".to_string();
        assert_eq!(config.output_path(), PathBuf::from("out/report.txt"));
    }

    #[test]
    fn test_insights_config_conversion() {
        let mut insights = InsightsConfig::default();
        insights.timeout_seconds = 30;
        let ollama = OllamaConfig::from(&insights);
        assert_eq!(ollama.model_name, "llama3.2:latest");
        assert_eq!(ollama.timeout_seconds, 30);
    }
}
