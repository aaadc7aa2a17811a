//! Survey export discovery and loading.
//!
//! A data directory holds JSON exports named after their content
//! (`sentiment*.json`, `respondents*.json`, `capability*.json`,
//! `capability_scores*.json`). Each file is either a bare array of row
//! objects or an API envelope `{"data": [...]}`.

pub mod error;
pub mod normalize;

pub use error::{DatasetError, DatasetResult};

use crate::models::{CapabilityResponse, CapabilityScore, SentimentResponse};
use normalize::Row;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// What a data file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Sentiment,
    Capability,
    CapabilityScores,
}

impl DataKind {
    /// Classify a file by its stem. Longer prefixes win.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return None;
        }
        let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
        if stem.starts_with("capability_scores") {
            Some(DataKind::CapabilityScores)
        } else if stem.starts_with("capability") {
            Some(DataKind::Capability)
        } else if stem.starts_with("sentiment") || stem.starts_with("respondents") {
            Some(DataKind::Sentiment)
        } else {
            None
        }
    }
}

/// A discovered data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub path: PathBuf,
    pub kind: DataKind,
}

/// Options for walking a data directory.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory names to skip.
    pub excludes: Vec<String>,
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excludes: vec!["node_modules", "target", "archive"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_depth: 4,
        }
    }
}

/// Finds survey exports under a directory.
pub struct DataScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl DataScanner {
    pub fn new(root: impl Into<PathBuf>, config: ScanConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Check if an entry is hidden or excluded. The root itself never is.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.config.excludes.iter().any(|pattern| name == *pattern)
    }

    /// All recognised data files, sorted by path.
    pub fn scan(&self) -> DatasetResult<Vec<DataFile>> {
        if !self.root.is_dir() {
            return Err(DatasetError::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut files: Vec<DataFile> = WalkDir::new(&self.root)
            .max_depth(self.config.max_depth)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                DataKind::from_path(e.path()).map(|kind| DataFile {
                    path: e.into_path(),
                    kind,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} data files under {}", files.len(), self.root.display());

        if files.is_empty() {
            return Err(DatasetError::NoData {
                path: self.root.clone(),
            });
        }
        Ok(files)
    }
}

/// Read the row objects of one export file.
///
/// Non-object array elements are skipped with a warning.
pub fn read_rows(path: &Path) -> DatasetResult<Vec<Row>> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| DatasetError::json(path, e))?;
    rows_from_value(path, value)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn rows_from_value(path: &Path, value: Value) -> DatasetResult<Vec<Row>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DatasetError::UnexpectedShape {
                    path: path.to_path_buf(),
                    found: describe(&other),
                })
            }
            None => {
                return Err(DatasetError::UnexpectedShape {
                    path: path.to_path_buf(),
                    found: "an object without \"data\"",
                })
            }
        },
        other => {
            return Err(DatasetError::UnexpectedShape {
                path: path.to_path_buf(),
                found: describe(&other),
            })
        }
    };

    let total = items.len();
    let rows: Vec<Row> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();

    if rows.len() < total {
        warn!(
            "{}: skipped {} non-object rows",
            path.display(),
            total - rows.len()
        );
    }
    Ok(rows)
}

pub fn load_sentiment(path: &Path) -> DatasetResult<Vec<SentimentResponse>> {
    Ok(read_rows(path)?
        .iter()
        .enumerate()
        .map(|(i, row)| normalize::sentiment_from_row(row, i))
        .collect())
}

pub fn load_capability(path: &Path) -> DatasetResult<Vec<CapabilityResponse>> {
    Ok(read_rows(path)?
        .iter()
        .enumerate()
        .map(|(i, row)| normalize::capability_from_row(row, i))
        .collect())
}

pub fn load_scores(path: &Path) -> DatasetResult<Vec<CapabilityScore>> {
    let rows = read_rows(path)?;
    let scores: Vec<CapabilityScore> = rows.iter().filter_map(normalize::score_from_row).collect();
    if scores.len() < rows.len() {
        warn!(
            "{}: skipped {} score rows without respondent, construct or score",
            path.display(),
            rows.len() - scores.len()
        );
    }
    Ok(scores)
}

/// Everything loaded for one run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub sentiment: Vec<SentimentResponse>,
    pub capability: Vec<CapabilityResponse>,
    pub scores: Vec<CapabilityScore>,
}

impl Dataset {
    /// Load one file and append its records.
    pub fn load_file(&mut self, file: &DataFile) -> DatasetResult<()> {
        match file.kind {
            DataKind::Sentiment => self.sentiment.extend(load_sentiment(&file.path)?),
            DataKind::Capability => self.capability.extend(load_capability(&file.path)?),
            DataKind::CapabilityScores => self.scores.extend(load_scores(&file.path)?),
        }
        debug!("Loaded {:?} data from {}", file.kind, file.path.display());
        Ok(())
    }

    /// Load the given files in order.
    pub fn from_files(files: &[DataFile]) -> DatasetResult<Self> {
        let mut dataset = Dataset::default();
        for file in files {
            dataset.load_file(file)?;
        }
        info!(
            "Loaded {} sentiment, {} capability and {} score rows from {} files",
            dataset.sentiment.len(),
            dataset.capability.len(),
            dataset.scores.len(),
            files.len()
        );
        Ok(dataset)
    }

    /// Wide capability rows, pivoting long-format scores when no wide rows
    /// were loaded.
    pub fn capability_records(&self) -> Vec<CapabilityResponse> {
        if self.capability.is_empty() {
            normalize::pivot_scores(&self.scores)
        } else {
            self.capability.clone()
        }
    }

    /// Rows belonging to one company.
    pub fn for_company(&self, company_id: &str) -> Dataset {
        let matches = |id: &Option<String>| id.as_deref() == Some(company_id);
        Dataset {
            sentiment: self
                .sentiment
                .iter()
                .filter(|r| matches(&r.company_id))
                .cloned()
                .collect(),
            capability: self
                .capability
                .iter()
                .filter(|r| matches(&r.company_id))
                .cloned()
                .collect(),
            scores: self
                .scores
                .iter()
                .filter(|s| s.company_id == company_id)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sentiment.is_empty() && self.capability.is_empty() && self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_classify_by_stem() {
        let kind = |p: &str| DataKind::from_path(Path::new(p));
        assert_eq!(kind("capability_scores_2024.json"), Some(DataKind::CapabilityScores));
        assert_eq!(kind("capability.json"), Some(DataKind::Capability));
        assert_eq!(kind("Sentiment-q3.json"), Some(DataKind::Sentiment));
        assert_eq!(kind("respondents.json"), Some(DataKind::Sentiment));
        assert_eq!(kind("sentiment.csv"), None);
        assert_eq!(kind("companies.json"), None);
    }

    #[test]
    fn test_scan_skips_hidden_and_excluded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "sentiment.json", "[]");
        write(temp.path(), "wave2/capability.json", "[]");
        write(temp.path(), ".cache/sentiment.json", "[]");
        write(temp.path(), "archive/sentiment.json", "[]");
        write(temp.path(), "notes.json", "[]");

        let files = DataScanner::new(temp.path(), ScanConfig::default())
            .scan()
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, DataKind::Sentiment);
        assert_eq!(files[1].kind, DataKind::Capability);
    }

    #[test]
    fn test_scan_empty_dir_is_no_data() {
        let temp = TempDir::new().unwrap();
        let err = DataScanner::new(temp.path(), ScanConfig::default())
            .scan()
            .unwrap_err();
        assert!(matches!(err, DatasetError::NoData { .. }));
    }

    #[test]
    fn test_read_rows_envelope_and_array() {
        let temp = TempDir::new().unwrap();
        let bare = write(temp.path(), "a.json", r#"[{"id": 1}, 5, {"id": 2}]"#);
        let envelope = write(
            temp.path(),
            "b.json",
            r#"{"success": true, "data": [{"id": 1}], "count": 1}"#,
        );
        assert_eq!(read_rows(&bare).unwrap().len(), 2);
        assert_eq!(read_rows(&envelope).unwrap().len(), 1);
    }

    #[test]
    fn test_read_rows_errors() {
        let temp = TempDir::new().unwrap();
        let broken = write(temp.path(), "broken.json", "[{");
        let object = write(temp.path(), "object.json", r#"{"rows": []}"#);
        let scalar = write(temp.path(), "scalar.json", "42");

        assert!(matches!(read_rows(&broken), Err(DatasetError::Json { .. })));
        assert!(matches!(
            read_rows(&object),
            Err(DatasetError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            read_rows(&scalar),
            Err(DatasetError::UnexpectedShape { found: "a number", .. })
        ));
        assert!(matches!(
            read_rows(&temp.path().join("missing.json")),
            Err(DatasetError::Io { .. })
        ));
    }

    fn load_dir(dir: &Path) -> Dataset {
        let files = DataScanner::new(dir, ScanConfig::default()).scan().unwrap();
        Dataset::from_files(&files).unwrap()
    }

    #[test]
    fn test_dataset_from_scanned_files_and_company_subset() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "sentiment.json",
            r#"[
                {"RespondentID": "1", "company_id": "acme", "sentiment_1": 2},
                {"RespondentID": "2", "company_id": "globex", "sentiment_1": 4}
            ]"#,
        );
        write(
            temp.path(),
            "capability_scores.json",
            r#"{"data": [
                {"respondent_id": "1", "company_id": "acme", "construct_id": 1, "score": 4},
                {"respondent_id": "2", "company_id": "globex", "construct_id": 1, "score": 2}
            ]}"#,
        );

        let dataset = load_dir(temp.path());
        assert_eq!(dataset.sentiment.len(), 2);
        assert_eq!(dataset.scores.len(), 2);
        assert_eq!(dataset.capability_records().len(), 2);

        let acme = dataset.for_company("acme");
        assert_eq!(acme.sentiment.len(), 1);
        assert_eq!(acme.scores.len(), 1);
        assert_eq!(acme.capability_records()[0].score_by_construct_id(1), Some(4.0));
        assert!(dataset.for_company("initech").is_empty());
    }

    #[test]
    fn test_sample_fixtures_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample");
        let dataset = load_dir(&dir);
        assert_eq!(dataset.sentiment.len(), 3);
        assert_eq!(dataset.capability.len(), 3);

        let ids: Vec<&str> = dataset.sentiment.iter().map(|r| r.response_id.as_str()).collect();
        assert_eq!(ids, vec!["s-001", "s-002", "s-003"]);
        assert!(dataset.sentiment.iter().all(|r| r.coordinate().is_some()));
        assert_eq!(dataset.for_company("acme").capability.len(), 2);
    }
}
