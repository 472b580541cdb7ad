//! Report generation for batch results
//!
//! This module provides output formatters for CLI batch runs:
//!
//! - **JSON**: Machine-readable format with a summary block
//! - **CSV**: Spreadsheet-compatible format, one row per file
//!
//! # Usage
//!
//! ```ignore
//! use humanmark::report;
//!
//! // Automatically picks format based on extension
//! report::generate("report.json", &verdicts)?;  // JSON
//! report::generate("report.csv", &verdicts)?;   // CSV
//! ```

pub mod csv;
pub mod json;

use crate::analyzer::{AnalysisError, DetectionResult};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Outcome for one analyzed file
#[derive(Debug, Clone, Serialize)]
pub struct FileVerdict {
    pub file_path: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DetectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileVerdict {
    pub fn new(path: &Path, outcome: Result<DetectionResult, AnalysisError>) -> Self {
        match outcome {
            Ok(r) => Self::build(path, Some(r), None),
            Err(e) => Self::failed(path, e.to_string()),
        }
    }

    /// A file that could not be read or analyzed
    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self::build(path, None, Some(error.into()))
    }

    fn build(path: &Path, result: Option<DetectionResult>, error: Option<String>) -> Self {
        Self {
            file_path: path.display().to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            result,
            error,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.result.as_ref().map_or(false, |r| !r.human)
    }

    pub fn is_human(&self) -> bool {
        self.result.as_ref().map_or(false, |r| r.human)
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, verdicts: &[FileVerdict]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, verdicts),
        _ => csv::write(&mut file, verdicts),
    }
}

/// Summary statistics for a batch of results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub human: usize,
    pub ai: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(verdicts: &[FileVerdict]) -> Self {
        let mut summary = Self {
            total: verdicts.len(),
            ..Self::default()
        };

        for v in verdicts {
            match &v.result {
                Some(r) if r.human => summary.human += 1,
                Some(_) => summary.ai += 1,
                None => summary.errors += 1,
            }
        }

        summary
    }
}
