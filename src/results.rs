use crate::classifier::SourceMode;
use crate::config::SearchConfig;
use crate::variants::{CaseForm, VariantKind};
use serde::Serialize;
use std::path::PathBuf;

/// One deduplicated match within a file. Offsets are character indices for
/// text files and byte indices for binary files.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub variant: VariantKind,
    pub case_form: CaseForm,
    pub offset: usize,
    pub matched: String,
    pub context_before: String,
    pub context_after: String,
    /// Matching line with two lines of surrounding context; text mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_context: Option<String>,
    /// Hex rendering of the context window; binary mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_context: Option<String>,
    pub mode: SourceMode,
}

/// Aggregated matches for one file. Only files with at least one match
/// produce a FileResult.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Set when the read cap cut the file short; matches cover only the
    /// scanned prefix.
    pub truncated: bool,
    pub matches: Vec<MatchRecord>,
}

/// A file the scanner could not read. The scan continues past these.
#[derive(Debug, Clone, Serialize)]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

/// Complete output of one scan. Built incrementally by the scanner while it
/// walks, read-only afterwards. File order follows visit order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub config: SearchConfig,
    pub total_files_scanned: usize,
    pub files_with_matches: Vec<FileResult>,
    pub errors: Vec<ScanError>,
    /// True when the scan was interrupted before visiting every file.
    pub interrupted: bool,
}

impl ScanSummary {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            total_files_scanned: 0,
            files_with_matches: Vec::new(),
            errors: Vec::new(),
            interrupted: false,
        }
    }

    pub fn file_scanned(&mut self) {
        self.total_files_scanned += 1;
    }

    pub fn add_result(&mut self, result: FileResult) {
        debug_assert!(!result.matches.is_empty());
        self.files_with_matches.push(result);
    }

    pub fn add_error(&mut self, path: PathBuf, message: String) {
        self.errors.push(ScanError { path, message });
    }

    pub fn total_matches(&self) -> usize {
        self.files_with_matches.iter().map(|f| f.matches.len()).sum()
    }
}
