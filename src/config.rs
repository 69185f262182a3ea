use serde::Serialize;
use std::path::PathBuf;

/// Default per-file read cap: 64 MiB. Content past the cap is not scanned
/// and the file's result is flagged truncated.
pub const DEFAULT_MAX_READ_BYTES: u64 = 64 * 1024 * 1024;

/// Pattern searched when none is given. Zero-match runs with this pattern
/// trigger the alternative-pattern suggestions in the reporter.
pub const DEFAULT_PATTERN: &str = "HTB{";

/// Immutable configuration for one scan. Constructed once from the CLI and
/// shared read-only for the whole walk.
#[derive(Debug, Clone, Serialize)]
pub struct SearchConfig {
    pub directory: PathBuf,
    pub pattern: String,
    pub case_sensitive: bool,
    pub recursive: bool,
    pub verbose: bool,
    pub max_read_bytes: u64,
}

impl SearchConfig {
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
            case_sensitive: false,
            recursive: true,
            verbose: true,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    pub fn verbose(mut self, yes: bool) -> Self {
        self.verbose = yes;
        self
    }

    pub fn max_read_bytes(mut self, cap: u64) -> Self {
        self.max_read_bytes = cap;
        self
    }
}
