use crate::classifier::classify;
use crate::config::{SearchConfig, DEFAULT_MAX_READ_BYTES};
use crate::error::{Result, StrfindError};
use crate::matcher::match_content;
use crate::progress::ProgressSink;
use crate::results::{FileResult, MatchRecord, ScanSummary};
use crate::variants::{build_variants, PatternVariant};
use ignore::WalkBuilder;
use log::{debug, info, warn};
use memchr::memmem;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drives one scan: enumerates files, classifies and matches each one
/// sequentially, and aggregates deduplicated results into a [`ScanSummary`].
pub struct Scanner {
    config: SearchConfig,
    variants: Vec<PatternVariant>,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    /// Validates the pattern and precompiles the variant set. Fails before
    /// any file I/O on an empty pattern.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let variants = build_variants(&config.pattern, config.case_sensitive)?;
        Ok(Self {
            config,
            variants,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag a signal handler can set to stop the scan between files.
    /// An interrupted scan still returns the partial summary.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn scan(&self, progress: &dyn ProgressSink) -> Result<ScanSummary> {
        if !self.config.directory.exists() {
            return Err(StrfindError::DirectoryNotFound(
                self.config.directory.clone(),
            ));
        }

        let files = enumerate_files(&self.config.directory, self.config.recursive)?;
        let total = files.len();
        info!(
            "Scanning {total} files under {} for '{}'",
            self.config.directory.display(),
            self.config.pattern
        );
        progress.begin(total);

        let mut summary = ScanSummary::new(self.config.clone());
        for (index, path) in files.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!("Scan interrupted after {index} of {total} files");
                summary.interrupted = true;
                break;
            }

            summary.file_scanned();
            match self.scan_file(path) {
                Ok(Some(result)) => {
                    debug!(
                        "{}: {} match(es)",
                        path.display(),
                        result.matches.len()
                    );
                    summary.add_result(result);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping {}: {e}", path.display());
                    summary.add_error(path.clone(), e.to_string());
                }
            }
            progress.file_scanned(index + 1, total, &path.display().to_string());
        }
        progress.finish();
        Ok(summary)
    }

    fn scan_file(&self, path: &Path) -> Result<Option<FileResult>> {
        let (content, size_bytes, truncated) = read_capped(path, self.config.max_read_bytes)?;
        if truncated {
            warn!(
                "Read cap reached for {} ({size_bytes} bytes); scanning first {} bytes only",
                path.display(),
                content.len()
            );
        }

        let mode = classify(&content);
        let hits = match_content(&content, mode, &self.variants);
        let matches = dedup_hits(hits);
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(FileResult {
            path: path.to_path_buf(),
            size_bytes,
            truncated,
            matches,
        }))
    }
}

/// Enumerates candidate files, depth-first when recursive, immediate entries
/// only otherwise. Standard ignore filters are disabled: a forensic scan
/// must see hidden and gitignored files. Paths are sorted lexicographically
/// so output is reproducible across platforms.
fn enumerate_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    // Surfaces PermissionDenied (or NotADirectory) on the root itself as a
    // fatal error; unreadable entries deeper in the tree are only logged.
    fs::read_dir(root)?;

    let max_depth = if recursive { None } else { Some(1) };
    let files = WalkBuilder::new(root)
        .standard_filters(false)
        .max_depth(max_depth)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Walk error: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Reads at most `cap` bytes of a file, reporting the true size and whether
/// the cap cut the content short.
fn read_capped(path: &Path, cap: u64) -> Result<(Vec<u8>, u64, bool)> {
    let wrap = |source| StrfindError::FileProcessing {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    let size_bytes = file.metadata().map_err(wrap)?.len();
    let mut content = Vec::with_capacity(size_bytes.min(cap) as usize);
    file.take(cap).read_to_end(&mut content).map_err(wrap)?;
    Ok((content, size_bytes, size_bytes > cap))
}

/// Patterns offered as suggestions when the default pattern finds nothing.
pub const ALTERNATIVE_PATTERNS: [&str; 7] = ["HTB", "flag{", "FLAG{", "ctf{", "CTF{", "{", "}"];

/// File-count cap for the suggestion pass.
const QUICK_SEARCH_FILE_LIMIT: usize = 50;

/// Bounded secondary pass behind the zero-match suggestions: a
/// case-insensitive containment check over the first enumerated files,
/// capped in both file count and per-file bytes. Unreadable files are
/// skipped silently; this pass never affects scan results.
pub fn quick_search(root: &Path, recursive: bool, pattern: &str) -> Vec<PathBuf> {
    let Ok(files) = enumerate_files(root, recursive) else {
        return Vec::new();
    };
    let needle = pattern.to_lowercase();
    let mut found = Vec::new();
    for path in files.into_iter().take(QUICK_SEARCH_FILE_LIMIT) {
        let Ok((content, _, _)) = read_capped(&path, DEFAULT_MAX_READ_BYTES) else {
            continue;
        };
        let lowered: Vec<u8> = content.iter().map(|b| b.to_ascii_lowercase()).collect();
        if memmem::find(&lowered, needle.as_bytes()).is_some() {
            found.push(path);
        }
    }
    found
}

/// Collapses raw hits sharing the same (offset, matched text) pair into one
/// record. The first variant to produce the hit keeps its metadata.
fn dedup_hits(hits: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(hits.len());
    for hit in hits {
        if seen.insert((hit.offset, hit.matched.clone())) {
            unique.push(hit);
        }
    }
    unique
}
