use crate::config::{SearchConfig, DEFAULT_PATTERN};
use crate::error::Result;
use crate::results::{FileResult, ScanSummary};
use crate::scanner::{quick_search, ALTERNATIVE_PATTERNS};
use anyhow::Context;
use byte_unit::{Byte, UnitType};
use colored::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const CONSOLE_CONTEXT_LIMIT: usize = 100;
const REPORT_CONTEXT_LIMIT: usize = 200;
const SUGGESTION_DISPLAY_LIMIT: usize = 5;

/// Header printed before the scan starts.
pub fn print_banner(config: &SearchConfig) {
    let directory =
        fs::canonicalize(&config.directory).unwrap_or_else(|_| config.directory.clone());
    println!("{}", "=".repeat(60));
    println!("{}", "STRING SEARCH".bold());
    println!("{}", "=".repeat(60));
    println!("{}: {}", "Directory".cyan(), directory.display());
    println!("{}: '{}'", "Pattern".cyan(), config.pattern.yellow());
    println!("{}: {}", "Case sensitive".cyan(), config.case_sensitive);
    println!("{}: {}", "Recursive".cyan(), config.recursive);
    println!();
}

/// Renders the finished scan on the console: per-file matches, then totals
/// and any files that errored. Always prints the totals, even with zero
/// matches.
pub fn print_summary(summary: &ScanSummary) {
    if summary.files_with_matches.is_empty() {
        println!(
            "\n{}",
            format!(
                "No files containing '{}' were found.",
                summary.config.pattern
            )
            .yellow()
        );
        if summary.config.pattern == DEFAULT_PATTERN {
            print_alternative_suggestions(&summary.config);
        }
    } else {
        println!(
            "\n{} '{}' {} {} {}",
            "Found".green().bold(),
            summary.config.pattern.yellow(),
            "in".green().bold(),
            summary.files_with_matches.len(),
            "files!".green().bold()
        );
        println!("{}", "=".repeat(60));
        for result in &summary.files_with_matches {
            print_file_result(result);
        }
    }

    println!("\n{}", "Summary:".green().bold());
    println!(
        "{}: {}",
        "Total files scanned".cyan(),
        summary.total_files_scanned
    );
    println!(
        "{}: {}",
        "Files with matches".cyan(),
        summary.files_with_matches.len()
    );
    println!("{}: {}", "Total matches".cyan(), summary.total_matches());
    if summary.interrupted {
        println!("{}", "Scan was interrupted; results are partial.".yellow());
    }
    if !summary.errors.is_empty() {
        eprintln!("\n{}", "Files that could not be read:".red().bold());
        for err in &summary.errors {
            eprintln!("  {}: {}", err.path.display(), err.message.red());
        }
    }
}

/// When the default pattern comes up empty, runs the bounded quick search
/// for each alternative pattern and lists where they occur instead.
fn print_alternative_suggestions(config: &SearchConfig) {
    println!("\n{}", "Trying alternative searches:".yellow());
    for alt in ALTERNATIVE_PATTERNS {
        let found = quick_search(&config.directory, config.recursive, alt);
        if found.is_empty() {
            continue;
        }
        println!("\n  Found '{}' in {} files:", alt.yellow(), found.len());
        for path in found.iter().take(SUGGESTION_DISPLAY_LIMIT) {
            println!("    - {}", path.display());
        }
        if found.len() > SUGGESTION_DISPLAY_LIMIT {
            println!("    ... and {} more", found.len() - SUGGESTION_DISPLAY_LIMIT);
        }
    }
}

fn print_file_result(result: &FileResult) {
    let size = Byte::from_u64(result.size_bytes).get_appropriate_unit(UnitType::Binary);
    println!("\n{} {}", "File:".green().bold(), result.path.display());
    println!(
        "  Size: {:.2} {} | Matches: {}{}",
        size.get_value(),
        size.get_unit(),
        result.matches.len(),
        if result.truncated {
            " (truncated read)".yellow().to_string()
        } else {
            String::new()
        }
    );

    for (i, m) in result.matches.iter().enumerate() {
        println!("\n  Match {}:", i + 1);
        println!("    Type: {}", m.mode);
        println!("    Found: '{}'", m.matched.yellow().bold());
        println!("    Offset: {}", m.offset);
        if let Some(lines) = &m.line_context {
            println!("    Context (lines):");
            for line in lines.split('\n') {
                println!("      {line}");
            }
        } else {
            println!("    Context: {}", clip(&m.context_before, &m.context_after));
            if let Some(hex) = &m.hex_context {
                println!("    Hex: {}", truncate(hex, CONSOLE_CONTEXT_LIMIT));
            }
        }
    }
    println!("{}", "-".repeat(50).dimmed());
}

/// Serializes the whole summary as pretty JSON for machine consumption.
pub fn render_json(summary: &ScanSummary) -> Result<String> {
    serde_json::to_string_pretty(summary)
        .context("Failed to serialize scan summary")
        .map_err(Into::into)
}

/// Persists the results file into the scanned directory, named after the
/// sanitized pattern. Returns the path written.
pub fn save_results(summary: &ScanSummary) -> Result<PathBuf> {
    let name = format!(
        "search_results_{}.txt",
        sanitize_pattern(&summary.config.pattern)
    );
    let path = summary.config.directory.join(name);
    let mut file = fs::File::create(&path)
        .with_context(|| format!("Failed to create results file {}", path.display()))?;

    writeln!(file, "STRING SEARCH RESULTS")?;
    writeln!(file, "Pattern: '{}'", summary.config.pattern)?;
    writeln!(file, "Directory: {}", summary.config.directory.display())?;
    writeln!(file, "{}\n", "=".repeat(50))?;

    for result in &summary.files_with_matches {
        writeln!(file, "FILE: {}", result.path.display())?;
        writeln!(file, "Size: {} bytes", result.size_bytes)?;
        writeln!(file, "Matches: {}", result.matches.len())?;
        if result.truncated {
            writeln!(file, "Note: read capped; matches cover a prefix only")?;
        }
        writeln!(file)?;
        for (i, m) in result.matches.iter().enumerate() {
            writeln!(file, "  Match {}:", i + 1)?;
            writeln!(file, "    Type: {}", m.mode)?;
            writeln!(file, "    Found: '{}'", m.matched)?;
            writeln!(file, "    Position: {}", m.offset)?;
            writeln!(
                file,
                "    Context: {}",
                truncate(
                    &clip(&m.context_before, &m.context_after),
                    REPORT_CONTEXT_LIMIT
                )
            )?;
            writeln!(file)?;
        }
        writeln!(file, "{}\n", "-".repeat(40))?;
    }

    writeln!(file, "Total files scanned: {}", summary.total_files_scanned)?;
    writeln!(
        file,
        "Files with matches: {}",
        summary.files_with_matches.len()
    )?;
    for err in &summary.errors {
        writeln!(file, "ERROR: {}: {}", err.path.display(), err.message)?;
    }

    Ok(path)
}

fn clip(before: &str, after: &str) -> String {
    format!("...{before}<<MATCH>>{after}...")
}

fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        s.chars().take(limit).chain("...".chars()).collect()
    }
}

/// Replaces every character outside `[A-Za-z0-9_-]` so the pattern can name
/// the results file.
fn sanitize_pattern(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    #[test]
    fn sanitize_replaces_special_characters() {
        assert_eq!(sanitize_pattern("HTB{"), "HTB_");
        assert_eq!(sanitize_pattern("flag-2024_x"), "flag-2024_x");
        assert_eq!(sanitize_pattern("a b/c"), "a_b_c");
    }

    #[test]
    fn truncate_appends_ellipsis_past_limit() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 4), "abcd...");
    }

    #[test]
    fn save_results_writes_report_into_scanned_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = SearchConfig::new(dir.path(), "HTB{");
        let mut summary = ScanSummary::new(config);
        summary.file_scanned();

        let path = save_results(&summary).unwrap();
        assert!(path.ends_with("search_results_HTB_.txt"));
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("Pattern: 'HTB{'"));
        assert!(body.contains("Total files scanned: 1"));
    }

    #[test]
    fn json_rendering_round_trips_through_serde() {
        let config = SearchConfig::new(".", "HTB{");
        let mut summary = ScanSummary::new(config);
        summary.file_scanned();
        let json = render_json(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_files_scanned"], 1);
        assert_eq!(value["config"]["pattern"], "HTB{");
    }
}
