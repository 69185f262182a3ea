use crate::config::DEFAULT_PATTERN;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search in
    #[clap(default_value = ".")]
    pub directory: PathBuf,

    /// Pattern to search for
    #[clap(default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Match the pattern exactly as given instead of trying case variants
    #[clap(long, value_parser, default_value_t = false)]
    pub case_sensitive: bool,

    /// Do not descend into subdirectories
    #[clap(long, value_parser, default_value_t = false)]
    pub no_recursive: bool,

    /// Suppress the banner and progress output
    #[clap(short, long, value_parser, default_value_t = false)]
    pub quiet: bool,

    /// Per-file read cap in MiB; larger files are scanned up to the cap
    #[clap(long, value_parser)]
    pub max_size: Option<u64>,

    /// Write log output to a file instead of stderr
    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
