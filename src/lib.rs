pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod progress;
pub mod report;
pub mod results;
pub mod scanner;
pub mod variants;

pub use crate::classifier::{classify, SourceMode};
pub use crate::config::SearchConfig;
pub use crate::error::{Result, StrfindError};
pub use crate::progress::{ProgressSink, ScanProgress, SilentProgress};
pub use crate::results::{FileResult, MatchRecord, ScanError, ScanSummary};
pub use crate::scanner::Scanner;
pub use crate::variants::{build_variants, CaseForm, PatternVariant, VariantKind};
pub use clap::Parser;
