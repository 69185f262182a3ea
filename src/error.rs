use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrfindError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Search pattern must not be empty")]
    InvalidPattern,

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to process file '{path}': {source}")]
    FileProcessing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StrfindError>;
