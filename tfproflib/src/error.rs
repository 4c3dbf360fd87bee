//! Error types for tfproflib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a Terraform log
#[derive(Error, Debug)]
pub enum TfProfError {
    /// A line was recognized by a handler but could not be decomposed
    /// into its expected parts. The whole parse is aborted.
    #[error("{stage}: unable to parse line '{line}'")]
    MalformedLine { stage: &'static str, line: String },

    /// A handler tried to update a resource that was never registered
    /// by a start, refresh or plan line.
    #[error("unable to find resource '{0}' in log")]
    ResourceNotFound(String),

    /// A duration literal did not match "10s" or "1m30s"
    #[error("unable to parse duration '{0}'")]
    InvalidDuration(String),

    /// Invalid sort specification (expected "column=asc|desc,...")
    #[error("invalid sort spec '{0}'")]
    InvalidSortSpec(String),

    /// A resource query that is invalid even after translation to a regex
    #[error("invalid resource query '{0}'")]
    InvalidQuery(String),

    /// Failed to read the input log
    #[error("failed to read log '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
