use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Errors that can be raised from this library.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Result data does not match the result columns: {0}")]
    DataSchemaMismatch(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot parse connection URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported connection URL: {0}")]
    UnsupportedUrl(String),

    #[error("Cannot close connection: {0}")]
    Close(String),

    #[error("Cannot read large object: {0}")]
    LargeObject(String),

    #[error(transparent)]
    UrlEncoding(#[from] FromUtf8Error),

    #[cfg(feature = "src_sqlite")]
    #[error(transparent)]
    SQLite(#[from] rusqlite::Error),

    #[cfg(feature = "src_oracle")]
    #[error(transparent)]
    Oracle(#[from] ::oracle::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatListError {
    #[error("Lists are limited to {limit} items, got {count}.")]
    TooManyItems { count: usize, limit: usize },
}

/// Errors raised while monitoring Process Scheduler instances.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("A job failure was detected.")]
    JobFailure,

    #[error("Timeout reached after {0:?}.")]
    Timeout(Duration),

    #[error("None of the requested processes were found.")]
    NoProcesses,

    #[error("Process {instance} has an invalid run status: {status}")]
    InvalidStatus { instance: String, status: String },

    #[error("Process row is missing column `{0}`")]
    MissingColumn(&'static str),

    #[error(transparent)]
    FormatList(#[from] FormatListError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
