use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Orchestration stage of a `fetch_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validating,
    Ordering,
    Resolving,
    Downloading,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validating => "validating",
            Stage::Ordering => "ordering",
            Stage::Resolving => "resolving",
            Stage::Downloading => "downloading",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Underlying transport or I/O failure kept as an error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {value:?} (expected one of: {expected})")]
    InvalidParameter {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("order request failed: {reason}")]
    OrderFailed {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("download link generation failed: {reason}")]
    UrlGenerationFailed {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("download failed: {reason}")]
    DownloadFailed {
        reason: String,
        /// Set when an incomplete file was left at the destination.
        partial_file: Option<PathBuf>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The stage that failed, `None` for errors raised outside an orchestration.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::InvalidParameter { .. } => Some(Stage::Validating),
            Error::OrderFailed { .. } => Some(Stage::Ordering),
            Error::UrlGenerationFailed { .. } => Some(Stage::Resolving),
            Error::DownloadFailed { .. } => Some(Stage::Downloading),
            Error::Config(_) => None,
        }
    }

    pub fn partial_file(&self) -> Option<&Path> {
        match self {
            Error::DownloadFailed { partial_file, .. } => partial_file.as_deref(),
            _ => None,
        }
    }

    /// Whether a request or transfer timed out somewhere in the source chain.
    pub fn is_timeout(&self) -> bool {
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            if let Some(e) = err.downcast_ref::<reqwest::Error>() {
                if e.is_timeout() {
                    return true;
                }
            }
            if let Some(e) = err.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    return true;
                }
            }
            cause = err.source();
        }
        false
    }

    pub(crate) fn invalid(field: &'static str, value: &str, expected: &[&str]) -> Self {
        Error::InvalidParameter {
            field,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }

    pub(crate) fn order(reason: impl Into<String>) -> Self {
        Error::OrderFailed {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn activation(reason: impl Into<String>) -> Self {
        Error::UrlGenerationFailed {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn download(reason: impl Into<String>, partial_file: Option<PathBuf>) -> Self {
        Error::DownloadFailed {
            reason: reason.into(),
            partial_file,
            source: None,
        }
    }

    /// Attach the underlying failure to a stage error.
    pub(crate) fn with_source(mut self, err: impl Into<BoxError>) -> Self {
        match &mut self {
            Error::OrderFailed { source, .. }
            | Error::UrlGenerationFailed { source, .. }
            | Error::DownloadFailed { source, .. } => *source = Some(err.into()),
            Error::InvalidParameter { .. } | Error::Config(_) => {}
        }
        self
    }
}
