//! Error taxonomy for loading, transforming and presenting the feeds.
//!
//! Every error is fatal to the current render: callers propagate with `?`
//! and nothing downstream tries to salvage a partial dashboard.

use thiserror::Error;

/// Unified error type for all dashboard operations.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The remote feed could not be reached or answered with a non-success status.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The remote feed did not answer within the configured timeout.
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    /// A local feed file or output file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimiter, encoding or schema assumptions about a feed did not hold.
    #[error("parse error in feed '{feed}': {message}")]
    Parse { feed: String, message: String },

    /// A district could not be matched between the centroid table and the summary.
    #[error("join error for district '{district}': {message}")]
    Join { district: String, message: String },

    /// The selected district is not a column of the daily series.
    #[error("district '{district}' is not in the daily series (available: {})", .available.join(", "))]
    Selection {
        district: String,
        available: Vec<String>,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Creates a parse error for the named feed.
    pub fn parse(feed: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::Parse {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Creates a join error for the named district.
    pub fn join(district: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::Join {
            district: district.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error tagged with the path that failed.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Network { .. } => "network_error",
            DashboardError::Timeout { .. } => "timeout_error",
            DashboardError::Io { .. } => "io_error",
            DashboardError::Parse { .. } => "parse_error",
            DashboardError::Join { .. } => "join_error",
            DashboardError::Selection { .. } => "selection_error",
            DashboardError::Config(_) => "config_error",
            DashboardError::Csv(_) => "csv_error",
            DashboardError::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
