//! Feed sources and runtime settings.
//!
//! Values come from built-in defaults, overridden by environment variables
//! (a `.env` file is loaded by the binary), overridden in turn by CLI flags.

use std::time::Duration;

use crate::error::{DashboardError, Result};

pub const DEFAULT_DISTRICT_TABLE_URL: &str =
    "http://ftp.berlinonline.de/lageso/corona/csv/bezirkstabelle.csv";
pub const DEFAULT_DAILY_SERIES_URL: &str =
    "http://ftp.berlinonline.de/lageso/corona/csv/meldedatum_bezirk.csv";
pub const DEFAULT_AGE_TABLE_URL: &str =
    "http://ftp.berlinonline.de/lageso/corona/csv/alterstabelle.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Text encoding a feed is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEncoding {
    /// ISO-8859-1, decoded through the Windows-1252 superset.
    Latin1,
    Utf8,
}

/// Where a feed lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub name: String,
    /// An `http(s)://` URL or a local file path.
    pub source: String,
    pub delimiter: u8,
    pub encoding: FeedEncoding,
}

impl FeedSpec {
    pub fn new(name: &str, source: impl Into<String>, encoding: FeedEncoding) -> Self {
        Self {
            name: name.to_string(),
            source: source.into(),
            delimiter: b';',
            encoding,
        }
    }
}

/// The three feeds plus fetch and geo settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub district_table: FeedSpec,
    pub daily_series: FeedSpec,
    pub age_table: FeedSpec,
    pub timeout: Duration,
    /// Optional JSON file replacing the built-in district centroids.
    pub geo_table_path: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            district_table: FeedSpec::new(
                "district_table",
                DEFAULT_DISTRICT_TABLE_URL,
                FeedEncoding::Latin1,
            ),
            daily_series: FeedSpec::new(
                "daily_series",
                DEFAULT_DAILY_SERIES_URL,
                FeedEncoding::Utf8,
            ),
            age_table: FeedSpec::new("age_table", DEFAULT_AGE_TABLE_URL, FeedEncoding::Latin1),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            geo_table_path: None,
        }
    }
}

/// Overrides supplied on the command line; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub district_table: Option<String>,
    pub daily_series: Option<String>,
    pub age_table: Option<String>,
    pub timeout_secs: Option<u64>,
    pub geo_table_path: Option<String>,
}

impl FeedConfig {
    /// Builds the config from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DISTRICT_TABLE_URL") {
            config.district_table.source = url;
        }
        if let Some(url) = lookup("DAILY_SERIES_URL") {
            config.daily_series.source = url;
        }
        if let Some(url) = lookup("AGE_TABLE_URL") {
            config.age_table.source = url;
        }
        if let Some(raw) = lookup("FETCH_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                DashboardError::Config(format!("FETCH_TIMEOUT_SECS is not a number: '{raw}'"))
            })?;
            config.timeout = timeout_from_secs(secs)?;
        }
        config.geo_table_path = lookup("GEO_TABLE_PATH").filter(|p| !p.is_empty());

        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(source) = overrides.district_table {
            self.district_table.source = source;
        }
        if let Some(source) = overrides.daily_series {
            self.daily_series.source = source;
        }
        if let Some(source) = overrides.age_table {
            self.age_table.source = source;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = timeout_from_secs(secs)?;
        }
        if overrides.geo_table_path.is_some() {
            self.geo_table_path = overrides.geo_table_path;
        }
        Ok(self)
    }
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(DashboardError::Config(
            "fetch timeout must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
