//! Feed loading: fetch, decode, parse and reshape the three published feeds.

use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{FeedConfig, FeedSpec};
use crate::error::Result;
use crate::fetch::{HttpClient, load_source};
use crate::parser::parse_feed;
use crate::table::Table;
use crate::transform::geo::GeoTable;
use crate::transform::types::{AgeGroupSummary, DailySeries, DistrictSummary};
use crate::transform::{prepare_age_groups, prepare_series, prepare_summary};

/// Everything one render needs, rebuilt from scratch on every load.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub summary: DistrictSummary,
    pub series: DailySeries,
    pub age_groups: AgeGroupSummary,
    pub geo: GeoTable,
}

/// Fetches one feed and parses it into a [`Table`].
#[tracing::instrument(skip(client, spec), fields(feed = %spec.name, source = %spec.source))]
pub async fn load_feed<C: HttpClient>(
    client: &C,
    spec: &FeedSpec,
    timeout: Duration,
) -> Result<Table> {
    let bytes = load_source(client, &spec.source, timeout).await?;
    let table = parse_feed(&spec.name, &bytes, spec.delimiter, spec.encoding)?;
    info!(
        rows = table.row_count(),
        columns = table.columns().len(),
        "Feed loaded"
    );
    Ok(table)
}

/// Loads all three feeds one after another and reshapes them.
///
/// The first failure aborts the load; nothing partial is returned.
#[tracing::instrument(skip_all)]
pub async fn load_dashboard<C: HttpClient>(client: &C, config: &FeedConfig) -> Result<DashboardData> {
    let started = Instant::now();

    let geo = match &config.geo_table_path {
        Some(path) => GeoTable::load(path)?,
        None => GeoTable::builtin(),
    };

    let raw = load_feed(client, &config.district_table, config.timeout).await?;
    let summary = prepare_summary(&config.district_table.name, raw)?;

    let raw = load_feed(client, &config.daily_series, config.timeout).await?;
    let series = prepare_series(&config.daily_series.name, raw)?;

    let raw = load_feed(client, &config.age_table, config.timeout).await?;
    let age_groups = prepare_age_groups(&config.age_table.name, raw)?;

    info!(
        districts = summary.rows.len(),
        days = series.len(),
        age_groups = age_groups.rows.len(),
        geo_version = %geo.version,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dashboard data loaded"
    );

    Ok(DashboardData {
        summary,
        series,
        age_groups,
        geo,
    })
}
