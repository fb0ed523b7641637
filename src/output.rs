//! Output formatting and persistence for dashboard payloads.
//!
//! Supports JSON logging and serialization, and CSV export.

use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::loader::DashboardData;
use crate::transform::geo::Hotspot;
use crate::transform::normalize::columns;
use crate::transform::types::DailySeries;

/// Logs a payload as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a payload as pretty-printed JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, body).map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Serializes rows as CSV with a header line.
pub fn rows_to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    into_bytes(writer)
}

/// The daily series in wide form: `Date` followed by one column per district.
///
/// A column shorter than the date index leaves its trailing cells empty.
pub fn series_to_csv(series: &DailySeries) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header = vec![columns::DATE.to_string()];
    header.extend(series.column_names());
    writer.write_record(&header)?;

    for (row, date) in series.dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(
            series
                .columns
                .iter()
                .map(|c| {
                    c.values
                        .get(row)
                        .copied()
                        .flatten()
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                }),
        );
        writer.write_record(&record)?;
    }

    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DashboardError::Csv(e.into_error().into()))
}

/// Writes every table of a load into `dir`, optionally gzip-compressed.
///
/// Returns the paths written, in order: summary, daily series, age groups, hotspots.
#[tracing::instrument(skip(data, hotspots), fields(dir = %dir.display()))]
pub fn export_tables(
    dir: &Path,
    data: &DashboardData,
    hotspots: &[Hotspot],
    gzip: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir.display().to_string(), e))?;

    let files = [
        ("summary.csv", rows_to_csv(&data.summary.rows)?),
        ("daily_series.csv", series_to_csv(&data.series)?),
        ("age_groups.csv", rows_to_csv(&data.age_groups.rows)?),
        ("hotspots.csv", rows_to_csv(hotspots)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, body) in files {
        let path = write_file(dir, name, &body, gzip)?;
        written.push(path);
    }

    info!(files = written.len(), "Export complete");
    Ok(written)
}

fn write_file(dir: &Path, name: &str, body: &[u8], gzip: bool) -> Result<PathBuf> {
    let (path, contents) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        let path = dir.join(format!("{name}.gz"));
        let io_err = |e| DashboardError::io(path.display().to_string(), e);
        encoder.write_all(body).map_err(io_err)?;
        (path.clone(), encoder.finish().map_err(io_err)?)
    } else {
        (dir.join(name), body.to_vec())
    };

    let mut file =
        File::create(&path).map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    file.write_all(&contents)
        .map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    debug!(path = %path.display(), bytes = contents.len(), "Table written");
    Ok(path)
}
