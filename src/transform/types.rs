//! Typed views over the normalized feed tables.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::{DashboardError, Result};
use crate::table::{Column, ColumnData, Table};
use crate::transform::normalize::columns;

/// Label of the city-wide aggregate row and series column.
pub const CITY_TOTAL: &str = "Berlin";

/// The 12 Berlin boroughs, with their proper German spelling.
pub const DISTRICTS: [&str; 12] = [
    "Charlottenburg-Wilmersdorf",
    "Friedrichshain-Kreuzberg",
    "Lichtenberg",
    "Marzahn-Hellersdorf",
    "Mitte",
    "Neukölln",
    "Pankow",
    "Reinickendorf",
    "Spandau",
    "Steglitz-Zehlendorf",
    "Tempelhof-Schöneberg",
    "Treptow-Köpenick",
];

pub fn is_district(name: &str) -> bool {
    DISTRICTS.contains(&name)
}

/// One row of the district table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummaryRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Number of cases")]
    pub number_of_cases: i64,
    #[serde(rename = "Difference")]
    pub difference: i64,
    #[serde(rename = "Incidence")]
    pub incidence: f64,
    #[serde(rename = "Recovery")]
    pub recovery: i64,
}

/// Per-district totals, one row per district plus the city-wide row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistrictSummary {
    pub rows: Vec<DistrictSummaryRow>,
}

impl DistrictSummary {
    /// Reads a renamed district table.
    ///
    /// District names must be unique and drawn from the 12 boroughs or [`CITY_TOTAL`].
    pub fn from_table(feed: &str, table: &Table) -> Result<Self> {
        let district = required(feed, table, columns::DISTRICT)?;
        let cases = required(feed, table, columns::NUMBER_OF_CASES)?;
        let difference = required(feed, table, columns::DIFFERENCE)?;
        let incidence = required(feed, table, columns::INCIDENCE)?;
        let recovery = required(feed, table, columns::RECOVERY)?;

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            let name = text_cell(feed, district, row)?;
            if name != CITY_TOTAL && !is_district(&name) {
                return Err(DashboardError::parse(
                    feed,
                    format!("unknown district '{name}' in row {}", row + 1),
                ));
            }
            if !seen.insert(name.clone()) {
                return Err(DashboardError::parse(
                    feed,
                    format!("district '{name}' appears more than once"),
                ));
            }

            rows.push(DistrictSummaryRow {
                district: name,
                number_of_cases: int_cell(feed, cases, row)?,
                difference: int_cell(feed, difference, row)?,
                incidence: float_cell(feed, incidence, row)?,
                recovery: int_cell(feed, recovery, row)?,
            });
        }

        Ok(Self { rows })
    }

    /// District names in feed order; these are the selectable options.
    pub fn districts(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.district.clone()).collect()
    }
}

/// One district column of the daily series. `None` is a missing report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub name: String,
    pub values: Vec<Option<i64>>,
}

/// Daily new cases, one row per reporting date and one column per district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SeriesColumn>,
}

impl DailySeries {
    /// Reads a renamed, aggregated series table. Every column except `Date` must be numeric.
    pub fn from_table(feed: &str, table: &Table) -> Result<Self> {
        let date_column = required(feed, table, columns::DATE)?;
        let dates = (0..table.row_count())
            .map(|row| {
                let raw = text_cell(feed, date_column, row)?;
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    DashboardError::parse(
                        feed,
                        format!("row {}: '{raw}' is not a YYYY-MM-DD date", row + 1),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let columns = table
            .columns()
            .iter()
            .filter(|c| c.name != columns::DATE)
            .map(|c| {
                Ok(SeriesColumn {
                    name: c.name.clone(),
                    values: int_values(feed, c)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { dates, columns })
    }

    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One age bracket; the label already carries its unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupRow {
    #[serde(rename = "Age group")]
    pub age_group: String,
    #[serde(rename = "Number of cases")]
    pub number_of_cases: i64,
    #[serde(rename = "Difference")]
    pub difference: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AgeGroupSummary {
    pub rows: Vec<AgeGroupRow>,
}

impl AgeGroupSummary {
    /// Reads a normalized age table (trailing rows already dropped).
    pub fn from_table(feed: &str, table: &Table) -> Result<Self> {
        let label = required(feed, table, columns::AGE_GROUP)?;
        let cases = required(feed, table, columns::NUMBER_OF_CASES)?;
        let difference = required(feed, table, columns::DIFFERENCE)?;

        let rows = (0..table.row_count())
            .map(|row| {
                Ok(AgeGroupRow {
                    age_group: text_cell(feed, label, row)?,
                    number_of_cases: int_cell(feed, cases, row)?,
                    difference: int_cell(feed, difference, row)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }
}

fn required<'t>(feed: &str, table: &'t Table, name: &str) -> Result<&'t Column> {
    table.column(name).ok_or_else(|| {
        DashboardError::parse(
            feed,
            format!(
                "missing column '{name}' (found: {})",
                table.column_names().join(", ")
            ),
        )
    })
}

fn missing(feed: &str, column: &Column, row: usize) -> DashboardError {
    DashboardError::parse(
        feed,
        format!("row {}: missing value in column '{}'", row + 1, column.name),
    )
}

fn text_cell(feed: &str, column: &Column, row: usize) -> Result<String> {
    column
        .data
        .text_at(row)
        .ok_or_else(|| missing(feed, column, row))
}

fn int_cell(feed: &str, column: &Column, row: usize) -> Result<i64> {
    match &column.data {
        ColumnData::Integer(v) => v[row].ok_or_else(|| missing(feed, column, row)),
        other => Err(DashboardError::parse(
            feed,
            format!(
                "column '{}' should be integer but is {}",
                column.name,
                other.type_name()
            ),
        )),
    }
}

fn float_cell(feed: &str, column: &Column, row: usize) -> Result<f64> {
    if !column.data.is_numeric() {
        return Err(DashboardError::parse(
            feed,
            format!("column '{}' should be numeric but is text", column.name),
        ));
    }
    column
        .data
        .f64_at(row)
        .ok_or_else(|| missing(feed, column, row))
}

/// Integer values of a series column. An all-missing column reads as all `None`.
fn int_values(feed: &str, column: &Column) -> Result<Vec<Option<i64>>> {
    match &column.data {
        ColumnData::Integer(v) => Ok(v.clone()),
        ColumnData::Text(v) if v.iter().all(Option::is_none) => Ok(vec![None; v.len()]),
        other => Err(DashboardError::parse(
            feed,
            format!(
                "series column '{}' should be integer counts but is {}",
                column.name,
                other.type_name()
            ),
        )),
    }
}
