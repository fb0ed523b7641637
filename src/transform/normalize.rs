//! Column renaming and district-name corrections.

use std::collections::HashMap;

use crate::error::{DashboardError, Result};
use crate::table::{Column, ColumnData, Table};

/// Display column names used after normalization.
pub mod columns {
    pub const DISTRICT: &str = "District";
    pub const NUMBER_OF_CASES: &str = "Number of cases";
    pub const DIFFERENCE: &str = "Difference";
    pub const INCIDENCE: &str = "Incidence";
    pub const RECOVERY: &str = "Recovery";
    pub const DATE: &str = "Date";
    pub const AGE_GROUP: &str = "Age group";
}

pub const DISTRICT_TABLE_COLUMNS: &[(&str, &str)] = &[
    ("Bezirk", columns::DISTRICT),
    ("Fallzahl", columns::NUMBER_OF_CASES),
    ("Differenz", columns::DIFFERENCE),
    ("Inzidenz", columns::INCIDENCE),
    ("Genesen", columns::RECOVERY),
];

pub const DAILY_SERIES_COLUMNS: &[(&str, &str)] = &[("Datum", columns::DATE)];

/// The series feed spells umlauts as ASCII digraphs in its headers.
pub const DISTRICT_NAME_FIXES: &[(&str, &str)] = &[
    ("Neukoelln", "Neukölln"),
    ("Tempelhof-Schoeneberg", "Tempelhof-Schöneberg"),
    ("Treptow-Koepenick", "Treptow-Köpenick"),
];

pub const AGE_TABLE_COLUMNS: &[(&str, &str)] = &[
    ("Altersgruppe", columns::AGE_GROUP),
    ("Fallzahl", columns::NUMBER_OF_CASES),
    ("Differenz", columns::DIFFERENCE),
];

/// Rows at the end of the age feed that are not age brackets.
pub const AGE_TABLE_TRAILING_ROWS: usize = 2;

pub const AGE_GROUP_SUFFIX: &str = " years";

/// Renames columns per `pairs`; unmapped columns pass through unchanged.
///
/// Fails if two columns end up with the same name.
pub fn rename_columns(feed: &str, table: Table, pairs: &[(&str, &str)]) -> Result<Table> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    let table = table.rename(&map);
    if let Some(name) = table.duplicate_column() {
        return Err(DashboardError::parse(
            feed,
            format!("column '{name}' appears more than once after renaming"),
        ));
    }
    Ok(table)
}

pub fn normalize_district_table(feed: &str, table: Table) -> Result<Table> {
    rename_columns(feed, table, DISTRICT_TABLE_COLUMNS)
}

/// Renames the date column and corrects the transliterated district headers.
pub fn normalize_daily_series(feed: &str, table: Table) -> Result<Table> {
    let table = rename_columns(feed, table, DAILY_SERIES_COLUMNS)?;
    rename_columns(feed, table, DISTRICT_NAME_FIXES)
}

/// Renames the age table, drops its trailing non-bracket rows and suffixes each label.
pub fn normalize_age_table(feed: &str, table: Table) -> Result<Table> {
    let table = rename_columns(feed, table, AGE_TABLE_COLUMNS)?;

    let raw_rows = table.row_count();
    if raw_rows < AGE_TABLE_TRAILING_ROWS {
        return Err(DashboardError::parse(
            feed,
            format!("expected at least {AGE_TABLE_TRAILING_ROWS} rows, found {raw_rows}"),
        ));
    }
    let mut table = table.truncate(raw_rows - AGE_TABLE_TRAILING_ROWS);

    let labels = table
        .column(columns::AGE_GROUP)
        .ok_or_else(|| DashboardError::parse(feed, "missing column 'Age group'"))?;
    let suffixed = (0..table.row_count())
        .map(|row| labels.data.text_at(row).map(|l| format!("{l}{AGE_GROUP_SUFFIX}")))
        .collect();
    if !table.set_column(Column {
        name: columns::AGE_GROUP.to_string(),
        data: ColumnData::Text(suffixed),
    }) {
        return Err(DashboardError::parse(feed, "age group labels do not match row count"));
    }

    Ok(table)
}
