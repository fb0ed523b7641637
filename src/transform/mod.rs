//! Reshaping of the raw feed tables into typed dashboard data.
//!
//! Each `prepare_*` function takes a freshly parsed table and runs the steps
//! for its feed in order: rename, correct, aggregate, then convert to typed rows.

pub mod aggregate;
pub mod geo;
pub mod normalize;
pub mod types;

use crate::error::Result;
use crate::table::Table;
use aggregate::append_total;
use normalize::{columns, normalize_age_table, normalize_daily_series, normalize_district_table};
use types::{AgeGroupSummary, CITY_TOTAL, DailySeries, DistrictSummary};

pub fn prepare_summary(feed: &str, raw: Table) -> Result<DistrictSummary> {
    DistrictSummary::from_table(feed, &normalize_district_table(feed, raw)?)
}

/// Renames the series and then appends the city-wide total.
///
/// Renaming comes first so the corrected district names are the ones summed.
pub fn prepare_series(feed: &str, raw: Table) -> Result<DailySeries> {
    let table = normalize_daily_series(feed, raw)?;
    let table = append_total(feed, table, CITY_TOTAL, &[columns::DATE])?;
    DailySeries::from_table(feed, &table)
}

pub fn prepare_age_groups(feed: &str, raw: Table) -> Result<AgeGroupSummary> {
    AgeGroupSummary::from_table(feed, &normalize_age_table(feed, raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;

    #[test]
    fn test_series_total_after_rename() {
        let raw = parse_table(
            "daily_series",
            "Datum;Mitte;Pankow\n2023-01-01;5;3\n2023-01-02;2;7\n",
            b';',
        )
        .unwrap();
        let series = prepare_series("daily_series", raw).unwrap();

        assert_eq!(series.column_names(), vec!["Mitte", "Pankow", "Berlin"]);
        assert_eq!(
            series.column("Berlin").unwrap().values,
            vec![Some(8), Some(9)]
        );
        assert_eq!(series.dates[0].to_string(), "2023-01-01");
    }

    #[test]
    fn test_total_matches_district_sum_on_every_row() {
        let raw = parse_table(
            "daily_series",
            "Datum;Mitte;Neukoelln;Spandau\n\
             2023-01-01;5;;1\n\
             2023-01-02;0;4;9\n\
             2023-01-03;12;3;\n",
            b';',
        )
        .unwrap();
        let series = prepare_series("daily_series", raw).unwrap();
        let total = series.column(CITY_TOTAL).unwrap();

        for row in 0..series.len() {
            let sum: i64 = series
                .columns
                .iter()
                .filter(|c| c.name != CITY_TOTAL)
                .map(|c| c.values[row].unwrap_or(0))
                .sum();
            assert_eq!(total.values[row], Some(sum));
        }
        assert!(series.column("Neukölln").is_some());
    }

    #[test]
    fn test_series_total_overflow_is_rejected() {
        let raw = parse_table(
            "daily_series",
            "Datum;Mitte;Pankow\n2023-01-01;9223372036854775807;1\n",
            b';',
        )
        .unwrap();
        let err = prepare_series("daily_series", raw).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_series_with_colliding_corrected_header_is_rejected() {
        let raw = parse_table(
            "daily_series",
            "Datum;Neukoelln;Neukölln\n2023-01-01;1;2\n",
            b';',
        )
        .unwrap();
        let err = prepare_series("daily_series", raw).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_prepare_summary_renames_german_headers() {
        let raw = parse_table(
            "district_table",
            "Bezirk;Fallzahl;Differenz;Inzidenz;Genesen\nMitte;10;1;3.5;8\n",
            b';',
        )
        .unwrap();
        let summary = prepare_summary("district_table", raw).unwrap();
        assert_eq!(summary.rows[0].number_of_cases, 10);
        assert_eq!(summary.rows[0].recovery, 8);
    }
}
