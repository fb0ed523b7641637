//! Render-ready payloads for the dashboard page.
//!
//! [`build_view`] turns loaded [`DashboardData`] plus one district selection
//! into a [`DashboardView`] that a table, bar chart, pie pair and heatmap can
//! consume without further transformation.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::loader::DashboardData;
use crate::transform::geo::{Hotspot, join_hotspots};
use crate::transform::normalize::columns;
use crate::transform::types::{AgeGroupSummary, CITY_TOTAL, DistrictSummary};

pub const TITLE: &str = "COVID-19 Cases in Berlin";
pub const UPDATE_TIME_LABEL: &str = "12pm";

const COLUMN_NOTES: [(&str, &str); 4] = [
    (columns::NUMBER_OF_CASES, "Total number of cases."),
    (
        columns::DIFFERENCE,
        "Today's cases minus(-) previous day's cases.",
    ),
    (
        columns::INCIDENCE,
        "Cases per 100,000 people since the beginning of the pandemic.",
    ),
    (
        columns::RECOVERY,
        "Estimated number of recovered lab-confirmed cases, according to Robert Koch Institute definition.",
    ),
];

/// The district whose daily series is charted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(String);

impl Selection {
    pub fn new(district: impl Into<String>) -> Self {
        Self(district.into())
    }

    pub fn district(&self) -> &str {
        &self.0
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self(CITY_TOTAL.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastUpdated {
    pub date: String,
    pub time_label: &'static str,
}

impl LastUpdated {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            time_label: UPDATE_TIME_LABEL,
        }
    }
}

impl std::fmt::Display for LastUpdated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.date, self.time_label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNote {
    pub column: &'static str,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub cases: Option<i64>,
}

/// Bar chart of the selected district's daily cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictChart {
    pub title: &'static str,
    pub x_label: String,
    pub y_label: &'static str,
    pub points: Vec<SeriesPoint>,
}

/// Two pie charts sharing the age-group labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCharts {
    pub title: &'static str,
    pub labels: Vec<String>,
    pub total_cases: Vec<i64>,
    pub todays_cases: Vec<i64>,
    pub subplot_titles: [&'static str; 2],
}

impl AgeCharts {
    pub fn from_summary(ages: &AgeGroupSummary) -> Self {
        Self {
            title: "Cases by Age Group",
            labels: ages.rows.iter().map(|r| r.age_group.clone()).collect(),
            total_cases: ages.rows.iter().map(|r| r.number_of_cases).collect(),
            todays_cases: ages.rows.iter().map(|r| r.difference).collect(),
            subplot_titles: ["Total cases", "Today's cases"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapLayer {
    pub opacity: f64,
    pub cell_size_pixels: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotMap {
    pub title: &'static str,
    pub geo_version: String,
    pub view_state: MapViewState,
    pub layer: HeatmapLayer,
    pub points: Vec<Hotspot>,
    pub caption: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub rows: DistrictSummary,
    pub column_notes: Vec<ColumnNote>,
}

/// The complete page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub last_updated: LastUpdated,
    pub summary: SummaryTable,
    pub selection: SelectionState,
    pub district_chart: DistrictChart,
    pub age_charts: AgeCharts,
    pub hotspots: HotspotMap,
}

/// Builds the page for one selected district.
///
/// # Errors
///
/// Returns a selection error if the district is not a column of the daily
/// series, and a join error if the centroids and summary disagree.
#[tracing::instrument(skip(data), fields(selected = %selection.district()))]
pub fn build_view(data: &DashboardData, selection: &Selection, today: NaiveDate) -> Result<DashboardView> {
    let district_chart = district_chart(data, selection)?;
    let points = join_hotspots(&data.geo, &data.summary)?;

    debug!(
        points = district_chart.points.len(),
        hotspots = points.len(),
        "View built"
    );

    Ok(DashboardView {
        title: TITLE,
        last_updated: LastUpdated::on(today),
        summary: SummaryTable {
            rows: data.summary.clone(),
            column_notes: COLUMN_NOTES
                .iter()
                .map(|&(column, note)| ColumnNote { column, note })
                .collect(),
        },
        selection: SelectionState {
            options: data.summary.districts(),
            selected: selection.district().to_string(),
        },
        district_chart,
        age_charts: AgeCharts::from_summary(&data.age_groups),
        hotspots: HotspotMap {
            title: "Current Hot Spots",
            geo_version: data.geo.version.clone(),
            view_state: MapViewState {
                latitude: 52.5,
                longitude: 13.38,
                zoom: 9.3,
                pitch: 20.0,
            },
            layer: HeatmapLayer {
                opacity: 0.5,
                cell_size_pixels: 15,
            },
            points,
            caption: "Colors represent the difference between today's cases and previous day's cases.",
        },
    })
}

/// The selected district's column of the daily series.
pub fn district_chart(data: &DashboardData, selection: &Selection) -> Result<DistrictChart> {
    let column = data
        .series
        .column(selection.district())
        .ok_or_else(|| DashboardError::Selection {
            district: selection.district().to_string(),
            available: data.series.column_names(),
        })?;

    Ok(DistrictChart {
        title: "Cases by District",
        x_label: column.name.clone(),
        y_label: "Cases",
        points: data
            .series
            .dates
            .iter()
            .zip(&column.values)
            .map(|(&date, &cases)| SeriesPoint { date, cases })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::geo::GeoTable;
    use crate::transform::types::{
        AgeGroupRow, DISTRICTS, DailySeries, DistrictSummaryRow, SeriesColumn,
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_data() -> DashboardData {
        let mut rows: Vec<_> = DISTRICTS
            .iter()
            .map(|d| DistrictSummaryRow {
                district: d.to_string(),
                number_of_cases: 10,
                difference: 1,
                incidence: 5.0,
                recovery: 9,
            })
            .collect();
        rows.push(DistrictSummaryRow {
            district: CITY_TOTAL.to_string(),
            number_of_cases: 120,
            difference: 12,
            incidence: 5.0,
            recovery: 108,
        });

        DashboardData {
            summary: DistrictSummary { rows },
            series: DailySeries {
                dates: vec![date("2023-01-01"), date("2023-01-02")],
                columns: vec![
                    SeriesColumn {
                        name: "Mitte".to_string(),
                        values: vec![Some(5), None],
                    },
                    SeriesColumn {
                        name: CITY_TOTAL.to_string(),
                        values: vec![Some(5), Some(0)],
                    },
                ],
            },
            age_groups: AgeGroupSummary {
                rows: vec![AgeGroupRow {
                    age_group: "0-4 years".to_string(),
                    number_of_cases: 7,
                    difference: 2,
                }],
            },
            geo: GeoTable::builtin(),
        }
    }

    #[test]
    fn test_default_selection_is_city_total() {
        assert_eq!(Selection::default().district(), "Berlin");
    }

    #[test]
    fn test_build_view_for_default_selection() {
        let view = build_view(&sample_data(), &Selection::default(), date("2026-10-19")).unwrap();

        assert_eq!(view.last_updated.to_string(), "2026-10-19, 12pm");
        assert_eq!(view.selection.selected, "Berlin");
        assert_eq!(view.selection.options.len(), 13);
        assert_eq!(view.district_chart.x_label, "Berlin");
        assert_eq!(view.district_chart.points.len(), 2);
        assert_eq!(view.hotspots.points.len(), 12);
        assert_eq!(view.age_charts.total_cases, vec![7]);
        assert_eq!(view.age_charts.todays_cases, vec![2]);
        assert_eq!(view.summary.column_notes.len(), 4);
    }

    #[test]
    fn test_selected_district_series_keeps_gaps() {
        let chart = district_chart(&sample_data(), &Selection::new("Mitte")).unwrap();
        assert_eq!(chart.points[0].cases, Some(5));
        assert_eq!(chart.points[1].cases, None);
    }

    #[test]
    fn test_unknown_selection_is_error() {
        let err = build_view(&sample_data(), &Selection::new("Pankow"), date("2026-10-19"))
            .unwrap_err();
        match err {
            DashboardError::Selection {
                district,
                available,
            } => {
                assert_eq!(district, "Pankow");
                assert_eq!(available, vec!["Mitte", "Berlin"]);
            }
            other => panic!("expected selection error, got {other:?}"),
        }
    }

    #[test]
    fn test_view_serializes_with_display_names() {
        let view = build_view(&sample_data(), &Selection::default(), date("2026-10-19")).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["summary"]["rows"][0]["District"], "Charlottenburg-Wilmersdorf");
        assert_eq!(json["summary"]["rows"][0]["Number of cases"], 10);
        assert_eq!(json["district_chart"]["points"][0]["date"], "2023-01-01");
        assert_eq!(json["hotspots"]["view_state"]["zoom"], 9.3);
        assert_eq!(json["last_updated"]["time_label"], "12pm");
    }
}
