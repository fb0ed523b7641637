//! District centroids and the hotspot join.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::transform::types::{CITY_TOTAL, DistrictSummary};

/// Version tag of the built-in centroid table (borough boundaries since the 2001 reform).
pub const BUILTIN_GEO_VERSION: &str = "berlin-bezirke-2001";

const BUILTIN_CENTROIDS: [(&str, f64, f64); 12] = [
    ("Charlottenburg-Wilmersdorf", 52.5053, 13.2600),
    ("Friedrichshain-Kreuzberg", 52.4996, 13.4314),
    ("Lichtenberg", 52.5336, 13.4999),
    ("Marzahn-Hellersdorf", 52.5229, 13.5766),
    ("Mitte", 52.531677, 13.381777),
    ("Neukölln", 52.4408, 13.4445),
    ("Pankow", 52.5929, 13.4317),
    ("Spandau", 52.5352, 13.2003),
    ("Steglitz-Zehlendorf", 52.4309, 13.1927),
    ("Tempelhof-Schöneberg", 52.4722, 13.3703),
    ("Treptow-Köpenick", 52.4204, 13.6200),
    ("Reinickendorf", 52.5790, 13.2805),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictCentroid {
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A versioned set of district centroids.
///
/// Stored on disk as:
/// ```json
/// {
///   "version": "berlin-bezirke-2001",
///   "districts": [
///     { "district": "Mitte", "latitude": 52.531677, "longitude": 13.381777 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTable {
    pub version: String,
    pub districts: Vec<DistrictCentroid>,
}

impl GeoTable {
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_GEO_VERSION.to_string(),
            districts: BUILTIN_CENTROIDS
                .iter()
                .map(|&(district, latitude, longitude)| DistrictCentroid {
                    district: district.to_string(),
                    latitude,
                    longitude,
                })
                .collect(),
        }
    }

    /// Loads a replacement table from a JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        let table: GeoTable = serde_json::from_str(&content)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for centroid in &self.districts {
            if !seen.insert(centroid.district.as_str()) {
                return Err(DashboardError::Config(format!(
                    "geo table {}: district '{}' listed twice",
                    self.version, centroid.district
                )));
            }
            if !(-90.0..=90.0).contains(&centroid.latitude)
                || !(-180.0..=180.0).contains(&centroid.longitude)
            {
                return Err(DashboardError::Config(format!(
                    "geo table {}: coordinates of '{}' out of range",
                    self.version, centroid.district
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, district: &str) -> Option<&DistrictCentroid> {
        self.districts.iter().find(|c| c.district == district)
    }
}

/// Heatmap weight for one district: its day-over-day case change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Difference")]
    pub difference: i64,
}

/// Joins centroids with the summary's `Difference` on district name.
///
/// The city-wide row is skipped. Any other district present on only one
/// side is a join error. Output follows the geo table's order.
pub fn join_hotspots(geo: &GeoTable, summary: &DistrictSummary) -> Result<Vec<Hotspot>> {
    for row in &summary.rows {
        if row.district != CITY_TOTAL && geo.get(&row.district).is_none() {
            return Err(DashboardError::join(
                &row.district,
                format!("no centroid in geo table {}", geo.version),
            ));
        }
    }

    let hotspots = geo
        .districts
        .iter()
        .map(|centroid| {
            let row = summary
                .rows
                .iter()
                .find(|r| r.district == centroid.district)
                .ok_or_else(|| {
                    DashboardError::join(&centroid.district, "missing from district table")
                })?;
            Ok(Hotspot {
                district: centroid.district.clone(),
                latitude: centroid.latitude,
                longitude: centroid.longitude,
                difference: row.difference,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(hotspots = hotspots.len(), geo_version = %geo.version, "Hotspots joined");
    Ok(hotspots)
}
