//! Read-only lookup tables shared by every fetch cycle.
//!
//! The LIRR tables are built in. A JSON file can replace any of them:
//! ```json
//! {
//!   "routes": { "1": "Babylon" },
//!   "stops": { "8": "Babylon" },
//!   "hub_stations": ["Jamaica", "Penn Station"],
//!   "extra_holidays": ["2024-12-24"]
//! }
//! ```
//! Omitted keys keep the built-in value.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

const LIRR_ROUTES: &[(&str, &str)] = &[
    ("1", "Babylon"),
    ("2", "Ronkonkoma"),
    ("3", "Port Jefferson"),
    ("4", "Hempstead"),
    ("5", "West Hempstead"),
    ("6", "Oyster Bay"),
    ("7", "Montauk"),
    ("8", "Port Washington"),
    ("9", "Long Beach"),
    ("10", "Far Rockaway"),
    ("12", "Greenport"),
];

const LIRR_STOPS: &[(&str, &str)] = &[
    ("101", "Penn Station"),
    ("133", "Atlantic Terminal"),
    ("125", "Jamaica"),
    ("121", "Woodside"),
    ("7", "Amityville"),
    ("8", "Babylon"),
    ("9", "Baldwin"),
    ("13", "Farmingdale"),
    ("17", "Freeport"),
    ("21", "Lindenhurst"),
    ("23", "Lynbrook"),
    ("25", "Massapequa"),
    ("26", "Massapequa Park"),
    ("29", "Merrick"),
    ("33", "Rockville Centre"),
    ("35", "Seaford"),
    ("37", "Wantagh"),
    ("41", "Huntington"),
    ("43", "Port Jefferson"),
    ("45", "Smithtown"),
    ("47", "Stony Brook"),
    ("53", "Ronkonkoma"),
    ("59", "Oyster Bay"),
    ("61", "Syosset"),
    ("63", "West Hempstead"),
    ("65", "Garden City"),
    ("67", "Hempstead"),
    ("79", "Long Beach"),
    ("81", "Island Park"),
    ("93", "Port Washington"),
    ("95", "Plandome"),
    ("97", "Manhasset"),
    ("99", "Great Neck"),
    ("103", "Little Neck"),
    ("105", "Bayside"),
    ("107", "Flushing-Main St"),
    ("113", "Far Rockaway"),
    ("119", "Hicksville"),
    ("129", "Mineola"),
    ("135", "New Hyde Park"),
    ("137", "Merillon Avenue"),
    ("701", "Grand Central Madison"),
    ("30", "Montauk"),
    ("15", "East Hampton"),
    ("19", "Hampton Bays"),
    ("31", "Patchogue"),
    ("32", "Sayville"),
    ("36", "Speonk"),
    ("38", "Westhampton"),
];

/// The ten highest-ridership stations.
const LIRR_HUB_STATIONS: &[&str] = &[
    "Jamaica",
    "Penn Station",
    "Atlantic Terminal",
    "Woodside",
    "Hicksville",
    "Ronkonkoma",
    "Huntington",
    "Mineola",
    "Freeport",
    "Lynbrook",
];

#[derive(Debug, Default, Deserialize)]
struct StaticDataFile {
    routes: Option<HashMap<String, String>>,
    stops: Option<HashMap<String, String>>,
    hub_stations: Option<Vec<String>>,
    #[serde(default)]
    extra_holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct StaticData {
    pub routes: HashMap<String, String>,
    pub stops: HashMap<String, String>,
    pub hub_stations: HashSet<String>,
    pub extra_holidays: Vec<NaiveDate>,
}

fn owned_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl StaticData {
    /// The built-in Long Island Rail Road tables.
    pub fn lirr() -> Self {
        Self {
            routes: owned_map(LIRR_ROUTES),
            stops: owned_map(LIRR_STOPS),
            hub_stations: LIRR_HUB_STATIONS.iter().map(|s| s.to_string()).collect(),
            extra_holidays: Vec::new(),
        }
    }

    /// Loads overrides from a JSON file at `path` on top of [`StaticData::lirr`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read static data at {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse static data at {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: StaticDataFile = serde_json::from_str(content)?;
        let mut data = Self::lirr();

        if let Some(routes) = file.routes {
            data.routes = routes;
        }
        if let Some(stops) = file.stops {
            data.stops = stops;
        }
        if let Some(hubs) = file.hub_stations {
            data.hub_stations = hubs.into_iter().collect();
        }
        data.extra_holidays = file.extra_holidays;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lirr_tables() {
        let data = StaticData::lirr();
        assert_eq!(data.routes.len(), 11);
        assert_eq!(data.hub_stations.len(), 10);
        assert_eq!(data.stops.get("125").map(String::as_str), Some("Jamaica"));
        assert!(data.hub_stations.contains("Woodside"));
        assert!(!data.hub_stations.contains("Babylon"));
    }

    #[test]
    fn test_from_json_overrides_only_given_tables() {
        let data = StaticData::from_json(
            r#"{ "routes": { "X": "Test Branch" }, "extra_holidays": ["2024-12-24"] }"#,
        )
        .unwrap();

        assert_eq!(data.routes.len(), 1);
        assert_eq!(data.routes["X"], "Test Branch");
        assert_eq!(data.stops.len(), LIRR_STOPS.len());
        assert_eq!(
            data.extra_holidays,
            vec![NaiveDate::from_ymd_opt(2024, 12, 24).unwrap()]
        );
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(StaticData::from_json("{ not json").is_err());
        assert!(StaticData::from_json(r#"{ "extra_holidays": ["24/12/2024"] }"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = StaticData::load("/nonexistent/static.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/static.json"));
    }
}
