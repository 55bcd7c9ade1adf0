use std::collections::HashSet;
use std::path::Path;

use foundation::math::{GeoPoint, InvalidCoordinate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Broadcast medium of a station.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    Audio,
    Video,
}

impl StationKind {
    /// Parses the wire `type` field (`"radio"`/`"tv"` plus their canonical names).
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "radio" | "audio" => Some(StationKind::Audio),
            "tv" | "video" => Some(StationKind::Video),
            _ => None,
        }
    }
}

/// One point-located broadcast entity.
///
/// Coordinates are stored exactly as supplied. Validity is decided by the
/// clustering engine, which excludes and counts bad points rather than
/// coercing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPoint {
    pub id: String,
    pub name: String,
    pub kind: StationKind,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub popularity: u64,
}

impl StationPoint {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: StationKind,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            latitude,
            longitude,
            city: None,
            country: None,
            popularity: 0,
        }
    }

    pub fn with_place(mut self, city: Option<&str>, country: Option<&str>) -> Self {
        self.city = city.and_then(normalize_place);
        self.country = country.and_then(normalize_place);
        self
    }

    pub fn with_popularity(mut self, popularity: u64) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn position(&self) -> Result<GeoPoint, InvalidCoordinate> {
        GeoPoint::validate(self.latitude, self.longitude)
    }
}

/// Trims a place name; empty strings and `"Unknown"` count as absent.
pub fn normalize_place(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Wire form of a station as produced by catalog loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "votes")]
    pub popularity: Option<u64>,
}

fn default_kind() -> String {
    "radio".to_string()
}

/// What the loader skipped while building a [`Catalog`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub missing_coordinates: usize,
    pub unknown_kind: usize,
    pub duplicate_ids: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.missing_coordinates + self.unknown_kind + self.duplicate_ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "catalog read error: {msg}"),
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<StationRecord>),
    Wrapped { stations: Vec<StationRecord> },
}

/// Read-only, ordered station snapshot.
///
/// Catalog order is significant: popularity ties are broken by it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    stations: Vec<StationPoint>,
}

impl Catalog {
    pub fn new(stations: Vec<StationPoint>) -> Self {
        Self { stations }
    }

    pub fn from_records(records: impl IntoIterator<Item = StationRecord>) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stations = Vec::new();

        for record in records {
            let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
                report.missing_coordinates += 1;
                continue;
            };
            let Some(kind) = StationKind::from_wire(&record.kind) else {
                debug!("station {} has unknown kind {:?}", record.id, record.kind);
                report.unknown_kind += 1;
                continue;
            };
            if !seen.insert(record.id.clone()) {
                report.duplicate_ids += 1;
                continue;
            }

            stations.push(StationPoint {
                id: record.id,
                name: record.name.trim().to_string(),
                kind,
                latitude,
                longitude,
                city: record.city.as_deref().and_then(normalize_place),
                country: record.country.as_deref().and_then(normalize_place),
                popularity: record.popularity.unwrap_or(0),
            });
        }

        report.loaded = stations.len();
        if report.skipped() > 0 {
            warn!(
                "catalog skipped {} records (missing coordinates: {}, unknown kind: {}, duplicate ids: {})",
                report.skipped(),
                report.missing_coordinates,
                report.unknown_kind,
                report.duplicate_ids
            );
        }
        (Self { stations }, report)
    }

    /// Accepts either a bare JSON array of records or `{ "stations": [...] }`.
    pub fn from_json_str(raw: &str) -> Result<(Self, LoadReport), CatalogError> {
        let doc = serde_json::from_str::<CatalogDocument>(raw)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let records = match doc {
            CatalogDocument::List(records) => records,
            CatalogDocument::Wrapped { stations } => stations,
        };
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: &Path) -> Result<(Self, LoadReport), CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn stations(&self) -> &[StationPoint] {
        &self.stations
    }

    pub fn get(&self, id: &str) -> Option<&StationPoint> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn into_stations(self) -> Vec<StationPoint> {
        self.stations
    }
}
