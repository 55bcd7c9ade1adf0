use catalog::{StationKind, StationPoint, normalize_place};
use foundation::math::{GeoPoint, InvalidCoordinate};
use serde::{Deserialize, Serialize};

/// Fallback text for clusters without a provable place label.
pub const NEUTRAL_LABEL: &str = "Cluster";

/// Default number of members exposed through `Cluster::top_members`.
pub const DEFAULT_TOP_K: usize = 5;

/// Identity of a cluster within one recomputation.
///
/// Keys are stable across recomputations with the same inputs, which lets a
/// renderer match old and new clusters before comparing them structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClusterKey {
    /// Grid cell `(floor(lat / g), floor(lon / g))`.
    Cell { row: i64, col: i64 },
    /// Lowercased `(city, country)`; an absent country is the empty string.
    Place { city: String, country: String },
    /// Proximity group, named after the station that seeded it.
    Proximity { seed_id: String },
    /// Unclustered zoom tier: one cluster per station.
    Station { id: String },
}

/// An aggregation of one or more stations shown as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub key: ClusterKey,
    pub centroid: GeoPoint,
    /// Members in input order.
    pub members: Vec<StationPoint>,
    pub label: Option<String>,
    /// At most K members, popularity descending, ties in input order.
    pub top_members: Vec<StationPoint>,
}

impl Cluster {
    /// Assembles a cluster, deriving its label and top members.
    pub fn new(key: ClusterKey, centroid: GeoPoint, members: Vec<StationPoint>, top_k: usize) -> Self {
        let label = uniform_label(&members);
        let top_members = top_members(&members, top_k);
        Self {
            key,
            centroid,
            members,
            label,
            top_members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Single-member clusters may be presented as an individual marker.
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(NEUTRAL_LABEL)
    }

    /// `(audio, video)` member counts.
    pub fn kind_counts(&self) -> (usize, usize) {
        self.members
            .iter()
            .fold((0, 0), |(audio, video), s| match s.kind {
                StationKind::Audio => (audio + 1, video),
                StationKind::Video => (audio, video + 1),
            })
    }
}

/// Points excluded before aggregation, by reason.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Rejections {
    pub non_finite: usize,
    pub out_of_range: usize,
}

impl Rejections {
    pub fn total(&self) -> usize {
        self.non_finite + self.out_of_range
    }

    pub fn record(&mut self, reason: InvalidCoordinate) {
        match reason {
            InvalidCoordinate::NonFinite => self.non_finite += 1,
            InvalidCoordinate::OutOfRange => self.out_of_range += 1,
        }
    }

    pub fn merge(&mut self, other: Rejections) {
        self.non_finite += other.non_finite;
        self.out_of_range += other.out_of_range;
    }
}

/// A station together with its validated position.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Located<'a> {
    pub station: &'a StationPoint,
    pub position: GeoPoint,
}

/// Splits `points` into placeable stations (input order kept) and counts the rest.
pub(crate) fn locate(points: &[StationPoint]) -> (Vec<Located<'_>>, Rejections) {
    let mut rejections = Rejections::default();
    let mut located = Vec::with_capacity(points.len());
    for station in points {
        match station.position() {
            Ok(position) => located.push(Located { station, position }),
            Err(reason) => rejections.record(reason),
        }
    }
    (located, rejections)
}

/// Unweighted mean of positions, summed in iteration order.
pub fn mean_centroid(positions: impl IntoIterator<Item = GeoPoint>) -> Option<GeoPoint> {
    let mut n = 0usize;
    let (mut lat, mut lon) = (0.0, 0.0);
    for p in positions {
        lat += p.lat;
        lon += p.lon;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some(GeoPoint::new(lat / n, lon / n))
}

/// Weight of a station in popularity-weighted centroids (never zero).
pub fn centroid_weight(station: &StationPoint) -> f64 {
    station.popularity.max(1) as f64
}

/// Popularity-weighted mean position.
///
/// # Panics
/// Panics if the total weight is zero. The weight floor of 1 makes this
/// unreachable for non-empty input; an empty slice trips it too.
pub fn weighted_centroid(members: &[(GeoPoint, f64)]) -> GeoPoint {
    let mut total = 0.0;
    let (mut lat, mut lon) = (0.0, 0.0);
    for (p, w) in members {
        lat += p.lat * w;
        lon += p.lon * w;
        total += w;
    }
    assert!(
        total > 0.0,
        "degenerate cluster: total centroid weight is {total} over {} members",
        members.len()
    );
    GeoPoint::new(lat / total, lon / total)
}

/// First `k` members by popularity descending; ties keep input order.
pub fn top_members(members: &[StationPoint], k: usize) -> Vec<StationPoint> {
    let mut order: Vec<&StationPoint> = members.iter().collect();
    // sort_by is stable, so equal popularity keeps input order.
    order.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    order.into_iter().take(k).cloned().collect()
}

/// Place label that every member agrees on.
///
/// A field is uniform when all of its present values are equal (trimmed,
/// case-insensitive). Empty and `"Unknown"` values count as absent, however
/// the station was built. `"{city}, {country}"` when both are uniform and
/// present, the city alone when only the city is, otherwise `None`.
/// The spelling comes from the first member carrying the value.
pub fn uniform_label(members: &[StationPoint]) -> Option<String> {
    let city = uniform_field(members.iter().map(|s| s.city.as_deref()))?;
    match uniform_field(members.iter().map(|s| s.country.as_deref())) {
        Some(country) => Some(format!("{city}, {country}")),
        None => Some(city),
    }
}

fn uniform_field<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut first: Option<String> = None;
    for v in values.flatten().filter_map(normalize_place) {
        match &first {
            None => first = Some(v),
            Some(f) if f.to_lowercase() == v.to_lowercase() => {}
            Some(_) => return None,
        }
    }
    first
}
