use std::collections::HashMap;

use catalog::{StationPoint, normalize_place};
use serde::Serialize;

use crate::cluster::{Cluster, ClusterKey, Located, Rejections, centroid_weight, locate, weighted_centroid};

/// Output of [`aggregate_by_key`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyAggregation {
    pub clusters: Vec<Cluster>,
    /// Points without a usable city plus one-member key groups, in input order.
    pub singles: Vec<StationPoint>,
    pub rejections: Rejections,
}

/// Lowercased `(city, country)` grouping key; `None` without a usable city.
///
/// Empty and `"Unknown"` values count as absent even on stations that
/// bypassed catalog normalization.
pub fn place_key(station: &StationPoint) -> Option<(String, String)> {
    let city = station.city.as_deref().and_then(normalize_place)?.to_lowercase();
    let country = station
        .country
        .as_deref()
        .and_then(normalize_place)
        .map(|c| c.to_lowercase())
        .unwrap_or_default();
    Some((city, country))
}

/// Groups stations that share an exact `(city, country)` key.
///
/// Groups of two or more become clusters with a popularity-weighted centroid
/// (weight `max(popularity, 1)`); a one-member group is demoted to `singles`
/// so it can take part in proximity merging. Clusters are emitted in
/// first-appearance order of their key.
pub fn aggregate_by_key(points: &[StationPoint], top_k: usize) -> KeyAggregation {
    let (located, rejections) = locate(points);

    let mut group_of: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<((String, String), Vec<(usize, Located<'_>)>)> = Vec::new();
    let mut singles: Vec<(usize, &StationPoint)> = Vec::new();

    for (order, l) in located.into_iter().enumerate() {
        let Some(key) = place_key(l.station) else {
            singles.push((order, l.station));
            continue;
        };
        let idx = *group_of.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push((order, l));
    }

    let mut clusters = Vec::new();
    for ((city, country), members) in groups {
        if members.len() < 2 {
            singles.extend(members.into_iter().map(|(order, l)| (order, l.station)));
            continue;
        }
        let weighted: Vec<_> = members
            .iter()
            .map(|(_, l)| (l.position, centroid_weight(l.station)))
            .collect();
        let centroid = weighted_centroid(&weighted);
        let members = members.into_iter().map(|(_, l)| l.station.clone()).collect();
        clusters.push(Cluster::new(
            ClusterKey::Place { city, country },
            centroid,
            members,
            top_k,
        ));
    }

    singles.sort_by_key(|(order, _)| *order);
    KeyAggregation {
        clusters,
        singles: singles.into_iter().map(|(_, s)| s.clone()).collect(),
        rejections,
    }
}
