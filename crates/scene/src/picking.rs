use catalog::StationPoint;
use clustering::{Cluster, ClusterSet};
use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{GeoPoint, degree_distance};

/// What a pick at a globe position resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum PickTarget<'a> {
    Station(&'a StationPoint),
    Cluster(&'a Cluster),
}

impl PickTarget<'_> {
    /// The selection event this pick should feed into.
    pub fn to_event(&self) -> crate::selection::SelectionEvent {
        use crate::selection::SelectionEvent;
        match self {
            PickTarget::Station(station) => SelectionEvent::PickStation {
                station: (*station).clone(),
            },
            PickTarget::Cluster(cluster) => SelectionEvent::PickCluster {
                cluster: (*cluster).clone(),
            },
        }
    }
}

/// Deterministic nearest-marker picking.
///
/// Ordering contract:
/// - The marker closest to `at` in degree space wins.
/// - On equal distance, clusters beat singles, then the lower index wins.
/// - Markers farther than `max_distance_deg` are ignored; `None` means the
///   pick landed on empty globe.
///
/// Single-member clusters resolve to their station so the host can treat
/// them as an individual marker.
pub fn pick_nearest<'a>(set: &'a ClusterSet, at: GeoPoint, max_distance_deg: f64) -> Option<PickTarget<'a>> {
    // (distance, tier, index)
    let mut best: Option<(f64, u8, usize)> = None;
    let candidates = set
        .clusters
        .iter()
        .enumerate()
        .map(|(i, c)| (degree_distance(c.centroid, at), 0u8, i))
        .chain(set.singles.iter().enumerate().filter_map(|(i, s)| {
            let p = s.position().ok()?;
            Some((degree_distance(p, at), 1u8, i))
        }));

    for (d, tier, idx) in candidates {
        if !(d <= max_distance_deg) {
            continue;
        }
        best = match best {
            None => Some((d, tier, idx)),
            Some(b) => {
                let ord = stable_total_cmp_f64(d, b.0)
                    .then_with(|| tier.cmp(&b.1))
                    .then_with(|| idx.cmp(&b.2));
                if ord.is_lt() { Some((d, tier, idx)) } else { Some(b) }
            }
        };
    }

    let (_, tier, idx) = best?;
    if tier == 1 {
        return Some(PickTarget::Station(&set.singles[idx]));
    }
    let cluster = &set.clusters[idx];
    if cluster.is_singleton() {
        Some(PickTarget::Station(&cluster.members[0]))
    } else {
        Some(PickTarget::Cluster(cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::{PickTarget, pick_nearest};
    use crate::selection::SelectionEvent;
    use catalog::{StationKind, StationPoint};
    use clustering::{ClusteringConfig, GridPolicy, Strategy, cluster_with_policy};
    use foundation::math::GeoPoint;

    fn station(id: &str, lat: f64, lon: f64) -> StationPoint {
        StationPoint::new(id, id, StationKind::Audio, lat, lon)
    }

    fn grid_set(points: &[StationPoint]) -> clustering::ClusterSet {
        cluster_with_policy(
            points,
            &ClusteringConfig::default(),
            GridPolicy::Cells { grid_size_deg: 1.0 },
        )
    }

    #[test]
    fn picks_closest_cluster_within_range() {
        let set = grid_set(&[
            station("a", 40.0, -73.9),
            station("b", 40.2, -73.5),
            station("c", 10.0, 10.0),
        ]);
        match pick_nearest(&set, GeoPoint::new(40.1, -73.8), 0.5) {
            Some(PickTarget::Cluster(c)) => assert_eq!(c.len(), 2),
            other => panic!("expected cluster, got {other:?}"),
        }
        assert!(pick_nearest(&set, GeoPoint::new(0.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn singleton_clusters_resolve_to_their_station() {
        let set = grid_set(&[station("solo", 10.0, 10.0)]);
        let target = pick_nearest(&set, GeoPoint::new(10.0, 10.0), 0.1).unwrap();
        assert_eq!(target, PickTarget::Station(&set.clusters[0].members[0]));
        assert!(matches!(target.to_event(), SelectionEvent::PickStation { .. }));
    }

    #[test]
    fn ties_prefer_clusters_then_lower_index() {
        let cfg = ClusteringConfig {
            strategy: Strategy::Semantic,
            ..ClusteringConfig::default()
        };
        let points = vec![
            station("p1", 0.0, 1.0).with_place(Some("A"), None),
            station("p2", 0.0, 1.0).with_place(Some("A"), None),
            station("lonely", 0.0, -1.0),
        ];
        let set = cluster_with_policy(&points, &cfg, GridPolicy::PerStation);
        assert_eq!(set.singles.len(), 1);

        // Equidistant from the cluster at lon 1 and the single at lon -1.
        match pick_nearest(&set, GeoPoint::new(0.0, 0.0), 2.0) {
            Some(PickTarget::Cluster(c)) => assert_eq!(c.members[0].id, "p1"),
            other => panic!("expected cluster, got {other:?}"),
        }
    }
}
