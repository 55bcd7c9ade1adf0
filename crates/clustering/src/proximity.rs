use catalog::StationPoint;
use foundation::math::{GeoPoint, degree_distance};
use serde::Serialize;

use crate::cluster::{Cluster, ClusterKey, Rejections, locate};

/// Default merge radius in degrees.
pub const DEFAULT_PROXIMITY_THRESHOLD_DEG: f64 = 0.5;

/// Output of [`merge_by_proximity`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityMerge {
    pub clusters: Vec<Cluster>,
    /// Points that ended up alone in their group, in input order.
    pub singles: Vec<StationPoint>,
    pub rejections: Rejections,
}

struct Group<'a> {
    centroid: GeoPoint,
    members: Vec<&'a StationPoint>,
}

/// Greedy single-pass union of nearby points.
///
/// Each point joins the first open group (in creation order) whose running
/// centroid lies within `threshold_deg` (inclusive) in degree space, and the
/// group centroid moves to `(old * (n - 1) + point) / n`. Otherwise the point
/// seeds a new group. Groups of two or more become clusters keeping that
/// running unweighted mean; one-member groups stay single.
///
/// Distances are planar in degrees, so longitude spacing is overstated
/// towards the poles. Cost is O(points x groups).
pub fn merge_by_proximity(
    singles: &[StationPoint],
    threshold_deg: f64,
    top_k: usize,
) -> ProximityMerge {
    let (located, rejections) = locate(singles);

    let mut groups: Vec<Group<'_>> = Vec::new();
    for l in located {
        let hit = groups
            .iter_mut()
            .find(|g| degree_distance(g.centroid, l.position) <= threshold_deg);
        match hit {
            Some(group) => {
                group.members.push(l.station);
                let n = group.members.len() as f64;
                group.centroid = GeoPoint::new(
                    (group.centroid.lat * (n - 1.0) + l.position.lat) / n,
                    (group.centroid.lon * (n - 1.0) + l.position.lon) / n,
                );
            }
            None => groups.push(Group {
                centroid: l.position,
                members: vec![l.station],
            }),
        }
    }

    let mut clusters = Vec::new();
    let mut remaining: Vec<&StationPoint> = Vec::new();
    for group in groups {
        if group.members.len() < 2 {
            remaining.extend(group.members);
            continue;
        }
        let seed_id = group.members[0].id.clone();
        let members = group.members.into_iter().cloned().collect();
        clusters.push(Cluster::new(
            ClusterKey::Proximity { seed_id },
            group.centroid,
            members,
            top_k,
        ));
    }

    // Groups are in seed order, so singleton seeds are already in input order.
    ProximityMerge {
        clusters,
        singles: remaining.into_iter().cloned().collect(),
        rejections,
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PROXIMITY_THRESHOLD_DEG, merge_by_proximity};
    use crate::cluster::{ClusterKey, DEFAULT_TOP_K};
    use crate::testing::{SplitMix, random_catalog, station};
    use foundation::math::GeoPoint;
    use pretty_assertions::assert_eq;

    fn ids(stations: &[catalog::StationPoint]) -> Vec<&str> {
        stations.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn nearby_points_merge_with_running_mean() {
        let points = vec![
            station("a", 0.0, 0.0),
            station("b", 0.4, 0.0),
            station("c", 0.2, 0.3),
            station("far", 20.0, 20.0),
        ];
        let out = merge_by_proximity(&points, DEFAULT_PROXIMITY_THRESHOLD_DEG, DEFAULT_TOP_K);

        assert_eq!(out.clusters.len(), 1);
        let c = &out.clusters[0];
        assert_eq!(ids(&c.members), vec!["a", "b", "c"]);
        assert_eq!(c.key, ClusterKey::Proximity { seed_id: "a".into() });
        // (0,0) -> (0.2,0) -> ((0.2*2+0.2)/3, (0*2+0.3)/3)
        assert!((c.centroid.lat - 0.2).abs() < 1e-12);
        assert!((c.centroid.lon - 0.1).abs() < 1e-12);
        assert_eq!(ids(&out.singles), vec!["far"]);
    }

    #[test]
    fn first_qualifying_group_wins() {
        // "mid" is within range of both seeds; it must join the older one.
        let points = vec![
            station("west", 0.0, 0.0),
            station("east", 0.0, 0.8),
            station("mid", 0.0, 0.4),
        ];
        let out = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
        assert_eq!(out.clusters.len(), 1);
        assert_eq!(ids(&out.clusters[0].members), vec!["west", "mid"]);
        assert_eq!(ids(&out.singles), vec!["east"]);
    }

    #[test]
    fn threshold_is_inclusive_and_measured_to_the_running_centroid() {
        let points = vec![station("a", 0.0, 0.0), station("b", 0.0, 0.5)];
        let out = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
        assert_eq!(out.clusters.len(), 1);
        assert_eq!(out.clusters[0].centroid, GeoPoint::new(0.0, 0.25));

        // Seed moved to 0.25, so 0.8 is 0.55 away from the running centroid.
        let points = vec![
            station("a", 0.0, 0.0),
            station("b", 0.0, 0.5),
            station("c", 0.0, 0.8),
        ];
        let out = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
        assert_eq!(ids(&out.clusters[0].members), vec!["a", "b"]);
        assert_eq!(ids(&out.singles), vec!["c"]);
    }

    #[test]
    fn running_centroid_is_unweighted() {
        let points = vec![
            station("a", 0.0, 0.0).with_popularity(1000),
            station("b", 0.2, 0.2),
        ];
        let out = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
        assert_eq!(out.clusters[0].centroid, GeoPoint::new(0.1, 0.1));
    }

    #[test]
    fn invalid_points_never_join_groups() {
        let points = vec![
            station("a", 0.0, 0.0),
            station("nan", f64::NAN, f64::NAN),
            station("b", 0.1, 0.1),
            station("south", -95.0, 0.0),
        ];
        let out = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
        assert_eq!(out.rejections.total(), 2);
        assert_eq!(ids(&out.clusters[0].members), vec!["a", "b"]);
        assert!(out.singles.is_empty());
    }

    #[test]
    fn randomized_merges_conserve_points() {
        for seed in 0..16 {
            let mut rng = SplitMix::new(seed);
            let points = random_catalog(&mut rng, 250);
            let a = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
            let b = merge_by_proximity(&points, 0.5, DEFAULT_TOP_K);
            assert_eq!(a, b);

            let clustered: usize = a.clusters.iter().map(|c| c.len()).sum();
            assert_eq!(clustered + a.singles.len() + a.rejections.total(), points.len());
            assert!(a.clusters.iter().all(|c| c.len() >= 2));
        }
    }
}
