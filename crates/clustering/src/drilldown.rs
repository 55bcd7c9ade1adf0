use std::f64::consts::TAU;

use catalog::StationPoint;
use foundation::math::{GeoPoint, planar_offset};
use serde::Serialize;

use crate::cluster::Cluster;

/// Smallest drill-down circle (metres).
pub const MIN_CIRCLE_RADIUS_M: f64 = 50_000.0;
/// Circle growth per member (metres).
pub const CIRCLE_RADIUS_PER_MEMBER_M: f64 = 5_000.0;
/// Circle radius cap (metres).
pub const MAX_CIRCLE_RADIUS_M: f64 = 150_000.0;
/// Radial members sit this far out relative to the circle radius.
pub const PLACEMENT_RADIUS_FACTOR: f64 = 1.2;

/// Camera distance for a one-member cluster before the per-member pull-in (metres).
pub const BASE_CAMERA_DISTANCE_M: f64 = 1_000_000.0;
/// Camera pull-in per member (metres).
pub const CAMERA_DISTANCE_PER_MEMBER_M: f64 = 10_000.0;
/// Closest suggested camera distance (metres).
pub const MIN_CAMERA_DISTANCE_M: f64 = 300_000.0;

/// One top member placed around the cluster centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub station: StationPoint,
    pub angle_rad: f64,
    pub radius_m: f64,
    pub position: GeoPoint,
}

/// Radial layout shown after a cluster is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDownPlan {
    pub circle_center: GeoPoint,
    pub circle_radius_m: f64,
    pub camera_distance_m: f64,
    pub placements: Vec<Placement>,
}

/// `min(150 km, 50 km + 5 km per member)`.
pub fn circle_radius_m(member_count: usize) -> f64 {
    (MIN_CIRCLE_RADIUS_M + member_count as f64 * CIRCLE_RADIUS_PER_MEMBER_M).min(MAX_CIRCLE_RADIUS_M)
}

/// `max(300 km, 1000 km - 10 km per member)`; denser clusters get a closer view.
pub fn camera_distance_m(member_count: usize) -> f64 {
    (BASE_CAMERA_DISTANCE_M - member_count as f64 * CAMERA_DISTANCE_PER_MEMBER_M)
        .max(MIN_CAMERA_DISTANCE_M)
}

/// Lays the cluster's top members out evenly on a circle.
///
/// Member `i` of `n` sits at angle `2*pi*i/n`, `1.2 * circle_radius_m` from
/// the centroid. Positions use the planar degree offset from `foundation`,
/// not a geodesic destination.
pub fn plan_drill_down(cluster: &Cluster) -> DrillDownPlan {
    let member_count = cluster.len();
    let circle_radius = circle_radius_m(member_count);
    let radius = PLACEMENT_RADIUS_FACTOR * circle_radius;
    let n = cluster.top_members.len();

    let placements = cluster
        .top_members
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let angle = TAU * i as f64 / n as f64;
            let position = planar_offset(cluster.centroid, radius * angle.cos(), radius * angle.sin());
            Placement {
                station: station.clone(),
                angle_rad: angle,
                radius_m: radius,
                position,
            }
        })
        .collect();

    DrillDownPlan {
        circle_center: cluster.centroid,
        circle_radius_m: circle_radius,
        camera_distance_m: camera_distance_m(member_count),
        placements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterKey, DEFAULT_TOP_K};
    use crate::testing::station;

    fn cluster_of(n: usize, centroid: GeoPoint) -> Cluster {
        let members = (0..n)
            .map(|i| station(&format!("m{i}"), centroid.lat, centroid.lon).with_popularity(i as u64))
            .collect();
        Cluster::new(
            ClusterKey::Proximity { seed_id: "m0".into() },
            centroid,
            members,
            DEFAULT_TOP_K,
        )
    }

    #[test]
    fn circle_radius_is_monotonic_and_capped() {
        assert_eq!(circle_radius_m(2), 60_000.0);
        assert_eq!(circle_radius_m(10), 100_000.0);
        assert_eq!(circle_radius_m(20), 150_000.0);
        assert_eq!(circle_radius_m(50), 150_000.0);
        assert_eq!(circle_radius_m(1000), 150_000.0);

        let mut prev = 0.0;
        for n in [1, 2, 5, 10, 19, 20, 21, 50, 1000] {
            let r = circle_radius_m(n);
            assert!(r >= prev);
            assert!(r <= MAX_CIRCLE_RADIUS_M);
            prev = r;
        }
    }

    #[test]
    fn camera_distance_decreases_to_floor() {
        assert_eq!(camera_distance_m(2), 980_000.0);
        assert_eq!(camera_distance_m(70), 300_000.0);
        assert_eq!(camera_distance_m(1000), 300_000.0);
        assert!(camera_distance_m(10) > camera_distance_m(11));
    }

    #[test]
    fn places_top_members_evenly() {
        let plan = plan_drill_down(&cluster_of(4, GeoPoint::new(0.0, 0.0)));
        assert_eq!(plan.circle_radius_m, 70_000.0);
        assert_eq!(plan.camera_distance_m, 960_000.0);
        assert_eq!(plan.placements.len(), 4);

        // Most popular first, at angle 0 (due east).
        assert_eq!(plan.placements[0].station.id, "m3");
        assert_eq!(plan.placements[0].angle_rad, 0.0);
        assert!((plan.placements[0].radius_m - 84_000.0).abs() < 1e-6);
        assert!((plan.placements[0].position.lon - 8.4).abs() < 1e-9);
        assert!(plan.placements[0].position.lat.abs() < 1e-9);

        // Quarter turn puts the second member due north.
        assert!((plan.placements[1].angle_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((plan.placements[1].position.lat - 8.4).abs() < 1e-9);
    }

    #[test]
    fn only_top_k_members_are_placed() {
        let plan = plan_drill_down(&cluster_of(12, GeoPoint::new(10.0, 10.0)));
        assert_eq!(plan.placements.len(), DEFAULT_TOP_K);
        assert_eq!(plan.circle_radius_m, 110_000.0);
        assert_eq!(plan.circle_center, GeoPoint::new(10.0, 10.0));
        assert!(plan.placements.iter().all(|p| p.position.is_valid()));
    }
}
