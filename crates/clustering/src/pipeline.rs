use catalog::StationPoint;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cluster::{Cluster, Rejections};
use crate::config::{ClusteringConfig, Strategy};
use crate::grid::bucketize;
use crate::key::aggregate_by_key;
use crate::proximity::merge_by_proximity;
use crate::tiers::GridPolicy;

/// Result of one full recomputation over a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSet {
    pub strategy: Strategy,
    /// Policy the zoom table chose; informational for the semantic strategy.
    pub policy: GridPolicy,
    pub clusters: Vec<Cluster>,
    /// Individually shown stations (always empty for the grid strategy).
    pub singles: Vec<StationPoint>,
    pub rejections: Rejections,
}

impl ClusterSet {
    /// Stations accounted for by clusters and singles.
    pub fn placed_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum::<usize>() + self.singles.len()
    }
}

/// Clusters `points` for a camera at `altitude_m` using `config`.
///
/// Pure: the result depends only on the arguments, so repeated calls for the
/// same snapshot and tier produce equal sets.
pub fn cluster_catalog(points: &[StationPoint], config: &ClusteringConfig, altitude_m: f64) -> ClusterSet {
    let policy = config.tiers.policy_for_altitude(altitude_m);
    cluster_with_policy(points, config, policy)
}

/// Like [`cluster_catalog`] with an explicit grid policy.
pub fn cluster_with_policy(points: &[StationPoint], config: &ClusteringConfig, policy: GridPolicy) -> ClusterSet {
    let set = match config.strategy {
        Strategy::Grid => {
            let buckets = bucketize(points, policy.grid_size_deg(), config.top_k);
            ClusterSet {
                strategy: Strategy::Grid,
                policy,
                clusters: buckets.clusters,
                singles: Vec::new(),
                rejections: buckets.rejections,
            }
        }
        Strategy::Semantic => {
            let keyed = aggregate_by_key(points, config.top_k);
            // Singles were already validated, so the merge sees no new rejections.
            let merged = merge_by_proximity(&keyed.singles, config.proximity_threshold_deg, config.top_k);
            let mut rejections = keyed.rejections;
            rejections.merge(merged.rejections);

            let mut clusters = keyed.clusters;
            clusters.extend(merged.clusters);
            ClusterSet {
                strategy: Strategy::Semantic,
                policy,
                clusters,
                singles: merged.singles,
                rejections,
            }
        }
    };

    if set.rejections.total() > 0 {
        warn!(
            "excluded {} stations with invalid coordinates ({} non-finite, {} out of range)",
            set.rejections.total(),
            set.rejections.non_finite,
            set.rejections.out_of_range
        );
    }
    debug!(
        strategy = ?set.strategy,
        policy = ?set.policy,
        clusters = set.clusters.len(),
        singles = set.singles.len(),
        "reclustered {} stations",
        points.len()
    );
    set
}
