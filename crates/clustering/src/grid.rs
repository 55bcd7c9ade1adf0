use std::collections::BTreeMap;

use catalog::StationPoint;
use foundation::math::{GeoPoint, cell_index};
use serde::Serialize;
use tracing::warn;

use crate::cluster::{Cluster, ClusterKey, Located, Rejections, locate, mean_centroid};

/// Output of [`bucketize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridBuckets {
    pub clusters: Vec<Cluster>,
    pub rejections: Rejections,
}

/// South-west corner of a grid cell: `(floor(lat/g)*g, floor(lon/g)*g)`.
pub fn cell_origin(row: i64, col: i64, grid_size_deg: f64) -> GeoPoint {
    GeoPoint::new(row as f64 * grid_size_deg, col as f64 * grid_size_deg)
}

/// Partitions `points` into square cells of `grid_size_deg` degrees.
///
/// Every non-empty cell becomes one cluster (singleton cells included) whose
/// centroid is the unweighted mean of its members. A grid size that is
/// non-finite, non-positive, or too small for a point's cell index to fit in
/// an `i64` disables clustering: each valid point becomes its own cluster,
/// in input order.
///
/// Ordering contract:
/// - Cells are emitted in ascending `(row, col)` order.
/// - Members keep input order; the result depends only on the input
///   sequence and the grid size.
pub fn bucketize(points: &[StationPoint], grid_size_deg: f64, top_k: usize) -> GridBuckets {
    let (located, rejections) = locate(points);

    if !(grid_size_deg.is_finite() && grid_size_deg > 0.0) {
        return per_station(located, rejections, top_k);
    }

    let indexed: Option<Vec<((i64, i64), Located<'_>)>> = located
        .iter()
        .map(|l| {
            let row = cell_index(l.position.lat, grid_size_deg)?;
            let col = cell_index(l.position.lon, grid_size_deg)?;
            Some(((row, col), *l))
        })
        .collect();
    let Some(indexed) = indexed else {
        warn!("grid size {grid_size_deg} overflows cell indices; clustering per station");
        return per_station(located, rejections, top_k);
    };

    let mut cells: BTreeMap<(i64, i64), Vec<Located<'_>>> = BTreeMap::new();
    for (cell, l) in indexed {
        cells.entry(cell).or_default().push(l);
    }

    let clusters = cells
        .into_iter()
        .filter_map(|((row, col), members)| {
            let centroid = mean_centroid(members.iter().map(|l| l.position))?;
            let members = members.into_iter().map(|l| l.station.clone()).collect();
            Some(Cluster::new(
                ClusterKey::Cell { row, col },
                centroid,
                members,
                top_k,
            ))
        })
        .collect();

    GridBuckets {
        clusters,
        rejections,
    }
}

fn per_station(located: Vec<Located<'_>>, rejections: Rejections, top_k: usize) -> GridBuckets {
    let clusters = located
        .into_iter()
        .map(|l| {
            Cluster::new(
                ClusterKey::Station {
                    id: l.station.id.clone(),
                },
                l.position,
                vec![l.station.clone()],
                top_k,
            )
        })
        .collect();
    GridBuckets {
        clusters,
        rejections,
    }
}
