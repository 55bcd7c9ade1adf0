use std::collections::HashMap;

use crate::cluster::{Cluster, ClusterKey};

/// Changes between two cluster sets, matched by [`ClusterKey`].
///
/// Ordering contract:
/// - `added`, `changed` and `unchanged` follow the order of the new set.
/// - `removed` follows the order of the old set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClusterDiff<'a> {
    pub added: Vec<&'a Cluster>,
    pub removed: Vec<&'a Cluster>,
    /// `(old, new)` pairs sharing a key but differing structurally.
    pub changed: Vec<(&'a Cluster, &'a Cluster)>,
    pub unchanged: Vec<&'a Cluster>,
}

impl ClusterDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Structural diff a renderer can apply instead of rebuilding every entity.
pub fn diff_cluster_sets<'a>(old: &'a [Cluster], new: &'a [Cluster]) -> ClusterDiff<'a> {
    let old_by_key: HashMap<&ClusterKey, &Cluster> = old.iter().map(|c| (&c.key, c)).collect();
    let new_by_key: HashMap<&ClusterKey, &Cluster> = new.iter().map(|c| (&c.key, c)).collect();

    let mut diff = ClusterDiff::default();
    for cluster in new {
        match old_by_key.get(&cluster.key).copied() {
            None => diff.added.push(cluster),
            Some(prev) if prev == cluster => diff.unchanged.push(cluster),
            Some(prev) => diff.changed.push((prev, cluster)),
        }
    }
    diff.removed = old
        .iter()
        .filter(|c| !new_by_key.contains_key(&c.key))
        .collect();
    diff
}

#[cfg(test)]
mod tests {
    use super::diff_cluster_sets;
    use crate::cluster::DEFAULT_TOP_K;
    use crate::grid::bucketize;
    use crate::testing::station;

    #[test]
    fn same_input_diffs_to_nothing() {
        let points = vec![station("a", 1.0, 1.0), station("b", 1.2, 1.3), station("c", 9.0, 9.0)];
        let old = bucketize(&points, 1.0, DEFAULT_TOP_K).clusters;
        let new = bucketize(&points, 1.0, DEFAULT_TOP_K).clusters;
        let diff = diff_cluster_sets(&old, &new);
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged.len(), 2);
    }

    #[test]
    fn reports_added_removed_and_changed_cells() {
        let before = vec![station("a", 1.0, 1.0), station("c", 9.0, 9.0)];
        let after = vec![
            station("a", 1.0, 1.0),
            station("b", 1.5, 1.5),
            station("d", -20.0, 30.0),
        ];
        let old = bucketize(&before, 1.0, DEFAULT_TOP_K).clusters;
        let new = bucketize(&after, 1.0, DEFAULT_TOP_K).clusters;
        let diff = diff_cluster_sets(&old, &new);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].members[0].id, "d");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].members[0].id, "c");
        assert_eq!(diff.changed.len(), 1);
        let (prev, next) = diff.changed[0];
        assert_eq!(prev.len(), 1);
        assert_eq!(next.len(), 2);
        assert!(diff.unchanged.is_empty());
    }
}
