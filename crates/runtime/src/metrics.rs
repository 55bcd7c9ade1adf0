use std::collections::BTreeMap;

use clustering::ClusterSet;

/// Monotonic recluster counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Submitted,
    Skipped,
    Accepted,
    Stale,
}

impl Counter {
    pub fn name(self) -> &'static str {
        match self {
            Counter::Submitted => "recluster.submitted",
            Counter::Skipped => "recluster.skipped",
            Counter::Accepted => "recluster.accepted",
            Counter::Stale => "recluster.stale",
        }
    }
}

/// Last-value readings describing the accepted cluster set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gauge {
    Clusters,
    Singles,
}

impl Gauge {
    pub fn name(self) -> &'static str {
        match self {
            Gauge::Clusters => "clusters.count",
            Gauge::Singles => "singles.count",
        }
    }
}

/// Per-recluster distributions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distribution {
    RejectedPoints,
}

impl Distribution {
    pub fn name(self) -> &'static str {
        match self {
            Distribution::RejectedPoints => "clusters.rejected_points",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl Histogram {
    pub fn record(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }
}

/// Named readings in declaration order of their kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, u64)>,
    pub histograms: Vec<(&'static str, Histogram)>,
}

/// Recluster bookkeeping kept by the scheduler.
///
/// Nothing here reads the clock; keys are typed and kept in ordered maps so
/// two runs over the same requests produce equal snapshots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    gauges: BTreeMap<Gauge, u64>,
    histograms: BTreeMap<Distribution, Histogram>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, counter: Counter) {
        *self.counters.entry(counter).or_insert(0) += 1;
    }

    pub fn gauge(&self, gauge: Gauge) -> Option<u64> {
        self.gauges.get(&gauge).copied()
    }

    pub fn histogram(&self, distribution: Distribution) -> Option<Histogram> {
        self.histograms.get(&distribution).copied()
    }

    /// Records the shape of an accepted cluster set.
    pub fn record_cluster_set(&mut self, set: &ClusterSet) {
        self.gauges.insert(Gauge::Clusters, set.clusters.len() as u64);
        self.gauges.insert(Gauge::Singles, set.singles.len() as u64);
        self.histograms
            .entry(Distribution::RejectedPoints)
            .or_default()
            .record(set.rejections.total() as u64);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.name(), *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (k.name(), *v)).collect(),
            histograms: self.histograms.iter().map(|(k, v)| (k.name(), *v)).collect(),
        }
    }
}
