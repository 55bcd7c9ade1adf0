//! Recluster scheduling.
//!
//! Clustering itself is pure; this module decides *when* to recompute and
//! which results are still worth showing. Every request carries a
//! [`Generation`]; only the newest generation's result is accepted.

use std::sync::Arc;
use std::thread::JoinHandle;

use catalog::StationPoint;
use clustering::{ClusterSet, ClusteringConfig, GridPolicy, cluster_with_policy};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info, warn};

use crate::metrics::{Counter, Metrics};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Clone)]
pub struct ReclusterRequest {
    pub generation: Generation,
    pub policy: GridPolicy,
    pub points: Arc<[StationPoint]>,
}

#[derive(Debug, Clone)]
pub struct ReclusterResult {
    pub generation: Generation,
    pub set: ClusterSet,
}

impl ReclusterRequest {
    /// Runs the request synchronously.
    pub fn run(&self, config: &ClusteringConfig) -> ReclusterResult {
        ReclusterResult {
            generation: self.generation,
            set: cluster_with_policy(&self.points, config, self.policy),
        }
    }
}

/// Tracks camera/catalog changes and filters stale results.
///
/// A new request is only issued when the catalog snapshot changes (by
/// pointer identity) or the camera crosses into a different zoom tier.
#[derive(Debug)]
pub struct ReclusterScheduler {
    config: ClusteringConfig,
    next_generation: u64,
    latest: Option<Generation>,
    last_policy: Option<GridPolicy>,
    last_points: Option<Arc<[StationPoint]>>,
    metrics: Metrics,
}

impl ReclusterScheduler {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            next_generation: 0,
            latest: None,
            last_policy: None,
            last_points: None,
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn latest(&self) -> Option<Generation> {
        self.latest
    }

    /// Issues a request unconditionally.
    pub fn submit(&mut self, points: Arc<[StationPoint]>, altitude_m: f64) -> ReclusterRequest {
        let policy = self.config.tiers.policy_for_altitude(altitude_m);
        let generation = Generation(self.next_generation);
        self.next_generation += 1;
        self.latest = Some(generation);
        self.last_policy = Some(policy);
        self.last_points = Some(points.clone());
        self.metrics.bump(Counter::Submitted);
        ReclusterRequest {
            generation,
            policy,
            points,
        }
    }

    /// Issues a request only when the catalog or the zoom tier changed.
    pub fn submit_if_changed(
        &mut self,
        points: &Arc<[StationPoint]>,
        altitude_m: f64,
    ) -> Option<ReclusterRequest> {
        let policy = self.config.tiers.policy_for_altitude(altitude_m);
        let same_points = self
            .last_points
            .as_ref()
            .is_some_and(|last| Arc::ptr_eq(last, points));
        if same_points && self.last_policy == Some(policy) {
            self.metrics.bump(Counter::Skipped);
            return None;
        }
        Some(self.submit(points.clone(), altitude_m))
    }

    /// Returns the set if `result` answers the newest request; drops it otherwise.
    pub fn accept(&mut self, result: ReclusterResult) -> Option<ClusterSet> {
        if self.latest != Some(result.generation) {
            debug!(
                "discarding stale recluster result {:?} (latest {:?})",
                result.generation, self.latest
            );
            self.metrics.bump(Counter::Stale);
            return None;
        }
        self.metrics.bump(Counter::Accepted);
        self.metrics.record_cluster_set(&result.set);
        Some(result.set)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    Spawn(String),
    Stopped,
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerError::Spawn(msg) => write!(f, "failed to spawn recluster worker: {msg}"),
            WorkerError::Stopped => write!(f, "recluster worker has stopped"),
        }
    }
}

impl std::error::Error for WorkerError {}

/// Background thread that runs recluster requests off the caller's thread.
///
/// Requests queued while a computation is running are coalesced: only the
/// newest one is computed. Results still need to pass through
/// [`ReclusterScheduler::accept`].
#[derive(Debug)]
pub struct ReclusterWorker {
    request_tx: Option<Sender<ReclusterRequest>>,
    result_rx: Receiver<ReclusterResult>,
    handle: Option<JoinHandle<()>>,
}

impl ReclusterWorker {
    pub fn spawn(config: ClusteringConfig) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = channel::unbounded::<ReclusterRequest>();
        let (result_tx, result_rx) = channel::unbounded::<ReclusterResult>();

        let handle = std::thread::Builder::new()
            .name("recluster".to_string())
            .spawn(move || run_worker(config, request_rx, result_tx))
            .map_err(|e| WorkerError::Spawn(e.to_string()))?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: ReclusterRequest) -> Result<(), WorkerError> {
        let tx = self.request_tx.as_ref().ok_or(WorkerError::Stopped)?;
        tx.send(request).map_err(|_| WorkerError::Stopped)
    }

    /// Non-blocking poll for a finished result.
    pub fn try_result(&self) -> Result<Option<ReclusterResult>, WorkerError> {
        match self.result_rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Stopped),
        }
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Result<Option<ReclusterResult>, WorkerError> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Stopped),
        }
    }
}

impl Drop for ReclusterWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            join_worker(handle);
        }
    }
}

/// Joins the worker thread; returns `false` if it panicked.
fn join_worker(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("recluster worker panicked");
            false
        }
    }
}

fn run_worker(config: ClusteringConfig, requests: Receiver<ReclusterRequest>, results: Sender<ReclusterResult>) {
    info!("recluster worker started");
    while let Ok(mut request) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            debug!("coalescing recluster request {:?} into {:?}", request.generation, newer.generation);
            request = newer;
        }
        if results.send(request.run(&config)).is_err() {
            break;
        }
    }
    info!("recluster worker stopped");
}
