//! Get-or-build access to the cached transit graph.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::cache::{self, CacheBackend, keys};
use crate::snapshot::{SnapshotError, SnapshotProvider};

use super::{TransitGraph, build_graph};

/// Decoded graph held in process, tagged with the epoch it belongs to.
struct Memo {
    epoch: u64,
    stored_at: Instant,
    graph: Arc<TransitGraph>,
}

/// Serves the transit graph from the cache, rebuilding it on a miss.
///
/// A graph is fully built before it is written to the cache, so readers only
/// ever see complete graphs. Rebuilds and invalidation within one process are
/// serialized on one lock; a caller that waited on it re-checks the cache
/// before building. The last decoded graph is kept in memory for the cache
/// TTL, so a hit is a pointer clone; invalidation bumps the epoch and
/// discards it.
pub struct GraphCache<S, C> {
    snapshot: Arc<S>,
    backend: Arc<C>,
    ttl: Duration,
    rebuild_lock: Mutex<()>,
    epoch: AtomicU64,
    memo: RwLock<Option<Memo>>,
}

impl<S, C> GraphCache<S, C>
where
    S: SnapshotProvider,
    C: CacheBackend,
{
    pub fn new(snapshot: Arc<S>, backend: Arc<C>, ttl: Duration) -> Self {
        Self {
            snapshot,
            backend,
            ttl,
            rebuild_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
            memo: RwLock::new(None),
        }
    }

    /// Current graph, from memory, the cache, or freshly built.
    pub async fn get(&self) -> Result<Arc<TransitGraph>, SnapshotError> {
        if let Some(graph) = self.cached().await {
            return Ok(graph);
        }

        let _guard = self.rebuild_lock.lock().await;

        // Another task may have published while we waited.
        if let Some(graph) = self.cached().await {
            return Ok(graph);
        }

        self.build_and_publish().await
    }

    /// Build from the snapshot and publish, regardless of what is cached.
    pub async fn rebuild(&self) -> Result<Arc<TransitGraph>, SnapshotError> {
        let _guard = self.rebuild_lock.lock().await;
        self.build_and_publish().await
    }

    /// Drop the cached graph so the next `get` rebuilds it.
    ///
    /// Waits for a build in flight, so a graph read from older data is never
    /// left behind.
    pub async fn invalidate(&self) {
        let _guard = self.rebuild_lock.lock().await;
        debug!("Invalidating cached transit graph");

        // Evict before bumping, so a reader on the new epoch misses the
        // backend too.
        cache::evict(&*self.backend, keys::GRAPH).await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.memo.write().await = None;
    }

    async fn cached(&self) -> Option<Arc<TransitGraph>> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        {
            let memo = self.memo.read().await;
            if let Some(memo) = memo.as_ref()
                && memo.epoch == epoch
                && memo.stored_at.elapsed() < self.ttl
            {
                return Some(memo.graph.clone());
            }
        }

        let graph = Arc::new(cache::load::<TransitGraph, _>(&*self.backend, keys::GRAPH).await?);
        self.remember(epoch, &graph).await;
        Some(graph)
    }

    /// Keep `graph` in memory unless the cache was invalidated since `epoch`.
    async fn remember(&self, epoch: u64, graph: &Arc<TransitGraph>) {
        let mut memo = self.memo.write().await;
        if self.epoch.load(Ordering::SeqCst) == epoch {
            *memo = Some(Memo {
                epoch,
                stored_at: Instant::now(),
                graph: graph.clone(),
            });
        }
    }

    async fn build_and_publish(&self) -> Result<Arc<TransitGraph>, SnapshotError> {
        let started = Instant::now();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let (routes, stop_names) = self.snapshot.network().await?;

        if routes.is_empty() && stop_names.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let graph = build_graph(&routes, &stop_names);
        info!(
            routes = routes.len(),
            stops = graph.stop_count(),
            edges = graph.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built transit graph"
        );

        cache::store(&*self.backend, keys::GRAPH, &graph, self.ttl).await;
        let graph = Arc::new(graph);
        self.remember(epoch, &graph).await;
        Ok(graph)
    }
}
