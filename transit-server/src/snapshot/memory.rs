//! In-memory snapshot provider.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{Route, Stop, StopKey};

use super::{SnapshotError, SnapshotProvider, merge_stop_names};

/// Snapshot held entirely in memory.
///
/// Used by tests and by callers that already have route data loaded.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshot {
    routes: Arc<Vec<Route>>,
    stops: Arc<Vec<Stop>>,
}

impl InMemorySnapshot {
    /// Create a snapshot from routes alone; stops are taken from the routes.
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes: Arc::new(routes),
            stops: Arc::new(Vec::new()),
        }
    }

    /// Add stops that are known independently of routes.
    pub fn with_stops(mut self, stops: Vec<Stop>) -> Self {
        self.stops = Arc::new(stops);
        self
    }
}

impl SnapshotProvider for InMemorySnapshot {
    async fn active_routes(&self) -> Result<Vec<Route>, SnapshotError> {
        Ok(self.routes.iter().filter(|r| r.active).cloned().collect())
    }

    async fn stop_names(&self) -> Result<Vec<String>, SnapshotError> {
        Ok(merge_stop_names(&self.stops, &self.routes))
    }

    async fn stops(&self) -> Result<Vec<Stop>, SnapshotError> {
        let known: HashSet<StopKey> = self.stops.iter().map(Stop::key).collect();
        let extra = merge_stop_names(&[], &self.routes)
            .into_iter()
            .filter(|name| !known.contains(&StopKey::new(name)))
            .map(Stop::named);
        Ok(self.stops.iter().cloned().chain(extra).collect())
    }
}
