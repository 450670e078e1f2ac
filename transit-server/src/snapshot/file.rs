//! Snapshot provider backed by a JSON data file.
//!
//! The file holds the exported stop and route tables:
//!
//! ```json
//! {
//!   "stops": [{ "name": "Vashi", "latitude": 19.0771, "longitude": 72.9986 }],
//!   "routes": [{
//!     "route_number": "5",
//!     "stops": [{ "name": "Vashi", "stop_order": 1 }, { "name": "Nerul", "stop_order": 2 }],
//!     "active": true
//!   }]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Route, Schedule, Stop};

use super::{SnapshotError, SnapshotProvider, merge_stop_names};

/// One stop on a route, as exported.
#[derive(Debug, Deserialize)]
struct RouteStopRecord {
    name: String,
    stop_order: u32,
}

/// One route, as exported.
#[derive(Debug, Deserialize)]
struct RouteRecord {
    route_number: String,
    #[serde(default)]
    source_destination: Option<String>,
    stops: Vec<RouteStopRecord>,
    #[serde(default)]
    schedule: Schedule,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Whole data file.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    stops: Vec<Stop>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
}

/// Parsed contents, swapped as a whole on reload.
#[derive(Debug, Default)]
struct Loaded {
    stops: Vec<Stop>,
    routes: Vec<Route>,
}

/// Snapshot provider reading a JSON export from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshot {
    path: PathBuf,
    data: Arc<RwLock<Loaded>>,
}

impl JsonFileSnapshot {
    /// Load the snapshot from `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let loaded = load(&path).await?;
        Ok(Self {
            path,
            data: Arc::new(RwLock::new(loaded)),
        })
    }

    /// Re-read the file and replace the in-memory snapshot.
    ///
    /// On failure the previous snapshot is kept and the error returned.
    /// Returns the number of active routes now loaded.
    pub async fn reload(&self) -> Result<usize, SnapshotError> {
        let loaded = load(&self.path).await?;
        let count = loaded.routes.iter().filter(|r| r.active).count();

        let mut guard = self.data.write().await;
        *guard = loaded;

        Ok(count)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotProvider for JsonFileSnapshot {
    async fn active_routes(&self) -> Result<Vec<Route>, SnapshotError> {
        let guard = self.data.read().await;
        Ok(guard.routes.iter().filter(|r| r.active).cloned().collect())
    }

    async fn stop_names(&self) -> Result<Vec<String>, SnapshotError> {
        let guard = self.data.read().await;
        Ok(merge_stop_names(&guard.stops, &guard.routes))
    }

    async fn network(&self) -> Result<(Vec<Route>, Vec<String>), SnapshotError> {
        let guard = self.data.read().await;
        let routes = guard.routes.iter().filter(|r| r.active).cloned().collect();
        Ok((routes, merge_stop_names(&guard.stops, &guard.routes)))
    }

    async fn stops(&self) -> Result<Vec<Stop>, SnapshotError> {
        let guard = self.data.read().await;
        Ok(guard.stops.clone())
    }
}

async fn load(path: &Path) -> Result<Loaded, SnapshotError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let file: SnapshotFile = serde_json::from_str(&contents).map_err(|e| SnapshotError::Json {
        message: e.to_string(),
    })?;

    let routes = file
        .routes
        .into_iter()
        .map(into_route)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        path = %path.display(),
        routes = routes.len(),
        stops = file.stops.len(),
        "Loaded transit snapshot"
    );

    Ok(Loaded {
        stops: file.stops,
        routes,
    })
}

/// Order a route's stops by `stop_order`, rejecting duplicate orders.
fn into_route(record: RouteRecord) -> Result<Route, SnapshotError> {
    let mut stops = record.stops;
    stops.sort_by_key(|s| s.stop_order);

    let mut orders = HashSet::new();
    for stop in &stops {
        if !orders.insert(stop.stop_order) {
            return Err(SnapshotError::InvalidRoute {
                route: record.route_number,
                reason: format!("duplicate stop_order {}", stop.stop_order),
            });
        }
    }

    Ok(Route {
        route_number: record.route_number,
        source_destination: record.source_destination,
        stops: stops.into_iter().map(|s| s.name).collect(),
        schedule: record.schedule,
        active: record.active,
    })
}
