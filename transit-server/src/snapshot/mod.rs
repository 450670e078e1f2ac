//! Route/stop snapshot providers.
//!
//! The engine never talks to a database directly. It reads a consistent,
//! read-only snapshot of active routes (each with ordered stops) and known
//! stop names through [`SnapshotProvider`].

mod error;
mod file;
mod memory;

use std::collections::HashSet;
use std::future::Future;

pub use error::SnapshotError;
pub use file::JsonFileSnapshot;
pub use memory::InMemorySnapshot;

use crate::domain::{Route, Stop, StopKey};

/// Source of route and stop data.
///
/// Futures are `Send` so providers can be shared across request tasks.
pub trait SnapshotProvider: Send + Sync {
    /// All active routes, each with stops in `stop_order`.
    fn active_routes(&self) -> impl Future<Output = Result<Vec<Route>, SnapshotError>> + Send;

    /// Every known stop name, including stops no route serves.
    fn stop_names(&self) -> impl Future<Output = Result<Vec<String>, SnapshotError>> + Send;

    /// Routes and stop names read together from one version of the data.
    ///
    /// Providers that can change underneath a reader override this so both
    /// halves come from the same load.
    fn network(&self) -> impl Future<Output = Result<(Vec<Route>, Vec<String>), SnapshotError>> + Send {
        async move {
            let routes = self.active_routes().await?;
            let stop_names = self.stop_names().await?;
            Ok((routes, stop_names))
        }
    }

    /// Stop records with coordinates where known.
    ///
    /// Providers without location data get this for free from `stop_names`.
    fn stops(&self) -> impl Future<Output = Result<Vec<Stop>, SnapshotError>> + Send {
        async move {
            let names = self.stop_names().await?;
            Ok(names.into_iter().map(Stop::named).collect())
        }
    }
}

/// Merge explicit stops with the stops routes mention, first spelling wins.
pub(crate) fn merge_stop_names(stops: &[Stop], routes: &[Route]) -> Vec<String> {
    let mut seen: HashSet<StopKey> = HashSet::new();
    let explicit = stops.iter().map(|s| s.name.as_str());
    let from_routes = routes
        .iter()
        .filter(|r| r.active)
        .flat_map(|r| r.stops.iter().map(String::as_str));

    explicit
        .chain(from_routes)
        .filter_map(|name| {
            let key = StopKey::new(name);
            if key.is_empty() || !seen.insert(key) {
                None
            } else {
                Some(name.trim().to_string())
            }
        })
        .collect()
}
