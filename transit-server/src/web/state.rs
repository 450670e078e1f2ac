//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::MokaBackend;
use crate::service::TransitService;
use crate::snapshot::JsonFileSnapshot;

/// The service as deployed: file-backed snapshot, in-memory cache.
pub type Transit = TransitService<JsonFileSnapshot, MokaBackend>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub transit: Arc<Transit>,
}

impl AppState {
    pub fn new(transit: Transit) -> Self {
        Self {
            transit: Arc::new(transit),
        }
    }
}
