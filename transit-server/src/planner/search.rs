//! Transfer-aware journey search.
//!
//! Uniform-cost search where every hop between adjacent stops costs 1.
//! States remember the path taken and the sequence of routes ridden. A state
//! is expanded only the first time its `(stop, last route)` pair is popped:
//! a later state with the same pair has at least as many hops and its
//! children are always discovered after the earlier one's, so it can never
//! win. Among paths of equal hop count the first one discovered wins; the
//! search does not minimise transfers.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::domain::StopKey;
use crate::graph::{Edge, TransitGraph};

use super::config::SearchConfig;
use super::segments::reconstruct;
use super::PlanResult;

/// Error from journey search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Missing or contradictory request parameters
    #[error("invalid search request: {0}")]
    InvalidInput(String),

    /// A stop name the network does not know
    #[error("unknown stop: {0}")]
    NotFound(String),

    /// Both stops are known but not connected
    #[error("no path from {from} to {to}")]
    NoPathFound { from: String, to: String },

    /// Search ran past its deadline or expansion budget
    #[error("search timed out")]
    Timeout,
}

/// Request for journey search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub start: String,
    pub end: String,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(StopKey, StopKey), SearchError> {
        let start = StopKey::new(&self.start);
        let end = StopKey::new(&self.end);

        if start.is_empty() || end.is_empty() {
            return Err(SearchError::InvalidInput(
                "both start and end are required".to_string(),
            ));
        }

        if start == end {
            return Err(SearchError::InvalidInput(
                "start and end are the same stop".to_string(),
            ));
        }

        Ok((start, end))
    }
}

/// Raw search output, before segment reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Stops visited, start and end included.
    pub path: Vec<StopKey>,

    /// Routes in the order they were boarded.
    pub routes: Vec<String>,

    /// Route changes counted during search.
    pub transfers: usize,

    /// States expanded before the destination was popped.
    pub expansions: usize,
}

/// Search state: where we are and how we got here.
#[derive(Debug, Clone)]
struct SearchState {
    stop: StopKey,
    path: Vec<StopKey>,
    routes: Vec<String>,
    transfers: usize,
}

impl SearchState {
    fn genesis(start: StopKey) -> Self {
        Self {
            path: vec![start.clone()],
            stop: start,
            routes: Vec::new(),
            transfers: 0,
        }
    }

    /// Follow an edge. Boarding a different route than the last one ridden
    /// appends it and, unless this is the first boarding, counts a transfer.
    /// Key the state is pruned on. Transfers depend only on the last route.
    fn visit_key(&self) -> (StopKey, Option<String>) {
        (self.stop.clone(), self.routes.last().cloned())
    }

    fn advance(&self, edge: &Edge) -> Self {
        let mut routes = self.routes.clone();
        let mut transfers = self.transfers;

        match routes.last() {
            Some(last) if last == &edge.route_number => {}
            Some(_) => {
                routes.push(edge.route_number.clone());
                transfers += 1;
            }
            None => routes.push(edge.route_number.clone()),
        }

        let mut path = self.path.clone();
        path.push(edge.to.clone());

        Self {
            stop: edge.to.clone(),
            path,
            routes,
            transfers,
        }
    }
}

/// Frontier entry ordered by (hops, discovery order), smallest first.
#[derive(Debug)]
struct Queued {
    hops: usize,
    order: u64,
    state: SearchState,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.hops == other.hops && self.order == other.order
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse to pop the cheapest, earliest state.
        (other.hops, other.order).cmp(&(self.hops, self.order))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Journey planner over a built transit graph.
pub struct Planner<'a> {
    graph: &'a TransitGraph,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(graph: &'a TransitGraph, config: &'a SearchConfig) -> Self {
        Self { graph, config }
    }

    /// Plan a journey and split it into per-route segments.
    pub fn plan(&self, request: &SearchRequest) -> Result<PlanResult, SearchError> {
        let outcome = self.search(request)?;
        let segments = reconstruct(self.graph, &outcome.path, &outcome.routes);

        let total_stops = outcome.path.len().saturating_sub(1);
        let transfers = segments.len().saturating_sub(1);

        Ok(PlanResult {
            segments,
            total_stops,
            transfers,
            routes: outcome.routes,
        })
    }

    /// Find the fewest-hop path from start to end.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let (start, end) = request.validate()?;

        for (key, raw) in [(&start, &request.start), (&end, &request.end)] {
            if !self.graph.contains_stop(key) {
                return Err(SearchError::NotFound(raw.trim().to_string()));
            }
        }

        let no_path = || SearchError::NoPathFound {
            from: self.graph.display_name(&start).to_string(),
            to: self.graph.display_name(&end).to_string(),
        };

        // Known but unconnected stops would otherwise make the search walk
        // every simple path of the component before giving up.
        if !self.graph.has_edges(&start)
            || !self.graph.has_edges(&end)
            || !self.graph.is_reachable(&start, &end)
        {
            return Err(no_path());
        }

        let deadline = self.config.timeout.map(|t| Instant::now() + t);

        let mut frontier = BinaryHeap::new();
        let mut order: u64 = 0;
        frontier.push(Queued {
            hops: 0,
            order,
            state: SearchState::genesis(start.clone()),
        });

        // Pops come in hop order, so the first pop of a key is the cheapest.
        let mut visited: HashSet<(StopKey, Option<String>)> = HashSet::new();
        let mut expansions = 0;

        while let Some(Queued { hops, state, .. }) = frontier.pop() {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                warn!(%start, %end, expansions, "Journey search hit its deadline");
                return Err(SearchError::Timeout);
            }

            if !visited.insert(state.visit_key()) {
                continue;
            }

            if state.stop == end {
                debug!(
                    %start,
                    %end,
                    hops,
                    transfers = state.transfers,
                    expansions,
                    "Journey found"
                );
                return Ok(SearchOutcome {
                    path: state.path,
                    routes: state.routes,
                    transfers: state.transfers,
                    expansions,
                });
            }

            expansions += 1;
            if self.config.max_expansions.is_some_and(|max| expansions > max) {
                warn!(%start, %end, expansions, "Journey search exceeded expansion budget");
                return Err(SearchError::Timeout);
            }

            trace!(stop = %state.stop, hops, routes = state.routes.len(), "Expanding");

            for edge in self.graph.edges_from(&state.stop) {
                if state.path.contains(&edge.to) {
                    continue;
                }
                order += 1;
                frontier.push(Queued {
                    hops: hops + 1,
                    order,
                    state: state.advance(edge),
                });
            }
        }

        Err(no_path())
    }
}
