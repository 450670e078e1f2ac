//! Journey planner using uniform-cost search.
//!
//! This module answers: "how do I get from stop A to stop B, changing
//! routes if I have to?"
//!
//! The search runs over a [`TransitGraph`](crate::graph::TransitGraph) with
//! unit cost per hop, then the winning path is split into ride segments,
//! one per route boarded.

mod config;
mod search;
mod segments;

#[cfg(test)]
mod search_tests;

use serde::{Deserialize, Serialize};

pub use config::SearchConfig;
pub use search::{Planner, SearchError, SearchOutcome, SearchRequest};

/// A maximal stretch of a journey ridden on one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub route_number: String,

    /// Stops ridden, boarding and alighting stops included.
    pub stops: Vec<String>,
}

/// A planned journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub segments: Vec<Segment>,

    /// Hops ridden (path length minus one).
    pub total_stops: usize,

    /// Route changes (segment count minus one).
    pub transfers: usize,

    /// Routes in boarding order, as chosen by the search.
    pub routes: Vec<String>,
}
