//! Transit graph construction.
//!
//! Nodes are canonical stop names. Each route contributes an edge in both
//! directions for every pair of consecutive stops, tagged with the route and
//! the position of the later stop of the pair. A per-stop route membership
//! index is built alongside and used to attribute hops to routes when
//! reconstructing ride segments.

mod cache;

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

pub use cache::GraphCache;

use crate::domain::{Route, StopKey};

/// A directed hop between two adjacent stops on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub to: StopKey,
    pub route_number: String,
    /// Position on the route of the later stop of the adjacent pair.
    pub sequence: usize,
}

/// Immutable adjacency structure plus lookup indices.
///
/// `BTreeMap` keeps serialization byte-identical for identical snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitGraph {
    adjacency: BTreeMap<StopKey, Vec<Edge>>,
    stop_to_routes: BTreeMap<StopKey, Vec<(String, usize)>>,
    display_names: BTreeMap<StopKey, String>,
    routes: Vec<String>,
}

impl TransitGraph {
    /// Outgoing edges in insertion order.
    pub fn edges_from(&self, stop: &StopKey) -> &[Edge] {
        self.adjacency.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(route_number, index)` entries for every position a stop holds.
    pub fn memberships(&self, stop: &StopKey) -> &[(String, usize)] {
        self.stop_to_routes
            .get(stop)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct routes serving both stops, in `a`'s membership order.
    pub fn shared_routes(&self, a: &StopKey, b: &StopKey) -> Vec<&str> {
        let at_b: HashSet<&str> = self
            .memberships(b)
            .iter()
            .map(|(route, _)| route.as_str())
            .collect();

        let mut seen = HashSet::new();
        self.memberships(a)
            .iter()
            .map(|(route, _)| route.as_str())
            .filter(|route| at_b.contains(route) && seen.insert(*route))
            .collect()
    }

    /// True if the stop is known at all, with or without edges.
    pub fn contains_stop(&self, stop: &StopKey) -> bool {
        self.display_names.contains_key(stop)
    }

    pub fn has_edges(&self, stop: &StopKey) -> bool {
        !self.edges_from(stop).is_empty()
    }

    /// Display spelling for a key, falling back to the canonical form.
    pub fn display_name<'a>(&'a self, stop: &'a StopKey) -> &'a str {
        self.display_names
            .get(stop)
            .map(String::as_str)
            .unwrap_or(stop.as_str())
    }

    /// Display names of every known stop, ordered by key.
    pub fn stop_names(&self) -> impl Iterator<Item = &str> {
        self.display_names.values().map(String::as_str)
    }

    /// Route numbers in snapshot order.
    pub fn route_numbers(&self) -> &[String] {
        &self.routes
    }

    pub fn stop_count(&self) -> usize {
        self.display_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Whether `to` can be reached from `from` ignoring routes.
    pub fn is_reachable(&self, from: &StopKey, to: &StopKey) -> bool {
        if from == to {
            return true;
        }

        let mut seen: HashSet<&StopKey> = HashSet::from([from]);
        let mut queue: VecDeque<&StopKey> = VecDeque::from([from]);

        while let Some(stop) = queue.pop_front() {
            for edge in self.edges_from(stop) {
                if &edge.to == to {
                    return true;
                }
                if seen.insert(&edge.to) {
                    queue.push_back(&edge.to);
                }
            }
        }
        false
    }

    fn register_stop(&mut self, name: &str) -> StopKey {
        let key = StopKey::new(name);
        self.display_names
            .entry(key.clone())
            .or_insert_with(|| name.trim().to_string());
        key
    }

    fn add_edge(&mut self, from: &StopKey, to: &StopKey, route_number: &str, sequence: usize) {
        self.adjacency.entry(from.clone()).or_default().push(Edge {
            to: to.clone(),
            route_number: route_number.to_string(),
            sequence,
        });
    }
}

/// Build the graph from active routes and the full stop-name list.
///
/// Pure and deterministic: the same input always yields an equal graph.
/// Inactive routes are skipped; routes with fewer than two stops add no
/// edges but their stops are still known.
pub fn build_graph(routes: &[Route], stop_names: &[String]) -> TransitGraph {
    let mut graph = TransitGraph::default();

    for name in stop_names {
        if !StopKey::new(name).is_empty() {
            graph.register_stop(name);
        }
    }

    for route in routes.iter().filter(|r| r.active) {
        graph.routes.push(route.route_number.clone());

        let keys: Vec<StopKey> = route.stops.iter().map(|s| graph.register_stop(s)).collect();

        for (i, key) in keys.iter().enumerate() {
            graph
                .stop_to_routes
                .entry(key.clone())
                .or_default()
                .push((route.route_number.clone(), i));

            if i > 0 {
                graph.add_edge(key, &keys[i - 1], &route.route_number, i);
            }
            if i + 1 < keys.len() {
                graph.add_edge(key, &keys[i + 1], &route.route_number, i + 1);
            }
        }
    }

    graph
}
