//! Unit tests for the journey search.

use std::time::Duration;

use super::*;
use crate::domain::{Route, StopKey};
use crate::graph::{TransitGraph, build_graph};

fn graph(routes: &[Route]) -> TransitGraph {
    build_graph(routes, &[])
}

fn plan(graph: &TransitGraph, start: &str, end: &str) -> Result<PlanResult, SearchError> {
    let config = SearchConfig::default();
    Planner::new(graph, &config).plan(&SearchRequest::new(start, end))
}

fn stops(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn transfer_journey_has_two_segments() {
    let graph = graph(&[
        Route::new("10", vec!["X", "Y", "Z"]),
        Route::new("20", vec!["Z", "W"]),
    ]);

    let result = plan(&graph, "X", "W").unwrap();

    assert_eq!(
        result.segments,
        vec![
            Segment {
                route_number: "10".into(),
                stops: stops(&["X", "Y", "Z"]),
            },
            Segment {
                route_number: "20".into(),
                stops: stops(&["Z", "W"]),
            },
        ]
    );
    assert_eq!(result.transfers, 1);
    assert_eq!(result.total_stops, 3);
    assert_eq!(result.routes, stops(&["10", "20"]));
}

#[test]
fn direct_journey_has_no_transfers() {
    let graph = graph(&[Route::new("5", vec!["A", "B", "C", "D"])]);

    let result = plan(&graph, "a", " D ").unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].stops, stops(&["A", "B", "C", "D"]));
    assert_eq!(result.transfers, 0);
    assert_eq!(result.total_stops, 3);
}

#[test]
fn journey_against_route_direction() {
    let graph = graph(&[Route::new("5", vec!["A", "B", "C"])]);

    let result = plan(&graph, "C", "A").unwrap();

    assert_eq!(result.segments[0].stops, stops(&["C", "B", "A"]));
    assert_eq!(result.segments[0].route_number, "5");
}

#[test]
fn same_start_and_end_is_invalid() {
    let graph = graph(&[Route::new("5", vec!["A", "B"])]);

    let err = plan(&graph, "A", " a ").unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput(_)));
}

#[test]
fn blank_names_are_invalid() {
    let graph = graph(&[Route::new("5", vec!["A", "B"])]);

    assert!(matches!(plan(&graph, "", "B"), Err(SearchError::InvalidInput(_))));
    assert!(matches!(plan(&graph, "A", "  "), Err(SearchError::InvalidInput(_))));
}

#[test]
fn unknown_stop_is_not_found() {
    let graph = graph(&[Route::new("5", vec!["A", "B"])]);

    let err = plan(&graph, "A", "Nowhere").unwrap_err();
    assert_eq!(err, SearchError::NotFound("Nowhere".into()));
}

#[test]
fn isolated_known_stop_has_no_path() {
    let graph = build_graph(&[Route::new("5", vec!["A", "B"])], &stops(&["Island"]));

    let err = plan(&graph, "A", "Island").unwrap_err();
    assert!(matches!(err, SearchError::NoPathFound { .. }));

    let err = plan(&graph, "Island", "A").unwrap_err();
    assert!(matches!(err, SearchError::NoPathFound { .. }));
}

#[test]
fn disconnected_components_have_no_path() {
    let graph = graph(&[
        Route::new("1", vec!["A", "B", "C"]),
        Route::new("2", vec!["B", "C", "A"]),
        Route::new("3", vec!["D", "E"]),
    ]);

    let err = plan(&graph, "A", "E").unwrap_err();
    assert_eq!(
        err,
        SearchError::NoPathFound {
            from: "A".into(),
            to: "E".into()
        }
    );
}

#[test]
fn fewest_hops_wins_over_fewer_transfers() {
    // Route 1 goes the long way round; routes 2 and 3 are shorter with a change.
    let graph = graph(&[
        Route::new("1", vec!["A", "P", "Q", "R", "S", "B"]),
        Route::new("2", vec!["A", "M"]),
        Route::new("3", vec!["M", "B"]),
    ]);

    let result = plan(&graph, "A", "B").unwrap();

    assert_eq!(result.total_stops, 2);
    assert_eq!(result.transfers, 1);
}

#[test]
fn equal_hops_first_discovered_wins() {
    // Two 2-hop paths; A's edges list route 1 (via P) before route 2 (via Q).
    let graph = graph(&[
        Route::new("1", vec!["A", "P", "B"]),
        Route::new("2", vec!["A", "Q", "B"]),
    ]);

    let result = plan(&graph, "A", "B").unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].route_number, "1");
    assert_eq!(result.segments[0].stops, stops(&["A", "P", "B"]));
}

#[test]
fn search_reports_boarding_order_and_transfers() {
    let graph = graph(&[
        Route::new("10", vec!["X", "Y", "Z"]),
        Route::new("20", vec!["Z", "W"]),
    ]);
    let config = SearchConfig::default();

    let outcome = Planner::new(&graph, &config)
        .search(&SearchRequest::new("X", "W"))
        .unwrap();

    assert_eq!(
        outcome.path,
        vec![
            StopKey::new("x"),
            StopKey::new("y"),
            StopKey::new("z"),
            StopKey::new("w")
        ]
    );
    assert_eq!(outcome.routes, stops(&["10", "20"]));
    assert_eq!(outcome.transfers, 1);
}

#[test]
fn zero_timeout_aborts() {
    let graph = graph(&[Route::new("5", vec!["A", "B"])]);
    let config = SearchConfig::default().with_timeout(Duration::ZERO);

    let err = Planner::new(&graph, &config)
        .plan(&SearchRequest::new("A", "B"))
        .unwrap_err();
    assert_eq!(err, SearchError::Timeout);
}

#[test]
fn expansion_budget_aborts() {
    let graph = graph(&[Route::new("5", vec!["A", "B", "C", "D"])]);
    let config = SearchConfig::new(None, Some(1));

    let err = Planner::new(&graph, &config)
        .plan(&SearchRequest::new("A", "D"))
        .unwrap_err();
    assert_eq!(err, SearchError::Timeout);
}

#[test]
fn loop_route_does_not_cycle() {
    let graph = graph(&[
        Route::new("L", vec!["A", "B", "C", "A"]),
        Route::new("T", vec!["C", "D"]),
    ]);

    let result = plan(&graph, "B", "D").unwrap();
    assert_eq!(result.total_stops, 2);
}

/// Four routes running the same 14-stop road, plus a feeder off the far end.
fn corridor() -> TransitGraph {
    let road: Vec<String> = (0..14).map(|i| format!("S{i}")).collect();
    let mut routes: Vec<Route> = (0..4)
        .map(|r| Route::new(format!("T{r}"), road.clone()))
        .collect();
    routes.push(Route::new("F", vec!["S13", "Depot"]));
    graph(&routes)
}

#[test]
fn shared_corridor_rides_first_route_end_to_end() {
    let graph = corridor();

    let result = plan(&graph, "S0", "S13").unwrap();

    assert_eq!(result.total_stops, 13);
    assert_eq!(result.transfers, 0);
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].route_number, "T0");
}

#[test]
fn shared_corridor_then_feeder() {
    let graph = corridor();

    let result = plan(&graph, "S0", "Depot").unwrap();

    let road: Vec<String> = (0..14).map(|i| format!("S{i}")).collect();
    assert_eq!(
        result.segments,
        vec![
            Segment {
                route_number: "T0".into(),
                stops: road,
            },
            Segment {
                route_number: "F".into(),
                stops: stops(&["S13", "Depot"]),
            },
        ]
    );
    assert_eq!(result.transfers, 1);
}

#[test]
fn shared_corridor_fits_a_small_expansion_budget() {
    let graph = corridor();
    // One expansion per (stop, route) pair at most.
    let config = SearchConfig::new(None, Some(4 * 14 + 1));

    let outcome = Planner::new(&graph, &config)
        .search(&SearchRequest::new("S13", "S0"))
        .unwrap();

    assert_eq!(outcome.path.len(), 14);
    assert_eq!(outcome.routes, stops(&["T0"]));
}

#[test]
fn grid_prefers_earliest_listed_routes() {
    // Rows r0..r3 on routes H0..H3, columns c0..c3 on routes V0..V3.
    let mut routes = Vec::new();
    for row in 0..4 {
        let stops: Vec<String> = (0..4).map(|col| format!("r{row}c{col}")).collect();
        routes.push(Route::new(format!("H{row}"), stops));
    }
    for col in 0..4 {
        let stops: Vec<String> = (0..4).map(|row| format!("r{row}c{col}")).collect();
        routes.push(Route::new(format!("V{col}"), stops));
    }
    let graph = graph(&routes);

    let result = plan(&graph, "r0c0", "r3c3").unwrap();

    assert_eq!(result.total_stops, 6);
    assert_eq!(
        result.segments,
        vec![
            Segment {
                route_number: "H0".into(),
                stops: stops(&["r0c0", "r0c1", "r0c2", "r0c3"]),
            },
            Segment {
                route_number: "V3".into(),
                stops: stops(&["r0c3", "r1c3", "r2c3", "r3c3"]),
            },
        ]
    );
}

mod proptests {
    use std::cmp::Reverse;
    use std::collections::{BinaryHeap, HashMap};

    use super::*;
    use proptest::prelude::*;

    /// Search that keeps every distinct route sequence apart, for comparison.
    ///
    /// Same frontier order as the planner: (hops, discovery order).
    fn full_sequence_search(
        graph: &TransitGraph,
        start: &str,
        end: &str,
    ) -> Option<(Vec<StopKey>, Vec<String>)> {
        let (start, end) = (StopKey::new(start), StopKey::new(end));
        let mut states: Vec<(Vec<StopKey>, Vec<String>)> = vec![(vec![start], Vec::new())];
        let mut frontier = BinaryHeap::from([Reverse((0usize, 0usize))]);
        let mut visited: HashMap<(StopKey, Vec<String>), usize> = HashMap::new();

        while let Some(Reverse((hops, id))) = frontier.pop() {
            let (path, routes) = states[id].clone();
            let stop = path.last().unwrap().clone();

            let key = (stop.clone(), routes.clone());
            if visited.get(&key).is_some_and(|&seen| seen <= hops) {
                continue;
            }
            visited.insert(key, hops);

            if stop == end {
                return Some((path, routes));
            }

            for edge in graph.edges_from(&stop) {
                if path.contains(&edge.to) {
                    continue;
                }
                let mut next_routes = routes.clone();
                if next_routes.last() != Some(&edge.route_number) {
                    next_routes.push(edge.route_number.clone());
                }
                let mut next_path = path.clone();
                next_path.push(edge.to.clone());

                states.push((next_path, next_routes));
                frontier.push(Reverse((hops + 1, states.len() - 1)));
            }
        }
        None
    }

    const STOPS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

    fn routes_strategy() -> impl Strategy<Value = Vec<Route>> {
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(STOPS.to_vec()), 2..5),
            1..4,
        )
        .prop_map(|lists| {
            lists
                .into_iter()
                .enumerate()
                .map(|(i, stops)| Route::new(format!("R{i}"), stops))
                .collect()
        })
    }

    proptest! {
        /// A→B and B→A ride the same number of stops.
        #[test]
        fn hop_count_is_symmetric(
            routes in routes_strategy(),
            a in prop::sample::select(STOPS.to_vec()),
            b in prop::sample::select(STOPS.to_vec()),
        ) {
            prop_assume!(a != b);
            let graph = graph(&routes);

            let forward = plan(&graph, a, b);
            let backward = plan(&graph, b, a);

            match (forward, backward) {
                (Ok(f), Ok(r)) => prop_assert_eq!(f.total_stops, r.total_stops),
                (Err(f), Err(r)) => prop_assert_eq!(
                    std::mem::discriminant(&f),
                    std::mem::discriminant(&r)
                ),
                (f, r) => prop_assert!(false, "asymmetric outcome: {:?} vs {:?}", f, r),
            }
        }

        /// Segments chain end to start and cover the whole path.
        #[test]
        fn segments_cover_path(
            routes in routes_strategy(),
            a in prop::sample::select(STOPS.to_vec()),
            b in prop::sample::select(STOPS.to_vec()),
        ) {
            prop_assume!(a != b);
            let graph = graph(&routes);

            if let Ok(result) = plan(&graph, a, b) {
                prop_assert_eq!(result.transfers + 1, result.segments.len());

                let hops: usize = result.segments.iter().map(|s| s.stops.len() - 1).sum();
                prop_assert_eq!(hops, result.total_stops);

                for pair in result.segments.windows(2) {
                    prop_assert_eq!(pair[0].stops.last(), pair[1].stops.first());
                }
                prop_assert_eq!(result.segments[0].stops[0].as_str(), a);
            }
        }

        /// Pruning on the last route ridden picks the same journey as
        /// keeping every route sequence apart.
        #[test]
        fn pruned_search_matches_full_sequence_search(
            routes in routes_strategy(),
            a in prop::sample::select(STOPS.to_vec()),
            b in prop::sample::select(STOPS.to_vec()),
        ) {
            prop_assume!(a != b);
            let graph = graph(&routes);
            let config = SearchConfig::default();

            let pruned = Planner::new(&graph, &config)
                .search(&SearchRequest::new(a, b))
                .ok()
                .map(|outcome| (outcome.path, outcome.routes));

            prop_assert_eq!(pruned, full_sequence_search(&graph, a, b));
        }

        /// The start never equals the end.
        #[test]
        fn same_stop_is_always_invalid(
            routes in routes_strategy(),
            a in prop::sample::select(STOPS.to_vec()),
        ) {
            let graph = graph(&routes);
            prop_assert!(matches!(plan(&graph, a, a), Err(SearchError::InvalidInput(_))));
        }
    }
}
