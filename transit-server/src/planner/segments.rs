//! Splitting a planned path into per-route ride segments.

use tracing::warn;

use crate::domain::StopKey;
use crate::graph::TransitGraph;

use super::Segment;

/// Walk the path and group consecutive hops ridden on the same route.
///
/// The open segment continues while its route serves both stops of the next
/// hop. Otherwise the segment is closed and a new one opened on the next
/// planned route that serves the hop. If no route serves both stops the
/// graph and the path disagree; that is logged and the first planned route
/// is used so the journey can still be reported.
pub(crate) fn reconstruct(graph: &TransitGraph, path: &[StopKey], routes: &[String]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Segment> = None;
    // Index into `routes` of the route the open segment rides.
    let mut cursor = 0;

    for hop in path.windows(2) {
        let (from, to) = (&hop[0], &hop[1]);
        let shared = graph.shared_routes(from, to);

        if let Some(segment) = current.as_mut()
            && shared.contains(&segment.route_number.as_str())
        {
            segment.stops.push(graph.display_name(to).to_string());
            continue;
        }

        let route_number = match routes
            .iter()
            .enumerate()
            .skip(cursor)
            .find(|(_, r)| shared.contains(&r.as_str()))
        {
            Some((idx, route)) => {
                cursor = idx;
                route.clone()
            }
            None => match shared.first() {
                Some(route) => route.to_string(),
                None => {
                    warn!(
                        from = %from,
                        to = %to,
                        "Data inconsistency: no route serves both stops of a planned hop"
                    );
                    routes.first().cloned().unwrap_or_default()
                }
            },
        };

        if let Some(done) = current.take() {
            segments.push(done);
        }
        current = Some(Segment {
            route_number,
            stops: vec![
                graph.display_name(from).to_string(),
                graph.display_name(to).to_string(),
            ],
        });
    }

    if let Some(done) = current {
        segments.push(done);
    }
    segments
}
