//! The transit service facade.
//!
//! Wires the snapshot, cache, graph, planner, fare and fuzzy modules
//! together and exposes the operations the web layer calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{self, CacheBackend, CacheConfig, keys};
use crate::domain::{BusType, Route, StopKey};
use crate::fare::{self, FareError, FareQuote};
use crate::fuzzy::{self, Corpus, FuzzyConfig, Match, Scorer};
use crate::geo::{self, Coordinate};
use crate::graph::{GraphCache, TransitGraph};
use crate::planner::{PlanResult, Planner, SearchConfig, SearchError, SearchRequest};
use crate::snapshot::{SnapshotError, SnapshotProvider};

/// Default search radius for nearby stops, in kilometres.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 2.0;

/// Default number of nearby stops returned.
pub const DEFAULT_NEARBY_LIMIT: usize = 10;

/// Errors returned by [`TransitService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Fare(#[from] FareError),

    /// No stop or route matches the request
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed request parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Route data could not be read
    #[error("transit data unavailable: {0}")]
    SnapshotUnavailable(#[from] SnapshotError),

    /// The blocking search task panicked or was cancelled
    #[error("journey search aborted: {0}")]
    SearchAborted(#[from] tokio::task::JoinError),
}

/// A route looked up by number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub route: Route,
    pub bus_type: BusType,

    /// The query, when the route was resolved by fuzzy matching.
    pub matched_from: Option<String>,

    /// Fuzzy match score, when resolved by fuzzy matching.
    pub match_score: Option<f64>,
}

/// A single route serving both ends of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRoute {
    pub route_number: String,
    pub bus_type: BusType,

    /// Stops ridden, in travel order.
    pub stops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStop {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Distance from the query point, rounded to two decimals.
    pub distance_km: f64,
}

/// Journey planning, fares, lookup and autocomplete over one snapshot.
pub struct TransitService<S, C> {
    snapshot: Arc<S>,
    backend: Arc<C>,
    graphs: GraphCache<S, C>,
    cache_config: CacheConfig,
    search_config: SearchConfig,
    fuzzy_config: FuzzyConfig,
}

impl<S, C> TransitService<S, C>
where
    S: SnapshotProvider,
    C: CacheBackend,
{
    pub fn new(snapshot: Arc<S>, backend: Arc<C>, cache_config: CacheConfig) -> Self {
        let graphs = GraphCache::new(snapshot.clone(), backend.clone(), cache_config.graph_ttl);
        Self {
            snapshot,
            backend,
            graphs,
            cache_config,
            search_config: SearchConfig::default(),
            fuzzy_config: FuzzyConfig::default(),
        }
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn with_fuzzy_config(mut self, config: FuzzyConfig) -> Self {
        self.fuzzy_config = config;
        self
    }

    pub fn snapshot(&self) -> &Arc<S> {
        &self.snapshot
    }

    /// The current transit graph, built on a cache miss.
    pub async fn graph(&self) -> Result<Arc<TransitGraph>, ServiceError> {
        Ok(self.graphs.get().await?)
    }

    /// Plan a journey between two stops, changing routes where needed.
    pub async fn plan_journey(&self, start: &str, end: &str) -> Result<PlanResult, ServiceError> {
        let request = SearchRequest::new(start, end);
        request.validate()?;

        let graph = self.graph().await?;
        let config = self.search_config.clone();
        // The search is CPU-bound; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || Planner::new(&graph, &config).plan(&request))
            .await??;

        info!(
            start = start.trim(),
            end = end.trim(),
            stops = result.total_stops,
            transfers = result.transfers,
            "Planned journey"
        );
        Ok(result)
    }

    /// Fare for riding `route_number` from `source` to `destination`.
    ///
    /// The route number is resolved like [`route_details`](Self::route_details).
    pub async fn fare_for_route(
        &self,
        route_number: &str,
        source: &str,
        destination: &str,
    ) -> Result<FareQuote, ServiceError> {
        if source.trim().is_empty() || destination.trim().is_empty() {
            return Err(FareError::InvalidInput(
                "both source and destination are required".to_string(),
            )
            .into());
        }

        let details = self.route_details(route_number).await?;
        Ok(fare::quote_for_route(&details.route, source, destination)?)
    }

    /// Ranked name suggestions for a partial query.
    ///
    /// Results are cached per corpus and lowercased query.
    pub async fn autocomplete(&self, query: &str, corpus: Corpus) -> Result<Vec<Match>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let key = keys::autocomplete(corpus.as_str(), query);
        if let Some(matches) = cache::load::<Vec<Match>, _>(&*self.backend, &key).await {
            return Ok(matches);
        }

        let matches = self.autocomplete_uncached(query, corpus).await?;
        cache::store(&*self.backend, &key, &matches, self.cache_config.autocomplete_ttl).await;
        Ok(matches)
    }

    /// Autocomplete without consulting or filling the per-query cache.
    pub async fn autocomplete_uncached(
        &self,
        query: &str,
        corpus: Corpus,
    ) -> Result<Vec<Match>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let matches = match corpus {
            Corpus::Stops => {
                let names = self.stop_corpus().await?;
                fuzzy::extract(
                    query,
                    names.iter().map(String::as_str),
                    corpus.scorer(),
                    &self.fuzzy_config,
                )
            }
            Corpus::Routes => {
                let graph = self.graph().await?;
                fuzzy::extract(
                    query,
                    graph.route_numbers().iter().map(String::as_str),
                    corpus.scorer(),
                    &self.fuzzy_config,
                )
            }
        };

        debug!(query, corpus = corpus.as_str(), matches = matches.len(), "Autocomplete");
        Ok(matches)
    }

    /// Look a route up by number.
    ///
    /// An exact case-insensitive match wins; otherwise the closest route
    /// number by partial ratio is used.
    pub async fn route_details(&self, query: &str) -> Result<RouteDetails, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::InvalidInput("route number is required".to_string()));
        }

        let key = keys::route_details(query);
        if let Some(details) = cache::load::<RouteDetails, _>(&*self.backend, &key).await {
            return Ok(details);
        }

        let routes = self.snapshot.active_routes().await?;
        let details = match routes.iter().find(|r| r.route_number.eq_ignore_ascii_case(query)) {
            Some(route) => RouteDetails {
                bus_type: route.bus_type(),
                route: route.clone(),
                matched_from: None,
                match_score: None,
            },
            None => {
                let matched = self
                    .resolve_route_number(query, &routes)
                    .await
                    .ok_or_else(|| ServiceError::NotFound(format!("route {query}")))?;
                let route = routes
                    .iter()
                    .find(|r| r.route_number == matched.candidate)
                    .ok_or_else(|| ServiceError::NotFound(format!("route {query}")))?;

                debug!(query, resolved = %route.route_number, score = matched.score, "Route resolved by fuzzy match");
                RouteDetails {
                    bus_type: route.bus_type(),
                    route: route.clone(),
                    matched_from: Some(query.to_string()),
                    match_score: Some(matched.score),
                }
            }
        };

        cache::store(&*self.backend, &key, &details, self.cache_config.route_details_ttl).await;
        Ok(details)
    }

    /// Every active route that serves both stops, with the stops ridden.
    pub async fn direct_routes(&self, start: &str, end: &str) -> Result<Vec<DirectRoute>, ServiceError> {
        let (from, to) = (StopKey::new(start), StopKey::new(end));
        if from.is_empty() || to.is_empty() {
            return Err(ServiceError::InvalidInput(
                "both start and end are required".to_string(),
            ));
        }
        if from == to {
            return Err(ServiceError::InvalidInput(
                "start and end are the same stop".to_string(),
            ));
        }

        let graph = self.graph().await?;
        for (key, raw) in [(&from, start), (&to, end)] {
            if !graph.contains_stop(key) {
                return Err(ServiceError::NotFound(format!("stop {}", raw.trim())));
            }
        }

        let routes = self.snapshot.active_routes().await?;
        let direct: Vec<DirectRoute> = routes
            .iter()
            .filter_map(|route| {
                route.sub_path(start, end).map(|stops| DirectRoute {
                    route_number: route.route_number.clone(),
                    bus_type: route.bus_type(),
                    stops,
                })
            })
            .collect();

        if direct.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no single route connects {} and {}",
                graph.display_name(&from),
                graph.display_name(&to)
            )));
        }
        Ok(direct)
    }

    /// Stops with known coordinates within `radius_km`, nearest first.
    pub async fn nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<NearbyStop>, ServiceError> {
        let origin = Coordinate::new(latitude, longitude);
        if !origin.is_valid() {
            return Err(ServiceError::InvalidInput(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }

        let radius_km = radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ServiceError::InvalidInput(format!("invalid radius: {radius_km}")));
        }
        let limit = limit.unwrap_or(DEFAULT_NEARBY_LIMIT);

        let stops = self.snapshot.stops().await?;
        let mut nearby: Vec<NearbyStop> = stops
            .into_iter()
            .filter_map(|stop| {
                let position = Coordinate::from(stop.coordinates()?);
                let distance = origin.haversine_km(&position);
                (distance <= radius_km).then(|| NearbyStop {
                    name: stop.name,
                    latitude: position.latitude,
                    longitude: position.longitude,
                    distance_km: geo::round2(distance),
                })
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(limit);
        Ok(nearby)
    }

    /// Drop the cached graph and stop corpus so the next request rebuilds
    /// them from the snapshot.
    pub async fn invalidate_snapshot(&self) {
        info!("Invalidating cached transit data");
        self.graphs.invalidate().await;
        cache::evict(&*self.backend, keys::STOP_NAMES).await;
    }

    /// All known stop names, cached.
    async fn stop_corpus(&self) -> Result<Vec<String>, ServiceError> {
        if let Some(names) = cache::load::<Vec<String>, _>(&*self.backend, keys::STOP_NAMES).await {
            return Ok(names);
        }

        let names = self.snapshot.stop_names().await?;
        cache::store(&*self.backend, keys::STOP_NAMES, &names, self.cache_config.stop_names_ttl).await;
        Ok(names)
    }

    /// Closest route number by partial ratio, cached.
    ///
    /// Equal scores are broken by edit distance to the query.
    async fn resolve_route_number(&self, query: &str, routes: &[Route]) -> Option<Match> {
        let key = keys::fuzzy_route(query);
        if let Some(matched) = cache::load::<Match, _>(&*self.backend, &key).await {
            return Some(matched);
        }

        let matches = fuzzy::extract(
            query,
            routes.iter().map(|r| r.route_number.as_str()),
            Scorer::Partial,
            &self.fuzzy_config,
        );
        let top = matches.first()?.score;
        let wanted = query.to_lowercase();
        let best = matches
            .into_iter()
            .take_while(|m| m.score == top)
            .min_by_key(|m| fuzzy::distance(&wanted, &m.candidate.to_lowercase()))?;

        cache::store(&*self.backend, &key, &best, self.cache_config.fuzzy_route_ttl).await;
        Some(best)
    }
}
