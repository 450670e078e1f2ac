//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use tracing::info;

use crate::fare::FareQuote;
use crate::planner::PlanResult;
use crate::service::{DirectRoute, RouteDetails, ServiceError};

use super::dto::*;
use super::error::AppError;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/journey", get(plan_journey))
        .route("/api/fare", get(fare))
        .route("/api/autocomplete", get(autocomplete))
        .route("/api/routes/search", get(direct_routes))
        .route("/api/routes/:number", get(route_details))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/admin/invalidate", post(invalidate))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn plan_journey(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<PlanResult>, AppError> {
    let result = state.transit.plan_journey(&query.start, &query.end).await?;
    Ok(Json(result))
}

async fn fare(
    State(state): State<AppState>,
    Query(query): Query<FareQuery>,
) -> Result<Json<FareQuote>, AppError> {
    let quote = state
        .transit
        .fare_for_route(&query.route_number, &query.source, &query.destination)
        .await?;
    Ok(Json(quote))
}

async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<AutocompleteResponse>, AppError> {
    let matches = state.transit.autocomplete(&query.q, query.corpus).await?;
    Ok(Json(AutocompleteResponse {
        query: query.q,
        corpus: query.corpus,
        matches,
    }))
}

async fn route_details(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<RouteDetails>, AppError> {
    Ok(Json(state.transit.route_details(&number).await?))
}

/// Routes that connect both stops without a change.
async fn direct_routes(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<Vec<DirectRoute>>, AppError> {
    let routes = state.transit.direct_routes(&query.start, &query.end).await?;
    Ok(Json(routes))
}

async fn nearby_stops(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>, AppError> {
    let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
        return Err(ServiceError::InvalidInput("both lat and lon are required".to_string()).into());
    };

    let stops = state
        .transit
        .nearby_stops(lat, lon, query.radius, query.limit)
        .await?;
    Ok(Json(NearbyResponse {
        count: stops.len(),
        stops,
    }))
}

/// Re-read the data file and drop cached artifacts built from the old one.
async fn invalidate(State(state): State<AppState>) -> Result<Json<InvalidateResponse>, AppError> {
    let routes = state
        .transit
        .snapshot()
        .reload()
        .await
        .map_err(ServiceError::from)?;
    state.transit.invalidate_snapshot().await;

    info!(routes, "Snapshot reloaded on request");
    Ok(Json(InvalidateResponse { routes }))
}
