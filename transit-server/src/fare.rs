//! Stage-based fares.
//!
//! Fares rise every five stops ridden. Each bus type has its own staircase;
//! rides longer than the table covers are charged the type's minimum fare.

use serde::{Deserialize, Serialize};

use crate::domain::{BusType, Route, StopKey};

/// Stops per fare stage.
const STAGE_LENGTH: usize = 5;

const NON_AC_FARES: [u32; 10] = [7, 10, 12, 15, 17, 20, 22, 25, 27, 30];
const NON_AC_MINIMUM: u32 = 7;

const AC_FARES: [u32; 10] = [10, 15, 20, 25, 30, 35, 40, 45, 50, 55];
const AC_MINIMUM: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FareError {
    #[error("invalid fare request: {0}")]
    InvalidInput(String),

    /// A ride must cover at least two stops
    #[error("invalid stop count: {0}")]
    InvalidRange(usize),

    #[error("stop {stop} is not on route {route}")]
    NotFoundOnRoute { route: String, stop: String },
}

/// A fare for riding one route between two of its stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub route_number: String,
    pub bus_type: BusType,
    pub source: String,
    pub destination: String,

    /// Stops ridden, both endpoints included.
    pub num_stops: usize,

    /// Fare in whole rupees.
    pub fare: u32,

    pub stops: Vec<String>,
}

fn table(bus_type: BusType) -> (&'static [u32], u32) {
    match bus_type {
        BusType::Ac => (&AC_FARES, AC_MINIMUM),
        BusType::NonAc => (&NON_AC_FARES, NON_AC_MINIMUM),
    }
}

/// Fare for a ride covering `num_stops` stops, endpoints included.
pub fn fare(num_stops: usize, bus_type: BusType) -> Result<u32, FareError> {
    if num_stops < 2 {
        return Err(FareError::InvalidRange(num_stops));
    }

    let (fares, minimum) = table(bus_type);
    let stage = (num_stops - 1) / STAGE_LENGTH;
    Ok(fares.get(stage).copied().unwrap_or(minimum))
}

/// Quote the fare from `source` to `destination` on `route`.
///
/// Travel against the route's stop order is allowed.
pub fn quote_for_route(route: &Route, source: &str, destination: &str) -> Result<FareQuote, FareError> {
    let (source, destination) = (source.trim(), destination.trim());

    if source.is_empty() || destination.is_empty() {
        return Err(FareError::InvalidInput(
            "both source and destination are required".to_string(),
        ));
    }
    if StopKey::new(source) == StopKey::new(destination) {
        return Err(FareError::InvalidInput(
            "source and destination are the same stop".to_string(),
        ));
    }

    for stop in [source, destination] {
        if route.position_of(stop).is_none() {
            return Err(FareError::NotFoundOnRoute {
                route: route.route_number.clone(),
                stop: stop.to_string(),
            });
        }
    }

    let stops = route
        .sub_path(source, destination)
        .ok_or_else(|| FareError::NotFoundOnRoute {
            route: route.route_number.clone(),
            stop: source.to_string(),
        })?;

    let bus_type = route.bus_type();
    let num_stops = stops.len();

    Ok(FareQuote {
        route_number: route.route_number.clone(),
        bus_type,
        source: source.to_string(),
        destination: destination.to_string(),
        num_stops,
        fare: fare(num_stops, bus_type)?,
        stops,
    })
}
