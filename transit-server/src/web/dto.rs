//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::fuzzy::{Corpus, Match};
use crate::service::NearbyStop;

/// Query for journey planning and direct route search.
#[derive(Debug, Deserialize)]
pub struct TripQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct FareQuery {
    #[serde(default)]
    pub route_number: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,

    /// Defaults to stop names
    #[serde(default)]
    pub corpus: Corpus,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub query: String,
    pub corpus: Corpus,
    pub matches: Vec<Match>,
}

/// Missing coordinates are reported by the handler, not the extractor.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Search radius in kilometres
    pub radius: Option<f64>,

    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub count: usize,
    pub stops: Vec<NearbyStop>,
}

/// Result of a snapshot reload.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Active routes loaded from the data file
    pub routes: usize,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
