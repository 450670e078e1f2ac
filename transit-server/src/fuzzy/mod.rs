//! Fuzzy name matching for autocomplete and route lookup.

mod score;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use score::{best_token_ratio, distance, partial_ratio, ratio, token_sort_ratio, weighted_ratio};

/// A candidate that scored at or above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub candidate: String,
    pub score: f64,
}

/// Which scorer to rank candidates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scorer {
    /// Stop names: tolerant of misspellings and extra words.
    Weighted,
    /// Route numbers: substring matches count as exact.
    Partial,
}

impl Scorer {
    pub fn score(self, query: &str, candidate: &str) -> f64 {
        match self {
            Scorer::Weighted => weighted_ratio(query, candidate),
            Scorer::Partial => partial_ratio(query, candidate),
        }
    }
}

/// What autocomplete searches over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    #[default]
    Stops,
    Routes,
}

impl Corpus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Corpus::Stops => "stops",
            Corpus::Routes => "routes",
        }
    }

    pub fn scorer(&self) -> Scorer {
        match self {
            Corpus::Stops => Scorer::Weighted,
            Corpus::Routes => Scorer::Partial,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FuzzyConfig {
    /// Minimum score (0–100) for a candidate to be returned.
    pub threshold: f64,

    /// Maximum number of matches returned.
    pub limit: usize,
}

impl FuzzyConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 60.0,
            limit: 10,
        }
    }
}

/// Score every candidate and keep the best.
///
/// Results are sorted by descending score; ties keep corpus order.
pub fn extract<'a, I>(query: &str, candidates: I, scorer: Scorer, config: &FuzzyConfig) -> Vec<Match>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matches: Vec<Match> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = scorer.score(query, candidate);
            (score >= config.threshold).then(|| Match {
                candidate: candidate.to_string(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(config.limit);

    trace!(query, ?scorer, matches = matches.len(), "Fuzzy extract");
    matches
}
