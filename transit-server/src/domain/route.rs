//! Route records and bus-type classification.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::StopKey;

/// Schedule metadata carried by a route.
///
/// The planner never interprets these fields; they are passed through to
/// route detail lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub first_bus_weekday: Option<NaiveTime>,
    #[serde(default)]
    pub last_bus_weekday: Option<NaiveTime>,
    #[serde(default)]
    pub first_bus_sunday: Option<NaiveTime>,
    #[serde(default)]
    pub last_bus_sunday: Option<NaiveTime>,
    #[serde(default)]
    pub frequency_weekday_mins: Option<u32>,
    #[serde(default)]
    pub frequency_sunday_mins: Option<u32>,
    #[serde(default)]
    pub average_fare: Option<f64>,
}

/// A route: a route number and the ordered stops it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_number: String,

    /// Free-text "source - destination" label.
    #[serde(default)]
    pub source_destination: Option<String>,

    /// Stop names in `stop_order`. The same stop may appear more than once.
    pub stops: Vec<String>,

    #[serde(default)]
    pub schedule: Schedule,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Route {
    /// Create an active route with no schedule data.
    pub fn new<S: Into<String>>(route_number: impl Into<String>, stops: Vec<S>) -> Self {
        Self {
            route_number: route_number.into(),
            source_destination: None,
            stops: stops.into_iter().map(Into::into).collect(),
            schedule: Schedule::default(),
            active: true,
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn bus_type(&self) -> BusType {
        BusType::classify(&self.route_number)
    }

    /// Position of the first stop matching `name` (trimmed, case-insensitive).
    pub fn position_of(&self, name: &str) -> Option<usize> {
        let key = StopKey::new(name);
        self.stops.iter().position(|s| key.matches(s))
    }

    /// The stops ridden from `source` to `destination`, inclusive.
    ///
    /// Direction-aware: when `source` comes after `destination` on the route
    /// the slice is returned reversed. Returns `None` if either stop is not
    /// on the route.
    pub fn sub_path(&self, source: &str, destination: &str) -> Option<Vec<String>> {
        let from = self.position_of(source)?;
        let to = self.position_of(destination)?;

        let path = if from <= to {
            self.stops[from..=to].to_vec()
        } else {
            self.stops[to..=from].iter().rev().cloned().collect()
        };
        Some(path)
    }
}

/// AC / Non-AC classification of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "Non-AC")]
    NonAc,
}

/// Characters that may delimit the "AC" marker in a route number.
const AC_DELIMITERS: [char; 4] = ['.', ' ', '-', '_'];

impl BusType {
    /// Classify a route number.
    ///
    /// A route is AC when its number contains `AC` (any case) as a token
    /// delimited by `.`, space, `-`, `_` or the ends of the string.
    ///
    /// ```
    /// use transit_server::domain::BusType;
    ///
    /// assert_eq!(BusType::classify("AC-101"), BusType::Ac);
    /// assert_eq!(BusType::classify("105 ac"), BusType::Ac);
    /// assert_eq!(BusType::classify("MACE"), BusType::NonAc);
    /// ```
    pub fn classify(route_number: &str) -> Self {
        let is_ac = route_number
            .split(|c: char| AC_DELIMITERS.contains(&c))
            .any(|token| token.eq_ignore_ascii_case("ac"));
        if is_ac { BusType::Ac } else { BusType::NonAc }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusType::Ac => "AC",
            BusType::NonAc => "Non-AC",
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
