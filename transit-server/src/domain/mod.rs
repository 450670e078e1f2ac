//! Domain types for the transit engine.
//!
//! Stops are identified by name, routes by route number. Everything the
//! engine derives (graphs, plans, fares) is built from these read-only
//! records handed over by a snapshot provider.

mod route;
mod stop;

pub use route::{BusType, Route, Schedule};
pub use stop::{Stop, StopKey};
