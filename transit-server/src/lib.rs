//! Bus transit journey planner server.
//!
//! Answers: "which route connects stop A to stop B, and if none does, how do
//! I get there changing buses?" Also quotes stage fares and suggests stop
//! and route names as you type.

pub mod cache;
pub mod config;
pub mod domain;
pub mod fare;
pub mod fuzzy;
pub mod geo;
pub mod graph;
pub mod planner;
pub mod service;
pub mod snapshot;
pub mod web;
