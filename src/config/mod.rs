//! Configuration loading for the planner.
//!
//! All tunables live in a single YAML document; every field is optional.

mod defaults;
mod planner;

pub use planner::{HeuristicSection, PlannerConfig, SearchSection, SearchStrategy};
