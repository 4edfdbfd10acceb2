//! primitive_search - heuristic-guided motion primitive search
//!
//! This crate provides the heuristic core of a best-first search over
//! vehicle trajectories assembled from motion primitives: distance-to-goal
//! metrics, softmax-weighted blending into one cost, and the search loop
//! that uses that cost to order expansions.

// Core modules
pub mod common;
pub mod config;

// Algorithm modules
pub mod planning;

// Re-export common types for convenience
pub use common::{Path, Point2D, State};
pub use common::{CostFunction, GoalChecker, SearchObserver, SuccessorGenerator};
pub use common::{SearchError, SearchResult};
pub use config::PlannerConfig;
