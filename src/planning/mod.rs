//! Heuristic-guided search over motion primitives
//!
//! # Components
//!
//! - `node`: partial trajectories forming the search tree
//! - `goal`: goal region and goal predicate
//! - `metrics`: five distance-to-goal metrics per node
//! - `blend`: softmax weighting of metrics into one loss
//! - `heuristic`: evaluation strategies built from metrics and weights
//! - `search`: best-first search engine
//! - `motion_model` / `primitives`: bicycle-model primitive library used as
//!   the successor generator

pub mod node;
pub mod goal;
pub mod metrics;
pub mod blend;
pub mod heuristic;
pub mod search;
pub mod motion_model;
pub mod primitives;

pub use node::Node;
pub use goal::{GoalRegion, GoalSpecification, Interval};
pub use metrics::{
    MetricAxis, MetricEvaluator, MetricVector, RawMetric, RawMetrics, DEFAULT_SENTINEL,
    DEFAULT_VELOCITY_EPSILON, METRIC_COUNT,
};
pub use blend::{loss, softmax, WeightVector, WeightedBlender};
pub use heuristic::{AStarCost, HeuristicReport, MetricHeuristic};
pub use search::{
    BestFirstSearch, CancelFlag, ExhaustionReason, SearchLimits, SearchOutcome, SearchStats,
    Solution,
};
pub use motion_model::{BicycleModel, MotionModelConfig};
pub use primitives::{FeasibilityFn, MotionPrimitive, PrimitiveLibrary, PrimitiveSetConfig};
