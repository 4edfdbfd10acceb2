//! Distance-to-goal metrics of a search node
//!
//! Every node is scored on five fixed axes. An axis whose goal constraint
//! is not configured is `Undefined`; an axis that is computed but singular
//! (a stationary vehicle facing a position target) carries `+inf`. Both are
//! clamped to one large finite sentinel before blending so the blended
//! loss stays totally ordered.

use std::fmt;

use itertools::Itertools;
use nalgebra::SVector;

use crate::common::{angle_difference, Path, SearchError, SearchResult};
use crate::planning::goal::GoalSpecification;
use crate::planning::node::Node;

/// Number of metric axes
pub const METRIC_COUNT: usize = 5;

/// Replacement for undefined and non-finite metric entries
pub const DEFAULT_SENTINEL: f64 = 99999.0;

/// Terminal velocities with `|v| <= eps` count as stationary
pub const DEFAULT_VELOCITY_EPSILON: f64 = 1e-8;

/// Metric axes in their fixed vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricAxis {
    OrientationDiff = 0,
    TrajectoryEfficiency = 1,
    VelocityDiff = 2,
    TimeDiff = 3,
    PositionDiff = 4,
}

impl MetricAxis {
    pub const ALL: [MetricAxis; METRIC_COUNT] = [
        MetricAxis::OrientationDiff,
        MetricAxis::TrajectoryEfficiency,
        MetricAxis::VelocityDiff,
        MetricAxis::TimeDiff,
        MetricAxis::PositionDiff,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricAxis::OrientationDiff => "orientation_diff",
            MetricAxis::TrajectoryEfficiency => "trajectory_efficiency",
            MetricAxis::VelocityDiff => "velocity_diff",
            MetricAxis::TimeDiff => "time_diff",
            MetricAxis::PositionDiff => "position_diff",
        }
    }
}

/// Metric value before post-processing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawMetric {
    /// No goal constraint on this axis
    Undefined,
    /// Computed value; may be non-finite
    Defined(f64),
}

impl RawMetric {
    pub fn value(self) -> Option<f64> {
        match self {
            RawMetric::Undefined => None,
            RawMetric::Defined(v) => Some(v),
        }
    }

    /// Defined but NaN or infinite
    pub fn is_singular(self) -> bool {
        matches!(self, RawMetric::Defined(v) if !v.is_finite())
    }

    fn clamped(self, sentinel: f64) -> f64 {
        match self {
            RawMetric::Defined(v) if v.is_finite() => v,
            _ => sentinel,
        }
    }
}

impl From<Option<f64>> for RawMetric {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawMetric::Undefined, RawMetric::Defined)
    }
}

/// Metrics before clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMetrics([RawMetric; METRIC_COUNT]);

impl RawMetrics {
    pub fn get(&self, axis: MetricAxis) -> RawMetric {
        self.0[axis.index()]
    }

    pub fn as_array(&self) -> &[RawMetric; METRIC_COUNT] {
        &self.0
    }

    /// Replace every undefined or non-finite entry with `sentinel`
    pub fn post_process(&self, sentinel: f64) -> MetricVector {
        MetricVector(SVector::from_fn(|i, _| self.0[i].clamped(sentinel)))
    }
}

/// Fully defined, finite metric vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricVector(SVector<f64, METRIC_COUNT>);

impl MetricVector {
    pub fn get(&self, axis: MetricAxis) -> f64 {
        self.0[axis.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    pub fn as_vector(&self) -> &SVector<f64, METRIC_COUNT> {
        &self.0
    }

    pub fn len(&self) -> usize {
        METRIC_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for MetricVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = MetricAxis::ALL
            .iter()
            .map(|&axis| format!("{}={:.3}", axis.name(), self.get(axis)))
            .join(", ");
        write!(f, "[{}]", body)
    }
}

/// Derives the metric vector of a node against a goal specification
#[derive(Debug, Clone)]
pub struct MetricEvaluator {
    sentinel: f64,
    velocity_epsilon: f64,
}

impl Default for MetricEvaluator {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            velocity_epsilon: DEFAULT_VELOCITY_EPSILON,
        }
    }
}

impl MetricEvaluator {
    pub fn new(sentinel: f64, velocity_epsilon: f64) -> SearchResult<Self> {
        if !sentinel.is_finite() {
            return Err(SearchError::InvalidParameter(format!(
                "sentinel must be finite, got {}",
                sentinel
            )));
        }
        if velocity_epsilon.is_nan() || velocity_epsilon <= 0.0 {
            return Err(SearchError::InvalidParameter(format!(
                "velocity epsilon must be positive, got {}",
                velocity_epsilon
            )));
        }
        Ok(Self {
            sentinel,
            velocity_epsilon,
        })
    }

    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    pub fn velocity_epsilon(&self) -> f64 {
        self.velocity_epsilon
    }

    /// Post-processed metrics of `node`
    pub fn compute(&self, node: &Node, goal: &GoalSpecification) -> MetricVector {
        self.compute_raw(node, goal).post_process(self.sentinel)
    }

    /// Metrics before clamping, with undefined axes kept explicit
    pub fn compute_raw(&self, node: &Node, goal: &GoalSpecification) -> RawMetrics {
        let last_state = node.terminal_state();

        let orientation_diff = Self::orientation_diff(node, goal);

        // Mean primitive duration over the whole trajectory
        let trajectory_efficiency =
            node.list_paths().map(Path::time_cost).sum::<f64>() / node.num_paths() as f64;

        let velocity_diff = goal
            .velocity
            .map(|desired| desired.midpoint() - last_state.velocity);

        let time_diff = goal
            .time_step
            .map(|desired| f64::from(desired.start) - f64::from(last_state.time_step));

        let position_diff = goal.target_point().map(|target| {
            if last_state.velocity.abs() <= self.velocity_epsilon {
                f64::INFINITY
            } else {
                last_state.position.distance(&target) / last_state.velocity
            }
        });

        RawMetrics([
            RawMetric::Defined(orientation_diff),
            RawMetric::Defined(trajectory_efficiency),
            velocity_diff.into(),
            time_diff.into(),
            position_diff.into(),
        ])
    }

    /// Absolute heading error towards the goal. Without a position target
    /// the desired orientation midpoint is used, and without either the
    /// heading is unconstrained.
    fn orientation_diff(node: &Node, goal: &GoalSpecification) -> f64 {
        let last_state = node.terminal_state();
        let desired = match (goal.target_point(), goal.orientation) {
            (Some(target), _) => last_state.position.bearing_to(&target),
            (None, Some(interval)) => interval.midpoint(),
            (None, None) => return 0.0,
        };
        angle_difference(desired, last_state.orientation).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Point2D, State};
    use crate::planning::goal::{GoalRegion, Interval};
    use std::f64::consts::PI;

    fn node_ending_at(state: State) -> Node {
        let start = State::new(0.0, 0.0, state.orientation, state.velocity, 0);
        let path = Path::new(vec![start, state]).unwrap();
        Node::root(start).child(path)
    }

    fn circle_at(x: f64, y: f64) -> GoalRegion {
        GoalRegion::Circle {
            center: Point2D::new(x, y),
            radius: 1.0,
        }
    }

    #[test]
    fn test_axis_order_is_fixed() {
        let names: Vec<&str> = MetricAxis::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "orientation_diff",
                "trajectory_efficiency",
                "velocity_diff",
                "time_diff",
                "position_diff"
            ]
        );
        for (i, axis) in MetricAxis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn test_unconstrained_goal_clamps_axes_three_to_five() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(3.0, 0.0, 0.0, 2.0, 3));
        let goal = GoalSpecification::unconstrained();

        let raw = evaluator.compute_raw(&node, &goal);
        assert_eq!(raw.get(MetricAxis::VelocityDiff), RawMetric::Undefined);
        assert_eq!(raw.get(MetricAxis::TimeDiff), RawMetric::Undefined);
        assert_eq!(raw.get(MetricAxis::PositionDiff), RawMetric::Undefined);

        let metrics = evaluator.compute(&node, &goal);
        assert_eq!(metrics.get(MetricAxis::OrientationDiff), 0.0);
        // Root path lasts 0 steps, the appended primitive 3
        assert!((metrics.get(MetricAxis::TrajectoryEfficiency) - 1.5).abs() < 1e-12);
        assert_eq!(metrics.get(MetricAxis::VelocityDiff), DEFAULT_SENTINEL);
        assert_eq!(metrics.get(MetricAxis::TimeDiff), DEFAULT_SENTINEL);
        assert_eq!(metrics.get(MetricAxis::PositionDiff), DEFAULT_SENTINEL);
        assert!(metrics.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_stationary_vehicle_is_singular_then_clamped() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 0.0, 1));
        let goal = GoalSpecification::unconstrained().with_position(circle_at(10.0, 0.0));

        let raw = evaluator.compute_raw(&node, &goal);
        assert_eq!(raw.get(MetricAxis::PositionDiff), RawMetric::Defined(f64::INFINITY));
        assert!(raw.get(MetricAxis::PositionDiff).is_singular());
        assert!(!raw.get(MetricAxis::VelocityDiff).is_singular());

        let metrics = evaluator.compute(&node, &goal);
        assert_eq!(metrics.get(MetricAxis::PositionDiff), DEFAULT_SENTINEL);
    }

    #[test]
    fn test_position_diff_is_time_to_goal() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 5.0, 1));
        let goal = GoalSpecification::unconstrained().with_position(circle_at(10.0, 0.0));

        let metrics = evaluator.compute(&node, &goal);
        assert!((metrics.get(MetricAxis::PositionDiff) - 2.0).abs() < 1e-12);
        assert!(metrics.get(MetricAxis::OrientationDiff).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_and_time_diffs_are_signed() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 5.0, 12));
        let goal = GoalSpecification::unconstrained()
            .with_velocity(Interval::new(6.0, 8.0).unwrap())
            .with_time_step(Interval::new(10, 20).unwrap());

        let metrics = evaluator.compute(&node, &goal);
        assert!((metrics.get(MetricAxis::VelocityDiff) - 2.0).abs() < 1e-12);
        assert!((metrics.get(MetricAxis::TimeDiff) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_orientation_diff_uses_wrapped_bearing() {
        let evaluator = MetricEvaluator::default();
        // Facing almost -PI, goal lies straight behind at bearing PI
        let node = node_ending_at(State::new(0.0, 0.0, -PI + 0.1, 1.0, 1));
        let goal = GoalSpecification::unconstrained().with_position(circle_at(-10.0, 0.0));

        let metrics = evaluator.compute(&node, &goal);
        assert!((metrics.get(MetricAxis::OrientationDiff) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_diff_falls_back_to_desired_heading() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 1.0, 1));
        let goal = GoalSpecification::unconstrained()
            .with_orientation(Interval::new(0.4, 0.6).unwrap());

        let metrics = evaluator.compute(&node, &goal);
        assert!((metrics.get(MetricAxis::OrientationDiff) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_custom_sentinel_and_epsilon() {
        let evaluator = MetricEvaluator::new(1e3, 0.5).unwrap();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 0.4, 1));
        let goal = GoalSpecification::unconstrained().with_position(circle_at(10.0, 0.0));

        let metrics = evaluator.compute(&node, &goal);
        assert_eq!(metrics.get(MetricAxis::PositionDiff), 1e3);
        assert_eq!(metrics.get(MetricAxis::TimeDiff), 1e3);
    }

    #[test]
    fn test_invalid_evaluator_parameters() {
        assert!(MetricEvaluator::new(f64::INFINITY, 1e-8).is_err());
        assert!(MetricEvaluator::new(f64::NAN, 1e-8).is_err());
        assert!(MetricEvaluator::new(99999.0, -1.0).is_err());
        assert!(MetricEvaluator::new(99999.0, f64::NAN).is_err());
        assert!(matches!(
            MetricEvaluator::new(99999.0, 0.0),
            Err(SearchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_display_lists_axes() {
        let evaluator = MetricEvaluator::default();
        let node = node_ending_at(State::new(0.0, 0.0, 0.0, 5.0, 1));
        let text = evaluator
            .compute(&node, &GoalSpecification::unconstrained())
            .to_string();
        assert!(text.starts_with("[orientation_diff=0.000, trajectory_efficiency="));
        assert!(text.ends_with("position_diff=99999.000]"));
    }
}
