//! Heuristic evaluation strategies
//!
//! `MetricHeuristic` composes the metric evaluator and the weighted blender
//! into the greedy best-first evaluation function. `AStarCost` wraps any
//! strategy and adds the accumulated time cost of the trajectory.

use log::debug;

use crate::common::{CostFunction, GoalChecker};
use crate::planning::blend::{WeightVector, WeightedBlender};
use crate::planning::goal::GoalSpecification;
use crate::planning::metrics::{MetricEvaluator, MetricVector, RawMetrics};
use crate::planning::node::Node;

/// Per-node instrumentation of the heuristic
#[derive(Debug, Clone)]
pub struct HeuristicReport {
    /// Terminal path already inside the goal region
    pub goal_reached: bool,
    pub raw: RawMetrics,
    pub metrics: MetricVector,
    pub normalized_weights: Vec<f64>,
    pub cost: f64,
}

/// Metric-based distance-to-goal estimate
#[derive(Debug, Clone)]
pub struct MetricHeuristic {
    goal: GoalSpecification,
    evaluator: MetricEvaluator,
    blender: WeightedBlender,
}

impl MetricHeuristic {
    pub fn new(
        goal: GoalSpecification,
        evaluator: MetricEvaluator,
        blender: WeightedBlender,
    ) -> Self {
        Self {
            goal,
            evaluator,
            blender,
        }
    }

    /// Default evaluator constants with the given weights
    pub fn with_weights(goal: GoalSpecification, weights: WeightVector) -> Self {
        Self::new(goal, MetricEvaluator::default(), WeightedBlender::new(weights))
    }

    pub fn goal(&self) -> &GoalSpecification {
        &self.goal
    }

    pub fn evaluator(&self) -> &MetricEvaluator {
        &self.evaluator
    }

    pub fn blender(&self) -> &WeightedBlender {
        &self.blender
    }

    /// Heuristic value of `node`; exactly 0 once its terminal path reaches
    /// the goal region, whatever the weights
    pub fn estimate(&self, node: &Node) -> f64 {
        if self.goal.reached_goal(node.terminal_path()) {
            return 0.0;
        }
        let metrics = self.evaluator.compute(node, &self.goal);
        self.blender.loss(&metrics)
    }

    /// Full breakdown of the estimate, for diagnostics
    pub fn report(&self, node: &Node) -> HeuristicReport {
        let goal_reached = self.goal.reached_goal(node.terminal_path());
        let raw = self.evaluator.compute_raw(node, &self.goal);
        let metrics = raw.post_process(self.evaluator.sentinel());
        let cost = if goal_reached {
            0.0
        } else {
            self.blender.loss(&metrics)
        };
        HeuristicReport {
            goal_reached,
            raw,
            metrics,
            normalized_weights: self.blender.normalized_weights().to_vec(),
            cost,
        }
    }
}

impl CostFunction for MetricHeuristic {
    fn cost(&self, node: &Node) -> f64 {
        let h = self.estimate(node);
        debug!("[Heuristic] depth={} h={:.3}", node.depth(), h);
        h
    }
}

/// A*-style evaluation: accumulated time cost plus the wrapped heuristic
#[derive(Debug, Clone)]
pub struct AStarCost<H> {
    heuristic: H,
    goal: GoalSpecification,
}

impl<H: CostFunction> AStarCost<H> {
    pub fn new(heuristic: H, goal: GoalSpecification) -> Self {
        Self { heuristic, goal }
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }
}

impl<H: CostFunction> CostFunction for AStarCost<H> {
    fn cost(&self, node: &Node) -> f64 {
        if self.goal.reached_goal(node.terminal_path()) {
            return 0.0;
        }
        node.path_cost() + self.heuristic.cost(node)
    }
}

impl<T: CostFunction + ?Sized> CostFunction for Box<T> {
    fn cost(&self, node: &Node) -> f64 {
        (**self).cost(node)
    }
}
