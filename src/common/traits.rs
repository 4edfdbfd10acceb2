//! Common traits defining the seams of the search core

use crate::common::types::{Path, State};
use crate::planning::node::Node;

/// Goal-region predicate over kinematic states
pub trait GoalChecker {
    /// Whether a single state lies inside the goal region
    fn is_reached(&self, state: &State) -> bool;

    /// Index of the first state of `path` inside the goal region
    fn first_reached(&self, path: &Path) -> Option<usize> {
        path.states().iter().position(|s| self.is_reached(s))
    }

    /// Whether any state of `path` lies inside the goal region
    fn reached_goal(&self, path: &Path) -> bool {
        self.first_reached(path).is_some()
    }
}

/// Evaluation function used to order the open list
///
/// Lower values are expanded first. Costs may be negative or infinite; the
/// search queues a NaN cost as `+inf`.
pub trait CostFunction {
    fn cost(&self, node: &Node) -> f64;
}

/// Successor generation for a node (primitive expansion plus feasibility filter)
pub trait SuccessorGenerator {
    /// Admissible paths that can be appended to `node`
    fn successors(&self, node: &Node) -> Vec<Path>;
}

/// Read-only observation of nodes popped from the open list
pub trait SearchObserver {
    fn on_pop(&mut self, node: &Node, cost: f64);
}

impl<F> SearchObserver for F
where
    F: FnMut(&Node, f64),
{
    fn on_pop(&mut self, node: &Node, cost: f64) {
        self(node, cost)
    }
}

/// Observer that ignores every notification
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_pop(&mut self, _node: &Node, _cost: f64) {}
}
