//! Best-first search over motion primitives
//!
//! The open list is a min-heap on the evaluation function; ties are broken
//! by insertion order so runs are reproducible. The engine is agnostic to
//! how costs are computed: any `CostFunction` can drive it.
//!
//! States of a run: open while the list is non-empty, then either goal
//! found or exhausted (no solution, cancelled, or expansion limit hit).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use ordered_float::OrderedFloat;

use crate::common::{
    CostFunction, GoalChecker, NoopObserver, Path, SearchObserver, State, SuccessorGenerator,
};
use crate::planning::goal::GoalSpecification;
use crate::planning::node::Node;

/// Shared cancellation flag, checked once per iteration
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Optional bounds on a search run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    /// Maximum number of nodes whose successors are generated
    pub max_expansions: Option<usize>,
    /// Wall-clock budget; running out counts as cancellation
    pub timeout: Option<Duration>,
}

/// Why a run ended without a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionReason {
    /// Open list emptied without reaching the goal
    NoSolution,
    /// Cancel flag raised or timeout elapsed
    Cancelled,
    /// `max_expansions` reached
    ExpansionLimit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes dequeued from the open list
    pub nodes_popped: usize,
    /// Nodes whose successors were generated
    pub nodes_expanded: usize,
    /// Nodes enqueued into the open list, root included
    pub nodes_generated: usize,
    /// Evaluation function invocations
    pub heuristic_calls: usize,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone)]
pub struct Solution {
    /// Path sequence from the initial state to the goal. States of the
    /// last path after the first goal state are removed.
    pub paths: Vec<Path>,
    /// Evaluation value the goal node was queued with
    pub cost: f64,
    pub stats: SearchStats,
}

impl Solution {
    pub fn final_state(&self) -> &State {
        self.paths[self.paths.len() - 1].last()
    }

    /// Number of motion primitives applied
    pub fn num_primitives(&self) -> usize {
        self.paths.len() - 1
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    GoalFound(Solution),
    Exhausted {
        reason: ExhaustionReason,
        stats: SearchStats,
    },
}

impl SearchOutcome {
    pub fn is_goal_found(&self) -> bool {
        matches!(self, SearchOutcome::GoalFound(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::GoalFound(solution) => Some(solution),
            SearchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn exhaustion_reason(&self) -> Option<ExhaustionReason> {
        match self {
            SearchOutcome::GoalFound(_) => None,
            SearchOutcome::Exhausted { reason, .. } => Some(*reason),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::GoalFound(solution) => &solution.stats,
            SearchOutcome::Exhausted { stats, .. } => stats,
        }
    }
}

/// Open-list entry. Compared in reverse so the heap yields the smallest
/// cost first, and the earliest insertion among equal costs.
struct QueueEntry {
    cost: OrderedFloat<f64>,
    seq: u64,
    node: Node,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-cost-first priority queue of nodes with FIFO tie-breaking
#[derive(Default)]
pub(crate) struct OpenList {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl OpenList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// NaN costs are queued as `+inf`
    pub(crate) fn push(&mut self, node: Node, cost: f64) {
        let cost = if cost.is_nan() { f64::INFINITY } else { cost };
        self.heap.push(QueueEntry {
            cost: OrderedFloat(cost),
            seq: self.next_seq,
            node,
        });
        self.next_seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<(Node, f64)> {
        self.heap.pop().map(|e| (e.node, e.cost.into_inner()))
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Best-first search engine with a pluggable evaluation function
pub struct BestFirstSearch<C, S> {
    cost_fn: C,
    successors: S,
    goal: GoalSpecification,
    limits: SearchLimits,
    cancel: CancelFlag,
}

impl<C: CostFunction, S: SuccessorGenerator> BestFirstSearch<C, S> {
    pub fn new(cost_fn: C, successors: S, goal: GoalSpecification) -> Self {
        Self {
            cost_fn,
            successors,
            goal,
            limits: SearchLimits::default(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Use an externally owned cancel flag
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn cost_fn(&self) -> &C {
        &self.cost_fn
    }

    pub fn goal(&self) -> &GoalSpecification {
        &self.goal
    }

    pub fn execute(&self, initial: State) -> SearchOutcome {
        self.execute_observed(initial, &mut NoopObserver)
    }

    /// Run the search, notifying `observer` of every popped node
    pub fn execute_observed<O>(&self, initial: State, observer: &mut O) -> SearchOutcome
    where
        O: SearchObserver + ?Sized,
    {
        let start_time = Instant::now();
        let mut stats = SearchStats::default();
        let mut open = OpenList::new();

        let root = Node::root(initial);
        let root_cost = self.cost_fn.cost(&root);
        stats.heuristic_calls += 1;
        open.push(root, root_cost);
        stats.nodes_generated += 1;

        debug!(
            "[Search] start: x={:.2} y={:.2} v={:.2} t={}",
            initial.position.x, initial.position.y, initial.velocity, initial.time_step
        );

        loop {
            if self.is_cancelled(start_time) {
                debug!("[Search] cancelled after {} pops", stats.nodes_popped);
                return Self::exhausted(ExhaustionReason::Cancelled, stats, start_time);
            }

            let (node, cost) = match open.pop() {
                Some(entry) => entry,
                None => break,
            };
            stats.nodes_popped += 1;
            trace!(
                "[Search] pop depth={} cost={:.3} open={}",
                node.depth(),
                cost,
                open.len()
            );
            observer.on_pop(&node, cost);

            if let Some(index) = self.goal.first_reached(node.terminal_path()) {
                stats.elapsed_secs = start_time.elapsed().as_secs_f64();
                debug!(
                    "[Search] goal found at depth {} after {} pops",
                    node.depth(),
                    stats.nodes_popped
                );
                return SearchOutcome::GoalFound(Solution {
                    paths: Self::trim_after_goal(&node, index),
                    cost,
                    stats,
                });
            }

            if let Some(max) = self.limits.max_expansions {
                if stats.nodes_expanded >= max {
                    debug!("[Search] expansion limit {} reached", max);
                    return Self::exhausted(ExhaustionReason::ExpansionLimit, stats, start_time);
                }
            }

            stats.nodes_expanded += 1;
            for path in self.successors.successors(&node) {
                let child = node.child(path);
                let child_cost = self.cost_fn.cost(&child);
                stats.heuristic_calls += 1;
                open.push(child, child_cost);
                stats.nodes_generated += 1;
            }
        }

        debug!("[Search] open list empty after {} pops", stats.nodes_popped);
        Self::exhausted(ExhaustionReason::NoSolution, stats, start_time)
    }

    fn is_cancelled(&self, start_time: Instant) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        match self.limits.timeout {
            Some(timeout) => start_time.elapsed() >= timeout,
            None => false,
        }
    }

    fn exhausted(
        reason: ExhaustionReason,
        mut stats: SearchStats,
        start_time: Instant,
    ) -> SearchOutcome {
        stats.elapsed_secs = start_time.elapsed().as_secs_f64();
        SearchOutcome::Exhausted { reason, stats }
    }

    fn trim_after_goal(node: &Node, goal_index: usize) -> Vec<Path> {
        let mut paths = node.to_paths();
        if let Some(last) = paths.pop() {
            paths.push(last.truncated(goal_index));
        }
        paths
    }
}
