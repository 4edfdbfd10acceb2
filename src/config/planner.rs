//! Planner configuration loaded from YAML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::{CostFunction, SearchError, SearchResult, SuccessorGenerator};
use crate::planning::blend::WeightedBlender;
use crate::planning::goal::GoalSpecification;
use crate::planning::heuristic::{AStarCost, MetricHeuristic};
use crate::planning::metrics::MetricEvaluator;
use crate::planning::primitives::PrimitiveSetConfig;
use crate::planning::search::{BestFirstSearch, SearchLimits};

use super::defaults;

/// Heuristic settings section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeuristicSection {
    /// Raw weights in metric axis order: orientation, efficiency,
    /// velocity, time, position
    #[serde(default = "defaults::weights")]
    pub weights: Vec<f64>,

    /// Replacement for undefined and non-finite metrics
    #[serde(default = "defaults::sentinel")]
    pub sentinel: f64,

    /// Velocities at or below this magnitude count as stationary
    #[serde(default = "defaults::velocity_epsilon")]
    pub velocity_epsilon: f64,
}

impl Default for HeuristicSection {
    fn default() -> Self {
        Self {
            weights: defaults::weights(),
            sentinel: defaults::sentinel(),
            velocity_epsilon: defaults::velocity_epsilon(),
        }
    }
}

/// Ordering of the open list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// f = h
    Greedy,
    /// f = g + h, g being the accumulated time cost
    Astar,
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Greedy
    }
}

/// Search settings section
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Give up after this many expansions (unbounded if absent)
    #[serde(default)]
    pub max_expansions: Option<usize>,

    /// Wall-clock budget in seconds (unbounded if absent)
    #[serde(default)]
    pub timeout_secs: Option<f64>,
}

/// Full planner configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub heuristic: HeuristicSection,

    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub primitives: PrimitiveSetConfig,
}

impl PlannerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> SearchResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> SearchResult<Self> {
        let config: PlannerConfig =
            serde_yaml::from_str(yaml).map_err(|e| SearchError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that would otherwise fail mid-search
    pub fn validate(&self) -> SearchResult<()> {
        self.blender()?;
        self.evaluator()?;
        self.timeout()?;
        Ok(())
    }

    fn timeout(&self) -> SearchResult<Option<Duration>> {
        self.search
            .timeout_secs
            .map(|t| {
                Duration::try_from_secs_f64(t).map_err(|_| {
                    SearchError::InvalidParameter(format!(
                        "timeout must be a representable non-negative number of seconds, got {}",
                        t
                    ))
                })
            })
            .transpose()
    }

    pub fn blender(&self) -> SearchResult<WeightedBlender> {
        WeightedBlender::from_slice(&self.heuristic.weights)
    }

    pub fn evaluator(&self) -> SearchResult<MetricEvaluator> {
        MetricEvaluator::new(self.heuristic.sentinel, self.heuristic.velocity_epsilon)
    }

    pub fn heuristic(&self, goal: GoalSpecification) -> SearchResult<MetricHeuristic> {
        Ok(MetricHeuristic::new(goal, self.evaluator()?, self.blender()?))
    }

    pub fn search_limits(&self) -> SearchResult<SearchLimits> {
        Ok(SearchLimits {
            max_expansions: self.search.max_expansions,
            timeout: self.timeout()?,
        })
    }

    /// Evaluation function for the configured strategy
    pub fn cost_function(&self, goal: &GoalSpecification) -> SearchResult<Box<dyn CostFunction>> {
        let heuristic = self.heuristic(goal.clone())?;
        Ok(match self.search.strategy {
            SearchStrategy::Greedy => Box::new(heuristic),
            SearchStrategy::Astar => Box::new(AStarCost::new(heuristic, goal.clone())),
        })
    }

    /// Search engine wired from this configuration
    pub fn build_search<S: SuccessorGenerator>(
        &self,
        goal: GoalSpecification,
        successors: S,
    ) -> SearchResult<BestFirstSearch<Box<dyn CostFunction>, S>> {
        self.validate()?;
        goal.validate()?;
        let cost_fn = self.cost_function(&goal)?;
        let limits = self.search_limits()?;
        Ok(BestFirstSearch::new(cost_fn, successors, goal).with_limits(limits))
    }
}
