//! Motion primitive library
//!
//! Stores primitives relative to the origin (heading 0, time step 0) and
//! attaches them to the terminal state of a node. A primitive is applicable
//! when its start velocity matches the terminal velocity within a
//! tolerance; an optional feasibility predicate filters the attached paths.

use nalgebra::Rotation2;
use serde::{Deserialize, Serialize};

use crate::common::{normalize_angle, Path, SearchError, SearchResult, State, SuccessorGenerator};
use crate::planning::motion_model::{BicycleModel, MotionModelConfig};
use crate::planning::node::Node;

/// Parameters for generating a primitive set with the bicycle model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveSetConfig {
    /// Start velocities [m/s]
    pub velocities: Vec<f64>,
    /// Constant accelerations [m/s^2]
    pub accelerations: Vec<f64>,
    /// Constant steering angles [rad]
    pub steering_angles: Vec<f64>,
    /// Time steps per primitive
    pub duration_steps: u32,
    /// Start velocity matching tolerance [m/s]
    pub velocity_tolerance: f64,
    pub motion: MotionModelConfig,
}

impl Default for PrimitiveSetConfig {
    fn default() -> Self {
        Self {
            velocities: vec![0.0, 2.0, 4.0, 6.0, 8.0],
            accelerations: vec![-2.0, 0.0, 2.0],
            steering_angles: vec![-0.2, 0.0, 0.2],
            duration_steps: 10,
            velocity_tolerance: 1e-3,
            motion: MotionModelConfig::default(),
        }
    }
}

/// A maneuver expressed relative to the origin
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPrimitive {
    states: Vec<State>,
}

impl MotionPrimitive {
    /// States must start at the origin with heading 0 and time step 0
    pub fn new(states: Vec<State>) -> SearchResult<Self> {
        match states.first() {
            Some(first)
                if first.position.x == 0.0
                    && first.position.y == 0.0
                    && first.orientation == 0.0
                    && first.time_step == 0 =>
            {
                Ok(Self { states })
            }
            Some(_) => Err(SearchError::InvalidParameter(
                "motion primitive must start at the origin".to_string(),
            )),
            None => Err(SearchError::InvalidParameter(
                "motion primitive must contain at least one state".to_string(),
            )),
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn start_velocity(&self) -> f64 {
        self.states[0].velocity
    }

    pub fn end_velocity(&self) -> f64 {
        self.states[self.states.len() - 1].velocity
    }

    /// Attach the primitive to `at`: rotate by its heading, translate to its
    /// position and shift time steps
    pub fn apply(&self, at: &State) -> Path {
        let rotation = Rotation2::new(at.orientation);
        let offset = at.position.to_vector();
        let states = self
            .states
            .iter()
            .map(|s| {
                let p = rotation * s.position.to_vector() + offset;
                State::new(
                    p.x,
                    p.y,
                    normalize_angle(s.orientation + at.orientation),
                    s.velocity,
                    s.time_step + at.time_step,
                )
            })
            .collect();
        Path::from_states_unchecked(states)
    }
}

pub type FeasibilityFn = Box<dyn Fn(&Path) -> bool>;

/// Successor generator backed by a set of motion primitives
pub struct PrimitiveLibrary {
    primitives: Vec<MotionPrimitive>,
    velocity_tolerance: f64,
    feasibility: Option<FeasibilityFn>,
}

impl PrimitiveLibrary {
    pub fn new(primitives: Vec<MotionPrimitive>, velocity_tolerance: f64) -> Self {
        Self {
            primitives,
            velocity_tolerance,
            feasibility: None,
        }
    }

    /// Every combination of start velocity, acceleration and steering angle
    /// whose final velocity stays within the configured velocity range
    pub fn generate(config: &PrimitiveSetConfig) -> SearchResult<Self> {
        if config.duration_steps == 0 {
            return Err(SearchError::InvalidParameter(
                "primitive duration must be at least one step".to_string(),
            ));
        }
        let model = BicycleModel::new(config.motion);
        let v_min = config.velocities.iter().cloned().fold(f64::INFINITY, f64::min);
        let v_max = config.velocities.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let mut primitives = Vec::new();
        for &v in &config.velocities {
            for &a in &config.accelerations {
                for &delta in &config.steering_angles {
                    let start = State::new(0.0, 0.0, 0.0, v, 0);
                    let states = model.rollout(start, a, delta, config.duration_steps);
                    let primitive = MotionPrimitive::new(states)?;
                    let v_end = primitive.end_velocity();
                    if v_end < v_min - config.velocity_tolerance
                        || v_end > v_max + config.velocity_tolerance
                    {
                        continue;
                    }
                    primitives.push(primitive);
                }
            }
        }
        Ok(Self::new(primitives, config.velocity_tolerance))
    }

    /// Reject successor paths for which `predicate` returns false
    pub fn with_feasibility<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + 'static,
    {
        self.feasibility = Some(Box::new(predicate));
        self
    }

    pub fn primitives(&self) -> &[MotionPrimitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl SuccessorGenerator for PrimitiveLibrary {
    fn successors(&self, node: &Node) -> Vec<Path> {
        let terminal = node.terminal_state();
        self.primitives
            .iter()
            .filter(|p| (p.start_velocity() - terminal.velocity).abs() <= self.velocity_tolerance)
            .map(|p| p.apply(terminal))
            .filter(|path| self.feasibility.as_ref().map_or(true, |f| f(path)))
            .collect()
    }
}
