//! Common types used throughout primitive_search

use std::f64::consts::PI;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::common::error::{SearchError, SearchResult};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Bearing from this point towards `other` [rad]
    pub fn bearing_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Kinematic state of the vehicle at one discrete time step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub position: Point2D,
    /// Heading [rad]
    pub orientation: f64,
    /// Longitudinal velocity [m/s]
    pub velocity: f64,
    pub time_step: u32,
}

impl State {
    pub fn new(x: f64, y: f64, orientation: f64, velocity: f64, time_step: u32) -> Self {
        Self {
            position: Point2D::new(x, y),
            orientation,
            velocity,
            time_step,
        }
    }
}

/// One applied motion primitive: a non-empty, time-ordered run of states.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    states: Vec<State>,
}

impl Path {
    pub fn new(states: Vec<State>) -> SearchResult<Self> {
        if states.is_empty() {
            return Err(SearchError::InvalidParameter(
                "path must contain at least one state".to_string(),
            ));
        }
        Ok(Self { states })
    }

    /// Caller guarantees `states` is non-empty
    pub(crate) fn from_states_unchecked(states: Vec<State>) -> Self {
        debug_assert!(!states.is_empty());
        Self { states }
    }

    /// A single-state path, used as the root of a search tree
    pub fn from_state(state: State) -> Self {
        Self { states: vec![state] }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn first(&self) -> &State {
        &self.states[0]
    }

    pub fn last(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Duration of the primitive in time steps
    pub fn time_cost(&self) -> f64 {
        f64::from(self.last().time_step) - f64::from(self.first().time_step)
    }

    /// Copy of this path ending at state `index` (inclusive)
    pub fn truncated(&self, index: usize) -> Path {
        let end = index.min(self.states.len() - 1);
        Path {
            states: self.states[..=end].to_vec(),
        }
    }
}

/// Normalize angle to (-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Signed difference `target - current`, wrapped to (-PI, PI]
pub fn angle_difference(target: f64, current: f64) -> f64 {
    normalize_angle(target - current)
}
