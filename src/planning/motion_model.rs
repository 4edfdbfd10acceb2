//! Kinematic bicycle model used to roll out motion primitives

use serde::{Deserialize, Serialize};

use crate::common::{normalize_angle, State};

/// Motion model configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionModelConfig {
    /// Wheelbase length [m]
    pub wheelbase: f64,
    /// Duration of one time step [s]
    pub dt: f64,
}

impl Default for MotionModelConfig {
    fn default() -> Self {
        Self {
            wheelbase: 2.5,
            dt: 0.1,
        }
    }
}

/// Bicycle kinematic motion model
#[derive(Debug, Clone)]
pub struct BicycleModel {
    config: MotionModelConfig,
}

impl BicycleModel {
    pub fn new(config: MotionModelConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MotionModelConfig::default())
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// Advance one time step
    ///
    /// # Arguments
    /// * `state` - Current state
    /// * `acceleration` - Longitudinal acceleration [m/s^2]
    /// * `delta` - Steering angle [rad]
    pub fn step(&self, state: &State, acceleration: f64, delta: f64) -> State {
        let dt = self.config.dt;
        let v = state.velocity;
        let (sin, cos) = state.orientation.sin_cos();

        State::new(
            state.position.x + v * cos * dt,
            state.position.y + v * sin * dt,
            normalize_angle(state.orientation + v / self.config.wheelbase * delta.tan() * dt),
            v + acceleration * dt,
            state.time_step + 1,
        )
    }

    /// Roll out `steps` time steps with constant inputs, start state included
    pub fn rollout(&self, start: State, acceleration: f64, delta: f64, steps: u32) -> Vec<State> {
        let mut states = Vec::with_capacity(steps as usize + 1);
        states.push(start);
        let mut state = start;
        for _ in 0..steps {
            state = self.step(&state, acceleration, delta);
            states.push(state);
        }
        states
    }
}
