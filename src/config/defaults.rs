//! Default value functions for serde deserialization.

use crate::planning::metrics::{DEFAULT_SENTINEL, DEFAULT_VELOCITY_EPSILON};

pub fn weights() -> Vec<f64> {
    vec![10.0, 10.0, 10.0, 100.0, 100.0]
}

pub fn sentinel() -> f64 {
    DEFAULT_SENTINEL
}

pub fn velocity_epsilon() -> f64 {
    DEFAULT_VELOCITY_EPSILON
}
