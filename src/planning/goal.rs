//! Goal specification
//!
//! Optional interval constraints on position, orientation, velocity and
//! time step. An absent field places no constraint on that axis.

use std::cmp::Ordering;
use std::convert::TryFrom;

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::{normalize_angle, GoalChecker, Point2D, SearchError, SearchResult, State};

/// Closed interval `[start, end]`
///
/// Deserialization goes through [`Interval::new`], so inverted bounds are
/// rejected when a goal is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

#[derive(Deserialize)]
struct IntervalBounds<T> {
    start: T,
    end: T,
}

impl<'de, T> Deserialize<'de> for Interval<T>
where
    T: Deserialize<'de> + PartialOrd + Copy,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bounds = IntervalBounds::<T>::deserialize(deserializer)?;
        Interval::new(bounds.start, bounds.end).map_err(serde::de::Error::custom)
    }
}

impl<T: PartialOrd + Copy> Interval<T> {
    /// Fails when `start > end` or the bounds are unordered (NaN)
    pub fn new(start: T, end: T) -> SearchResult<Self> {
        match start.partial_cmp(&end) {
            Some(Ordering::Less) | Some(Ordering::Equal) => Ok(Self { start, end }),
            _ => Err(SearchError::InvalidParameter(
                "interval start must not exceed its end".to_string(),
            )),
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }
}

impl Interval<f64> {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Position target shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case", try_from = "RegionShape")]
pub enum GoalRegion {
    Circle {
        center: Point2D,
        radius: f64,
    },
    /// Oriented rectangle; `length` runs along `orientation`
    Rectangle {
        center: Point2D,
        length: f64,
        width: f64,
        orientation: f64,
    },
}

/// Unchecked mirror of `GoalRegion` read from configuration files
#[derive(Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
enum RegionShape {
    Circle {
        center: Point2D,
        radius: f64,
    },
    Rectangle {
        center: Point2D,
        length: f64,
        width: f64,
        orientation: f64,
    },
}

impl TryFrom<RegionShape> for GoalRegion {
    type Error = SearchError;

    fn try_from(shape: RegionShape) -> SearchResult<Self> {
        let region = match shape {
            RegionShape::Circle { center, radius } => GoalRegion::Circle { center, radius },
            RegionShape::Rectangle {
                center,
                length,
                width,
                orientation,
            } => GoalRegion::Rectangle {
                center,
                length,
                width,
                orientation,
            },
        };
        region.validate()?;
        Ok(region)
    }
}

fn check_extent(name: &str, value: f64) -> SearchResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SearchError::InvalidParameter(format!(
            "goal region {} must be finite and non-negative, got {}",
            name, value
        )))
    }
}

impl GoalRegion {
    /// Region extents must be finite and non-negative
    pub fn validate(&self) -> SearchResult<()> {
        match *self {
            GoalRegion::Circle { radius, .. } => check_extent("radius", radius),
            GoalRegion::Rectangle { length, width, .. } => {
                check_extent("length", length)?;
                check_extent("width", width)
            }
        }
    }

    /// Representative point used for distance and bearing metrics
    pub fn center(&self) -> Point2D {
        match *self {
            GoalRegion::Circle { center, .. } => center,
            GoalRegion::Rectangle { center, .. } => center,
        }
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        match *self {
            GoalRegion::Circle { center, radius } => center.distance(point) <= radius,
            GoalRegion::Rectangle {
                center,
                length,
                width,
                orientation,
            } => {
                let d = point.to_vector() - center.to_vector();
                let (sin, cos) = orientation.sin_cos();
                let along = d.x * cos + d.y * sin;
                let across = -d.x * sin + d.y * cos;
                along.abs() <= length / 2.0 && across.abs() <= width / 2.0
            }
        }
    }
}

/// Desired terminal conditions of the planning problem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSpecification {
    #[serde(default)]
    pub position: Option<GoalRegion>,
    /// Desired heading interval [rad]
    #[serde(default)]
    pub orientation: Option<Interval<f64>>,
    #[serde(default)]
    pub velocity: Option<Interval<f64>>,
    #[serde(default)]
    pub time_step: Option<Interval<u32>>,
}

impl GoalSpecification {
    /// Goal with no constraint on any axis
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, region: GoalRegion) -> Self {
        self.position = Some(region);
        self
    }

    pub fn with_orientation(mut self, interval: Interval<f64>) -> Self {
        self.orientation = Some(interval);
        self
    }

    pub fn with_velocity(mut self, interval: Interval<f64>) -> Self {
        self.velocity = Some(interval);
        self
    }

    pub fn with_time_step(mut self, interval: Interval<u32>) -> Self {
        self.time_step = Some(interval);
        self
    }

    /// Re-check constraints that public fields let callers bypass
    pub fn validate(&self) -> SearchResult<()> {
        if let Some(region) = &self.position {
            region.validate()?;
        }
        if let Some(i) = &self.orientation {
            Interval::new(i.start, i.end)?;
        }
        if let Some(i) = &self.velocity {
            Interval::new(i.start, i.end)?;
        }
        if let Some(i) = &self.time_step {
            Interval::new(i.start, i.end)?;
        }
        Ok(())
    }

    /// Representative goal point, if a position target is configured
    pub fn target_point(&self) -> Option<Point2D> {
        self.position.as_ref().map(GoalRegion::center)
    }

    fn orientation_ok(interval: &Interval<f64>, orientation: f64) -> bool {
        // Compare on the circle: offset from the interval start, wrapped forward.
        let span = interval.end - interval.start;
        if span >= 2.0 * std::f64::consts::PI {
            return true;
        }
        let mut offset = normalize_angle(orientation - interval.start);
        if offset < 0.0 {
            offset += 2.0 * std::f64::consts::PI;
        }
        offset <= span
    }
}

impl GoalChecker for GoalSpecification {
    fn is_reached(&self, state: &State) -> bool {
        if let Some(region) = &self.position {
            if !region.contains(&state.position) {
                return false;
            }
        }
        if let Some(interval) = &self.orientation {
            if !Self::orientation_ok(interval, state.orientation) {
                return false;
            }
        }
        if let Some(interval) = &self.velocity {
            if !interval.contains(state.velocity) {
                return false;
            }
        }
        if let Some(interval) = &self.time_step {
            if !interval.contains(state.time_step) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_interval() {
        let i = Interval::new(2.0, 4.0).unwrap();
        assert!(i.contains(2.0));
        assert!(i.contains(4.0));
        assert!(!i.contains(4.1));
        assert_eq!(i.midpoint(), 3.0);
        assert!(Interval::new(5u32, 1u32).is_err());
    }

    #[test]
    fn test_circle_region() {
        let region = GoalRegion::Circle {
            center: Point2D::new(10.0, 0.0),
            radius: 1.0,
        };
        assert!(region.contains(&Point2D::new(10.5, 0.5)));
        assert!(!region.contains(&Point2D::new(8.0, 0.0)));
        assert_eq!(region.center(), Point2D::new(10.0, 0.0));
    }

    #[test]
    fn test_rotated_rectangle_region() {
        let region = GoalRegion::Rectangle {
            center: Point2D::new(0.0, 0.0),
            length: 4.0,
            width: 1.0,
            orientation: PI / 2.0,
        };
        // Long axis now points along y
        assert!(region.contains(&Point2D::new(0.0, 1.9)));
        assert!(!region.contains(&Point2D::new(1.9, 0.0)));
    }

    #[test]
    fn test_unconstrained_goal_accepts_everything() {
        let goal = GoalSpecification::unconstrained();
        assert!(goal.is_reached(&State::new(-3.0, 7.0, 2.0, 0.0, 99)));
        assert!(goal.target_point().is_none());
    }

    #[test]
    fn test_all_constraints_must_hold() {
        let goal = GoalSpecification::unconstrained()
            .with_position(GoalRegion::Circle {
                center: Point2D::new(10.0, 0.0),
                radius: 2.0,
            })
            .with_velocity(Interval::new(4.0, 6.0).unwrap())
            .with_time_step(Interval::new(5, 10).unwrap());

        assert!(goal.is_reached(&State::new(10.0, 0.0, 0.0, 5.0, 7)));
        assert!(!goal.is_reached(&State::new(10.0, 0.0, 0.0, 7.0, 7)));
        assert!(!goal.is_reached(&State::new(10.0, 0.0, 0.0, 5.0, 11)));
        assert!(!goal.is_reached(&State::new(0.0, 0.0, 0.0, 5.0, 7)));
    }

    #[test]
    fn test_orientation_interval_wraps() {
        let goal = GoalSpecification::unconstrained()
            .with_orientation(Interval::new(PI - 0.2, PI + 0.2).unwrap());
        assert!(goal.is_reached(&State::new(0.0, 0.0, -PI + 0.1, 0.0, 0)));
        assert!(goal.is_reached(&State::new(0.0, 0.0, PI - 0.1, 0.0, 0)));
        assert!(!goal.is_reached(&State::new(0.0, 0.0, 0.0, 0.0, 0)));
    }

    #[test]
    fn test_goal_from_yaml() {
        let yaml = r#"
position:
  shape: circle
  center: { x: 10.0, y: 0.0 }
  radius: 1.5
velocity: { start: 0.0, end: 2.0 }
"#;
        let goal: GoalSpecification = serde_yaml::from_str(yaml).unwrap();
        assert!(goal.time_step.is_none());
        assert_eq!(goal.target_point(), Some(Point2D::new(10.0, 0.0)));
        assert_eq!(goal.velocity.unwrap().midpoint(), 1.0);
    }

    #[test]
    fn test_inverted_interval_from_yaml_is_rejected() {
        let yaml = "velocity: { start: 5.0, end: 1.0 }\n";
        assert!(serde_yaml::from_str::<GoalSpecification>(yaml).is_err());

        let yaml = "time_step: { start: 8, end: 3 }\n";
        assert!(serde_yaml::from_str::<GoalSpecification>(yaml).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_negative_region_extent_from_yaml_is_rejected() {
        let circle = r#"
position:
  shape: circle
  center: { x: 0.0, y: 0.0 }
  radius: -1.0
"#;
        assert!(serde_yaml::from_str::<GoalSpecification>(circle).is_err());

        let rectangle = r#"
position:
  shape: rectangle
  center: { x: 0.0, y: 0.0 }
  length: 2.0
  width: -0.5
  orientation: 0.0
"#;
        assert!(serde_yaml::from_str::<GoalSpecification>(rectangle).is_err());
    }

    #[test]
    fn test_validate_catches_fields_set_directly() {
        let mut goal = GoalSpecification::unconstrained().with_position(GoalRegion::Circle {
            center: Point2D::new(1.0, 1.0),
            radius: 1.0,
        });
        assert!(goal.validate().is_ok());

        goal.velocity = Some(Interval {
            start: 3.0,
            end: 1.0,
        });
        assert!(matches!(goal.validate(), Err(SearchError::InvalidParameter(_))));

        let goal = GoalSpecification::unconstrained().with_position(GoalRegion::Circle {
            center: Point2D::new(1.0, 1.0),
            radius: f64::NAN,
        });
        assert!(goal.validate().is_err());
    }
}
