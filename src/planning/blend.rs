//! Weighted blending of metric vectors
//!
//! Raw weights are normalized with softmax into a convex combination and
//! the loss is the inner product with the metric vector. Softmax keeps the
//! weights positive and summing to one whatever the sign or scale of the
//! configured values, and sharpens the influence of the largest weight.

use log::warn;
use nalgebra::SVector;

use crate::common::{SearchError, SearchResult};
use crate::planning::metrics::{MetricVector, METRIC_COUNT};

/// One raw weight per metric axis, in axis order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector(SVector<f64, METRIC_COUNT>);

impl WeightVector {
    /// Build from a slice; the length must equal the metric count
    pub fn new(weights: &[f64]) -> SearchResult<Self> {
        if weights.len() != METRIC_COUNT {
            return Err(SearchError::WeightLength {
                expected: METRIC_COUNT,
                actual: weights.len(),
            });
        }
        Ok(Self(SVector::from_column_slice(weights)))
    }

    /// Every axis weighted alike
    pub fn even() -> Self {
        Self(SVector::from([10.0, 10.0, 10.0, 10.0, 10.0]))
    }

    pub fn position_dominant() -> Self {
        Self(SVector::from([10.0, 10.0, 10.0, 10.0, 100.0]))
    }

    pub fn time_dominant() -> Self {
        Self(SVector::from([10.0, 10.0, 10.0, 100.0, 10.0]))
    }

    pub fn time_and_position_dominant() -> Self {
        Self(SVector::from([10.0, 10.0, 10.0, 100.0, 100.0]))
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// Softmax-normalized weights
    pub fn normalized(&self) -> SVector<f64, METRIC_COUNT> {
        SVector::from_column_slice(&softmax(self.as_slice()))
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::time_and_position_dominant()
    }
}

/// Exponential normalization. The maximum is subtracted first so large
/// finite weights do not overflow; non-finite inputs yield NaN entries.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Reduces a metric vector to a scalar loss with fixed normalized weights
#[derive(Debug, Clone)]
pub struct WeightedBlender {
    weights: WeightVector,
    normalized: SVector<f64, METRIC_COUNT>,
}

impl WeightedBlender {
    pub fn new(weights: WeightVector) -> Self {
        let normalized = weights.normalized();
        Self {
            weights,
            normalized,
        }
    }

    /// Validating constructor for weights coming from configuration
    pub fn from_slice(weights: &[f64]) -> SearchResult<Self> {
        WeightVector::new(weights).map(Self::new)
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn normalized_weights(&self) -> &[f64] {
        self.normalized.as_slice()
    }

    /// Blended loss. NaN is reported as `+inf` so it never reaches the
    /// open list, where it would break the ordering.
    pub fn loss(&self, metrics: &MetricVector) -> f64 {
        let ret = self.normalized.dot(metrics.as_vector());
        if ret.is_nan() {
            warn!(
                "[Heuristic] NaN loss for weights {:?}, using +inf",
                self.weights.as_slice()
            );
            return f64::INFINITY;
        }
        ret
    }
}

/// One-off blend of plain slices, for diagnostics. Both slices must hold
/// one value per metric axis.
pub fn loss(metrics: &[f64], weights: &[f64]) -> SearchResult<f64> {
    for &len in &[weights.len(), metrics.len()] {
        if len != METRIC_COUNT {
            return Err(SearchError::WeightLength {
                expected: METRIC_COUNT,
                actual: len,
            });
        }
    }
    let ret: f64 = softmax(weights)
        .iter()
        .zip(metrics)
        .map(|(w, m)| w * m)
        .sum();
    if ret.is_nan() {
        return Ok(f64::INFINITY);
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::State;
    use crate::planning::goal::GoalSpecification;
    use crate::planning::metrics::MetricEvaluator;
    use crate::planning::node::Node;
    use rand::Rng;
    use rand_distr::{Distribution, Normal};

    fn sentinel_metrics() -> MetricVector {
        let node = Node::root(State::new(0.0, 0.0, 0.0, 1.0, 0));
        MetricEvaluator::default().compute(&node, &GoalSpecification::unconstrained())
    }

    #[test]
    fn test_softmax_of_equal_weights_is_uniform() {
        let blender = WeightedBlender::new(WeightVector::even());
        for w in blender.normalized_weights() {
            assert!((w - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_random_weights_normalize_to_convex_combination() {
        let mut rng = rand::thread_rng();
        let normal = Normal::new(0.0, 50.0).unwrap();
        for _ in 0..200 {
            let raw: Vec<f64> = (0..METRIC_COUNT).map(|_| normal.sample(&mut rng)).collect();
            let blender = WeightedBlender::from_slice(&raw).unwrap();
            let normalized = blender.normalized_weights();
            assert!(normalized.iter().all(|&w| w >= 0.0 && w <= 1.0));
            let sum: f64 = normalized.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum {} for {:?}", sum, raw);
        }
    }

    #[test]
    fn test_moderate_weights_are_strictly_positive() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let raw: Vec<f64> = (0..METRIC_COUNT).map(|_| rng.gen_range(-100.0..100.0)).collect();
            let normalized = WeightVector::new(&raw).unwrap().normalized();
            assert!(normalized.iter().all(|&w| w > 0.0));
            assert!((normalized.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_off_loss_rejects_equal_non_metric_lengths() {
        for len in (0..=8).filter(|&n| n != METRIC_COUNT) {
            let values = vec![1.0; len];
            match loss(&values, &values) {
                Err(SearchError::WeightLength { expected, actual }) => {
                    assert_eq!(expected, METRIC_COUNT);
                    assert_eq!(actual, len);
                }
                other => panic!("expected length error, got {:?}", other),
            }
        }
        assert!(loss(&[1.0; METRIC_COUNT], &[1.0; 3]).is_err());
        assert!(loss(&[1.0; 3], &[1.0; METRIC_COUNT]).is_err());
    }

    #[test]
    fn test_largest_weight_dominates() {
        let normalized = WeightVector::time_dominant().normalized();
        assert!(normalized[3] > 0.99);
    }

    #[test]
    fn test_mismatched_lengths_always_fail() {
        let metrics = [1.0; METRIC_COUNT];
        for len in (0..=12).filter(|&n| n != METRIC_COUNT) {
            let weights = vec![1.0; len];
            match WeightVector::new(&weights) {
                Err(SearchError::WeightLength { expected, actual }) => {
                    assert_eq!(expected, METRIC_COUNT);
                    assert_eq!(actual, len);
                }
                other => panic!("expected length error, got {:?}", other),
            }
            assert!(matches!(
                loss(&metrics, &weights),
                Err(SearchError::WeightLength { .. })
            ));
        }
    }

    #[test]
    fn test_loss_is_weighted_mean_for_even_weights() {
        let metrics = sentinel_metrics();
        let blender = WeightedBlender::new(WeightVector::even());
        let expected = 0.2 * metrics.as_slice().iter().sum::<f64>();
        assert!((blender.loss(&metrics) - expected).abs() < 1e-6);
        let one_off = loss(metrics.as_slice(), WeightVector::even().as_slice()).unwrap();
        assert!((one_off - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nan_loss_becomes_infinity() {
        let metrics = sentinel_metrics();
        let blender =
            WeightedBlender::from_slice(&[f64::INFINITY, f64::INFINITY, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(blender.loss(&metrics), f64::INFINITY);
        assert_eq!(
            loss(&[1.0, 2.0, 3.0, 4.0, 5.0], &[f64::NAN, 0.0, 0.0, 0.0, 0.0]).unwrap(),
            f64::INFINITY
        );
    }

    #[test]
    fn test_large_finite_weights_stay_finite() {
        let metrics = sentinel_metrics();
        let blender = WeightedBlender::from_slice(&[1e4, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let value = blender.loss(&metrics);
        assert!(value.is_finite());
        assert!((value - metrics.as_slice()[0]).abs() < 1e-6);
    }
}
