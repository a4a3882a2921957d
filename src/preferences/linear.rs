//! Linear utility over numeric outcomes.

use serde::{Deserialize, Serialize};

use super::ufun::UtilityFunction;
use crate::outcomes::Outcome;

/// A weighted sum over the numeric values of an outcome, plus a bias.
///
/// Non-numeric values contribute nothing; issues beyond the weight list are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearUtilityFunction {
    weights: Vec<f64>,
    bias: f64,
    reserved: Option<f64>,
}

impl LinearUtilityFunction {
    /// Creates a linear utility with the given per-issue weights.
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            bias: 0.0,
            reserved: None,
        }
    }

    /// Sets the additive bias.
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Sets the reservation value.
    pub fn with_reserved_value(mut self, reserved: f64) -> Self {
        self.reserved = Some(reserved);
        self
    }

    /// The per-issue weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl UtilityFunction for LinearUtilityFunction {
    fn evaluate(&self, outcome: &Outcome) -> f64 {
        self.weights
            .iter()
            .zip(outcome.iter())
            .map(|(w, v)| w * v.as_real().unwrap_or(0.0))
            .sum::<f64>()
            + self.bias
    }

    fn reserved_value(&self) -> Option<f64> {
        self.reserved
    }

    fn shift_by(&mut self, offset: f64) {
        self.bias += offset;
        if let Some(r) = self.reserved.as_mut() {
            *r += offset;
        }
    }

    fn scale_by(&mut self, factor: f64) {
        for w in &mut self.weights {
            *w *= factor;
        }
        self.bias *= factor;
        if let Some(r) = self.reserved.as_mut() {
            *r *= factor;
        }
    }
}
