// Bell-shaped response model
//
//   f(x) = baseline + (amplitude - baseline) * exp(-(x - mu)^2 / (2 sigma^2))
//
// `amplitude` is the value at the peak, not the height above baseline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ANGLE_PERIOD;

/// Fitted response-curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Center of the peak (degrees)
    pub mu: f64,
    /// Width of the peak (degrees)
    pub sigma: f64,
    /// Reading far from the peak
    pub baseline: f64,
    /// Reading at the peak
    pub amplitude: f64,
}

impl ModelParameters {
    pub fn new(mu: f64, sigma: f64, baseline: f64, amplitude: f64) -> Self {
        Self {
            mu,
            sigma,
            baseline,
            amplitude,
        }
    }

    /// Reduce `mu` into [0, 360) and make `sigma` positive
    pub fn normalized(self) -> Self {
        Self {
            mu: self.mu.rem_euclid(ANGLE_PERIOD),
            sigma: self.sigma.abs(),
            ..self
        }
    }

    /// Evaluate the model at `angle`
    pub fn evaluate(&self, angle: f64) -> f64 {
        let (_, weight) = self.offset_and_weight(angle);
        self.baseline + (self.amplitude - self.baseline) * weight
    }

    /// Partial derivatives of the model at `angle` in
    /// (mu, sigma, baseline, amplitude) order
    pub fn gradient(&self, angle: f64) -> [f64; 4] {
        let (dx, weight) = self.offset_and_weight(angle);
        let height = self.amplitude - self.baseline;
        let sigma2 = self.sigma * self.sigma;
        [
            height * weight * dx / sigma2,
            height * weight * dx * dx / (sigma2 * self.sigma),
            1.0 - weight,
            weight,
        ]
    }

    pub fn all_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Parameters in (mu, sigma, baseline, amplitude) order
    pub fn to_array(&self) -> [f64; 4] {
        [self.mu, self.sigma, self.baseline, self.amplitude]
    }

    pub fn from_array([mu, sigma, baseline, amplitude]: [f64; 4]) -> Self {
        Self::new(mu, sigma, baseline, amplitude)
    }

    fn offset_and_weight(&self, angle: f64) -> (f64, f64) {
        let dx = angle - self.mu;
        (dx, (-(dx * dx) / (2.0 * self.sigma * self.sigma)).exp())
    }
}

impl fmt::Display for ModelParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModelParameters(mu={:.2}, sigma={:.2}, baseline={:.2}, amplitude={:.2})",
            self.mu, self.sigma, self.baseline, self.amplitude
        )
    }
}
