//! Gaussian curve fitting.
//!
//! [`GaussianFitter`] fits the four-parameter bell model to a search trace by
//! bounded nonlinear least squares and answers the derived queries the
//! orchestrator and report renderer need: prediction, peak extraction at
//! output precision, and curve generation for plotting.

mod model;
mod solver;


pub use model::ModelParameters;
pub use solver::SolveReport;

use log::{debug, info};

use crate::config::{FitConfig, ANGLE_MAX, ANGLE_MIN, ANGLE_PRECISION};
use crate::error::CalibrationError;
use crate::search::{find_peak_in_samples, Sample, Trace};

/// Fits Gaussian response curves to measurement traces
#[derive(Debug, Clone, Default)]
pub struct GaussianFitter {
    config: FitConfig,
}

impl GaussianFitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit the response model to every sample in `trace`
    ///
    /// # Arguments
    /// * `trace` - Samples from a search run; order does not matter
    ///
    /// # Returns
    /// * `Ok(ModelParameters)` - Normalized parameters (mu in [0, 360), sigma > 0)
    /// * `Err(CalibrationError)` - Insufficient data or solver failure
    ///
    /// # Errors
    /// - `InsufficientData` when the trace has fewer than `min_points` samples;
    ///   checked before the solver runs
    /// - `FitFailed` when a sample is not finite or the solver does not converge
    pub fn fit(&self, trace: &Trace) -> Result<ModelParameters, CalibrationError> {
        self.fit_with_report(trace).map(|(params, _)| params)
    }

    /// Same as [`GaussianFitter::fit`], also returning the solver report
    pub fn fit_with_report(
        &self,
        trace: &Trace,
    ) -> Result<(ModelParameters, SolveReport), CalibrationError> {
        if trace.len() < self.config.min_points {
            return Err(CalibrationError::InsufficientData {
                required: self.config.min_points,
                collected: trace.len(),
            });
        }
        if let Some(bad) = trace
            .iter()
            .find(|s| !s.angle.is_finite() || !s.reading.is_finite())
        {
            return Err(CalibrationError::FitFailed {
                reason: format!("non-finite sample ({}, {})", bad.angle, bad.reading),
            });
        }

        let initial = self.initial_guess(trace.samples());
        debug!("[GaussianFitter] Initial guess: {}", initial);

        let (params, report) = solver::solve_bounded(
            &trace.angles(),
            &trace.readings(),
            initial,
            self.config.bounds,
            self.config.max_evaluations,
        )?;
        let params = params.normalized();

        info!(
            "[GaussianFitter] Curve fitting successful after {} evaluations: {}",
            report.evaluations, params
        );
        Ok((params, report))
    }

    /// Starting point for the solver
    ///
    /// mu at the maximal reading, amplitude and baseline at the observed
    /// extremes, sigma at the configured guess.
    pub fn initial_guess(&self, samples: &[Sample]) -> ModelParameters {
        let mu = find_peak_in_samples(samples);
        let (low, high) = samples
            .iter()
            .map(|s| s.reading)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r), hi.max(r))
            });
        ModelParameters::new(mu, self.config.initial_sigma, low, high)
    }

    /// Predicted reading at `angle`
    pub fn predict(&self, angle: f64, params: &ModelParameters) -> f64 {
        params.evaluate(angle)
    }

    /// Angle of maximum response, rounded to the output precision
    ///
    /// Rounds `mu / precision` half away from zero, so 123.456 becomes 123.5
    /// and 50.04 becomes 50.0.
    pub fn find_peak(&self, params: &ModelParameters) -> f64 {
        round_to_precision(params.mu, ANGLE_PRECISION)
    }

    /// `num_points` evenly spaced angles across the domain and the model
    /// value at each, for plotting
    pub fn generate_curve(
        &self,
        params: &ModelParameters,
        num_points: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let angles = linspace(ANGLE_MIN, ANGLE_MAX, num_points);
        let values = angles.iter().map(|&a| params.evaluate(a)).collect();
        (angles, values)
    }
}

/// Round `value` to the nearest multiple of `precision`
pub fn round_to_precision(value: f64, precision: f64) -> f64 {
    (value / precision).round() * precision
}

fn linspace(start: f64, end: f64, num_points: usize) -> Vec<f64> {
    match num_points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}
