//! Configuration management for calibration runs
//!
//! This module provides runtime configuration loading from JSON files so the
//! search schedule, fit settings, validation thresholds and report layout can
//! be tuned without recompilation. The angle domain and output precision are
//! contractual constants and are deliberately not part of the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CalibrationError;
use crate::search::SearchStrategyKind;

/// Lower bound of the angle domain (degrees)
pub const ANGLE_MIN: f64 = 0.0;

/// Upper bound of the angle domain (degrees)
pub const ANGLE_MAX: f64 = 360.0;

/// Full period of the angle domain
pub const ANGLE_PERIOD: f64 = ANGLE_MAX - ANGLE_MIN;

/// Precision of the reported optimal angle (tenths of a degree)
pub const ANGLE_PRECISION: f64 = 0.1;

/// Midpoint of the angle domain, used when a scan phase yields no samples
pub const ANGLE_MIDPOINT: f64 = (ANGLE_MIN + ANGLE_MAX) / 2.0;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub search: SearchConfig,
    pub fitting: FitConfig,
    pub validation: ValidationConfig,
    pub report: ReportConfig,
}

/// Measurement server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the measurement server
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Scan schedule for the search strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Strategy used to collect the trace
    pub strategy: SearchStrategyKind,
    /// Step of the full-domain wide scan (degrees)
    pub coarse_step: f64,
    /// Width of the medium scan window centered on the wide-scan peak
    pub medium_window: f64,
    pub medium_step: f64,
    /// Width of the narrow scan window centered on the medium-scan peak
    pub fine_window: f64,
    pub fine_step: f64,
    /// Width of the refinement window centered on the narrow-scan peak
    pub refinement_window: f64,
    /// Refinement step, equal to the output precision by default
    pub refinement_step: f64,
    /// Step of the single-pass uniform scan
    pub uniform_step: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategyKind::CoarseToFine,
            coarse_step: 20.0,
            medium_window: 30.0,
            medium_step: 4.0,
            fine_window: 10.0,
            fine_step: 1.0,
            refinement_window: 2.0,
            refinement_step: ANGLE_PRECISION,
            uniform_step: 1.0,
        }
    }
}

/// Inclusive box constraints applied to the model parameters during a fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub mu: (f64, f64),
    pub sigma: (f64, f64),
    pub baseline: (f64, f64),
    pub amplitude: (f64, f64),
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            mu: (ANGLE_MIN, ANGLE_MAX),
            // Width must stay strictly positive; 1 degree keeps the Jacobian well scaled
            sigma: (1.0, 50.0),
            baseline: (0.0, 50.0),
            amplitude: (0.0, 110.0),
        }
    }
}

impl ParameterBounds {
    fn ranges(&self) -> [(&'static str, (f64, f64)); 4] {
        [
            ("mu", self.mu),
            ("sigma", self.sigma),
            ("baseline", self.baseline),
            ("amplitude", self.amplitude),
        ]
    }
}

/// Curve fitting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Minimum number of samples required before the solver is invoked
    pub min_points: usize,
    /// Initial guess for the Gaussian width (degrees)
    pub initial_sigma: f64,
    /// Upper limit on solver evaluations (scaled by parameter count)
    pub max_evaluations: usize,
    pub bounds: ParameterBounds,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            initial_sigma: 15.0,
            max_evaluations: 10_000,
            bounds: ParameterBounds::default(),
        }
    }
}

/// Thresholds for the post-run reliability checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum acceptable gap between measured and predicted reading
    pub tolerance: f64,
    /// Minimum confirmatory reading considered a usable signal
    pub min_signal: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            min_signal: 50.0,
        }
    }
}

/// Output settings for the JSON report and plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: String,
    pub file_base_name: String,
    pub plot_width: u32,
    pub plot_height: u32,
    /// Number of points used to draw the fitted curve
    pub curve_points: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "results".to_string(),
            file_base_name: "calibration_results".to_string(),
            plot_width: 1000,
            plot_height: 600,
            curve_points: 1000,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration. If the file doesn't exist or the JSON is
    /// invalid, the default configuration is returned and a warning is logged.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check that the configuration describes a runnable calibration
    ///
    /// # Errors
    /// * `CalibrationError::InvalidConfig` - non-positive step or window,
    ///   too few fit points, or an inverted parameter bound
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let search = &self.search;
        let positive = [
            ("coarse_step", search.coarse_step),
            ("medium_window", search.medium_window),
            ("medium_step", search.medium_step),
            ("fine_window", search.fine_window),
            ("fine_step", search.fine_step),
            ("refinement_window", search.refinement_window),
            ("refinement_step", search.refinement_step),
            ("uniform_step", search.uniform_step),
            ("initial_sigma", self.fitting.initial_sigma),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalibrationError::InvalidConfig {
                    reason: format!("{} must be positive (got {})", name, value),
                });
            }
        }

        // Four free parameters need at least as many observations
        if self.fitting.min_points < 4 {
            return Err(CalibrationError::InvalidConfig {
                reason: format!(
                    "min_points must be at least 4 (got {})",
                    self.fitting.min_points
                ),
            });
        }

        if self.fitting.max_evaluations == 0 {
            return Err(CalibrationError::InvalidConfig {
                reason: "max_evaluations must be at least 1".to_string(),
            });
        }

        for (name, (lo, hi)) in self.fitting.bounds.ranges() {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(CalibrationError::InvalidConfig {
                    reason: format!("{} bounds are inverted: [{}, {}]", name, lo, hi),
                });
            }
        }
        if self.fitting.bounds.sigma.0 <= 0.0 {
            return Err(CalibrationError::InvalidConfig {
                reason: "sigma lower bound must be positive".to_string(),
            });
        }

        Ok(())
    }
}
