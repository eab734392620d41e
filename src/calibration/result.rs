// CalibrationResult - everything a completed run produced
//
// The result is immutable once the engine hands it out; the report writers
// only read from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::ValidationReport;
use crate::fitting::ModelParameters;
use crate::search::{SearchDiagnostics, Trace};

/// Outcome of one calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Fitted peak rounded to the output precision (degrees)
    pub optimal_angle: f64,
    /// Confirmatory reading taken at `optimal_angle`
    pub measured_voltage: f64,
    /// Model prediction at `optimal_angle`
    pub expected_voltage: f64,
    /// Successful measurements during the run, confirmatory one included
    pub total_measurements: usize,
    pub trace: Trace,
    pub fitted_params: ModelParameters,
    /// Name of the search strategy that produced `trace`
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<SearchDiagnostics>,
    pub validation: ValidationReport,
}

impl CalibrationResult {
    /// Whether every reliability check passed
    pub fn is_reliable(&self) -> bool {
        self.validation.reliable
    }

    /// Absolute gap between confirmatory reading and prediction
    pub fn voltage_difference(&self) -> f64 {
        (self.measured_voltage - self.expected_voltage).abs()
    }
}

impl fmt::Display for CalibrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Calibration Results:")?;
        writeln!(f, "  Optimal Angle: {:.1}°", self.optimal_angle)?;
        writeln!(f, "  Measured Voltage: {:.2}", self.measured_voltage)?;
        writeln!(f, "  Expected Voltage: {:.2}", self.expected_voltage)?;
        writeln!(f, "  Total Measurements: {}", self.total_measurements)?;
        write!(f, "  Fitted Parameters: {}", self.fitted_params)
    }
}
