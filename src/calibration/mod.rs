// Calibration module - orchestrates one end-to-end calibration run
//
// This module provides three components:
// 1. CalibrationEngine: Drives the staged run against a measurement interface
// 2. CalibrationResult: Immutable record of what the run produced
// 3. ResultValidator: Non-fatal reliability checks on the confirmatory sample
//
// The calibration workflow:
// 1. Check connectivity and reset the measurement counter
// 2. Search for the peak, fit the response model to the trace
// 3. Measure once more at the fitted peak and validate against the model

pub mod engine;
pub mod result;
pub mod validation;

#[cfg(test)]
mod engine_tests;

pub use engine::{CalibrationEngine, CalibrationStage};
pub use result::CalibrationResult;
pub use validation::{ResultValidator, ValidationReport, ValidationWarning};
