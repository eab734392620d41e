// Calibration error types and constants

use crate::error::{ErrorCode, MeasurementError};
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Error code range: 2001-2005
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Measurement server reported down or unreachable
    pub const DEVICE_UNAVAILABLE: i32 = 2001;

    /// Too few samples to fit the response model
    pub const INSUFFICIENT_DATA: i32 = 2002;

    /// Numerical solver failed to produce a model
    pub const FIT_FAILED: i32 = 2003;

    /// Fatal measurement failure outside the search phases
    pub const MEASUREMENT: i32 = 2004;

    /// Configuration cannot describe a runnable calibration
    pub const INVALID_CONFIG: i32 = 2005;
}

/// Log a calibration error with structured context
///
/// This function logs calibration errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=CalibrationEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// Every variant is fatal for the run that raised it. Non-fatal conditions
/// are reported through `ValidationReport` instead.
///
/// Error code ranges: 2001-2005
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Connectivity check failed
    DeviceUnavailable,

    /// Trace too short to fit four parameters
    InsufficientData { required: usize, collected: usize },

    /// Solver non-convergence or numerical breakdown
    FitFailed { reason: String },

    /// Confirmatory measurement failed
    Measurement(MeasurementError),

    /// Configuration rejected before the run started
    InvalidConfig { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::DeviceUnavailable => CalibrationErrorCodes::DEVICE_UNAVAILABLE,
            CalibrationError::InsufficientData { .. } => CalibrationErrorCodes::INSUFFICIENT_DATA,
            CalibrationError::FitFailed { .. } => CalibrationErrorCodes::FIT_FAILED,
            CalibrationError::Measurement(_) => CalibrationErrorCodes::MEASUREMENT,
            CalibrationError::InvalidConfig { .. } => CalibrationErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::DeviceUnavailable => {
                "Measurement server is not responding".to_string()
            }
            CalibrationError::InsufficientData {
                required,
                collected,
            } => {
                format!(
                    "Insufficient data points for fitting: need {}, got {}",
                    required, collected
                )
            }
            CalibrationError::FitFailed { reason } => {
                format!("Curve fitting failed: {}", reason)
            }
            CalibrationError::Measurement(err) => {
                format!("Measurement failed: {}", err.message())
            }
            CalibrationError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalibrationError::Measurement(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MeasurementError> for CalibrationError {
    fn from(err: MeasurementError) -> Self {
        CalibrationError::Measurement(err)
    }
}
