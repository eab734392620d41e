// Error types for the angle calibrator
//
// This module defines custom error types for measurement, calibration and
// report output, providing structured error handling with stable numeric codes
// that the CLI and JSON reports can surface.

mod calibration;
mod measurement;
mod report;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use measurement::{log_measurement_error, MeasurementError, MeasurementErrorCodes};
pub use report::{ReportError, ReportErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library and the command line front end.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
