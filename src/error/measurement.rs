// Measurement error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Measurement error code constants
///
/// Error code range: 1001-1003
pub struct MeasurementErrorCodes {}

impl MeasurementErrorCodes {
    /// Requested angle lies outside the [0, 360] domain
    pub const INVALID_ANGLE: i32 = 1001;

    /// Network or HTTP failure talking to the measurement server
    pub const TRANSPORT: i32 = 1002;

    /// Server answered with a body that is not a reading
    pub const INVALID_RESPONSE: i32 = 1003;
}

/// Log a measurement error with structured context
///
/// This function logs measurement errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_measurement_error(err: &MeasurementError, context: &str) {
    error!(
        "Measurement error in {}: code={}, component=MeasurementInterface, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Measurement-related errors
///
/// These errors cover single angle-measurement requests. A domain error is
/// raised before any network activity; transport and response errors come
/// from the server round trip.
///
/// Error code ranges: 1001-1003
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// Angle outside the [0, 360] degree domain
    InvalidAngle { angle: f64 },

    /// Network/HTTP failure
    Transport { reason: String },

    /// Response body could not be decoded
    InvalidResponse { reason: String },
}

impl ErrorCode for MeasurementError {
    fn code(&self) -> i32 {
        match self {
            MeasurementError::InvalidAngle { .. } => MeasurementErrorCodes::INVALID_ANGLE,
            MeasurementError::Transport { .. } => MeasurementErrorCodes::TRANSPORT,
            MeasurementError::InvalidResponse { .. } => MeasurementErrorCodes::INVALID_RESPONSE,
        }
    }

    fn message(&self) -> String {
        match self {
            MeasurementError::InvalidAngle { angle } => {
                format!(
                    "Angle must be between 0 and 360 degrees (got {})",
                    angle
                )
            }
            MeasurementError::Transport { reason } => {
                format!("Measurement request failed: {}", reason)
            }
            MeasurementError::InvalidResponse { reason } => {
                format!("Invalid measurement response: {}", reason)
            }
        }
    }
}

impl fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MeasurementError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for MeasurementError {}
