// Report output error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Report error code constants
///
/// Error code range: 3001-3003
pub struct ReportErrorCodes {}

impl ReportErrorCodes {
    /// Output directory or file could not be written
    pub const IO: i32 = 3001;

    /// Result could not be serialized
    pub const SERIALIZATION: i32 = 3002;

    /// Plot backend failed
    pub const RENDER: i32 = 3003;
}

/// Errors raised while persisting a calibration result
///
/// Reports are written after the run has completed, so none of these
/// affect the calibration itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    Io { path: String, reason: String },
    Serialization { reason: String },
    Render { reason: String },
}

impl ErrorCode for ReportError {
    fn code(&self) -> i32 {
        match self {
            ReportError::Io { .. } => ReportErrorCodes::IO,
            ReportError::Serialization { .. } => ReportErrorCodes::SERIALIZATION,
            ReportError::Render { .. } => ReportErrorCodes::RENDER,
        }
    }

    fn message(&self) -> String {
        match self {
            ReportError::Io { path, reason } => format!("Failed to write {}: {}", path, reason),
            ReportError::Serialization { reason } => {
                format!("Failed to serialize result: {}", reason)
            }
            ReportError::Render { reason } => format!("Failed to render plot: {}", reason),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReportError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ReportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_codes() {
        let err = ReportError::Io {
            path: "results/out.json".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.code(), ReportErrorCodes::IO);
        assert_eq!(
            err.message(),
            "Failed to write results/out.json: permission denied"
        );
        assert_eq!(
            ReportError::Render {
                reason: "x".to_string()
            }
            .code(),
            3003
        );
    }
}
