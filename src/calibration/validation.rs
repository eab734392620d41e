// Post-run reliability checks
//
// Validation never aborts a run. Each check that fails contributes one
// warning to the report and clears the reliable flag; all checks run even
// after the first failure so the report lists every problem at once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ValidationConfig, ANGLE_MAX, ANGLE_MIN};

/// One failed reliability check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Confirmatory reading and model prediction differ by more than the tolerance
    VoltageMismatch {
        measured: f64,
        expected: f64,
        tolerance: f64,
    },
    /// Reported optimal angle falls outside the angle domain
    AngleOutOfRange { angle: f64 },
    /// Confirmatory reading is below the minimum usable signal
    LowSignal { measured: f64, min_signal: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::VoltageMismatch {
                measured, expected, ..
            } => write!(
                f,
                "Large difference between measured ({:.2}) and expected ({:.2}) voltage",
                measured, expected
            ),
            ValidationWarning::AngleOutOfRange { angle } => {
                write!(f, "Optimal angle {:.1}° is out of range", angle)
            }
            ValidationWarning::LowSignal { measured, .. } => {
                write!(f, "Low signal strength at optimal angle: {:.2}", measured)
            }
        }
    }
}

/// Outcome of the reliability checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub reliable: bool,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    fn from_warnings(warnings: Vec<ValidationWarning>) -> Self {
        Self {
            reliable: warnings.is_empty(),
            warnings,
        }
    }
}

/// Applies the reliability checks to a completed run
#[derive(Debug, Clone, Default)]
pub struct ResultValidator {
    config: ValidationConfig,
}

impl ResultValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check a confirmatory measurement against the model
    ///
    /// # Arguments
    /// * `optimal_angle` - Reported peak angle
    /// * `measured` - Reading taken at `optimal_angle`
    /// * `expected` - Model prediction at `optimal_angle`
    ///
    /// # Returns
    /// A report whose `reliable` flag is true only when no check failed
    pub fn validate(&self, optimal_angle: f64, measured: f64, expected: f64) -> ValidationReport {
        let mut warnings = Vec::new();

        if (measured - expected).abs() > self.config.tolerance {
            warnings.push(ValidationWarning::VoltageMismatch {
                measured,
                expected,
                tolerance: self.config.tolerance,
            });
        }

        if !(ANGLE_MIN..=ANGLE_MAX).contains(&optimal_angle) {
            warnings.push(ValidationWarning::AngleOutOfRange {
                angle: optimal_angle,
            });
        }

        if measured < self.config.min_signal {
            warnings.push(ValidationWarning::LowSignal {
                measured,
                min_signal: self.config.min_signal,
            });
        }

        for warning in &warnings {
            log::warn!("[ResultValidator] {}", warning);
        }

        ValidationReport::from_warnings(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_difference_is_unreliable() {
        let report = ResultValidator::default().validate(100.0, 80.0, 65.0);
        assert!(!report.reliable);
        assert_eq!(
            report.warnings,
            vec![ValidationWarning::VoltageMismatch {
                measured: 80.0,
                expected: 65.0,
                tolerance: 10.0
            }]
        );
    }

    #[test]
    fn test_small_difference_is_reliable() {
        let report = ResultValidator::default().validate(100.0, 80.0, 75.0);
        assert!(report.reliable);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_difference_equal_to_tolerance_is_reliable() {
        let report = ResultValidator::default().validate(100.0, 80.0, 70.0);
        assert!(report.reliable);
    }

    #[test]
    fn test_angle_out_of_range() {
        let report = ResultValidator::default().validate(360.5, 80.0, 80.0);
        assert_eq!(
            report.warnings,
            vec![ValidationWarning::AngleOutOfRange { angle: 360.5 }]
        );

        assert!(ResultValidator::default().validate(360.0, 80.0, 80.0).reliable);
        assert!(ResultValidator::default().validate(0.0, 80.0, 80.0).reliable);
    }

    #[test]
    fn test_low_signal() {
        let report = ResultValidator::default().validate(100.0, 45.0, 48.0);
        assert!(!report.reliable);
        assert!(matches!(
            report.warnings.as_slice(),
            [ValidationWarning::LowSignal { measured, .. }] if *measured == 45.0
        ));
    }

    #[test]
    fn test_all_checks_reported() {
        let report = ResultValidator::default().validate(-3.0, 10.0, 90.0);
        assert!(!report.reliable);
        assert_eq!(report.warnings.len(), 3);
    }

    #[test]
    fn test_custom_thresholds() {
        let validator = ResultValidator::new(ValidationConfig {
            tolerance: 20.0,
            min_signal: 5.0,
        });
        assert!(validator.validate(100.0, 20.0, 35.0).reliable);
    }

    #[test]
    fn test_warning_messages() {
        let warning = ValidationWarning::LowSignal {
            measured: 12.5,
            min_signal: 50.0,
        };
        assert_eq!(
            warning.to_string(),
            "Low signal strength at optimal angle: 12.50"
        );
    }
}
