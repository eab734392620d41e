//! Measurement interface boundary.
//!
//! The calibration core talks to the device only through these two traits.
//! [`Sampler`] is the single operation the search strategies need;
//! [`MeasurementInterface`] adds the liveness probe and run-scoped counter
//! used by the orchestrator.

mod client;

pub use client::HttpMeasurementClient;

use crate::config::{ANGLE_MAX, ANGLE_MIN};
use crate::error::MeasurementError;

/// Issues one measurement request for a given angle.
pub trait Sampler {
    /// Measure the device response at `angle` degrees.
    ///
    /// # Errors
    /// * `MeasurementError::InvalidAngle` - angle outside [0, 360]
    /// * `MeasurementError::Transport` / `InvalidResponse` - request failed
    fn measure(&mut self, angle: f64) -> Result<f64, MeasurementError>;
}

/// Full measurement-interface contract used by the calibration engine.
pub trait MeasurementInterface: Sampler {
    /// Liveness probe. Transport errors are reported as `false`.
    fn check_status(&mut self) -> bool;

    /// Number of successful measurements since the last reset.
    fn total_measurements(&self) -> usize;

    /// Reset the run-scoped measurement counter.
    fn reset_count(&mut self);
}

/// Reject angles outside the domain before any request is issued.
pub fn check_angle(angle: f64) -> Result<(), MeasurementError> {
    if (ANGLE_MIN..=ANGLE_MAX).contains(&angle) {
        Ok(())
    } else {
        Err(MeasurementError::InvalidAngle { angle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_angle_bounds_inclusive() {
        assert!(check_angle(0.0).is_ok());
        assert!(check_angle(360.0).is_ok());
        assert!(check_angle(123.4).is_ok());
    }

    #[test]
    fn test_check_angle_rejects_out_of_domain() {
        assert_eq!(
            check_angle(-10.0),
            Err(MeasurementError::InvalidAngle { angle: -10.0 })
        );
        assert!(check_angle(400.0).is_err());
        assert!(check_angle(f64::NAN).is_err());
    }
}
