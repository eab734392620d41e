//! Test doubles for the measurement interface.
//!
//! [`FnSampler`] turns a closure into a full [`MeasurementInterface`], which
//! lets unit and integration tests drive the search, fitter and engine with
//! deterministic response curves, scripted failures, or a device that
//! reports itself down.

use crate::error::MeasurementError;
use crate::measurement::{check_angle, MeasurementInterface, Sampler};

type ResponseFn = Box<dyn FnMut(f64) -> Result<f64, MeasurementError>>;

/// Closure-driven measurement interface
pub struct FnSampler {
    response: ResponseFn,
    online: bool,
    measurement_count: usize,
    requested: Vec<f64>,
}

impl FnSampler {
    /// Sampler whose every in-domain request succeeds with `response(angle)`
    pub fn new<F>(mut response: F) -> Self
    where
        F: FnMut(f64) -> f64 + 'static,
    {
        Self::fallible(move |angle| Ok(response(angle)))
    }

    /// Sampler whose closure decides success or failure per request
    pub fn fallible<F>(response: F) -> Self
    where
        F: FnMut(f64) -> Result<f64, MeasurementError> + 'static,
    {
        Self {
            response: Box::new(response),
            online: true,
            measurement_count: 0,
            requested: Vec::new(),
        }
    }

    /// Make the liveness probe report the device as down
    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    /// Every in-domain angle passed to `measure`, in call order
    pub fn requested_angles(&self) -> &[f64] {
        &self.requested
    }
}

impl Sampler for FnSampler {
    fn measure(&mut self, angle: f64) -> Result<f64, MeasurementError> {
        check_angle(angle)?;
        self.requested.push(angle);
        let reading = (self.response)(angle)?;
        self.measurement_count += 1;
        Ok(reading)
    }
}

impl MeasurementInterface for FnSampler {
    fn check_status(&mut self) -> bool {
        self.online
    }

    fn total_measurements(&self) -> usize {
        self.measurement_count
    }

    fn reset_count(&mut self) {
        self.measurement_count = 0;
    }
}
