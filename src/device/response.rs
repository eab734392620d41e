// Binomial response model and the in-process device built on it
//
// Each reading counts successes over `trials` Bernoulli trials whose success
// probability follows the Gaussian response curve, so readings are integers
// in [0, trials] with shot noise that shrinks near the peak.

use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::MeasurementError;
use crate::fitting::ModelParameters;
use crate::measurement::{check_angle, MeasurementInterface, Sampler};

/// Device response: binomial count with Gaussian success probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedResponse {
    /// Success probability curve; baseline and amplitude are probabilities
    pub curve: ModelParameters,
    pub trials: u32,
}

impl Default for SimulatedResponse {
    fn default() -> Self {
        Self {
            curve: ModelParameters::new(50.0, 10.0, 0.02, 1.0),
            trials: 100,
        }
    }
}

impl SimulatedResponse {
    /// Success probability at `angle`, clamped to [0, 1]
    pub fn probability(&self, angle: f64) -> f64 {
        let p = self.curve.evaluate(angle);
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Expected reading at `angle`
    pub fn mean(&self, angle: f64) -> f64 {
        self.probability(angle) * f64::from(self.trials)
    }

    /// Draw one reading at `angle`
    pub fn sample<R: Rng + ?Sized>(&self, angle: f64, rng: &mut R) -> f64 {
        match Bernoulli::new(self.probability(angle)) {
            Ok(trial) => (0..self.trials).filter(|_| trial.sample(rng)).count() as f64,
            Err(_) => 0.0,
        }
    }
}

/// In-process measurement interface backed by [`SimulatedResponse`]
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    response: SimulatedResponse,
    rng: StdRng,
    online: bool,
    measurement_count: usize,
}

impl SimulatedDevice {
    /// Create a device; a fixed `seed` makes every reading reproducible
    pub fn new(response: SimulatedResponse, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            response,
            rng,
            online: true,
            measurement_count: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SimulatedResponse::default(), Some(seed))
    }

    pub fn response(&self) -> &SimulatedResponse {
        &self.response
    }

    /// Toggle the liveness probe result
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

impl Sampler for SimulatedDevice {
    fn measure(&mut self, angle: f64) -> Result<f64, MeasurementError> {
        check_angle(angle)?;
        let reading = self.response.sample(angle, &mut self.rng);
        self.measurement_count += 1;
        log::debug!("[SimulatedDevice] angle={:.1} reading={}", angle, reading);
        Ok(reading)
    }
}

impl MeasurementInterface for SimulatedDevice {
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
