// CalibrationEngine - staged calibration run
//
// Stages advance strictly in order:
// Idle -> ConnectivityChecked -> Searched -> Fitted -> Verified -> Validated
// Any fatal error moves the engine to Failed and is returned to the caller
// with its cause attached. Validation never fails the run.

use log::info;
use serde::Serialize;

use super::result::CalibrationResult;
use super::validation::ResultValidator;
use crate::config::AppConfig;
use crate::error::{log_calibration_error, CalibrationError};
use crate::fitting::GaussianFitter;
use crate::measurement::MeasurementInterface;
use crate::search::{CoarseToFineSearch, SearchStrategy};

/// Progress of the current (or last) calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibrationStage {
    Idle,
    ConnectivityChecked,
    Searched,
    Fitted,
    Verified,
    Validated { reliable: bool },
    Failed,
}

impl CalibrationStage {
    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            CalibrationStage::Idle => "IDLE",
            CalibrationStage::ConnectivityChecked => "CONNECTIVITY CHECKED",
            CalibrationStage::Searched => "SEARCHED",
            CalibrationStage::Fitted => "FITTED",
            CalibrationStage::Verified => "VERIFIED",
            CalibrationStage::Validated { reliable: true } => "VALIDATED",
            CalibrationStage::Validated { reliable: false } => "VALIDATED (WARNED)",
            CalibrationStage::Failed => "FAILED",
        }
    }

    /// Whether the engine has finished a run, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CalibrationStage::Validated { .. } | CalibrationStage::Failed
        )
    }
}

/// Runs calibrations against one measurement interface
///
/// The engine owns no per-run data besides `stage`; calling
/// [`CalibrationEngine::calibrate`] again starts a fresh run.
pub struct CalibrationEngine<M: MeasurementInterface> {
    interface: M,
    strategy: Box<dyn SearchStrategy>,
    fitter: GaussianFitter,
    validator: ResultValidator,
    stage: CalibrationStage,
}

impl<M: MeasurementInterface> CalibrationEngine<M> {
    /// Create an engine from explicit components
    pub fn new(
        interface: M,
        strategy: Box<dyn SearchStrategy>,
        fitter: GaussianFitter,
        validator: ResultValidator,
    ) -> Self {
        Self {
            interface,
            strategy,
            fitter,
            validator,
            stage: CalibrationStage::Idle,
        }
    }

    /// Engine with the four-phase search and default fit/validation settings
    pub fn with_defaults(interface: M) -> Self {
        Self::new(
            interface,
            Box::new(CoarseToFineSearch::default()),
            GaussianFitter::default(),
            ResultValidator::default(),
        )
    }

    /// Build every component from application configuration
    ///
    /// # Errors
    /// * `CalibrationError::InvalidConfig` - configuration failed validation
    pub fn from_config(interface: M, config: &AppConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self::new(
            interface,
            config.search.strategy.build(&config.search),
            GaussianFitter::new(config.fitting.clone()),
            ResultValidator::new(config.validation.clone()),
        ))
    }

    pub fn stage(&self) -> CalibrationStage {
        self.stage
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn fitter(&self) -> &GaussianFitter {
        &self.fitter
    }

    pub fn interface(&self) -> &M {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut M {
        &mut self.interface
    }

    /// Execute one full calibration run
    ///
    /// # Returns
    /// * `Ok(CalibrationResult)` - Run completed; check `validation.reliable`
    /// * `Err(CalibrationError)` - Fatal error; `stage()` is `Failed`
    ///
    /// # Errors
    /// - `DeviceUnavailable` if the liveness probe reports down
    /// - `InsufficientData` / `FitFailed` from the fitter
    /// - `Measurement` if the confirmatory measurement fails
    pub fn calibrate(&mut self) -> Result<CalibrationResult, CalibrationError> {
        let span = tracing::info_span!("calibration", strategy = self.strategy.name());
        let _guard = span.enter();

        self.stage = CalibrationStage::Idle;
        match self.run() {
            Ok(result) => Ok(result),
            Err(err) => {
                log_calibration_error(&err, self.stage.display_name());
                self.stage = CalibrationStage::Failed;
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<CalibrationResult, CalibrationError> {
        info!("[CalibrationEngine] Checking server connectivity");
        if !self.interface.check_status() {
            return Err(CalibrationError::DeviceUnavailable);
        }
        self.stage = CalibrationStage::ConnectivityChecked;

        self.interface.reset_count();
        info!(
            "[CalibrationEngine] Running {} search",
            self.strategy.name()
        );
        let outcome = self.strategy.search(&mut self.interface);
        info!(
            "[CalibrationEngine] Search complete: {} measurements taken, peak estimate {:.1}",
            outcome.total_measurements, outcome.estimated_peak_angle
        );
        self.stage = CalibrationStage::Searched;

        let fitted_params = self.fitter.fit(&outcome.trace)?;
        self.stage = CalibrationStage::Fitted;

        let optimal_angle = self.fitter.find_peak(&fitted_params);
        info!("[CalibrationEngine] Optimal angle: {:.1}°", optimal_angle);

        let measured_voltage = self.interface.measure(optimal_angle)?;
        let expected_voltage = self.fitter.predict(optimal_angle, &fitted_params);
        info!(
            "[CalibrationEngine] Verification: measured={:.2}, expected={:.2}, difference={:.2}",
            measured_voltage,
            expected_voltage,
            (measured_voltage - expected_voltage).abs()
        );
        self.stage = CalibrationStage::Verified;

        let validation = self
            .validator
            .validate(optimal_angle, measured_voltage, expected_voltage);
        self.stage = CalibrationStage::Validated {
            reliable: validation.reliable,
        };

        Ok(CalibrationResult {
            optimal_angle,
            measured_voltage,
            expected_voltage,
            total_measurements: self.interface.total_measurements(),
            trace: outcome.trace,
            fitted_params,
            strategy: self.strategy.name().to_string(),
            diagnostics: outcome.diagnostics,
            validation,
        })
    }
}
