use std::cell::Cell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;

use super::*;
use crate::config::{AppConfig, FitConfig};
use crate::error::{CalibrationError, MeasurementError};
use crate::fitting::{GaussianFitter, ModelParameters};
use crate::measurement::{MeasurementInterface, Sampler};
use crate::search::{CoarseToFineSearch, SearchStrategy, SearchStrategyKind};
use crate::testing::FnSampler;

fn device_curve() -> ModelParameters {
    ModelParameters::new(100.0, 15.0, 5.0, 95.0)
}

fn healthy_device() -> FnSampler {
    let curve = device_curve();
    FnSampler::new(move |angle| curve.evaluate(angle))
}

/// Number of requests the default search makes against a healthy device
fn search_request_count() -> usize {
    let mut sampler = healthy_device();
    CoarseToFineSearch::default().search(&mut sampler);
    sampler.requested_angles().len()
}

#[test]
fn test_successful_calibration() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device());
    assert_eq!(engine.stage(), CalibrationStage::Idle);

    let result = engine.calibrate().unwrap();

    assert_abs_diff_eq!(result.optimal_angle, 100.0, epsilon = 0.5);
    assert_abs_diff_eq!(result.measured_voltage, 95.0, epsilon = 1.0);
    assert!(result.voltage_difference() < 1.0);
    assert!(result.is_reliable());
    assert_eq!(result.strategy, "coarse_to_fine");
    assert_eq!(result.diagnostics.as_ref().map(|d| d.phases.len()), Some(4));
    assert_eq!(engine.stage(), CalibrationStage::Validated { reliable: true });
}

#[test]
fn test_total_includes_confirmatory_measurement() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device());
    let result = engine.calibrate().unwrap();

    assert_eq!(result.total_measurements, result.trace.len() + 1);
    assert_eq!(engine.interface().total_measurements(), result.total_measurements);
}

#[test]
fn test_counter_reset_before_search() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device());
    for angle in [10.0, 20.0, 30.0, 40.0, 50.0] {
        engine.interface_mut().measure(angle).unwrap();
    }
    assert_eq!(engine.interface().total_measurements(), 5);

    let result = engine.calibrate().unwrap();
    assert_eq!(result.total_measurements, result.trace.len() + 1);
}

#[test]
fn test_engine_reuse_gives_identical_runs() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device());
    let first = engine.calibrate().unwrap();
    let second = engine.calibrate().unwrap();

    assert_eq!(first.trace, second.trace);
    assert_eq!(first.optimal_angle, second.optimal_angle);
    assert_eq!(first.total_measurements, second.total_measurements);
}

#[test]
fn test_offline_device_is_fatal() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device().offline());

    assert_eq!(engine.calibrate(), Err(CalibrationError::DeviceUnavailable));
    assert_eq!(engine.stage(), CalibrationStage::Failed);
    assert!(engine.interface().requested_angles().is_empty());
}

#[test]
fn test_search_failures_are_not_fatal() {
    let curve = device_curve();
    let sampler = FnSampler::fallible(move |angle| {
        if angle < 60.0 {
            Err(MeasurementError::Transport {
                reason: "connection reset".to_string(),
            })
        } else {
            Ok(curve.evaluate(angle))
        }
    });
    let mut engine = CalibrationEngine::with_defaults(sampler);

    let result = engine.calibrate().unwrap();

    assert!(result.trace.iter().all(|s| s.angle >= 60.0));
    assert_abs_diff_eq!(result.optimal_angle, 100.0, epsilon = 0.5);
    let failed = result
        .diagnostics
        .as_ref()
        .map(|d| d.failed_measurements())
        .unwrap_or_default();
    assert_eq!(failed, 3);
}

#[test]
fn test_confirmatory_failure_is_fatal() {
    let allowed = search_request_count();
    let curve = device_curve();
    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let sampler = FnSampler::fallible(move |angle| {
        counter.set(counter.get() + 1);
        if counter.get() > allowed {
            Err(MeasurementError::Transport {
                reason: "server went away".to_string(),
            })
        } else {
            Ok(curve.evaluate(angle))
        }
    });
    let mut engine = CalibrationEngine::with_defaults(sampler);

    match engine.calibrate() {
        Err(CalibrationError::Measurement(MeasurementError::Transport { reason })) => {
            assert_eq!(reason, "server went away");
        }
        other => panic!("Expected wrapped transport error, got {:?}", other),
    }
    assert_eq!(calls.get(), allowed + 1);
    assert_eq!(engine.stage(), CalibrationStage::Failed);
}

#[test]
fn test_insufficient_trace_is_fatal() {
    let sampler = FnSampler::fallible(|angle| {
        if angle >= 359.0 {
            Ok(40.0)
        } else {
            Err(MeasurementError::Transport {
                reason: "timeout".to_string(),
            })
        }
    });
    let mut engine = CalibrationEngine::with_defaults(sampler);

    assert_eq!(
        engine.calibrate(),
        Err(CalibrationError::InsufficientData {
            required: 10,
            collected: 1
        })
    );
    assert_eq!(engine.stage(), CalibrationStage::Failed);
}

#[test]
fn test_non_finite_readings_fail_the_fit() {
    let mut engine = CalibrationEngine::with_defaults(FnSampler::new(|_| f64::NAN));

    assert!(matches!(
        engine.calibrate(),
        Err(CalibrationError::FitFailed { .. })
    ));
}

#[test]
fn test_solver_giving_up_is_fatal() {
    let mut engine = CalibrationEngine::new(
        healthy_device(),
        Box::new(CoarseToFineSearch::default()),
        GaussianFitter::new(FitConfig {
            max_evaluations: 1,
            ..FitConfig::default()
        }),
        ResultValidator::default(),
    );

    match engine.calibrate() {
        Err(CalibrationError::FitFailed { reason }) => assert!(reason.contains("LostPatience")),
        other => panic!("Expected FitFailed, got {:?}", other),
    }
    assert_eq!(engine.stage(), CalibrationStage::Failed);
    assert!(!engine.interface().requested_angles().is_empty());
}

#[test]
fn test_weak_signal_completes_but_is_flagged() {
    let curve = ModelParameters::new(200.0, 20.0, 2.0, 30.0);
    let mut engine = CalibrationEngine::with_defaults(FnSampler::new(move |a| curve.evaluate(a)));

    let result = engine.calibrate().unwrap();

    assert!(!result.is_reliable());
    assert!(result
        .validation
        .warnings
        .iter()
        .any(|w| matches!(w, ValidationWarning::LowSignal { .. })));
    assert_eq!(engine.stage(), CalibrationStage::Validated { reliable: false });
}

#[test]
fn test_from_config_selects_strategy() {
    let mut config = AppConfig::default();
    config.search.strategy = SearchStrategyKind::Uniform;
    let mut engine = CalibrationEngine::from_config(healthy_device(), &config).unwrap();
    assert_eq!(engine.strategy_name(), "uniform");

    let result = engine.calibrate().unwrap();
    assert_eq!(result.trace.len(), 361);
    assert_eq!(result.strategy, "uniform");
    assert_abs_diff_eq!(result.optimal_angle, 100.0, epsilon = 0.5);
}

#[test]
fn test_from_config_rejects_invalid_config() {
    let mut config = AppConfig::default();
    config.fitting.min_points = 2;

    assert!(matches!(
        CalibrationEngine::from_config(healthy_device(), &config),
        Err(CalibrationError::InvalidConfig { .. })
    ));
}

#[test]
fn test_custom_components() {
    let mut engine = CalibrationEngine::new(
        healthy_device(),
        Box::new(CoarseToFineSearch::default()),
        GaussianFitter::default(),
        ResultValidator::new(crate::config::ValidationConfig {
            tolerance: 10.0,
            min_signal: 99.0,
        }),
    );

    let result = engine.calibrate().unwrap();
    assert!(!result.is_reliable());
    assert_eq!(result.validation.warnings.len(), 1);
}

#[test]
fn test_stage_display_names() {
    assert_eq!(CalibrationStage::Idle.display_name(), "IDLE");
    assert_eq!(
        CalibrationStage::Validated { reliable: false }.display_name(),
        "VALIDATED (WARNED)"
    );
    assert!(CalibrationStage::Failed.is_terminal());
    assert!(!CalibrationStage::Fitted.is_terminal());
}

#[test]
fn test_result_display() {
    let mut engine = CalibrationEngine::with_defaults(healthy_device());
    let text = engine.calibrate().unwrap().to_string();

    assert!(text.starts_with("Calibration Results:"));
    assert!(text.contains("Optimal Angle: 100.0°"));
    assert!(text.contains("Fitted Parameters: ModelParameters(mu="));
}
