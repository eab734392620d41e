// Angle Calibrator Core
// Locates the angle of peak device response by staged scanning and a bounded
// Gaussian fit, then confirms the fit with one held-out measurement.

// Module declarations
pub mod calibration;
pub mod config;
pub mod device;
pub mod error;
pub mod fitting;
pub mod measurement;
pub mod report;
pub mod search;
pub mod testing;

// Re-exports for convenience
pub use calibration::{CalibrationEngine, CalibrationResult, CalibrationStage};
pub use config::AppConfig;
pub use error::{CalibrationError, ErrorCode, MeasurementError, ReportError};
pub use fitting::{GaussianFitter, ModelParameters};
pub use measurement::{HttpMeasurementClient, MeasurementInterface, Sampler};
pub use search::{SearchOutcome, SearchStrategy, SearchStrategyKind, Trace};
