//! Persisting and presenting calibration results.
//!
//! Everything here consumes a finished [`CalibrationResult`] and never feeds
//! back into a run: a console summary, a pretty-printed JSON record and an
//! SVG plot of the trace against the fitted curve.

mod plot;

pub use plot::render_plot;

use std::fs;
use std::path::{Path, PathBuf};

use crate::calibration::CalibrationResult;
use crate::config::ReportConfig;
use crate::error::ReportError;

const SUMMARY_LABEL: &str = "CALIBRATION RESULTS";

/// Output file locations derived from [`ReportConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub plot: PathBuf,
}

impl ReportPaths {
    pub fn from_config(config: &ReportConfig) -> Self {
        let dir = Path::new(&config.output_dir);
        Self {
            json: dir.join(format!("{}.json", config.file_base_name)),
            plot: dir.join(format!("{}.svg", config.file_base_name)),
        }
    }
}

/// Console block for a completed run
pub fn format_summary(result: &CalibrationResult) -> String {
    let rule = "=".repeat(SUMMARY_LABEL.len());
    format!(
        "{rule}\n{SUMMARY_LABEL}\n{rule}\n\
         Optimal response angle: {:.1}°\n\
         Measured voltage at optimal angle: {:.2}\n\
         Expected voltage at optimal angle: {:.2}\n\
         Total number of measurements: {}",
        result.optimal_angle,
        result.measured_voltage,
        result.expected_voltage,
        result.total_measurements
    )
}

/// Write `result` as pretty-printed JSON, creating parent directories
///
/// # Errors
/// * `ReportError::Io` - directory or file could not be written
/// * `ReportError::Serialization` - result could not be encoded
pub fn write_json_report<P: AsRef<Path>>(
    result: &CalibrationResult,
    path: P,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(result).map_err(|e| ReportError::Serialization {
        reason: e.to_string(),
    })?;
    fs::write(path, json).map_err(|e| io_error(path, e))?;
    log::info!("[Report] Results written to {}", path.display());
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), ReportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))
        }
        _ => Ok(()),
    }
}

fn io_error(path: &Path, err: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{ValidationReport, ValidationWarning};
    use crate::fitting::{GaussianFitter, ModelParameters};
    use crate::search::{Sample, Trace};

    fn sample_result() -> CalibrationResult {
        let params = ModelParameters::new(100.0, 15.0, 5.0, 95.0);
        let trace: Trace = (0..=18)
            .map(|i| {
                let angle = i as f64 * 20.0;
                Sample::new(angle, params.evaluate(angle))
            })
            .collect();
        CalibrationResult {
            optimal_angle: 100.0,
            measured_voltage: 94.876,
            expected_voltage: 95.0,
            total_measurements: trace.len() + 1,
            trace,
            fitted_params: params,
            strategy: "coarse_to_fine".to_string(),
            diagnostics: None,
            validation: ValidationReport {
                reliable: true,
                warnings: Vec::new(),
            },
        }
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(&sample_result());
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "===================");
        assert_eq!(lines[1], "CALIBRATION RESULTS");
        assert_eq!(lines[3], "Optimal response angle: 100.0°");
        assert_eq!(lines[4], "Measured voltage at optimal angle: 94.88");
        assert_eq!(lines[5], "Expected voltage at optimal angle: 95.00");
        assert_eq!(lines[6], "Total number of measurements: 20");
    }

    #[test]
    fn test_report_paths() {
        let paths = ReportPaths::from_config(&ReportConfig::default());
        assert_eq!(paths.json, PathBuf::from("results/calibration_results.json"));
        assert_eq!(paths.plot, PathBuf::from("results/calibration_results.svg"));
    }

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");
        let mut result = sample_result();
        result.validation = ValidationReport {
            reliable: false,
            warnings: vec![ValidationWarning::LowSignal {
                measured: 20.0,
                min_signal: 50.0,
            }],
        };

        write_json_report(&result, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["optimal_angle"], 100.0);
        assert_eq!(value["total_measurements"], 20);
        assert_eq!(value["trace"].as_array().map(|a| a.len()), Some(19));
        assert_eq!(value["validation"]["reliable"], false);
        assert_eq!(value["validation"]["warnings"][0]["kind"], "low_signal");
        assert!(value.get("diagnostics").is_none());

        let parsed: CalibrationResult = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_write_json_report_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let err = write_json_report(&sample_result(), blocker.join("run.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_render_plot_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");

        render_plot(
            &sample_result(),
            &GaussianFitter::default(),
            &path,
            &ReportConfig::default(),
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Optimal Angle: 100.0°"));
        assert!(svg.contains("Total Measurements: 20"));
    }
}
