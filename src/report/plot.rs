// SVG plot of a calibration run: trace scatter, fitted curve, optimal angle
// marker and a parameter text box.

use std::path::Path;

use plotters::prelude::*;

use crate::calibration::CalibrationResult;
use crate::config::{ReportConfig, ANGLE_MAX, ANGLE_MIN};
use crate::error::ReportError;
use crate::fitting::GaussianFitter;

const Y_MIN: f64 = -5.0;
const Y_MAX: f64 = 105.0;
const GOLD: RGBColor = RGBColor(255, 215, 0);

/// Render `result` to an SVG file at `path`
///
/// # Arguments
/// * `result` - Completed calibration run
/// * `fitter` - Used to sample the fitted curve across the angle domain
/// * `path` - Output file; parent directories are created
/// * `config` - Canvas size and curve resolution
///
/// # Errors
/// * `ReportError::Io` - output directory could not be created
/// * `ReportError::Render` - plot backend failed
pub fn render_plot<P: AsRef<Path>>(
    result: &CalibrationResult,
    fitter: &GaussianFitter,
    path: P,
    config: &ReportConfig,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    super::ensure_parent_dir(path)?;
    draw(result, fitter, path, config).map_err(|e| ReportError::Render {
        reason: e.to_string(),
    })?;
    log::info!("[Report] Plot saved to {}", path.display());
    Ok(())
}

fn draw(
    result: &CalibrationResult,
    fitter: &GaussianFitter,
    path: &Path,
    config: &ReportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (config.plot_width, config.plot_height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Calibration Results: Measured Data and Fitted Gaussian Curve",
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(ANGLE_MIN..ANGLE_MAX, Y_MIN..Y_MAX)?;

    chart
        .configure_mesh()
        .x_desc("Angle (degrees)")
        .y_desc("Measured voltage")
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    chart
        .draw_series(
            result
                .trace
                .iter()
                .map(|s| Circle::new((s.angle, s.reading), 4, BLUE.mix(0.6).filled())),
        )?
        .label("Measured Data")
        .legend(|(x, y)| Circle::new((x + 5, y), 4, BLUE.mix(0.6).filled()));

    let (angles, values) = fitter.generate_curve(&result.fitted_params, config.curve_points);
    chart
        .draw_series(LineSeries::new(
            angles.into_iter().zip(values),
            MAGENTA.stroke_width(2),
        ))?
        .label("Fitted Gaussian Curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], MAGENTA.stroke_width(2)));

    let optimal = result.optimal_angle;
    chart
        .draw_series(LineSeries::new(
            vec![(optimal, Y_MIN), (optimal, Y_MAX)],
            GREEN.stroke_width(2),
        ))?
        .label(format!("Optimal Angle: {:.1}°", optimal))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], GREEN.stroke_width(2)));

    let measured = (optimal, result.measured_voltage);
    chart
        .draw_series([
            Circle::new(measured, 9, GOLD.filled()),
            Circle::new(measured, 9, BLACK.stroke_width(1)),
        ])?
        .label(format!("Measured: {:.2}V", result.measured_voltage))
        .legend(|(x, y)| Circle::new((x + 5, y), 5, GOLD.filled()));

    let params = &result.fitted_params;
    let stats = [
        format!("Total Measurements: {}", result.total_measurements),
        format!("Peak Position (μ): {:.2}°", params.mu),
        format!("Peak Width (σ): {:.2}°", params.sigma),
        format!("Baseline: {:.2}", params.baseline),
        format!("Amplitude: {:.2}", params.amplitude),
    ];
    let line_height = (Y_MAX - Y_MIN) * 0.045;
    chart.draw_series(stats.into_iter().enumerate().map(|(i, line)| {
        Text::new(
            line,
            (ANGLE_MIN + 5.0, Y_MAX - 2.0 - i as f64 * line_height),
            ("sans-serif", 13),
        )
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
