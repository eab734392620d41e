// Bounded Levenberg-Marquardt solve of the response model
//
// The solver works on unbounded internal coordinates `u`; each model
// parameter is recovered as `lo + (hi - lo) * (sin(u) + 1) / 2`, so every
// parameter vector the solver evaluates lies inside the bound box and the
// gradient vanishes smoothly at a saturated bound.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};

use super::ModelParameters;
use crate::config::ParameterBounds;
use crate::error::CalibrationError;

/// Outcome of one solver invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub evaluations: usize,
    /// Half the sum of squared residuals at the solution
    pub final_cost: f64,
    pub termination: String,
}

const EDGE_MARGIN: f64 = 1e-3;

/// Sine mapping between an inclusive interval and the real line
#[derive(Debug, Clone, Copy)]
struct BoundedAxis {
    lo: f64,
    hi: f64,
}

impl BoundedAxis {
    fn span(&self) -> f64 {
        self.hi - self.lo
    }

    fn to_external(self, u: f64) -> f64 {
        if self.span() > 0.0 {
            (self.lo + self.span() * (u.sin() + 1.0) / 2.0).clamp(self.lo, self.hi)
        } else {
            self.lo
        }
    }

    /// Starting points on a bound are pulled slightly inside, where the
    /// mapping still has a usable slope
    fn to_internal(self, x: f64) -> f64 {
        if self.span() > 0.0 {
            let scaled = 2.0 * (x - self.lo) / self.span() - 1.0;
            scaled.clamp(-1.0 + EDGE_MARGIN, 1.0 - EDGE_MARGIN).asin()
        } else {
            0.0
        }
    }

    /// d(external)/d(internal) at `u`
    fn derivative(self, u: f64) -> f64 {
        self.span() * u.cos() / 2.0
    }
}

fn axes(bounds: &ParameterBounds) -> [BoundedAxis; 4] {
    [bounds.mu, bounds.sigma, bounds.baseline, bounds.amplitude]
        .map(|(lo, hi)| BoundedAxis { lo, hi })
}

struct BoundedGaussianProblem<'a> {
    angles: &'a [f64],
    readings: &'a [f64],
    axes: [BoundedAxis; 4],
    internal: DVector<f64>,
}

impl<'a> BoundedGaussianProblem<'a> {
    fn new(
        angles: &'a [f64],
        readings: &'a [f64],
        bounds: ParameterBounds,
        initial: ModelParameters,
    ) -> Self {
        let axes = axes(&bounds);
        let internal = DVector::from_iterator(
            axes.len(),
            axes.iter()
                .zip(initial.to_array())
                .map(|(axis, x)| axis.to_internal(x)),
        );
        Self {
            angles,
            readings,
            axes,
            internal,
        }
    }

    fn model(&self) -> ModelParameters {
        ModelParameters::from_array(std::array::from_fn(|i| {
            self.axes[i].to_external(self.internal[i])
        }))
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for BoundedGaussianProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, u: &DVector<f64>) {
        self.internal.copy_from(u);
    }

    fn params(&self) -> DVector<f64> {
        self.internal.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let model = self.model();
        Some(DVector::from_iterator(
            self.angles.len(),
            self.angles
                .iter()
                .zip(self.readings)
                .map(|(&angle, &reading)| model.evaluate(angle) - reading),
        ))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let model = self.model();
        let chain: [f64; 4] =
            std::array::from_fn(|i| self.axes[i].derivative(self.internal[i]));
        let mut jacobian = DMatrix::zeros(self.angles.len(), 4);
        for (row, &angle) in self.angles.iter().enumerate() {
            for (col, value) in model.gradient(angle).into_iter().enumerate() {
                jacobian[(row, col)] = value * chain[col];
            }
        }
        Some(jacobian)
    }
}

/// Whether the solver stopped at a usable minimum
fn is_converged(termination: &TerminationReason) -> bool {
    termination.was_successful()
        || matches!(termination, TerminationReason::NoImprovementPossible(_))
}

/// Fit the model to `(angles, readings)` starting from `initial`
///
/// # Errors
/// * `CalibrationError::FitFailed` - numerical breakdown, lost patience, or a
///   non-finite solution
pub(crate) fn solve_bounded(
    angles: &[f64],
    readings: &[f64],
    initial: ModelParameters,
    bounds: ParameterBounds,
    max_evaluations: usize,
) -> Result<(ModelParameters, SolveReport), CalibrationError> {
    // Patience is counted in units of (parameters + 1) evaluations
    let patience = (max_evaluations / 5).max(1);
    let solver = LevenbergMarquardt::new().with_patience(patience);

    let problem = BoundedGaussianProblem::new(angles, readings, bounds, initial);
    let (problem, report) = solver.minimize(problem);

    let summary = SolveReport {
        evaluations: report.number_of_evaluations,
        final_cost: report.objective_function,
        termination: format!("{:?}", report.termination),
    };

    if !is_converged(&report.termination) {
        return Err(CalibrationError::FitFailed {
            reason: format!(
                "solver stopped after {} evaluations: {}",
                summary.evaluations, summary.termination
            ),
        });
    }

    let params = problem.model();
    if !params.all_finite() {
        return Err(CalibrationError::FitFailed {
            reason: format!("solver produced non-finite parameters: {}", params),
        });
    }

    Ok((params, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_round_trip() {
        let axis = BoundedAxis { lo: 1.0, hi: 50.0 };
        for x in [1.5, 7.5, 25.5, 49.0] {
            assert!((axis.to_external(axis.to_internal(x)) - x).abs() < 1e-9);
        }
        let high = axis.to_external(axis.to_internal(80.0));
        assert!(high < 50.0 && high > 49.95);
        let low = axis.to_external(axis.to_internal(-3.0));
        assert!(low > 1.0 && low < 1.05);
    }

    #[test]
    fn test_axis_stays_inside_interval() {
        let axis = BoundedAxis { lo: 0.0, hi: 110.0 };
        for u in [-100.0, -3.0, -1.0, 0.0, 0.5, 2.0, 42.0] {
            let x = axis.to_external(u);
            assert!((0.0..=110.0).contains(&x), "{} escaped for u={}", x, u);
        }
    }

    #[test]
    fn test_degenerate_axis_is_fixed() {
        let axis = BoundedAxis { lo: 5.0, hi: 5.0 };
        assert_eq!(axis.to_external(1.3), 5.0);
        assert_eq!(axis.derivative(0.2), 0.0);
    }

    #[test]
    fn test_chain_rule_matches_finite_difference() {
        let axis = BoundedAxis { lo: 0.0, hi: 360.0 };
        let u = 0.4;
        let h = 1e-6;
        let numeric = (axis.to_external(u + h) - axis.to_external(u - h)) / (2.0 * h);
        assert!((axis.derivative(u) - numeric).abs() < 1e-4);
    }

    #[test]
    fn test_solver_never_leaves_bounds() {
        // Readings peak above the amplitude bound; the fit must saturate at it
        let angles: Vec<f64> = (0..60).map(|i| 20.0 + i as f64).collect();
        let truth = ModelParameters::new(50.0, 8.0, 2.0, 150.0);
        let readings: Vec<f64> = angles.iter().map(|&a| truth.evaluate(a)).collect();
        let initial = ModelParameters::new(50.0, 15.0, 2.0, 150.0);

        let (params, _) =
            solve_bounded(&angles, &readings, initial, ParameterBounds::default(), 10_000)
                .unwrap();
        assert!(params.amplitude <= 110.0);
        assert!(params.sigma >= 1.0 && params.sigma <= 50.0);
        assert!((params.mu - 50.0).abs() < 1.0);
    }

    #[test]
    fn test_report_records_evaluations() {
        let angles: Vec<f64> = (0..40).map(|i| i as f64 * 9.0).collect();
        let truth = ModelParameters::new(90.0, 25.0, 3.0, 95.0);
        let readings: Vec<f64> = angles.iter().map(|&a| truth.evaluate(a)).collect();

        let (_, report) = solve_bounded(
            &angles,
            &readings,
            ModelParameters::new(90.0, 15.0, 3.0, 95.0),
            ParameterBounds::default(),
            10_000,
        )
        .unwrap();
        assert!(report.evaluations > 0);
        assert!(report.final_cost < 1e-6);
    }
}
