// UniformScan - single full-domain pass
//
// Fallback strategy that samples the whole domain once at a fixed step and
// reports the maximal sample. It makes no locality assumption at all, at the
// cost of many more measurements than the coarse-to-fine schedule.

use super::phase::{run_phase, PhaseKind, ScanWindow};
use super::{SearchDiagnostics, SearchOutcome, SearchStrategy, Trace};
use crate::measurement::Sampler;

/// Uniform single-pass search
#[derive(Debug, Clone)]
pub struct UniformScan {
    step: f64,
}

impl UniformScan {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl Default for UniformScan {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SearchStrategy for UniformScan {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn search(&self, sampler: &mut dyn Sampler) -> SearchOutcome {
        let (trace, summary) = run_phase(
            sampler,
            PhaseKind::Uniform,
            ScanWindow::full(),
            self.step,
            Trace::new(),
        );
        let peak = summary.peak;
        SearchOutcome::new(
            trace,
            peak,
            Some(SearchDiagnostics {
                phases: vec![summary],
            }),
        )
    }
}
