// CoarseToFineSearch - four-phase narrowing scan
//
// 1. Wide scan over the whole domain at the coarse step
// 2. Medium scan in a window centered on the wide-scan peak
// 3. Narrow scan in a window centered on the medium-scan peak
// 4. Refinement scan at output precision around the narrow-scan peak
//
// Each phase picks its peak from its own samples only; all samples end up in
// one cumulative trace for the fitter.

use log::info;

use super::phase::{run_phase, PhaseKind, ScanWindow};
use super::{SearchDiagnostics, SearchOutcome, SearchStrategy, Trace};
use crate::config::{SearchConfig, ANGLE_MIDPOINT};
use crate::measurement::Sampler;

/// One entry of the scan schedule; `width` of `None` means the whole domain
#[derive(Debug, Clone, Copy)]
struct PhasePlan {
    kind: PhaseKind,
    width: Option<f64>,
    step: f64,
}

/// Coarse-to-fine search strategy
#[derive(Debug, Clone, Default)]
pub struct CoarseToFineSearch {
    config: SearchConfig,
}

impl CoarseToFineSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn schedule(&self) -> [PhasePlan; 4] {
        let c = &self.config;
        [
            PhasePlan {
                kind: PhaseKind::Wide,
                width: None,
                step: c.coarse_step,
            },
            PhasePlan {
                kind: PhaseKind::Medium,
                width: Some(c.medium_window),
                step: c.medium_step,
            },
            PhasePlan {
                kind: PhaseKind::Narrow,
                width: Some(c.fine_window),
                step: c.fine_step,
            },
            PhasePlan {
                kind: PhaseKind::Refinement,
                width: Some(c.refinement_window),
                step: c.refinement_step,
            },
        ]
    }
}

impl SearchStrategy for CoarseToFineSearch {
    fn name(&self) -> &'static str {
        "coarse_to_fine"
    }

    fn search(&self, sampler: &mut dyn Sampler) -> SearchOutcome {
        info!("[CoarseToFineSearch] Starting coarse-to-fine search");

        let mut trace = Trace::new();
        let mut center = ANGLE_MIDPOINT;
        let mut phases = Vec::with_capacity(4);

        for plan in self.schedule() {
            let window = match plan.width {
                None => ScanWindow::full(),
                Some(width) => ScanWindow::centered(center, width),
            };
            let (extended, summary) = run_phase(sampler, plan.kind, window, plan.step, trace);
            trace = extended;
            center = summary.peak;
            phases.push(summary);
        }

        info!(
            "[CoarseToFineSearch] Final peak estimate: {:.1}° ({} measurements)",
            center,
            trace.len()
        );

        SearchOutcome::new(trace, center, Some(SearchDiagnostics { phases }))
    }
}
