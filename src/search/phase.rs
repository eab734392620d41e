// Scan phase primitives shared by the search strategies
//
// A phase samples every angle of a window at a fixed step, appends the
// successful readings to the trace it was handed, and reports the angle of
// its own maximum reading.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{Sample, Trace};
use crate::config::{ANGLE_MAX, ANGLE_MIDPOINT, ANGLE_MIN};
use crate::measurement::Sampler;

/// Scan phase identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Whole domain at the coarse step
    Wide,
    /// Window around the wide-scan peak
    Medium,
    /// Window around the medium-scan peak
    Narrow,
    /// Window around the narrow-scan peak at output precision
    Refinement,
    /// Single pass of the uniform strategy
    Uniform,
}

impl PhaseKind {
    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseKind::Wide => "wide scan",
            PhaseKind::Medium => "medium scan",
            PhaseKind::Narrow => "narrow scan",
            PhaseKind::Refinement => "refinement scan",
            PhaseKind::Uniform => "uniform scan",
        }
    }
}

/// Angular interval sampled by one phase, always inside the domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub start: f64,
    pub end: f64,
}

impl ScanWindow {
    /// The entire angle domain
    pub fn full() -> Self {
        Self {
            start: ANGLE_MIN,
            end: ANGLE_MAX,
        }
    }

    /// Window of `width` centered on `center`, shrunk at the domain edges
    pub fn centered(center: f64, width: f64) -> Self {
        let half = width / 2.0;
        Self {
            start: ANGLE_MIN.max(center - half),
            end: ANGLE_MAX.min(center + half),
        }
    }

    /// Angles sampled at `step`
    ///
    /// Generates `start, start + step, ...` up to but excluding
    /// `end + step`, so the end boundary is included and the last angle may
    /// overshoot it by less than one step. Angles outside the domain are
    /// dropped.
    pub fn angles(&self, step: f64) -> Vec<f64> {
        if !step.is_finite() || step <= 0.0 {
            return Vec::new();
        }
        let span = (self.end + step - self.start) / step;
        if !span.is_finite() || span <= 0.0 {
            return Vec::new();
        }
        let count = span.ceil() as usize;
        (0..count)
            .map(|i| self.start + i as f64 * step)
            .filter(|angle| (ANGLE_MIN..=ANGLE_MAX).contains(angle))
            .collect()
    }
}

/// Summary of one executed phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub kind: PhaseKind,
    pub window: ScanWindow,
    pub step: f64,
    /// Angles the phase attempted to measure
    pub requested: usize,
    /// Samples appended to the trace
    pub recorded: usize,
    /// Measurement requests that failed and were skipped
    pub failed: usize,
    /// Angle of the maximum reading within this phase only
    pub peak: f64,
}

/// Angle of the maximum reading
///
/// Ties resolve to the first maximal sample in order. NaN readings are
/// ignored. An empty set yields the domain midpoint.
pub fn find_peak_in_samples(samples: &[Sample]) -> f64 {
    let mut best: Option<&Sample> = None;
    for sample in samples.iter().filter(|s| !s.reading.is_nan()) {
        if best.map_or(true, |b| sample.reading > b.reading) {
            best = Some(sample);
        }
    }
    best.map_or(ANGLE_MIDPOINT, |s| s.angle)
}

/// Measure every angle of `window` and append the results to `trace`
///
/// # Returns
/// The extended trace and the phase summary. The phase peak is selected from
/// this phase's samples only.
pub(crate) fn run_phase(
    sampler: &mut dyn Sampler,
    kind: PhaseKind,
    window: ScanWindow,
    step: f64,
    mut trace: Trace,
) -> (Trace, PhaseSummary) {
    let angles = window.angles(step);
    let first = trace.len();
    let mut failed = 0;

    info!(
        "[SearchPhase] {} over [{:.1}, {:.1}] (step size: {}°, {} angles)",
        kind.display_name(),
        window.start,
        window.end,
        step,
        angles.len()
    );

    for &angle in &angles {
        match sampler.measure(angle) {
            Ok(reading) => {
                debug!("[SearchPhase] angle={:.2} reading={:.2}", angle, reading);
                trace.push(Sample::new(angle, reading));
            }
            Err(err) => {
                failed += 1;
                warn!("[SearchPhase] Failed to measure at {:.2}°: {}", angle, err);
            }
        }
    }

    let recorded = trace.len() - first;
    if recorded == 0 {
        warn!(
            "[SearchPhase] {} recorded no samples; falling back to {:.1}°",
            kind.display_name(),
            ANGLE_MIDPOINT
        );
    }
    let peak = find_peak_in_samples(&trace.samples()[first..]);
    info!("[SearchPhase] {} peak near {:.1}°", kind.display_name(), peak);

    let summary = PhaseSummary {
        kind,
        window,
        step,
        requested: angles.len(),
        recorded,
        failed,
        peak,
    };
    (trace, summary)
}
