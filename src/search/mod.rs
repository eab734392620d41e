//! Search strategies for locating the angle of maximum response.
//!
//! A strategy drives a [`Sampler`] and returns every (angle, reading) pair it
//! recorded as a [`Trace`] together with its own peak estimate. The trace is
//! threaded through the scan phases as an explicit accumulator, so a
//! strategy holds no per-run state and may be reused freely.

mod coarse_to_fine;
mod phase;
mod uniform;


pub use coarse_to_fine::CoarseToFineSearch;
pub use phase::{find_peak_in_samples, PhaseKind, PhaseSummary, ScanWindow};
pub use uniform::UniformScan;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::measurement::Sampler;

/// One recorded measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Angle in degrees, within [0, 360]
    pub angle: f64,
    /// Reading returned by the measurement interface
    pub reading: f64,
}

impl Sample {
    pub fn new(angle: f64, reading: f64) -> Self {
        Self { angle, reading }
    }
}

/// Append-only sequence of samples in measurement order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample at the end of the trace
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Angles in measurement order
    pub fn angles(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.angle).collect()
    }

    /// Readings in measurement order
    pub fn readings(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.reading).collect()
    }
}

impl FromIterator<Sample> for Trace {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Per-phase breakdown of a search run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDiagnostics {
    pub phases: Vec<PhaseSummary>,
}

impl SearchDiagnostics {
    /// Number of sample requests that failed across all phases
    pub fn failed_measurements(&self) -> usize {
        self.phases.iter().map(|p| p.failed).sum()
    }
}

/// Result of running a search strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Every successful sample across all phases
    pub trace: Trace,
    /// Peak estimate of the final phase
    pub estimated_peak_angle: f64,
    /// Number of samples in the trace
    pub total_measurements: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<SearchDiagnostics>,
}

impl SearchOutcome {
    pub fn new(
        trace: Trace,
        estimated_peak_angle: f64,
        diagnostics: Option<SearchDiagnostics>,
    ) -> Self {
        Self {
            total_measurements: trace.len(),
            trace,
            estimated_peak_angle,
            diagnostics,
        }
    }
}

/// Strategy for deciding where to sample next
pub trait SearchStrategy {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Sample the device and estimate the peak angle
    ///
    /// Individual measurement failures are logged and skipped; this
    /// operation itself never fails.
    fn search(&self, sampler: &mut dyn Sampler) -> SearchOutcome;
}

/// Selectable strategy variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategyKind {
    /// Four progressively narrower scans
    #[default]
    CoarseToFine,
    /// Single full-domain pass at a fixed step
    Uniform,
}

impl SearchStrategyKind {
    /// Build the strategy configured by `config`
    pub fn build(&self, config: &SearchConfig) -> Box<dyn SearchStrategy> {
        match self {
            SearchStrategyKind::CoarseToFine => Box::new(CoarseToFineSearch::new(config.clone())),
            SearchStrategyKind::Uniform => Box::new(UniformScan::new(config.uniform_step)),
        }
    }
}
