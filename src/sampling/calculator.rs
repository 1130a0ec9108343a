//! Finite-population sample-size calculation.
//!
//! # Algorithm
//!
//! With critical value `Z`, worst-case proportion `p = 0.5` and margin `E`:
//!
//! ```text
//! n0 = Z² · p · (1 − p) / E²          (infinite population)
//! n  = n0 / (1 + (n0 − 1) / N)        (finite-population correction)
//! ```
//!
//! The reported size is `⌈n⌉`, clamped into `[1, N]`.

use serde::Serialize;

use super::{ConfidenceLevel, MarginOfError, PopulationSize, SizingRequest};

/// Proportion that maximises `p · (1 − p)`; used when the true error rate is unknown.
const WORST_CASE_PROPORTION: f64 = 0.5;

/// Computed answer for one [`SizingRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    #[serde(flatten)]
    pub request: SizingRequest,
    pub z_score: f64,
    /// Sample size for an unbounded population (`n0`).
    pub infinite_population: f64,
    /// Corrected size before rounding.
    pub corrected: f64,
    /// Records to check.
    pub sample_size: u64,
}

impl Estimate {
    /// Share of the population that must be checked, in percent.
    pub fn coverage_percent(&self) -> f64 {
        self.sample_size as f64 / self.request.population.get() as f64 * 100.0
    }
}

/// Sample size required for an effectively infinite population.
pub fn infinite_population_size(confidence: ConfidenceLevel, margin: MarginOfError) -> f64 {
    let z = confidence.z_score();
    let e = margin.proportion();
    let p = WORST_CASE_PROPORTION;
    (z.powi(2) * p * (1.0 - p)) / e.powi(2)
}

/// Apply the finite-population correction to `n0`.
pub(crate) fn corrected_size(n0: f64, population: u64) -> f64 {
    n0 / (1.0 + (n0 - 1.0) / population as f64)
}

/// Round a corrected size up to whole records within `[1, population]`.
pub(crate) fn whole_records(corrected: f64, population: u64) -> u64 {
    // ceil() of a finite positive f64 below u64::MAX; the clamp absorbs float noise at N = 1
    (corrected.ceil() as u64).clamp(1, population)
}

/// Minimum number of records to check out of `population`.
pub fn required_sample_size(
    population: PopulationSize,
    confidence: ConfidenceLevel,
    margin: MarginOfError,
) -> u64 {
    let n0 = infinite_population_size(confidence, margin);
    whole_records(corrected_size(n0, population.get()), population.get())
}

/// Full calculation for a request, including intermediate values.
pub fn estimate(request: &SizingRequest) -> Estimate {
    let n = request.population.get();
    let infinite_population = infinite_population_size(request.confidence, request.margin);
    let corrected = corrected_size(infinite_population, n);

    let result = Estimate {
        request: *request,
        z_score: request.confidence.z_score(),
        infinite_population,
        corrected,
        sample_size: required_sample_size(request.population, request.confidence, request.margin),
    };

    tracing::debug!(
        population = n,
        confidence = request.confidence.percent(),
        margin = request.margin.percent(),
        n0 = infinite_population,
        sample_size = result.sample_size,
        "computed sample size"
    );

    result
}
