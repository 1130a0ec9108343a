//! Sample-size estimation for auditing a finite population of records.
//!
//! Given a population of `N` records, a confidence level and a margin of
//! error, this module answers "how many records must be checked?" using the
//! normal approximation for a binomial proportion with `p = 0.5` and a
//! finite-population correction.
//!
//! Inputs are validated once, when the domain types below are built.
//! The calculator itself has no error path.

mod calculator;
mod curve;
mod error;

pub use calculator::{
    estimate, infinite_population_size, required_sample_size, Estimate,
};
pub use curve::{sensitivity_curve, CurvePoint, SensitivityCurve};
pub use error::{Result, SampleSizeError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Two-tailed critical values under the normal approximation, in variant order.
const Z_SCORES: [(ConfidenceLevel, f64); 3] = [
    (ConfidenceLevel::P90, 1.645),
    (ConfidenceLevel::P95, 1.96),
    (ConfidenceLevel::P99, 2.576),
];

/// Supported confidence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u8")]
pub enum ConfidenceLevel {
    P90,
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    /// All levels in ascending order.
    pub const ALL: [ConfidenceLevel; 3] = [Self::P90, Self::P95, Self::P99];

    /// Confidence as a whole percentage (90, 95 or 99).
    pub fn percent(self) -> u8 {
        match self {
            Self::P90 => 90,
            Self::P95 => 95,
            Self::P99 => 99,
        }
    }

    /// Critical value (Z-score) for this level.
    pub fn z_score(self) -> f64 {
        Z_SCORES[self as usize].1
    }

    /// Next level up, wrapping from 99 back to 90.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Next level down, wrapping from 90 to 99.
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl TryFrom<u64> for ConfidenceLevel {
    type Error = SampleSizeError;

    fn try_from(value: u64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| u64::from(level.percent()) == value)
            .ok_or(SampleSizeError::InvalidConfidenceLevel(value))
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> Self {
        level.percent()
    }
}

impl FromStr for ConfidenceLevel {
    type Err = SampleSizeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('%');
        let value = parse_whole(trimmed, "confidence level")?;
        Self::try_from(value)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Acceptable error, as a whole percentage of the population proportion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u8")]
pub struct MarginOfError(u8);

impl MarginOfError {
    /// Range the calculator accepts.
    pub const RANGE: RangeInclusive<u8> = 1..=100;

    /// Range offered by the interactive slider.
    pub const SLIDER_RANGE: RangeInclusive<u8> = 1..=10;

    pub fn new(percent: u64) -> Result<Self> {
        let (min, max) = (*Self::RANGE.start(), *Self::RANGE.end());
        if percent < u64::from(min) || percent > u64::from(max) {
            return Err(SampleSizeError::InvalidMarginOfError { value: percent, min, max });
        }
        Ok(Self(percent as u8))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Margin as a proportion `E` in `(0, 1]`.
    pub fn proportion(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Whether the value lies inside the slider range.
    pub fn within_slider(self) -> bool {
        Self::SLIDER_RANGE.contains(&self.0)
    }

    /// Move the slider by `delta`, saturating at its ends.
    pub fn step(self, delta: i8) -> Self {
        let (lo, hi) = (*Self::SLIDER_RANGE.start(), *Self::SLIDER_RANGE.end());
        let moved = (i16::from(self.0) + i16::from(delta)).clamp(i16::from(lo), i16::from(hi));
        Self(moved as u8)
    }
}

impl Default for MarginOfError {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u64> for MarginOfError {
    type Error = SampleSizeError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MarginOfError> for u8 {
    fn from(margin: MarginOfError) -> Self {
        margin.0
    }
}

impl FromStr for MarginOfError {
    type Err = SampleSizeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('%');
        Self::new(parse_whole(trimmed, "margin of error")?)
    }
}

impl fmt::Display for MarginOfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Total number of records in the population (`N >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PopulationSize(u64);

impl PopulationSize {
    pub fn new(records: u64) -> Result<Self> {
        if records == 0 {
            return Err(SampleSizeError::InvalidPopulationSize(records));
        }
        Ok(Self(records))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for PopulationSize {
    fn default() -> Self {
        Self(300)
    }
}

impl TryFrom<u64> for PopulationSize {
    type Error = SampleSizeError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PopulationSize> for u64 {
    fn from(population: PopulationSize) -> Self {
        population.0
    }
}

impl FromStr for PopulationSize {
    type Err = SampleSizeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(parse_whole(s.trim(), "population size")?)
    }
}

impl fmt::Display for PopulationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fully validated set of calculator inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizingRequest {
    pub population: PopulationSize,
    pub confidence: ConfidenceLevel,
    pub margin: MarginOfError,
}

impl SizingRequest {
    pub fn new(population: PopulationSize, confidence: ConfidenceLevel, margin: MarginOfError) -> Self {
        Self { population, confidence, margin }
    }

    /// Validate raw integers into a request.
    #[allow(dead_code)]
    pub fn from_raw(population: u64, confidence: u64, margin: u64) -> Result<Self> {
        Ok(Self {
            population: PopulationSize::new(population)?,
            confidence: ConfidenceLevel::try_from(confidence)?,
            margin: MarginOfError::new(margin)?,
        })
    }
}

fn parse_whole(input: &str, field: &'static str) -> Result<u64> {
    input.parse::<u64>().map_err(|_| SampleSizeError::Parse {
        field,
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_table_covers_every_level() {
        assert_eq!(ConfidenceLevel::P90.z_score(), 1.645);
        assert_eq!(ConfidenceLevel::P95.z_score(), 1.96);
        assert_eq!(ConfidenceLevel::P99.z_score(), 2.576);
        for (i, (level, _)) in Z_SCORES.iter().enumerate() {
            assert_eq!(*level as usize, i);
        }
    }

    #[test]
    fn test_confidence_rejects_unknown_levels() {
        assert_eq!(ConfidenceLevel::try_from(95).unwrap(), ConfidenceLevel::P95);
        assert_eq!(
            ConfidenceLevel::try_from(80),
            Err(SampleSizeError::InvalidConfidenceLevel(80))
        );
        assert_eq!("99%".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::P99);
        assert!(matches!(
            "ninety".parse::<ConfidenceLevel>(),
            Err(SampleSizeError::Parse { .. })
        ));
    }

    #[test]
    fn test_confidence_cycles() {
        assert_eq!(ConfidenceLevel::P99.next(), ConfidenceLevel::P90);
        assert_eq!(ConfidenceLevel::P90.prev(), ConfidenceLevel::P99);
        assert_eq!(ConfidenceLevel::P90.next().next(), ConfidenceLevel::P99);
    }

    #[test]
    fn test_margin_bounds() {
        assert!(MarginOfError::new(0).is_err());
        assert!(MarginOfError::new(101).is_err());
        assert_eq!(MarginOfError::new(100).unwrap().proportion(), 1.0);
        assert!(!MarginOfError::new(25).unwrap().within_slider());
        assert_eq!("7".parse::<MarginOfError>().unwrap().percent(), 7);
    }

    #[test]
    fn test_margin_slider_saturates() {
        let m = MarginOfError::new(10).unwrap();
        assert_eq!(m.step(1).percent(), 10);
        assert_eq!(MarginOfError::new(1).unwrap().step(-1).percent(), 1);
        assert_eq!(MarginOfError::default().step(-2).percent(), 3);
    }

    #[test]
    fn test_population_rejects_zero() {
        assert_eq!(PopulationSize::new(0), Err(SampleSizeError::InvalidPopulationSize(0)));
        assert_eq!(" 300 ".parse::<PopulationSize>().unwrap().get(), 300);
        assert!("-4".parse::<PopulationSize>().is_err());
    }

    #[test]
    fn test_request_from_raw() {
        let req = SizingRequest::from_raw(1000, 90, 10).unwrap();
        assert_eq!(req.population.get(), 1000);
        assert_eq!(req.confidence, ConfidenceLevel::P90);
        assert_eq!(req.margin.percent(), 10);

        assert!(matches!(
            SizingRequest::from_raw(1000, 91, 10),
            Err(SampleSizeError::InvalidConfidenceLevel(91))
        ));
    }

    #[test]
    fn test_defaults_match_form() {
        let req = SizingRequest::default();
        assert_eq!(req.population.get(), 300);
        assert_eq!(req.confidence.percent(), 95);
        assert_eq!(req.margin.percent(), 5);
    }

    #[test]
    fn test_request_serializes_as_integers() {
        let req = SizingRequest::default();
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["population"], 300);
        assert_eq!(json["confidence"], 95);
        assert_eq!(json["margin"], 5);

        let bad: std::result::Result<SizingRequest, _> =
            serde_json::from_str(r#"{"population":0,"confidence":95,"margin":5}"#);
        assert!(bad.is_err());
    }
}
