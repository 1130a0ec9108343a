//! Sensitivity of the required sample size to the population size.

use serde::Serialize;
use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use super::calculator::{corrected_size, infinite_population_size, whole_records};
use super::{ConfidenceLevel, MarginOfError, PopulationSize};

/// Required sample size for one population size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub population: u64,
    pub corrected: f64,
    pub sample_size: u64,
}

/// Lazy sequence of [`CurvePoint`]s for populations `1..=N`.
///
/// `n0` is computed once; each point costs a division. Cloning restarts
/// the sequence from where the clone was taken.
#[derive(Debug, Clone)]
pub struct SensitivityCurve {
    n0: f64,
    populations: RangeInclusive<u64>,
}

/// Curve of required sample sizes for every population from 1 to `population`.
pub fn sensitivity_curve(
    population: PopulationSize,
    confidence: ConfidenceLevel,
    margin: MarginOfError,
) -> SensitivityCurve {
    SensitivityCurve {
        n0: infinite_population_size(confidence, margin),
        populations: 1..=population.get(),
    }
}

impl SensitivityCurve {
    /// Point for a single population size.
    pub fn point_at(&self, population: u64) -> CurvePoint {
        let corrected = corrected_size(self.n0, population);
        CurvePoint {
            population,
            corrected,
            sample_size: whole_records(corrected, population),
        }
    }

    /// Largest population on the curve (`N`).
    pub fn max_population(&self) -> u64 {
        *self.populations.end()
    }

    /// At most `max_points` evenly spaced points, always including both ends.
    ///
    /// Returns the whole curve when it is already short enough. Points are
    /// computed directly, so nothing proportional to `N` is allocated.
    pub fn downsample(&self, max_points: usize) -> Vec<CurvePoint> {
        let first = *self.populations.start();
        let last = self.max_population();
        let total = last - first + 1;
        let max_points = max_points.max(2) as u64;

        if total <= max_points {
            return self.clone().collect();
        }

        let span = (last - first) as f64;
        let mut points: Vec<CurvePoint> = Vec::with_capacity(max_points as usize);
        for i in 0..max_points {
            let offset = (span * i as f64 / (max_points - 1) as f64).round() as u64;
            let population = (first + offset).min(last);
            if points.last().map(|p| p.population) != Some(population) {
                points.push(self.point_at(population));
            }
        }
        points
    }
}

impl Iterator for SensitivityCurve {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<CurvePoint> {
        let population = self.populations.next()?;
        Some(self.point_at(population))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.populations.size_hint()
    }
}

impl DoubleEndedIterator for SensitivityCurve {
    fn next_back(&mut self) -> Option<CurvePoint> {
        let population = self.populations.next_back()?;
        Some(self.point_at(population))
    }
}

impl FusedIterator for SensitivityCurve {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::required_sample_size;
    use proptest::prelude::*;

    fn curve(n: u64, c: u64, m: u64) -> SensitivityCurve {
        sensitivity_curve(
            PopulationSize::new(n).unwrap(),
            ConfidenceLevel::try_from(c).unwrap(),
            MarginOfError::new(m).unwrap(),
        )
    }

    #[test]
    fn test_curve_for_default_form() {
        let points: Vec<CurvePoint> = curve(300, 95, 5).collect();

        assert_eq!(points.len(), 300);
        assert_eq!(points[0].population, 1);
        assert_eq!(points[0].sample_size, 1);
        assert_eq!(points[299].population, 300);
        assert_eq!(points[299].sample_size, 169);
    }

    #[test]
    fn test_curve_is_restartable() {
        let c = curve(50, 99, 3);
        let first: Vec<u64> = c.clone().map(|p| p.sample_size).collect();
        let second: Vec<u64> = c.map(|p| p.sample_size).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_curve_reports_exact_length_lazily() {
        let c = curve(500_000, 95, 5);
        assert_eq!(c.size_hint(), (500_000, Some(500_000)));
        assert_eq!(c.max_population(), 500_000);
        assert_eq!(c.clone().next_back().map(|p| p.population), Some(500_000));
    }

    #[test]
    fn test_downsample_keeps_endpoints() {
        let c = curve(100_000, 95, 5);
        let points = c.downsample(400);

        assert!(points.len() <= 400);
        assert_eq!(points.first().map(|p| p.population), Some(1));
        assert_eq!(points.last().map(|p| p.population), Some(100_000));
        assert!(points.windows(2).all(|w| w[0].population < w[1].population));
    }

    #[test]
    fn test_downsample_short_curve_is_whole_curve() {
        let c = curve(20, 90, 10);
        assert_eq!(c.downsample(400).len(), 20);
        assert_eq!(curve(1, 90, 10).downsample(0).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_curve_matches_headline(n in 1u64..3_000, c in prop::sample::select(vec![90u64, 95, 99]), m in 1u64..=10) {
            let points: Vec<CurvePoint> = curve(n, c, m).collect();
            prop_assert_eq!(points.len() as u64, n);

            for (i, p) in points.iter().enumerate() {
                prop_assert_eq!(p.population, i as u64 + 1);
            }

            let headline = required_sample_size(
                PopulationSize::new(n).unwrap(),
                ConfidenceLevel::try_from(c).unwrap(),
                MarginOfError::new(m).unwrap(),
            );
            prop_assert_eq!(points.last().map(|p| p.sample_size), Some(headline));
        }
    }
}
