//! Defuzzification: collapsing an aggregated fuzzy set into one crisp value.
//!
//! Every method works on a sampled set (universe points paired with
//! membership degrees) and returns `None` when the set is zero everywhere;
//! the caller turns that into a "no rule fired" error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Defuzzification method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    /// Center of gravity of the piecewise-linear curve through the samples.
    ///
    /// Each interval between neighbouring samples is treated as a trapezoid
    /// and the result is the area-weighted mean of their centroids. For
    /// triangular sets whose corners fall on sample points this equals the
    /// continuous centroid.
    #[default]
    Centroid,

    /// Sample-weighted mean: `sum(x * mu) / sum(mu)` over the universe points.
    WeightedMean,

    /// Point splitting the area under the curve into two equal halves.
    Bisector,

    /// Mean of the points where membership is maximal.
    MeanOfMaximum,

    /// Smallest point where membership is maximal.
    SmallestOfMaximum,

    /// Largest point where membership is maximal.
    LargestOfMaximum,
}

impl Defuzzification {
    /// Returns a short stable identifier suitable for logging/debugging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::WeightedMean => "weighted_mean",
            Self::Bisector => "bisector",
            Self::MeanOfMaximum => "mean_of_maximum",
            Self::SmallestOfMaximum => "smallest_of_maximum",
            Self::LargestOfMaximum => "largest_of_maximum",
        }
    }

    /// Defuzzifies a sampled set.
    ///
    /// `points` and `membership` must have the same length. Returns `None`
    /// if the inputs are empty, mismatched, or the membership is zero
    /// everywhere.
    #[must_use]
    pub fn defuzzify(&self, points: &[f64], membership: &[f64]) -> Option<f64> {
        if points.is_empty() || points.len() != membership.len() {
            return None;
        }
        if membership.iter().all(|&m| m <= 0.0) {
            return None;
        }
        match self {
            Self::Centroid => centroid(points, membership),
            Self::WeightedMean => weighted_mean(points, membership),
            Self::Bisector => bisector(points, membership),
            Self::MeanOfMaximum => {
                let maxima = maxima(points, membership);
                #[allow(clippy::cast_precision_loss)]
                let n = maxima.len() as f64;
                Some(maxima.iter().sum::<f64>() / n)
            }
            Self::SmallestOfMaximum => maxima(points, membership).first().copied(),
            Self::LargestOfMaximum => maxima(points, membership).last().copied(),
        }
    }
}

impl fmt::Display for Defuzzification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn weighted_mean(points: &[f64], membership: &[f64]) -> Option<f64> {
    let (moment, mass) = points
        .iter()
        .zip(membership)
        .fold((0.0_f64, 0.0_f64), |(m, s), (&x, &mu)| (m + x * mu, s + mu));
    (mass > 0.0).then(|| moment / mass)
}

fn centroid(points: &[f64], membership: &[f64]) -> Option<f64> {
    if points.len() == 1 {
        return Some(points[0]);
    }

    let mut moment = 0.0_f64;
    let mut area = 0.0_f64;
    for (x, mu) in points.windows(2).zip(membership.windows(2)) {
        let (x1, x2, y1, y2) = (x[0], x[1], mu[0], mu[1]);
        let width = x2 - x1;
        if y1 == 0.0 && y2 == 0.0 {
            continue;
        }
        // Centroid of the trapezoid under the segment.
        let seg_area = 0.5 * width * (y1 + y2);
        let seg_centroid = x1 + width * (y1 + 2.0 * y2) / (3.0 * (y1 + y2));
        moment += seg_centroid * seg_area;
        area += seg_area;
    }

    (area > 0.0).then(|| moment / area)
}

fn bisector(points: &[f64], membership: &[f64]) -> Option<f64> {
    if points.len() == 1 {
        return Some(points[0]);
    }

    let segments: Vec<f64> = points
        .windows(2)
        .zip(membership.windows(2))
        .map(|(x, mu)| 0.5 * (x[1] - x[0]) * (mu[0] + mu[1]))
        .collect();
    let total: f64 = segments.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let half = total / 2.0;
    let mut acc = 0.0_f64;
    for (i, &seg) in segments.iter().enumerate() {
        if acc + seg < half {
            acc += seg;
            continue;
        }
        let (x1, x2) = (points[i], points[i + 1]);
        let (y1, y2) = (membership[i], membership[i + 1]);
        let width = x2 - x1;
        let remaining = half - acc;
        // Area from x1 to x1 + t is y1*t + slope*t^2/2.
        let slope = (y2 - y1) / width;
        let t = if slope.abs() < f64::EPSILON {
            remaining / y1
        } else {
            (-y1 + (y1 * y1 + 2.0 * slope * remaining).max(0.0).sqrt()) / slope
        };
        return Some(x1 + t.clamp(0.0, width));
    }

    points.last().copied()
}

fn maxima(points: &[f64], membership: &[f64]) -> Vec<f64> {
    let peak = membership.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    points
        .iter()
        .zip(membership)
        .filter(|&(_, &mu)| mu == peak)
        .map(|(&x, _)| x)
        .collect()
}
