//! Automatic peak detection on a single 1-D signal.
//!
//! A sample is reported as a peak when it is a local maximum, reaches a height
//! relative to the signal's maximum, is the tallest within a minimum separation
//! window, and stands out from its surrounding valleys by a minimum prominence.
//! The separation window scales with the length of the signal, so the same
//! percent threshold behaves comparably on a short chromatogram and a long
//! profile spectrum.
use std::cmp::Ordering;

use log::debug;
use num_traits::Float;
use thiserror::Error;

/// Errors raised when the signal handed to a [`PeakDetector`] is malformed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("x array length {x} does not match y array length {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("The percent threshold must be in (0, 100], got {0}")]
    Threshold(f64),
    #[error("The signal contains a non-finite value at index {0}")]
    NonFinite(usize),
}

/// The constants driving peak detection
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakDetectionParams {
    /// The minimum peak height, as a percentage of the signal's maximum
    pub percent_threshold: f64,
    /// Signals shorter than this never contain peaks
    pub min_points: usize,
    /// The minimum separation between peaks is the signal length divided by this,
    /// but never less than one sample
    pub separation_divisor: usize,
    /// The minimum prominence, as a fraction of the signal's dynamic range
    pub prominence_fraction: f64,
}

impl Default for PeakDetectionParams {
    fn default() -> Self {
        Self {
            percent_threshold: 5.0,
            min_points: 5,
            separation_divisor: 200,
            prominence_fraction: 0.05,
        }
    }
}

impl PeakDetectionParams {
    pub fn with_threshold(percent_threshold: f64) -> Self {
        Self {
            percent_threshold,
            ..Default::default()
        }
    }

    /// The minimum separation between peaks for a signal of `n` samples
    pub fn min_separation(&self, n: usize) -> usize {
        (n / self.separation_divisor.max(1)).max(1)
    }
}

/// A peak reported by [`PeakDetector::detect_points`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedPeak {
    /// The sample index of the peak's apex
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PeakDetector {
    pub params: PeakDetectionParams,
}

impl PeakDetector {
    pub fn new(params: PeakDetectionParams) -> Self {
        Self { params }
    }

    pub fn with_threshold(percent_threshold: f64) -> Self {
        Self::new(PeakDetectionParams::with_threshold(percent_threshold))
    }

    /// Find the peaks of the signal `y` sampled at `x`, returning their indices in
    /// ascending order.
    ///
    /// Signals shorter than [`PeakDetectionParams::min_points`] yield no peaks.
    pub fn detect<T: Float>(&self, x: &[f64], y: &[T]) -> Result<Vec<usize>, InvalidInputError> {
        if x.len() != y.len() {
            return Err(InvalidInputError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if y.len() < self.params.min_points {
            return Ok(Vec::new());
        }
        let percent = self.params.percent_threshold;
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(InvalidInputError::Threshold(percent));
        }

        let mut values = Vec::with_capacity(y.len());
        for (i, v) in y.iter().enumerate() {
            match v.to_f64() {
                Some(v) if v.is_finite() => values.push(v),
                _ => return Err(InvalidInputError::NonFinite(i)),
            }
        }

        let (min_y, max_y) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let height = max_y * percent / 100.0;
        let separation = self.params.min_separation(values.len());
        let prominence = (max_y - min_y) * self.params.prominence_fraction;

        let mut peaks = local_maxima(&values);
        let n_maxima = peaks.len();
        peaks.retain(|i| values[*i] >= height);
        let peaks = select_by_separation(&values, peaks, separation);
        let peaks: Vec<usize> = peaks
            .into_iter()
            .filter(|i| peak_prominence(&values, *i) >= prominence)
            .collect();

        debug!(
            "Detected {} peaks from {n_maxima} local maxima (height >= {height}, separation {separation}, prominence >= {prominence})",
            peaks.len()
        );
        Ok(peaks)
    }

    /// As [`PeakDetector::detect`], pairing each index with its coordinates
    pub fn detect_points<T: Float>(
        &self,
        x: &[f64],
        y: &[T],
    ) -> Result<Vec<DetectedPeak>, InvalidInputError> {
        let peaks = self.detect(x, y)?;
        Ok(peaks
            .into_iter()
            .map(|index| DetectedPeak {
                index,
                x: x[index],
                y: y[index].to_f64().unwrap_or_default(),
            })
            .collect())
    }
}

/// Find the peaks of `y` sampled at `x` with the default parameters and the
/// given percent threshold. See [`PeakDetector::detect`].
pub fn detect_peaks<T: Float>(
    x: &[f64],
    y: &[T],
    percent_threshold: f64,
) -> Result<Vec<usize>, InvalidInputError> {
    PeakDetector::with_threshold(percent_threshold).detect(x, y)
}

/// Samples higher than their left neighbor and than the next differing sample on
/// their right. A flat top is reported once, at its middle sample (rounding down).
/// The first and last samples are never maxima.
fn local_maxima(y: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    let n = y.len();
    if n < 3 {
        return maxima;
    }
    let last = n - 1;
    let mut i = 1;
    while i < last {
        if y[i - 1] < y[i] {
            let mut ahead = i + 1;
            while ahead < last && y[ahead] == y[i] {
                ahead += 1;
            }
            if y[ahead] < y[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Keep the tallest peaks, discarding any peak closer than `separation` samples
/// to an already kept, taller one. Among equal heights the later peak is kept.
fn select_by_separation(y: &[f64], peaks: Vec<usize>, separation: usize) -> Vec<usize> {
    if separation <= 1 || peaks.len() < 2 {
        return peaks;
    }
    let n = peaks.len();
    let mut priority: Vec<usize> = (0..n).collect();
    priority.sort_by(|a, b| {
        y[peaks[*a]]
            .partial_cmp(&y[peaks[*b]])
            .unwrap_or(Ordering::Equal)
    });

    let mut keep = vec![true; n];
    for &j in priority.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < separation {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < separation {
            keep[k] = false;
            k += 1;
        }
    }
    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(p))
        .collect()
}

/// The height of `y[peak]` above the higher of its two bounding valleys. Each valley
/// is the lowest sample between the peak and the first strictly higher sample on
/// that side, or the signal's edge.
fn peak_prominence(y: &[f64], peak: usize) -> f64 {
    let top = y[peak];

    let mut left_min = top;
    for v in y[..=peak].iter().rev() {
        if *v > top {
            break;
        }
        left_min = left_min.min(*v);
    }

    let mut right_min = top;
    for v in y[peak..].iter() {
        if *v > top {
            break;
        }
        right_min = right_min.min(*v);
    }

    top - left_min.max(right_min)
}
