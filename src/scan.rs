use std::fmt;

use mzpeaks::CentroidPeak;

use crate::io::ScanRecord;
use crate::utils::{format_mz, format_rt};

/// The MS exponentiation levels a recording is browsed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MSLevel {
    /// A survey scan over the whole ion population
    MS1,
    /// A fragment scan of an isolated precursor
    MS2,
}

impl MSLevel {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::MS1),
            2 => Some(Self::MS2),
            _ => None,
        }
    }
}

/// Reasons a [`ScanRecord`] cannot become a [`Scan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDefect {
    MissingLevel,
    UnsupportedLevel(u8),
    MissingRetentionTime,
    MissingMZArray,
    MissingIntensityArray,
    ArrayLengthMismatch { mz: usize, intensity: usize },
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLevel => write!(f, "no MS level"),
            Self::UnsupportedLevel(level) => write!(f, "unsupported MS level {level}"),
            Self::MissingRetentionTime => write!(f, "no readable retention time"),
            Self::MissingMZArray => write!(f, "no m/z array"),
            Self::MissingIntensityArray => write!(f, "no intensity array"),
            Self::ArrayLengthMismatch { mz, intensity } => write!(
                f,
                "m/z array length {mz} does not match intensity array length {intensity}"
            ),
        }
    }
}

/// One acquisition, immutable once built.
///
/// `mz` and `intensity` are always the same length, which is checked when the
/// scan is built from a [`ScanRecord`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scan {
    index: usize,
    level: MSLevel,
    retention_time: f64,
    mz: Vec<f64>,
    intensity: Vec<f32>,
    precursor_mz: Option<f64>,
}

impl Scan {
    /// Validate `record`, which was the `index`-th record of its source.
    ///
    /// A precursor m/z on a survey scan is dropped.
    pub fn from_record(index: usize, record: ScanRecord) -> Result<Self, RecordDefect> {
        let level = record.ms_level.ok_or(RecordDefect::MissingLevel)?;
        let level = MSLevel::from_level(level).ok_or(RecordDefect::UnsupportedLevel(level))?;
        let retention_time = record
            .retention_time
            .filter(|t| t.is_finite())
            .ok_or(RecordDefect::MissingRetentionTime)?;
        let mz = record.mz_array.ok_or(RecordDefect::MissingMZArray)?;
        let intensity = record
            .intensity_array
            .ok_or(RecordDefect::MissingIntensityArray)?;
        if mz.len() != intensity.len() {
            return Err(RecordDefect::ArrayLengthMismatch {
                mz: mz.len(),
                intensity: intensity.len(),
            });
        }
        let precursor_mz = match level {
            MSLevel::MS1 => None,
            MSLevel::MS2 => record.precursor_mz,
        };
        Ok(Self {
            index,
            level,
            retention_time,
            mz,
            intensity,
            precursor_mz,
        })
    }

    /// The position of this scan's record in the source stream
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn level(&self) -> MSLevel {
        self.level
    }

    /// The scan start time, in minutes
    #[inline]
    pub fn retention_time(&self) -> f64 {
        self.retention_time
    }

    #[inline]
    pub fn mz(&self) -> &[f64] {
        &self.mz
    }

    #[inline]
    pub fn intensity(&self) -> &[f32] {
        &self.intensity
    }

    #[inline]
    pub fn precursor_mz(&self) -> Option<f64> {
        self.precursor_mz
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// The sum of all intensities, accumulated in double precision
    pub fn total_ion_current(&self) -> f64 {
        self.intensity.iter().map(|i| *i as f64).sum()
    }

    /// The most intense point of the scan. The first occurrence wins on ties.
    pub fn base_peak(&self) -> Option<CentroidPeak> {
        let mut best: Option<usize> = None;
        for (i, inten) in self.intensity.iter().enumerate() {
            match best {
                Some(j) if self.intensity[j] >= *inten => {}
                _ => best = Some(i),
            }
        }
        best.map(|i| CentroidPeak::new(self.mz[i], self.intensity[i], i as u32))
    }

    /// The base peak intensity, or 0 for an empty scan
    pub fn base_peak_intensity(&self) -> f64 {
        self.base_peak()
            .map(|p| p.intensity as f64)
            .unwrap_or_default()
    }

    /// The smallest and largest m/z in the scan
    pub fn mz_extent(&self) -> Option<(f64, f64)> {
        let first = *self.mz.first()?;
        Some(
            self.mz
                .iter()
                .fold((first, first), |(lo, hi), mz| (lo.min(*mz), hi.max(*mz))),
        )
    }
}

impl fmt::Display for Scan {
    /// `RT=1.25 min • Prec=445.1200`. Scan lists prefix this with the scan's
    /// position in the list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RT={} min", format_rt(self.retention_time))?;
        if self.level == MSLevel::MS2 {
            match self.precursor_mz {
                Some(mz) => write!(f, " • Prec={}", format_mz(mz))?,
                None => write!(f, " • Prec=n/a")?,
            }
        }
        Ok(())
    }
}
