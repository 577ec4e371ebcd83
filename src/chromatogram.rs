use std::fmt;

/// The two chromatograms built from the survey scans of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChromatogramType {
    /// Summed intensity per survey scan
    TotalIonCurrent,
    /// Maximum intensity per survey scan
    BasePeak,
}

impl fmt::Display for ChromatogramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalIonCurrent => f.write_str("Total Ion Chromatogram (TIC)"),
            Self::BasePeak => f.write_str("Base Peak Chromatogram (BPC)"),
        }
    }
}

/// An intensity-over-time series with one point per survey scan, in scan arrival order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromatogram {
    chromatogram_type: ChromatogramType,
    time: Vec<f64>,
    intensity: Vec<f64>,
}

impl Chromatogram {
    pub fn new(chromatogram_type: ChromatogramType) -> Self {
        Self {
            chromatogram_type,
            time: Vec::new(),
            intensity: Vec::new(),
        }
    }

    pub fn chromatogram_type(&self) -> ChromatogramType {
        self.chromatogram_type
    }

    pub fn push(&mut self, time: f64, intensity: f64) {
        self.time.push(time);
        self.intensity.push(intensity);
    }

    pub fn clear(&mut self) {
        self.time.clear();
        self.intensity.clear();
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The retention times, in minutes
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// The earliest and latest retention time over all points, regardless of order
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        extent(&self.time)
    }

    pub fn intensity_extent(&self) -> Option<(f64, f64)> {
        extent(&self.intensity)
    }
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}
