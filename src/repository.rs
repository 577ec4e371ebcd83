//! The in-memory model of one loaded recording.
//!
//! A [`ScanRepository`] is filled once per [`ScanRepository::load`] and read many
//! times afterwards. Scans are never modified once stored.
use log::{debug, info, warn};

use crate::chromatogram::{Chromatogram, ChromatogramType};
use crate::io::{LoadError, ScanRecordSource};
use crate::scan::{MSLevel, Scan};

/// Counts describing what a successful [`ScanRepository::load`] kept and dropped
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// The number of records the source produced
    pub records_read: usize,
    pub ms1_scans: usize,
    pub ms2_scans: usize,
    /// Records dropped because they were missing required data
    pub skipped: usize,
}

/// Holds the TIC and BPC series, the MS1 index and the MS2 list of one recording.
///
/// Entry *i* of [`ScanRepository::tic`], [`ScanRepository::bpc`] and
/// [`ScanRepository::ms1_scans`] always describes the same survey scan.
#[derive(Debug, Clone)]
pub struct ScanRepository {
    source_name: Option<String>,
    tic: Chromatogram,
    bpc: Chromatogram,
    ms1_index: Vec<Scan>,
    ms2_list: Vec<Scan>,
    chronological: bool,
}

impl Default for ScanRepository {
    fn default() -> Self {
        Self {
            source_name: None,
            tic: Chromatogram::new(ChromatogramType::TotalIonCurrent),
            bpc: Chromatogram::new(ChromatogramType::BasePeak),
            ms1_index: Vec::new(),
            ms2_list: Vec::new(),
            chronological: true,
        }
    }
}

impl ScanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current contents with the recording read from `source`.
    ///
    /// Prior state is always discarded first. Records missing an MS level,
    /// a retention time, or either data array are skipped. If the source cannot
    /// be opened or fails while streaming, the repository is left empty and the
    /// error is returned.
    pub fn load<S: ScanRecordSource>(&mut self, source: S) -> Result<LoadSummary, LoadError> {
        self.reset();
        let name = source.source_name();

        let records = match source.open_records() {
            Ok(records) => records,
            Err(err) => {
                warn!("Failed to open recording: {err}");
                return Err(err);
            }
        };

        let mut summary = LoadSummary::default();
        for (i, record) in records.enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!("Recording stream failed after {i} records: {err}");
                    self.reset();
                    return Err(err);
                }
            };
            summary.records_read += 1;
            match Scan::from_record(i, record) {
                Ok(scan) => self.push_scan(scan),
                Err(defect) => {
                    debug!("Skipping record {i}: {defect}");
                    summary.skipped += 1;
                }
            }
        }

        summary.ms1_scans = self.ms1_index.len();
        summary.ms2_scans = self.ms2_list.len();
        if !self.chronological {
            warn!("MS1 scans are not in chronological order, retention time lookups will be linear");
        }
        info!(
            "Loaded {} MS1 and {} MS2 scans from {} records ({} skipped){}",
            summary.ms1_scans,
            summary.ms2_scans,
            summary.records_read,
            summary.skipped,
            name.as_deref()
                .map(|n| format!(" of {n}"))
                .unwrap_or_default()
        );
        self.source_name = name;
        Ok(summary)
    }

    fn push_scan(&mut self, scan: Scan) {
        match scan.level() {
            MSLevel::MS1 => {
                let rt = scan.retention_time();
                if let Some(last) = self.ms1_index.last() {
                    if last.retention_time() > rt {
                        self.chronological = false;
                    }
                }
                self.tic.push(rt, scan.total_ion_current());
                self.bpc.push(rt, scan.base_peak_intensity());
                self.ms1_index.push(scan);
            }
            MSLevel::MS2 => {
                self.ms2_list.push(scan);
            }
        }
    }

    /// Discard everything, returning to the empty state
    pub fn reset(&mut self) {
        self.source_name = None;
        self.tic.clear();
        self.bpc.clear();
        self.ms1_index.clear();
        self.ms2_list.clear();
        self.chronological = true;
    }

    pub fn has_data(&self) -> bool {
        !self.tic.is_empty()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn tic(&self) -> &Chromatogram {
        &self.tic
    }

    pub fn bpc(&self) -> &Chromatogram {
        &self.bpc
    }

    pub fn ms1_scans(&self) -> &[Scan] {
        &self.ms1_index
    }

    pub fn ms2_scans(&self) -> &[Scan] {
        &self.ms2_list
    }

    pub fn ms1(&self, index: usize) -> Option<&Scan> {
        self.ms1_index.get(index)
    }

    pub fn ms2(&self, index: usize) -> Option<&Scan> {
        self.ms2_list.get(index)
    }

    /// The MS1 scan shown before any interaction, the first one read
    pub fn default_ms1(&self) -> Option<&Scan> {
        self.ms1_index.first()
    }

    /// Whether the MS1 retention times arrived in non-decreasing order
    pub fn is_chronological(&self) -> bool {
        self.chronological
    }

    /// The earliest and latest MS1 retention time
    pub fn retention_time_extent(&self) -> Option<(f64, f64)> {
        if self.chronological {
            let times = self.tic.time();
            Some((*times.first()?, *times.last()?))
        } else {
            self.tic.time_extent()
        }
    }

    /// The position in [`ScanRepository::ms1_scans`] of the scan closest in time to `rt`.
    ///
    /// On equal distances the lowest position wins. A NaN query resolves to the
    /// first scan. Returns `None` if there are no MS1 scans.
    pub fn nearest_ms1_index(&self, rt: f64) -> Option<usize> {
        let (lo, hi) = self.retention_time_extent()?;
        if rt.is_nan() {
            return Some(0);
        }
        // Out-of-range queries have the same nearest scan as the closest bound
        let rt = rt.clamp(lo, hi);
        let index = if self.chronological {
            nearest_sorted(self.tic.time(), rt)
        } else {
            nearest_linear(self.tic.time(), rt)
        };
        debug!("Nearest MS1 scan to {rt} is #{index}");
        Some(index)
    }

    /// The MS1 scan closest in time to `rt`, see [`ScanRepository::nearest_ms1_index`]
    pub fn nearest_ms1(&self, rt: f64) -> Option<&Scan> {
        self.nearest_ms1_index(rt)
            .and_then(|i| self.ms1_index.get(i))
    }
}

fn nearest_linear(times: &[f64], rt: f64) -> usize {
    let mut best = 0;
    let mut best_err = f64::INFINITY;
    for (i, t) in times.iter().enumerate() {
        let err = (t - rt).abs();
        if err < best_err {
            best_err = err;
            best = i;
        }
    }
    best
}

/// `times` must be non-empty and sorted. `rt` must lie within its bounds.
fn nearest_sorted(times: &[f64], rt: f64) -> usize {
    let after = times.partition_point(|t| *t < rt);
    if after == 0 {
        return 0;
    }
    let before = after - 1;
    let pick = if after == times.len() || rt - times[before] <= times[after] - rt {
        before
    } else {
        return after;
    };
    // Walk back to the first of a run of identical times
    let t = times[pick];
    times[..pick].partition_point(|x| *x < t)
}
