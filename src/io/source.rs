use std::io;
use std::iter::FusedIterator;
use std::vec;

use thiserror::Error;

/// One scan as handed over by a parsing collaborator, before any validation.
///
/// Every field is optional because a recording may contain records that are
/// partially unreadable. The [`ScanRepository`](crate::repository::ScanRepository)
/// decides which records are usable.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanRecord {
    /// The MS exponentiation level
    pub ms_level: Option<u8>,
    /// The scan start time, in minutes
    pub retention_time: Option<f64>,
    pub mz_array: Option<Vec<f64>>,
    pub intensity_array: Option<Vec<f32>>,
    /// The selected ion m/z of the first precursor, if the record describes one
    pub precursor_mz: Option<f64>,
}

impl ScanRecord {
    /// Build a complete MS1 record
    pub fn ms1(retention_time: f64, mz_array: Vec<f64>, intensity_array: Vec<f32>) -> Self {
        Self {
            ms_level: Some(1),
            retention_time: Some(retention_time),
            mz_array: Some(mz_array),
            intensity_array: Some(intensity_array),
            precursor_mz: None,
        }
    }

    /// Build a complete MS2 record
    pub fn ms2(
        retention_time: f64,
        precursor_mz: Option<f64>,
        mz_array: Vec<f64>,
        intensity_array: Vec<f32>,
    ) -> Self {
        Self {
            ms_level: Some(2),
            retention_time: Some(retention_time),
            mz_array: Some(mz_array),
            intensity_array: Some(intensity_array),
            precursor_mz,
        }
    }
}

/// Errors that abort loading a recording as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be opened at all
    #[error("Failed to open recording {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },
    /// The source was opened, but reading stopped partway through
    #[error("Failed to read recording after {records_read} records: {source}")]
    Stream {
        records_read: usize,
        #[source]
        source: io::Error,
    },
    /// Any other failure reported by the parsing collaborator
    #[error("The recording source reported an error: {0}")]
    Source(String),
}

impl From<LoadError> for io::Error {
    fn from(value: LoadError) -> Self {
        match value {
            LoadError::Open { source, .. } => source,
            LoadError::Stream { source, .. } => source,
            LoadError::Source(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
        }
    }
}

/// A parsing collaborator producing [`ScanRecord`]s for one recording.
///
/// The record stream is consumed exactly once per load. Yielding an `Err` item
/// aborts the load, the same as failing in [`ScanRecordSource::open_records`].
pub trait ScanRecordSource {
    type Records: Iterator<Item = Result<ScanRecord, LoadError>>;

    /// A human readable name for the source, e.g. a file name
    fn source_name(&self) -> Option<String> {
        None
    }

    /// Open the source and return its record stream
    fn open_records(self) -> Result<Self::Records, LoadError>;
}

/// An infallible iterator of records adapted into the [`ScanRecordSource`] item type
#[derive(Debug)]
pub struct InfallibleRecords<I: Iterator<Item = ScanRecord>> {
    inner: I,
}

impl<I: Iterator<Item = ScanRecord>> Iterator for InfallibleRecords<I> {
    type Item = Result<ScanRecord, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: FusedIterator<Item = ScanRecord>> FusedIterator for InfallibleRecords<I> {}

impl ScanRecordSource for Vec<ScanRecord> {
    type Records = InfallibleRecords<vec::IntoIter<ScanRecord>>;

    fn open_records(self) -> Result<Self::Records, LoadError> {
        Ok(InfallibleRecords {
            inner: self.into_iter(),
        })
    }
}

/// A named, in-memory recording. Mostly useful for tests and for callers that
/// already hold decoded scans.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    pub name: Option<String>,
    pub records: Vec<ScanRecord>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, records: Vec<ScanRecord>) -> Self {
        Self {
            name: Some(name.into()),
            records,
        }
    }
}

impl ScanRecordSource for InMemorySource {
    type Records = InfallibleRecords<vec::IntoIter<ScanRecord>>;

    fn source_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn open_records(self) -> Result<Self::Records, LoadError> {
        self.records.open_records()
    }
}
