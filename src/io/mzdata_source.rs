//! Read recordings with [`mzdata`], which infers the file format (mzML, MGF, ...)
//! from the file's contents.
//!
//! **Requires the `mzdata` feature**
#![cfg(feature = "mzdata")]
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mzdata::io::SpectrumSource;
use mzdata::prelude::*;
use mzdata::spectrum::MultiLayerSpectrum;
use mzdata::MZReader;

use super::source::{LoadError, ScanRecord, ScanRecordSource};

impl From<&MultiLayerSpectrum> for ScanRecord {
    fn from(spectrum: &MultiLayerSpectrum) -> Self {
        let ms_level = match spectrum.ms_level() {
            0 => None,
            level => Some(level),
        };

        let retention_time = spectrum
            .acquisition()
            .first_scan()
            .map(|event| event.start_time)
            .filter(|t| t.is_finite());

        let (mz_array, intensity_array) = match spectrum.raw_arrays() {
            Some(arrays) => (
                arrays.mzs().ok().map(|a| a.to_vec()),
                arrays.intensities().ok().map(|a| a.to_vec()),
            ),
            None => (None, None),
        };

        let precursor_mz = spectrum
            .precursor()
            .and_then(|prec| prec.ions.first())
            .map(|ion| ion.mz);

        Self {
            ms_level,
            retention_time,
            mz_array,
            intensity_array,
            precursor_mz,
        }
    }
}

/// A recording on disk, opened through [`MZReader`]
#[derive(Debug, Clone)]
pub struct MzDataSource {
    path: PathBuf,
}

impl MzDataSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Converts each spectrum of an open [`MZReader`] into a [`ScanRecord`].
///
/// The reader stops quietly when a spectrum fails to parse. If it stops before
/// reaching the number of spectra its index lists, the stream ends with a
/// [`LoadError::Stream`] instead.
pub struct MzDataRecords {
    reader: MZReader<fs::File>,
    /// The number of spectra in the reader's index, 0 if unknown
    expected: usize,
    records_read: usize,
    done: bool,
}

impl MzDataRecords {
    fn new(reader: MZReader<fs::File>) -> Self {
        let expected = SpectrumSource::len(&reader);
        Self {
            reader,
            expected,
            records_read: 0,
            done: false,
        }
    }
}

impl Iterator for MzDataRecords {
    type Item = Result<ScanRecord, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next() {
            Some(spectrum) => {
                self.records_read += 1;
                Some(Ok(ScanRecord::from(&spectrum)))
            }
            None => {
                self.done = true;
                if self.records_read < self.expected {
                    Some(Err(LoadError::Stream {
                        records_read: self.records_read,
                        source: io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!(
                                "the index lists {} spectra but only {} could be read",
                                self.expected, self.records_read
                            ),
                        ),
                    }))
                } else {
                    None
                }
            }
        }
    }
}

impl ScanRecordSource for MzDataSource {
    type Records = MzDataRecords;

    fn source_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn open_records(self) -> Result<Self::Records, LoadError> {
        let reader = MZReader::open_path(&self.path).map_err(|source| LoadError::Open {
            name: self.path.display().to_string(),
            source,
        })?;
        Ok(MzDataRecords::new(reader))
    }
}
