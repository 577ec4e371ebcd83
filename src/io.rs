//! Sources of scan records for loading a recording.
//!
//! Parsing the on-disk format is delegated to a collaborator implementing
//! [`ScanRecordSource`]. With the `mzdata` feature, [`MzDataSource`] reads any
//! format [`mzdata`](https://docs.rs/mzdata) can infer.

mod source;
#[cfg(feature = "mzdata")]
mod mzdata_source;

pub use crate::io::source::{
    InMemorySource, InfallibleRecords, LoadError, ScanRecord, ScanRecordSource,
};

#[cfg(feature = "mzdata")]
pub use crate::io::mzdata_source::{MzDataRecords, MzDataSource};
