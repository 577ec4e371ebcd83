//! `mzview` is the core of an interactive LC-MS viewer.
//!
//! It loads a recording into a [`ScanRepository`], derives the total ion and
//! base peak chromatograms, finds the survey scan closest to any retention time,
//! detects peaks in one-dimensional signals and drives pointer navigation over
//! linked chromatogram panels. Drawing is left to a [`Renderer`] implementation.
//!
//! ```
//! use mzview::{Panel, PointerButton, PointerPosition, ScanRecord, Viewer, NullRenderer};
//!
//! let records = vec![
//!     ScanRecord::ms1(1.0, vec![100.0, 200.0], vec![10.0, 50.0]),
//!     ScanRecord::ms1(5.0, vec![100.0, 200.0], vec![30.0, 20.0]),
//!     ScanRecord::ms1(9.0, vec![100.0, 200.0], vec![5.0, 5.0]),
//! ];
//! let mut renderer = NullRenderer;
//! let mut viewer = Viewer::new();
//! viewer.load(records, &mut renderer).unwrap();
//!
//! let at = Some(PointerPosition::new(Panel::Tic, 6.2, 0.0));
//! viewer.press(PointerButton::Primary, at, &mut renderer);
//! assert_eq!(viewer.current_ms1().unwrap().retention_time(), 5.0);
//! ```
pub mod annotation;
pub mod chromatogram;
pub mod io;
pub mod navigation;
pub mod panel;
pub mod peak_detection;
pub mod render;
pub mod repository;
pub mod scan;
pub mod style;
pub mod utils;
pub mod viewer;

pub use crate::chromatogram::{Chromatogram, ChromatogramType};
pub use crate::io::{InMemorySource, LoadError, ScanRecord, ScanRecordSource};
#[cfg(feature = "mzdata")]
pub use crate::io::MzDataSource;
pub use crate::navigation::{
    NavigationConfig, NavigationController, NavigationEffect, NavigationState, PointerButton,
    PointerPosition, ScrollDirection,
};
pub use crate::panel::{AxisRange, Panel};
pub use crate::peak_detection::{
    detect_peaks, DetectedPeak, InvalidInputError, PeakDetectionParams, PeakDetector,
};
pub use crate::render::{NullRenderer, Renderer};
pub use crate::repository::{LoadSummary, ScanRepository};
pub use crate::scan::{MSLevel, Scan};
pub use crate::style::{PanelStyle, StylePresets};
pub use crate::viewer::{Viewer, ViewerError};
