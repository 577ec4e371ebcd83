//! The viewer facade: one repository, one navigation controller and the panel
//! styles, wired to a [`Renderer`].
//!
//! A [`Viewer`] holds no reference to its renderer. Every operation that changes
//! what is shown takes the renderer as an argument, so the same viewer can be
//! driven by a GUI backend, a test recorder or [`NullRenderer`](crate::render::NullRenderer).
#[cfg(feature = "mzdata")]
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::annotation::annotate_peaks;
use crate::chromatogram::Chromatogram;
use crate::io::{LoadError, ScanRecordSource};
use crate::navigation::{
    NavigationConfig, NavigationController, NavigationEffect, PanelView, PointerButton,
    PointerPosition, ScrollDirection,
};
use crate::panel::{AxisRange, Panel};
use crate::peak_detection::{DetectedPeak, InvalidInputError, PeakDetectionParams, PeakDetector};
use crate::render::Renderer;
use crate::repository::{LoadSummary, ScanRepository};
use crate::scan::Scan;
use crate::style::StylePresets;
use crate::utils::{format_mz, format_rt};

/// Headroom above the most intense point of a spectrum
const SPECTRUM_HEADROOM: f64 = 0.25;
/// Headroom above the apex of a chromatogram
const CHROMATOGRAM_HEADROOM: f64 = 0.05;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to load the recording: {0}")]
    Load(#[from] LoadError),
    #[error("Invalid peak detection input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("No data is loaded for this operation")]
    NoData,
    #[error("There is no MS2 scan at position {0}")]
    Ms2NotFound(usize),
}

#[derive(Debug, Default, Clone)]
pub struct Viewer {
    repository: ScanRepository,
    navigation: NavigationController,
    styles: StylePresets,
    peak_params: PeakDetectionParams,
    current_ms1: Option<usize>,
    current_ms2: Option<usize>,
}

fn spectrum_view(scan: &Scan) -> PanelView {
    let x = scan
        .mz_extent()
        .map(|(lo, hi)| AxisRange::new(lo, hi))
        .unwrap_or(AxisRange::new(0.0, 1.0));
    let top = scan.base_peak_intensity();
    let y = if top > 0.0 {
        AxisRange::new(0.0, top * (1.0 + SPECTRUM_HEADROOM))
    } else {
        AxisRange::new(0.0, 1.0)
    };
    PanelView { x, y }
}

fn chromatogram_view(chromatogram: &Chromatogram) -> PanelView {
    let x = chromatogram
        .time_extent()
        .map(|(lo, hi)| AxisRange::new(lo, hi))
        .unwrap_or(AxisRange::new(0.0, 1.0));
    let y = match chromatogram.intensity_extent() {
        Some((lo, hi)) if hi > lo.min(0.0) => {
            AxisRange::new(lo.min(0.0), hi).padded_above(CHROMATOGRAM_HEADROOM)
        }
        _ => AxisRange::new(0.0, 1.0),
    };
    PanelView { x, y }
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NavigationConfig) -> Self {
        Self {
            navigation: NavigationController::new(config),
            ..Self::default()
        }
    }

    pub fn repository(&self) -> &ScanRepository {
        &self.repository
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn styles(&self) -> &StylePresets {
        &self.styles
    }

    /// Changed styles take effect the next time a panel is plotted
    pub fn styles_mut(&mut self) -> &mut StylePresets {
        &mut self.styles
    }

    pub fn peak_params(&self) -> &PeakDetectionParams {
        &self.peak_params
    }

    pub fn set_peak_params(&mut self, params: PeakDetectionParams) {
        self.peak_params = params;
    }

    pub fn has_data(&self) -> bool {
        self.repository.has_data()
    }

    /// The survey scan currently shown on the MS1 panel
    pub fn current_ms1(&self) -> Option<&Scan> {
        self.current_ms1.and_then(|i| self.repository.ms1(i))
    }

    /// The fragment scan currently shown on the MS2 panel
    pub fn current_ms2(&self) -> Option<&Scan> {
        self.current_ms2.and_then(|i| self.repository.ms2(i))
    }

    /// Load a recording and draw it: both chromatograms over their full extent
    /// and the first survey scan.
    ///
    /// On failure the viewer is left empty and every panel is blanked.
    pub fn load<S: ScanRecordSource, R: Renderer + ?Sized>(
        &mut self,
        source: S,
        renderer: &mut R,
    ) -> Result<LoadSummary, ViewerError> {
        self.navigation = NavigationController::new(*self.navigation.config());
        self.current_ms1 = None;
        self.current_ms2 = None;
        let summary = match self.repository.load(source) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Failed to load recording: {e}");
                self.blank_panels(renderer);
                return Err(e.into());
            }
        };
        self.populate(renderer);
        Ok(summary)
    }

    /// Load a recording already converted to a format `mzdata` can read, like mzML or MGF
    #[cfg(feature = "mzdata")]
    pub fn load_converted<P: AsRef<Path>, R: Renderer + ?Sized>(
        &mut self,
        path: P,
        renderer: &mut R,
    ) -> Result<LoadSummary, ViewerError> {
        self.load(crate::io::MzDataSource::new(path), renderer)
    }

    /// Forget the loaded recording and blank every panel
    pub fn reset<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.repository.reset();
        self.navigation = NavigationController::new(*self.navigation.config());
        self.current_ms1 = None;
        self.current_ms2 = None;
        self.blank_panels(renderer);
    }

    fn blank_panels<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_zoom_preview(None);
        for panel in Panel::ALL {
            renderer.clear_peak_labels(panel);
            let style = self.styles.get(panel);
            if panel.is_spectrum() {
                renderer.plot_spectrum(panel, &[], &[], &style);
            } else {
                renderer.plot_series(panel, &[], &[], &style);
            }
        }
    }

    fn populate<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for panel in Panel::ALL {
            renderer.clear_peak_labels(panel);
        }
        for (panel, chromatogram) in [
            (Panel::Tic, self.repository.tic()),
            (Panel::Bpc, self.repository.bpc()),
        ] {
            let view = chromatogram_view(chromatogram);
            renderer.plot_series(
                panel,
                chromatogram.time(),
                chromatogram.intensity(),
                &self.styles.get(panel),
            );
            renderer.set_title(panel, &chromatogram.chromatogram_type().to_string());
            renderer.set_x_range(panel, view.x);
            renderer.set_y_range(panel, view.y);
            self.navigation.set_view(panel, view);
        }
        if self.repository.default_ms1().is_some() {
            self.show_ms1(0, renderer);
        }
        info!(
            "Showing {} with {} MS1 and {} MS2 scans",
            self.repository.source_name().unwrap_or("recording"),
            self.repository.ms1_scans().len(),
            self.repository.ms2_scans().len()
        );
    }

    /// Show the survey scan at `index` of [`ScanRepository::ms1_scans`]. Out of
    /// range indices are ignored.
    pub fn show_ms1<R: Renderer + ?Sized>(&mut self, index: usize, renderer: &mut R) {
        let Some(scan) = self.repository.ms1(index) else {
            return;
        };
        let view = spectrum_view(scan);
        renderer.clear_peak_labels(Panel::Ms1);
        renderer.plot_spectrum(
            Panel::Ms1,
            scan.mz(),
            scan.intensity(),
            &self.styles.get(Panel::Ms1),
        );
        renderer.set_title(
            Panel::Ms1,
            &format!("MS1 @ RT = {} min", format_rt(scan.retention_time())),
        );
        renderer.set_x_range(Panel::Ms1, view.x);
        renderer.set_y_range(Panel::Ms1, view.y);
        self.navigation.set_view(Panel::Ms1, view);
        self.current_ms1 = Some(index);
    }

    /// Show the fragment scan at `index` of [`ScanRepository::ms2_scans`]
    pub fn show_ms2<R: Renderer + ?Sized>(
        &mut self,
        index: usize,
        renderer: &mut R,
    ) -> Result<(), ViewerError> {
        if self.repository.ms2_scans().is_empty() {
            return Err(ViewerError::NoData);
        }
        let scan = self
            .repository
            .ms2(index)
            .ok_or(ViewerError::Ms2NotFound(index))?;
        let view = spectrum_view(scan);
        let precursor = scan
            .precursor_mz()
            .map(format_mz)
            .unwrap_or_else(|| "n/a".to_string());
        renderer.clear_peak_labels(Panel::Ms2);
        renderer.plot_spectrum(
            Panel::Ms2,
            scan.mz(),
            scan.intensity(),
            &self.styles.get(Panel::Ms2),
        );
        renderer.set_title(
            Panel::Ms2,
            &format!(
                "MS2 @ RT = {} min • Prec = {precursor}",
                format_rt(scan.retention_time())
            ),
        );
        renderer.set_x_range(Panel::Ms2, view.x);
        renderer.set_y_range(Panel::Ms2, view.y);
        self.navigation.set_view(Panel::Ms2, view);
        self.current_ms2 = Some(index);
        Ok(())
    }

    /// One line per MS2 scan, numbered by position in the list:
    /// `Scan 1 • RT=0.61 min • Prec=445.1200`
    pub fn ms2_listing(&self) -> Vec<String> {
        self.repository
            .ms2_scans()
            .iter()
            .enumerate()
            .map(|(i, scan)| format!("Scan {} • {scan}", i + 1))
            .collect()
    }

    fn apply<R: Renderer + ?Sized>(&mut self, effects: Vec<NavigationEffect>, renderer: &mut R) {
        for effect in effects {
            match effect {
                NavigationEffect::ShowMs1 { index } => self.show_ms1(index, renderer),
                NavigationEffect::SetXRange { panel, range } => renderer.set_x_range(panel, range),
                NavigationEffect::SetYRange { panel, range } => renderer.set_y_range(panel, range),
                NavigationEffect::ZoomPreview(rect) => renderer.set_zoom_preview(rect),
            }
        }
    }

    pub fn press<R: Renderer + ?Sized>(
        &mut self,
        button: PointerButton,
        position: Option<PointerPosition>,
        renderer: &mut R,
    ) {
        let effects = self.navigation.press(&self.repository, button, position);
        self.apply(effects, renderer);
    }

    pub fn pointer_move<R: Renderer + ?Sized>(
        &mut self,
        position: Option<PointerPosition>,
        renderer: &mut R,
    ) {
        let effects = self.navigation.pointer_move(position);
        self.apply(effects, renderer);
    }

    pub fn pointer_move_at<R: Renderer + ?Sized>(
        &mut self,
        position: Option<PointerPosition>,
        now: std::time::Instant,
        renderer: &mut R,
    ) {
        let effects = self.navigation.pointer_move_at(position, now);
        self.apply(effects, renderer);
    }

    /// Let a zoom preview held back by the rate limit catch up, see
    /// [`NavigationController::flush_preview`]
    pub fn flush_preview<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let effects = self.navigation.flush_preview();
        self.apply(effects, renderer);
    }

    pub fn flush_preview_at<R: Renderer + ?Sized>(
        &mut self,
        now: std::time::Instant,
        renderer: &mut R,
    ) {
        let effects = self.navigation.flush_preview_at(now);
        self.apply(effects, renderer);
    }

    pub fn release<R: Renderer + ?Sized>(
        &mut self,
        button: PointerButton,
        position: Option<PointerPosition>,
        renderer: &mut R,
    ) {
        let effects = self.navigation.release(&self.repository, button, position);
        self.apply(effects, renderer);
    }

    pub fn scroll<R: Renderer + ?Sized>(
        &mut self,
        direction: ScrollDirection,
        position: Option<PointerPosition>,
        renderer: &mut R,
    ) {
        let effects = self.navigation.scroll(direction, position);
        self.apply(effects, renderer);
    }

    pub fn reset_all<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let effects = self.navigation.reset_all(&self.repository);
        self.apply(effects, renderer);
    }

    /// Detect the peaks of the signal shown on `panel` and annotate them, replacing
    /// any earlier annotations of that panel.
    ///
    /// The whole signal is searched, not only the visible range. When no peak is
    /// found the panel is left untouched.
    pub fn pick_peaks<R: Renderer + ?Sized>(
        &mut self,
        panel: Panel,
        percent_threshold: f64,
        renderer: &mut R,
    ) -> Result<Vec<DetectedPeak>, ViewerError> {
        let detector = PeakDetector::new(PeakDetectionParams {
            percent_threshold,
            ..self.peak_params
        });
        let (x, peaks) = match panel {
            Panel::Tic | Panel::Bpc => {
                let chromatogram = if panel == Panel::Tic {
                    self.repository.tic()
                } else {
                    self.repository.bpc()
                };
                if chromatogram.is_empty() {
                    return Err(ViewerError::NoData);
                }
                (
                    chromatogram.time(),
                    detector.detect_points(chromatogram.time(), chromatogram.intensity())?,
                )
            }
            Panel::Ms1 | Panel::Ms2 => {
                let scan = if panel == Panel::Ms1 {
                    self.current_ms1()
                } else {
                    self.current_ms2()
                }
                .ok_or(ViewerError::NoData)?;
                (scan.mz(), detector.detect_points(scan.mz(), scan.intensity())?)
            }
        };

        if peaks.is_empty() {
            info!("No peaks found on {panel} at {percent_threshold}%");
            return Ok(peaks);
        }
        info!("Found {} peaks on {panel}", peaks.len());

        let mut view = *self.navigation.view(panel);
        let annotations = annotate_peaks(panel, x, &peaks, view.y);
        annotations.draw(renderer);
        view.y = annotations.y_range;
        self.navigation.set_view(panel, view);
        Ok(peaks)
    }
}
